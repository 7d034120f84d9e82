//! Tagged binary writer.

use crate::codec::{ByteWriter, Endian, Primitive};
use crate::core::VersionEnvelope;
use crate::util::{name_hash, Error, Result};

use super::super::{Archive, Hints};
use super::ROOT_ID;

/// An open region awaiting its size (and child count) back-patch.
struct Frame {
    size_at: usize,
    count_at: Option<usize>,
    children: u32,
}

/// Writes fields as size-prefixed regions keyed by name hash.
///
/// A region's child count is reserved lazily, just before its first child,
/// so leaf regions carry only their value bytes.
pub struct BinaryWriter {
    out: ByteWriter,
    env: VersionEnvelope,
    frames: Vec<Frame>,
}

impl BinaryWriter {
    /// Start a stream: envelope header, then the root region.
    pub fn new(env: VersionEnvelope, endian: Endian) -> Result<Self> {
        let mut out = ByteWriter::new(endian);
        env.write_binary(&mut out)?;
        out.write_u32(ROOT_ID)?;

        let mut writer = Self {
            out,
            env,
            frames: Vec::new(),
        };
        let size_at = writer.reserve()?;
        let count_at = writer.reserve()?;
        writer.frames.push(Frame {
            size_at,
            count_at: Some(count_at),
            children: 0,
        });
        Ok(writer)
    }

    /// Close the root region and return the encoded stream.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if self.frames.len() != 1 {
            return Err(Error::state(format!("{} fields left open", self.frames.len().saturating_sub(1))));
        }
        if let Some(root) = self.frames.pop() {
            self.close(root)?;
        }
        Ok(self.out.into_inner())
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.out.pos()
    }

    fn reserve(&mut self) -> Result<usize> {
        let at = self.out.pos();
        self.out.write_uint(0, self.env.region_size_width())?;
        Ok(at)
    }

    fn ensure_count(&mut self) -> Result<()> {
        let needs_count = self
            .frames
            .last()
            .ok_or_else(|| Error::state("archive already finished"))?
            .count_at
            .is_none();
        if needs_count {
            let at = self.reserve()?;
            if let Some(frame) = self.frames.last_mut() {
                frame.count_at = Some(at);
            }
        }
        Ok(())
    }

    fn close(&mut self, frame: Frame) -> Result<()> {
        let width = self.env.region_size_width();
        let size = self.out.pos() - frame.size_at - width;
        self.out.patch_uint(frame.size_at, size as u64, width).map_err(|_| {
            Error::invalid_value(format!(
                "region of {size} bytes does not fit the {width}-byte sizes of encoding revision {:?}",
                self.env.encoding_revision
            ))
        })?;
        if let Some(at) = frame.count_at {
            self.out.patch_uint(at, u64::from(frame.children), width)?;
        }
        Ok(())
    }
}

impl Archive for BinaryWriter {
    fn envelope(&self) -> &VersionEnvelope {
        &self.env
    }

    fn is_reader(&self) -> bool {
        false
    }

    fn is_text(&self) -> bool {
        false
    }

    fn begin_field(&mut self, name: &str, _hints: Hints) -> Result<bool> {
        self.ensure_count()?;
        if let Some(parent) = self.frames.last_mut() {
            parent.children += 1;
        }
        self.out.write_u32(name_hash(name))?;
        let size_at = self.reserve()?;
        self.frames.push(Frame {
            size_at,
            count_at: None,
            children: 0,
        });
        Ok(true)
    }

    fn end_field(&mut self) -> Result<()> {
        if self.frames.len() <= 1 {
            return Err(Error::state("end_field without a matching begin_field"));
        }
        match self.frames.pop() {
            Some(frame) => self.close(frame),
            None => Ok(()),
        }
    }

    fn transfer_primitive(&mut self, value: &mut dyn Primitive, _hints: Hints) -> Result<()> {
        value.write_binary(&mut self.out, &self.env)
    }

    fn transfer_container_size(&mut self, _size: &mut u32, _element_name: &str) -> Result<()> {
        // The child count doubles as the element count; reserve it now so an
        // empty container still records an explicit zero.
        self.ensure_count()
    }

    fn transfer_polymorphic_tag(&mut self, tag: &mut u32) -> Result<()> {
        self.out.write_u32(*tag)
    }
}
