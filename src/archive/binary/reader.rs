//! Tagged binary reader.

use tracing::trace;

use crate::codec::{ByteReader, Endian, Primitive};
use crate::core::VersionEnvelope;
use crate::util::{name_hash, Error, Result};

use super::super::{Archive, Hints};
use super::ROOT_ID;

#[derive(Clone, Copy)]
struct Frame {
    end: usize,
    children_start: Option<usize>,
    count: u32,
}

/// Location of one child region.
#[derive(Clone, Copy)]
struct Child {
    id: u32,
    body: usize,
    end: usize,
}

/// Reads size-prefixed regions, tolerating missing, extra and reordered fields.
pub struct BinaryReader<'a> {
    input: ByteReader<'a>,
    env: VersionEnvelope,
    frames: Vec<Frame>,
}

impl<'a> BinaryReader<'a> {
    /// Read the envelope and open the root region.
    pub fn new(bytes: &'a [u8], endian: Endian) -> Result<Self> {
        let mut input = ByteReader::new(bytes, endian);
        let env = VersionEnvelope::read_binary(&mut input)?;
        let mut reader = Self {
            input,
            env,
            frames: Vec::new(),
        };

        let id = reader.input.read_u32().map_err(|_| Error::malformed("stream ends before the root region"))?;
        if id != ROOT_ID {
            return Err(Error::malformed(format!("expected root region marker, found {id:#010X}")));
        }
        let size = reader.read_width().map_err(|_| Error::malformed("stream ends inside the root header"))?;
        let body = reader.input.pos();
        let end = body
            .checked_add(size)
            .filter(|&end| end <= reader.input.len())
            .ok_or_else(|| {
                Error::malformed(format!(
                    "root region of {size} bytes overruns the {}-byte stream",
                    reader.input.len()
                ))
            })?;
        reader.frames.push(Frame {
            end,
            children_start: None,
            count: 0,
        });
        reader.ensure_count()?;
        Ok(reader)
    }

    /// Current read offset.
    pub fn position(&self) -> usize {
        self.input.pos()
    }

    fn read_width(&mut self) -> Result<usize> {
        Ok(self.input.read_uint(self.env.region_size_width())? as usize)
    }

    fn top(&self) -> Result<Frame> {
        self.frames
            .last()
            .copied()
            .ok_or_else(|| Error::state("no open region"))
    }

    /// Read the region's child count the first time it is needed.
    fn ensure_count(&mut self) -> Result<()> {
        let frame = self.top()?;
        if frame.children_start.is_some() {
            return Ok(());
        }
        let pos = self.input.pos();
        let count = if pos >= frame.end {
            0
        } else {
            let width = self.env.region_size_width();
            if pos + width > frame.end {
                return Err(Error::malformed(format!(
                    "child count at offset {pos} overruns region ending at {}",
                    frame.end
                )));
            }
            self.input.read_uint(width)? as u32
        };
        let children_start = self.input.pos();
        if let Some(top) = self.frames.last_mut() {
            top.count = count;
            top.children_start = Some(children_start);
        }
        Ok(())
    }

    fn peek_child(&mut self, pos: usize, parent_end: usize) -> Result<Child> {
        let width = self.env.region_size_width();
        let header = 4 + width;
        if pos + header > parent_end {
            return Err(Error::malformed(format!(
                "field header at offset {pos} overruns region ending at {parent_end}"
            )));
        }
        let saved = self.input.pos();
        self.input.seek(pos)?;
        let id = self.input.read_u32()?;
        let size = self.read_width()?;
        self.input.seek(saved)?;

        let body = pos + header;
        let end = body
            .checked_add(size)
            .filter(|&end| end <= parent_end)
            .ok_or_else(|| {
                Error::malformed(format!(
                    "field region of {size} bytes at offset {pos} overruns parent ending at {parent_end}"
                ))
            })?;
        Ok(Child { id, body, end })
    }

    fn enter(&mut self, child: Child) -> Result<bool> {
        self.input.seek(child.body)?;
        self.frames.push(Frame {
            end: child.end,
            children_start: None,
            count: 0,
        });
        Ok(true)
    }

    fn check_within(&self, what: &str) -> Result<()> {
        let end = self.top()?.end;
        if self.input.pos() > end {
            return Err(Error::malformed(format!(
                "{what} overruns its field region ending at {end}"
            )));
        }
        Ok(())
    }
}

impl Archive for BinaryReader<'_> {
    fn envelope(&self) -> &VersionEnvelope {
        &self.env
    }

    fn is_reader(&self) -> bool {
        true
    }

    fn is_text(&self) -> bool {
        false
    }

    fn begin_field(&mut self, name: &str, hints: Hints) -> Result<bool> {
        self.ensure_count()?;
        let frame = self.top()?;
        if frame.count == 0 {
            return Ok(false);
        }

        let hash = name_hash(name);
        let cursor = self.input.pos();
        if cursor < frame.end {
            let child = self.peek_child(cursor, frame.end)?;
            if hints.contains(Hints::IGNORE_NAME) || child.id == hash {
                return self.enter(child);
            }
        }
        if hints.contains(Hints::IGNORE_NAME) {
            return Ok(false);
        }

        trace!(field = name, offset = cursor, "field not at cursor, scanning siblings");
        let mut pos = frame.children_start.unwrap_or(cursor);
        for _ in 0..frame.count {
            if pos >= frame.end {
                break;
            }
            let child = self.peek_child(pos, frame.end)?;
            if child.id == hash {
                return self.enter(child);
            }
            pos = child.end;
        }
        Ok(false)
    }

    fn end_field(&mut self) -> Result<()> {
        if self.frames.len() <= 1 {
            return Err(Error::state("end_field without a matching begin_field"));
        }
        let frame = self.top()?;
        self.frames.pop();
        self.input.seek(frame.end)
    }

    fn transfer_primitive(&mut self, value: &mut dyn Primitive, _hints: Hints) -> Result<()> {
        value.read_binary(&mut self.input, &self.env).map_err(|e| match e {
            Error::UnexpectedEof(at) => Error::malformed(format!("stream ends at offset {at} inside a value")),
            other => other,
        })?;
        self.check_within(value.type_name())
    }

    fn transfer_container_size(&mut self, size: &mut u32, _element_name: &str) -> Result<()> {
        self.ensure_count()?;
        *size = self.top()?.count;
        Ok(())
    }

    fn transfer_polymorphic_tag(&mut self, tag: &mut u32) -> Result<()> {
        *tag = self
            .input
            .read_u32()
            .map_err(|_| Error::malformed("stream ends inside a polymorphic tag"))?;
        self.check_within("polymorphic tag")
    }
}
