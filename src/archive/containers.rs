//! Standard containers.
//!
//! A container field holds its element count followed by one child field per
//! element. Element fields all share the name [`ELEMENT`] and are matched
//! positionally, so unknown trailing data inside an element is still skipped.

use std::collections::BTreeMap;

use crate::util::{Error, Result};

use super::dispatch::route;
use super::{Archive, Hints, Transfer};

/// Name of every container element field.
pub const ELEMENT: &str = "Element";

const KEY: &str = "Key";
const VALUE: &str = "Value";

fn element_hints(hints: Hints) -> Hints {
    hints.intersection(Hints::HEX_DISPLAY) | Hints::IGNORE_NAME
}

fn len_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::invalid_value(format!("container of {len} elements is too large")))
}

fn missing_element(index: u32, count: u32) -> Error {
    Error::malformed(format!("container declares {count} elements but element {index} is missing"))
}

impl<R, T: Transfer<R> + Default> Transfer<route::Sequence<R>> for Vec<T> {
    fn transfer(&mut self, ar: &mut dyn Archive, hints: Hints) -> Result<()> {
        let mut count = len_u32(self.len())?;
        ar.transfer_container_size(&mut count, ELEMENT)?;
        let hints = element_hints(hints);

        if ar.is_writer() {
            for item in self.iter_mut() {
                ar.begin_field(ELEMENT, hints)?;
                item.transfer(ar, hints)?;
                ar.end_field()?;
            }
            return Ok(());
        }

        self.clear();
        for index in 0..count {
            if !ar.begin_field(ELEMENT, hints)? {
                return Err(missing_element(index, count));
            }
            let mut item = T::default();
            item.transfer(ar, hints)?;
            ar.end_field()?;
            self.push(item);
        }
        Ok(())
    }
}

impl<RK, RV, K, V> Transfer<route::Map<RK, RV>> for BTreeMap<K, V>
where
    K: Transfer<RK> + Default + Ord + Clone,
    V: Transfer<RV> + Default,
{
    fn transfer(&mut self, ar: &mut dyn Archive, hints: Hints) -> Result<()> {
        let mut count = len_u32(self.len())?;
        ar.transfer_container_size(&mut count, ELEMENT)?;
        let hints = element_hints(hints);

        if ar.is_writer() {
            for (key, value) in self.iter_mut() {
                let mut key = key.clone();
                ar.begin_field(ELEMENT, hints)?;
                ar.field(KEY, &mut key)?;
                ar.field(VALUE, value)?;
                ar.end_field()?;
            }
            return Ok(());
        }

        self.clear();
        for index in 0..count {
            if !ar.begin_field(ELEMENT, hints)? {
                return Err(missing_element(index, count));
            }
            let mut key = K::default();
            let mut value = V::default();
            ar.field(KEY, &mut key)?;
            ar.field(VALUE, &mut value)?;
            ar.end_field()?;
            self.insert(key, value);
        }
        Ok(())
    }
}

impl<R, T: Transfer<R> + Default> Transfer<route::Optional<R>> for Option<T> {
    fn transfer(&mut self, ar: &mut dyn Archive, hints: Hints) -> Result<()> {
        let mut count = u32::from(self.is_some());
        ar.transfer_container_size(&mut count, ELEMENT)?;
        let hints = element_hints(hints);

        if ar.is_writer() {
            if let Some(item) = self.as_mut() {
                ar.begin_field(ELEMENT, hints)?;
                item.transfer(ar, hints)?;
                ar.end_field()?;
            }
            return Ok(());
        }

        *self = None;
        if count > 1 {
            return Err(Error::malformed(format!("optional value declares {count} elements")));
        }
        if count == 1 {
            if !ar.begin_field(ELEMENT, hints)? {
                return Err(missing_element(0, count));
            }
            let mut item = T::default();
            item.transfer(ar, hints)?;
            ar.end_field()?;
            *self = Some(item);
        }
        Ok(())
    }
}
