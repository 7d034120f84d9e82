//! Hand-written serial types shared by the archive tests.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::core::VersionEnvelope;
use crate::util::{FourCC, Result, Vec3};

use super::{route, Archive, GlobalSerial, Hints, Polymorphic, Serial};

pub fn env() -> VersionEnvelope {
    VersionEnvelope::new(1, FourCC::new(*b"PRME"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Door {
    pub name: String,
    pub position: Vec3,
    pub flags: u32,
    pub links: Vec<u32>,
    pub scale: f32,
    pub tags: BTreeMap<String, i16>,
    pub target: Option<String>,
}

impl Default for Door {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec3::ZERO,
            flags: 0,
            links: Vec::new(),
            scale: 1.0,
            tags: BTreeMap::new(),
            target: None,
        }
    }
}

impl Door {
    pub fn sample() -> Self {
        Self {
            name: "Door <A> & B".to_string(),
            position: Vec3::new(1.0, 2.0, 3.0),
            flags: 0x8001,
            links: vec![10, 11, 12],
            scale: 2.5,
            tags: BTreeMap::from([("hinge".to_string(), -4), ("lock".to_string(), 9)]),
            target: Some("Frame".to_string()),
        }
    }
}

impl Serial for Door {
    fn serialize(&mut self, ar: &mut dyn Archive) -> Result<()> {
        ar.field("Name", &mut self.name)?;
        ar.field("Position", &mut self.position)?;
        ar.field_with("Flags", &mut self.flags, Hints::HEX_DISPLAY | Hints::ATTRIBUTE)?;
        ar.field("Links", &mut self.links)?;
        ar.field_or("Scale", &mut self.scale, 1.0, Hints::OPTIONAL)?;
        ar.field("Tags", &mut self.tags)?;
        ar.field("Target", &mut self.target)?;
        Ok(())
    }
}

/// Earlier layout with only a name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DoorV1 {
    pub name: String,
}

impl Serial for DoorV1 {
    fn serialize(&mut self, ar: &mut dyn Archive) -> Result<()> {
        ar.field("Name", &mut self.name)?;
        Ok(())
    }
}

/// Later layout with a nested field and a trailing field unknown to [`Door`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DoorV3 {
    pub door: Door,
    pub hinge: Hinge,
    pub sound: String,
}

impl Serial for DoorV3 {
    fn serialize(&mut self, ar: &mut dyn Archive) -> Result<()> {
        self.door.serialize(ar)?;
        ar.field("Hinge", &mut self.hinge)?;
        ar.field("Sound", &mut self.sound)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Hinge {
    pub axis: Vec3,
    pub limits: Vec<f32>,
}

impl Serial for Hinge {
    fn serialize(&mut self, ar: &mut dyn Archive) -> Result<()> {
        ar.field("Axis", &mut self.axis)?;
        ar.field("Limits", &mut self.limits)?;
        Ok(())
    }
}

/// Writes `Position` before `Name`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SwappedDoor {
    pub name: String,
    pub position: Vec3,
}

impl Serial for SwappedDoor {
    fn serialize(&mut self, ar: &mut dyn Archive) -> Result<()> {
        ar.field("Position", &mut self.position)?;
        ar.field("Name", &mut self.name)?;
        Ok(())
    }
}

pub trait Shape: Polymorphic + std::fmt::Debug {
    fn area(&self) -> f32;
}

#[derive(Debug, Default)]
pub struct Circle {
    pub radius: f32,
}

#[derive(Debug, Default)]
pub struct Square {
    pub side: f32,
}

impl Serial for Circle {
    fn serialize(&mut self, ar: &mut dyn Archive) -> Result<()> {
        ar.field("Radius", &mut self.radius)?;
        Ok(())
    }
}

impl Serial for Square {
    fn serialize(&mut self, ar: &mut dyn Archive) -> Result<()> {
        ar.field("Side", &mut self.side)?;
        Ok(())
    }
}

impl Polymorphic for Circle {
    fn type_tag(&self) -> u32 {
        1
    }
}

impl Polymorphic for Square {
    fn type_tag(&self) -> u32 {
        2
    }
}

impl Shape for Circle {
    fn area(&self) -> f32 {
        std::f32::consts::PI * self.radius * self.radius
    }
}

impl Shape for Square {
    fn area(&self) -> f32 {
        self.side * self.side
    }
}

pub fn shape_factory(tag: u32) -> Option<Box<dyn Shape>> {
    match tag {
        1 => Some(Box::new(Circle::default())),
        2 => Some(Box::new(Square::default())),
        _ => None,
    }
}

/// Only knows circles.
pub fn circle_factory(tag: u32) -> Option<Box<dyn Shape>> {
    match tag {
        1 => Some(Box::new(Circle::default())),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    pub main: Option<Box<dyn Shape>>,
    pub shapes: Vec<Box<dyn Shape>>,
    pub title: String,
}

impl Scene {
    pub fn sample() -> Self {
        Self {
            main: Some(Box::new(Square { side: 3.0 })),
            shapes: vec![
                Box::new(Circle { radius: 1.0 }),
                Box::new(Square { side: 2.0 }),
                Box::new(Circle { radius: 0.5 }),
            ],
            title: "Room".to_string(),
        }
    }

    pub fn areas(&self) -> Vec<f32> {
        self.shapes.iter().map(|s| s.area()).collect()
    }
}

impl Serial for Scene {
    fn serialize(&mut self, ar: &mut dyn Archive) -> Result<()> {
        ar.polymorphic("Main", &mut self.main, &shape_factory)?;
        ar.polymorphic_elements("Shapes", &mut self.shapes, &shape_factory)?;
        ar.field("Title", &mut self.title)?;
        Ok(())
    }
}

/// Same layout as [`Scene`] but reading with a factory that lacks squares.
#[derive(Debug, Default)]
pub struct CircleScene {
    pub shapes: Vec<Box<dyn Shape>>,
    pub title: String,
}

impl Serial for CircleScene {
    fn serialize(&mut self, ar: &mut dyn Archive) -> Result<()> {
        ar.polymorphic_elements("Shapes", &mut self.shapes, &circle_factory)?;
        ar.field("Title", &mut self.title)?;
        Ok(())
    }
}

/// Reads `Main` with the circle-only factory.
#[derive(Debug, Default)]
pub struct StrictScene {
    pub main: Option<Box<dyn Shape>>,
}

impl Serial for StrictScene {
    fn serialize(&mut self, ar: &mut dyn Archive) -> Result<()> {
        ar.polymorphic("Main", &mut self.main, &circle_factory)?;
        Ok(())
    }
}

/// Wraps a value in a named field followed by a sentinel sibling.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Holder<T> {
    pub item: T,
    pub after: u32,
}

impl<T: Serial> Serial for Holder<T> {
    fn serialize(&mut self, ar: &mut dyn Archive) -> Result<()> {
        ar.field::<route::Member, _>("Item", &mut self.item)?;
        ar.field("After", &mut self.after)?;
        Ok(())
    }
}

impl GlobalSerial for Duration {
    fn serialize_global(value: &mut Self, ar: &mut dyn Archive, _hints: Hints) -> Result<()> {
        let mut secs = value.as_secs();
        let mut nanos = value.subsec_nanos();
        ar.field("Secs", &mut secs)?;
        ar.field("Nanos", &mut nanos)?;
        *value = Duration::new(secs, nanos);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timer {
    pub label: String,
    pub delay: Duration,
}

impl Serial for Timer {
    fn serialize(&mut self, ar: &mut dyn Archive) -> Result<()> {
        ar.field("Label", &mut self.label)?;
        ar.field("Delay", &mut self.delay)?;
        Ok(())
    }
}
