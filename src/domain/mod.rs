//! Domain layer: value objects and entities with no I/O.

pub mod entities;
pub mod value_objects;
