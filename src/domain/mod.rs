//! Domain layer: value objects, aggregates, pricing and the gateway metadata schema.
pub mod value_objects;
pub mod aggregates;
pub mod events;
pub mod pricing;
pub mod metadata;
