pub mod algae_field;

pub use algae_field::{AlgaeField, AlgaeFieldConfig, Heading, Point};
