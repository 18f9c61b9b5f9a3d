//! Entity types - the records the pipeline works on

pub mod observation;

pub use observation::{Dataset, Observation, ObservationRecord};
