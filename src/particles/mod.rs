//! Ambient point field drifting around the figures.

pub mod field;

pub use field::{HueBucket, ParticleField, ParticleFrame};
