pub mod tracker;

pub use tracker::{ProgressTracker, ScrollState};
