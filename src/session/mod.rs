//! Session state and the frame driver.

pub mod driver;

pub use driver::{FrameReport, Session, SkippedWrite};
