//! Easing curves shared by the timeline and the camera path.

mod easing;

pub use easing::{Easing, ease, ease_in_out_cubic};
