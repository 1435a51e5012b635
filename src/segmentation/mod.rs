//! Segment Builder (Component B, §4.2): derives candidate clip windows
//! from a transcript.

mod builder;

pub use builder::build_candidates;
