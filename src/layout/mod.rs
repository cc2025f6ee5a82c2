//! Layout reconstruction: fragments to lines, lines to paragraphs.

pub mod cluster;
pub mod render;

pub use cluster::cluster;
pub use render::{render, Placement};
