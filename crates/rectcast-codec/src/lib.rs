//! Core mask-to-rectangle codec: morphological gap welding and the scanline
//! run-merge extractor. Everything here is pure and synchronous; streaming,
//! classification, and container I/O live in the sibling crates.

pub mod extract;
pub mod weld;

pub use extract::extract;
pub use weld::{dilate, erode, weld};
