//! Utility modules

pub mod visualization;

pub use visualization::CarVisualizer;
