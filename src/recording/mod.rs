//! Recording input for the conditioning pipeline.
//!
//! A recording is a complete, already-captured tri-axial acceleration
//! capture. This module only stores and loads it; all behavior lives in
//! [`crate::core`].

pub mod loader;
pub mod types;

// Re-export commonly used types
pub use loader::{load_csv_file, read_csv, stream_name};
pub use types::{Axes, Recording, SampleStream};
