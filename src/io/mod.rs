//! I/O modules for reading frames, capture metadata, and writing results

pub mod metadata;
pub mod frame_reader;
pub mod report;

pub use frame_reader::FrameReader;
