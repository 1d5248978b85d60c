//! File-system services shared by the pipeline and the CLI
//!
//! Separates image file I/O from the acquisition and processing logic so the
//! latter stay testable against in-memory data.

pub mod io;

pub use io::ImageStore;
