//! The image processing pipeline.
//!
//! Stages, leaves first: row split/join, decode, encode, discovery, the
//! per-image row fan-out engine, the image worker pool, and the batch
//! orchestrator that drives them.

pub mod decode;
pub mod discovery;
pub mod encode;
pub mod fanout;
pub mod pool;
pub mod processor;
pub mod rows;

pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::FileDiscovery;
pub use fanout::{FilteredImage, RowEngine};
pub use pool::WorkerPool;
pub use processor::BatchProcessor;
