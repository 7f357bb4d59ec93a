// Adapters layer: concrete implementations for files on disk (reading, CSV output, storage).

pub mod loader;
pub mod storage;
pub mod writer;
