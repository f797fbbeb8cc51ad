//! Responder implementations

mod memory;
mod writer;

pub use memory::MemoryResponder;
pub use writer::WriterResponder;
