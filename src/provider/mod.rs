pub mod memory;

pub use memory::{MemoryLayer, MemoryMap};
