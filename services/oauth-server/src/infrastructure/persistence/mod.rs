//! 持久化实现

pub mod memory;

pub use memory::InMemoryStore;
