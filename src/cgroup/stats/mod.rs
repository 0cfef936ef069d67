//! Parsers for the raw cgroup memory accounting files.

mod memory;

pub use memory::MemoryStat;
