//! Memory-cgroup discovery and accounting for the calling process.
//!
//! This module turns "which memory cgroup confines this process, and what do
//! its books say" into a small pipeline over the Linux cgroup filesystem:
//!
//! 1. [`membership::resolve_memory_cgroup`] parses `/proc/self/cgroup`,
//!    locates the hierarchy mount, and walks the recorded path upwards until
//!    a cgroup actually listing the process is found, yielding a
//!    [`CgroupLocation`].
//! 2. [`MemoryAccounting::collect`] reads the five metric files of the memory
//!    controller for that location and normalizes them across the two cgroup
//!    generations (legacy memsw corrections, `max` sentinel handling).
//!
//! Both cgroup generations are supported, including hybrid systems that mount
//! both at once; the legacy hierarchy is preferred when it confirms the
//! process.

mod accounting;
mod error;
mod generation;
mod location;
pub mod membership;
pub mod stats;

pub use accounting::{MemoryAccounting, UNLIMITED};
pub use error::{Error, Result};
pub use generation::{CgroupGeneration, Metric};
pub use location::CgroupLocation;
pub use membership::{resolve_memory_cgroup, resolve_memory_cgroup_at};
