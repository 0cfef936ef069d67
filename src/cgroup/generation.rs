//! Cgroup API generations and the generation-specific on-disk schema.
//!
//! The memory controller exposes the same logical metrics under different
//! file names in the legacy (v1) and unified (v2) hierarchies. This module
//! pins the translation table in one place so the rest of the crate can talk
//! about logical metrics only.

/// The two cgroup API generations.
///
/// A resolved cgroup always belongs to exactly one generation. "Hybrid"
/// systems mount both hierarchies at once; that situation is handled by
/// probing the generations in order during discovery, never by a combined
/// variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgroupGeneration {
    /// Cgroup v1, with per-controller hierarchies.
    Legacy,
    /// Cgroup v2, the unified hierarchy.
    Unified,
}

impl CgroupGeneration {
    /// Name of the membership list file under a cgroup directory.
    ///
    /// Legacy hierarchies list member threads in `tasks`; the unified
    /// hierarchy lists member processes in `cgroup.procs`.
    pub fn procs_file(self) -> &'static str {
        match self {
            CgroupGeneration::Legacy => "tasks",
            CgroupGeneration::Unified => "cgroup.procs",
        }
    }
}

impl std::fmt::Display for CgroupGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CgroupGeneration::Legacy => "legacy (v1)",
            CgroupGeneration::Unified => "unified (v2)",
        };
        write!(f, "{name}")
    }
}

/// Logical memory-controller metrics, independent of generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    MemoryLimit,
    MemoryCurrent,
    SwapLimit,
    SwapCurrent,
    Stat,
}

impl Metric {
    /// Returns the on-disk file name for this metric in the given generation.
    pub fn file_name(self, generation: CgroupGeneration) -> &'static str {
        match (self, generation) {
            (Metric::MemoryLimit, CgroupGeneration::Legacy) => "memory.limit_in_bytes",
            (Metric::MemoryLimit, CgroupGeneration::Unified) => "memory.max",
            (Metric::MemoryCurrent, CgroupGeneration::Legacy) => "memory.usage_in_bytes",
            (Metric::MemoryCurrent, CgroupGeneration::Unified) => "memory.current",
            (Metric::SwapLimit, CgroupGeneration::Legacy) => "memory.memsw.limit_in_bytes",
            (Metric::SwapLimit, CgroupGeneration::Unified) => "memory.swap.max",
            (Metric::SwapCurrent, CgroupGeneration::Legacy) => "memory.memsw.usage_in_bytes",
            (Metric::SwapCurrent, CgroupGeneration::Unified) => "memory.swap.current",
            (Metric::Stat, _) => "memory.stat",
        }
    }
}
