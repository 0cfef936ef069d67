//! Normalized memory/swap accounting for one resolved cgroup.
//!
//! [`MemoryAccounting::collect`] reads the five metric files of the memory
//! controller in a fixed order and applies the generation-specific
//! corrections, so downstream consumers only ever see v2-shaped numbers:
//! memory and swap accounted separately, with `u64::MAX` standing in for
//! "no limit".

use crate::fsutil;

use super::error::Result;
use super::generation::{CgroupGeneration, Metric};
use super::location::CgroupLocation;
use super::stats::MemoryStat;

/// Sentinel for "no limit configured", distinct from zero.
///
/// Cgroup v2 writes the literal `max`; v1 reports a page-rounded huge number
/// that parses fine and compares correctly against real totals, so only the
/// unparsable case maps to the sentinel.
pub const UNLIMITED: u64 = u64::MAX;

/// Upper bound for one metric file read. Metric files are a single line or a
/// short key/value listing; 8 KiB is ample.
const METRIC_READ_LEN: usize = 8192;

/// Snapshot of a cgroup's memory accounting, normalized across generations.
///
/// All values are bytes. Owned by one query session; never cached across
/// queries because cgroup membership and limits can change between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryAccounting {
    /// Memory ceiling, or [`UNLIMITED`].
    pub memory_limit: u64,
    /// Current memory usage.
    pub memory_current: u64,
    /// Swap ceiling, or [`UNLIMITED`]. Already corrected for v1's combined
    /// memory+swap accounting.
    pub swap_limit: u64,
    /// Current swap usage, corrected the same way.
    pub swap_current: u64,
    /// Counter breakdown from `memory.stat`.
    pub stat: MemoryStat,
}

impl MemoryAccounting {
    /// Reads and normalizes all five memory metrics for the given cgroup.
    ///
    /// Metrics are fetched in strict order because the legacy corrections are
    /// order-dependent: the corrected swap limit must exist before the swap
    /// usage correction can consult it. The first failed read aborts the
    /// whole collection; a partially populated snapshot is never returned.
    ///
    /// # Errors
    ///
    /// Fails if any metric file cannot be read or if a metric path exceeds
    /// `PATH_MAX`.
    pub fn collect(location: &CgroupLocation) -> Result<Self> {
        let generation = location.generation();
        let mut accounting = Self {
            memory_limit: read_scalar_metric(location, Metric::MemoryLimit)?,
            memory_current: read_scalar_metric(location, Metric::MemoryCurrent)?,
            ..Self::default()
        };

        let raw_swap_limit = read_scalar_metric(location, Metric::SwapLimit)?;
        accounting.swap_limit = match generation {
            // v1 memsw is a combined memory+swap ceiling; the swap share is
            // what remains after the memory ceiling. A combined ceiling below
            // the memory ceiling leaves no room for swap.
            CgroupGeneration::Legacy => {
                if raw_swap_limit < accounting.memory_limit {
                    0
                } else {
                    raw_swap_limit - accounting.memory_limit
                }
            }
            CgroupGeneration::Unified => raw_swap_limit,
        };

        let raw_swap_current = read_scalar_metric(location, Metric::SwapCurrent)?;
        accounting.swap_current = match generation {
            CgroupGeneration::Legacy => {
                if raw_swap_current < accounting.memory_current || accounting.swap_limit == 0 {
                    0
                } else {
                    raw_swap_current - accounting.memory_current
                }
            }
            CgroupGeneration::Unified => raw_swap_current,
        };

        let stat_path = location.metric_path(Metric::Stat)?;
        let mut reader = fsutil::open_file_reader(&stat_path)?;
        accounting.stat = MemoryStat::from_reader(&mut reader, generation)
            .map_err(|source| super::error::Error::ReadLine {
                path: stat_path,
                source,
            })?;

        Ok(accounting)
    }
}

/// Reads one single-value metric file.
///
/// The value is the first whitespace-delimited token; anything that does not
/// parse as an integer (notably the v2 literal `max`) means "unlimited".
fn read_scalar_metric(location: &CgroupLocation, metric: Metric) -> Result<u64> {
    let path = location.metric_path(metric)?;
    let contents = fsutil::read_file_bounded(&path, METRIC_READ_LEN)?;
    Ok(parse_scalar(&contents))
}

fn parse_scalar(contents: &str) -> u64 {
    contents
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<u64>().ok())
        .unwrap_or(UNLIMITED)
}
