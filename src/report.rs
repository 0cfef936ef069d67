//! Rewrites the host `/proc/meminfo` report with cgroup-scoped values.
//!
//! The host file serves as the template: every line whose label belongs to
//! the fixed set below is re-emitted with the value taken from the cgroup's
//! [`MemoryAccounting`] snapshot, formatted in the procfs column convention;
//! every other line passes through byte-for-byte, so fields this crate does
//! not track (and fields future kernels add) keep their host values.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::cgroup::{self, MemoryAccounting};
use crate::fsutil;

/// Default location of the host memory report.
pub const PROC_MEMINFO: &str = "/proc/meminfo";

/// Default output bound, sized like the raw host report with headroom.
pub const DEFAULT_REPORT_LEN: usize = 8192;

const BYTES_PER_KB: u64 = 1024;

/// Errors of one report query.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No memory cgroup lists the calling process; the caller should fall
    /// back to the unmodified host report.
    #[error("no memory cgroup found for this process")]
    NotFound,
    #[error("report length bound must be nonzero")]
    InvalidLength,
    #[error(transparent)]
    Cgroup(#[from] cgroup::Error),
    #[error(transparent)]
    FileOpen(#[from] fsutil::FileOpenError),
    #[error("failed to read line for file `{path}`: {source}")]
    ReadLine {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The rewritten report would exceed the caller's length bound. Partial
    /// output is discarded; a truncated report must never be consumed.
    #[error("rewritten report exceeds the {limit}-byte bound")]
    Overflow { limit: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Builds the cgroup-corrected memory report for the calling process.
///
/// This is the one atomic query: resolve the process's memory cgroup, collect
/// its accounting snapshot, and rewrite the live host report. Nothing is
/// cached between calls; each query re-reads the filesystem.
///
/// # Arguments
///
/// * `max_len` - Upper bound for the rewritten report, in bytes.
///
/// # Errors
///
/// - [`Error::NotFound`] when the process belongs to no readable memory
///   cgroup in either generation (fall back to [`PROC_MEMINFO`]).
/// - [`Error::InvalidLength`] when `max_len` is zero.
/// - Filesystem and overflow errors as described on [`Error`].
pub fn render_report(max_len: usize) -> Result<String> {
    if max_len == 0 {
        return Err(Error::InvalidLength);
    }

    let location = cgroup::resolve_memory_cgroup()?.ok_or(Error::NotFound)?;
    let accounting = MemoryAccounting::collect(&location)?;

    let meminfo_path = Path::new(PROC_MEMINFO);
    let host = fsutil::open_file_reader(meminfo_path)?;
    rewrite(&accounting, host, meminfo_path, max_len)
}

/// Rewrites the host meminfo template with cgroup-scoped values.
///
/// The host's own MemTotal/SwapTotal values cap the cgroup ceilings inside
/// this pass: a cgroup limit can never exceed physical memory, and an
/// unlimited cgroup degrades to the host totals. Because `/proc/meminfo`
/// lists the totals before the derived lines, the capped values feed
/// MemFree, MemAvailable, and SwapFree further down.
pub(crate) fn rewrite<R: BufRead>(
    accounting: &MemoryAccounting,
    mut host: R,
    origin: &Path,
    max_len: usize,
) -> Result<String> {
    let stat = &accounting.stat;
    let mut mem_limit = accounting.memory_limit / BYTES_PER_KB;
    let mem_usage = accounting.memory_current / BYTES_PER_KB;
    let mut swap_total = accounting.swap_limit / BYTES_PER_KB;
    let swap_usage = accounting.swap_current / BYTES_PER_KB;

    let mut out = String::with_capacity(max_len.min(DEFAULT_REPORT_LEN));
    let mut line = String::with_capacity(64);

    while host
        .read_line(&mut line)
        .map_err(|source| Error::ReadLine {
            path: origin.to_path_buf(),
            source,
        })?
        != 0
    {
        let substituted = line.split_once(':').and_then(|(label, rest)| {
            let value_kb = match label {
                "MemTotal" => {
                    let host_total = parse_host_kb(rest);
                    if mem_limit == 0 {
                        mem_limit = host_total;
                    }
                    mem_limit = mem_limit.min(host_total);
                    mem_limit
                }
                "MemFree" => mem_limit.saturating_sub(mem_usage),
                "MemAvailable" => {
                    mem_limit.saturating_sub(mem_usage)
                        + (stat.active_file + stat.inactive_file + stat.slab_reclaimable)
                            / BYTES_PER_KB
                }
                "SwapTotal" => {
                    swap_total = swap_total.min(parse_host_kb(rest));
                    swap_total
                }
                "SwapFree" => swap_total.saturating_sub(swap_usage),
                "Slab" => stat.slab / BYTES_PER_KB,
                "Cached" => stat.cache / BYTES_PER_KB,
                // Cgroup accounting has no separate counters for these.
                "Buffers" | "SwapCached" | "ShmemHugePages" | "ShmemPmdMapped" => 0,
                "Active" => (stat.active_anon + stat.active_file) / BYTES_PER_KB,
                "Inactive" => (stat.inactive_anon + stat.inactive_file) / BYTES_PER_KB,
                "Active(anon)" => stat.active_anon / BYTES_PER_KB,
                "Inactive(anon)" => stat.inactive_anon / BYTES_PER_KB,
                "Active(file)" => stat.active_file / BYTES_PER_KB,
                "Inactive(file)" => stat.inactive_file / BYTES_PER_KB,
                "Unevictable" => stat.unevictable / BYTES_PER_KB,
                "Dirty" => stat.dirty / BYTES_PER_KB,
                "Writeback" => stat.writeback / BYTES_PER_KB,
                // Shared memory is file-backed from the cgroup's point of
                // view and must not count as anonymous pages.
                "AnonPages" => {
                    (stat.active_anon + stat.inactive_anon).saturating_sub(stat.shmem)
                        / BYTES_PER_KB
                }
                "Mapped" => stat.mapped_file / BYTES_PER_KB,
                "SReclaimable" => stat.slab_reclaimable / BYTES_PER_KB,
                "SUnreclaim" => stat.slab_unreclaimable / BYTES_PER_KB,
                "Shmem" => stat.shmem / BYTES_PER_KB,
                "AnonHugePages" => stat.rss_huge / BYTES_PER_KB,
                _ => return None,
            };
            Some(format_meminfo_line(label, value_kb))
        });

        let text = substituted.as_deref().unwrap_or(&line);
        if out.len() + text.len() > max_len {
            return Err(Error::Overflow { limit: max_len });
        }
        out.push_str(text);

        line.clear();
    }

    Ok(out)
}

/// Formats one meminfo line in the procfs column convention: the label (with
/// its colon) padded to 15 columns, one space, the value right-aligned in 8.
fn format_meminfo_line(label: &str, value_kb: u64) -> String {
    format!("{:<15} {value_kb:>8} kB\n", format!("{label}:"))
}

/// Extracts the host's numeric value from the remainder of a meminfo line
/// (everything after the label's colon).
fn parse_host_kb(rest: &str) -> u64 {
    rest.split_whitespace()
        .next()
        .and_then(|token| token.parse::<u64>().ok())
        .unwrap_or(0)
}
