//! Cgroup Meminfo: a cgroup-aware substitute for `/proc/meminfo`.
//!
//! Processes confined to a memory cgroup (containers, slices with memory
//! limits) still see host-wide numbers in `/proc/meminfo`, which misleads
//! every tool that plans against capacity. This library rebuilds the report
//! from the process's own memory cgroup: it discovers the effective cgroup
//! across both API generations, reads and normalizes the memory-controller
//! accounting files, and rewrites the host report line by line with
//! cgroup-scoped values while leaving untracked fields intact.
//!
//! [`report::render_report`] is the single query entry point; everything
//! below it re-reads the filesystem per call and shares no state between
//! queries.

pub mod cgroup;
pub mod fsutil;
pub mod mountinfo;
pub mod report;

pub use report::{Error, render_report};

/// Runs the cgroup-meminfo binary: prints the corrected report to stdout.
///
/// When no memory cgroup applies to this process, the unmodified host report
/// is printed instead, mirroring what a host-wide tool would show.
///
/// # Errors
///
/// Returns an error if the report cannot be built for any reason other than
/// the absence of a memory cgroup.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    match report::render_report(report::DEFAULT_REPORT_LEN) {
        Ok(report) => {
            print!("{report}");
            Ok(())
        }
        Err(report::Error::NotFound) => {
            log::info!("no memory cgroup applies to this process; printing the host report");
            let host = std::fs::read_to_string(report::PROC_MEMINFO)?;
            print!("{host}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
