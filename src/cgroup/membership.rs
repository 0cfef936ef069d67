//! Memory-cgroup discovery for the calling process.
//!
//! Discovery has three steps: parse the per-process membership records from
//! `/proc/self/cgroup`, locate the matching hierarchy mount via
//! [`crate::mountinfo`], and confirm membership by walking the recorded path
//! upwards until a cgroup whose process list contains the caller is found.
//!
//! The walk exists because the recorded leaf path is not always readable as a
//! memory scope in every kernel configuration (e.g., inside containers with a
//! partially visible hierarchy); an ancestor cgroup still legitimately
//! describes the enclosing limits.

use std::io::BufRead;
use std::path::Path;

use crate::fsutil;
use crate::mountinfo;

use super::error::{Error, Result};
use super::generation::CgroupGeneration;
use super::location::{CgroupLocation, join_cgroup_path};

/// Default location of the per-process cgroup membership records.
pub const PROC_SELF_CGROUP: &str = "/proc/self/cgroup";
/// Default location of the mount table.
pub const PROC_SELF_MOUNTINFO: &str = "/proc/self/mountinfo";

/// Cgroup paths recorded for one process in `/proc/<pid>/cgroup`.
///
/// Each record has the form `<hierarchy-id>:<controller-list>:<path>`. A
/// process has at most one v1 memory-controller record and at most one
/// unified record (`0::<path>`); either or both may be absent.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProcessCgroupPaths {
    /// Path of the v1 memory-controller hierarchy, if the process has one.
    pub v1_memory: Option<String>,
    /// Path of the unified (v2) hierarchy, if the process has one.
    pub v2: Option<String>,
}

impl ProcessCgroupPaths {
    /// Parses the membership records of the calling process.
    ///
    /// # Errors
    ///
    /// Fails if the membership file cannot be opened or read; without it no
    /// cgroup query can proceed.
    pub fn from_proc(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = fsutil::open_file_reader(path)?;
        Self::from_reader(reader, path)
    }

    /// Parses membership records from a reader.
    ///
    /// The v2 record is identified by its empty controller list (hierarchy ID
    /// `0`); a v1 record is relevant only if its comma-separated controller
    /// list contains the `memory` token. Records for other controllers are
    /// skipped, as are malformed lines.
    fn from_reader<R: BufRead>(mut reader: R, origin: &Path) -> Result<Self> {
        let mut paths = Self::default();
        let mut line = String::new();

        while reader
            .read_line(&mut line)
            .map_err(|source| Error::ReadLine {
                path: origin.to_path_buf(),
                source,
            })?
            != 0
        {
            let mut fields = line.trim_end().splitn(3, ':');
            if let (Some(hierarchy), Some(controllers), Some(path)) =
                (fields.next(), fields.next(), fields.next())
            {
                if hierarchy == "0" && controllers.is_empty() {
                    paths.v2 = Some(path.to_owned());
                } else if controllers.split(',').any(|c| c == "memory") {
                    paths.v1_memory = Some(path.to_owned());
                }
            }

            line.clear();
        }

        Ok(paths)
    }

    /// Returns the recorded path for the given generation.
    fn for_generation(&self, generation: CgroupGeneration) -> Option<&str> {
        match generation {
            CgroupGeneration::Legacy => self.v1_memory.as_deref(),
            CgroupGeneration::Unified => self.v2.as_deref(),
        }
    }
}

/// Removes the first path segment, e.g. `/a/b/c` -> `/b/c` and `/a` -> `/`.
///
/// Returns a subslice of the input; `None` once the path is reduced to `/`
/// and no further segment can be removed.
fn strip_front_segment(path: &str) -> Option<&str> {
    if path.is_empty() || path == "/" {
        return None;
    }
    match path[1..].find('/') {
        Some(idx) => Some(&path[1 + idx..]),
        None => Some("/"),
    }
}

/// Returns `true` if `pid` is listed in the generation-appropriate membership
/// file of the cgroup at `mount + path`.
///
/// An unreadable or absent membership file counts as "not a member" so the
/// walk can continue towards readable ancestors.
fn process_in_cgroup(
    generation: CgroupGeneration,
    mount: &Path,
    path: &str,
    pid: u32,
) -> bool {
    let procs_file = join_cgroup_path(mount, path).join(generation.procs_file());
    let Ok(reader) = fsutil::open_file_reader(&procs_file) else {
        return false;
    };

    reader
        .lines()
        .map_while(std::io::Result::ok)
        .filter_map(|line| line.trim().parse::<u32>().ok())
        .any(|listed| listed == pid)
}

/// Walks from `start` towards the hierarchy root until a cgroup listing `pid`
/// is found.
///
/// Each miss removes exactly one leading path segment; the root path `/` is
/// checked last. Returns the matched path, or `None` if no cgroup on the way
/// up lists the process.
fn confirm_membership(
    generation: CgroupGeneration,
    mount: &Path,
    start: &str,
    pid: u32,
) -> Option<String> {
    let mut current = start;
    loop {
        if process_in_cgroup(generation, mount, current, pid) {
            log::debug!("Process {pid} confirmed in {generation} cgroup `{current}`");
            return Some(current.to_owned());
        }
        current = strip_front_segment(current)?;
    }
}

/// Probes one generation: locate its mount, then confirm membership starting
/// from the recorded path. The located mount is moved into the returned
/// [`CgroupLocation`] rather than copied.
fn try_generation(
    generation: CgroupGeneration,
    mountinfo_path: &Path,
    paths: &ProcessCgroupPaths,
    pid: u32,
) -> Result<Option<CgroupLocation>> {
    let Some(start) = paths.for_generation(generation) else {
        return Ok(None);
    };
    let Some(mount) = mountinfo::find_cgroup_mount(generation, mountinfo_path)? else {
        return Ok(None);
    };

    Ok(confirm_membership(generation, &mount, start, pid)
        .map(|path| CgroupLocation::new(generation, mount, path)))
}

/// Resolves the effective memory cgroup of the calling process.
///
/// Equivalent to [`resolve_memory_cgroup_at`] with the live `/proc/self`
/// pseudo-files and the caller's own process ID.
pub fn resolve_memory_cgroup() -> Result<Option<CgroupLocation>> {
    resolve_memory_cgroup_at(
        Path::new(PROC_SELF_MOUNTINFO),
        Path::new(PROC_SELF_CGROUP),
        std::process::id(),
    )
}

/// Resolves the effective memory cgroup for `pid` using the given mount table
/// and membership file.
///
/// The legacy hierarchy is probed first; the unified hierarchy is consulted
/// only if no legacy cgroup confirms the process. When both hierarchies are
/// mounted, per-process classification typically favors the legacy memory
/// controller, so its value is preferred. Note that a unified match reached
/// through this fallback is not cross-checked against the legacy records.
///
/// # Returns
///
/// `Ok(None)` when no memory cgroup lists the process in either generation;
/// callers should fall back to host-wide reporting in that case.
///
/// # Errors
///
/// Fails if the membership file cannot be read or if the mount table cannot
/// be parsed.
pub fn resolve_memory_cgroup_at(
    mountinfo_path: &Path,
    proc_cgroup_path: &Path,
    pid: u32,
) -> Result<Option<CgroupLocation>> {
    let paths = ProcessCgroupPaths::from_proc(proc_cgroup_path)?;

    if let Some(location) = try_generation(CgroupGeneration::Legacy, mountinfo_path, &paths, pid)?
    {
        return Ok(Some(location));
    }

    try_generation(CgroupGeneration::Unified, mountinfo_path, &paths, pid)
}
