use std::path::{Path, PathBuf};

use super::error::Error;
use super::generation::{CgroupGeneration, Metric};

/// Upper bound for a joined metric file path, matching the kernel's
/// `PATH_MAX`.
const MAX_METRIC_PATH_LEN: usize = 4096;

/// A confirmed memory cgroup for one process: the generation, the mount point
/// of the hierarchy, and the cgroup path below it.
///
/// Built by the membership walk in [`super::membership`] and immutable
/// afterwards. A location is only valid for the query that produced it;
/// cgroup membership can change between calls, so locations are never cached.
#[derive(Debug, PartialEq, Eq)]
pub struct CgroupLocation {
    generation: CgroupGeneration,
    mount: PathBuf,
    path: String,
}

impl CgroupLocation {
    pub fn new(generation: CgroupGeneration, mount: PathBuf, path: String) -> Self {
        Self {
            generation,
            mount,
            path,
        }
    }

    pub fn generation(&self) -> CgroupGeneration {
        self.generation
    }

    pub fn mount(&self) -> &Path {
        &self.mount
    }

    /// Cgroup path relative to the mount point, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the full path of the given metric's file for this cgroup.
    ///
    /// Joins mount point, cgroup path, and the generation-specific file name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathTooLong`] if the joined path exceeds `PATH_MAX`;
    /// a truncated path must never be handed to the filesystem.
    pub fn metric_path(&self, metric: Metric) -> Result<PathBuf, Error> {
        let full = join_cgroup_path(&self.mount, &self.path).join(metric.file_name(self.generation));
        if full.as_os_str().len() >= MAX_METRIC_PATH_LEN {
            return Err(Error::PathTooLong { path: full });
        }
        Ok(full)
    }
}

/// Joins an absolute cgroup path (leading `/`) onto a mount point.
///
/// `Path::join` would discard the mount point when handed an absolute path,
/// so the leading slash is stripped first. The root cgroup path `/` joins to
/// the mount point itself.
pub(super) fn join_cgroup_path(mount: &Path, cgroup_path: &str) -> PathBuf {
    let relative = cgroup_path.trim_start_matches('/');
    if relative.is_empty() {
        mount.to_path_buf()
    } else {
        mount.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_path_joins_mount_path_and_file() {
        let location = CgroupLocation::new(
            CgroupGeneration::Unified,
            PathBuf::from("/sys/fs/cgroup"),
            "/user.slice/user-0.slice".to_owned(),
        );
        let path = location.metric_path(Metric::MemoryCurrent).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/sys/fs/cgroup/user.slice/user-0.slice/memory.current")
        );
    }

    #[test]
    fn test_metric_path_for_root_cgroup() {
        let location = CgroupLocation::new(
            CgroupGeneration::Legacy,
            PathBuf::from("/sys/fs/cgroup/memory"),
            "/".to_owned(),
        );
        let path = location.metric_path(Metric::MemoryLimit).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/sys/fs/cgroup/memory/memory.limit_in_bytes")
        );
    }

    #[test]
    fn test_metric_path_too_long() {
        let deep = format!("/{}", "x".repeat(MAX_METRIC_PATH_LEN));
        let location =
            CgroupLocation::new(CgroupGeneration::Unified, PathBuf::from("/sys/fs/cgroup"), deep);
        let err = location.metric_path(Metric::Stat).unwrap_err();
        matches!(err, Error::PathTooLong { .. });
    }

    #[test]
    fn test_join_cgroup_path_keeps_mount_prefix() {
        let joined = join_cgroup_path(Path::new("/sys/fs/cgroup/memory"), "/a/b");
        assert_eq!(joined, PathBuf::from("/sys/fs/cgroup/memory/a/b"));
    }
}
