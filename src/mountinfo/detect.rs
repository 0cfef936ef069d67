use crate::cgroup::CgroupGeneration;
use crate::fsutil;

use super::parser::parse_mount_info_line;
use super::{Error, Result};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Finds the mount point of the requested cgroup generation by parsing a
/// Linux `mountinfo` file.
///
/// [`CgroupGeneration::Unified`] matches the first mount with filesystem type
/// `cgroup2`. [`CgroupGeneration::Legacy`] matches the first mount with
/// filesystem type `cgroup` whose superblock options list the `memory`
/// controller; other v1 hierarchies are skipped.
///
/// # Arguments
///
/// * `generation` - The cgroup generation to look for.
/// * `path` - Path to a Linux mountinfo file (e.g., `/proc/self/mountinfo`).
///
/// # Returns
///
/// `Ok(Some(mount_point))` on a match, or `Ok(None)` when the generation is
/// not mounted at all. The latter is a normal outcome on single-generation
/// systems (a v2-only host has no v1 memory hierarchy and vice versa) and
/// must not be treated as a failure.
///
/// # Errors
///
/// - [`Error::FileOpen`] if the file can't be opened.
/// - [`Error::ReadLine`] if reading from the file fails.
/// - [`Error::Parse`] if parsing any line fails.
///
/// # Example
///
/// ```no_run
/// use cgroup_meminfo::cgroup::CgroupGeneration;
/// use cgroup_meminfo::mountinfo::find_cgroup_mount;
///
/// let mount = find_cgroup_mount(CgroupGeneration::Unified, "/proc/self/mountinfo").unwrap();
/// if let Some(mount) = mount {
///     println!("cgroup2 root: {}", mount.display());
/// }
/// ```
pub fn find_cgroup_mount(
    generation: CgroupGeneration,
    path: impl AsRef<Path>,
) -> Result<Option<PathBuf>> {
    let path = path.as_ref();
    let buf = fsutil::open_file_reader(path)?;

    find_cgroup_mount_from_reader(generation, buf, path)
}

/// Internal implementation for locating a cgroup mount point from a reader.
///
/// # Arguments
///
/// * `generation` - The cgroup generation to look for.
/// * `reader` - Buffered reader over the mountinfo content.
/// * `origin` - Logical origin of the data, used in error messages.
fn find_cgroup_mount_from_reader<R: BufRead>(
    generation: CgroupGeneration,
    mut reader: R,
    origin: &Path,
) -> Result<Option<PathBuf>> {
    let mut line = String::with_capacity(256);

    while reader
        .read_line(&mut line)
        .map_err(|source| Error::ReadLine {
            path: origin.to_path_buf(),
            source,
        })?
        != 0
    {
        let mount_info = parse_mount_info_line(line.trim_end()).map_err(|source| Error::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

        let matches = match generation {
            CgroupGeneration::Unified => mount_info.fs_type == "cgroup2",
            CgroupGeneration::Legacy => {
                mount_info.fs_type == "cgroup" && mount_info.has_super_option("memory")
            }
        };
        if matches {
            log::debug!(
                "Found {generation} cgroup mount point: {}",
                mount_info.mount_point
            );
            return Ok(Some(PathBuf::from(mount_info.mount_point)));
        }

        line.clear();
    }

    Ok(None)
}
