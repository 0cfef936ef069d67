//! Mountinfo line parser for Linux systems.
//!
//! Parses lines in `/proc/[pid]/mountinfo` format. See
//! [`proc_pid_mountinfo(5)`](https://man7.org/linux/man-pages/man5/proc_pid_mountinfo.5.html)
//! for details on the structure.
//!
//! Only the fields the cgroup mount search consumes are retained: the mount
//! point, the filesystem type, and the superblock options (which carry the
//! enabled controller list for cgroup v1 mounts).

/// Represents a parsed mountinfo line.
#[derive(Debug, PartialEq, Eq)]
pub struct MountInfo<'a> {
    /// Mount point relative to the process's root.
    pub mount_point: &'a str,
    /// Filesystem type (e.g., `cgroup`, `cgroup2`).
    pub fs_type: &'a str,
    /// Superblock options (comma-separated).
    pub super_options: &'a str,
}

impl MountInfo<'_> {
    /// Returns `true` if the comma-separated superblock option list contains
    /// `option` as an exact token.
    ///
    /// Cgroup v1 mounts list their enabled controllers here, e.g.
    /// `rw,nosuid,memory` for a memory-controller hierarchy. Token matching
    /// avoids false positives from options that merely embed the name.
    pub fn has_super_option(&self, option: &str) -> bool {
        self.super_options.split(',').any(|opt| opt == option)
    }
}

/// Named fields in a mountinfo line.
#[derive(Debug)]
pub enum MountInfoField {
    MountPoint,
    FsType,
    SuperOptions,
}

impl std::fmt::Display for MountInfoField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MountInfoField::MountPoint => "mount_point",
            MountInfoField::FsType => "fs_type",
            MountInfoField::SuperOptions => "super_options",
        };
        write!(f, "{name}")
    }
}

/// Errors that may occur when parsing a mountinfo line.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("missing separator ` - ` in line: `{0}`")]
    MissingSeparator(String),

    #[error("missing `{field}` in line: `{line}`")]
    MissingField { field: MountInfoField, line: String },
}

/// Parses a single line of mountinfo data.
///
/// The line must follow the Linux kernel format described in
/// [`proc_pid_mountinfo(5)`](https://man7.org/linux/man-pages/man5/proc_pid_mountinfo.5.html).
/// The mount point is the fifth whitespace-separated field before the ` - `
/// separator; the filesystem type is the first field after it, and the
/// superblock options are the third. Parsing borrows from the input line and
/// does not allocate.
///
/// # Arguments
///
/// * `line` - A single line from `/proc/[pid]/mountinfo`.
///
/// # Returns
///
/// On success, returns a [`MountInfo`] struct referencing fields in the original input line.
///
/// # Errors
///
/// Returns [`ParseError`] variants for missing separator or required fields.
pub fn parse_mount_info_line(line: &str) -> Result<MountInfo<'_>, ParseError> {
    let (pre, post) = line
        .split_once(" - ")
        .ok_or_else(|| ParseError::MissingSeparator(line.to_owned()))?;

    // mount ID, parent ID, major:minor, and root precede the mount point.
    let mount_point =
        pre.split_whitespace()
            .nth(4)
            .ok_or_else(|| ParseError::MissingField {
                field: MountInfoField::MountPoint,
                line: line.to_owned(),
            })?;

    let mut post_fields = post.split_whitespace();
    let fs_type = post_fields.next().ok_or_else(|| ParseError::MissingField {
        field: MountInfoField::FsType,
        line: line.to_owned(),
    })?;
    let super_options = post_fields
        .nth(1)
        .ok_or_else(|| ParseError::MissingField {
            field: MountInfoField::SuperOptions,
            line: line.to_owned(),
        })?;

    Ok(MountInfo {
        mount_point,
        fs_type,
        super_options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_mountinfo_line() {
        let line = "42 35 0:22 / /mnt rw,nosuid - ext4 /dev/sda1 rw,data=ordered";
        let result = parse_mount_info_line(line).unwrap();

        assert_eq!(result.mount_point, "/mnt");
        assert_eq!(result.fs_type, "ext4");
        assert_eq!(result.super_options, "rw,data=ordered");
    }

    #[test]
    fn parses_cgroup_v1_memory_line() {
        let line = "39 30 0:34 / /sys/fs/cgroup/memory rw,nosuid,nodev,noexec,relatime shared:18 - cgroup cgroup rw,memory";
        let result = parse_mount_info_line(line).unwrap();

        assert_eq!(result.mount_point, "/sys/fs/cgroup/memory");
        assert_eq!(result.fs_type, "cgroup");
        assert!(result.has_super_option("memory"));
    }

    #[test]
    fn super_option_token_does_not_match_substring() {
        let line = "39 30 0:34 / /sys/fs/cgroup/misc rw - cgroup cgroup rw,memory_recursiveprot";
        let result = parse_mount_info_line(line).unwrap();
        assert!(!result.has_super_option("memory"));
    }

    #[test]
    fn parses_line_with_multiple_optional_fields() {
        let line = "70 56 0:45 / /var rw,nosuid,nodev,noexec,relatime shared:20 master:1 - ext4 /dev/sdb1 rw,errors=remount-ro";
        let result = parse_mount_info_line(line).unwrap();
        assert_eq!(result.mount_point, "/var");
        assert_eq!(result.fs_type, "ext4");
        assert_eq!(result.super_options, "rw,errors=remount-ro");
    }

    #[test]
    fn error_on_missing_separator() {
        let line = "42 35 0:22 / /mnt rw,nosuid ext4 /dev/sda1 rw";
        let err = parse_mount_info_line(line).unwrap_err();
        matches!(err, ParseError::MissingSeparator(_));
    }

    #[test]
    fn error_on_missing_mount_point() {
        let line = "42 35 0:22 / - ext4 /dev/sda1 rw";
        let err = parse_mount_info_line(line).unwrap_err();
        match err {
            ParseError::MissingField { field, .. } => {
                assert_eq!(field.to_string(), "mount_point");
            }
            _ => panic!("Expected MissingField"),
        }
    }

    #[test]
    fn error_on_missing_super_options() {
        let line = "42 35 0:22 / /mnt - ext4 /dev/sda1";
        let err = parse_mount_info_line(line).unwrap_err();
        match err {
            ParseError::MissingField { field, .. } => {
                assert_eq!(field.to_string(), "super_options");
            }
            _ => panic!("Expected MissingField"),
        }
    }

    #[test]
    fn error_on_empty_line() {
        let err = parse_mount_info_line("").unwrap_err();
        matches!(err, ParseError::MissingSeparator(_));
    }
}
