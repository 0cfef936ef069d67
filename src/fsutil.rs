use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Error that occurs when opening a file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to open file `{path}`: {source}")]
pub struct FileOpenError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Error that occurs when reading a file fails.
#[derive(Debug, thiserror::Error)]
pub enum FileReadError {
    #[error(transparent)]
    Open(#[from] FileOpenError),
    #[error("failed to read file `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Opens a file at the given path and wraps it in a [`BufReader`].
///
/// # Errors
///
/// Returns a [`FileOpenError`] if the file cannot be opened.
///
/// # Example
/// ```no_run
/// # use cgroup_meminfo::fsutil;
/// let reader = fsutil::open_file_reader("/some/file.txt")?;
/// # Ok::<(), fsutil::FileOpenError>(())
/// ```
pub fn open_file_reader(path: impl AsRef<Path>) -> Result<BufReader<File>, FileOpenError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FileOpenError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Reads at most `max_len` bytes of a pseudo-file into a `String`.
///
/// Cgroup and procfs metric files are small single-read files; the bound keeps
/// a misbehaving path from pulling unbounded data into memory.
///
/// # Errors
///
/// Returns a [`FileReadError`] if the file cannot be opened or read.
pub fn read_file_bounded(path: impl AsRef<Path>, max_len: usize) -> Result<String, FileReadError> {
    let path = path.as_ref();
    let reader = open_file_reader(path)?;
    let mut buf = String::with_capacity(max_len.min(256));
    reader
        .take(max_len as u64)
        .read_to_string(&mut buf)
        .map_err(|source| FileReadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(buf)
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::io::Write;

    #[test]
    fn test_open_file_reader_success() {
        let tmp = tempfile::NamedTempFile::new().expect("failed to create temp file");
        let path = tmp.path();
        let reader = open_file_reader(path).expect("should open test file");
        let metadata = reader.get_ref().metadata().unwrap();
        assert!(metadata.is_file());
    }

    #[test]
    fn test_open_file_reader_error() {
        let result = open_file_reader("/definitely/does/not/exist");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.path, PathBuf::from("/definitely/does/not/exist"));
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_read_file_bounded_full_content() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "8192\n").unwrap();
        let content = read_file_bounded(tmp.path(), 8192).unwrap();
        assert_eq!(content, "8192\n");
    }

    #[test]
    fn test_read_file_bounded_truncates_at_limit() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "0123456789").unwrap();
        let content = read_file_bounded(tmp.path(), 4).unwrap();
        assert_eq!(content, "0123");
    }

    #[test]
    fn test_read_file_bounded_missing_file() {
        let err = read_file_bounded("/definitely/does/not/exist", 16).unwrap_err();
        matches!(err, FileReadError::Open(_));
    }
}
