use std::path::PathBuf;

use crate::fsutil;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    FileOpen(#[from] fsutil::FileOpenError),
    #[error(transparent)]
    FileRead(#[from] fsutil::FileReadError),
    #[error("failed to read line for file `{path}`: {source}")]
    ReadLine {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Mount(#[from] crate::mountinfo::Error),
    #[error("joined cgroup metric path `{path}` exceeds PATH_MAX")]
    PathTooLong { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
