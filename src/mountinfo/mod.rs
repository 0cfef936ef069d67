mod detect;
mod error;
mod parser;

pub use detect::find_cgroup_mount;
pub use error::{Error, Result};
