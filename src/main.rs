/// Entry point for the cgroup-meminfo tool.
///
/// Prints a `/proc/meminfo`-shaped report whose memory and swap figures are
/// scoped to the memory cgroup confining this process. Falls back to the
/// unmodified host report when the process is not in a memory cgroup.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug cargo run
/// ```
fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    cgroup_meminfo::run()
}
