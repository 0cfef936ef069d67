//! Parser for the cgroup `memory.stat` breakdown file.
//!
//! `memory.stat` is a multi-line `<key> <value>` file, but the key vocabulary
//! differs between the two cgroup generations: v1 prefixes its
//! hierarchy-inclusive counters with `total_`, v2 uses bare names, and a few
//! counters only exist on one side (`total_rss_huge` is v1-only; the slab
//! counters are v2-only). This module normalizes both vocabularies into one
//! [`MemoryStat`] structure.
//!
//! Parsing is deliberately lenient: the kernel keeps adding keys, so lines
//! with unknown keys, missing values, or non-numeric values are skipped
//! rather than rejected. Counters whose key never appears stay zero.

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::LazyLock;

use crate::cgroup::generation::CgroupGeneration;

/// Normalized memory counters from `memory.stat`, in bytes.
///
/// Counters absent from the active generation's vocabulary remain zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryStat {
    /// Page-cache memory. `total_cache` (v1) / `file` (v2).
    pub cache: u64,
    /// Transparent hugepage-backed anonymous memory. v1 only (`total_rss_huge`).
    pub rss_huge: u64,
    /// Shared memory. `total_shmem` (v1) / `shmem` (v2).
    pub shmem: u64,
    /// Memory-mapped file data. `total_mapped_file` (v1) / `file_mapped` (v2).
    pub mapped_file: u64,
    /// Dirty page cache awaiting writeback. `total_dirty` (v1) / `file_dirty` (v2).
    pub dirty: u64,
    /// Pages under writeback. `total_writeback` (v1) / `file_writeback` (v2).
    pub writeback: u64,
    /// Inactive anonymous memory.
    pub inactive_anon: u64,
    /// Active anonymous memory.
    pub active_anon: u64,
    /// Inactive file-backed memory.
    pub inactive_file: u64,
    /// Active file-backed memory.
    pub active_file: u64,
    /// Memory that cannot be reclaimed (e.g., mlocked).
    pub unevictable: u64,
    /// Reclaimable slab memory. v2 only.
    pub slab_reclaimable: u64,
    /// Unreclaimable slab memory. v2 only.
    pub slab_unreclaimable: u64,
    /// Total slab memory. v2 only.
    pub slab: u64,
}

impl MemoryStat {
    fn set_cache(&mut self, v: u64) {
        self.cache = v;
    }

    fn set_rss_huge(&mut self, v: u64) {
        self.rss_huge = v;
    }

    fn set_shmem(&mut self, v: u64) {
        self.shmem = v;
    }

    fn set_mapped_file(&mut self, v: u64) {
        self.mapped_file = v;
    }

    fn set_dirty(&mut self, v: u64) {
        self.dirty = v;
    }

    fn set_writeback(&mut self, v: u64) {
        self.writeback = v;
    }

    fn set_inactive_anon(&mut self, v: u64) {
        self.inactive_anon = v;
    }

    fn set_active_anon(&mut self, v: u64) {
        self.active_anon = v;
    }

    fn set_inactive_file(&mut self, v: u64) {
        self.inactive_file = v;
    }

    fn set_active_file(&mut self, v: u64) {
        self.active_file = v;
    }

    fn set_unevictable(&mut self, v: u64) {
        self.unevictable = v;
    }

    fn set_slab_reclaimable(&mut self, v: u64) {
        self.slab_reclaimable = v;
    }

    fn set_slab_unreclaimable(&mut self, v: u64) {
        self.slab_unreclaimable = v;
    }

    fn set_slab(&mut self, v: u64) {
        self.slab = v;
    }
}

type Setter = fn(&mut MemoryStat, u64);

/// One logical counter and its per-generation key names. `None` marks a
/// counter the generation does not report.
struct KeyMapping {
    v1_key: Option<&'static str>,
    v2_key: Option<&'static str>,
    setter: Setter,
}

static KEY_MAPPINGS: &[KeyMapping] = &[
    KeyMapping {
        v1_key: Some("total_cache"),
        v2_key: Some("file"),
        setter: MemoryStat::set_cache,
    },
    KeyMapping {
        v1_key: Some("total_rss_huge"),
        v2_key: None,
        setter: MemoryStat::set_rss_huge,
    },
    KeyMapping {
        v1_key: Some("total_shmem"),
        v2_key: Some("shmem"),
        setter: MemoryStat::set_shmem,
    },
    KeyMapping {
        v1_key: Some("total_mapped_file"),
        v2_key: Some("file_mapped"),
        setter: MemoryStat::set_mapped_file,
    },
    KeyMapping {
        v1_key: Some("total_dirty"),
        v2_key: Some("file_dirty"),
        setter: MemoryStat::set_dirty,
    },
    KeyMapping {
        v1_key: Some("total_writeback"),
        v2_key: Some("file_writeback"),
        setter: MemoryStat::set_writeback,
    },
    KeyMapping {
        v1_key: Some("total_inactive_anon"),
        v2_key: Some("inactive_anon"),
        setter: MemoryStat::set_inactive_anon,
    },
    KeyMapping {
        v1_key: Some("total_active_anon"),
        v2_key: Some("active_anon"),
        setter: MemoryStat::set_active_anon,
    },
    KeyMapping {
        v1_key: Some("total_inactive_file"),
        v2_key: Some("inactive_file"),
        setter: MemoryStat::set_inactive_file,
    },
    KeyMapping {
        v1_key: Some("total_active_file"),
        v2_key: Some("active_file"),
        setter: MemoryStat::set_active_file,
    },
    KeyMapping {
        v1_key: Some("total_unevictable"),
        v2_key: Some("unevictable"),
        setter: MemoryStat::set_unevictable,
    },
    KeyMapping {
        v1_key: None,
        v2_key: Some("slab_reclaimable"),
        setter: MemoryStat::set_slab_reclaimable,
    },
    KeyMapping {
        v1_key: None,
        v2_key: Some("slab_unreclaimable"),
        setter: MemoryStat::set_slab_unreclaimable,
    },
    KeyMapping {
        v1_key: None,
        v2_key: Some("slab"),
        setter: MemoryStat::set_slab,
    },
];

fn build_setters(
    key_for: fn(&KeyMapping) -> Option<&'static str>,
) -> HashMap<&'static str, Setter> {
    KEY_MAPPINGS
        .iter()
        .filter_map(|mapping| key_for(mapping).map(|key| (key, mapping.setter)))
        .collect()
}

static V1_SETTERS: LazyLock<HashMap<&'static str, Setter>> =
    LazyLock::new(|| build_setters(|m| m.v1_key));

static V2_SETTERS: LazyLock<HashMap<&'static str, Setter>> =
    LazyLock::new(|| build_setters(|m| m.v2_key));

impl MemoryStat {
    /// Parses a `memory.stat` blob from a buffered reader using the key
    /// vocabulary of the given generation.
    ///
    /// Each line is expected to be `<key> <integer>` separated by whitespace.
    /// Lines that do not fit that shape, carry an unknown key, or carry a
    /// non-numeric value are skipped silently.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading from the underlying source fails.
    pub fn from_reader<R: BufRead>(
        buf: &mut R,
        generation: CgroupGeneration,
    ) -> std::io::Result<Self> {
        let setters = match generation {
            CgroupGeneration::Legacy => &*V1_SETTERS,
            CgroupGeneration::Unified => &*V2_SETTERS,
        };

        let mut stat = Self::default();
        let mut line = String::new();
        while buf.read_line(&mut line)? != 0 {
            let mut parts = line.split_whitespace();
            if let (Some(key), Some(value)) = (parts.next(), parts.next())
                && let Some(setter) = setters.get(key)
                && let Ok(parsed) = value.parse::<u64>()
            {
                setter(&mut stat, parsed);
            }

            line.clear();
        }

        Ok(stat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_stat() {
        let data = "";
        let stat =
            MemoryStat::from_reader(&mut data.as_bytes(), CgroupGeneration::Unified).unwrap();
        assert_eq!(stat, MemoryStat::default());
    }

    #[test]
    fn test_parse_complete_v1_stat() {
        let data = "\
total_cache 1000
total_rss_huge 2000
total_shmem 300
total_mapped_file 400
total_dirty 500
total_writeback 600
total_inactive_anon 700
total_active_anon 800
total_inactive_file 900
total_active_file 1100
total_unevictable 1200
";
        let stat =
            MemoryStat::from_reader(&mut data.as_bytes(), CgroupGeneration::Legacy).unwrap();
        assert_eq!(stat.cache, 1000);
        assert_eq!(stat.rss_huge, 2000);
        assert_eq!(stat.shmem, 300);
        assert_eq!(stat.mapped_file, 400);
        assert_eq!(stat.dirty, 500);
        assert_eq!(stat.writeback, 600);
        assert_eq!(stat.inactive_anon, 700);
        assert_eq!(stat.active_anon, 800);
        assert_eq!(stat.inactive_file, 900);
        assert_eq!(stat.active_file, 1100);
        assert_eq!(stat.unevictable, 1200);
        // Slab counters do not exist in the v1 vocabulary.
        assert_eq!(stat.slab, 0);
        assert_eq!(stat.slab_reclaimable, 0);
        assert_eq!(stat.slab_unreclaimable, 0);
    }

    #[test]
    fn test_parse_complete_v2_stat() {
        let data = "\
file 1000
shmem 300
file_mapped 400
file_dirty 500
file_writeback 600
inactive_anon 700
active_anon 800
inactive_file 900
active_file 1100
unevictable 1200
slab_reclaimable 1300
slab_unreclaimable 1400
slab 2700
";
        let stat =
            MemoryStat::from_reader(&mut data.as_bytes(), CgroupGeneration::Unified).unwrap();
        assert_eq!(stat.cache, 1000);
        assert_eq!(stat.shmem, 300);
        assert_eq!(stat.mapped_file, 400);
        assert_eq!(stat.dirty, 500);
        assert_eq!(stat.writeback, 600);
        assert_eq!(stat.inactive_anon, 700);
        assert_eq!(stat.active_anon, 800);
        assert_eq!(stat.inactive_file, 900);
        assert_eq!(stat.active_file, 1100);
        assert_eq!(stat.unevictable, 1200);
        assert_eq!(stat.slab_reclaimable, 1300);
        assert_eq!(stat.slab_unreclaimable, 1400);
        assert_eq!(stat.slab, 2700);
        // total_rss_huge exists only in the v1 vocabulary.
        assert_eq!(stat.rss_huge, 0);
    }

    #[test]
    fn test_v1_keys_ignored_under_v2_vocabulary() {
        let data = "total_cache 1000\nfile 2000\n";
        let stat =
            MemoryStat::from_reader(&mut data.as_bytes(), CgroupGeneration::Unified).unwrap();
        assert_eq!(stat.cache, 2000);
    }

    #[test]
    fn test_v1_non_hierarchical_keys_are_not_matched() {
        // v1 memory.stat carries both `cache` and `total_cache`; only the
        // hierarchy-inclusive counter feeds the report.
        let data = "cache 111\ntotal_cache 222\n";
        let stat =
            MemoryStat::from_reader(&mut data.as_bytes(), CgroupGeneration::Legacy).unwrap();
        assert_eq!(stat.cache, 222);
    }

    #[test]
    fn test_unparsable_lines_are_skipped() {
        let data = "\
garbage
total_cache abc
total_shmem
total_dirty 500
";
        let stat =
            MemoryStat::from_reader(&mut data.as_bytes(), CgroupGeneration::Legacy).unwrap();
        assert_eq!(stat.cache, 0);
        assert_eq!(stat.shmem, 0);
        assert_eq!(stat.dirty, 500);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let data = "\
anon 1000
some_future_counter 12345
file 2000
";
        let stat =
            MemoryStat::from_reader(&mut data.as_bytes(), CgroupGeneration::Unified).unwrap();
        assert_eq!(stat.cache, 2000);
    }

    #[test]
    fn test_extra_whitespace() {
        let data = "    file     1000\nshmem     300\n";
        let stat =
            MemoryStat::from_reader(&mut data.as_bytes(), CgroupGeneration::Unified).unwrap();
        assert_eq!(stat.cache, 1000);
        assert_eq!(stat.shmem, 300);
    }
}
