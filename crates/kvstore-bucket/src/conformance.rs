//! Behavior every backend and key layout must share, run against all of them.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::{
    new_store, BackendKind, BucketStore, CodecConfig, KeyEncoding, StoreConfig, StoreError,
    StoreState,
};

/// A backend together with the composite key layout it runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    backend: BackendKind,
    encoding: KeyEncoding,
}

const fn layout(backend: BackendKind, encoding: KeyEncoding) -> Layout {
    Layout { backend, encoding }
}

const LAYOUTS: [Layout; 5] = [
    layout(BackendKind::Memory, KeyEncoding::LengthPrefixed),
    layout(BackendKind::Memory, KeyEncoding::Separator),
    layout(BackendKind::Sled, KeyEncoding::LengthPrefixed),
    layout(BackendKind::Sled, KeyEncoding::Separator),
    layout(BackendKind::SledNative, KeyEncoding::LengthPrefixed),
];

impl Layout {
    fn is_persistent(self) -> bool {
        self.backend.is_persistent()
    }

    /// Bucket names may hold any byte, the separator included.
    fn accepts_any_bucket(self) -> bool {
        self.backend == BackendKind::SledNative || self.encoding == KeyEncoding::LengthPrefixed
    }
}

struct Harness {
    layout: Layout,
    store: Arc<dyn BucketStore>,
    path: PathBuf,
    _dir: TempDir,
}

impl Harness {
    fn unopened(layout: Layout) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let config = StoreConfig {
            backend: layout.backend,
            path: path.clone(),
            codec: CodecConfig {
                encoding: layout.encoding,
                ..CodecConfig::default()
            },
            ..StoreConfig::default()
        };
        Self {
            layout,
            store: Arc::from(new_store(&config)),
            path,
            _dir: dir,
        }
    }

    fn open(layout: Layout) -> Self {
        let h = Self::unopened(layout);
        h.store.open(&h.path).unwrap();
        h
    }
}

fn each_layout(mut f: impl FnMut(Harness)) {
    for layout in LAYOUTS {
        f(Harness::open(layout));
    }
}

fn keys(list: &[&[u8]]) -> Vec<Vec<u8>> {
    list.iter().map(|k| k.to_vec()).collect()
}

#[test]
fn test_put_overwrite_and_delete_track_count() {
    each_layout(|h| {
        let s = &h.store;
        s.put(b"bucket", b"key1", b"value1").unwrap();
        s.put(b"bucket", b"key2", b"value2").unwrap();
        s.put(b"bucket", b"key2", b"value22222").unwrap();
        assert_eq!(s.count(b"bucket"), 2, "{:?}", h.layout);
        assert_eq!(s.get(b"bucket", b"key2").unwrap(), b"value22222");

        s.delete(b"bucket", b"key1").unwrap();
        assert_eq!(s.count(b"bucket"), 1);
        assert!(matches!(s.get(b"bucket", b"key1"), Err(StoreError::KeyNotFound)));
        assert_eq!(s.all_keys(b"bucket").unwrap(), keys(&[b"key2"]));
    });
}

#[test]
fn test_next_sequence_counts_from_one() {
    each_layout(|h| {
        let s = &h.store;
        for expected in 1..=5 {
            assert_eq!(s.sequence(b"seq"), expected - 1);
            assert_eq!(s.next_sequence(b"seq").unwrap(), expected, "{:?}", h.layout);
        }
        assert_eq!(s.sequence(b"seq"), 5);
        assert_eq!(s.sequence(b"other"), 0);
    });
}

#[test]
fn test_set_sequence_moves_counter_either_way() {
    each_layout(|h| {
        let s = &h.store;
        for _ in 0..1000 {
            s.next_sequence(b"b").unwrap();
        }
        assert_eq!(s.sequence(b"b"), 1000);

        s.put(b"b", b"k", b"v").unwrap();
        assert_eq!(s.sequence(b"b"), 1000);

        s.set_sequence(b"b", 2000).unwrap();
        assert_eq!(s.next_sequence(b"b").unwrap(), 2001);

        s.set_sequence(b"b", 10).unwrap();
        assert_eq!(s.sequence(b"b"), 10);
        assert_eq!(s.next_sequence(b"b").unwrap(), 11);

        s.set_sequence(b"fresh", 0).unwrap();
        assert_eq!(s.sequence(b"fresh"), 0);
        assert_eq!(s.count(b"fresh"), 0);
    });
}

#[test]
fn test_delete_absent_key_is_not_found() {
    each_layout(|h| {
        let s = &h.store;
        assert!(matches!(s.delete(b"b", b"nope"), Err(StoreError::KeyNotFound)));
        assert_eq!(s.count(b"b"), 0);

        s.put(b"b", b"k", b"v").unwrap();
        s.delete(b"b", b"k").unwrap();
        assert!(matches!(s.delete(b"b", b"k"), Err(StoreError::KeyNotFound)));
        assert_eq!(s.count(b"b"), 0);
    });
}

#[test]
fn test_untouched_bucket_is_empty() {
    each_layout(|h| {
        let s = &h.store;
        assert_eq!(s.count(b"never"), 0);
        assert_eq!(s.sequence(b"never"), 0);
        assert!(s.all_keys(b"never").unwrap().is_empty());
        assert!(matches!(s.get(b"never", b"k"), Err(StoreError::KeyNotFound)));
    });
}

#[test]
fn test_buckets_are_isolated() {
    each_layout(|h| {
        let s = &h.store;
        s.put(b"left", b"shared", b"L").unwrap();
        s.put(b"right", b"shared", b"R").unwrap();
        s.next_sequence(b"left").unwrap();

        s.delete(b"left", b"shared").unwrap();
        assert_eq!(s.get(b"right", b"shared").unwrap(), b"R");
        assert_eq!(s.count(b"left"), 0);
        assert_eq!(s.count(b"right"), 1);
        assert_eq!(s.sequence(b"right"), 0);
    });
}

fn check_buckets_stay_separate(h: &Harness, buckets: &[&[u8]], reserved_looking: &[u8]) {
    let s = &h.store;
    for (i, bucket) in buckets.iter().enumerate() {
        for j in 0..=i {
            s.put(bucket, format!("k{j}").as_bytes(), b"v").unwrap();
        }
        s.put(bucket, reserved_looking, b"v").unwrap();
        s.set_sequence(bucket, i as u64 * 10).unwrap();
    }
    for (i, bucket) in buckets.iter().enumerate() {
        let mut expected: Vec<Vec<u8>> = (0..=i).map(|j| format!("k{j}").into_bytes()).collect();
        expected.push(reserved_looking.to_vec());
        expected.sort();
        assert_eq!(s.all_keys(bucket).unwrap(), expected, "{:?} {bucket:?}", h.layout);
        assert_eq!(s.count(bucket), i as u64 + 2);
        assert_eq!(s.sequence(bucket), i as u64 * 10);
    }
}

#[test]
fn test_adversarial_bucket_names_stay_separate() {
    // Names built from the separator and the counter suffixes; only layouts
    // that accept every bucket name take part.
    let buckets: [&[u8]; 6] = [
        b"a",
        b"a_",
        b"a__key_for_count__",
        b"a\x00",
        b"a\x00\x00k",
        b"\x01a",
    ];
    for layout in LAYOUTS.into_iter().filter(|l| l.accepts_any_bucket()) {
        check_buckets_stay_separate(&Harness::open(layout), &buckets, b"_key_for_count__");
    }
}

#[test]
fn test_separator_layout_keeps_buckets_separate() {
    let buckets: [&[u8]; 5] = [b"a", b"ab", b"akey", b"a\x00", b"\x01a"];
    for layout in LAYOUTS.into_iter().filter(|l| !l.accepts_any_bucket()) {
        let h = Harness::open(layout);
        check_buckets_stay_separate(&h, &buckets, b"__key_for_count__");

        let s = &h.store;
        assert!(matches!(s.put(b"a_", b"x", b"v"), Err(StoreError::InvalidBucket)));
        assert!(matches!(s.next_sequence(b"a_b"), Err(StoreError::InvalidBucket)));
        assert!(matches!(s.put(b"a", b"_key_for_count__", b"v"), Err(StoreError::InvalidKey)));
        assert!(matches!(s.put(b"a", b"_key_for_sequence__", b"v"), Err(StoreError::InvalidKey)));
        assert_eq!(s.count(b"a"), 2);
        assert_eq!(s.all_keys(b"a").unwrap().len(), 2);
    }
}

#[test]
fn test_count_matches_keys_under_mixed_workload() {
    each_layout(|h| {
        let s = &h.store;
        let mut model = BTreeSet::new();
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        for _ in 0..600 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let key = format!("key{:02}", state % 40).into_bytes();
            if state % 3 == 0 {
                let removed = model.remove(&key);
                assert_eq!(s.delete(b"mix", &key).is_ok(), removed);
            } else {
                model.insert(key.clone());
                s.put(b"mix", &key, &state.to_le_bytes()).unwrap();
            }
            assert_eq!(s.count(b"mix"), model.len() as u64);
        }
        let expected: Vec<Vec<u8>> = model.into_iter().collect();
        assert_eq!(s.all_keys(b"mix").unwrap(), expected, "{:?}", h.layout);
    });
}

#[test]
fn test_many_entries() {
    each_layout(|h| {
        let s = &h.store;
        for i in 0..3000u32 {
            s.put(b"bulk", format!("{i:06}").as_bytes(), &i.to_be_bytes())
                .unwrap();
        }
        assert_eq!(s.count(b"bulk"), 3000);
        let all = s.all_keys(b"bulk").unwrap();
        assert_eq!(all.len(), 3000);
        assert_eq!(all[0], b"000000");
        assert_eq!(all[2999], b"002999");
        assert_eq!(
            s.get(b"bulk", b"001234").unwrap(),
            1234u32.to_be_bytes().to_vec()
        );
    });
}

#[test]
fn test_returned_values_are_owned_copies() {
    each_layout(|h| {
        let s = &h.store;
        s.put(b"b", b"k", b"original").unwrap();
        let mut first = s.get(b"b", b"k").unwrap();
        first.copy_from_slice(b"CLOBBER!");
        s.put(b"b", b"k", b"replaced").unwrap();
        assert_eq!(first, b"CLOBBER!");
        assert_eq!(s.get(b"b", b"k").unwrap(), b"replaced");
    });
}

#[test]
fn test_empty_names_are_rejected() {
    each_layout(|h| {
        let s = &h.store;
        assert!(matches!(s.put(b"", b"k", b"v"), Err(StoreError::InvalidBucket)));
        assert!(matches!(s.put(b"b", b"", b"v"), Err(StoreError::InvalidKey)));
        assert!(matches!(s.get(b"b", b""), Err(StoreError::InvalidKey)));
        assert!(matches!(s.delete(b"", b"k"), Err(StoreError::InvalidBucket)));
        assert!(matches!(s.all_keys(b""), Err(StoreError::InvalidBucket)));
        assert!(matches!(s.next_sequence(b""), Err(StoreError::InvalidBucket)));
        assert_eq!(s.count(b""), 0);

        // Empty values are fine.
        s.put(b"b", b"k", b"").unwrap();
        assert_eq!(s.get(b"b", b"k").unwrap(), b"");
        assert_eq!(s.count(b"b"), 1);
    });
}

#[test]
fn test_closed_store_rejects_operations() {
    for layout in LAYOUTS {
        let h = Harness::unopened(layout);
        let s = &h.store;
        assert_eq!(s.state(), StoreState::Unopened);
        assert!(matches!(s.put(b"b", b"k", b"v"), Err(StoreError::Closed)));
        s.close();
        assert_eq!(s.state(), StoreState::Unopened);

        s.open(&h.path).unwrap();
        s.put(b"b", b"k", b"v").unwrap();
        s.close();
        s.close();
        assert_eq!(s.state(), StoreState::Closed);

        assert!(matches!(s.put(b"b", b"k", b"v"), Err(StoreError::Closed)));
        assert!(matches!(s.get(b"b", b"k"), Err(StoreError::Closed)));
        assert!(matches!(s.delete(b"b", b"k"), Err(StoreError::Closed)));
        assert!(matches!(s.all_keys(b"b"), Err(StoreError::Closed)));
        assert!(matches!(s.next_sequence(b"b"), Err(StoreError::Closed)));
        assert!(matches!(s.set_sequence(b"b", 1), Err(StoreError::Closed)));
        assert_eq!(s.count(b"b"), 0);
        assert_eq!(s.sequence(b"b"), 0);
    }
}

#[test]
fn test_open_twice_is_rejected() {
    each_layout(|h| {
        assert!(matches!(h.store.open(&h.path), Err(StoreError::AlreadyOpen)));
        assert!(h.store.is_open());
    });
}

#[test]
fn test_reopen_keeps_persistent_data() {
    for layout in LAYOUTS.into_iter().filter(|l| l.is_persistent()) {
        let h = Harness::open(layout);
        h.store.put(b"b", b"k1", b"v1").unwrap();
        h.store.put(b"b", b"k2", b"v2").unwrap();
        h.store.set_sequence(b"b", 77).unwrap();
        h.store.close();

        h.store.open(&h.path).unwrap();
        assert_eq!(h.store.get(b"b", b"k1").unwrap(), b"v1");
        assert_eq!(h.store.count(b"b"), 2);
        assert_eq!(h.store.next_sequence(b"b").unwrap(), 78);
        h.store.close();
    }
}

#[test]
fn test_memory_backend_starts_over_after_reopen() {
    let h = Harness::open(LAYOUTS[0]);
    h.store.put(b"b", b"k", b"v").unwrap();
    h.store.close();
    h.store.open(&h.path).unwrap();
    assert_eq!(h.store.count(b"b"), 0);
}

#[test]
fn test_failed_open_leaves_store_unopened() {
    for layout in LAYOUTS.into_iter().filter(|l| l.is_persistent()) {
        let h = Harness::unopened(layout);
        let blocker = h.path.with_extension("file");
        std::fs::write(&blocker, b"x").unwrap();

        assert!(matches!(
            h.store.open(Path::new(&blocker)),
            Err(StoreError::OpenFailed { .. })
        ));
        assert_eq!(h.store.state(), StoreState::Unopened);

        h.store.open(&h.path).unwrap();
        assert!(h.store.is_open());
    }
}

#[test]
fn test_concurrent_puts_keep_count_exact() {
    each_layout(|h| {
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let store = h.store.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let key = format!("t{t}-{i:03}");
                        store.put(b"shared", key.as_bytes(), b"v").unwrap();
                        // Overwrites must not inflate the count.
                        store.put(b"shared", key.as_bytes(), b"w").unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(h.store.count(b"shared"), 800, "{:?}", h.layout);
        assert_eq!(h.store.all_keys(b"shared").unwrap().len(), 800);
    });
}

#[test]
fn test_concurrent_next_sequence_hands_out_unique_values() {
    each_layout(|h| {
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let store = h.store.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| store.next_sequence(b"ids").unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut seen = BTreeSet::new();
        for t in threads {
            for v in t.join().unwrap() {
                assert!(seen.insert(v), "duplicate sequence {v}");
            }
        }
        assert_eq!(seen, (1..=400).collect::<BTreeSet<u64>>());
        assert_eq!(h.store.sequence(b"ids"), 400);
    });
}
