//! Hash domain governance lock tests.
//!
//! Proves:
//! 1. Canonical domain set has expected count (catches forgotten additions to ALL)
//! 2. All domains follow `HDASTAR::*::V1\0` naming convention
//! 3. Distribution-key digests are pinned: routing must not drift between
//!    builds, or two binaries would disagree on state ownership
//! 4. No raw `HDASTAR::` domain literals in production source outside `hash_domain.rs`

use std::path::{Path, PathBuf};

use hdastar_kernel::carrier::packed::PackedState;
use hdastar_kernel::hash::{distribution_key, table_hash, HashDomain};

#[test]
fn hash_domain_canonical_set_count() {
    assert_eq!(
        HashDomain::ALL.len(),
        2,
        "expected 2 domain variants; if you added a new domain, update this count"
    );
}

#[test]
fn hash_domain_all_follow_naming_convention() {
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        assert!(bytes.starts_with(b"HDASTAR::"), "{domain} does not start with HDASTAR::");
        assert!(bytes.ends_with(b"::V1\0"), "{domain} does not end with ::V1\\0");
    }
}

#[test]
fn distribution_digests_are_pinned() {
    let empty = PackedState::new(Vec::new());
    let board = PackedState::new(vec![1, 2, 3, 4, 5, 6, 7, 8, 0]);
    assert_eq!(distribution_key(&empty), 0x15dc_6d9c);
    assert_eq!(distribution_key(&board), 0x75b9_79f3);
}

#[test]
fn bucket_hash_is_independent_of_routing() {
    let board = PackedState::new(vec![1, 2, 3, 4, 5, 6, 7, 8, 0]);
    assert_eq!(table_hash(&board), table_hash(&board.clone()));
    assert_ne!(table_hash(&board), distribution_key(&board));
}

#[test]
fn no_raw_domain_literals_outside_authority() {
    let production_dirs = [
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../kernel/src"),
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../search/src"),
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../harness/src"),
    ];
    let pattern = "b\"HDASTAR::";
    let authority_file = "hash_domain.rs";

    let mut violations = Vec::new();
    let mut scanned = 0;
    for dir in production_dirs {
        for path in walkdir(Path::new(dir)) {
            if path.extension().and_then(|e| e.to_str()) != Some("rs") {
                continue;
            }
            scanned += 1;
            if path.file_name().and_then(|n| n.to_str()) == Some(authority_file) {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            for (i, line) in content.lines().enumerate() {
                let trimmed = line.trim();
                if !trimmed.starts_with("//") && trimmed.contains(pattern) {
                    violations.push(format!("  {}:{}: {}", path.display(), i + 1, trimmed));
                }
            }
        }
    }

    assert!(scanned > 0, "no production sources found; paths are wrong");
    assert!(
        violations.is_empty(),
        "raw HDASTAR:: domain literals found outside {authority_file}:\n{}",
        violations.join("\n")
    );
}

/// Simple recursive directory walker (avoids adding walkdir dependency).
fn walkdir(dir: &Path) -> Vec<PathBuf> {
    let mut results = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                results.extend(walkdir(&path));
            } else {
                results.push(path);
            }
        }
    }
    results
}
