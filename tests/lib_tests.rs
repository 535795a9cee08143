use campsync::engine::{
    conflict_free_name, decide, find_by_hash, folder_name, hash_equals, hash_file, index_folders,
    is_hidden_name, local_copy_name, path_from_store_string, path_relative_to,
    path_to_store_string, sanitize_file_name,
};
use campsync::utils::campsync_toml::{apply_file_to_opts, parse_campsync_toml};
use campsync::utils::config::HashingConsts;
use campsync::{Action, EntryStatus, SyncOpts, SyncRoots};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

// --- path helpers ---

#[test]
fn test_path_relative_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/foo/bar/baz/qux");
    assert_eq!(
        path_relative_to(&path, &base),
        Some(PathBuf::from("baz/qux"))
    );
}

#[test]
fn test_path_relative_not_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/other/qux");
    assert_eq!(path_relative_to(&path, &base), None);
}

#[test]
fn test_path_to_store_string_relative() {
    let root = PathBuf::from("/sync");
    assert_eq!(
        path_to_store_string(&PathBuf::from("/sync/Mathe/Skript.pdf"), &root),
        "Mathe/Skript.pdf"
    );
}

#[test]
fn test_path_to_store_string_outside_root_stays_absolute() {
    let root = PathBuf::from("/sync");
    assert_eq!(
        path_to_store_string(&PathBuf::from("/elsewhere/a.pdf"), &root),
        "/elsewhere/a.pdf"
    );
}

#[test]
fn test_path_from_store_string_joins_root() {
    let root = PathBuf::from("/sync");
    assert_eq!(
        path_from_store_string("Mathe/Skript.pdf", &root),
        PathBuf::from("/sync/Mathe/Skript.pdf")
    );
    assert_eq!(
        path_from_store_string("/abs/x.pdf", &root),
        PathBuf::from("/abs/x.pdf")
    );
}

#[test]
fn test_is_hidden_name() {
    assert!(is_hidden_name(".campsync.db"));
    assert!(is_hidden_name(".git"));
    assert!(!is_hidden_name("Skript.pdf"));
}

// --- file and folder names ---

#[test]
fn test_sanitize_keeps_allowed_characters() {
    assert_eq!(
        sanitize_file_name("Übung 1 (Lösung) [v2", ".pdf"),
        "Übung 1 (Lösung) [v2.pdf"
    );
}

#[test]
fn test_sanitize_replaces_disallowed_characters() {
    assert_eq!(
        sanitize_file_name("Skript: Kapitel 1/2", ".pdf"),
        "Skript_ Kapitel 1_2.pdf"
    );
}

#[test]
fn test_sanitize_quotes_and_closing_bracket_become_underscores() {
    assert_eq!(
        sanitize_file_name("Foo \"bar\" [x]", ".pdf"),
        "Foo _bar_ [x_.pdf"
    );
}

#[test]
fn test_sanitize_never_hidden_or_empty() {
    assert_eq!(sanitize_file_name(".hidden", ".txt"), "_hidden.txt");
    assert_eq!(sanitize_file_name("", ".txt"), "_.txt");
}

#[test]
fn test_folder_name_replaces_separators() {
    assert_eq!(folder_name("Mathe / Analysis"), "Mathe _ Analysis");
    assert_eq!(folder_name("  .dot  "), "_dot");
    assert_eq!(folder_name(""), "_");
}

// --- conflict-free naming ---

#[test]
fn test_conflict_free_name_unchanged_when_free() {
    let dir = TempDir::new().unwrap();
    let p = dir.path().join("a.pdf");
    assert_eq!(conflict_free_name(&p), p);
}

#[test]
fn test_conflict_free_name_appends_counter_before_extension() {
    let dir = TempDir::new().unwrap();
    let p = dir.path().join("a.pdf");
    write(&p, "x");
    assert_eq!(conflict_free_name(&p), dir.path().join("a-1.pdf"));

    write(&dir.path().join("a-1.pdf"), "y");
    let next = conflict_free_name(&p);
    assert_eq!(next, dir.path().join("a-2.pdf"));
    assert!(!next.exists());
}

#[test]
fn test_conflict_free_name_without_extension() {
    let dir = TempDir::new().unwrap();
    let p = dir.path().join("Folder");
    fs::create_dir(&p).unwrap();
    assert_eq!(conflict_free_name(&p), dir.path().join("Folder-1"));
}

#[test]
fn test_local_copy_name() {
    let dir = TempDir::new().unwrap();
    let p = dir.path().join("Skript.pdf");
    assert_eq!(local_copy_name(&p), dir.path().join("Skript.local.pdf"));

    write(&dir.path().join("Skript.local.pdf"), "older copy");
    assert_eq!(local_copy_name(&p), dir.path().join("Skript.local-1.pdf"));
}

// --- hashing ---

#[test]
fn test_hash_file_empty_is_blake3_of_nothing() {
    let dir = TempDir::new().unwrap();
    let p = dir.path().join("empty");
    write(&p, "");
    assert_eq!(
        hash_file(&p).unwrap(),
        "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
    );
}

#[test]
fn test_hash_file_content_sensitive() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    let c = dir.path().join("c");
    write(&a, "same");
    write(&b, "same");
    write(&c, "other");
    let ha = hash_file(&a).unwrap();
    assert_eq!(ha.len(), 64);
    assert_eq!(ha, hash_file(&b).unwrap());
    assert_ne!(ha, hash_file(&c).unwrap());
}

#[test]
fn test_hash_file_missing_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = hash_file(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, campsync::SyncError::Io { .. }));
}

#[test]
fn test_hash_equals_ignores_case() {
    assert!(hash_equals("ABCDEF", "abcdef"));
    assert!(!hash_equals("abc", "abd"));
}

#[test]
fn test_find_by_hash_finds_nested_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("x/y/moved.pdf");
    write(&target, "payload");
    write(&dir.path().join("other.txt"), "noise");
    let digest = hash_file(&target).unwrap();
    assert_eq!(
        find_by_hash(&[dir.path().to_path_buf()], &digest),
        Some(target)
    );
}

#[test]
fn test_find_by_hash_skips_hidden_files_and_dirs() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join(".hidden.pdf"), "payload");
    write(&dir.path().join(".cache/inner.pdf"), "payload");
    let digest = hash_file(&dir.path().join(".hidden.pdf")).unwrap();
    assert_eq!(find_by_hash(&[dir.path().to_path_buf()], &digest), None);
}

#[test]
fn test_find_by_hash_first_match_is_deterministic() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("b/copy.pdf"), "dup");
    write(&dir.path().join("a/copy.pdf"), "dup");
    write(&dir.path().join("c.pdf"), "dup");
    let digest = hash_file(&dir.path().join("c.pdf")).unwrap();
    let roots = [dir.path().to_path_buf()];
    let first = find_by_hash(&roots, &digest);
    assert_eq!(first, Some(dir.path().join("a/copy.pdf")));
    for _ in 0..5 {
        assert_eq!(find_by_hash(&roots, &digest), first);
    }
}

#[test]
fn test_find_by_hash_across_batches_keeps_listing_order() {
    let dir = TempDir::new().unwrap();
    let count = HashingConsts::HASH_SEARCH_BATCH + 20;
    for i in 0..count {
        write(&dir.path().join(format!("f{i:04}.txt")), &format!("noise {i}"));
    }
    let roots = [dir.path().to_path_buf()];

    // Only match sits in the second batch.
    let last = dir.path().join(format!("f{:04}.txt", count - 1));
    let digest = hash_file(&last).unwrap();
    assert_eq!(find_by_hash(&roots, &digest), Some(last.clone()));

    // An earlier duplicate in the first batch wins.
    let early = dir.path().join("f0003.txt");
    write(&early, &format!("noise {}", count - 1));
    assert_eq!(find_by_hash(&roots, &digest), Some(early));
}

#[test]
fn test_find_by_hash_missing_root_is_none() {
    let dir = TempDir::new().unwrap();
    assert_eq!(find_by_hash(&[dir.path().join("absent")], "00"), None);
}

// --- folder index ---

#[test]
fn test_index_folders_first_marker_wins() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("a/.campsync-folder"), "course-1\n");
    write(&dir.path().join("b/.campsync-folder"), "course-1\n");
    write(&dir.path().join("c/.campsync-folder"), "course-2\n");
    let index = index_folders(&[dir.path().to_path_buf()]);
    assert_eq!(index.len(), 2);
    assert_eq!(index.get("course-1"), Some(&dir.path().join("a")));
    assert_eq!(index.get("course-2"), Some(&dir.path().join("c")));
}

// --- roots ---

#[test]
fn test_roots_all_drops_nested_roots() {
    let roots = SyncRoots::new(Path::new("/sync"));
    assert_eq!(roots.all(), vec![PathBuf::from("/sync")]);
}

#[test]
fn test_roots_all_keeps_disjoint_roots_in_order() {
    let roots = SyncRoots {
        base: PathBuf::from("/sync/active"),
        info: PathBuf::from("/sync/info"),
        completed: PathBuf::from("/sync/active/done"),
    };
    assert_eq!(
        roots.all(),
        vec![PathBuf::from("/sync/active"), PathBuf::from("/sync/info")]
    );
}

// --- decision matrix ---

fn found(changed_on_remote: bool, changed_locally: bool, by_hash: bool) -> EntryStatus {
    EntryStatus {
        entry_exists: true,
        file_exists: true,
        file_path: Some(PathBuf::from("/sync/a.pdf")),
        changed_on_remote: Some(changed_on_remote),
        changed_locally: Some(changed_locally),
        found_by_hash: by_hash,
    }
}

#[test]
fn test_decide_no_entry_downloads() {
    assert_eq!(decide(&EntryStatus::default()), Action::Download);
}

#[test]
fn test_decide_missing_file_downloads() {
    let status = EntryStatus {
        entry_exists: true,
        changed_on_remote: Some(true),
        ..EntryStatus::default()
    };
    assert_eq!(decide(&status), Action::Download);
}

#[test]
fn test_decide_both_changed_preserves_local() {
    assert_eq!(
        decide(&found(true, true, false)),
        Action::PreserveAndDownload {
            local: PathBuf::from("/sync/a.pdf")
        }
    );
}

#[test]
fn test_decide_remote_changed_overwrites() {
    assert_eq!(
        decide(&found(true, false, false)),
        Action::Overwrite {
            path: PathBuf::from("/sync/a.pdf")
        }
    );
    assert_eq!(
        decide(&found(true, false, true)),
        Action::Overwrite {
            path: PathBuf::from("/sync/a.pdf")
        }
    );
}

#[test]
fn test_decide_remote_unchanged_is_in_sync() {
    assert_eq!(decide(&found(false, false, false)), Action::InSync);
    assert_eq!(decide(&found(false, true, false)), Action::InSync);
}

#[test]
fn test_decide_moved_file_relocates() {
    assert_eq!(
        decide(&found(false, false, true)),
        Action::Relocate {
            path: PathBuf::from("/sync/a.pdf")
        }
    );
}

// --- config file ---

#[test]
fn test_config_file_overrides_defaults() {
    let file = parse_campsync_toml(
        r#"
[settings]
info_dir = "Info"
exclude_courses = ["1844", "2567"]
manifest = "listing.json"
list = true
"#,
    )
    .unwrap();
    let mut opts = SyncOpts::default();
    apply_file_to_opts(&file, Path::new("/sync"), &mut opts);
    assert_eq!(opts.info_dir, "Info");
    assert_eq!(opts.completed_dir, "Abgeschlossene Module");
    assert_eq!(opts.exclude_courses, vec!["1844", "2567"]);
    assert_eq!(opts.manifest, Some(PathBuf::from("/sync/listing.json")));
    assert!(opts.list_paths);
    assert!(!opts.verbose);
}

#[test]
fn test_config_file_rejects_bad_types() {
    assert!(parse_campsync_toml("[settings]\nlist = \"yes\"\n").is_err());
}
