use std::fs;

use super::*;

fn fixture(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, contents) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, contents).expect("write");
    }
    dir
}

#[test]
fn get_reports_miss_for_unknown_keys() {
    let cache = NodeCache::new();
    let err = cache.get(Path::new("/nowhere/x.libsonnet")).expect_err("miss");
    assert!(matches!(err, CacheError::Miss(_)));
}

#[test]
fn load_resolves_against_search_paths_in_order() {
    let first = fixture(&[("lib.libsonnet", "{ a: 1 }")]);
    let second = fixture(&[("lib.libsonnet", "{ b: 2 }"), ("only.libsonnet", "{}")]);
    let roots = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    let cache = NodeCache::new();

    let lib = cache.load("lib.libsonnet", &roots).expect("load");
    assert_eq!(lib.path, fs::canonicalize(first.path().join("lib.libsonnet")).expect("canonical"));

    let only = cache.load("only.libsonnet", &roots).expect("load");
    assert_eq!(only.path, fs::canonicalize(second.path().join("only.libsonnet")).expect("canonical"));
}

#[test]
fn repeated_loads_share_one_tree() {
    let dir = fixture(&[("lib.libsonnet", "{ a: 1 }")]);
    let roots = vec![dir.path().to_path_buf()];
    let cache = NodeCache::new();

    let first = cache.load("lib.libsonnet", &roots).expect("load");
    let second = cache.load("lib.libsonnet", &roots).expect("load");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);

    let looked_up = cache.get(&dir.path().join("lib.libsonnet")).expect("get");
    assert!(Arc::ptr_eq(&first, &looked_up));
}

#[test]
fn concurrent_loads_populate_once() {
    let dir = fixture(&[("lib.libsonnet", "{ a: 1 }")]);
    let roots = vec![dir.path().to_path_buf()];
    let cache = Arc::new(NodeCache::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            let roots = roots.clone();
            std::thread::spawn(move || cache.load("lib.libsonnet", &roots).expect("load"))
        })
        .collect();
    let trees: Vec<_> = handles.into_iter().map(|handle| handle.join().expect("join")).collect();
    assert!(trees.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn unresolvable_specifier_is_a_miss() {
    let dir = fixture(&[]);
    let cache = NodeCache::new();
    let err = cache.load("missing.libsonnet", &[dir.path().to_path_buf()]).expect_err("miss");
    assert!(matches!(err, CacheError::Miss(ref name) if name == "missing.libsonnet"));
}

#[test]
fn parse_failures_are_hard_errors_and_not_memoized() {
    let dir = fixture(&[("bad.libsonnet", "{ a: }")]);
    let roots = vec![dir.path().to_path_buf()];
    let cache = NodeCache::new();

    let err = cache.load("bad.libsonnet", &roots).expect_err("parse error");
    assert!(matches!(err, CacheError::Parse(_)));

    fs::write(dir.path().join("bad.libsonnet"), "{ a: 1 }").expect("rewrite");
    assert!(cache.load("bad.libsonnet", &roots).is_ok());
}

#[test]
fn insert_invalidate_and_clear() {
    let cache = NodeCache::new();
    let path = Path::new("/virtual/doc.jsonnet");
    cache.insert(path, "{ a: 1 }").expect("insert");
    assert!(cache.get(path).is_ok());

    cache.invalidate(path);
    assert!(matches!(cache.get(path), Err(CacheError::Miss(_))));

    cache.insert(path, "{}").expect("insert");
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn cached_tree_is_annotated_with_its_path() {
    let dir = fixture(&[("lib.libsonnet", "{ a: 1 }")]);
    let cache = NodeCache::new();
    let lib = cache.load("lib.libsonnet", &[dir.path().to_path_buf()]).expect("load");
    assert_eq!(&**lib.tree.file(), lib.path.to_string_lossy());
    assert_eq!(lib.tree.len(), lib.tree.ast().len() + 1);
}
