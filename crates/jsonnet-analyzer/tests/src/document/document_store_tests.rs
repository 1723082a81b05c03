use super::*;

#[test]
fn store_open_get_content_close() {
    let store = DocumentStore::new();
    let uri = Url::parse("file:///main.jsonnet").unwrap();
    store.open(uri.clone(), "{ a: 1 }".to_string(), 1);

    assert_eq!(store.get_content(&uri), Some("{ a: 1 }".to_string()));
    assert_eq!(store.len(), 1);

    store.close(&uri);
    assert!(store.get_content(&uri).is_none());
    assert!(store.is_empty());
}

#[test]
fn store_update_existing() {
    let store = DocumentStore::new();
    let uri = Url::parse("file:///main.jsonnet").unwrap();
    store.open(uri.clone(), "v1".to_string(), 1);
    store.update(uri.clone(), "v2".to_string(), 2);
    let doc = store.get(&uri).unwrap();
    assert_eq!(doc.text, "v2");
    assert_eq!(doc.version, 2);
}

#[test]
fn store_update_unknown_creates() {
    let store = DocumentStore::new();
    let uri = Url::parse("file:///new.libsonnet").unwrap();
    store.update(uri.clone(), "{}".to_string(), 1);
    assert!(store.get_content(&uri).is_some());
}
