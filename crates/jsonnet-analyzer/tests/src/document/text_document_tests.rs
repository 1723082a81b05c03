use super::*;

#[test]
fn file_uri_maps_to_path() {
    let uri = Url::parse("file:///work/main.jsonnet").unwrap();
    let doc = Document::new(uri, "{}".to_string(), 1);
    assert_eq!(doc.file_name(), "/work/main.jsonnet");
}

#[test]
fn non_file_uri_keeps_uri_text() {
    let uri = Url::parse("untitled:Untitled-1").unwrap();
    assert_eq!(file_name_for(&uri), "untitled:Untitled-1");
}

#[test]
fn set_content_replaces_text_and_version() {
    let uri = Url::parse("file:///work/main.jsonnet").unwrap();
    let mut doc = Document::new(uri, "1".to_string(), 1);
    doc.set_content("2".to_string(), 7);
    assert_eq!(doc.text, "2");
    assert_eq!(doc.version, 7);
}
