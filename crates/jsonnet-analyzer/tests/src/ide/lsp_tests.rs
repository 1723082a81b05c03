use std::sync::Arc;

use super::*;

fn range(
    file: &str,
    begin: (u32, u32),
    end: (u32, u32),
) -> LocationRange {
    LocationRange::new(Arc::from(file), Location::new(begin.0, begin.1), Location::new(end.0, end.1))
}

#[test]
fn position_maps_to_one_based_location() {
    let source = "local x = 1;\nx + 1";
    assert_eq!(lsp_position_to_location(source, Position::new(1, 0)), Location::new(2, 1));
    assert_eq!(lsp_position_to_location(source, Position::new(0, 6)), Location::new(1, 7));
}

#[test]
fn range_uses_utf16_columns_when_source_is_known() {
    let source = "local 😀 = 1; 'ab'";
    let r = range("/w/a.jsonnet", (1, 14), (1, 18));
    let converted = range_to_lsp(&r, Some(source));
    assert_eq!(converted.start, Position::new(0, 14));
    assert_eq!(converted.end, Position::new(0, 18));
}

#[test]
fn range_without_source_falls_back_to_char_columns() {
    let r = range("/w/a.jsonnet", (3, 5), (3, 9));
    assert_eq!(range_to_lsp(&r, None), Range::new(Position::new(2, 4), Position::new(2, 8)));
}

#[test]
fn file_uri_accepts_paths_and_uris() {
    assert_eq!(file_uri("/w/a.jsonnet").map(|u| u.to_string()), Some("file:///w/a.jsonnet".to_string()));
    assert_eq!(file_uri("untitled:Untitled-1").map(|u| u.to_string()), Some("untitled:Untitled-1".to_string()));
    assert!(file_uri("relative.jsonnet").is_none());
}

#[test]
fn unset_range_has_no_lsp_location() {
    let r = LocationRange::unset(Arc::from("/w/a.jsonnet"));
    assert!(range_to_lsp_location(&r, None).is_none());
}
