//! Conversions between tree coordinates and LSP types.

pub mod lsp;
pub mod navigation;
