pub mod ast;
pub mod kind;
pub mod lexer;
pub mod parser;

use std::sync::Arc;

pub use ast::{
    Ast, BinaryOp, FieldName, FileName, ImportKind, IndexKey, Location, LocationRange, Node, NodeId, NodeKind, Visibility,
};
pub use parser::{ParseError, Parser};

/// Parse `source` into an [`Ast`] whose ranges name `file`.
pub fn parse(
    file: &str,
    source: &str,
) -> Result<Ast, ParseError> {
    Parser::new(Arc::from(file), source).parse()
}
