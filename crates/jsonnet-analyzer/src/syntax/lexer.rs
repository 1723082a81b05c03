use std::ops::Range;

use crate::syntax::kind::TokenKind;
use logos::Logos;

/// A single lexed token. `kind` is `None` for input the lexer rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: Option<TokenKind>,
    pub text: &'a str,
    pub span: Range<usize>,
}

/// A lexer that wraps `logos::Lexer` to produce spanned tokens.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token_result = self.inner.next()?;
        Some(Token {
            kind: token_result.ok(),
            text: self.inner.slice(),
            span: self.inner.span(),
        })
    }
}
