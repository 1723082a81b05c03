use thiserror::Error;

use crate::syntax::ast::{
    Ast, BinaryOp, FieldName, FileName, ImportKind, IndexKey, Location, LocationRange, NamedArg, NodeId, NodeKind,
    UnaryOp, Visibility,
};
use crate::syntax::kind::TokenKind;
use crate::syntax::lexer::Lexer;
use crate::text_pos::LineIndex;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{location}: {message}")]
pub struct ParseError {
    pub file: FileName,
    pub location: Location,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
struct Tok<'a> {
    kind: Option<TokenKind>,
    text: &'a str,
    begin: Location,
    end: Location,
}

type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser producing a lightly desugared [`Ast`].
///
/// Method fields and `local f(x) = ...` binds become plain fields/binds whose
/// value is a `Function`. Object fields, parameters, binds and bind
/// identifiers are allocated with the unset range.
pub struct Parser<'a> {
    tokens: Vec<Tok<'a>>,
    pos: usize,
    ast: Ast,
    file: FileName,
    eof: Location,
    prev_end: Location,
}

impl<'a> Parser<'a> {
    pub fn new(
        file: FileName,
        input: &'a str,
    ) -> Self {
        let index = LineIndex::new(input);
        let tokens = Lexer::new(input)
            .filter(|token| !token.kind.is_some_and(TokenKind::is_trivia))
            .map(|token| Tok {
                kind: token.kind,
                text: token.text,
                begin: index.location(input, token.span.start),
                end: index.location(input, token.span.end),
            })
            .collect();
        let eof = index.location(input, input.len());
        Self {
            tokens,
            pos: 0,
            ast: Ast::new(file.clone()),
            file,
            eof,
            prev_end: Location::new(1, 1),
        }
    }

    pub fn parse(mut self) -> ParseResult<Ast> {
        let root = self.parse_expr()?;
        if let Some(tok) = self.peek_tok() {
            return Err(self.error_at(tok.begin, format!("unexpected `{}` after expression", tok.text)));
        }
        self.ast.set_root(root);
        Ok(self.ast)
    }

    // ── token helpers ───────────────────────────────────────────────────

    fn peek_tok(&self) -> Option<Tok<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn peek(&self) -> Option<TokenKind> {
        self.peek_tok().and_then(|tok| tok.kind)
    }

    fn peek_nth(
        &self,
        n: usize,
    ) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).and_then(|tok| tok.kind)
    }

    fn at(
        &self,
        kind: TokenKind,
    ) -> bool {
        self.peek() == Some(kind)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn bump(&mut self) -> Option<Tok<'a>> {
        let tok = self.peek_tok()?;
        self.pos += 1;
        self.prev_end = tok.end;
        Some(tok)
    }

    fn expect(
        &mut self,
        kind: TokenKind,
        what: &str,
    ) -> ParseResult<Tok<'a>> {
        if self.at(kind) {
            if let Some(tok) = self.bump() {
                return Ok(tok);
            }
        }
        Err(self.unexpected(what))
    }

    fn current_begin(&self) -> Location {
        self.peek_tok().map(|tok| tok.begin).unwrap_or(self.eof)
    }

    fn range_from(
        &self,
        begin: Location,
    ) -> LocationRange {
        LocationRange::new(self.file.clone(), begin, self.prev_end)
    }

    fn unset(&self) -> LocationRange {
        LocationRange::unset(self.file.clone())
    }

    fn error_at(
        &self,
        location: Location,
        message: String,
    ) -> ParseError {
        ParseError {
            file: self.file.clone(),
            location,
            message,
        }
    }

    fn unexpected(
        &self,
        what: &str,
    ) -> ParseError {
        match self.peek_tok() {
            Some(tok) => self.error_at(tok.begin, format!("expected {what}, found `{}`", tok.text)),
            None => self.error_at(self.eof, format!("expected {what}, found end of file")),
        }
    }

    fn partial(&mut self) -> NodeId {
        let loc = LocationRange::new(self.file.clone(), self.eof, self.eof);
        self.ast.alloc(NodeKind::Partial, loc)
    }

    // ── expressions ─────────────────────────────────────────────────────

    fn parse_expr(&mut self) -> ParseResult<NodeId> {
        self.parse_binary(0)
    }

    fn parse_binary(
        &mut self,
        min_prec: u8,
    ) -> ParseResult<NodeId> {
        let begin = self.current_begin();
        let mut left = self.parse_unary()?;

        while let Some((op, prec)) = self.peek().and_then(binary_op) {
            if prec <= min_prec {
                break;
            }
            self.bump();
            if op == BinaryOp::In && self.at(TokenKind::KwSuper) {
                self.bump();
                left = self.ast.alloc(
                    NodeKind::InSuper {
                        expr: left,
                    },
                    self.range_from(begin),
                );
                continue;
            }
            let right = self.parse_binary(prec)?;
            left = self.ast.alloc(
                NodeKind::Binary {
                    op,
                    left,
                    right,
                },
                self.range_from(begin),
            );
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<NodeId> {
        let op = match self.peek() {
            Some(TokenKind::Minus) => Some(UnaryOp::Minus),
            Some(TokenKind::Plus) => Some(UnaryOp::Plus),
            Some(TokenKind::Exclaim) => Some(UnaryOp::Not),
            Some(TokenKind::Tilde) => Some(UnaryOp::BitwiseNot),
            Some(TokenKind::KwLocal) => return self.parse_local(),
            Some(TokenKind::KwIf) => return self.parse_conditional(),
            Some(TokenKind::KwFunction) => return self.parse_function(),
            Some(TokenKind::KwAssert) => return self.parse_assert(),
            Some(TokenKind::KwError) => return self.parse_error(),
            _ => None,
        };

        let Some(op) = op else {
            return self.parse_postfix();
        };
        let begin = self.current_begin();
        self.bump();
        let expr = self.parse_unary()?;
        Ok(self.ast.alloc(
            NodeKind::Unary {
                op,
                expr,
            },
            self.range_from(begin),
        ))
    }

    fn parse_postfix(&mut self) -> ParseResult<NodeId> {
        let begin = self.current_begin();
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek() {
                Some(TokenKind::Dot) => {
                    self.bump();
                    let key = if self.at(TokenKind::Ident) {
                        let name = self.bump().map(|tok| tok.text.to_string()).unwrap_or_default();
                        IndexKey::Field(name)
                    } else if self.at_eof() {
                        IndexKey::Expr(self.partial())
                    } else {
                        return Err(self.unexpected("field name after `.`"));
                    };
                    expr = self.ast.alloc(
                        NodeKind::Index {
                            target: expr,
                            key,
                        },
                        self.range_from(begin),
                    );
                },
                Some(TokenKind::LBracket) => {
                    expr = self.parse_index_or_slice(expr, begin)?;
                },
                Some(TokenKind::LParen) => {
                    let (positional, named) = self.parse_args()?;
                    let tailstrict = self.at(TokenKind::KwTailStrict);
                    if tailstrict {
                        self.bump();
                    }
                    expr = self.ast.alloc(
                        NodeKind::Apply {
                            target: expr,
                            positional,
                            named,
                            tailstrict,
                        },
                        self.range_from(begin),
                    );
                },
                Some(TokenKind::LBrace) => {
                    // `base { ... }` is sugar for `base + { ... }`.
                    let right = self.parse_object()?;
                    expr = self.ast.alloc(
                        NodeKind::Binary {
                            op: BinaryOp::Plus,
                            left: expr,
                            right,
                        },
                        self.range_from(begin),
                    );
                },
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_index_or_slice(
        &mut self,
        target: NodeId,
        begin: Location,
    ) -> ParseResult<NodeId> {
        self.expect(TokenKind::LBracket, "`[`")?;
        let is_slice_start = |kind: Option<TokenKind>| {
            matches!(kind, Some(TokenKind::Colon) | Some(TokenKind::ColonColon))
        };

        let first = if is_slice_start(self.peek()) {
            None
        } else {
            Some(self.parse_expr()?)
        };

        if let Some(index) = first
            && self.at(TokenKind::RBracket)
        {
            self.bump();
            return Ok(self.ast.alloc(
                NodeKind::Index {
                    target,
                    key: IndexKey::Expr(index),
                },
                self.range_from(begin),
            ));
        }

        let (end, step) = match self.peek() {
            Some(TokenKind::Colon) => {
                self.bump();
                let end = if self.at(TokenKind::RBracket) || self.at(TokenKind::Colon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                let step = if self.at(TokenKind::Colon) {
                    self.bump();
                    if self.at(TokenKind::RBracket) {
                        None
                    } else {
                        Some(self.parse_expr()?)
                    }
                } else {
                    None
                };
                (end, step)
            },
            Some(TokenKind::ColonColon) => {
                self.bump();
                let step = if self.at(TokenKind::RBracket) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                (None, step)
            },
            _ => return Err(self.unexpected("`]` or `:`")),
        };
        self.expect(TokenKind::RBracket, "`]`")?;

        Ok(self.ast.alloc(
            NodeKind::Slice {
                target,
                begin: first,
                end,
                step,
            },
            self.range_from(begin),
        ))
    }

    fn parse_args(&mut self) -> ParseResult<(Vec<NodeId>, Vec<NamedArg>)> {
        self.expect(TokenKind::LParen, "`(`")?;
        let mut positional = Vec::new();
        let mut named = Vec::new();

        while !self.at(TokenKind::RParen) {
            if self.at(TokenKind::Ident) && self.peek_nth(1) == Some(TokenKind::Equal) {
                let name = self.bump().map(|tok| tok.text.to_string()).unwrap_or_default();
                self.bump();
                let value = self.parse_expr()?;
                named.push(NamedArg {
                    name,
                    value,
                });
            } else {
                if !named.is_empty() {
                    return Err(self.unexpected("named argument"));
                }
                positional.push(self.parse_expr()?);
            }
            if self.at(TokenKind::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RParen, "`)`")?;

        Ok((positional, named))
    }

    fn parse_primary(&mut self) -> ParseResult<NodeId> {
        let Some(tok) = self.peek_tok() else {
            return Ok(self.partial());
        };
        let begin = tok.begin;

        let kind = match tok.kind {
            Some(TokenKind::Ident) => {
                self.bump();
                NodeKind::Var {
                    name: tok.text.to_string(),
                }
            },
            Some(TokenKind::Number) => {
                self.bump();
                NodeKind::LiteralNumber {
                    original: tok.text.to_string(),
                }
            },
            Some(kind) if kind.is_string() => {
                self.bump();
                NodeKind::LiteralString {
                    value: string_value(kind, tok.text),
                }
            },
            Some(TokenKind::KwTrue) => {
                self.bump();
                NodeKind::LiteralBoolean(true)
            },
            Some(TokenKind::KwFalse) => {
                self.bump();
                NodeKind::LiteralBoolean(false)
            },
            Some(TokenKind::KwNull) => {
                self.bump();
                NodeKind::LiteralNull
            },
            Some(TokenKind::KwSelf) => {
                self.bump();
                NodeKind::SelfRef
            },
            Some(TokenKind::Dollar) => {
                self.bump();
                NodeKind::Dollar
            },
            Some(TokenKind::KwSuper) => {
                self.bump();
                let key = match self.peek() {
                    Some(TokenKind::Dot) => {
                        self.bump();
                        let name = self.expect(TokenKind::Ident, "field name after `super.`")?;
                        IndexKey::Field(name.text.to_string())
                    },
                    Some(TokenKind::LBracket) => {
                        self.bump();
                        let index = self.parse_expr()?;
                        self.expect(TokenKind::RBracket, "`]`")?;
                        IndexKey::Expr(index)
                    },
                    _ => return Err(self.unexpected("`.` or `[` after `super`")),
                };
                NodeKind::SuperIndex {
                    key,
                }
            },
            Some(TokenKind::KwImport) | Some(TokenKind::KwImportStr) | Some(TokenKind::KwImportBin) => {
                self.bump();
                let kind = match tok.kind {
                    Some(TokenKind::KwImportStr) => ImportKind::String,
                    Some(TokenKind::KwImportBin) => ImportKind::Binary,
                    _ => ImportKind::Code,
                };
                let file = match self.peek_tok() {
                    Some(Tok {
                        kind: Some(string_kind),
                        text,
                        ..
                    }) if string_kind.is_string() => {
                        self.bump();
                        string_value(string_kind, text)
                    },
                    _ => return Err(self.unexpected("string literal after import")),
                };
                NodeKind::Import {
                    kind,
                    file,
                }
            },
            Some(TokenKind::LParen) => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "`)`")?;
                return Ok(inner);
            },
            Some(TokenKind::LBracket) => return self.parse_array(),
            Some(TokenKind::LBrace) => return self.parse_object(),
            Some(_) => return Err(self.unexpected("expression")),
            None => return Err(self.error_at(begin, format!("unexpected character `{}`", tok.text))),
        };

        Ok(self.ast.alloc(kind, self.range_from(begin)))
    }

    fn parse_local(&mut self) -> ParseResult<NodeId> {
        let begin = self.current_begin();
        self.expect(TokenKind::KwLocal, "`local`")?;

        let mut binds = vec![self.parse_bind()?];
        while self.at(TokenKind::Comma) {
            self.bump();
            binds.push(self.parse_bind()?);
        }

        let body = if self.at_eof() {
            self.partial()
        } else {
            self.expect(TokenKind::Semicolon, "`;`")?;
            self.parse_expr()?
        };

        Ok(self.ast.alloc(
            NodeKind::Local {
                binds,
                body,
            },
            self.range_from(begin),
        ))
    }

    fn parse_bind(&mut self) -> ParseResult<NodeId> {
        let name = self.expect(TokenKind::Ident, "variable name")?;
        let variable = self.ast.alloc(
            NodeKind::Identifier {
                name: name.text.to_string(),
            },
            self.unset(),
        );

        let body = if self.at(TokenKind::LParen) {
            let params = self.parse_params()?;
            self.expect(TokenKind::Equal, "`=`")?;
            let body = self.parse_expr()?;
            self.ast.alloc(
                NodeKind::Function {
                    params,
                    body,
                },
                self.range_from(name.begin),
            )
        } else {
            self.expect(TokenKind::Equal, "`=`")?;
            self.parse_expr()?
        };

        Ok(self.ast.alloc(
            NodeKind::LocalBind {
                variable,
                body,
            },
            self.unset(),
        ))
    }

    fn parse_params(&mut self) -> ParseResult<Vec<NodeId>> {
        self.expect(TokenKind::LParen, "`(`")?;
        let mut params = Vec::new();

        while !self.at(TokenKind::RParen) {
            let name = self.expect(TokenKind::Ident, "parameter name")?.text.to_string();
            let kind = if self.at(TokenKind::Equal) {
                self.bump();
                NodeKind::NamedParameter {
                    name,
                    default: self.parse_expr()?,
                }
            } else {
                NodeKind::Parameter {
                    name,
                }
            };
            params.push(self.ast.alloc(kind, self.unset()));

            if self.at(TokenKind::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RParen, "`)`")?;

        Ok(params)
    }

    fn parse_function(&mut self) -> ParseResult<NodeId> {
        let begin = self.current_begin();
        self.expect(TokenKind::KwFunction, "`function`")?;
        let params = self.parse_params()?;
        let body = self.parse_expr()?;
        Ok(self.ast.alloc(
            NodeKind::Function {
                params,
                body,
            },
            self.range_from(begin),
        ))
    }

    fn parse_conditional(&mut self) -> ParseResult<NodeId> {
        let begin = self.current_begin();
        self.expect(TokenKind::KwIf, "`if`")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::KwThen, "`then`")?;
        let then_branch = self.parse_expr()?;
        let else_branch = if self.at(TokenKind::KwElse) {
            self.bump();
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(self.ast.alloc(
            NodeKind::Conditional {
                cond,
                then_branch,
                else_branch,
            },
            self.range_from(begin),
        ))
    }

    fn parse_assert(&mut self) -> ParseResult<NodeId> {
        let begin = self.current_begin();
        self.expect(TokenKind::KwAssert, "`assert`")?;
        let cond = self.parse_expr()?;
        let message = if self.at(TokenKind::Colon) {
            self.bump();
            Some(self.parse_expr()?)
        } else {
            None
        };
        let rest = if self.at_eof() {
            self.partial()
        } else {
            self.expect(TokenKind::Semicolon, "`;`")?;
            self.parse_expr()?
        };
        Ok(self.ast.alloc(
            NodeKind::Assert {
                cond,
                message,
                rest,
            },
            self.range_from(begin),
        ))
    }

    fn parse_error(&mut self) -> ParseResult<NodeId> {
        let begin = self.current_begin();
        self.expect(TokenKind::KwError, "`error`")?;
        let expr = self.parse_expr()?;
        Ok(self.ast.alloc(
            NodeKind::Error {
                expr,
            },
            self.range_from(begin),
        ))
    }

    fn parse_array(&mut self) -> ParseResult<NodeId> {
        let begin = self.current_begin();
        self.expect(TokenKind::LBracket, "`[`")?;
        let mut elements = Vec::new();

        while !self.at(TokenKind::RBracket) {
            elements.push(self.parse_expr()?);
            if self.at(TokenKind::Comma) {
                self.bump();
            }
            if self.at(TokenKind::KwFor) && elements.len() == 1 {
                let specs = self.parse_comp_specs()?;
                self.expect(TokenKind::RBracket, "`]`")?;
                return Ok(self.ast.alloc(
                    NodeKind::ArrayComp {
                        body: elements[0],
                        specs,
                    },
                    self.range_from(begin),
                ));
            }
            if self.at_eof() {
                break;
            }
        }
        self.expect(TokenKind::RBracket, "`]`")?;

        Ok(self.ast.alloc(
            NodeKind::Array {
                elements,
            },
            self.range_from(begin),
        ))
    }

    fn parse_comp_specs(&mut self) -> ParseResult<Vec<NodeId>> {
        let mut specs = Vec::new();
        loop {
            let begin = self.current_begin();
            let kind = match self.peek() {
                Some(TokenKind::KwFor) => {
                    self.bump();
                    let var = self.expect(TokenKind::Ident, "loop variable")?.text.to_string();
                    self.expect(TokenKind::KwIn, "`in`")?;
                    NodeKind::ForSpec {
                        var,
                        expr: self.parse_expr()?,
                    }
                },
                Some(TokenKind::KwIf) if !specs.is_empty() => {
                    self.bump();
                    NodeKind::IfSpec {
                        cond: self.parse_expr()?,
                    }
                },
                _ => break,
            };
            specs.push(self.ast.alloc(kind, self.range_from(begin)));
        }
        if specs.is_empty() {
            return Err(self.unexpected("`for`"));
        }
        Ok(specs)
    }

    fn parse_object(&mut self) -> ParseResult<NodeId> {
        let begin = self.current_begin();
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut locals = Vec::new();
        let mut fields = Vec::new();
        let mut asserts = Vec::new();

        while !self.at(TokenKind::RBrace) {
            match self.peek() {
                Some(TokenKind::KwLocal) => {
                    self.bump();
                    locals.push(self.parse_bind()?);
                },
                Some(TokenKind::KwAssert) => {
                    let assert_begin = self.current_begin();
                    self.bump();
                    let cond = self.parse_expr()?;
                    let message = if self.at(TokenKind::Colon) {
                        self.bump();
                        Some(self.parse_expr()?)
                    } else {
                        None
                    };
                    asserts.push(self.ast.alloc(
                        NodeKind::ObjectAssert {
                            cond,
                            message,
                        },
                        self.range_from(assert_begin),
                    ));
                },
                _ => fields.push(self.parse_field()?),
            }

            if self.at(TokenKind::Comma) {
                self.bump();
            }
            if self.at(TokenKind::KwFor) {
                if fields.len() != 1 || !asserts.is_empty() {
                    return Err(self.unexpected("a single field in an object comprehension"));
                }
                let specs = self.parse_comp_specs()?;
                self.expect(TokenKind::RBrace, "`}`")?;
                return Ok(self.ast.alloc(
                    NodeKind::ObjectComp {
                        locals,
                        fields,
                        specs,
                    },
                    self.range_from(begin),
                ));
            }
            if self.at_eof() {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "`}`")?;

        Ok(self.ast.alloc(
            NodeKind::Object {
                locals,
                fields,
                asserts,
            },
            self.range_from(begin),
        ))
    }

    fn parse_field(&mut self) -> ParseResult<NodeId> {
        let name_begin = self.current_begin();
        let name = match self.peek_tok() {
            Some(Tok {
                kind: Some(TokenKind::Ident),
                text,
                ..
            }) => {
                self.bump();
                FieldName::Id(text.to_string())
            },
            Some(Tok {
                kind: Some(kind),
                text,
                ..
            }) if kind.is_string() => {
                self.bump();
                FieldName::String(string_value(kind, text))
            },
            Some(Tok {
                kind: Some(TokenKind::LBracket),
                ..
            }) => {
                self.bump();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RBracket, "`]`")?;
                FieldName::Computed(expr)
            },
            _ => return Err(self.unexpected("field name")),
        };

        let params = if self.at(TokenKind::LParen) {
            Some(self.parse_params()?)
        } else {
            None
        };

        let plus_super = self.at(TokenKind::Plus);
        if plus_super {
            self.bump();
        }

        let visibility = match self.peek() {
            Some(TokenKind::Colon) => Visibility::Inherit,
            Some(TokenKind::ColonColon) => Visibility::Hidden,
            Some(TokenKind::ColonColonColon) => Visibility::Visible,
            _ => return Err(self.unexpected("`:`, `::` or `:::`")),
        };
        self.bump();

        let value = self.parse_expr()?;
        let expr = match params {
            Some(params) => self.ast.alloc(
                NodeKind::Function {
                    params,
                    body: value,
                },
                self.range_from(name_begin),
            ),
            None => value,
        };

        Ok(self.ast.alloc(
            NodeKind::ObjectField {
                name,
                visibility,
                plus_super,
                expr,
            },
            self.unset(),
        ))
    }
}

fn binary_op(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    let op = match kind {
        TokenKind::OrOr => (BinaryOp::Or, 1),
        TokenKind::AndAnd => (BinaryOp::And, 2),
        TokenKind::Pipe => (BinaryOp::BitwiseOr, 3),
        TokenKind::Caret => (BinaryOp::BitwiseXor, 4),
        TokenKind::Amp => (BinaryOp::BitwiseAnd, 5),
        TokenKind::EqualEqual => (BinaryOp::Equal, 6),
        TokenKind::NotEqual => (BinaryOp::NotEqual, 6),
        TokenKind::Less => (BinaryOp::Less, 7),
        TokenKind::LessEqual => (BinaryOp::LessEq, 7),
        TokenKind::Greater => (BinaryOp::Greater, 7),
        TokenKind::GreaterEqual => (BinaryOp::GreaterEq, 7),
        TokenKind::KwIn => (BinaryOp::In, 7),
        TokenKind::LeftShift => (BinaryOp::ShiftL, 8),
        TokenKind::RightShift => (BinaryOp::ShiftR, 8),
        TokenKind::Plus => (BinaryOp::Plus, 9),
        TokenKind::Minus => (BinaryOp::Minus, 9),
        TokenKind::Star => (BinaryOp::Mult, 10),
        TokenKind::Slash => (BinaryOp::Div, 10),
        TokenKind::Percent => (BinaryOp::Percent, 10),
        _ => return None,
    };
    Some(op)
}

/// The value a string token denotes.
pub(crate) fn string_value(
    kind: TokenKind,
    text: &str,
) -> String {
    match kind {
        TokenKind::DoubleString | TokenKind::SingleString => unescape(text.get(1..text.len() - 1).unwrap_or_default()),
        TokenKind::VerbatimDoubleString => text.get(2..text.len() - 1).unwrap_or_default().replace("\"\"", "\""),
        TokenKind::VerbatimSingleString => text.get(2..text.len() - 1).unwrap_or_default().replace("''", "'"),
        TokenKind::TextBlock => text_block_value(text),
        _ => text.to_string(),
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
                out.push(decoded.unwrap_or(char::REPLACEMENT_CHARACTER));
            },
            Some(other @ ('"' | '\'' | '\\' | '/')) => out.push(other),
            Some(other) => {
                out.push('\\');
                out.push(other);
            },
            None => out.push('\\'),
        }
    }
    out
}

fn text_block_value(raw: &str) -> String {
    let body = raw.strip_prefix("|||").unwrap_or(raw);
    let chomp = body.starts_with('-');
    let content = body.split_once('\n').map(|(_, rest)| rest).unwrap_or("");

    let indent: String = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).collect())
        .unwrap_or_default();

    let mut value = String::new();
    for line in content.split_inclusive('\n') {
        if !line.ends_with('\n') {
            // Indentation in front of the closing delimiter.
            break;
        }
        value.push_str(line.strip_prefix(indent.as_str()).unwrap_or(line.trim_start_matches([' ', '\t'])));
    }
    if chomp && value.ends_with('\n') {
        value.pop();
    }
    value
}

#[cfg(test)]
#[path = "../../tests/src/syntax/parser_tests.rs"]
mod tests;
