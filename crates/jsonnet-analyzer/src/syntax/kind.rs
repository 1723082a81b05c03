use logos::Logos;

#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[logos(error = ())] // Use unit type for error
pub enum TokenKind {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//.*", allow_greedy = true)]
    #[regex(r"#.*", allow_greedy = true)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    Comment,

    // Keywords
    #[token("assert")]
    KwAssert,
    #[token("else")]
    KwElse,
    #[token("error")]
    KwError,
    #[token("false")]
    KwFalse,
    #[token("for")]
    KwFor,
    #[token("function")]
    KwFunction,
    #[token("if")]
    KwIf,
    #[token("import")]
    KwImport,
    #[token("importstr")]
    KwImportStr,
    #[token("importbin")]
    KwImportBin,
    #[token("in")]
    KwIn,
    #[token("local")]
    KwLocal,
    #[token("null")]
    KwNull,
    #[token("self")]
    KwSelf,
    #[token("super")]
    KwSuper,
    #[token("tailstrict")]
    KwTailStrict,
    #[token("then")]
    KwThen,
    #[token("true")]
    KwTrue,

    // Identifiers & literals
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,
    #[regex(r#""([^"\\]|\\[\s\S])*""#)]
    DoubleString,
    #[regex(r#"'([^'\\]|\\[\s\S])*'"#)]
    SingleString,
    #[regex(r#"@"([^"]|"")*""#)]
    VerbatimDoubleString,
    #[regex(r#"@'([^']|'')*'"#)]
    VerbatimSingleString,
    #[token("|||", lex_text_block)]
    TextBlock,

    // Punctuation
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("::")]
    ColonColon,
    #[token(":::")]
    ColonColonColon,
    #[token("$")]
    Dollar,
    #[token("=")]
    Equal,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<<")]
    LeftShift,
    #[token(">>")]
    RightShift,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    NotEqual,
    #[token("&")]
    Amp,
    #[token("^")]
    Caret,
    #[token("|")]
    Pipe,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Exclaim,
    #[token("~")]
    Tilde,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn is_string(self) -> bool {
        matches!(
            self,
            TokenKind::DoubleString
                | TokenKind::SingleString
                | TokenKind::VerbatimDoubleString
                | TokenKind::VerbatimSingleString
                | TokenKind::TextBlock
        )
    }
}

/// Consume a `|||` text block up to and including its closing delimiter,
/// which must be the first non-blank text on a later line.
fn lex_text_block(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let rest = lex.remainder();
    let mut offset = 0usize;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if offset > 0 && trimmed.starts_with("|||") {
            let indent = line.len() - trimmed.len();
            lex.bump(offset + indent + 3);
            return true;
        }
        offset += line.len();
    }
    false
}
