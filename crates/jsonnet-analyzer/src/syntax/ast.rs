//! Arena representation of a parsed Jsonnet document.
//!
//! Nodes are stored in a flat `Vec` and addressed by [`NodeId`]. Nodes that
//! the parser synthesizes while desugaring (object fields, parameters, local
//! binds and bind identifiers) carry the unset range; everything else carries
//! the span of the tokens it was parsed from.

use std::fmt;
use std::sync::Arc;

/// Name of the file a range belongs to.
pub type FileName = Arc<str>;

/// A 1-based line/column pair. Zero in either coordinate means "unset".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub const fn new(
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            line,
            column,
        }
    }

    pub fn is_set(self) -> bool {
        self.line != 0 && self.column != 0
    }
}

impl fmt::Display for Location {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Begin/end pair plus the originating file. `end` is the position just past
/// the last character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationRange {
    pub file: FileName,
    pub begin: Location,
    pub end: Location,
}

impl LocationRange {
    pub fn new(
        file: FileName,
        begin: Location,
        end: Location,
    ) -> Self {
        Self {
            file,
            begin,
            end,
        }
    }

    pub fn unset(file: FileName) -> Self {
        Self::new(file, Location::default(), Location::default())
    }

    /// A range is valid only when all four coordinates are set.
    pub fn is_valid(&self) -> bool {
        self.begin.is_set() && self.end.is_set()
    }
}

impl Default for LocationRange {
    fn default() -> Self {
        Self::unset(Arc::from(""))
    }
}

impl fmt::Display for LocationRange {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "{}-{}", self.begin, self.end)
        } else {
            write!(f, "{}:{}-{}", self.file, self.begin, self.end)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Field visibility as written: `:` inherits, `::` hides, `:::` forces visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Inherit,
    Hidden,
    Visible,
}

impl Visibility {
    pub fn marker(self) -> &'static str {
        match self {
            Visibility::Inherit => ":",
            Visibility::Hidden => "::",
            Visibility::Visible => ":::",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldName {
    Id(String),
    String(String),
    Computed(NodeId),
}

impl FieldName {
    /// The static name of the field, if it is not computed.
    pub fn as_static(&self) -> Option<&str> {
        match self {
            FieldName::Id(name) | FieldName::String(name) => Some(name),
            FieldName::Computed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexKey {
    /// `target.name`
    Field(String),
    /// `target[expr]`
    Expr(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    Code,
    String,
    Binary,
}

impl ImportKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ImportKind::Code => "import",
            ImportKind::String => "importstr",
            ImportKind::Binary => "importbin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Mult,
    Div,
    Percent,
    Plus,
    Minus,
    ShiftL,
    ShiftR,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    In,
    Equal,
    NotEqual,
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Mult => "*",
            BinaryOp::Div => "/",
            BinaryOp::Percent => "%",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::ShiftL => "<<",
            BinaryOp::ShiftR => ">>",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::In => "in",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::BitwiseAnd => "&",
            BinaryOp::BitwiseXor => "^",
            BinaryOp::BitwiseOr => "|",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    BitwiseNot,
    Plus,
    Minus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedArg {
    pub name: String,
    pub value: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Apply {
        target: NodeId,
        positional: Vec<NodeId>,
        named: Vec<NamedArg>,
        tailstrict: bool,
    },
    Array {
        elements: Vec<NodeId>,
    },
    ArrayComp {
        body: NodeId,
        specs: Vec<NodeId>,
    },
    Assert {
        cond: NodeId,
        message: Option<NodeId>,
        rest: NodeId,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Conditional {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    Dollar,
    Error {
        expr: NodeId,
    },
    ForSpec {
        var: String,
        expr: NodeId,
    },
    Function {
        params: Vec<NodeId>,
        body: NodeId,
    },
    /// The variable name of a `LocalBind`.
    Identifier {
        name: String,
    },
    IfSpec {
        cond: NodeId,
    },
    Import {
        kind: ImportKind,
        file: String,
    },
    InSuper {
        expr: NodeId,
    },
    Index {
        target: NodeId,
        key: IndexKey,
    },
    LiteralBoolean(bool),
    LiteralNull,
    LiteralNumber {
        original: String,
    },
    LiteralString {
        value: String,
    },
    Local {
        binds: Vec<NodeId>,
        body: NodeId,
    },
    LocalBind {
        variable: NodeId,
        body: NodeId,
    },
    /// A parameter with a default value.
    NamedParameter {
        name: String,
        default: NodeId,
    },
    Object {
        locals: Vec<NodeId>,
        fields: Vec<NodeId>,
        asserts: Vec<NodeId>,
    },
    ObjectAssert {
        cond: NodeId,
        message: Option<NodeId>,
    },
    ObjectComp {
        locals: Vec<NodeId>,
        fields: Vec<NodeId>,
        specs: Vec<NodeId>,
    },
    ObjectField {
        name: FieldName,
        visibility: Visibility,
        plus_super: bool,
        expr: NodeId,
    },
    /// A required parameter.
    Parameter {
        name: String,
    },
    /// Placeholder for an expression the input ended before providing.
    Partial,
    SelfRef,
    Slice {
        target: NodeId,
        begin: Option<NodeId>,
        end: Option<NodeId>,
        step: Option<NodeId>,
    },
    SuperIndex {
        key: IndexKey,
    },
    Unary {
        op: UnaryOp,
        expr: NodeId,
    },
    Var {
        name: String,
    },
}

impl NodeKind {
    /// Short kind name used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Apply { .. } => "Apply",
            NodeKind::Array { .. } => "Array",
            NodeKind::ArrayComp { .. } => "ArrayComp",
            NodeKind::Assert { .. } => "Assert",
            NodeKind::Binary { .. } => "Binary",
            NodeKind::Conditional { .. } => "Conditional",
            NodeKind::Dollar => "Dollar",
            NodeKind::Error { .. } => "Error",
            NodeKind::ForSpec { .. } => "ForSpec",
            NodeKind::Function { .. } => "Function",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::IfSpec { .. } => "IfSpec",
            NodeKind::Import { .. } => "Import",
            NodeKind::InSuper { .. } => "InSuper",
            NodeKind::Index { .. } => "Index",
            NodeKind::LiteralBoolean(_) => "LiteralBoolean",
            NodeKind::LiteralNull => "LiteralNull",
            NodeKind::LiteralNumber { .. } => "LiteralNumber",
            NodeKind::LiteralString { .. } => "LiteralString",
            NodeKind::Local { .. } => "Local",
            NodeKind::LocalBind { .. } => "LocalBind",
            NodeKind::NamedParameter { .. } => "NamedParameter",
            NodeKind::Object { .. } => "Object",
            NodeKind::ObjectAssert { .. } => "ObjectAssert",
            NodeKind::ObjectComp { .. } => "ObjectComp",
            NodeKind::ObjectField { .. } => "ObjectField",
            NodeKind::Parameter { .. } => "Parameter",
            NodeKind::Partial => "Partial",
            NodeKind::SelfRef => "Self",
            NodeKind::Slice { .. } => "Slice",
            NodeKind::SuperIndex { .. } => "SuperIndex",
            NodeKind::Unary { .. } => "Unary",
            NodeKind::Var { .. } => "Var",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub loc: LocationRange,
}

/// A parsed document.
#[derive(Debug, Clone)]
pub struct Ast {
    file: FileName,
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    pub(crate) fn new(file: FileName) -> Self {
        Self {
            file,
            nodes: Vec::new(),
            root: NodeId(0),
        }
    }

    pub(crate) fn alloc(
        &mut self,
        kind: NodeKind,
        loc: LocationRange,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            loc,
        });
        id
    }

    pub(crate) fn set_root(
        &mut self,
        root: NodeId,
    ) {
        self.root = root;
    }

    pub fn file(&self) -> &FileName {
        &self.file
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(
        &self,
        id: NodeId,
    ) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(
        &self,
        id: NodeId,
    ) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Direct children of `id`, in the order the walker visits them.
    pub fn children(
        &self,
        id: NodeId,
    ) -> Vec<NodeId> {
        let key_child = |key: &IndexKey| match key {
            IndexKey::Field(_) => None,
            IndexKey::Expr(expr) => Some(*expr),
        };
        match self.kind(id) {
            NodeKind::Apply {
                target,
                positional,
                named,
                ..
            } => {
                let mut out = vec![*target];
                out.extend(positional.iter().copied());
                out.extend(named.iter().map(|arg| arg.value));
                out
            },
            NodeKind::Array {
                elements,
            } => elements.clone(),
            NodeKind::ArrayComp {
                body,
                specs,
            } => {
                let mut out = specs.clone();
                out.push(*body);
                out
            },
            NodeKind::Assert {
                cond,
                message,
                rest,
            } => {
                let mut out = vec![*cond];
                out.extend(*message);
                out.push(*rest);
                out
            },
            NodeKind::Binary {
                left,
                right,
                ..
            } => vec![*left, *right],
            NodeKind::Conditional {
                cond,
                then_branch,
                else_branch,
            } => {
                let mut out = vec![*cond, *then_branch];
                out.extend(*else_branch);
                out
            },
            NodeKind::Error {
                expr,
            }
            | NodeKind::ForSpec {
                expr,
                ..
            }
            | NodeKind::InSuper {
                expr,
            }
            | NodeKind::Unary {
                expr,
                ..
            } => vec![*expr],
            NodeKind::IfSpec {
                cond,
            } => vec![*cond],
            NodeKind::Function {
                params,
                body,
            } => {
                let mut out = params.clone();
                out.push(*body);
                out
            },
            NodeKind::Index {
                target,
                key,
            } => {
                let mut out = vec![*target];
                out.extend(key_child(key));
                out
            },
            NodeKind::SuperIndex {
                key,
            } => key_child(key).into_iter().collect(),
            NodeKind::Local {
                binds,
                body,
            } => {
                let mut out = binds.clone();
                out.push(*body);
                out
            },
            NodeKind::LocalBind {
                variable,
                body,
            } => vec![*variable, *body],
            NodeKind::NamedParameter {
                default,
                ..
            } => vec![*default],
            NodeKind::Object {
                locals,
                fields,
                asserts,
            } => {
                let mut out = locals.clone();
                out.extend(fields.iter().copied());
                out.extend(asserts.iter().copied());
                out
            },
            NodeKind::ObjectAssert {
                cond,
                message,
            } => {
                let mut out = vec![*cond];
                out.extend(*message);
                out
            },
            NodeKind::ObjectComp {
                locals,
                fields,
                specs,
            } => {
                let mut out = specs.clone();
                out.extend(locals.iter().copied());
                out.extend(fields.iter().copied());
                out
            },
            NodeKind::ObjectField {
                name,
                expr,
                ..
            } => match name {
                FieldName::Computed(name) => vec![*name, *expr],
                _ => vec![*expr],
            },
            NodeKind::Slice {
                target,
                begin,
                end,
                step,
            } => {
                let mut out = vec![*target];
                out.extend(*begin);
                out.extend(*end);
                out.extend(*step);
                out
            },
            NodeKind::Dollar
            | NodeKind::Identifier { .. }
            | NodeKind::Import { .. }
            | NodeKind::LiteralBoolean(_)
            | NodeKind::LiteralNull
            | NodeKind::LiteralNumber { .. }
            | NodeKind::LiteralString { .. }
            | NodeKind::Parameter { .. }
            | NodeKind::Partial
            | NodeKind::SelfRef
            | NodeKind::Var { .. } => Vec::new(),
        }
    }
}
