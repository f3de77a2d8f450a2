//! Owned, lossless syntax tree.
//!
//! Every token keeps the whitespace that precedes it, so serializing an
//! untouched tree reproduces its source byte for byte. Node kinds are a
//! closed enum over the constructs the rewriter dispatches on; everything
//! else is carried as [`NodeKind::Other`] with its grammar name.

use std::fmt;

/// Flavor of a comprehension node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComprehensionKind {
    /// `[x for x in xs]`
    List,
    /// `{x for x in xs}`
    Set,
    /// `{k: v for k, v in xs}`
    Dictionary,
    /// `(x for x in xs)`
    Generator,
}

/// Kind of an interior node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// File root.
    Module,
    /// `def` / `async def`.
    FunctionDefinition,
    /// `class`.
    ClassDefinition,
    /// `await expr`.
    Await,
    /// `with` / `async with`.
    WithStatement,
    /// `for` / `async for`.
    ForStatement,
    /// List, set, dict or generator comprehension.
    Comprehension(ComprehensionKind),
    /// One `for ... in ...` clause of a comprehension.
    ForInClause,
    /// `object.attribute`.
    Attribute,
    /// `import a.b`.
    ImportStatement,
    /// `from a.b import c`.
    ImportFromStatement,
    /// `a.b.c` in import position.
    DottedName,
    /// `..a.b` in import position.
    RelativeImport,
    /// `a.b as c`.
    AliasedImport,
    /// Parameter lists and typed parameters; direct identifiers are bindings.
    Parameters,
    /// Keyword arguments and defaulted parameters; the `name` field is a binding.
    NamedArgument,
    /// Type annotation.
    Type,
    /// String literal.
    String,
    /// Any other grammar node, passed through unchanged.
    Other(&'static str),
}

impl NodeKind {
    /// Map a tree-sitter-python node kind.
    #[must_use]
    pub fn from_grammar(kind: &'static str) -> Self {
        match kind {
            "module" => Self::Module,
            "function_definition" => Self::FunctionDefinition,
            "class_definition" => Self::ClassDefinition,
            "await" => Self::Await,
            "with_statement" => Self::WithStatement,
            "for_statement" => Self::ForStatement,
            "list_comprehension" => Self::Comprehension(ComprehensionKind::List),
            "set_comprehension" => Self::Comprehension(ComprehensionKind::Set),
            "dictionary_comprehension" => Self::Comprehension(ComprehensionKind::Dictionary),
            "generator_expression" => Self::Comprehension(ComprehensionKind::Generator),
            "for_in_clause" => Self::ForInClause,
            "attribute" => Self::Attribute,
            "import_statement" => Self::ImportStatement,
            "import_from_statement" => Self::ImportFromStatement,
            "dotted_name" => Self::DottedName,
            "relative_import" => Self::RelativeImport,
            "aliased_import" => Self::AliasedImport,
            "parameters" | "lambda_parameters" | "typed_parameter" => Self::Parameters,
            "default_parameter" | "typed_default_parameter" | "keyword_argument" => {
                Self::NamedArgument
            }
            "type" => Self::Type,
            "string" => Self::String,
            other => Self::Other(other),
        }
    }
}

/// Kind of a leaf token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A name.
    Identifier,
    /// The `async` keyword.
    Async,
    /// The `await` keyword.
    Await,
    /// Literal text between string quotes.
    StringContent,
    /// `# ...`
    Comment,
    /// Keywords, punctuation, numbers and other literals.
    Other,
}

/// A leaf of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Grammar field this token fills in its parent, if any.
    pub field: Option<&'static str>,
    /// Whitespace between the previous token and this one.
    pub leading: String,
    /// Source text of the token.
    pub text: String,
}

impl Token {
    /// Build a token.
    #[must_use]
    pub fn new(kind: TokenKind, leading: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind,
            field: None,
            leading: leading.into(),
            text: text.into(),
        }
    }

    /// Set the grammar field.
    #[must_use]
    pub fn with_field(mut self, field: Option<&'static str>) -> Self {
        self.field = field;
        self
    }

    /// Whether this is an identifier token.
    #[must_use]
    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }
}

/// An interior node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Node kind.
    pub kind: NodeKind,
    /// Grammar field this node fills in its parent, if any.
    pub field: Option<&'static str>,
    /// 1-indexed source line of the first byte.
    pub line: usize,
    /// Children in source order.
    pub children: Vec<Element>,
}

/// A child of a node: either a nested node or a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Interior node.
    Node(Node),
    /// Leaf token.
    Token(Token),
}

impl Element {
    /// First token in source order.
    #[must_use]
    pub fn first_token(&self) -> Option<&Token> {
        match self {
            Self::Token(t) => Some(t),
            Self::Node(n) => n.first_token(),
        }
    }

    /// Mutable first token in source order.
    pub fn first_token_mut(&mut self) -> Option<&mut Token> {
        match self {
            Self::Token(t) => Some(t),
            Self::Node(n) => n.first_token_mut(),
        }
    }

    /// Grammar field of the element.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Token(t) => t.field,
            Self::Node(n) => n.field,
        }
    }

    /// Set the grammar field of the element.
    pub fn set_field(&mut self, field: Option<&'static str>) {
        match self {
            Self::Token(t) => t.field = field,
            Self::Node(n) => n.field = field,
        }
    }

    /// The node, if this element is one.
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(n) => Some(n),
            Self::Token(_) => None,
        }
    }

    /// Mutable node, if this element is one.
    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Self::Node(n) => Some(n),
            Self::Token(_) => None,
        }
    }

    /// The token, if this element is one.
    #[must_use]
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Self::Token(t) => Some(t),
            Self::Node(_) => None,
        }
    }

    fn write_into(&self, out: &mut String) {
        match self {
            Self::Token(t) => {
                out.push_str(&t.leading);
                out.push_str(&t.text);
            }
            Self::Node(n) => n.write_into(out),
        }
    }
}

impl Node {
    /// Build a node.
    #[must_use]
    pub fn new(kind: NodeKind, line: usize, children: Vec<Element>) -> Self {
        Self {
            kind,
            field: None,
            line,
            children,
        }
    }

    /// First token in source order.
    #[must_use]
    pub fn first_token(&self) -> Option<&Token> {
        self.children.iter().find_map(Element::first_token)
    }

    /// Mutable first token in source order.
    pub fn first_token_mut(&mut self) -> Option<&mut Token> {
        self.children.iter_mut().find_map(Element::first_token_mut)
    }

    /// First direct child filling `field`.
    #[must_use]
    pub fn child_by_field(&self, field: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.field() == Some(field))
    }

    /// Mutable first direct child filling `field`.
    pub fn child_by_field_mut(&mut self, field: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| c.field() == Some(field))
    }

    /// Whether a direct child token has the given kind.
    #[must_use]
    pub fn has_token(&self, kind: TokenKind) -> bool {
        self.children
            .iter()
            .any(|c| matches!(c, Element::Token(t) if t.kind == kind))
    }

    /// Token text concatenated without leading whitespace.
    ///
    /// Used to read dotted import paths as a single string.
    #[must_use]
    pub fn compact_text(&self) -> String {
        let mut out = String::new();
        self.visit_tokens(&mut |_, t| out.push_str(&t.text));
        out
    }

    /// Pre-order visit of this node and every descendant node.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            if let Element::Node(n) = child {
                n.visit(f);
            }
        }
    }

    /// Visit every token together with its parent node.
    pub fn visit_tokens<'a>(&'a self, f: &mut impl FnMut(&'a Node, &'a Token)) {
        for child in &self.children {
            match child {
                Element::Token(t) => f(self, t),
                Element::Node(n) => n.visit_tokens(f),
            }
        }
    }

    fn write_into(&self, out: &mut String) {
        for child in &self.children {
            child.write_into(out);
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_into(&mut out);
        f.write_str(&out)
    }
}

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    /// The `module` node.
    pub root: Node,
    /// Whitespace after the last token.
    pub trailing: String,
}

impl SyntaxTree {
    /// Serialize back to source text.
    #[must_use]
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        self.root.write_into(&mut out);
        out.push_str(&self.trailing);
        out
    }
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}
