//! Tree-sitter based Python parser producing lossless syntax trees.

use tree_sitter::{Language, Node as TsNode, Parser};

use crate::error::ParseError;
use crate::tree::{Element, Node, NodeKind, SyntaxTree, Token, TokenKind};

/// Named nodes lowered as a single token even when tree-sitter gives them
/// children (escape sequences inside string content, for instance).
const ATOMIC_KINDS: &[&str] = &["string_content", "comment"];

/// Tree-sitter based Python parser.
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    /// Create a new parser.
    ///
    /// # Errors
    /// `ParseError::Language` if the grammar ABI does not match the runtime.
    pub fn new() -> Result<Self, ParseError> {
        let language: Language = tree_sitter_python::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| ParseError::Language(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse Python source into a [`SyntaxTree`].
    ///
    /// # Errors
    /// `ParseError::Syntax` pointing at the first `ERROR` or missing node.
    pub fn parse(&mut self, source: &str) -> Result<SyntaxTree, ParseError> {
        let tree = self.parser.parse(source, None).ok_or(ParseError::NoTree)?;
        let root = tree.root_node();

        if root.has_error() {
            return Err(syntax_error(root, source));
        }

        let mut lowering = Lowering { source, offset: 0 };
        let children = lowering.children(root);
        let module = Node::new(NodeKind::Module, root.start_position().row + 1, children);
        let trailing = source.get(lowering.offset..).unwrap_or_default().to_string();

        Ok(SyntaxTree {
            root: module,
            trailing,
        })
    }
}

impl SyntaxTree {
    /// Parse with a throwaway parser.
    ///
    /// # Errors
    /// See [`PythonParser::parse`].
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        PythonParser::new()?.parse(source)
    }
}

/// Converts tree-sitter nodes into owned elements while tracking how far
/// into the source text tokens have been consumed.
struct Lowering<'s> {
    source: &'s str,
    offset: usize,
}

impl Lowering<'_> {
    fn children(&mut self, node: TsNode) -> Vec<Element> {
        let mut children = Vec::with_capacity(node.child_count());
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                let field = cursor.field_name();
                children.push(self.element(child, field));
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        children
    }

    fn element(&mut self, node: TsNode, field: Option<&'static str>) -> Element {
        if node.child_count() == 0 || ATOMIC_KINDS.contains(&node.kind()) {
            let start = node.start_byte().max(self.offset);
            let end = node.end_byte().max(start);
            let leading = self.slice(self.offset, start);
            let text = self.slice(start, end);
            self.offset = end;
            return Element::Token(
                Token::new(token_kind(node), leading, text).with_field(field),
            );
        }

        let mut lowered = Node::new(
            NodeKind::from_grammar(node.kind()),
            node.start_position().row + 1,
            self.children(node),
        );
        lowered.field = field;
        Element::Node(lowered)
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.source.get(start..end).unwrap_or_default().to_string()
    }
}

fn token_kind(node: TsNode) -> TokenKind {
    match (node.is_named(), node.kind()) {
        (true, "identifier") => TokenKind::Identifier,
        (false, "async") => TokenKind::Async,
        (false, "await") => TokenKind::Await,
        (true, "string_content") => TokenKind::StringContent,
        (true, "comment") => TokenKind::Comment,
        _ => TokenKind::Other,
    }
}

fn first_error(node: TsNode) -> Option<TsNode> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if child.has_error() {
                if let Some(found) = first_error(child) {
                    return Some(found);
                }
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    None
}

fn syntax_error(root: TsNode, source: &str) -> ParseError {
    let culprit = first_error(root).unwrap_or(root);
    let position = culprit.start_position();
    let message = if culprit.is_missing() {
        format!("missing `{}`", culprit.kind())
    } else {
        "unexpected input".to_string()
    };
    let snippet = source
        .lines()
        .nth(position.row)
        .unwrap_or_default()
        .trim()
        .to_string();

    ParseError::Syntax {
        line: position.row + 1,
        column: position.column + 1,
        message,
        snippet,
    }
}
