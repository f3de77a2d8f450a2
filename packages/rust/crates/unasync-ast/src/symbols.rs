//! Top-level symbol extraction.

use crate::tree::{Element, Node, NodeKind, SyntaxTree, TokenKind};

/// What a top-level symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// `class Name`
    Class,
    /// `def name` or `async def name`
    Function,
}

/// A class or function defined at module level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Defined name.
    pub name: String,
    /// Class or function.
    pub kind: SymbolKind,
    /// Whether the definition is `async def`.
    pub is_async: bool,
    /// 1-indexed definition line.
    pub line: usize,
}

impl Symbol {
    /// Python convention: names without a leading underscore are public.
    #[must_use]
    pub fn is_public(&self) -> bool {
        !self.name.starts_with('_')
    }
}

/// Collect module-level class and function definitions, decorated or not.
#[must_use]
pub fn top_level_symbols(tree: &SyntaxTree) -> Vec<Symbol> {
    tree.root
        .children
        .iter()
        .filter_map(Element::as_node)
        .filter_map(definition_of)
        .filter_map(symbol_from)
        .collect()
}

fn definition_of(node: &Node) -> Option<&Node> {
    match node.kind {
        NodeKind::ClassDefinition | NodeKind::FunctionDefinition => Some(node),
        NodeKind::Other("decorated_definition") => node
            .child_by_field("definition")
            .and_then(Element::as_node),
        _ => None,
    }
}

fn symbol_from(node: &Node) -> Option<Symbol> {
    let name = node.child_by_field("name")?.as_token()?;
    let kind = if node.kind == NodeKind::ClassDefinition {
        SymbolKind::Class
    } else {
        SymbolKind::Function
    };
    Some(Symbol {
        name: name.text.clone(),
        kind,
        is_async: node.has_token(TokenKind::Async),
        line: node.line,
    })
}
