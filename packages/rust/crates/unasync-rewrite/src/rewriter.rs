//! Bottom-up tree rewriter.
//!
//! Children are rewritten before their parent, then the parent's handler is
//! chosen by one exhaustive match on [`NodeKind`]. Every handler looks only
//! at the node and its direct children; nothing depends on scope, call graph
//! or types.

use std::collections::BTreeMap;

use unasync_ast::{Element, Node, NodeKind, SyntaxTree, Token, TokenKind};

use crate::error::RewriteError;
use crate::rules::{
    AsyncConstructRule, BLOCKING_MODULE, RenameTable, SCHEDULER_MODULE, SLEEP, is_scheduler_path,
    is_unsupported_name, lifecycle_hook, transport_attribute,
};

/// What one rewrite pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Applications per async-construct rule.
    pub applied: BTreeMap<AsyncConstructRule, usize>,
    /// Identifiers renamed through the type/factory tables.
    pub renamed: usize,
    /// Import paths renamed through the module table.
    pub module_paths: usize,
}

impl RewriteReport {
    /// Applications of `rule`.
    #[must_use]
    pub fn count(&self, rule: AsyncConstructRule) -> usize {
        self.applied.get(&rule).copied().unwrap_or_default()
    }

    /// Applications of all async-construct rules.
    #[must_use]
    pub fn total_rules(&self) -> usize {
        self.applied.values().sum()
    }

    /// Add another report's counts into this one.
    pub fn merge(&mut self, other: &Self) {
        for (rule, n) in &other.applied {
            *self.applied.entry(*rule).or_default() += n;
        }
        self.renamed += other.renamed;
        self.module_paths += other.module_paths;
    }

    fn hit(&mut self, rule: AsyncConstructRule) {
        *self.applied.entry(rule).or_default() += 1;
    }
}

/// Rewrites async Python trees into their blocking equivalent.
#[derive(Debug, Clone, Copy)]
pub struct TreeRewriter<'t> {
    table: &'t RenameTable,
}

impl<'t> TreeRewriter<'t> {
    /// Create a rewriter over `table`.
    #[must_use]
    pub fn new(table: &'t RenameTable) -> Self {
        Self { table }
    }

    /// Rewrite one tree.
    ///
    /// # Errors
    /// `UnrecognizedConstruct` for async constructs without a rule and
    /// `ResidualSuspension` if a suspension keyword is still present after
    /// the pass.
    pub fn rewrite(&self, tree: SyntaxTree) -> Result<(SyntaxTree, RewriteReport), RewriteError> {
        let SyntaxTree { root, trailing } = tree;
        let line = root.line;
        let mut pass = Pass {
            table: self.table,
            report: RewriteReport::default(),
        };
        let root = match pass.apply(root)? {
            Element::Node(node) => node,
            token @ Element::Token(_) => Node::new(NodeKind::Module, line, vec![token]),
        };
        let tree = SyntaxTree { root, trailing };

        if let Some((line, construct)) = find_residual_suspension(&tree) {
            return Err(RewriteError::ResidualSuspension { line, construct });
        }
        tracing::trace!(
            rules = pass.report.total_rules(),
            renamed = pass.report.renamed,
            "rewrote tree"
        );
        Ok((tree, pass.report))
    }

    /// Parse, rewrite and serialize `source`.
    ///
    /// # Errors
    /// Parse failures and the errors of [`TreeRewriter::rewrite`].
    pub fn rewrite_source(&self, source: &str) -> Result<String, RewriteError> {
        let tree = SyntaxTree::parse(source)?;
        let (tree, _) = self.rewrite(tree)?;
        Ok(tree.to_source())
    }
}

/// First leftover `await` node or `async`/`await` token, with its line.
#[must_use]
pub fn find_residual_suspension(tree: &SyntaxTree) -> Option<(usize, String)> {
    let mut found = None;
    tree.root.visit(&mut |node| {
        if found.is_none() && node.kind == NodeKind::Await {
            found = Some((node.line, "await".to_string()));
        }
    });
    if found.is_some() {
        return found;
    }
    tree.root.visit_tokens(&mut |parent, token| {
        if found.is_none() && matches!(token.kind, TokenKind::Async | TokenKind::Await) {
            found = Some((parent.line, token.text.clone()));
        }
    });
    found
}

/// State of one rewrite pass.
struct Pass<'t> {
    table: &'t RenameTable,
    report: RewriteReport,
}

impl Pass<'_> {
    fn apply(&mut self, mut node: Node) -> Result<Element, RewriteError> {
        let children = std::mem::take(&mut node.children);
        node.children = children
            .into_iter()
            .map(|child| match child {
                Element::Node(inner) => self.apply(inner),
                token @ Element::Token(_) => Ok(token),
            })
            .collect::<Result<_, _>>()?;

        match node.kind {
            NodeKind::Module
            | NodeKind::ClassDefinition
            | NodeKind::Comprehension(_)
            | NodeKind::Other(_) => self.rename_references(&mut node, None)?,
            NodeKind::FunctionDefinition => self.function_definition(&mut node)?,
            NodeKind::Await => return self.await_expression(node),
            NodeKind::WithStatement => {
                self.strip_async(&mut node, AsyncConstructRule::AsyncWith);
                self.rename_references(&mut node, None)?;
            }
            NodeKind::ForStatement => {
                self.strip_async(&mut node, AsyncConstructRule::AsyncFor);
                self.rename_references(&mut node, None)?;
            }
            NodeKind::ForInClause => {
                self.strip_async(&mut node, AsyncConstructRule::AsyncComprehension);
                self.rename_references(&mut node, None)?;
            }
            NodeKind::Attribute => self.attribute(&mut node)?,
            NodeKind::ImportStatement => self.import_statement(&mut node)?,
            NodeKind::ImportFromStatement => self.import_from(&mut node)?,
            NodeKind::NamedArgument => self.rename_references(&mut node, Some("name"))?,
            NodeKind::Type => {
                self.rename_references(&mut node, None)?;
                self.forward_references(&mut node);
            }
            // Path segments, aliases, parameter names and string pieces
            NodeKind::DottedName
            | NodeKind::RelativeImport
            | NodeKind::AliasedImport
            | NodeKind::Parameters
            | NodeKind::String => {}
        }
        Ok(Element::Node(node))
    }

    /// Rename direct identifier children, skipping the `skip` field.
    fn rename_references(
        &mut self,
        node: &mut Node,
        skip: Option<&'static str>,
    ) -> Result<(), RewriteError> {
        let line = node.line;
        for child in &mut node.children {
            if let Element::Token(token) = child {
                if token.is_identifier() && (skip.is_none() || token.field != skip) {
                    self.rename_token(token, line)?;
                }
            }
        }
        Ok(())
    }

    fn rename_token(&mut self, token: &mut Token, line: usize) -> Result<(), RewriteError> {
        if token.text == SCHEDULER_MODULE || is_unsupported_name(&token.text) {
            return Err(RewriteError::UnrecognizedConstruct {
                line,
                construct: token.text.clone(),
            });
        }
        let table = self.table;
        if let Some((target, rule)) = table.rename_identifier(&token.text) {
            token.text = target.to_string();
            match rule {
                Some(rule) => self.report.hit(rule),
                None => self.report.renamed += 1,
            }
        }
        Ok(())
    }

    /// Drop a direct `async` token, handing its leading whitespace to the
    /// keyword that follows.
    fn strip_async(&mut self, node: &mut Node, rule: AsyncConstructRule) -> bool {
        let Some(index) = node
            .children
            .iter()
            .position(|c| matches!(c, Element::Token(t) if t.kind == TokenKind::Async))
        else {
            return false;
        };
        let removed = node.children.remove(index);
        if let (Element::Token(keyword), Some(next)) = (removed, node.children.get_mut(index)) {
            if let Some(first) = next.first_token_mut() {
                first.leading = keyword.leading;
            }
        }
        self.report.hit(rule);
        true
    }

    fn function_definition(&mut self, node: &mut Node) -> Result<(), RewriteError> {
        let was_async = self.strip_async(node, AsyncConstructRule::FunctionDefinition);
        if was_async {
            if let Some(Element::Token(name)) = node.child_by_field_mut("name") {
                if let Some(hook) = lifecycle_hook(&name.text) {
                    name.text = hook.to_string();
                }
            }
        }
        self.rename_references(node, None)
    }

    fn await_expression(&mut self, node: Node) -> Result<Element, RewriteError> {
        let Node {
            line,
            field,
            children,
            ..
        } = node;

        let mut leading = None;
        let mut operand = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Element::Token(t) if t.kind == TokenKind::Await && leading.is_none() => {
                    leading = Some(t.leading);
                }
                other => operand.push(other),
            }
        }
        let Some(leading) = leading else {
            return Err(RewriteError::ResidualSuspension {
                line,
                construct: "await".to_string(),
            });
        };

        for element in &mut operand {
            if let Element::Token(token) = element {
                if token.is_identifier() {
                    self.rename_token(token, line)?;
                }
            }
        }
        self.report.hit(AsyncConstructRule::Await);

        let mut replacement = if operand.len() == 1 {
            operand.swap_remove(0)
        } else {
            Element::Node(Node::new(NodeKind::Other("expression"), line, operand))
        };
        if let Some(first) = replacement.first_token_mut() {
            first.leading = leading;
        }
        replacement.set_field(field);
        Ok(replacement)
    }

    fn attribute(&mut self, node: &mut Node) -> Result<(), RewriteError> {
        let line = node.line;
        let member = node
            .child_by_field("attribute")
            .and_then(Element::as_token)
            .map(|t| t.text.clone())
            .unwrap_or_default();

        if let Some(Element::Token(object)) = node.child_by_field_mut("object") {
            if object.is_identifier() && object.text == SCHEDULER_MODULE {
                if member != SLEEP {
                    return Err(RewriteError::UnrecognizedConstruct {
                        line,
                        construct: format!("{SCHEDULER_MODULE}.{member}"),
                    });
                }
                object.text = BLOCKING_MODULE.to_string();
                self.report.hit(AsyncConstructRule::AsyncioSleep);
            } else if object.is_identifier() {
                self.rename_token(object, line)?;
            }
        }

        if let Some(Element::Token(attr)) = node.child_by_field_mut("attribute") {
            if let Some(target) = transport_attribute(&attr.text) {
                attr.text = target.to_string();
                self.report.hit(AsyncConstructRule::TransportAttribute);
            } else if let Some(hook) = lifecycle_hook(&attr.text) {
                // `super().__aenter__()` and friends follow the renamed definitions
                attr.text = hook.to_string();
                self.report.hit(AsyncConstructRule::FunctionDefinition);
            } else {
                self.rename_token(attr, line)?;
            }
        }
        Ok(())
    }

    fn import_statement(&mut self, node: &mut Node) -> Result<(), RewriteError> {
        let line = node.line;
        let table = self.table;
        for child in &mut node.children {
            let Some(name) = child.as_node_mut() else {
                continue;
            };
            match name.kind {
                NodeKind::DottedName => {
                    let text = name.compact_text();
                    if text == SCHEDULER_MODULE {
                        replace_path(name, BLOCKING_MODULE);
                        self.report.hit(AsyncConstructRule::AsyncioSleep);
                    } else if is_scheduler_path(&text) {
                        return Err(RewriteError::UnrecognizedConstruct {
                            line,
                            construct: format!("import {text}"),
                        });
                    }
                }
                // `import a.b` binds `a`, so only aliased imports follow the module table
                NodeKind::AliasedImport => {
                    let Some(path) = name.child_by_field_mut("name").and_then(Element::as_node_mut)
                    else {
                        continue;
                    };
                    let text = path.compact_text();
                    if is_scheduler_path(&text) {
                        return Err(RewriteError::UnrecognizedConstruct {
                            line,
                            construct: format!("import {text} as ..."),
                        });
                    }
                    if let Some(target) = table.lookup_module(&text) {
                        replace_path(path, &target);
                        self.report.module_paths += 1;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn import_from(&mut self, node: &mut Node) -> Result<(), RewriteError> {
        let line = node.line;
        let table = self.table;
        let module = node
            .child_by_field("module_name")
            .and_then(Element::as_node)
            .map(Node::compact_text)
            .unwrap_or_default();

        if module == SCHEDULER_MODULE {
            for name in imported_names(node) {
                if name != SLEEP {
                    return Err(RewriteError::UnrecognizedConstruct {
                        line,
                        construct: format!("from {SCHEDULER_MODULE} import {name}"),
                    });
                }
            }
            if let Some(path) = node
                .child_by_field_mut("module_name")
                .and_then(Element::as_node_mut)
            {
                replace_path(path, BLOCKING_MODULE);
            }
            self.report.hit(AsyncConstructRule::AsyncioSleep);
            return Ok(());
        }
        if is_scheduler_path(&module) {
            return Err(RewriteError::UnrecognizedConstruct {
                line,
                construct: format!("from {module} import ..."),
            });
        }

        if let Some(target) = table.lookup_module(&module) {
            if let Some(path) = node
                .child_by_field_mut("module_name")
                .and_then(Element::as_node_mut)
            {
                replace_path(path, &target);
                self.report.module_paths += 1;
            }
        }

        for child in &mut node.children {
            if child.field() != Some("name") {
                continue;
            }
            let Some(name) = child.as_node_mut() else {
                continue;
            };
            let path = match name.kind {
                NodeKind::DottedName => Some(name),
                NodeKind::AliasedImport => name
                    .child_by_field_mut("name")
                    .and_then(Element::as_node_mut),
                _ => None,
            };
            if let Some(path) = path {
                for segment in &mut path.children {
                    if let Element::Token(token) = segment {
                        if token.is_identifier() {
                            self.rename_token(token, line)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Rename type names in string annotations below `node`, stopping at
    /// nested annotations which were handled on their own.
    fn forward_references(&mut self, node: &mut Node) {
        let table = self.table;
        for child in &mut node.children {
            let Some(inner) = child.as_node_mut() else {
                continue;
            };
            match inner.kind {
                NodeKind::Type => {}
                NodeKind::String => {
                    for piece in &mut inner.children {
                        if let Element::Token(token) = piece {
                            if token.kind != TokenKind::StringContent {
                                continue;
                            }
                            if let Some(replaced) = table.replace_forward_references(&token.text) {
                                token.text = replaced;
                                self.report.hit(AsyncConstructRule::ForwardReference);
                            }
                        }
                    }
                }
                _ => self.forward_references(inner),
            }
        }
    }
}

/// Names listed after `import` in a `from ... import ...` statement.
fn imported_names(node: &Node) -> Vec<String> {
    node.children
        .iter()
        .filter_map(Element::as_node)
        .filter_map(|child| match child.kind {
            NodeKind::DottedName if child.field == Some("name") => Some(child.compact_text()),
            NodeKind::AliasedImport => child
                .child_by_field("name")
                .and_then(Element::as_node)
                .map(Node::compact_text),
            NodeKind::Other("wildcard_import") => Some("*".to_string()),
            _ => None,
        })
        .collect()
}

/// Replace an import path node with `path`, keeping its leading whitespace,
/// field and line.
fn replace_path(node: &mut Node, path: &str) {
    let leading = node
        .first_token()
        .map(|t| t.leading.clone())
        .unwrap_or_default();
    let mut rebuilt = path_node(path, leading, node.line);
    rebuilt.field = node.field;
    *node = rebuilt;
}

fn path_node(path: &str, leading: String, line: usize) -> Node {
    let dotted = path.trim_start_matches('.');
    let dots = path.len() - dotted.len();

    let mut segments = Vec::new();
    for (i, segment) in dotted.split('.').filter(|s| !s.is_empty()).enumerate() {
        if i > 0 {
            segments.push(Element::Token(Token::new(TokenKind::Other, "", ".")));
        }
        segments.push(Element::Token(Token::new(TokenKind::Identifier, "", segment)));
    }
    let dotted_node = Node::new(NodeKind::DottedName, line, segments);

    let mut node = if dots == 0 {
        dotted_node
    } else {
        let prefix = (0..dots)
            .map(|_| Element::Token(Token::new(TokenKind::Other, "", ".")))
            .collect();
        let mut children = vec![Element::Node(Node::new(
            NodeKind::Other("import_prefix"),
            line,
            prefix,
        ))];
        if !dotted_node.children.is_empty() {
            children.push(Element::Node(dotted_node));
        }
        Node::new(NodeKind::RelativeImport, line, children)
    };
    if let Some(first) = node.first_token_mut() {
        first.leading = leading;
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_node_absolute() {
        let node = path_node("tideline._sync.client", " ".to_string(), 1);
        assert_eq!(node.kind, NodeKind::DottedName);
        assert_eq!(node.to_string(), " tideline._sync.client");
    }

    #[test]
    fn test_path_node_relative() {
        let node = path_node("..models", " ".to_string(), 1);
        assert_eq!(node.kind, NodeKind::RelativeImport);
        assert_eq!(node.to_string(), " ..models");
        assert_eq!(node.compact_text(), "..models");
    }

    #[test]
    fn test_report_merge() {
        let mut a = RewriteReport::default();
        a.hit(AsyncConstructRule::Await);
        a.renamed = 2;
        let mut b = RewriteReport::default();
        b.hit(AsyncConstructRule::Await);
        b.hit(AsyncConstructRule::AsyncFor);
        b.module_paths = 1;
        a.merge(&b);
        assert_eq!(a.count(AsyncConstructRule::Await), 2);
        assert_eq!(a.count(AsyncConstructRule::AsyncFor), 1);
        assert_eq!(a.total_rules(), 3);
        assert_eq!(a.renamed, 2);
        assert_eq!(a.module_paths, 1);
    }
}
