//! Mirror package manifest (`__init__.py`).
//!
//! Written from the rename table, never from a scan of the rewritten files.

use std::fmt::Write as _;

use unasync_ast::{Element, Node, NodeKind, SyntaxTree, TokenKind};
use unasync_rewrite::RenameTable;

use crate::config::EmitConfig;

/// File name of the manifest inside the mirror root.
pub const MANIFEST_FILE: &str = "__init__.py";

/// Render the manifest: banner, entry-point import, factory imports in table
/// order, and `__all__`.
#[must_use]
pub fn render_manifest(config: &EmitConfig, table: &RenameTable) -> String {
    let mut out = config.banner();
    let _ = writeln!(
        out,
        "from {} import {}",
        config.mirror_module(&config.client_module),
        table.sync_entry_point()
    );

    let factories = table.factory_renames();
    if !factories.is_empty() {
        let _ = writeln!(
            out,
            "from {} import (",
            config.mirror_module(&config.registry_module)
        );
        for (_, target) in factories {
            let _ = writeln!(out, "    {target},");
        }
        out.push_str(")\n");
    }

    out.push_str("\n__all__ = [\n");
    for name in table.manifest_exports() {
        let _ = writeln!(out, "    \"{name}\",");
    }
    out.push_str("]\n");
    out
}

/// String entries of the module-level `__all__` list, in order.
#[must_use]
pub fn declared_exports(tree: &SyntaxTree) -> Vec<String> {
    let mut names = Vec::new();
    tree.root.visit(&mut |node| {
        if let Some(value) = all_assignment(node) {
            value.visit_tokens(&mut |_, token| {
                if token.kind == TokenKind::StringContent {
                    names.push(token.text.clone());
                }
            });
        }
    });
    names
}

fn all_assignment(node: &Node) -> Option<&Node> {
    if node.kind != NodeKind::Other("assignment") {
        return None;
    }
    match node.child_by_field("left")? {
        Element::Token(target) if target.text == "__all__" => {
            node.child_by_field("right")?.as_node()
        }
        _ => None,
    }
}
