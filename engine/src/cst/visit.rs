//! Depth-first visitor over the CST, mirroring `go/ast.Walk`'s sentinel
//! protocol: an exit call with `None` follows a node's children so that a
//! listener keeping a scope stack knows exactly when to pop it.
//!
//! The original `Visit(node) Visitor` signature lets each call return a
//! *different* visitor to recurse with; in practice every listener in this
//! codebase returns itself or stops, so this port collapses that to a
//! `bool` ("keep recursing with `self`") rather than carrying a trait
//! object through the recursion. The enter/exit pairing — the part that's
//! actually load-bearing — is preserved exactly.

use super::CstNode;

pub trait Visitor {
    /// Called with `Some(node)` on entry and `None` on exit, once recursion
    /// into that node's children (if any) has finished. Return `false` from
    /// the entry call to skip this node's children entirely.
    fn visit(&mut self, node: Option<CstNode<'_>>) -> bool;
}

pub fn walk<V: Visitor + ?Sized>(v: &mut V, node: CstNode<'_>) {
    if v.visit(Some(node)) {
        for child in node.named_children() {
            walk(v, child);
        }
        v.visit(None);
    }
}

struct Predicate<F> {
    f: F,
}

impl<F: FnMut(Option<CstNode<'_>>) -> bool> Visitor for Predicate<F> {
    fn visit(&mut self, node: Option<CstNode<'_>>) -> bool {
        (self.f)(node)
    }
}

/// Walk `node`, recursing into a child's subtree only while `predicate`
/// returns `true` for it.
pub fn inspect<F>(node: CstNode<'_>, predicate: F)
where
    F: FnMut(Option<CstNode<'_>>) -> bool,
{
    let mut visitor = Predicate { f: predicate };
    walk(&mut visitor, node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{parse, CancellationToken, Language};

    #[test]
    fn walk_emits_matched_enter_exit_pairs() {
        let cancel = CancellationToken::new();
        let tree = parse(b"function f() { return 1; }", Language::JavaScript, &cancel).unwrap();

        struct Counter {
            enters: usize,
            exits: usize,
        }
        impl Visitor for Counter {
            fn visit(&mut self, node: Option<CstNode<'_>>) -> bool {
                match node {
                    Some(_) => {
                        self.enters += 1;
                        true
                    }
                    None => {
                        self.exits += 1;
                        true
                    }
                }
            }
        }

        let mut counter = Counter { enters: 0, exits: 0 };
        walk(&mut counter, tree.root());
        assert_eq!(counter.enters, counter.exits);
        assert!(counter.enters > 0);
    }

    #[test]
    fn inspect_predicate_stops_descent() {
        let cancel = CancellationToken::new();
        let tree = parse(b"function f() { return 1; }", Language::JavaScript, &cancel).unwrap();

        let mut visited_kinds = Vec::new();
        inspect(tree.root(), |node| match node {
            Some(n) => {
                visited_kinds.push(n.kind().to_string());
                n.kind() != "statement_block"
            }
            None => true,
        });

        assert!(visited_kinds.contains(&"statement_block".to_string()));
        assert!(!visited_kinds.contains(&"return_statement".to_string()));
    }
}
