//! Depth-first traversal of statement trees.

use tprof_syntax::Stmt;

/// Visits every descendant of `root` in pre-order, children in source order.
///
/// `root` itself is not visited. The visitor receives each node with its
/// depth below `root`, starting at 0 for the root's children. Empty child
/// slots are skipped.
pub fn walk<'t, F>(root: &'t Stmt, visitor: &mut F)
where
    F: FnMut(&'t Stmt, usize),
{
    walk_children(root, 0, visitor);
}

fn walk_children<'t, F>(node: &'t Stmt, depth: usize, visitor: &mut F)
where
    F: FnMut(&'t Stmt, usize),
{
    for child in node.children().iter().flatten() {
        visitor(child, depth);
        walk_children(child, depth.saturating_add(1), visitor);
    }
}
