//! Statement tree handed from the front end to the analysis core.
//!
//! Every node carries a closed [`StmtKind`] tag, a [`SourceSpan`] and an
//! ordered list of child slots. A slot may be empty, mirroring optional
//! grammar positions such as the missing initialiser of `for (; i < n; )`.
//! Role-bearing children (loop bodies, branches) are addressed by slot index
//! through the kind, so the core never inspects grammar-specific node names.

use crate::source::SourceSpan;

/// Resolution of a call's target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee {
    /// The call statically names a function.
    Direct {
        /// Unqualified name of the called function.
        name: String,
    },
    /// The target is computed at run time (function pointer, subscript,
    /// call result).
    Indirect,
}

/// Structural kind of a statement or expression node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    /// A brace-delimited block.
    Compound,
    /// A `for (init; cond; step)` loop.
    For {
        /// Slot index of the loop body.
        body: usize,
    },
    /// A range-based `for (decl : range)` loop.
    RangeFor {
        /// Slot index of the loop body.
        body: usize,
    },
    /// A `while (cond)` loop.
    While {
        /// Slot index of the loop body.
        body: usize,
    },
    /// A `do … while (cond);` loop.
    Do {
        /// Slot index of the loop body.
        body: usize,
    },
    /// An `if` statement.
    If {
        /// Slot index of the then-branch.
        then_branch: usize,
        /// Slot index of the else-branch, when present.
        else_branch: Option<usize>,
    },
    /// A call expression.
    Call {
        /// Resolution of the call target.
        callee: Callee,
    },
    /// Any other node, tagged with its grammar name.
    Other {
        /// Grammar name of the node (for example `expression_statement`).
        tag: &'static str,
    },
}

/// A node of the statement tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    kind: StmtKind,
    span: SourceSpan,
    children: Vec<Option<Stmt>>,
}

impl Stmt {
    /// Creates a node with no children.
    #[must_use]
    pub const fn leaf(kind: StmtKind, span: SourceSpan) -> Self {
        Self {
            kind,
            span,
            children: Vec::new(),
        }
    }

    /// Creates a node with the given child slots.
    #[must_use]
    pub const fn new(kind: StmtKind, span: SourceSpan, children: Vec<Option<Self>>) -> Self {
        Self {
            kind,
            span,
            children,
        }
    }

    /// Returns the node's kind.
    #[must_use]
    pub const fn kind(&self) -> &StmtKind {
        &self.kind
    }

    /// Returns the node's span.
    #[must_use]
    pub const fn span(&self) -> SourceSpan {
        self.span
    }

    /// Returns the child slots in source order.
    #[must_use]
    pub fn children(&self) -> &[Option<Self>] {
        &self.children
    }

    /// Returns the child in slot `index`, if the slot exists and is filled.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Self> {
        self.children.get(index).and_then(Option::as_ref)
    }

    /// Returns whether the node is a brace-delimited block.
    #[must_use]
    pub const fn is_compound(&self) -> bool {
        matches!(self.kind, StmtKind::Compound)
    }
}
