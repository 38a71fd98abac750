//! Structural classification of statement nodes.

use tprof_syntax::{Callee, Stmt, StmtKind};

/// The loop statement forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    /// `for (init; cond; step)`.
    For,
    /// `for (decl : range)`.
    RangeFor,
    /// `while (cond)`.
    While,
    /// `do … while (cond);`.
    Do,
}

impl LoopKind {
    /// Returns the last character of the loop header, where an opening
    /// brace for the body belongs.
    #[must_use]
    pub const fn header_terminator(self) -> char {
        match self {
            Self::For | Self::RangeFor | Self::While => ')',
            Self::Do => 'o',
        }
    }
}

/// A node viewed through the roles the analysis passes care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified<'t> {
    /// A loop and its body, if the body slot is filled.
    Loop {
        /// Which loop form.
        kind: LoopKind,
        /// The loop body.
        body: Option<&'t Stmt>,
    },
    /// An `if` statement and its branches.
    Conditional {
        /// The then-branch.
        then_branch: Option<&'t Stmt>,
        /// The else-branch, possibly another conditional.
        else_branch: Option<&'t Stmt>,
    },
    /// A call expression.
    Call {
        /// The callee name for direct calls.
        callee: Option<&'t str>,
    },
    /// Anything else.
    Other,
}

/// Classifies `node` by its kind tag.
#[must_use]
pub fn classify(node: &Stmt) -> Classified<'_> {
    let as_loop = |kind, body: usize| Classified::Loop {
        kind,
        body: node.child(body),
    };
    match node.kind() {
        StmtKind::For { body } => as_loop(LoopKind::For, *body),
        StmtKind::RangeFor { body } => as_loop(LoopKind::RangeFor, *body),
        StmtKind::While { body } => as_loop(LoopKind::While, *body),
        StmtKind::Do { body } => as_loop(LoopKind::Do, *body),
        StmtKind::If {
            then_branch,
            else_branch,
        } => Classified::Conditional {
            then_branch: node.child(*then_branch),
            else_branch: else_branch.and_then(|slot| node.child(slot)),
        },
        StmtKind::Call { callee } => Classified::Call {
            callee: match callee {
                Callee::Direct { name } => Some(name.as_str()),
                Callee::Indirect => None,
            },
        },
        StmtKind::Compound | StmtKind::Other { .. } => Classified::Other,
    }
}

/// Returns whether `node` is an `if` statement.
#[must_use]
pub const fn is_conditional(node: &Stmt) -> bool {
    matches!(node.kind(), StmtKind::If { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tprof_syntax::{SourceLocation, SourceManager, SourceSpan};

    fn span() -> SourceSpan {
        let manager = SourceManager::new("t.c", "");
        let at = SourceLocation::new(manager.main_file_id(), 0);
        SourceSpan::new(at, at)
    }

    fn other() -> Stmt {
        Stmt::leaf(
            StmtKind::Other {
                tag: "expression_statement",
            },
            span(),
        )
    }

    #[rstest]
    #[case(StmtKind::For { body: 1 }, LoopKind::For)]
    #[case(StmtKind::RangeFor { body: 1 }, LoopKind::RangeFor)]
    #[case(StmtKind::While { body: 1 }, LoopKind::While)]
    #[case(StmtKind::Do { body: 1 }, LoopKind::Do)]
    fn loops_expose_their_body(#[case] kind: StmtKind, #[case] expected: LoopKind) {
        let node = Stmt::new(kind, span(), vec![None, Some(other())]);
        let Classified::Loop { kind: found, body } = classify(&node) else {
            panic!("expected a loop");
        };
        assert_eq!(found, expected);
        assert_eq!(body, Some(&other()));
    }

    #[test]
    fn header_terminators() {
        assert_eq!(LoopKind::While.header_terminator(), ')');
        assert_eq!(LoopKind::Do.header_terminator(), 'o');
    }

    #[test]
    fn conditional_without_else() {
        let node = Stmt::new(
            StmtKind::If {
                then_branch: 1,
                else_branch: None,
            },
            span(),
            vec![None, Some(other())],
        );
        assert_eq!(
            classify(&node),
            Classified::Conditional {
                then_branch: Some(&other()),
                else_branch: None,
            }
        );
        assert!(is_conditional(&node));
    }

    #[rstest]
    #[case(Callee::Direct { name: "doWork".to_owned() }, Some("doWork"))]
    #[case(Callee::Indirect, None)]
    fn calls_expose_direct_callees(#[case] callee: Callee, #[case] expected: Option<&str>) {
        let node = Stmt::leaf(StmtKind::Call { callee }, span());
        assert_eq!(classify(&node), Classified::Call { callee: expected });
    }

    #[rstest]
    #[case(StmtKind::Compound)]
    #[case(StmtKind::Other { tag: "return_statement" })]
    fn everything_else_is_other(#[case] kind: StmtKind) {
        assert_eq!(classify(&Stmt::leaf(kind, span())), Classified::Other);
    }
}
