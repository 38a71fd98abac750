//! Tree-sitter parsing wrapper.
//!
//! Tree-sitter always produces a tree, recovering from errors with ERROR and
//! MISSING nodes. Spans inside a recovered region cannot be trusted for text
//! edits, so callers inspect [`ParseResult::errors`] and reject such files
//! before lowering.

use std::ops::Range;

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::position::point_to_one_based;

const COMMENT_KIND: &str = "comment";

/// A parsed tree together with the text it was parsed from.
#[derive(Debug)]
pub(crate) struct ParseResult {
    tree: tree_sitter::Tree,
    source: String,
    language: SupportedLanguage,
}

impl ParseResult {
    /// Returns the text covered by `node`.
    pub(crate) fn text_of(&self, node: tree_sitter::Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    pub(crate) const fn language(&self) -> SupportedLanguage {
        self.language
    }

    pub(crate) fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Collects every ERROR and MISSING node in source order.
    pub(crate) fn errors(&self) -> Vec<SyntaxErrorInfo> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &mut errors);
        errors
    }

    /// Byte ranges of all comments, in source order.
    pub(crate) fn comment_ranges(&self) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        collect_comments(self.tree.root_node(), &mut ranges);
        ranges
    }
}

/// Where and why the parser gave up on part of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxErrorInfo {
    /// One-based line of the first byte.
    pub(crate) line: u32,
    /// One-based column of the first byte.
    pub(crate) column: u32,
    pub(crate) message: String,
}

impl SyntaxErrorInfo {
    fn from_node(node: tree_sitter::Node<'_>) -> Self {
        let position = point_to_one_based(node.start_position());
        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            "syntax error".to_owned()
        };
        Self {
            line: position.line,
            column: position.column,
            message,
        }
    }
}

/// Tree-sitter parser configured for one dialect.
pub(crate) struct Parser {
    inner: tree_sitter::Parser,
    language: SupportedLanguage,
}

impl Parser {
    /// Creates a parser for `language`.
    pub(crate) fn new(language: SupportedLanguage) -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&language.tree_sitter_language())
            .map_err(|e| SyntaxError::parser_init(language, e.to_string()))?;

        Ok(Self { inner, language })
    }

    /// Parses `source`. Recovered syntax errors are reported through
    /// [`ParseResult::errors`], not as an `Err`.
    pub(crate) fn parse(&mut self, source: &str) -> Result<ParseResult, SyntaxError> {
        let tree = self
            .inner
            .parse(source, None)
            .ok_or_else(|| SyntaxError::parse(self.language, "parsing failed"))?;

        Ok(ParseResult {
            tree,
            source: source.to_owned(),
            language: self.language,
        })
    }
}

fn collect_error_nodes(node: tree_sitter::Node<'_>, errors: &mut Vec<SyntaxErrorInfo>) {
    if node.is_error() || node.is_missing() {
        errors.push(SyntaxErrorInfo::from_node(node));
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, errors);
    }
}

fn collect_comments(node: tree_sitter::Node<'_>, ranges: &mut Vec<Range<usize>>) {
    if node.kind() == COMMENT_KIND {
        ranges.push(node.byte_range());
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_comments(child, ranges);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(language: SupportedLanguage, source: &str) -> ParseResult {
        Parser::new(language)
            .expect("parser init")
            .parse(source)
            .expect("parse")
    }

    #[rstest]
    #[case(SupportedLanguage::C, "int main(void) { return 0; }")]
    #[case(SupportedLanguage::C, "void f(int n) { for (int i = 0; i < n; i++) g(i); }")]
    #[case(
        SupportedLanguage::Cpp,
        "namespace a { struct S { int get() const { return 1; } }; }"
    )]
    fn parser_parses_valid_source(#[case] language: SupportedLanguage, #[case] source: &str) {
        let result = parse(language, source);

        assert!(result.errors().is_empty());
        assert_eq!(result.language(), language);
    }

    #[rstest]
    #[case(SupportedLanguage::C, "int broken( {")]
    #[case(SupportedLanguage::C, "void f() { if (x) }")]
    #[case(SupportedLanguage::Cpp, "class A { void f( };")]
    fn parser_detects_syntax_errors(#[case] language: SupportedLanguage, #[case] source: &str) {
        assert!(!parse(language, source).errors().is_empty());
    }

    #[test]
    fn syntax_error_info_has_line_and_column() {
        let result = parse(SupportedLanguage::C, "void f(void) {\n    int x = ;\n}");

        let errors = result.errors();
        let first_error = errors.first().expect("has error");
        assert_eq!(first_error.line, 2);
        assert!(first_error.column >= 1);
        assert!(!first_error.message.is_empty());
    }

    #[test]
    fn text_of_returns_node_text() {
        let result = parse(SupportedLanguage::C, "int x;");
        assert_eq!(result.text_of(result.root_node()), "int x;");
    }

    #[rstest]
    #[case(SupportedLanguage::C)]
    #[case(SupportedLanguage::Cpp)]
    fn comments_are_collected_in_order(#[case] language: SupportedLanguage) {
        let source = "/* head */\nvoid f(int c) {\n  if (c) // why\n    g();\n}\n";
        let result = parse(language, source);
        let comments: Vec<&str> = result
            .comment_ranges()
            .into_iter()
            .filter_map(|range| source.get(range))
            .collect();
        assert_eq!(comments, ["/* head */", "// why"]);
    }
}
