//! Behaviour-driven development (BDD) step definitions for tprof-syntax scenarios.

use std::cell::RefCell;
use std::str::FromStr;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::{NameMangler, Stmt, StmtKind, SupportedLanguage, SyntaxError, TranslationUnit};

// =============================================================================
// Test World
// =============================================================================

/// State shared across BDD steps.
#[derive(Default)]
struct TestWorld {
    /// Language for the source under test.
    language: Option<SupportedLanguage>,
    /// Source text to parse.
    source: String,
    /// Parse outcome.
    result: Option<Result<TranslationUnit, SyntaxError>>,
}

impl TestWorld {
    fn unit(&self) -> &TranslationUnit {
        match self.result.as_ref() {
            Some(Ok(unit)) => unit,
            Some(Err(err)) => panic!("parse failed: {err}"),
            None => panic!("source should be parsed first"),
        }
    }
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

/// Strips surrounding double quotes from a string if present.
fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

fn loop_keywords(stmt: &Stmt, out: &mut Vec<&'static str>) {
    for child in stmt.children().iter().flatten() {
        match child.kind() {
            StmtKind::For { .. } | StmtKind::RangeFor { .. } => out.push("for"),
            StmtKind::While { .. } => out.push("while"),
            StmtKind::Do { .. } => out.push("do"),
            _ => {}
        }
        loop_keywords(child, out);
    }
}

// =============================================================================
// Given Steps
// =============================================================================

#[given("language {language}")]
fn given_language(world: &RefCell<TestWorld>, language: String) {
    let mut w = world.borrow_mut();
    w.language = Some(SupportedLanguage::from_str(strip_quotes(&language)).expect("language"));
}

#[given("source code {code}")]
fn given_source(world: &RefCell<TestWorld>, code: String) {
    let mut w = world.borrow_mut();
    w.source = strip_quotes(&code).replace("\\n", "\n");
}

// =============================================================================
// When Steps
// =============================================================================

#[when("the source is parsed")]
fn when_parsed(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let language = w.language.expect("language should be set");
    let result = TranslationUnit::parse("scenario", w.source.clone(), language);
    w.result = Some(result);
}

// =============================================================================
// Then Steps
// =============================================================================

#[then("parsing succeeds")]
fn then_parsing_succeeds(world: &RefCell<TestWorld>) {
    let w = world.borrow();
    let _ = w.unit();
}

#[then("{count} functions are found")]
fn then_function_count(world: &RefCell<TestWorld>, count: usize) {
    let w = world.borrow();
    assert_eq!(w.unit().functions().len(), count);
}

#[then("{count} of them has a body")]
fn then_body_count(world: &RefCell<TestWorld>, count: usize) {
    let w = world.borrow();
    let with_body = w
        .unit()
        .functions()
        .iter()
        .filter(|f| f.body().is_some())
        .count();
    assert_eq!(with_body, count);
}

#[then("the body of {name} contains the loops {loops}")]
fn then_loops(world: &RefCell<TestWorld>, name: String, loops: String) {
    let w = world.borrow();
    let wanted = strip_quotes(&name);
    let function = w
        .unit()
        .functions()
        .iter()
        .find(|f| f.name() == wanted)
        .expect("function should exist");
    let mut found = Vec::new();
    loop_keywords(function.body().expect("body"), &mut found);
    assert_eq!(found.join(","), strip_quotes(&loops));
}

#[then("parsing fails with an error on line {line}")]
fn then_parse_fails(world: &RefCell<TestWorld>, line: u32) {
    let w = world.borrow();
    match w.result.as_ref() {
        Some(Err(SyntaxError::InvalidSource { line: actual, .. })) => assert_eq!(*actual, line),
        other => panic!("expected invalid source, got {other:?}"),
    }
}

#[then("the stable names are {names}")]
fn then_stable_names(world: &RefCell<TestWorld>, names: String) {
    let w = world.borrow();
    let unit = w.unit();
    let mangler = NameMangler::new(unit.language());
    let actual: Vec<String> = unit
        .functions()
        .iter()
        .map(|f| mangler.stable_name(f))
        .collect();
    assert_eq!(actual.join(","), strip_quotes(&names));
}

// =============================================================================
// Scenario Bindings
// =============================================================================

#[scenario(
    path = "tests/features/tprof_syntax.feature",
    name = "Definitions in the main file are listed with their bodies"
)]
fn definitions_listed(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tprof_syntax.feature",
    name = "Loops are tagged with their kind"
)]
fn loops_tagged(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tprof_syntax.feature",
    name = "Syntax errors reject the file"
)]
fn syntax_errors_reject(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tprof_syntax.feature",
    name = "Overloads get distinct identifiers"
)]
fn overloads_distinct(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tprof_syntax.feature",
    name = "C functions keep their plain names"
)]
fn c_plain_names(world: RefCell<TestWorld>) {
    let _ = world;
}
