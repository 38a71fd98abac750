//! Behaviour-driven development (BDD) step definitions for tprof-analysis
//! scenarios.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tprof_syntax::{SupportedLanguage, TranslationUnit};

use crate::{
    BraceGuardEngine, DiscardSink, FunctionRecord, FunctionUnitDriver, GuardOutcome,
    StructuralExtractor,
};

// =============================================================================
// Test World
// =============================================================================

/// State shared across BDD steps.
#[derive(Default)]
struct TestWorld {
    /// Source text under analysis.
    source: String,
    /// Outcome of the last brace-guarding run.
    guarded: Option<GuardOutcome>,
    /// Records of the last extraction run.
    records: Vec<FunctionRecord>,
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

/// Strips surrounding double quotes and expands `\n` escapes.
fn unquote(s: &str) -> String {
    s.trim_matches('"').replace("\\n", "\n")
}

fn run_guard(source: &str) -> GuardOutcome {
    let unit = TranslationUnit::parse("scenario.c", source, SupportedLanguage::C)
        .expect("scenario source should parse");
    let mut engine = BraceGuardEngine::new();
    let report = FunctionUnitDriver::new(&unit).run(&mut engine, &mut DiscardSink);
    assert!(report.is_success());
    engine.finish(source).expect("edits should apply")
}

// =============================================================================
// Given Steps
// =============================================================================

#[given("C source {code}")]
fn given_source(world: &RefCell<TestWorld>, code: String) {
    world.borrow_mut().source = unquote(&code);
}

// =============================================================================
// When Steps
// =============================================================================

#[when("brace guarding runs")]
fn when_guarding(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    w.guarded = Some(run_guard(&w.source));
}

#[when("brace guarding runs twice")]
fn when_guarding_twice(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let first = run_guard(&w.source);
    w.guarded = Some(run_guard(&first.patched));
}

#[when("structural extraction runs")]
fn when_extracting(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let unit = TranslationUnit::parse("scenario.c", w.source.clone(), SupportedLanguage::C)
        .expect("scenario source should parse");
    let mut records = Vec::new();
    let report = FunctionUnitDriver::new(&unit).run(&mut StructuralExtractor, &mut records);
    assert!(report.is_success());
    w.records = records;
}

// =============================================================================
// Then Steps
// =============================================================================

#[then("the patched source is {expected}")]
fn then_patched(world: &RefCell<TestWorld>, expected: String) {
    let w = world.borrow();
    let outcome = w.guarded.as_ref().expect("guarding should have run");
    assert_eq!(outcome.patched, unquote(&expected));
}

#[then("{count} edits were applied")]
fn then_edit_count(world: &RefCell<TestWorld>, count: usize) {
    let w = world.borrow();
    let outcome = w.guarded.as_ref().expect("guarding should have run");
    assert_eq!(outcome.edits, count);
}

#[then("the record for {name} lists {facts}")]
fn then_record_facts(world: &RefCell<TestWorld>, name: String, facts: String) {
    let w = world.borrow();
    let wanted = unquote(&name);
    let record = w
        .records
        .iter()
        .find(|record| record.identifier() == wanted)
        .expect("record should exist");
    let rendered: Vec<String> = record.facts().iter().map(ToString::to_string).collect();
    assert_eq!(rendered.join("|"), unquote(&facts));
}

#[then("{count} record is produced")]
fn then_record_count(world: &RefCell<TestWorld>, count: usize) {
    assert_eq!(world.borrow().records.len(), count);
}

// =============================================================================
// Scenario Bindings
// =============================================================================

#[scenario(
    path = "tests/features/tprof_analysis.feature",
    name = "A single-statement for loop is guarded"
)]
fn for_loop_guarded(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tprof_analysis.feature",
    name = "Guarded output is left alone"
)]
fn guarded_output_left_alone(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tprof_analysis.feature",
    name = "Both branches of an if/else are guarded"
)]
fn if_else_guarded(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tprof_analysis.feature",
    name = "Loops and calls are extracted in source order"
)]
fn facts_in_source_order(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tprof_analysis.feature",
    name = "Declarations without bodies produce no record"
)]
fn declarations_produce_no_record(world: RefCell<TestWorld>) {
    let _ = world;
}
