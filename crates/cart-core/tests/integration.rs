//! Integration tests driving the orchestrator end to end with carts built
//! from the real derivations and an in-memory activity sink.

use std::cell::RefCell;

use cart_core::{
    ActivityLogDocument, ActivityLogEntry, ActivitySink, BuildArtifact, Cart, CartOutcome, Event,
    LOCATION_TRACKER, MEMORY_SEARCH, Point, ROBOTIC_BUILDER, RunContext, RunState, Runner,
    SIGNAL_GENERATOR, Token, UnavailableCart, aggregate, create_build_artifact, generate_signal,
    search_text,
};

const BRAIN: &str = "\
#====BLOCK====
# The cat walked through the forest.
# Water flowed in the river nearby.
#====BLOCK====
# A woman watched the cat sleep.
# CATS and PEOPLE";

struct TextMemoryCart(&'static str);

impl Cart for TextMemoryCart {
    fn name(&self) -> &str {
        MEMORY_SEARCH
    }

    fn run(&mut self, ctx: &mut RunContext) -> CartOutcome {
        let result = search_text(self.0, ctx.query.as_deref());
        ctx.memory_matches = result.matches.clone();
        CartOutcome::completed(&result)
    }
}

struct SignalCart;

impl Cart for SignalCart {
    fn name(&self) -> &str {
        SIGNAL_GENERATOR
    }

    fn run(&mut self, ctx: &mut RunContext) -> CartOutcome {
        CartOutcome::completed(&generate_signal(&ctx.token_hash, ctx.token_value))
    }
}

struct BuilderCart;

impl Cart for BuilderCart {
    fn name(&self) -> &str {
        ROBOTIC_BUILDER
    }

    fn run(&mut self, ctx: &mut RunContext) -> CartOutcome {
        let content = ctx.memory_content();
        CartOutcome::completed(&create_build_artifact(
            &ctx.token_hash,
            ctx.token_value,
            &content,
        ))
    }
}

struct LocationCart;

impl Cart for LocationCart {
    fn name(&self) -> &str {
        LOCATION_TRACKER
    }

    fn run(&mut self, _ctx: &mut RunContext) -> CartOutcome {
        let events = vec![
            Event::tap(100.0, 200.0, 0.8, Some("demo")),
            Event::slide(
                Point { x: 100.0, y: 200.0 },
                Point { x: 300.0, y: 400.0 },
                0.5,
                Some("demo"),
            ),
        ];
        match aggregate(&events) {
            Ok(token) => CartOutcome::completed(&token),
            Err(e) => CartOutcome::completed(&serde_json::json!({ "error": e.to_string() })),
        }
    }
}

#[derive(Default)]
struct MemorySink(RefCell<ActivityLogDocument>);

impl ActivitySink for MemorySink {
    type Error = std::convert::Infallible;

    fn append(&self, entry: ActivityLogEntry) -> Result<(), Self::Error> {
        self.0.borrow_mut().activities.push(entry);
        Ok(())
    }
}

fn lineup() -> Vec<Box<dyn Cart>> {
    vec![
        Box::new(TextMemoryCart(BRAIN)),
        Box::new(SignalCart),
        Box::new(BuilderCart),
        Box::new(LocationCart),
    ]
}

#[test]
fn full_run_completes_every_cart() {
    let mut ctx = RunContext::new(Some("cat".to_string()), "0".repeat(64), 18_160_000_000.0);
    let mut runner = Runner::new();
    let report = runner.run_all(&mut lineup(), &mut ctx).clone();

    assert_eq!(report.summary.total_carts, 4);
    assert_eq!(report.summary.completed, 4);
    assert_eq!(report.headline_value(), 18_160_000_000.0);
    assert!(report.commit_message().contains("4/4 carts completed"));
    assert!(report.commit_message().contains("$18.16B"));

    let memory = report.carts[MEMORY_SEARCH].results().unwrap();
    assert_eq!(memory["stats"]["match_count"], 3);
}

#[test]
fn memory_matches_seed_the_builder() {
    let mut ctx = RunContext::new(Some("cat".to_string()), "abc", 5.0);
    let mut runner = Runner::new();
    let report = runner.run_all(&mut lineup(), &mut ctx).clone();

    let results = report.carts[ROBOTIC_BUILDER].results().unwrap().clone();
    let artifact: BuildArtifact = serde_json::from_value(results).unwrap();
    // three matched lines: cat/forest, woman/cat, CATS (cat)
    assert!(artifact.patterns.themes["nature"] >= 3);
    assert!(artifact.patterns.themes.contains_key("people"));
    assert!(
        artifact
            .build_config
            .features
            .contains(&"social_analysis".to_string())
    );
}

#[test]
fn no_query_leaves_builder_without_themes() {
    let mut ctx = RunContext::new(None, "abc", 5.0);
    let mut runner = Runner::new();
    let report = runner.run_all(&mut lineup(), &mut ctx).clone();

    let results = report.carts[ROBOTIC_BUILDER].results().unwrap().clone();
    let artifact: BuildArtifact = serde_json::from_value(results).unwrap();
    assert!(artifact.patterns.themes.is_empty());
    assert_eq!(artifact.build_config.features, vec!["standard_processing"]);
}

#[test]
fn location_token_scenario() {
    let mut ctx = RunContext::new(None, "abc", 5.0);
    let mut runner = Runner::new();
    let report = runner.run_all(&mut lineup(), &mut ctx).clone();

    let results = report.carts[LOCATION_TRACKER].results().unwrap().clone();
    let token: Token = serde_json::from_value(results).unwrap();
    assert_eq!(token.event_count, 2);
    assert!((token.total_value - 175.05).abs() < 0.01);
    assert_eq!(token.value_formatted, "$175.05");
}

#[test]
fn unavailable_cart_is_counted_but_not_completed() {
    let mut carts: Vec<Box<dyn Cart>> = vec![
        Box::new(TextMemoryCart(BRAIN)),
        Box::new(UnavailableCart::new(SIGNAL_GENERATOR)),
        Box::new(BuilderCart),
        Box::new(LocationCart),
    ];
    let mut ctx = RunContext::new(None, "abc", 5.0);
    let mut runner = Runner::new();
    runner.run_all(&mut carts, &mut ctx);

    let report = runner.report();
    assert_eq!(report.summary.total_carts, 4);
    assert_eq!(report.summary.completed, 3);
    assert_eq!(report.headline_value(), 0.0);
    assert!(report.commit_message().contains("Value: $0.00"));
}

#[test]
fn persisted_run_lands_in_sink() {
    let sink = MemorySink::default();
    let mut ctx = RunContext::new(None, "abc", 5.0);
    let mut runner = Runner::new();
    runner.run_all(&mut lineup(), &mut ctx);
    runner
        .persist(&sink, "autonomous_cart_run", serde_json::json!({}))
        .unwrap();

    assert_eq!(runner.state(), RunState::Persisted);
    let doc = sink.0.borrow();
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.activities[0].run_id, runner.run_id());
    assert_eq!(doc.activities[0].summary.total_carts, 4);
}

#[test]
fn report_json_shape() {
    let mut ctx = RunContext::new(None, "abc", 5.0);
    let mut runner = Runner::new();
    runner.run_all(&mut lineup(), &mut ctx);

    let json = serde_json::to_value(runner.report()).unwrap();
    assert!(json["timestamp"].is_string());
    assert!(json["run_id"].is_string());
    assert_eq!(json["carts"][SIGNAL_GENERATOR]["status"], "completed");
    assert!(json["carts"][SIGNAL_GENERATOR]["results"]["harmonics"].is_array());
    assert_eq!(json["summary"]["total_carts"], 4);
    assert!(json["summary"]["timestamp"].is_string());
}
