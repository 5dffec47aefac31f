//! Concrete carts wired to the filesystem store.

use std::path::PathBuf;

use cart_core::{
    CART_ORDER, Cart, CartOutcome, Event, LOCATION_TRACKER, MEMORY_SEARCH, Point,
    ROBOTIC_BUILDER, RunContext, SIGNAL_GENERATOR, UnavailableCart, aggregate,
    create_build_artifact, generate_signal,
};
use cart_store::{CartConfig, MemorySource, ResolvedPaths, full_search};
use serde_json::json;

pub const STANDBY_MESSAGE: &str = "Location tracking in standby mode";

pub const DEMO_USER: &str = "demo";

/// Searches memory text. With a query, token files and the ledger index are
/// searched too; the memory matches are handed on to the builder.
pub struct MemorySearchCart {
    memory: MemorySource,
    tokens: PathBuf,
    ledger: PathBuf,
}

impl MemorySearchCart {
    pub fn new(memory: MemorySource, tokens: PathBuf, ledger: PathBuf) -> Self {
        Self {
            memory,
            tokens,
            ledger,
        }
    }
}

impl Cart for MemorySearchCart {
    fn name(&self) -> &str {
        MEMORY_SEARCH
    }

    fn run(&mut self, ctx: &mut RunContext) -> CartOutcome {
        println!("🔍 Running Memory Search Cart...");
        match ctx.query.as_deref().filter(|q| !q.is_empty()) {
            Some(query) => {
                let results = full_search(&self.memory, &self.tokens, &self.ledger, query);
                ctx.memory_matches = results.brain_results.matches.clone();
                CartOutcome::completed(&results)
            }
            None => {
                let results = self.memory.search(None);
                ctx.memory_matches = results.matches.clone();
                CartOutcome::completed(&results)
            }
        }
    }
}

pub struct SignalCart;

impl Cart for SignalCart {
    fn name(&self) -> &str {
        SIGNAL_GENERATOR
    }

    fn run(&mut self, ctx: &mut RunContext) -> CartOutcome {
        println!("📡 Running Signal Generator Cart...");
        CartOutcome::completed(&generate_signal(&ctx.token_hash, ctx.token_value))
    }
}

pub struct BuilderCart;

impl Cart for BuilderCart {
    fn name(&self) -> &str {
        ROBOTIC_BUILDER
    }

    fn run(&mut self, ctx: &mut RunContext) -> CartOutcome {
        println!("🤖 Running Robotic Builder Cart...");
        let content = ctx.memory_content();
        CartOutcome::completed(&create_build_artifact(
            &ctx.token_hash,
            ctx.token_value,
            &content,
        ))
    }
}

pub struct LocationCart {
    demo: bool,
}

impl LocationCart {
    pub fn new(demo: bool) -> Self {
        Self { demo }
    }
}

/// A tap followed by a diagonal slide.
pub fn demo_events() -> Vec<Event> {
    vec![
        Event::tap(100.0, 200.0, 0.8, Some(DEMO_USER)),
        Event::slide(
            Point { x: 100.0, y: 200.0 },
            Point { x: 300.0, y: 400.0 },
            0.5,
            Some(DEMO_USER),
        ),
    ]
}

impl Cart for LocationCart {
    fn name(&self) -> &str {
        LOCATION_TRACKER
    }

    fn run(&mut self, _ctx: &mut RunContext) -> CartOutcome {
        println!("📍 Running Location Tracker Cart...");
        if !self.demo {
            return CartOutcome::completed(&json!({ "message": STANDBY_MESSAGE }));
        }
        match aggregate(&demo_events()) {
            Ok(token) => CartOutcome::completed(&token),
            Err(e) => CartOutcome::completed(&json!({ "error": e.to_string() })),
        }
    }
}

/// The carts of a full run, in run order. Disabled carts are replaced by
/// [`UnavailableCart`].
pub fn lineup(config: &CartConfig, paths: &ResolvedPaths) -> Vec<Box<dyn Cart>> {
    CART_ORDER
        .iter()
        .map(|&name| -> Box<dyn Cart> {
            if config.is_disabled(name) {
                tracing::info!("cart {name} is disabled");
                return Box::new(UnavailableCart::new(name));
            }
            match name {
                MEMORY_SEARCH => Box::new(MemorySearchCart::new(
                    MemorySource::open(&paths.memory),
                    paths.tokens.clone(),
                    paths.ledger.clone(),
                )),
                SIGNAL_GENERATOR => Box::new(SignalCart),
                ROBOTIC_BUILDER => Box::new(BuilderCart),
                LOCATION_TRACKER => Box::new(LocationCart::new(config.run.location_demo)),
                other => Box::new(UnavailableCart::new(other)),
            }
        })
        .collect()
}
