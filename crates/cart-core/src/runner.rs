//! Run orchestration: sequence carts, tally their outcomes, record the run.
//!
//! ```text
//! Idle → Running(i) → Aggregating → Persisted | PersistFailed
//! ```
//!
//! A cart never aborts a run. Whatever happens inside it comes back as a
//! [`CartOutcome`], and unavailable carts are stood in for by
//! [`UnavailableCart`]. Persisting is the caller's choice and its failure
//! leaves the in-memory report intact.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::activity::{ActivityLogEntry, ActivitySink, RunSummary};
use crate::constants::BUILD_MATCH_LIMIT;
use crate::digest::short_id;
use crate::memory::SearchMatch;
use crate::time::now_iso8601;

pub const MEMORY_SEARCH: &str = "memory_search";
pub const SIGNAL_GENERATOR: &str = "signal_generator";
pub const ROBOTIC_BUILDER: &str = "robotic_builder";
pub const LOCATION_TRACKER: &str = "location_tracker";

/// The fixed order carts run in.
pub const CART_ORDER: [&str; 4] = [MEMORY_SEARCH, SIGNAL_GENERATOR, ROBOTIC_BUILDER, LOCATION_TRACKER];

pub const UNAVAILABLE: &str = "Module not available";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    Completed,
}

/// What one cart produced. Serializes as `{status, results}` or `{error}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CartOutcome {
    Ran { status: CartStatus, results: Value },
    Errored { error: String },
}

impl CartOutcome {
    /// A completed cart. Results that cannot be encoded turn into an error outcome.
    pub fn completed(results: &impl Serialize) -> Self {
        match serde_json::to_value(results) {
            Ok(results) => CartOutcome::Ran {
                status: CartStatus::Completed,
                results,
            },
            Err(e) => CartOutcome::Errored {
                error: format!("failed to encode results: {e}"),
            },
        }
    }

    pub fn unavailable() -> Self {
        CartOutcome::Errored {
            error: UNAVAILABLE.to_string(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(
            self,
            CartOutcome::Ran {
                status: CartStatus::Completed,
                ..
            }
        )
    }

    pub fn results(&self) -> Option<&Value> {
        match self {
            CartOutcome::Ran { results, .. } => Some(results),
            CartOutcome::Errored { .. } => None,
        }
    }
}

/// Inputs shared by the carts of one run.
#[derive(Clone, Debug)]
pub struct RunContext {
    pub query: Option<String>,
    pub token_hash: String,
    pub token_value: f64,
    /// Set by the memory search cart, read by the builder.
    pub memory_matches: Vec<SearchMatch>,
}

impl RunContext {
    pub fn new(query: Option<String>, token_hash: impl Into<String>, token_value: f64) -> Self {
        Self {
            query,
            token_hash: token_hash.into(),
            token_value,
            memory_matches: Vec::new(),
        }
    }

    /// Up to [`BUILD_MATCH_LIMIT`] matched lines, newline-joined, as build input.
    pub fn memory_content(&self) -> String {
        self.memory_matches
            .iter()
            .take(BUILD_MATCH_LIMIT)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One independently invocable stage.
pub trait Cart {
    fn name(&self) -> &str;

    fn run(&mut self, ctx: &mut RunContext) -> CartOutcome;
}

/// Stand-in for a cart whose module is not available.
pub struct UnavailableCart {
    name: String,
}

impl UnavailableCart {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Cart for UnavailableCart {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, _ctx: &mut RunContext) -> CartOutcome {
        CartOutcome::unavailable()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    /// Index of the cart currently running.
    Running(usize),
    Aggregating,
    Persisted,
    PersistFailed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub timestamp: String,
    pub run_id: String,
    /// Outcomes in run order.
    pub carts: IndexMap<String, CartOutcome>,
    pub summary: RunSummary,
}

impl RunReport {
    /// The signal cart's token value, or 0 when it did not complete.
    pub fn headline_value(&self) -> f64 {
        self.carts
            .get(SIGNAL_GENERATOR)
            .and_then(CartOutcome::results)
            .and_then(|r| r.get("token_value"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    /// One-line summary suitable for a commit subject.
    pub fn commit_message(&self) -> String {
        let run: String = self.run_id.chars().take(8).collect();
        format!(
            "🧱[CART_RUN]🧱 {}/{} carts completed • Value: {} • Run: {run}",
            self.summary.completed,
            self.summary.total_carts,
            format_value(self.headline_value()),
        )
    }
}

/// Dollar figure, abbreviated to billions from $1B up.
pub fn format_value(value: f64) -> String {
    if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else {
        format!("${value:.2}")
    }
}

pub struct Runner {
    report: RunReport,
    state: RunState,
}

impl Runner {
    pub fn new() -> Self {
        Self::starting_at(now_iso8601())
    }

    /// Start a run at `timestamp`; the run id is derived from it.
    pub fn starting_at(timestamp: String) -> Self {
        let run_id = short_id(&timestamp, 16);
        Self {
            report: RunReport {
                timestamp,
                run_id,
                carts: IndexMap::new(),
                summary: RunSummary::default(),
            },
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn run_id(&self) -> &str {
        &self.report.run_id
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn into_report(self) -> RunReport {
        self.report
    }

    /// Run every cart in order and tally the outcomes. Carts sharing a name
    /// keep the first one's position and the last one's outcome.
    pub fn run_all(&mut self, carts: &mut [Box<dyn Cart>], ctx: &mut RunContext) -> &RunReport {
        for (i, cart) in carts.iter_mut().enumerate() {
            self.state = RunState::Running(i);
            let outcome = cart.run(ctx);
            self.report.carts.insert(cart.name().to_string(), outcome);
        }

        self.state = RunState::Aggregating;
        self.report.summary = RunSummary {
            total_carts: self.report.carts.len(),
            completed: self
                .report
                .carts
                .values()
                .filter(|c| c.is_completed())
                .count(),
            timestamp: now_iso8601(),
        };
        &self.report
    }

    /// Append this run to `sink`. On failure the state becomes
    /// [`RunState::PersistFailed`] and the report is still available.
    pub fn persist<S: ActivitySink>(
        &mut self,
        sink: &S,
        action: &str,
        data: Value,
    ) -> Result<(), S::Error> {
        let entry = ActivityLogEntry {
            timestamp: now_iso8601(),
            action: action.to_string(),
            run_id: self.report.run_id.clone(),
            summary: self.report.summary.clone(),
            data,
        };
        match sink.append(entry) {
            Ok(()) => {
                self.state = RunState::Persisted;
                Ok(())
            }
            Err(e) => {
                self.state = RunState::PersistFailed;
                Err(e)
            }
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}
