//! Turn extraction pipeline
//!
//! Chat sites do not document their markup and change it often, so no single
//! rule finds the turns reliably. Extraction is a cascade of independent
//! strategies tried in priority order:
//!
//! 1. [`AttributeMatch`]: explicit author-role attributes
//! 2. [`ScopedContainer`]: turn containers with a nested role marker
//! 3. [`StructuralPosition`]: alternating blocks in the main region
//! 4. [`FuzzyNameMatch`]: chat-ish class names plus a role signal
//!
//! Every strategy's candidates pass through [`ValidityRules`]. The first
//! strategy with at least one accepted candidate wins; its result is
//! deduplicated and no other strategy's output is mixed in.

mod strategies;
mod validity;

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::dom::{ElementId, Page};

pub use strategies::{AttributeMatch, FuzzyNameMatch, Parity, ScopedContainer, StructuralPosition};
pub use validity::{Rejection, ValidityRules};

/// A heuristic that proposes candidate turn elements.
pub trait Strategy {
    /// Short name used in diagnostics (e.g. "attribute").
    fn name(&self) -> &'static str;

    /// Candidate elements under `root`, in document order.
    fn candidates(&self, page: &Page, root: ElementId) -> Vec<ElementId>;
}

/// Diagnostics for one strategy run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyAttempt {
    pub strategy: &'static str,
    /// Raw candidates before validity filtering
    pub candidates: usize,
    /// Candidates left after filtering and deduplication
    pub accepted: usize,
}

/// Result of running a cascade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeOutcome {
    /// Accepted elements of the winning strategy, deduplicated, in document order
    pub elements: Vec<ElementId>,
    /// Name of the winning strategy, `None` when nothing was found
    pub strategy: Option<&'static str>,
    /// Every strategy tried, in order
    pub attempts: Vec<StrategyAttempt>,
}

impl CascadeOutcome {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }
}

/// Ordered strategies plus the validity rules their output must pass.
pub struct Cascade {
    label: &'static str,
    strategies: Vec<Box<dyn Strategy>>,
    rules: ValidityRules,
}

impl Cascade {
    /// Empty cascade; `label` names it in logs (e.g. "chatgpt/prompts").
    pub fn new(label: &'static str, rules: ValidityRules) -> Self {
        Self {
            label,
            strategies: Vec::new(),
            rules,
        }
    }

    /// Append a strategy at the lowest priority.
    pub fn then(mut self, strategy: impl Strategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Strategy names in priority order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the cascade and report which strategy won.
    pub fn run(&self, page: &Page, root: ElementId) -> CascadeOutcome {
        let outcome = self.evaluate(page, root, true);
        match outcome.strategy {
            Some(strategy) => info!(
                cascade = self.label,
                strategy,
                count = outcome.len(),
                "located turns"
            ),
            None => debug!(cascade = self.label, "no strategy matched"),
        }
        outcome
    }

    /// Number of elements [`Cascade::run`] would return, without the logging.
    pub fn count(&self, page: &Page, root: ElementId) -> usize {
        self.evaluate(page, root, false).len()
    }

    fn evaluate(&self, page: &Page, root: ElementId, verbose: bool) -> CascadeOutcome {
        let mut outcome = CascadeOutcome::default();

        for strategy in &self.strategies {
            let raw = strategy.candidates(page, root);
            let candidates = raw.len();
            let accepted = dedupe(
                raw.into_iter()
                    .filter(|el| self.rules.accepts(page, *el))
                    .collect(),
            );

            if verbose {
                debug!(
                    cascade = self.label,
                    strategy = strategy.name(),
                    candidates,
                    accepted = accepted.len(),
                    "strategy attempt"
                );
            } else {
                trace!(
                    cascade = self.label,
                    strategy = strategy.name(),
                    accepted = accepted.len(),
                    "count attempt"
                );
            }

            outcome.attempts.push(StrategyAttempt {
                strategy: strategy.name(),
                candidates,
                accepted: accepted.len(),
            });

            if !accepted.is_empty() {
                outcome.strategy = Some(strategy.name());
                outcome.elements = accepted;
                break;
            }
        }

        outcome
    }
}

/// Remove repeated handles, keeping the first occurrence.
pub fn dedupe(elements: Vec<ElementId>) -> Vec<ElementId> {
    let mut seen = HashSet::with_capacity(elements.len());
    elements.into_iter().filter(|el| seen.insert(*el)).collect()
}
