//! Batch outcomes and their aggregation into a single response shape.
//!
//! Per-item partial failure is modelled as two accumulator lists, never as
//! exceptions: each item's outcome is a value, so one bad item cannot
//! short-circuit the loop that produced it.

/// Accumulated outcome of one batch, input order preserved in both lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    succeeded: Vec<String>,
    failed: Vec<String>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a human-readable description of a successful item.
    pub fn record_success(&mut self, message: impl Into<String>) {
        self.succeeded.push(message.into());
    }

    /// Record a failure description for one item; the batch continues.
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failed.push(message.into());
    }

    pub fn succeeded(&self) -> &[String] {
        &self.succeeded
    }

    pub fn failed(&self) -> &[String] {
        &self.failed
    }
}

/// Which mutation produced a batch outcome.
///
/// Determines both the overall status on partial failure and the primary
/// key under which successes are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationContext {
    Add,
    Delete,
}

impl MutationContext {
    /// JSON key carrying the success descriptions for this mutation.
    pub fn primary_key(self) -> &'static str {
        match self {
            Self::Add => "addedUsers",
            Self::Delete => "deleted",
        }
    }
}

/// Transport-agnostic status of an aggregated batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Ok,
    Conflict,
    NotFound,
    BadRequest,
}

/// A batch outcome folded into one uniform response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateResponse {
    /// A processed batch: successes under the context's primary key, plus
    /// an `errors` list only when failures exist.
    Batch {
        context: MutationContext,
        outcome: BatchOutcome,
    },
    /// The request carried nothing to process at all. The body carries only
    /// this message, never success or error lists.
    IncorrectRequest { message: String },
}

impl AggregateResponse {
    /// Fold an orchestrator outcome into a response.
    pub fn from_outcome(context: MutationContext, outcome: BatchOutcome) -> Self {
        Self::Batch { context, outcome }
    }

    /// Response for an entry point whose item list was empty after parsing.
    pub fn incorrect_request(message: impl Into<String>) -> Self {
        Self::IncorrectRequest {
            message: message.into(),
        }
    }

    /// Overall status per the aggregation decision table: an Add with any
    /// failure is a conflict, a Delete with any failure is not-found, an
    /// empty request is a bad request, everything else is ok.
    pub fn status(&self) -> BatchStatus {
        match self {
            Self::IncorrectRequest { .. } => BatchStatus::BadRequest,
            Self::Batch { context, outcome } => {
                if outcome.failed().is_empty() {
                    BatchStatus::Ok
                } else {
                    match context {
                        MutationContext::Add => BatchStatus::Conflict,
                        MutationContext::Delete => BatchStatus::NotFound,
                    }
                }
            }
        }
    }
}
