//! Batch-identifier disambiguation.
//!
//! Resolution is deliberately pulled out of the automatic pipeline: silently
//! picking among same-named batches, or fabricating a new batch on a typo,
//! would corrupt sample provenance irreversibly once uploaded. The resolver
//! therefore models the pause as explicit states the caller must drive.

use thiserror::Error;
use tracing::debug;

use crate::service::{
    BatchCreationRequest, BatchMatch, BatchResolution, BatchResolutionRequest, SampleService,
    ServiceError,
};

/// Resolver position. Legal edges:
/// `Idle → Resolving → {Resolved, NotFound, MultipleMatches}`,
/// `NotFound → CreatingBatch → Resolved | Failed`,
/// `MultipleMatches → Selecting → Resolved`, and any non-idle, non-terminal
/// state may move to `Skipped` via explicit cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverState {
    Idle,
    Resolving,
    Resolved { batch_uuid: String },
    NotFound { input: String },
    MultipleMatches { matches: Vec<BatchMatch> },
    CreatingBatch,
    Selecting,
    Skipped,
    Failed { message: String },
}

impl ResolverState {
    fn name(&self) -> &'static str {
        match self {
            ResolverState::Idle => "Idle",
            ResolverState::Resolving => "Resolving",
            ResolverState::Resolved { .. } => "Resolved",
            ResolverState::NotFound { .. } => "NotFound",
            ResolverState::MultipleMatches { .. } => "MultipleMatches",
            ResolverState::CreatingBatch => "CreatingBatch",
            ResolverState::Selecting => "Selecting",
            ResolverState::Skipped => "Skipped",
            ResolverState::Failed { .. } => "Failed",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    /// Locally detected bad input; no service call was made.
    #[error("{0}")]
    Validation(String),
    /// The requested operation is not legal from the current state.
    #[error("cannot {operation} from resolver state {from}")]
    IllegalTransition {
        from: &'static str,
        operation: &'static str,
    },
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Drives one batch disambiguation from entry to a terminal state.
///
/// One resolver serves one submission attempt; construct a fresh one per
/// attempt so a stale terminal state can never leak into the next.
#[derive(Debug)]
pub struct BatchResolver {
    state: ResolverState,
}

impl Default for BatchResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchResolver {
    pub fn new() -> Self {
        Self {
            state: ResolverState::Idle,
        }
    }

    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    /// Ask the service what the entered identifier text matches.
    ///
    /// Only legal from `Idle`. A transport failure parks the resolver in
    /// `Failed`; the ambiguous outcomes are states, not errors.
    pub async fn resolve(
        &mut self,
        service: &dyn SampleService,
        request: BatchResolutionRequest,
    ) -> Result<BatchResolution, ResolverError> {
        if self.state != ResolverState::Idle {
            return Err(self.illegal("resolve"));
        }
        self.state = ResolverState::Resolving;
        debug!(input = %request.batch_id_text, "resolving batch identifier");

        match service.resolve_batch(request).await {
            Ok(resolution) => {
                self.state = match &resolution {
                    BatchResolution::Resolved { batch_uuid } => ResolverState::Resolved {
                        batch_uuid: batch_uuid.clone(),
                    },
                    BatchResolution::NotFound { input } => ResolverState::NotFound {
                        input: input.clone(),
                    },
                    BatchResolution::MultipleMatches { matches } => {
                        ResolverState::MultipleMatches {
                            matches: matches.clone(),
                        }
                    }
                };
                debug!(state = self.state.name(), "batch resolution outcome");
                Ok(resolution)
            }
            Err(err) => {
                self.state = ResolverState::Failed {
                    message: err.to_string(),
                };
                Err(err.into())
            }
        }
    }

    /// Create the batch the operator described after a `NotFound` outcome.
    ///
    /// Name and identifier text are validated locally before any service
    /// call. Only legal from `NotFound`.
    pub async fn create_batch(
        &mut self,
        service: &dyn SampleService,
        request: BatchCreationRequest,
    ) -> Result<String, ResolverError> {
        if !matches!(self.state, ResolverState::NotFound { .. }) {
            return Err(self.illegal("create batch"));
        }
        if request.batch_name.trim().is_empty() {
            return Err(ResolverError::Validation(
                "batch name is required".to_string(),
            ));
        }
        if request.batch_id.trim().is_empty() {
            return Err(ResolverError::Validation(
                "batch identifier is required".to_string(),
            ));
        }

        self.state = ResolverState::CreatingBatch;
        match service.create_batch(request).await {
            Ok(batch_uuid) => {
                debug!(%batch_uuid, "batch created");
                self.state = ResolverState::Resolved {
                    batch_uuid: batch_uuid.clone(),
                };
                Ok(batch_uuid)
            }
            Err(err) => {
                self.state = ResolverState::Failed {
                    message: err.to_string(),
                };
                Err(err.into())
            }
        }
    }

    /// Accept the operator's pick from a `MultipleMatches` candidate list.
    ///
    /// Fails without any service interaction when the chosen id is not among
    /// the candidates. Only legal from `MultipleMatches`.
    pub fn select_match(&mut self, chosen_unique_id: &str) -> Result<String, ResolverError> {
        let matches = match &self.state {
            ResolverState::MultipleMatches { matches } => matches.clone(),
            _ => return Err(self.illegal("select match")),
        };
        self.state = ResolverState::Selecting;

        if matches.iter().any(|m| m.unique_id == chosen_unique_id) {
            self.state = ResolverState::Resolved {
                batch_uuid: chosen_unique_id.to_string(),
            };
            Ok(chosen_unique_id.to_string())
        } else {
            // Bad pick leaves the candidates available for another try.
            self.state = ResolverState::MultipleMatches { matches };
            Err(ResolverError::Validation(format!(
                "'{chosen_unique_id}' is not one of the candidate batches"
            )))
        }
    }

    /// Explicit cancellation: proceed without a batch linkage.
    ///
    /// Legal from any non-idle, non-terminal state; returns false otherwise.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            ResolverState::Idle
            | ResolverState::Resolved { .. }
            | ResolverState::Skipped
            | ResolverState::Failed { .. } => false,
            _ => {
                self.state = ResolverState::Skipped;
                true
            }
        }
    }

    fn illegal(&self, operation: &'static str) -> ResolverError {
        ResolverError::IllegalTransition {
            from: self.state.name(),
            operation,
        }
    }
}
