//! The capability interface the core consumes: a transport-agnostic view of
//! the sample-tracking service, plus the request/response shapes it binds to.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed future returned by [`SampleService`] methods.
pub type ServiceFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ServiceError>> + Send + 'a>>;

/// Failure of a capability call, split along the recovery boundary: transport
/// failures never reached the service; rejections are the service saying no.
/// Both are surfaced to the operator as non-fatal messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("network failure: {0}")]
    Transport(String),
    #[error("{0}")]
    Rejected(String),
}

/// The authenticated operator, as returned by the login capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorIdentity {
    pub name: String,
    pub email: String,
    pub orcid: String,
    /// Projects the operator may submit to, sorted by the service.
    pub projects: Vec<String>,
}

/// Outcome of authentication. An unknown email is a denial, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn {
        user: OperatorIdentity,
        session_token: String,
    },
    Denied {
        message: String,
    },
}

/// Immutable once issued; identifies one resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResolutionRequest {
    pub batch_id_text: String,
    pub orcid: String,
    pub project: String,
}

/// One candidate batch in a `MultipleMatches` outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMatch {
    pub unique_id: String,
    pub sample_name: String,
    pub description: Option<String>,
    pub creation_date: Option<String>,
}

/// The three modeled outcomes of batch-identifier resolution. `NotFound` and
/// `MultipleMatches` are expected branches requiring a human decision, not
/// errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchResolution {
    Resolved { batch_uuid: String },
    NotFound { input: String },
    MultipleMatches { matches: Vec<BatchMatch> },
}

impl BatchResolution {
    pub fn resolved(batch_uuid: impl Into<String>) -> Self {
        Self::Resolved {
            batch_uuid: batch_uuid.into(),
        }
    }

    pub fn not_found(input: impl Into<String>) -> Self {
        Self::NotFound {
            input: input.into(),
        }
    }

    pub fn multiple_matches(matches: Vec<BatchMatch>) -> Self {
        Self::MultipleMatches { matches }
    }
}

/// User-supplied details for creating a batch after a `NotFound` outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCreationRequest {
    pub batch_name: String,
    pub batch_id: String,
    pub description: Option<String>,
    pub orcid: String,
    pub project: String,
}

/// The one externally transmitted form of the table: cleaned rows plus the
/// submission context. `data` carries no transient row identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub email: String,
    pub orcid: String,
    pub operator_name: String,
    pub project: String,
    pub synthesis_type: String,
    pub batch_uuid: Option<String>,
    pub session_name: Option<String>,
    pub data: Vec<BTreeMap<String, String>>,
}

/// Per-run result summary for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub project: String,
    pub synthesis_type: String,
    pub samples_uploaded: u32,
    pub failed: u32,
    pub total_rows: u32,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// A successful upload response: the service's status message plus summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub message: String,
    pub summary: UploadSummary,
}

/// The sample-tracking service, seen as five opaque remote procedure calls.
///
/// Implementations own the transport; the core never observes anything beyond
/// these shapes. Methods take owned requests so the returned futures borrow
/// only the service itself.
pub trait SampleService: Send + Sync {
    /// Authenticate by email and fetch the operator's identity and projects.
    fn authenticate(&self, email: String) -> ServiceFuture<'_, LoginOutcome>;

    /// Fetch the field schema for every synthesis type.
    fn synthesis_fields(&self) -> ServiceFuture<'_, BTreeMap<String, Vec<String>>>;

    /// Resolve human-entered batch identifier text to zero, one or many batches.
    fn resolve_batch(
        &self,
        request: BatchResolutionRequest,
    ) -> ServiceFuture<'_, BatchResolution>;

    /// Create a new batch; returns its canonical unique id.
    fn create_batch(&self, request: BatchCreationRequest) -> ServiceFuture<'_, String>;

    /// Upload cleaned synthesis rows.
    fn upload(&self, payload: UploadPayload) -> ServiceFuture<'_, UploadReceipt>;
}
