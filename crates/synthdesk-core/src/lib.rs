pub mod mock;
pub mod orchestrator;
pub mod paste;
pub mod resolver;
pub mod schema;
pub mod service;
pub mod table;

// Re-export for convenience
pub use orchestrator::{
    BatchDecision, PendingDecision, SubmissionOutcome, SubmissionRequest, SubmitError,
    ValidationError, begin_submission, resume_submission,
};
pub use paste::parse_paste;
pub use resolver::{BatchResolver, ResolverError, ResolverState};
pub use schema::{
    FieldSchema, OPERATOR_FIELD, SAMPLE_DESCRIPTION_FIELD, SAMPLE_NAME_FIELD, SchemaError,
    TIMESTAMP_FIELD,
};
pub use service::{
    BatchCreationRequest, BatchMatch, BatchResolution, BatchResolutionRequest, LoginOutcome,
    OperatorIdentity, SampleService, ServiceError, ServiceFuture, UploadPayload, UploadReceipt,
    UploadSummary,
};
pub use table::{RowId, SampleRow, TableModel};
