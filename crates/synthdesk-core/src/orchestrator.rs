//! Submission sequencing: validate, resolve the batch linkage, upload.
//!
//! Disambiguation needs a human, so submission is a two-phase protocol:
//! [`begin_submission`] either completes or hands back a [`PendingDecision`]
//! token, and [`resume_submission`] finishes it once the operator has created
//! a batch, picked a candidate, or skipped the linkage. Dropping the token is
//! the synchronous abort path and touches no network.

use thiserror::Error;
use tracing::{debug, info};

use crate::resolver::{BatchResolver, ResolverError};
use crate::service::{
    BatchCreationRequest, BatchResolution, BatchResolutionRequest, OperatorIdentity,
    SampleService, ServiceError, UploadPayload, UploadReceipt,
};
use crate::table::TableModel;

/// Everything a submission needs, borrowed from the editing session.
/// The table is read via `cleaned_snapshot()` only; orchestration never
/// mutates it.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionRequest<'a> {
    pub identity: &'a OperatorIdentity,
    pub project: &'a str,
    pub synthesis_type: &'a str,
    /// Raw batch identifier text; empty means no linkage is wanted.
    pub batch_id_text: &'a str,
    pub session_name: Option<&'a str>,
    pub table: &'a TableModel,
}

/// Locally detected missing input. Checked before any network interaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("select a project before submitting")]
    MissingProject,
    #[error("select a synthesis type before submitting")]
    MissingSynthesisType,
    #[error("the table has no rows with data")]
    EmptyTable,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Resolution(#[from] ResolverError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// What [`begin_submission`] produced: either a finished upload, or a paused
/// submission awaiting the operator's batch decision.
#[derive(Debug)]
pub enum SubmissionOutcome {
    Completed(UploadReceipt),
    Pending(PendingDecision),
}

/// A suspended submission. Owns the cleaned payload captured at begin time,
/// so edits made while the decision screen is open cannot leak into the
/// resumed upload.
#[derive(Debug)]
pub struct PendingDecision {
    resolver: BatchResolver,
    resolution: BatchResolution,
    payload: UploadPayload,
}

impl PendingDecision {
    /// The ambiguous outcome the operator must settle
    /// (`NotFound` or `MultipleMatches`).
    pub fn resolution(&self) -> &BatchResolution {
        &self.resolution
    }

    /// How many rows are waiting to be uploaded.
    pub fn row_count(&self) -> usize {
        self.payload.data.len()
    }
}

/// The operator's answer to a paused submission.
#[derive(Debug, Clone)]
pub enum BatchDecision {
    /// Create the described batch and link to it (after `NotFound`).
    Create(BatchCreationRequest),
    /// Link to this candidate (after `MultipleMatches`).
    Select { unique_id: String },
    /// Proceed without any batch linkage.
    Skip,
}

/// Phase one: validate, resolve the batch identifier if one was entered, and
/// upload unless a human decision is needed.
///
/// Validation failures return before any service call. A non-empty batch
/// identifier that resolves ambiguously suspends the submission; the caller
/// gets the resolution outcome and a token for [`resume_submission`].
pub async fn begin_submission(
    service: &dyn SampleService,
    request: SubmissionRequest<'_>,
) -> Result<SubmissionOutcome, SubmitError> {
    if request.project.trim().is_empty() {
        return Err(ValidationError::MissingProject.into());
    }
    if request.synthesis_type.trim().is_empty() {
        return Err(ValidationError::MissingSynthesisType.into());
    }
    let data = request.table.cleaned_snapshot();
    if data.is_empty() {
        return Err(ValidationError::EmptyTable.into());
    }

    let mut payload = UploadPayload {
        email: request.identity.email.clone(),
        orcid: request.identity.orcid.clone(),
        operator_name: request.identity.name.clone(),
        project: request.project.to_string(),
        synthesis_type: request.synthesis_type.to_string(),
        batch_uuid: None,
        session_name: request.session_name.map(str::to_string),
        data,
    };

    let batch_id_text = request.batch_id_text.trim();
    if !batch_id_text.is_empty() {
        let mut resolver = BatchResolver::new();
        let resolution = resolver
            .resolve(
                service,
                BatchResolutionRequest {
                    batch_id_text: batch_id_text.to_string(),
                    orcid: request.identity.orcid.clone(),
                    project: request.project.to_string(),
                },
            )
            .await?;

        match resolution {
            BatchResolution::Resolved { batch_uuid } => {
                payload.batch_uuid = Some(batch_uuid);
            }
            ambiguous @ (BatchResolution::NotFound { .. }
            | BatchResolution::MultipleMatches { .. }) => {
                debug!(rows = payload.data.len(), "submission suspended for batch decision");
                return Ok(SubmissionOutcome::Pending(PendingDecision {
                    resolver,
                    resolution: ambiguous,
                    payload,
                }));
            }
        }
    }

    let receipt = upload(service, payload).await?;
    Ok(SubmissionOutcome::Completed(receipt))
}

/// Phase two: settle the batch decision and finish the upload.
///
/// `Create` and `Select` run through the resolver's own validation, so a bad
/// candidate id or empty batch name fails here without touching the upload
/// capability. `Skip` uploads with a null linkage.
pub async fn resume_submission(
    service: &dyn SampleService,
    mut pending: PendingDecision,
    decision: BatchDecision,
) -> Result<UploadReceipt, SubmitError> {
    let batch_uuid = match decision {
        BatchDecision::Create(request) => {
            Some(pending.resolver.create_batch(service, request).await?)
        }
        BatchDecision::Select { unique_id } => {
            Some(pending.resolver.select_match(&unique_id)?)
        }
        BatchDecision::Skip => {
            pending.resolver.cancel();
            None
        }
    };

    pending.payload.batch_uuid = batch_uuid;
    let receipt = upload(service, pending.payload).await?;
    Ok(receipt)
}

async fn upload(
    service: &dyn SampleService,
    payload: UploadPayload,
) -> Result<UploadReceipt, ServiceError> {
    info!(
        project = %payload.project,
        synthesis_type = %payload.synthesis_type,
        rows = payload.data.len(),
        linked = payload.batch_uuid.is_some(),
        "uploading synthesis data"
    );
    let receipt = service.upload(payload).await?;
    info!(message = %receipt.message, "upload accepted");
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockService;
    use crate::schema::FieldSchema;
    use crate::service::{BatchMatch, UploadSummary};
    use crate::table::TableModel;

    fn identity() -> OperatorIdentity {
        OperatorIdentity {
            name: "Ada Lovelace".into(),
            email: "ada@example.org".into(),
            orcid: "0000-0002-1825-0097".into(),
            projects: vec!["perovskites".into()],
        }
    }

    fn populated_table() -> TableModel {
        let schema = FieldSchema::new(
            "Solid Precursor",
            vec!["Sample Name".into(), "Notes".into()],
        )
        .unwrap();
        let mut table = TableModel::new(schema, "Ada Lovelace");
        table.paste("Alpha\t2024-01-01\tfirst");
        table
    }

    fn request<'a>(table: &'a TableModel, identity: &'a OperatorIdentity) -> SubmissionRequest<'a> {
        SubmissionRequest {
            identity,
            project: "perovskites",
            synthesis_type: "Solid Precursor",
            batch_id_text: "",
            session_name: None,
            table,
        }
    }

    #[tokio::test]
    async fn validation_fails_fast_without_network() {
        let service = MockService::new();
        let table = populated_table();
        let id = identity();

        let mut req = request(&table, &id);
        req.project = "  ";
        let err = begin_submission(&service, req).await.unwrap_err();
        assert_eq!(err, SubmitError::Validation(ValidationError::MissingProject));

        let mut req = request(&table, &id);
        req.synthesis_type = "";
        let err = begin_submission(&service, req).await.unwrap_err();
        assert_eq!(
            err,
            SubmitError::Validation(ValidationError::MissingSynthesisType)
        );

        let schema = FieldSchema::new("Solid Precursor", vec!["Sample Name".into()]).unwrap();
        let empty = TableModel::new(schema, "Ada Lovelace");
        let err = begin_submission(&service, request(&empty, &id))
            .await
            .unwrap_err();
        assert_eq!(err, SubmitError::Validation(ValidationError::EmptyTable));

        assert_eq!(service.resolve_calls(), 0);
        assert_eq!(service.upload_calls(), 0);
    }

    #[tokio::test]
    async fn no_batch_text_uploads_without_resolution() {
        let service = MockService::new();
        let table = populated_table();
        let id = identity();
        let outcome = begin_submission(&service, request(&table, &id))
            .await
            .unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Completed(_)));
        assert_eq!(service.resolve_calls(), 0);
        let uploads = service.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].batch_uuid, None);
        assert_eq!(uploads[0].data.len(), 1);
    }

    #[tokio::test]
    async fn resolved_batch_flows_into_the_payload() {
        let service = MockService::new().with_resolution(BatchResolution::resolved("uuid-7"));
        let table = populated_table();
        let id = identity();
        let mut req = request(&table, &id);
        req.batch_id_text = "B-17";
        let outcome = begin_submission(&service, req).await.unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Completed(_)));
        assert_eq!(service.uploads()[0].batch_uuid.as_deref(), Some("uuid-7"));
    }

    #[tokio::test]
    async fn ambiguous_resolution_suspends_without_uploading() {
        let matches = vec![BatchMatch {
            unique_id: "uuid-1".into(),
            sample_name: "B-17".into(),
            description: None,
            creation_date: None,
        }];
        let service =
            MockService::new().with_resolution(BatchResolution::multiple_matches(matches));
        let table = populated_table();
        let id = identity();
        let mut req = request(&table, &id);
        req.batch_id_text = "B-17";

        let outcome = begin_submission(&service, req).await.unwrap();
        let pending = match outcome {
            SubmissionOutcome::Pending(p) => p,
            other => panic!("expected pending, got {other:?}"),
        };
        assert!(matches!(
            pending.resolution(),
            BatchResolution::MultipleMatches { .. }
        ));
        assert_eq!(pending.row_count(), 1);
        assert_eq!(service.upload_calls(), 0);
    }

    #[tokio::test]
    async fn pending_payload_ignores_later_table_edits() {
        let service =
            MockService::new().with_resolution(BatchResolution::not_found("B-404"));
        let mut table = populated_table();
        let id = identity();
        let mut req = request(&table, &id);
        req.batch_id_text = "B-404";
        let outcome = begin_submission(&service, req).await.unwrap();
        let pending = match outcome {
            SubmissionOutcome::Pending(p) => p,
            other => panic!("expected pending, got {other:?}"),
        };

        // The operator keeps typing while the decision dialog is open.
        table.paste("Beta\t2024-01-02\tsecond");

        resume_submission(&service, pending, BatchDecision::Skip)
            .await
            .unwrap();
        assert_eq!(service.uploads()[0].data.len(), 1);
    }

    #[tokio::test]
    async fn skip_uploads_with_null_linkage() {
        let service =
            MockService::new().with_resolution(BatchResolution::not_found("B-404"));
        let table = populated_table();
        let id = identity();
        let mut req = request(&table, &id);
        req.batch_id_text = "B-404";
        let outcome = begin_submission(&service, req).await.unwrap();
        let pending = match outcome {
            SubmissionOutcome::Pending(p) => p,
            other => panic!("expected pending, got {other:?}"),
        };

        let receipt = resume_submission(&service, pending, BatchDecision::Skip)
            .await
            .unwrap();
        assert_eq!(receipt.message, "Successfully uploaded");
        assert_eq!(service.uploads()[0].batch_uuid, None);
    }

    #[tokio::test]
    async fn bad_candidate_pick_fails_before_upload() {
        let matches = vec![BatchMatch {
            unique_id: "uuid-1".into(),
            sample_name: "B-17".into(),
            description: None,
            creation_date: None,
        }];
        let service =
            MockService::new().with_resolution(BatchResolution::multiple_matches(matches));
        let table = populated_table();
        let id = identity();
        let mut req = request(&table, &id);
        req.batch_id_text = "B-17";
        let pending = match begin_submission(&service, req).await.unwrap() {
            SubmissionOutcome::Pending(p) => p,
            other => panic!("expected pending, got {other:?}"),
        };

        let err = resume_submission(
            &service,
            pending,
            BatchDecision::Select {
                unique_id: "uuid-999".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Resolution(ResolverError::Validation(_))
        ));
        assert_eq!(service.upload_calls(), 0);
    }

    #[tokio::test]
    async fn upload_rejection_is_surfaced_not_swallowed() {
        let service =
            MockService::new().with_upload_error(ServiceError::Rejected("quota".into()));
        let table = populated_table();
        let id = identity();
        let err = begin_submission(&service, request(&table, &id))
            .await
            .unwrap_err();
        assert_eq!(err, SubmitError::Service(ServiceError::Rejected("quota".into())));
        // The table is untouched; the session can resubmit as-is.
        assert_eq!(table.cleaned_snapshot().len(), 1);
    }

    #[tokio::test]
    async fn receipt_summary_passes_through() {
        let service = MockService::new().with_upload_receipt(UploadReceipt {
            message: "Partial upload: 2 samples uploaded successfully, 1 failed".into(),
            summary: UploadSummary {
                project: "perovskites".into(),
                synthesis_type: "Solid Precursor".into(),
                samples_uploaded: 2,
                failed: 1,
                total_rows: 3,
                errors: vec!["Sample 'Beta': duplicate".into()],
            },
        });
        let table = populated_table();
        let id = identity();
        let outcome = begin_submission(&service, request(&table, &id))
            .await
            .unwrap();
        match outcome {
            SubmissionOutcome::Completed(receipt) => {
                assert_eq!(receipt.summary.failed, 1);
                assert_eq!(receipt.summary.errors.len(), 1);
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }
}
