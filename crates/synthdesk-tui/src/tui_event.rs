use std::collections::BTreeMap;

use synthdesk_core::{
    BatchDecision, OperatorIdentity, PendingDecision, TableModel, UploadReceipt,
};

/// Commands sent from the TUI to the backend task. One command is in flight
/// at a time; the app's busy flag guards re-entrancy.
pub enum BackendCommand {
    Login {
        email: String,
    },
    FetchFields,
    /// Run phase one of a submission. The table travels by value so the
    /// backend never observes edits made after the operator pressed submit.
    BeginSubmission {
        identity: OperatorIdentity,
        project: String,
        synthesis_type: String,
        batch_id_text: String,
        table: TableModel,
    },
    /// Settle a suspended submission. The pending token moves back to the
    /// backend; aborting instead is done by simply dropping it in the app.
    Resume {
        pending: PendingDecision,
        decision: BatchDecision,
    },
}

/// Events flowing from the backend task to the TUI.
pub enum BackendEvent {
    LoginSucceeded {
        user: OperatorIdentity,
        session_token: String,
    },
    LoginDenied {
        message: String,
    },
    FieldsFetched {
        schemas: BTreeMap<String, Vec<String>>,
    },
    /// Schema fetch failed; the operator can retry from the form.
    FieldsFetchFailed {
        message: String,
    },
    /// Submission suspended: the operator must create, select or skip.
    DecisionNeeded {
        pending: PendingDecision,
    },
    UploadComplete {
        receipt: UploadReceipt,
    },
    /// Any non-fatal failure: validation, transport, or a service rejection.
    /// The session returns to the editable form with the message shown.
    SubmissionFailed {
        message: String,
    },
}
