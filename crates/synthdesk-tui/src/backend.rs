use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use synthdesk_core::{
    LoginOutcome, SampleService, SubmissionOutcome, SubmissionRequest, begin_submission,
    resume_submission,
};

use crate::tui_event::{BackendCommand, BackendEvent};

/// Backend task: owns the service handle and runs one command at a time.
///
/// All session state lives in the app; commands carry everything a call
/// needs, so this loop stays stateless and trivially restartable.
pub async fn run(
    service: Arc<dyn SampleService>,
    mut cmd_rx: mpsc::UnboundedReceiver<BackendCommand>,
    tx: mpsc::UnboundedSender<BackendEvent>,
    cancel: CancellationToken,
) {
    loop {
        let cmd = tokio::select! {
            _ = cancel.cancelled() => break,
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
        };
        let event = handle_command(service.as_ref(), cmd).await;
        if tx.send(event).is_err() {
            break;
        }
    }
}

async fn handle_command(service: &dyn SampleService, cmd: BackendCommand) -> BackendEvent {
    match cmd {
        BackendCommand::Login { email } => match service.authenticate(email).await {
            Ok(LoginOutcome::LoggedIn {
                user,
                session_token,
            }) => {
                info!(operator = %user.name, "login succeeded");
                BackendEvent::LoginSucceeded {
                    user,
                    session_token,
                }
            }
            Ok(LoginOutcome::Denied { message }) => BackendEvent::LoginDenied { message },
            Err(err) => BackendEvent::LoginDenied {
                message: err.to_string(),
            },
        },
        BackendCommand::FetchFields => match service.synthesis_fields().await {
            Ok(schemas) => BackendEvent::FieldsFetched { schemas },
            Err(err) => BackendEvent::FieldsFetchFailed {
                message: format!("could not fetch field schemas: {err}"),
            },
        },
        BackendCommand::BeginSubmission {
            identity,
            project,
            synthesis_type,
            batch_id_text,
            table,
        } => {
            let request = SubmissionRequest {
                identity: &identity,
                project: &project,
                synthesis_type: &synthesis_type,
                batch_id_text: &batch_id_text,
                session_name: None,
                table: &table,
            };
            match begin_submission(service, request).await {
                Ok(SubmissionOutcome::Completed(receipt)) => {
                    BackendEvent::UploadComplete { receipt }
                }
                Ok(SubmissionOutcome::Pending(pending)) => {
                    BackendEvent::DecisionNeeded { pending }
                }
                Err(err) => BackendEvent::SubmissionFailed {
                    message: err.to_string(),
                },
            }
        }
        BackendCommand::Resume { pending, decision } => {
            match resume_submission(service, pending, decision).await {
                Ok(receipt) => BackendEvent::UploadComplete { receipt },
                Err(err) => BackendEvent::SubmissionFailed {
                    message: err.to_string(),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use synthdesk_core::mock::MockService;
    use synthdesk_core::{OperatorIdentity, ServiceError};

    #[tokio::test]
    async fn login_command_reports_the_outcome() {
        let service = MockService::new().with_login(LoginOutcome::LoggedIn {
            user: OperatorIdentity {
                name: "Ada Lovelace".into(),
                email: "ada@example.org".into(),
                orcid: "0000-0002-1825-0097".into(),
                projects: vec!["perovskites".into()],
            },
            session_token: "token".into(),
        });
        let event = handle_command(
            &service,
            BackendCommand::Login {
                email: "ada@example.org".into(),
            },
        )
        .await;
        assert!(matches!(event, BackendEvent::LoginSucceeded { .. }));
    }

    #[tokio::test]
    async fn fetch_failure_surfaces_as_a_message() {
        let service = MockService::new().with_login(LoginOutcome::Denied {
            message: "unknown address".into(),
        });
        let event = handle_command(
            &service,
            BackendCommand::Login {
                email: "nobody@example.org".into(),
            },
        )
        .await;
        match event {
            BackendEvent::LoginDenied { message } => assert_eq!(message, "unknown address"),
            _ => panic!("expected a denial"),
        }
    }

    #[tokio::test]
    async fn fields_command_passes_schemas_through() {
        let service = MockService::new().with_fields(BTreeMap::from([(
            "Solid Precursor".to_string(),
            vec!["Sample Name".to_string()],
        )]));
        let event = handle_command(&service, BackendCommand::FetchFields).await;
        match event {
            BackendEvent::FieldsFetched { schemas } => {
                assert!(schemas.contains_key("Solid Precursor"));
            }
            _ => panic!("expected schemas"),
        }
    }

    #[tokio::test]
    async fn fields_fetch_failure_is_reported_distinctly() {
        let service = MockService::new()
            .with_fields_error(ServiceError::Transport("connection refused".into()));
        let event = handle_command(&service, BackendCommand::FetchFields).await;
        match event {
            BackendEvent::FieldsFetchFailed { message } => {
                assert!(message.contains("connection refused"));
            }
            _ => panic!("expected a fetch failure event"),
        }
    }
}
