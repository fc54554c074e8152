//! HTTP implementation of [`SampleService`] against the sample-tracking
//! service's REST API.
//!
//! The wire shapes here mirror the service's JSON contract exactly; everything
//! visible to the rest of the workspace goes through the core's own types.
//! Transport failures and non-2xx statuses become [`ServiceError::Transport`];
//! a completed call that reports `success: false` becomes
//! [`ServiceError::Rejected`].

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use synthdesk_core::service::{
    BatchCreationRequest, BatchMatch, BatchResolution, BatchResolutionRequest, LoginOutcome,
    OperatorIdentity, SampleService, ServiceError, ServiceFuture, UploadPayload, UploadReceipt,
    UploadSummary,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed client for the five service capabilities.
pub struct HttpSampleService {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpSampleService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp, ServiceError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "POST");
        let resp = self
            .client
            .post(&url)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Self::parse(resp).await
    }

    async fn get_json<Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
    ) -> Result<Resp, ServiceError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "GET");
        let resp = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Self::parse(resp).await
    }

    async fn parse<Resp: for<'de> Deserialize<'de>>(
        resp: reqwest::Response,
    ) -> Result<Resp, ServiceError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Transport(format!("HTTP {status}")));
        }
        resp.json::<Resp>()
            .await
            .map_err(|e| ServiceError::Transport(format!("malformed response: {e}")))
    }
}

impl SampleService for HttpSampleService {
    fn authenticate(&self, email: String) -> ServiceFuture<'_, LoginOutcome> {
        Box::pin(async move {
            // The service expects a normalized email (original contract).
            let email = email.trim().to_lowercase();
            let resp: LoginResponse = self
                .post_json("/api/auth/login", &LoginRequest { email })
                .await?;
            if resp.success {
                let user = resp.user.ok_or_else(|| {
                    ServiceError::Transport("login succeeded without user info".into())
                })?;
                let session_token = resp.session_token.unwrap_or_default();
                let mut projects = user.projects;
                projects.sort();
                Ok(LoginOutcome::LoggedIn {
                    user: OperatorIdentity {
                        name: user.name,
                        email: user.email,
                        orcid: user.orcid,
                        projects,
                    },
                    session_token,
                })
            } else {
                Ok(LoginOutcome::Denied {
                    message: resp.message.unwrap_or_else(|| "login denied".into()),
                })
            }
        })
    }

    fn synthesis_fields(&self) -> ServiceFuture<'_, BTreeMap<String, Vec<String>>> {
        Box::pin(async move {
            let resp: FieldsResponse = self.get_json("/api/synthesis/fields").await?;
            Ok(resp.fields)
        })
    }

    fn resolve_batch(
        &self,
        request: BatchResolutionRequest,
    ) -> ServiceFuture<'_, BatchResolution> {
        Box::pin(async move {
            let resp: BatchResolveResponse = self
                .post_json(
                    "/api/batch/resolve",
                    &BatchResolveRequest {
                        batch_id: request.batch_id_text,
                        orcid: request.orcid,
                        project: request.project,
                    },
                )
                .await?;
            match resp.status.as_str() {
                "resolved" => {
                    let batch_uuid = resp.batch_id.ok_or_else(|| {
                        ServiceError::Transport("resolved batch without an id".into())
                    })?;
                    Ok(BatchResolution::Resolved { batch_uuid })
                }
                "not_found" => Ok(BatchResolution::NotFound {
                    input: resp.input.unwrap_or_default(),
                }),
                "multiple_matches" => Ok(BatchResolution::MultipleMatches {
                    matches: resp.matches.unwrap_or_default(),
                }),
                other => Err(ServiceError::Transport(format!(
                    "unknown resolution status: {other}"
                ))),
            }
        })
    }

    fn create_batch(&self, request: BatchCreationRequest) -> ServiceFuture<'_, String> {
        Box::pin(async move {
            // Blank descriptions get the service's conventional default.
            let description = match request.description {
                Some(d) if !d.trim().is_empty() => d,
                _ => format!("Batch {}", request.batch_name),
            };
            let resp: BatchCreateResponse = self
                .post_json(
                    "/api/batch/create",
                    &BatchCreateRequest {
                        batch_name: request.batch_name,
                        batch_id: request.batch_id,
                        batch_description: description,
                        orcid: request.orcid,
                        project: request.project,
                    },
                )
                .await?;
            if resp.success {
                Ok(resp.unique_id.unwrap_or_default())
            } else {
                Err(ServiceError::Rejected(
                    resp.message.unwrap_or_else(|| "batch creation failed".into()),
                ))
            }
        })
    }

    fn upload(&self, payload: UploadPayload) -> ServiceFuture<'_, UploadReceipt> {
        Box::pin(async move {
            let resp: UploadResponse = self
                .post_json(
                    "/api/synthesis/upload",
                    &UploadRequest {
                        email: payload.email,
                        orcid: payload.orcid,
                        user_name: payload.operator_name,
                        project: payload.project,
                        synthesis_type: payload.synthesis_type,
                        batch_id: payload.batch_uuid,
                        data: payload.data,
                        session_name: payload.session_name,
                    },
                )
                .await?;
            if resp.success {
                let message = resp.message.clone();
                let summary = resp.summary().unwrap_or_default();
                Ok(UploadReceipt { message, summary })
            } else {
                Err(ServiceError::Rejected(resp.message))
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Wire shapes (the service's JSON contract)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct LoginRequest {
    email: String,
}

#[derive(Deserialize)]
struct WireUser {
    name: String,
    email: String,
    orcid: String,
    #[serde(default)]
    projects: Vec<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    success: bool,
    user: Option<WireUser>,
    message: Option<String>,
    session_token: Option<String>,
}

#[derive(Deserialize)]
struct FieldsResponse {
    fields: BTreeMap<String, Vec<String>>,
}

#[derive(Serialize)]
struct BatchResolveRequest {
    batch_id: String,
    orcid: String,
    project: String,
}

#[derive(Deserialize)]
struct BatchResolveResponse {
    status: String,
    batch_id: Option<String>,
    matches: Option<Vec<BatchMatch>>,
    input: Option<String>,
    #[allow(dead_code)]
    message: Option<String>,
}

#[derive(Serialize)]
struct BatchCreateRequest {
    batch_name: String,
    batch_id: String,
    batch_description: String,
    orcid: String,
    project: String,
}

#[derive(Deserialize)]
struct BatchCreateResponse {
    success: bool,
    unique_id: Option<String>,
    message: Option<String>,
}

#[derive(Serialize)]
struct UploadRequest {
    email: String,
    orcid: String,
    user_name: String,
    project: String,
    synthesis_type: String,
    batch_id: Option<String>,
    data: Vec<BTreeMap<String, String>>,
    session_name: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
    success: bool,
    message: String,
    summary: Option<WireSummary>,
}

/// The service reports the summary with display-cased keys.
#[derive(Deserialize, Default)]
struct WireSummary {
    #[serde(rename = "Project", default)]
    project: String,
    #[serde(rename = "Synthesis Type", default)]
    synthesis_type: String,
    #[serde(rename = "Samples Uploaded", default)]
    samples_uploaded: u32,
    #[serde(rename = "Failed", default)]
    failed: u32,
    #[serde(rename = "Total Rows", default)]
    total_rows: u32,
    #[serde(rename = "Errors", default)]
    errors: Vec<String>,
}

impl UploadResponse {
    fn summary(self) -> Option<UploadSummary> {
        self.summary.map(|s| UploadSummary {
            project: s.project,
            synthesis_type: s.synthesis_type,
            samples_uploaded: s.samples_uploaded,
            failed: s.failed,
            total_rows: s.total_rows,
            errors: s.errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let svc = HttpSampleService::new("http://localhost:8000///");
        assert_eq!(svc.base_url(), "http://localhost:8000");
    }

    #[test]
    fn login_response_parses_both_outcomes() {
        let ok: LoginResponse = serde_json::from_str(
            r#"{"success": true,
                "user": {"email": "ada@example.org", "orcid": "0000", "name": "Ada",
                         "projects": ["p1", "p2"]},
                "session_token": "abc",
                "message": "Login successful"}"#,
        )
        .unwrap();
        assert!(ok.success);
        assert_eq!(ok.user.unwrap().projects, vec!["p1", "p2"]);

        let denied: LoginResponse = serde_json::from_str(
            r#"{"success": false, "message": "No user found with email: x@y.z"}"#,
        )
        .unwrap();
        assert!(!denied.success);
        assert!(denied.user.is_none());
    }

    #[test]
    fn resolve_response_parses_all_three_statuses() {
        let resolved: BatchResolveResponse =
            serde_json::from_str(r#"{"status": "resolved", "batch_id": "uuid-1"}"#).unwrap();
        assert_eq!(resolved.batch_id.as_deref(), Some("uuid-1"));

        let not_found: BatchResolveResponse =
            serde_json::from_str(r#"{"status": "not_found", "input": "B-404"}"#).unwrap();
        assert_eq!(not_found.input.as_deref(), Some("B-404"));

        let multiple: BatchResolveResponse = serde_json::from_str(
            r#"{"status": "multiple_matches", "input": "B-17",
                "matches": [{"unique_id": "u1", "sample_name": "B-17",
                             "description": null, "creation_date": "2024-01-02"}]}"#,
        )
        .unwrap();
        let matches = multiple.matches.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].creation_date.as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn upload_summary_uses_display_cased_keys() {
        let resp: UploadResponse = serde_json::from_str(
            r#"{"success": true,
                "message": "Successfully uploaded 2 samples to project 'p'",
                "summary": {"Project": "p", "Synthesis Type": "Solid Precursor",
                            "Samples Uploaded": 2, "Failed": 0, "Total Rows": 2}}"#,
        )
        .unwrap();
        let summary = resp.summary().unwrap();
        assert_eq!(summary.samples_uploaded, 2);
        assert_eq!(summary.total_rows, 2);
        assert!(summary.errors.is_empty());
    }

    #[test]
    fn upload_request_serializes_null_batch_id() {
        let req = UploadRequest {
            email: "a@b.c".into(),
            orcid: "0000".into(),
            user_name: "Ada".into(),
            project: "p".into(),
            synthesis_type: "Solid Precursor".into(),
            batch_id: None,
            data: vec![BTreeMap::from([("Sample Name".to_string(), "Alpha".to_string())])],
            session_name: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json["batch_id"].is_null());
        assert_eq!(json["data"][0]["Sample Name"], "Alpha");
    }
}
