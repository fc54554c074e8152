//! Scripted [`SampleService`] for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::service::{
    BatchCreationRequest, BatchResolution, BatchResolutionRequest, LoginOutcome,
    OperatorIdentity, SampleService, ServiceError, ServiceFuture, UploadPayload, UploadReceipt,
    UploadSummary,
};

/// A hand-rolled mock implementing [`SampleService`].
///
/// Each capability returns a configured value (or error); calls are counted,
/// and upload payloads are recorded so tests can assert over exactly what
/// would have gone over the wire. Resolution outcomes may be scripted as a
/// sequence, one per call, repeating the last when exhausted.
pub struct MockService {
    login: Result<LoginOutcome, ServiceError>,
    fields: Result<BTreeMap<String, Vec<String>>, ServiceError>,
    resolutions: Mutex<Vec<Result<BatchResolution, ServiceError>>>,
    created_batch: Result<String, ServiceError>,
    upload: Result<UploadReceipt, ServiceError>,

    resolve_calls: AtomicUsize,
    create_batch_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    uploads: Mutex<Vec<UploadPayload>>,
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockService {
    pub fn new() -> Self {
        Self {
            login: Ok(LoginOutcome::LoggedIn {
                user: OperatorIdentity {
                    name: "Ada Lovelace".into(),
                    email: "ada@example.org".into(),
                    orcid: "0000-0002-1825-0097".into(),
                    projects: vec!["perovskites".into()],
                },
                session_token: "token".into(),
            }),
            fields: Ok(BTreeMap::new()),
            resolutions: Mutex::new(Vec::new()),
            created_batch: Ok("uuid-created".into()),
            upload: Ok(UploadReceipt {
                message: "Successfully uploaded".into(),
                summary: UploadSummary::default(),
            }),
            resolve_calls: AtomicUsize::new(0),
            create_batch_calls: AtomicUsize::new(0),
            upload_calls: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_login(mut self, outcome: LoginOutcome) -> Self {
        self.login = Ok(outcome);
        self
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, Vec<String>>) -> Self {
        self.fields = Ok(fields);
        self
    }

    pub fn with_fields_error(mut self, err: ServiceError) -> Self {
        self.fields = Err(err);
        self
    }

    /// Queue a resolution outcome; call again to script a sequence.
    pub fn with_resolution(self, resolution: BatchResolution) -> Self {
        self.resolutions.lock().unwrap().push(Ok(resolution));
        self
    }

    pub fn with_resolve_error(self, err: ServiceError) -> Self {
        self.resolutions.lock().unwrap().push(Err(err));
        self
    }

    pub fn with_created_batch(mut self, unique_id: impl Into<String>) -> Self {
        self.created_batch = Ok(unique_id.into());
        self
    }

    pub fn with_create_batch_error(mut self, err: ServiceError) -> Self {
        self.created_batch = Err(err);
        self
    }

    pub fn with_upload_receipt(mut self, receipt: UploadReceipt) -> Self {
        self.upload = Ok(receipt);
        self
    }

    pub fn with_upload_error(mut self, err: ServiceError) -> Self {
        self.upload = Err(err);
        self
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn create_batch_calls(&self) -> usize {
        self.create_batch_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// Every payload passed to `upload`, in call order.
    pub fn uploads(&self) -> Vec<UploadPayload> {
        self.uploads.lock().unwrap().clone()
    }

    fn next_resolution(&self) -> Result<BatchResolution, ServiceError> {
        let mut queue = self.resolutions.lock().unwrap();
        match queue.len() {
            0 => Err(ServiceError::Transport(
                "mock: no resolution scripted".into(),
            )),
            1 => queue[0].clone(),
            _ => queue.remove(0),
        }
    }
}

impl SampleService for MockService {
    fn authenticate(&self, _email: String) -> ServiceFuture<'_, LoginOutcome> {
        let result = self.login.clone();
        Box::pin(async move { result })
    }

    fn synthesis_fields(&self) -> ServiceFuture<'_, BTreeMap<String, Vec<String>>> {
        let result = self.fields.clone();
        Box::pin(async move { result })
    }

    fn resolve_batch(
        &self,
        _request: BatchResolutionRequest,
    ) -> ServiceFuture<'_, BatchResolution> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.next_resolution();
        Box::pin(async move { result })
    }

    fn create_batch(&self, _request: BatchCreationRequest) -> ServiceFuture<'_, String> {
        self.create_batch_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.created_batch.clone();
        Box::pin(async move { result })
    }

    fn upload(&self, payload: UploadPayload) -> ServiceFuture<'_, UploadReceipt> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.uploads.lock().unwrap().push(payload);
        let result = self.upload.clone();
        Box::pin(async move { result })
    }
}
