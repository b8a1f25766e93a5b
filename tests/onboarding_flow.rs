//! End-to-end tests for the onboarding wizard: controller scenarios with
//! a stub payments API, plus the REST surface on a real socket.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::time::timeout;

use paydesk_onboarding::api::{
    BusinessActivity, DocumentUpload, NewOrganization, OrganizationRecord,
    PaymentMethodSelection, PaymentsApi, ServerProgress, ServerProgressStep, StakeholderInfo,
};
use paydesk_onboarding::error::{ApiError, Error, OnboardingError};
use paydesk_onboarding::onboarding::{
    NavOutcome, OnboardingProgressController, OnboardingRouteState, StepKey, onboarding_routes,
};
use paydesk_onboarding::store::{KvStore, MemoryStore};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Stub payments API for tests (no real network).
struct StubApi {
    progress: Mutex<ServerProgress>,
    fail_progress: AtomicBool,
    fail_submits: AtomicBool,
    created: Mutex<Vec<NewOrganization>>,
}

impl StubApi {
    fn new(progress: ServerProgress) -> Self {
        Self {
            progress: Mutex::new(progress),
            fail_progress: AtomicBool::new(false),
            fail_submits: AtomicBool::new(false),
            created: Mutex::new(Vec::new()),
        }
    }

    fn empty() -> Self {
        Self::new(ServerProgress::default())
    }

    fn with_completed(names: &[&str]) -> Self {
        Self::new(ServerProgress {
            steps: names
                .iter()
                .map(|name| ServerProgressStep {
                    step_name: name.to_string(),
                    completed: true,
                })
                .collect(),
            is_complete: false,
        })
    }

    fn submit_error(&self, endpoint: &str) -> Result<(), ApiError> {
        if self.fail_submits.load(Ordering::SeqCst) {
            Err(ApiError::RequestFailed {
                endpoint: endpoint.to_string(),
                reason: "connection reset".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PaymentsApi for StubApi {
    async fn create_organization(
        &self,
        org: &NewOrganization,
    ) -> Result<OrganizationRecord, ApiError> {
        self.submit_error("create_organization")?;
        self.created.lock().await.push(org.clone());
        Ok(OrganizationRecord {
            id: "org_test".to_string(),
            name: org.name.clone(),
            legal_form: org.legal_form.clone(),
            address: org.address.clone(),
            region: org.region.clone(),
            city: org.city.clone(),
            country: org.country.clone(),
        })
    }

    async fn get_onboarding_progress(
        &self,
        _organization_id: &str,
    ) -> Result<ServerProgress, ApiError> {
        if self.fail_progress.load(Ordering::SeqCst) {
            return Err(ApiError::RequestFailed {
                endpoint: "get_onboarding_progress".to_string(),
                reason: "timeout".to_string(),
            });
        }
        Ok(self.progress.lock().await.clone())
    }

    async fn submit_stakeholder(
        &self,
        _organization_id: &str,
        _info: &StakeholderInfo,
    ) -> Result<(), ApiError> {
        self.submit_error("submit_stakeholder")
    }

    async fn submit_business(
        &self,
        _organization_id: &str,
        _activity: &BusinessActivity,
    ) -> Result<(), ApiError> {
        self.submit_error("submit_business")
    }

    async fn submit_payment_methods(
        &self,
        _organization_id: &str,
        _selection: &PaymentMethodSelection,
    ) -> Result<(), ApiError> {
        self.submit_error("submit_payment_methods")
    }

    async fn submit_documents(
        &self,
        _organization_id: &str,
        _upload: &DocumentUpload,
    ) -> Result<(), ApiError> {
        self.submit_error("submit_documents")
    }
}

fn controller(api: Arc<StubApi>, store: Arc<MemoryStore>) -> Arc<OnboardingProgressController> {
    Arc::new(OnboardingProgressController::new(api, store))
}

async fn cache_org_id(store: &MemoryStore, id: &str) {
    store
        .set("onboarding.organization_id", &serde_json::json!(id))
        .await
        .unwrap();
}

fn acme() -> NewOrganization {
    NewOrganization {
        name: "Acme".to_string(),
        legal_form: None,
        address: Some("1 Main St".to_string()),
        region: Some("Centre".to_string()),
        city: Some("Douala".to_string()),
        country: None,
    }
}

fn stakeholder() -> StakeholderInfo {
    StakeholderInfo {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        role: "director".to_string(),
        email: None,
        phone: None,
    }
}

#[tokio::test]
async fn fresh_user_opens_on_organization_and_advances_on_create() {
    timeout(TEST_TIMEOUT, async {
        let api = Arc::new(StubApi::empty());
        let store = Arc::new(MemoryStore::new());
        let controller = controller(api.clone(), store.clone());

        let status = controller.initialize().await.unwrap();
        assert_eq!(status.current_step, 0);
        assert!(status.completed_steps.is_empty());
        assert!(!status.is_complete);

        let outcome = controller.submit_organization(&acme()).await.unwrap();
        assert_eq!(outcome, NavOutcome::Moved(1));

        let status = controller.status().await;
        assert_eq!(status.current_step, 1);
        assert_eq!(status.completed_steps, vec![0]);
        assert_eq!(status.organization_id.as_deref(), Some("org_test"));

        // The id is cached for later sessions.
        let cached = store.get("onboarding.organization_id").await.unwrap();
        assert_eq!(cached, Some(serde_json::json!("org_test")));
        assert_eq!(api.created.lock().await.len(), 1);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn advancing_without_organization_is_rejected_inline() {
    timeout(TEST_TIMEOUT, async {
        let controller = controller(Arc::new(StubApi::empty()), Arc::new(MemoryStore::new()));
        controller.initialize().await.unwrap();

        let err = controller.advance().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Onboarding(OnboardingError::OrganizationRequired)
        ));
        assert_eq!(controller.status().await.current_step, 0);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn returning_user_resumes_on_first_unconfirmed_step() {
    timeout(TEST_TIMEOUT, async {
        let api = Arc::new(StubApi::with_completed(&["STAKEHOLDER"]));
        let store = Arc::new(MemoryStore::new());
        cache_org_id(&store, "org_test").await;

        let controller = controller(api, store);
        let status = controller.initialize().await.unwrap();

        assert_eq!(status.current_step, 2);
        assert_eq!(status.current_key, StepKey::Business);
        assert_eq!(status.completed_steps, vec![0, 1]);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn completed_onboarding_is_terminal() {
    timeout(TEST_TIMEOUT, async {
        let api = Arc::new(StubApi::new(ServerProgress {
            steps: Vec::new(),
            is_complete: true,
        }));
        let store = Arc::new(MemoryStore::new());
        cache_org_id(&store, "org_test").await;

        let controller = controller(api, store);
        let status = controller.initialize().await.unwrap();
        assert!(status.is_complete);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn progress_fetch_failure_degrades_to_step_zero_and_is_retryable() {
    timeout(TEST_TIMEOUT, async {
        let api = Arc::new(StubApi::with_completed(&["STAKEHOLDER", "BUSINESS"]));
        api.fail_progress.store(true, Ordering::SeqCst);
        let store = Arc::new(MemoryStore::new());
        cache_org_id(&store, "org_test").await;

        let controller = controller(api.clone(), store.clone());
        let status = controller.initialize().await.unwrap();

        // Safe fallback: step 0, error surfaced, cached id untouched.
        assert_eq!(status.current_step, 0);
        assert!(status.progress_error.is_some());
        assert_eq!(status.organization_id.as_deref(), Some("org_test"));
        assert_eq!(
            store.get("onboarding.organization_id").await.unwrap(),
            Some(serde_json::json!("org_test"))
        );

        // The retry banner succeeds once the network is back.
        api.fail_progress.store(false, Ordering::SeqCst);
        let status = controller.retry().await.unwrap();
        assert_eq!(status.current_step, 3);
        assert!(status.progress_error.is_none());
        assert_eq!(status.completed_steps, vec![0, 1, 2]);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn submit_failure_preserves_last_known_step() {
    timeout(TEST_TIMEOUT, async {
        let api = Arc::new(StubApi::empty());
        let controller = controller(api.clone(), Arc::new(MemoryStore::new()));
        controller.initialize().await.unwrap();
        controller.submit_organization(&acme()).await.unwrap();

        api.fail_submits.store(true, Ordering::SeqCst);
        let err = controller.submit_stakeholder(&stakeholder()).await.unwrap_err();
        assert!(matches!(err, Error::Api(_)));

        let status = controller.status().await;
        assert_eq!(status.current_step, 1);
        assert_eq!(status.completed_steps, vec![0]);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn full_walk_reaches_completion_with_one_marker_per_step() {
    timeout(TEST_TIMEOUT, async {
        let api = Arc::new(StubApi::empty());
        let store = Arc::new(MemoryStore::new());
        let controller = controller(api, store.clone());
        controller.initialize().await.unwrap();

        assert_eq!(
            controller.submit_organization(&acme()).await.unwrap(),
            NavOutcome::Moved(1)
        );
        assert_eq!(
            controller.submit_stakeholder(&stakeholder()).await.unwrap(),
            NavOutcome::Moved(2)
        );
        assert_eq!(
            controller
                .submit_business(&BusinessActivity {
                    sector: "retail".to_string(),
                    description: None,
                    monthly_volume: None,
                })
                .await
                .unwrap(),
            NavOutcome::Moved(3)
        );
        assert_eq!(
            controller
                .submit_payment_methods(&PaymentMethodSelection {
                    methods: vec!["mobile_money".to_string()],
                    settlement_account: None,
                })
                .await
                .unwrap(),
            NavOutcome::Moved(4)
        );
        assert_eq!(
            controller
                .submit_documents(&DocumentUpload {
                    kind: "registration_certificate".to_string(),
                    file_name: "cert.pdf".to_string(),
                    content_type: "application/pdf".to_string(),
                    bytes: vec![1, 2, 3],
                })
                .await
                .unwrap(),
            NavOutcome::Complete
        );

        let status = controller.status().await;
        assert!(status.is_complete);
        assert_eq!(status.completed_steps, vec![0, 1, 2, 3, 4]);

        let feed = controller.activity().await.unwrap();
        assert_eq!(feed.len(), 5);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn revisiting_a_step_keeps_the_original_marker() {
    timeout(TEST_TIMEOUT, async {
        let api = Arc::new(StubApi::empty());
        let store = Arc::new(MemoryStore::new());
        let controller = controller(api, store.clone());
        controller.initialize().await.unwrap();
        controller.submit_organization(&acme()).await.unwrap();

        let first = store
            .get("onboarding.step.organization.completed_at")
            .await
            .unwrap()
            .unwrap();

        // Back to the organization step and advance past it again.
        controller.rewind().await.unwrap();
        controller.advance().await.unwrap();

        let second = store
            .get("onboarding.step.organization.completed_at")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first, second);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn jump_rules_match_the_indicator_behavior() {
    timeout(TEST_TIMEOUT, async {
        let controller = controller(Arc::new(StubApi::empty()), Arc::new(MemoryStore::new()));
        controller.initialize().await.unwrap();
        controller.submit_organization(&acme()).await.unwrap();
        // current = 1, completed = {0}

        use paydesk_onboarding::onboarding::JumpOutcome;

        // Skipping ahead past unfinished steps is silently rejected.
        assert_eq!(controller.jump_to(3).await.unwrap(), JumpOutcome::Rejected);
        assert_eq!(controller.status().await.current_step, 1);

        // The immediate next step and completed steps are reachable.
        assert_eq!(controller.jump_to(2).await.unwrap(), JumpOutcome::Moved(2));
        assert_eq!(controller.jump_to(0).await.unwrap(), JumpOutcome::Moved(0));
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn calls_before_initialize_are_refused() {
    timeout(TEST_TIMEOUT, async {
        let controller = controller(Arc::new(StubApi::empty()), Arc::new(MemoryStore::new()));
        let err = controller.advance().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Onboarding(OnboardingError::NotInitialized)
        ));
    })
    .await
    .unwrap();
}

// ── REST surface ─────────────────────────────────────────────────────

async fn serve(controller: Arc<OnboardingProgressController>) -> String {
    let app = onboarding_routes(OnboardingRouteState { controller });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn rest_status_and_organization_submit() {
    timeout(TEST_TIMEOUT, async {
        let controller = controller(Arc::new(StubApi::empty()), Arc::new(MemoryStore::new()));
        controller.initialize().await.unwrap();
        let base = serve(controller).await;
        let client = reqwest::Client::new();

        let status: serde_json::Value = client
            .get(format!("{base}/api/onboarding/status"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["current_step"], 0);
        assert_eq!(status["steps"].as_array().unwrap().len(), 5);

        let resp = client
            .post(format!("{base}/api/onboarding/organization"))
            .json(&acme())
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["outcome"], "moved");
        assert_eq!(body["status"]["current_step"], 1);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn rest_advance_without_organization_maps_to_conflict() {
    timeout(TEST_TIMEOUT, async {
        let controller = controller(Arc::new(StubApi::empty()), Arc::new(MemoryStore::new()));
        controller.initialize().await.unwrap();
        let base = serve(controller).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/api/onboarding/advance"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CONFLICT);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn rest_jump_past_unfinished_steps_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let controller = controller(Arc::new(StubApi::empty()), Arc::new(MemoryStore::new()));
        controller.initialize().await.unwrap();
        let base = serve(controller).await;
        let client = reqwest::Client::new();

        client
            .post(format!("{base}/api/onboarding/organization"))
            .json(&acme())
            .send()
            .await
            .unwrap();

        let body: serde_json::Value = client
            .post(format!("{base}/api/onboarding/jump"))
            .json(&serde_json::json!({"target": 4}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["outcome"], "rejected");
        assert_eq!(body["status"]["current_step"], 1);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn rest_document_upload_accepts_multipart() {
    timeout(TEST_TIMEOUT, async {
        let controller = controller(Arc::new(StubApi::empty()), Arc::new(MemoryStore::new()));
        controller.initialize().await.unwrap();
        controller.submit_organization(&acme()).await.unwrap();
        let base = serve(controller).await;

        let form = reqwest::multipart::Form::new()
            .text("kind", "registration_certificate")
            .part(
                "file",
                reqwest::multipart::Part::bytes(vec![1, 2, 3])
                    .file_name("cert.pdf")
                    .mime_str("application/pdf")
                    .unwrap(),
            );
        let resp = reqwest::Client::new()
            .post(format!("{base}/api/onboarding/documents"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["outcome"], "moved");
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn rest_malformed_multipart_body_is_a_bad_request() {
    timeout(TEST_TIMEOUT, async {
        let controller = controller(Arc::new(StubApi::empty()), Arc::new(MemoryStore::new()));
        controller.initialize().await.unwrap();
        controller.submit_organization(&acme()).await.unwrap();
        let base = serve(controller).await;

        // A multipart content type whose body never contains the boundary.
        let resp = reqwest::Client::new()
            .post(format!("{base}/api/onboarding/documents"))
            .header("content-type", "multipart/form-data; boundary=xyz")
            .body("definitely not a multipart payload")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert!(
            body["error"].as_str().unwrap().contains("multipart"),
            "error should name the body problem, got: {body}"
        );
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn rest_missing_document_fields_are_unprocessable() {
    timeout(TEST_TIMEOUT, async {
        let controller = controller(Arc::new(StubApi::empty()), Arc::new(MemoryStore::new()));
        controller.initialize().await.unwrap();
        controller.submit_organization(&acme()).await.unwrap();
        let base = serve(controller).await;

        // Well-formed multipart, but no file part.
        let form = reqwest::multipart::Form::new().text("kind", "registration_certificate");
        let resp = reqwest::Client::new()
            .post(format!("{base}/api/onboarding/documents"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    })
    .await
    .unwrap();
}
