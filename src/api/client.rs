//! Payments API client — `PaymentsApi` trait plus the reqwest-backed
//! implementation used in production.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};

use crate::api::types::{
    BusinessActivity, DocumentUpload, NewOrganization, OrganizationRecord,
    PaymentMethodSelection, ServerProgress, StakeholderInfo,
};
use crate::error::ApiError;

/// The six remote contracts the onboarding wizard consumes.
///
/// Everything behind this trait is opaque: token issuance, settlement,
/// document verification all live on the remote side.
#[async_trait]
pub trait PaymentsApi: Send + Sync {
    /// Create an organization. Must succeed before steps 2–5 are reachable.
    async fn create_organization(
        &self,
        org: &NewOrganization,
    ) -> Result<OrganizationRecord, ApiError>;

    /// Fetch the server-reported onboarding progress for an organization.
    async fn get_onboarding_progress(
        &self,
        organization_id: &str,
    ) -> Result<ServerProgress, ApiError>;

    async fn submit_stakeholder(
        &self,
        organization_id: &str,
        info: &StakeholderInfo,
    ) -> Result<(), ApiError>;

    async fn submit_business(
        &self,
        organization_id: &str,
        activity: &BusinessActivity,
    ) -> Result<(), ApiError>;

    async fn submit_payment_methods(
        &self,
        organization_id: &str,
        selection: &PaymentMethodSelection,
    ) -> Result<(), ApiError>;

    async fn submit_documents(
        &self,
        organization_id: &str,
        upload: &DocumentUpload,
    ) -> Result<(), ApiError>;
}

/// reqwest-backed client for the remote payments API.
pub struct HttpPaymentsApi {
    base_url: String,
    token: SecretString,
    client: reqwest::Client,
}

impl HttpPaymentsApi {
    pub fn new(base_url: String, token: SecretString, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed {
                endpoint: "client".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .bearer_auth(self.token.expose_secret())
    }

    /// Check a response, mapping non-success statuses to typed errors.
    async fn check(endpoint: &str, resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ApiError::AuthFailed {
                endpoint: endpoint.to_string(),
            });
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::RemoteRejected {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    /// POST a JSON body and discard the success payload.
    async fn post_json(
        &self,
        endpoint: &str,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<(), ApiError> {
        let resp = self
            .post(path)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        Self::check(endpoint, resp).await?;
        Ok(())
    }
}

#[async_trait]
impl PaymentsApi for HttpPaymentsApi {
    async fn create_organization(
        &self,
        org: &NewOrganization,
    ) -> Result<OrganizationRecord, ApiError> {
        let endpoint = "create_organization";
        let resp = self
            .post("/organizations")
            .json(org)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        let resp = Self::check(endpoint, resp).await?;
        resp.json().await.map_err(|e| ApiError::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    async fn get_onboarding_progress(
        &self,
        organization_id: &str,
    ) -> Result<ServerProgress, ApiError> {
        let endpoint = "get_onboarding_progress";
        let resp = self
            .client
            .get(self.url(&format!("/organizations/{organization_id}/onboarding-progress")))
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        let resp = Self::check(endpoint, resp).await?;
        resp.json().await.map_err(|e| ApiError::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    async fn submit_stakeholder(
        &self,
        organization_id: &str,
        info: &StakeholderInfo,
    ) -> Result<(), ApiError> {
        self.post_json(
            "submit_stakeholder",
            &format!("/organizations/{organization_id}/stakeholders"),
            info,
        )
        .await
    }

    async fn submit_business(
        &self,
        organization_id: &str,
        activity: &BusinessActivity,
    ) -> Result<(), ApiError> {
        self.post_json(
            "submit_business",
            &format!("/organizations/{organization_id}/business-activity"),
            activity,
        )
        .await
    }

    async fn submit_payment_methods(
        &self,
        organization_id: &str,
        selection: &PaymentMethodSelection,
    ) -> Result<(), ApiError> {
        self.post_json(
            "submit_payment_methods",
            &format!("/organizations/{organization_id}/payment-methods"),
            selection,
        )
        .await
    }

    async fn submit_documents(
        &self,
        organization_id: &str,
        upload: &DocumentUpload,
    ) -> Result<(), ApiError> {
        let endpoint = "submit_documents";
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| ApiError::RequestFailed {
                endpoint: endpoint.to_string(),
                reason: format!("invalid content type: {e}"),
            })?;
        let form = Form::new()
            .text("kind", upload.kind.clone())
            .part("file", part);

        let resp = self
            .post(&format!("/organizations/{organization_id}/documents"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        Self::check(endpoint, resp).await?;
        Ok(())
    }
}
