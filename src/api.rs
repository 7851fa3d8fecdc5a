// HTTP client for the Text Scoring backend. Owns the base URL, attaches the
// persisted bearer credential, and normalizes transport/server failures into
// the ClientError taxonomy.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use log::{debug, error, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::CredentialStore;
use crate::config::Settings;
use crate::error::ClientError;
use crate::models::{
    AnalysisResult, BatchAnalysisResult, BatchInput, ExportRequest, ExportResponse, HealthStatus,
    HistoryItem, TextInput,
};

pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

pub struct ApiClient {
    client: Client,
    base_url: Url,
    credentials: Arc<CredentialStore>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ApiClient {
    pub fn new(
        settings: &Settings,
        credentials: Arc<CredentialStore>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            client,
            base_url: settings.base_url()?,
            credentials,
            on_unauthorized: None,
        })
    }

    /// Registers the login-boundary callback fired when the backend rejects
    /// the credential. The redirect itself belongs to the rendering layer.
    pub fn with_unauthorized_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn analyze_text(&self, input: &TextInput) -> Result<AnalysisResult, ClientError> {
        let url = self.endpoint("analyze")?;
        debug!("POST {} ({} chars)", url, input.text.len());
        let response = self.authorize(self.client.post(url).json(input)).send().await?;
        self.handle_json(response).await
    }

    pub async fn analyze_file(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
        topic: Option<&str>,
    ) -> Result<AnalysisResult, ClientError> {
        let url = self.endpoint("analyze/file")?;
        info!("📤 Uploading {} ({} bytes) for analysis", filename, bytes.len());

        let mut part = Part::bytes(bytes).file_name(filename.to_string());
        if let Some(content_type) = content_type {
            part = part.mime_str(content_type).map_err(ClientError::Network)?;
        }
        let mut form = Form::new().part("file", part);
        if let Some(topic) = topic {
            form = form.text("topic", topic.to_string());
        }

        let response = self
            .authorize(self.client.post(url).multipart(form))
            .send()
            .await?;
        self.handle_json(response).await
    }

    pub async fn analyze_batch(
        &self,
        input: &BatchInput,
    ) -> Result<BatchAnalysisResult, ClientError> {
        let url = self.endpoint("analyze/batch")?;
        debug!("POST {} ({} texts)", url, input.texts.len());
        let response = self.authorize(self.client.post(url).json(input)).send().await?;
        self.handle_json(response).await
    }

    pub async fn get_history(&self, limit: usize) -> Result<Vec<HistoryItem>, ClientError> {
        let url = self.endpoint("history")?;
        let response = self
            .authorize(self.client.get(url).query(&[("limit", limit)]))
            .send()
            .await?;
        self.handle_json(response).await
    }

    pub async fn get_analysis_result(&self, id: &str) -> Result<AnalysisResult, ClientError> {
        let url = self.endpoint(&format!("history/{}", id))?;
        let response = self.authorize(self.client.get(url)).send().await?;
        self.handle_json(response).await
    }

    pub async fn delete_history_item(&self, id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("history/{}", id))?;
        let response = self.authorize(self.client.delete(url)).send().await?;
        self.check_status(response).await?;
        Ok(())
    }

    pub async fn export_analysis(
        &self,
        request: &ExportRequest,
    ) -> Result<ExportResponse, ClientError> {
        let url = self.endpoint("export")?;
        debug!("POST {} (result {})", url, request.result_id);
        let response = self
            .authorize(self.client.post(url).json(request))
            .send()
            .await?;
        self.handle_json(response).await
    }

    /// Fetches a generated export artifact. The URL must already be resolved
    /// against the base URL (see `export::resolve_download_url`).
    pub async fn download_artifact(&self, url: &Url) -> Result<Bytes, ClientError> {
        debug!("GET {}", url);
        let response = self.authorize(self.client.get(url.clone())).send().await?;
        let response = self.check_status(response).await?;
        Ok(response.bytes().await?)
    }

    pub async fn health_check(&self) -> Result<HealthStatus, ClientError> {
        let url = self.endpoint("health")?;
        let response = self.authorize(self.client.get(url)).send().await?;
        self.handle_json(response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn handle_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, ClientError> {
        let response = self.check_status(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| {
            error!("❌ Failed to decode backend response: {}", err);
            ClientError::MalformedResponse(err)
        })
    }

    async fn check_status(&self, response: Response) -> Result<Response, ClientError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("🔒 Backend rejected credentials, clearing persisted token");
            self.credentials.clear();
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = extract_detail(&body);
            error!("❌ Server error {}: {}", status, detail);
            return Err(ClientError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response)
    }
}

/// Pulls the FastAPI-style `{"detail": "..."}` message out of an error body,
/// falling back to the raw body.
fn extract_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(|detail| detail.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_settings;

    fn client() -> ApiClient {
        let settings = test_settings();
        let credentials = Arc::new(CredentialStore::new(
            std::env::temp_dir().join("textscore-api-test-token"),
        ));
        ApiClient::new(&settings, credentials).unwrap()
    }

    #[test]
    fn extracts_fastapi_detail() {
        assert_eq!(
            extract_detail(r#"{"detail": "Analysis result not found"}"#),
            "Analysis result not found"
        );
        assert_eq!(extract_detail("plain failure"), "plain failure");
        assert_eq!(extract_detail(r#"{"other": 1}"#), r#"{"other": 1}"#);
    }

    #[test]
    fn endpoints_join_onto_base() {
        let api = client();
        assert_eq!(api.endpoint("analyze").unwrap().path(), "/analyze");
        assert_eq!(
            api.endpoint("history/abc-123").unwrap().path(),
            "/history/abc-123"
        );
    }

    #[tokio::test]
    async fn unreachable_backend_normalizes_to_network_error() {
        let api = client();
        let err = api.health_check().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Network(_) | ClientError::Timeout
        ));
    }
}
