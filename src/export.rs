// Export is a two-step protocol: ask the backend to generate the artifact,
// then fetch it by its download URL and land it on disk.

use std::path::PathBuf;
use std::sync::Arc;

use log::info;
use url::Url;

use crate::api::ApiClient;
use crate::config::Settings;
use crate::error::ClientError;
use crate::models::{AnalysisResult, ExportFormat, ExportRequest};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub include_visualizations: bool,
    pub include_detailed_feedback: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_visualizations: true,
            include_detailed_feedback: true,
        }
    }
}

/// A fetched export artifact, written under the configured download
/// directory.
#[derive(Debug, Clone)]
pub struct ExportedArtifact {
    pub path: PathBuf,
    pub file_size: u64,
    pub format: ExportFormat,
    pub download_url: Url,
}

pub struct ExportController {
    api: Arc<ApiClient>,
    download_dir: PathBuf,
}

impl ExportController {
    pub fn new(settings: &Settings, api: Arc<ApiClient>) -> Self {
        Self {
            api,
            download_dir: settings.download_dir.clone(),
        }
    }

    /// Exports a persisted analysis result. Fails with `MissingResultId`
    /// before issuing any request when the result was never persisted.
    pub async fn export(
        &self,
        result: &AnalysisResult,
        format: ExportFormat,
        options: ExportOptions,
    ) -> Result<ExportedArtifact, ClientError> {
        let result_id = result
            .result_id()
            .ok_or(ClientError::MissingResultId)?
            .to_string();

        info!("📦 Requesting {} export for result {}", format, result_id);
        let request = ExportRequest {
            result_id,
            format,
            include_visualizations: options.include_visualizations,
            include_detailed_feedback: options.include_detailed_feedback,
        };
        let response = self.api.export_analysis(&request).await?;

        let url = resolve_download_url(self.api.base_url(), &response.download_url)?;
        let bytes = self.api.download_artifact(&url).await?;

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let path = self.download_dir.join(artifact_filename(&url, format));
        tokio::fs::write(&path, &bytes).await?;

        info!("✅ Export saved: {} ({} bytes)", path.display(), bytes.len());
        Ok(ExportedArtifact {
            path,
            file_size: bytes.len() as u64,
            format,
            download_url: url,
        })
    }
}

/// Composes the artifact URL. The backend hands back a server-relative path
/// which may or may not already carry the `/download/` prefix; absolute URLs
/// pass through untouched.
pub fn resolve_download_url(base: &Url, download_url: &str) -> Result<Url, ClientError> {
    if let Ok(absolute) = Url::parse(download_url) {
        return Ok(absolute);
    }

    let trimmed = download_url.trim_start_matches('/');
    let path = if trimmed.starts_with("download/") {
        trimmed.to_string()
    } else {
        format!("download/{}", trimmed)
    };
    Ok(base.join(&path)?)
}

fn artifact_filename(url: &Url, format: ExportFormat) -> String {
    url.path_segments()
        .and_then(|segments| segments.last())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("analysis_export.{}", format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialStore;
    use crate::config::test_settings;
    use crate::models::sample_result;

    fn base() -> Url {
        Url::parse("http://localhost:8000/").unwrap()
    }

    #[test]
    fn resolves_server_relative_path_with_prefix() {
        let url = resolve_download_url(&base(), "/download/analysis_abc.pdf").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/download/analysis_abc.pdf");
    }

    #[test]
    fn resolves_bare_filename() {
        let url = resolve_download_url(&base(), "analysis_abc.pdf").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/download/analysis_abc.pdf");
    }

    #[test]
    fn resolves_prefix_without_leading_slash() {
        let url = resolve_download_url(&base(), "download/analysis_abc.pdf").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/download/analysis_abc.pdf");
    }

    #[test]
    fn passes_absolute_url_through() {
        let url = resolve_download_url(&base(), "https://cdn.example.com/f.pdf").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/f.pdf");
    }

    #[test]
    fn filename_falls_back_to_format_extension() {
        let url = Url::parse("http://localhost:8000/download/").unwrap();
        assert_eq!(
            artifact_filename(&url, ExportFormat::Csv),
            "analysis_export.csv"
        );

        let url = Url::parse("http://localhost:8000/download/report.pdf").unwrap();
        assert_eq!(artifact_filename(&url, ExportFormat::Pdf), "report.pdf");
    }

    #[tokio::test]
    async fn export_without_result_id_issues_no_request() {
        let settings = test_settings();
        let credentials = Arc::new(CredentialStore::new(
            std::env::temp_dir().join("textscore-export-test-token"),
        ));
        let api = Arc::new(ApiClient::new(&settings, credentials).unwrap());
        let controller = ExportController::new(&settings, api);

        // No id on the result: the call must fail locally. The test backend
        // is unroutable, so reaching the network would surface differently.
        let result = sample_result();
        let err = controller
            .export(&result, ExportFormat::Pdf, ExportOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::MissingResultId));
    }
}
