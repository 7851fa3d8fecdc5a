//! TextScore desktop client: submission, result/history bookkeeping, and
//! export plumbing for the Text Scoring backend. The rendering layer is an
//! external collaborator that reads the store and drives the controllers.

pub mod analysis;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod store;
pub mod ws;

use std::sync::Arc;

use log::info;

pub use analysis::{
    AnalysisController, AnalysisStage, FileAttachment, ProgressTicker, SubmissionInput, Transport,
    FILE_PLACEHOLDER_PREFIX,
};
pub use api::ApiClient;
pub use auth::CredentialStore;
pub use config::{HistoryOrder, Settings};
pub use error::ClientError;
pub use export::{ExportController, ExportOptions, ExportedArtifact};
pub use models::{AnalysisResult, ExportFormat, HistoryItem};
pub use store::ResultStore;
pub use ws::{open_live_channel, LiveChannel, LiveMessage};

/// Wires settings, credentials, API client, store, and controllers
/// together. Everything is context-scoped: the state is built once and
/// passed by reference, never reached through module globals.
pub struct AppState {
    pub settings: Settings,
    pub credentials: Arc<CredentialStore>,
    pub api: Arc<ApiClient>,
    pub store: Arc<ResultStore>,
    pub analysis: AnalysisController,
    pub export: ExportController,
}

impl AppState {
    pub fn new() -> Result<Self, ClientError> {
        Self::from_settings(Settings::load()?)
    }

    pub fn from_settings(settings: Settings) -> Result<Self, ClientError> {
        info!("🚀 TextScore client targeting {}", settings.api_base_url);

        let credentials = Arc::new(CredentialStore::new(settings.credentials_path.clone()));
        let api = Arc::new(ApiClient::new(&settings, credentials.clone())?);
        let store = Arc::new(ResultStore::new(
            settings.history_limit,
            settings.history_order,
        ));
        let analysis = AnalysisController::new(&settings, api.clone(), store.clone());
        let export = ExportController::new(&settings, api.clone());

        Ok(Self {
            settings,
            credentials,
            api,
            store,
            analysis,
            export,
        })
    }
}
