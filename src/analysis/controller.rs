// Submission controller: validates input, picks the transport, and commits
// results to the store under a monotonic sequence so out-of-order
// completions can never clobber a newer submission.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};

use crate::api::ApiClient;
use crate::config::Settings;
use crate::error::ClientError;
use crate::models::{AnalysisResult, TextInput};
use crate::store::ResultStore;

use super::progress::ProgressTicker;

/// Placeholder the rendering layer writes into the text field for files it
/// cannot preview locally (PDF/DOCX). Its presence forces the file
/// transport.
pub const FILE_PLACEHOLDER_PREFIX: &str = "File ready to analyze:";

const PROGRESS_STEP: Duration = Duration::from_millis(900);

#[derive(Debug, Clone)]
pub struct FileAttachment {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileAttachment {
    /// Lowercased extension including the dot, e.g. `.pdf`.
    fn extension(&self) -> String {
        match self.filename.rfind('.') {
            Some(idx) => self.filename[idx..].to_ascii_lowercase(),
            None => String::new(),
        }
    }

    fn is_plain_text(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.starts_with("text/plain"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionInput {
    pub text: String,
    pub file: Option<FileAttachment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Text,
    FileUpload,
}

pub struct AnalysisController {
    api: Arc<ApiClient>,
    store: Arc<ResultStore>,
    allowed_extensions: Vec<String>,
    max_file_size: u64,
    min_text_length: usize,
    latest_seq: AtomicU64,
    loading: AtomicBool,
}

impl AnalysisController {
    pub fn new(settings: &Settings, api: Arc<ApiClient>, store: Arc<ResultStore>) -> Self {
        Self {
            api,
            store,
            allowed_extensions: settings.allowed_extensions(),
            max_file_size: settings.max_file_size,
            min_text_length: settings.min_text_length,
            latest_seq: AtomicU64::new(0),
            loading: AtomicBool::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Invalidates every in-flight submission: their completions become
    /// stale at the commit gate and are discarded.
    pub fn abort(&self) {
        let aborted = self.latest_seq.fetch_add(1, Ordering::SeqCst);
        warn!("🛑 Aborting in-flight submissions up to #{}", aborted);
    }

    /// Submits text or a file for analysis. On success the result replaces
    /// the current result and gains a history entry, unless a newer
    /// submission was issued meanwhile.
    pub async fn submit(
        &self,
        input: SubmissionInput,
        topic: Option<String>,
    ) -> Result<AnalysisResult, ClientError> {
        let transport = self.validate(&input)?;
        let token = self.next_token();
        self.loading.store(true, Ordering::SeqCst);
        let ticker = ProgressTicker::start(PROGRESS_STEP);
        info!("📤 Submitting analysis #{} via {:?} transport", token, transport);

        let outcome = match (transport, &input.file) {
            (Transport::FileUpload, Some(file)) => {
                self.api
                    .analyze_file(
                        &file.filename,
                        file.bytes.clone(),
                        file.content_type.as_deref(),
                        topic.as_deref(),
                    )
                    .await
            }
            _ => {
                let request = TextInput {
                    text: input.text.clone(),
                    topic: topic.clone(),
                    ..TextInput::default()
                };
                self.api.analyze_text(&request).await
            }
        };

        // Loading resets on every exit path; the ticker never gates this.
        ticker.stop();
        self.loading.store(false, Ordering::SeqCst);

        let result = match outcome {
            Ok(result) => result,
            Err(err) => {
                error!("❌ Analysis submission #{} failed: {}", token, err);
                return Err(err);
            }
        };

        self.commit(token, &result, &input, topic);
        Ok(result)
    }

    /// Decides how a submission travels. Quirk preserved on purpose: a
    /// plain-text file whose content was already inlined into the text
    /// field goes out as text, so `.txt` uploads are never transferred
    /// twice.
    pub fn select_transport(input: &SubmissionInput) -> Transport {
        match &input.file {
            Some(file)
                if !file.is_plain_text() || input.text.starts_with(FILE_PLACEHOLDER_PREFIX) =>
            {
                Transport::FileUpload
            }
            _ => Transport::Text,
        }
    }

    fn validate(&self, input: &SubmissionInput) -> Result<Transport, ClientError> {
        let trimmed = input.text.trim();

        if input.file.is_none() && trimmed.is_empty() {
            return Err(ClientError::EmptyInput);
        }

        if let Some(file) = &input.file {
            let extension = file.extension();
            if !self.allowed_extensions.iter().any(|a| *a == extension) {
                return Err(ClientError::UnsupportedFormat { extension });
            }
            let size = file.bytes.len() as u64;
            if size > self.max_file_size {
                return Err(ClientError::FileTooLarge {
                    size,
                    max: self.max_file_size,
                });
            }
        }

        let transport = Self::select_transport(input);
        if transport == Transport::Text && trimmed.chars().count() < self.min_text_length {
            return Err(ClientError::TooShort {
                min: self.min_text_length,
            });
        }

        Ok(transport)
    }

    fn next_token(&self) -> u64 {
        self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Commits a completed submission if its token is still the latest
    /// issued. Stale completions are logged and dropped so the store always
    /// reflects the most recently submitted request.
    fn commit(
        &self,
        token: u64,
        result: &AnalysisResult,
        input: &SubmissionInput,
        topic: Option<String>,
    ) -> bool {
        if self.latest_seq.load(Ordering::SeqCst) != token {
            warn!(
                "⏭️ Discarding stale analysis response #{}: a newer submission superseded it",
                token
            );
            return false;
        }

        let preview = preview_source(input);
        self.store.set_current_result(Some(result.clone()));
        self.store.add_to_history(result, &preview, topic);
        info!(
            "✅ Analysis #{} committed: overall score {:.1}",
            token, result.overall_score
        );
        true
    }
}

/// History previews come from the typed text; uploads without inlined
/// content fall back to the file name.
fn preview_source(input: &SubmissionInput) -> String {
    let trimmed = input.text.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    match &input.file {
        Some(file) => file.filename.clone(),
        None => String::new(),
    }
}
