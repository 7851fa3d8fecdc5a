use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Spelling,
    Grammar,
    Punctuation,
    Style,
    Clarity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// A single issue flagged by the backend, with its character span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    pub position: [usize; 2],
    pub message: String,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarScore {
    pub score: f64,
    #[serde(default)]
    pub errors: Vec<TextIssue>,
    #[serde(default)]
    pub error_density: f64,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub details: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoherenceScore {
    pub score: f64,
    #[serde(default)]
    pub sentence_flow: Vec<f64>,
    #[serde(default)]
    pub paragraph_transitions: Vec<Value>,
    #[serde(default)]
    pub weak_connections: Vec<Value>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub readability_scores: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceScore {
    pub score: f64,
    #[serde(default)]
    pub topic_coverage: HashMap<String, f64>,
    #[serde(default)]
    pub key_terms_found: Vec<String>,
    #[serde(default)]
    pub missing_aspects: Vec<String>,
    #[serde(default)]
    pub topic_drift: Vec<Value>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Complete analysis result. Immutable once received: the store replaces the
/// current-result reference, it never mutates one in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Backend-assigned id, present only once the result is persisted.
    #[serde(default, alias = "result_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub overall_score: f64,
    pub grammar: GrammarScore,
    pub coherence: CoherenceScore,
    pub relevance: RelevanceScore,
    pub word_count: u32,
    pub sentence_count: u32,
    pub paragraph_count: u32,
    pub avg_sentence_length: f64,
    #[serde(default)]
    pub processing_time: f64,
    pub timestamp: DateTime<Utc>,
    pub feedback_summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
}

impl AnalysisResult {
    pub fn result_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

// DTOs for API communication

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextInput {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_weights: Option<HashMap<String, f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInput {
    pub texts: Vec<TextInput>,
    pub compare: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAnalysisResult {
    pub results: Vec<AnalysisResult>,
    #[serde(default)]
    pub comparative_analysis: Option<Value>,
    #[serde(default)]
    pub summary_statistics: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub text_preview: String,
    pub overall_score: f64,
    pub word_count: u32,
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Csv,
    Json,
    Docx,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    pub result_id: String,
    pub format: ExportFormat,
    pub include_visualizations: bool,
    pub include_detailed_feedback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub file_path: String,
    pub download_url: String,
    pub file_size: u64,
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub services: HashMap<String, String>,
}

#[cfg(test)]
pub(crate) const SAMPLE_RESULT_JSON: &str = r#"{
        "overall_score": 92.0,
        "grammar": {
            "score": 95.0,
            "errors": [
                {
                    "type": "spelling",
                    "severity": "low",
                    "position": [4, 9],
                    "message": "Possible typo",
                    "suggestion": "quick",
                    "confidence": 0.9
                }
            ],
            "error_density": 0.25,
            "suggestions": ["Review flagged spellings"],
            "details": {"vocabulary_level": {"lexical_diversity": 0.8}}
        },
        "coherence": {
            "score": 90.0,
            "sentence_flow": [0.9],
            "paragraph_transitions": [],
            "weak_connections": [],
            "suggestions": [],
            "readability_scores": {"flesch": 71.2}
        },
        "relevance": {
            "score": 88.0,
            "topic_coverage": {"nature": 0.75},
            "key_terms_found": ["fox"],
            "missing_aspects": [],
            "topic_drift": [],
            "suggestions": []
        },
        "word_count": 4,
        "sentence_count": 1,
        "paragraph_count": 1,
        "avg_sentence_length": 4.0,
        "processing_time": 0.42,
        "timestamp": "2025-06-01T12:00:00Z",
        "feedback_summary": "Your text scores 92.0/100, which is excellent.",
        "strengths": ["Strong grammar and spelling"],
        "areas_for_improvement": ["Review flagged spellings"]
    }"#;

#[cfg(test)]
pub(crate) fn sample_result() -> AnalysisResult {
    serde_json::from_str(SAMPLE_RESULT_JSON).expect("sample result json is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_analysis_result() {
        let result: AnalysisResult = serde_json::from_str(SAMPLE_RESULT_JSON).unwrap();
        assert_eq!(result.overall_score, 92.0);
        assert_eq!(result.grammar.score, 95.0);
        assert_eq!(result.coherence.score, 90.0);
        assert_eq!(result.relevance.score, 88.0);
        assert_eq!(result.word_count, 4);
        assert!(result.id.is_none());
        assert_eq!(result.grammar.errors.len(), 1);
        assert_eq!(result.grammar.errors[0].kind, IssueKind::Spelling);
        assert_eq!(result.grammar.errors[0].position, [4, 9]);
    }

    #[test]
    fn accepts_result_id_alias() {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE_RESULT_JSON).unwrap();
        value["result_id"] = serde_json::json!("abc-123");
        let result: AnalysisResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.result_id(), Some("abc-123"));
    }

    #[test]
    fn export_format_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ExportFormat::Pdf).unwrap(), "\"pdf\"");
        let parsed: ExportFormat = serde_json::from_str("\"docx\"").unwrap();
        assert_eq!(parsed, ExportFormat::Docx);
    }

    #[test]
    fn export_request_round_trips() {
        let request = ExportRequest {
            result_id: "abc-123".to_string(),
            format: ExportFormat::Csv,
            include_visualizations: true,
            include_detailed_feedback: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["format"], "csv");
        assert_eq!(json["result_id"], "abc-123");
    }
}
