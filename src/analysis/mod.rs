pub mod controller;
pub mod progress;

pub use controller::{
    AnalysisController, FileAttachment, SubmissionInput, Transport, FILE_PLACEHOLDER_PREFIX,
};
pub use progress::{AnalysisStage, ProgressTicker};
