use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Stages shown while an analysis is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStage {
    Grammar,
    Coherence,
    Relevance,
    Report,
}

impl AnalysisStage {
    fn next(self) -> Option<AnalysisStage> {
        match self {
            AnalysisStage::Grammar => Some(AnalysisStage::Coherence),
            AnalysisStage::Coherence => Some(AnalysisStage::Relevance),
            AnalysisStage::Relevance => Some(AnalysisStage::Report),
            AnalysisStage::Report => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisStage::Grammar => "Checking grammar",
            AnalysisStage::Coherence => "Evaluating coherence",
            AnalysisStage::Relevance => "Scoring relevance",
            AnalysisStage::Report => "Building report",
        }
    }
}

/// Cosmetic progress indicator advancing on a fixed timer, fully decoupled
/// from the real network task. It informs the rendering layer only and must
/// never gate completion of the actual submission.
pub struct ProgressTicker {
    rx: watch::Receiver<AnalysisStage>,
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    pub fn start(step: Duration) -> Self {
        let (tx, rx) = watch::channel(AnalysisStage::Grammar);
        let handle = tokio::spawn(async move {
            let mut stage = AnalysisStage::Grammar;
            while let Some(next) = stage.next() {
                tokio::time::sleep(step).await;
                stage = next;
                if tx.send(stage).is_err() {
                    break;
                }
            }
        });
        Self { rx, handle }
    }

    pub fn stage(&self) -> AnalysisStage {
        *self.rx.borrow()
    }

    /// Receiver for the rendering layer to watch stage changes.
    pub fn subscribe(&self) -> watch::Receiver<AnalysisStage> {
        self.rx.clone()
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn advances_through_all_four_stages() {
        let ticker = ProgressTicker::start(Duration::from_millis(100));
        assert_eq!(ticker.stage(), AnalysisStage::Grammar);

        let mut rx = ticker.subscribe();
        for expected in [
            AnalysisStage::Coherence,
            AnalysisStage::Relevance,
            AnalysisStage::Report,
        ] {
            rx.changed().await.unwrap();
            assert_eq!(*rx.borrow(), expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_the_ticker() {
        let ticker = ProgressTicker::start(Duration::from_millis(100));
        ticker.stop();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(ticker.stage(), AnalysisStage::Grammar);
    }
}
