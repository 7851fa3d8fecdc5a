use std::collections::VecDeque;

use log::info;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::config::HistoryOrder;
use crate::models::{AnalysisResult, HistoryItem};

const PREVIEW_MAX_CHARS: usize = 100;

/// Session-scoped store for the current analysis result and a bounded
/// history of past analyses. Shared by `Arc`, never through module globals;
/// pages and controllers receive it by reference.
pub struct ResultStore {
    inner: Mutex<StoreInner>,
    capacity: usize,
    order: HistoryOrder,
}

struct StoreInner {
    current: Option<AnalysisResult>,
    history: VecDeque<HistoryItem>,
}

impl ResultStore {
    pub fn new(capacity: usize, order: HistoryOrder) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                current: None,
                history: VecDeque::new(),
            }),
            capacity,
            order,
        }
    }

    /// Replaces the current result. `None` clears the active result for a
    /// "new analysis" reset without touching history.
    pub fn set_current_result(&self, result: Option<AnalysisResult>) {
        self.inner.lock().current = result;
    }

    pub fn current_result(&self) -> Option<AnalysisResult> {
        self.inner.lock().current.clone()
    }

    /// Appends a history entry projected from `result`, then truncates to
    /// the most recent `capacity` entries. Eviction is FIFO by insertion.
    pub fn add_to_history(
        &self,
        result: &AnalysisResult,
        preview: &str,
        topic: Option<String>,
    ) -> HistoryItem {
        let item = HistoryItem {
            id: result
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            timestamp: result.timestamp,
            text_preview: truncate_preview(preview),
            overall_score: result.overall_score,
            word_count: result.word_count,
            topic,
        };

        let mut inner = self.inner.lock();
        inner.history.push_back(item.clone());
        while inner.history.len() > self.capacity {
            inner.history.pop_front();
        }
        item
    }

    pub fn remove_from_history(&self, id: &str) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.history.len();
        inner.history.retain(|item| item.id != id);
        before != inner.history.len()
    }

    pub fn clear_history(&self) {
        self.inner.lock().history.clear();
        info!("🗑️ Analysis history cleared");
    }

    /// Snapshot of the history, ordered per the configured display policy.
    pub fn history(&self) -> Vec<HistoryItem> {
        let inner = self.inner.lock();
        match self.order {
            HistoryOrder::Insertion => inner.history.iter().cloned().collect(),
            HistoryOrder::NewestFirst => inner.history.iter().rev().cloned().collect(),
        }
    }

    pub fn history_len(&self) -> usize {
        self.inner.lock().history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history_len() == 0
    }
}

fn truncate_preview(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= PREVIEW_MAX_CHARS {
        return trimmed.to_string();
    }
    trimmed.chars().take(PREVIEW_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_result;

    fn result_scoring(score: f64) -> AnalysisResult {
        let mut result = sample_result();
        result.overall_score = score;
        result
    }

    #[test]
    fn keeps_only_the_most_recent_ten_entries() {
        let store = ResultStore::new(10, HistoryOrder::Insertion);
        for i in 0..11 {
            let result = result_scoring(i as f64);
            store.add_to_history(&result, &format!("text number {}", i), None);
        }

        let history = store.history();
        assert_eq!(history.len(), 10);
        // The earliest of the 11 is evicted, FIFO.
        assert_eq!(history[0].text_preview, "text number 1");
        assert_eq!(history[9].text_preview, "text number 10");
    }

    #[test]
    fn newest_first_policy_reverses_snapshot_only() {
        let store = ResultStore::new(10, HistoryOrder::NewestFirst);
        store.add_to_history(&result_scoring(70.0), "first", None);
        store.add_to_history(&result_scoring(80.0), "second", None);

        let history = store.history();
        assert_eq!(history[0].text_preview, "second");
        assert_eq!(history[1].text_preview, "first");
    }

    #[test]
    fn clearing_current_result_leaves_history_alone() {
        let store = ResultStore::new(10, HistoryOrder::Insertion);
        let result = sample_result();
        store.set_current_result(Some(result.clone()));
        store.add_to_history(&result, "The quick brown fox.", None);

        store.set_current_result(None);
        assert!(store.current_result().is_none());
        assert_eq!(store.history_len(), 1);
    }

    #[test]
    fn remove_from_history_by_id() {
        let store = ResultStore::new(10, HistoryOrder::Insertion);
        let item = store.add_to_history(&sample_result(), "some text", None);
        assert!(store.remove_from_history(&item.id));
        assert!(!store.remove_from_history(&item.id));
        assert!(store.is_empty());
    }

    #[test]
    fn preview_is_capped_at_100_chars() {
        let store = ResultStore::new(10, HistoryOrder::Insertion);
        let long_text = "x".repeat(250);
        let item = store.add_to_history(&sample_result(), &long_text, None);
        assert_eq!(item.text_preview.chars().count(), 100);
    }

    #[test]
    fn history_item_carries_topic_and_score() {
        let store = ResultStore::new(10, HistoryOrder::Insertion);
        let item = store.add_to_history(
            &result_scoring(92.0),
            "The quick brown fox.",
            Some("nature".to_string()),
        );
        assert_eq!(item.overall_score, 92.0);
        assert_eq!(item.topic.as_deref(), Some("nature"));
        assert_eq!(item.text_preview, "The quick brown fox.");
    }
}
