use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::{AnalysisResult, Emotion};

/// One past classification kept for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub timestamp: DateTime<Utc>,
    pub emotion: Emotion,
    pub confidence: f32,
}

/// Bounded most-recent-first history of classification results.
///
/// Insertion at the head; the oldest entry is evicted once capacity is
/// exceeded. Cleared only by process restart.
#[derive(Debug)]
pub struct EmotionTimeline {
    entries: VecDeque<TimelineEntry>,
    capacity: usize,
}

impl EmotionTimeline {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a fresh result at the head of the history.
    pub fn record(&mut self, result: &AnalysisResult) -> TimelineEntry {
        let entry = TimelineEntry {
            timestamp: Utc::now(),
            emotion: result.emotion,
            confidence: result.confidence,
        };
        self.entries.push_front(entry.clone());
        self.entries.truncate(self.capacity);
        entry
    }

    /// Most-recent-first copy for presentation.
    pub fn snapshot(&self) -> Vec<TimelineEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EmotionTimeline {
    fn default() -> Self {
        Self::new(10)
    }
}
