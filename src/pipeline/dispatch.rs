use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use super::events::DispatchEvent;
use super::filter::SegmentFilter;
use super::segment::Segment;
use crate::classifier::{AnalyzeOutcome, AnalyzeRequest, Classifier};
use crate::config::PipelineSettings;

/// Timing and shedding knobs for the dispatch worker.
#[derive(Debug, Clone)]
pub struct DispatchTuning {
    /// Pending-queue length above which a dispatch error clears the backlog.
    pub shed_threshold: usize,
    /// Pause after every dispatched segment (success, skip or error).
    pub dispatch_delay: Duration,
    /// Pause after discarding an undersized segment, so a burst of tiny
    /// segments does not spin the worker.
    pub skip_delay: Duration,
}

impl From<&PipelineSettings> for DispatchTuning {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            shed_threshold: settings.shed_threshold,
            dispatch_delay: Duration::from_millis(settings.dispatch_delay_ms),
            skip_delay: Duration::from_millis(settings.skip_delay_ms),
        }
    }
}

impl Default for DispatchTuning {
    fn default() -> Self {
        Self::from(&PipelineSettings::default())
    }
}

struct QueueState {
    pending: VecDeque<Segment>,
    /// True while a worker task is draining the queue. At most one worker
    /// exists at any time; this flag is flipped under the same lock that
    /// guards the queue, so a second worker can never be spawned.
    worker_active: bool,
}

/// Ordered segment queue with a single draining worker.
///
/// `enqueue` only appends and wakes an idle worker; the queue contents and
/// the worker flag are otherwise mutated by the worker loop alone. Segments
/// go to the classifier strictly one at a time, in FIFO order. On a dispatch
/// error the whole backlog is cleared once it exceeds the shedding
/// threshold: dropping recent audio is preferred over hammering a failing
/// service with stale segments.
pub struct DispatchQueue {
    state: Mutex<QueueState>,
    classifier: Arc<dyn Classifier>,
    filter: SegmentFilter,
    tuning: DispatchTuning,
    events: mpsc::Sender<DispatchEvent>,
}

impl DispatchQueue {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        filter: SegmentFilter,
        tuning: DispatchTuning,
        events: mpsc::Sender<DispatchEvent>,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                worker_active: false,
            }),
            classifier,
            filter,
            tuning,
            events,
        })
    }

    /// Append a segment and wake the worker if it is idle.
    pub async fn enqueue(self: &Arc<Self>, segment: Segment) {
        let mut state = self.state.lock().await;
        state.pending.push_back(segment);

        if !state.worker_active {
            state.worker_active = true;
            let queue = Arc::clone(self);
            tokio::spawn(async move {
                queue.worker_loop().await;
            });
        }
    }

    /// Number of segments waiting (excludes any segment in flight).
    pub async fn pending_len(self: &Arc<Self>) -> usize {
        self.state.lock().await.pending.len()
    }

    /// Whether a worker task is currently draining the queue.
    pub async fn is_draining(self: &Arc<Self>) -> bool {
        self.state.lock().await.worker_active
    }

    async fn worker_loop(self: Arc<Self>) {
        loop {
            let segment = {
                let mut state = self.state.lock().await;
                match state.pending.pop_front() {
                    Some(segment) => segment,
                    None => {
                        // Queue drained; the next enqueue respawns us.
                        state.worker_active = false;
                        return;
                    }
                }
            };

            // Defensive re-check of the size filter: segments can be
            // enqueued from more than one call site.
            if !self.filter.accepts(&segment) {
                tokio::time::sleep(self.tuning.skip_delay).await;
                continue;
            }

            self.emit(DispatchEvent::Analyzing).await;

            let request = AnalyzeRequest {
                audio: segment.to_data_uri(),
                session_id: segment.session_id.clone(),
            };

            match self.classifier.analyze_segment(request).await {
                Ok(AnalyzeOutcome::Skipped) => {
                    debug!("Classifier skipped segment (server-side silence)");
                    self.emit(DispatchEvent::Skipped).await;
                }
                Ok(AnalyzeOutcome::Analyzed(result)) => {
                    info!(
                        "Analysis complete: {} ({:.2})",
                        result.emotion, result.confidence
                    );
                    self.emit(DispatchEvent::Completed(result)).await;
                }
                Err(e) => {
                    warn!("Segment dispatch failed: {}", e);
                    self.shed_backlog().await;
                    self.emit(DispatchEvent::Failed(e.to_string())).await;
                }
            }

            // Pacing: bounds the outbound request rate no matter how fast
            // segments are produced.
            tokio::time::sleep(self.tuning.dispatch_delay).await;
        }
    }

    /// After a failure, drop the entire backlog once it has grown past the
    /// threshold. Clearing an empty queue is a no-op.
    async fn shed_backlog(&self) {
        let mut state = self.state.lock().await;
        if state.pending.len() > self.tuning.shed_threshold {
            let dropped = state.pending.len();
            state.pending.clear();
            warn!(
                "Shedding backlog: dropped {} pending segments after dispatch failure",
                dropped
            );
        }
    }

    async fn emit(&self, event: DispatchEvent) {
        if self.events.send(event).await.is_err() {
            debug!("Dispatch event receiver dropped");
        }
    }
}
