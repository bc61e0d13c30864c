use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::manager::SessionManager;
use crate::audio::{AudioCapture, CaptureConfig, LevelTap};
use crate::classifier::Classifier;
use crate::config::Config;
use crate::error::PipelineError;
use crate::pipeline::{
    Activity, DispatchEvent, DispatchQueue, DispatchTuning, EmotionTimeline, PresentationUpdate,
    RecordingStatus, Segment, SegmentFilter, TimelineEntry,
};

/// The owning object for one live recording pipeline.
///
/// Constructed once per process and reused across recordings: `start` opens
/// a fresh session, acquires the capture device and wires the producer into
/// the dispatch queue; `stop` tears everything down in a fixed order. At
/// most one recording is active at a time.
pub struct RecordingPipeline {
    config: Config,
    sessions: SessionManager,
    queue: Arc<DispatchQueue>,
    filter: SegmentFilter,
    level: Arc<LevelTap>,

    /// The capture backend, held for the lifetime of the pipeline so the
    /// device can be re-acquired on each start.
    backend: Mutex<Box<dyn AudioCapture>>,

    producer_task: Mutex<Option<JoinHandle<()>>>,
    viz_task: Mutex<Option<JoinHandle<()>>>,

    status_tx: watch::Sender<RecordingStatus>,
    status_rx: watch::Receiver<RecordingStatus>,
    timeline: Arc<Mutex<EmotionTimeline>>,
    updates: broadcast::Sender<PresentationUpdate>,

    /// Result of the startup check-status probe; recording refuses to start
    /// until the classifier service reports itself configured.
    service_ready: AtomicBool,
}

impl RecordingPipeline {
    pub fn new(
        config: Config,
        classifier: Arc<dyn Classifier>,
        backend: Box<dyn AudioCapture>,
    ) -> Self {
        let filter = SegmentFilter::new(config.pipeline.min_segment_bytes);
        let tuning = DispatchTuning::from(&config.pipeline);
        let timeline = Arc::new(Mutex::new(EmotionTimeline::new(
            config.pipeline.history_capacity,
        )));
        let (status_tx, status_rx) = watch::channel(RecordingStatus::Idle);
        let (updates, _) = broadcast::channel(64);
        let (events_tx, events_rx) = mpsc::channel(64);

        let queue = DispatchQueue::new(Arc::clone(&classifier), filter, tuning, events_tx);

        Self::spawn_aggregator(
            events_rx,
            status_tx.clone(),
            status_rx.clone(),
            Arc::clone(&timeline),
            updates.clone(),
        );

        Self {
            sessions: SessionManager::new(classifier),
            queue,
            filter,
            level: Arc::new(LevelTap::new()),
            backend: Mutex::new(backend),
            producer_task: Mutex::new(None),
            viz_task: Mutex::new(None),
            status_tx,
            status_rx,
            timeline,
            updates,
            service_ready: AtomicBool::new(false),
            config,
        }
    }

    /// Record the outcome of the classifier status probe.
    ///
    /// When the service is not configured the pipeline holds a persistent
    /// error status and refuses to start.
    pub fn set_service_ready(&self, ready: bool) {
        self.service_ready.store(ready, Ordering::SeqCst);
        if !ready {
            self.set_status(RecordingStatus::Error(
                "Emotion service is not configured".to_string(),
            ));
        }
    }

    pub fn service_ready(&self) -> bool {
        self.service_ready.load(Ordering::SeqCst)
    }

    /// Start a new recording.
    ///
    /// Returns the fresh session id. Fails with `SessionAlreadyActive` while
    /// a recording is open, `ServiceUnavailable` when the classifier probe
    /// has not passed, and `Capture` when the device cannot be acquired (in
    /// which case no session remains open and start may be retried).
    pub async fn start(&self) -> Result<String, PipelineError> {
        if !self.service_ready() {
            return Err(PipelineError::ServiceUnavailable(
                "check-status probe has not passed".to_string(),
            ));
        }

        let session = self.sessions.begin().await?;

        let capture_config = CaptureConfig::from(&self.config.capture);
        let chunk_rx = {
            let mut backend = self.backend.lock().await;
            match backend.start(&capture_config).await {
                Ok(rx) => rx,
                Err(e) => {
                    // The session never produced anything; roll it back
                    // without a termination notice.
                    self.sessions.discard().await;
                    self.set_status(RecordingStatus::Idle);
                    error!("Failed to acquire capture device: {}", e);
                    return Err(e.into());
                }
            }
        };

        self.level.open();
        self.spawn_producer(chunk_rx, session.id.clone()).await;
        self.spawn_visualizer().await;

        self.set_status(RecordingStatus::Recording(Activity::Listening));
        info!("Recording started (session {})", session.id);

        Ok(session.id)
    }

    /// Stop the active recording.
    ///
    /// Teardown happens in a fixed order before this returns: capture
    /// device released, level tap closed, visualization task cancelled,
    /// session-end notice sent. Safe to call when already stopped. An
    /// in-flight classifier call is not cancelled; its late result is
    /// ignored once the status has left `Recording`.
    pub async fn stop(&self) -> Result<(), PipelineError> {
        if self.sessions.active_id().await.is_none() {
            debug!("Stop requested with no active recording");
            return Ok(());
        }

        info!("Stopping recording");

        // 1. Release the capture device. A stop failure must not leave the
        //    rest of the teardown undone.
        {
            let mut backend = self.backend.lock().await;
            if let Err(e) = backend.stop().await {
                warn!("Capture backend stop failed: {}", e);
            }
        }

        if let Some(task) = self.producer_task.lock().await.take() {
            task.abort();
        }

        // 2. Close the level-analysis tap.
        self.level.close();

        // 3. Cancel pending visualization callbacks.
        if let Some(task) = self.viz_task.lock().await.take() {
            task.abort();
        }

        // 4. Notify the collaborator the session ended (best effort).
        self.sessions.end().await;

        self.set_status(RecordingStatus::Stopped);
        info!("Recording stopped");

        Ok(())
    }

    pub fn status(&self) -> RecordingStatus {
        self.status_rx.borrow().clone()
    }

    pub fn status_text(&self) -> String {
        self.status_rx.borrow().status_text()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<RecordingStatus> {
        self.status_rx.clone()
    }

    pub fn subscribe_updates(&self) -> broadcast::Receiver<PresentationUpdate> {
        self.updates.subscribe()
    }

    pub fn level_tap(&self) -> Arc<LevelTap> {
        Arc::clone(&self.level)
    }

    pub fn queue(&self) -> Arc<DispatchQueue> {
        Arc::clone(&self.queue)
    }

    pub async fn timeline_snapshot(&self) -> Vec<TimelineEntry> {
        self.timeline.lock().await.snapshot()
    }

    pub async fn active_session_id(&self) -> Option<String> {
        self.sessions.active_id().await
    }

    fn set_status(&self, status: RecordingStatus) {
        let text = status.status_text();
        self.status_tx.send_replace(status);
        let _ = self.updates.send(PresentationUpdate::status_only(text));
    }

    /// Forward captured chunks into the queue, size-filtering at ingestion.
    /// The producer never blocks on the consumer: enqueue only appends.
    async fn spawn_producer(
        &self,
        mut chunk_rx: tokio::sync::mpsc::Receiver<crate::audio::CapturedChunk>,
        session_id: String,
    ) {
        let queue = Arc::clone(&self.queue);
        let filter = self.filter;
        let level = Arc::clone(&self.level);

        let task = tokio::spawn(async move {
            while let Some(chunk) = chunk_rx.recv().await {
                level.update(LevelTap::level_of(&chunk.bytes));

                let segment = Segment::from_chunk(chunk, session_id.clone());
                if filter.accepts(&segment) {
                    queue.enqueue(segment).await;
                }
            }
            debug!("Producer task finished (capture channel closed)");
        });

        *self.producer_task.lock().await = Some(task);
    }

    /// Push level readings to presentation at the tap's own cadence, so the
    /// UI can animate a waveform without touching the pipeline.
    async fn spawn_visualizer(&self) {
        let mut level_rx = self.level.subscribe();
        let status_rx = self.status_rx.clone();
        let updates = self.updates.clone();

        let task = tokio::spawn(async move {
            while level_rx.changed().await.is_ok() {
                let level = *level_rx.borrow();
                let _ = updates.send(PresentationUpdate {
                    status_text: status_rx.borrow().status_text(),
                    emotion_update: None,
                    timeline_snapshot: None,
                    level: Some(level),
                });
            }
        });

        *self.viz_task.lock().await = Some(task);
    }

    /// The result aggregator: consumes dispatch events, advances the status
    /// machine and the timeline, and broadcasts presentation updates.
    /// Events that arrive after the status has left `Recording` (an
    /// in-flight call finishing late) are dropped.
    fn spawn_aggregator(
        mut events_rx: mpsc::Receiver<DispatchEvent>,
        status_tx: watch::Sender<RecordingStatus>,
        status_rx: watch::Receiver<RecordingStatus>,
        timeline: Arc<Mutex<EmotionTimeline>>,
        updates: broadcast::Sender<PresentationUpdate>,
    ) {
        tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                if !status_rx.borrow().is_recording() {
                    debug!("Ignoring dispatch event after stop");
                    continue;
                }

                match event {
                    DispatchEvent::Analyzing => {
                        let status = RecordingStatus::Recording(Activity::Analyzing);
                        let text = status.status_text();
                        status_tx.send_replace(status);
                        let _ = updates.send(PresentationUpdate::status_only(text));
                    }
                    DispatchEvent::Skipped => {
                        // Neutral outcome: keep recording, no timeline entry.
                        let status = RecordingStatus::Recording(Activity::Listening);
                        let text = status.status_text();
                        status_tx.send_replace(status);
                        let _ = updates.send(PresentationUpdate::status_only(text));
                    }
                    DispatchEvent::Completed(result) => {
                        let snapshot = {
                            let mut timeline = timeline.lock().await;
                            timeline.record(&result);
                            timeline.snapshot()
                        };

                        let status = RecordingStatus::Recording(Activity::Detected(result.emotion));
                        let text = status.status_text();
                        status_tx.send_replace(status);
                        let _ = updates.send(PresentationUpdate {
                            status_text: text,
                            emotion_update: Some(result),
                            timeline_snapshot: Some(snapshot),
                            level: None,
                        });
                    }
                    DispatchEvent::Failed(message) => {
                        debug!("Dispatch failure reached aggregator: {}", message);
                        let status = RecordingStatus::Recording(Activity::Faulted);
                        let text = status.status_text();
                        status_tx.send_replace(status);
                        let _ = updates.send(PresentationUpdate::status_only(text));
                    }
                }
            }

            debug!("Aggregator task finished (dispatch channel closed)");
        });
    }
}
