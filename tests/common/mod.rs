// Scripted stand-ins for the capture backend and the classifier service,
// shared by the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex};

use voicemood::{
    AnalysisResult, AnalyzeOutcome, AnalyzeRequest, AudioCapture, CaptureConfig, CapturedChunk,
    Classifier, ClassifierError, Emotion, Segment, ServiceStatus, VoiceFeatures,
};
use voicemood::classifier::{ClarityLabel, EnergyLabel, PaceLabel, PitchLabel};
use voicemood::error::CaptureError;

/// Poll an async condition until it holds, panicking after a few seconds.
pub async fn eventually<F, Fut>(what: &str, mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    loop {
        if condition().await {
            return;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for: {}", what);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Build a segment with a recognizable fill byte so dispatch order can be
/// asserted from the classifier call log.
pub fn make_segment(session_id: &str, size: usize, fill: u8) -> Segment {
    Segment {
        bytes: vec![fill; size],
        session_id: session_id.to_string(),
        captured_at: Utc::now(),
    }
}

pub fn make_result(emotion: Emotion, confidence: f32) -> AnalysisResult {
    AnalysisResult {
        emotion,
        confidence,
        voice_features: VoiceFeatures {
            pitch: PitchLabel::Medium,
            pace: PaceLabel::Moderate,
            energy: EnergyLabel::Moderate,
            clarity: ClarityLabel::Good,
        },
        analysis: format!("Speaker sounds {}", emotion),
    }
}

/// One scripted answer for an analyze call.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    Skip,
    Classify(AnalysisResult),
    Fail(String),
}

/// Classifier double: answers analyze calls from a queued script and logs
/// everything it is asked to do.
pub struct ScriptedClassifier {
    outcomes: Mutex<VecDeque<ScriptedOutcome>>,
    /// Every analyze request, in arrival order.
    pub analyze_log: Mutex<Vec<AnalyzeRequest>>,
    /// Every end-session notice received.
    pub end_session_log: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    call_delay: Duration,
    configured: bool,
    fail_end_session: bool,
}

impl ScriptedClassifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(VecDeque::new()),
            analyze_log: Mutex::new(Vec::new()),
            end_session_log: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            call_delay: Duration::from_millis(20),
            configured: true,
            fail_end_session: false,
        })
    }

    pub fn with_call_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            call_delay: delay,
            ..Self::blank()
        })
    }

    pub fn failing_end_session() -> Arc<Self> {
        Arc::new(Self {
            fail_end_session: true,
            ..Self::blank()
        })
    }

    fn blank() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            analyze_log: Mutex::new(Vec::new()),
            end_session_log: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            call_delay: Duration::from_millis(20),
            configured: true,
            fail_end_session: false,
        }
    }

    pub async fn script(&self, outcome: ScriptedOutcome) {
        self.outcomes.lock().await.push_back(outcome);
    }

    pub async fn script_many(&self, outcomes: impl IntoIterator<Item = ScriptedOutcome>) {
        let mut queue = self.outcomes.lock().await;
        queue.extend(outcomes);
    }

    pub async fn analyze_count(&self) -> usize {
        self.analyze_log.lock().await.len()
    }

    pub async fn end_session_count(&self) -> usize {
        self.end_session_log.lock().await.len()
    }

    /// Highest number of concurrently in-flight analyze calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Classifier for ScriptedClassifier {
    async fn check_status(&self) -> Result<ServiceStatus, ClassifierError> {
        Ok(ServiceStatus {
            configured: self.configured,
            message: None,
        })
    }

    async fn analyze_segment(
        &self,
        request: AnalyzeRequest,
    ) -> Result<AnalyzeOutcome, ClassifierError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        self.analyze_log.lock().await.push(request);

        // Simulated network latency, long enough for overlap to show up if
        // two workers ever ran at once.
        tokio::time::sleep(self.call_delay).await;

        let outcome = self.outcomes.lock().await.pop_front();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match outcome {
            None | Some(ScriptedOutcome::Skip) => Ok(AnalyzeOutcome::Skipped),
            Some(ScriptedOutcome::Classify(result)) => Ok(AnalyzeOutcome::Analyzed(result)),
            Some(ScriptedOutcome::Fail(message)) => Err(ClassifierError::Rejected {
                status: 503,
                message,
            }),
        }
    }

    async fn end_session(&self, session_id: &str) -> Result<(), ClassifierError> {
        self.end_session_log
            .lock()
            .await
            .push(session_id.to_string());

        if self.fail_end_session {
            return Err(ClassifierError::Rejected {
                status: 500,
                message: "end-session unavailable".to_string(),
            });
        }
        Ok(())
    }
}

/// Capture backend double: emits a fixed list of chunk sizes as fast as the
/// test asked for, and records whether the device was released.
#[derive(Debug)]
pub struct ScriptedCapture {
    chunk_sizes: Vec<usize>,
    chunk_interval: Duration,
    capturing: Arc<AtomicBool>,
    released: Arc<AtomicBool>,
    fail_start: bool,
}

impl ScriptedCapture {
    pub fn new(chunk_sizes: Vec<usize>) -> Self {
        Self {
            chunk_sizes,
            chunk_interval: Duration::from_millis(5),
            capturing: Arc::new(AtomicBool::new(false)),
            released: Arc::new(AtomicBool::new(false)),
            fail_start: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            fail_start: true,
            ..Self::new(Vec::new())
        }
    }

    /// Clone the released flag before handing the backend to the pipeline.
    pub fn released_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }

    pub fn capturing_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.capturing)
    }
}

#[async_trait::async_trait]
impl AudioCapture for ScriptedCapture {
    async fn start(
        &mut self,
        _config: &CaptureConfig,
    ) -> Result<mpsc::Receiver<CapturedChunk>, CaptureError> {
        if self.fail_start {
            return Err(CaptureError::Unavailable(
                "scripted permission denial".to_string(),
            ));
        }

        self.capturing.store(true, Ordering::SeqCst);
        self.released.store(false, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel(32);
        let sizes = self.chunk_sizes.clone();
        let interval = self.chunk_interval;

        tokio::spawn(async move {
            for (i, size) in sizes.into_iter().enumerate() {
                tokio::time::sleep(interval).await;
                let chunk = CapturedChunk {
                    bytes: vec![(i % 251) as u8; size],
                    captured_at: Utc::now(),
                };
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
            // Channel closes when tx drops.
        });

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        self.capturing.store(false, Ordering::SeqCst);
        self.released.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
