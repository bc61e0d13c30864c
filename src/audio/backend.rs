use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::config::CaptureSettings;
use crate::error::CaptureError;

/// One time-boxed slice of encoded audio emitted by a capture backend.
///
/// The byte content is opaque to the pipeline (whatever container the
/// backend produces); only its size and timestamp matter here.
#[derive(Debug, Clone)]
pub struct CapturedChunk {
    /// Encoded audio bytes for one slice interval.
    pub bytes: Vec<u8>,
    /// When this slice was cut.
    pub captured_at: DateTime<Utc>,
}

impl CapturedChunk {
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Configuration handed to a capture backend at start.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Emit one chunk per interval while capturing.
    pub segment_interval_ms: u64,
    /// Quality hints, forwarded opaquely to the platform capability.
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl From<&CaptureSettings> for CaptureConfig {
    fn from(settings: &CaptureSettings) -> Self {
        Self {
            segment_interval_ms: settings.segment_interval_ms,
            echo_cancellation: settings.echo_cancellation,
            noise_suppression: settings.noise_suppression,
            auto_gain_control: settings.auto_gain_control,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            segment_interval_ms: 3000,
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

/// Audio capture backend trait
///
/// The backend owns the device and the slicing cadence: while capturing it
/// pushes one [`CapturedChunk`] per interval into the returned channel and
/// never waits on the consumer.
#[async_trait::async_trait]
pub trait AudioCapture: Send + Sync + std::fmt::Debug {
    /// Acquire the device and start emitting chunks.
    ///
    /// Fails with [`CaptureError::Unavailable`] if the device cannot be
    /// acquired; in that case no chunk is ever produced.
    async fn start(
        &mut self,
        config: &CaptureConfig,
    ) -> Result<mpsc::Receiver<CapturedChunk>, CaptureError>;

    /// Stop capturing and release the device.
    ///
    /// Idempotent: calling stop on an already-stopped backend is a no-op.
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Audio source type
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// Platform microphone (requires a linked device backend).
    Microphone,
    /// Synthetic tone generator (demos and tests).
    Synthetic,
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    pub fn create(source: CaptureSource) -> Result<Box<dyn AudioCapture>, CaptureError> {
        match source {
            CaptureSource::Microphone => Err(CaptureError::Unavailable(
                "no platform microphone backend is linked into this build".to_string(),
            )),
            CaptureSource::Synthetic => Ok(Box::new(super::synthetic::SyntheticCapture::new())),
        }
    }
}
