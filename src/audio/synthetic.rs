use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::backend::{AudioCapture, CaptureConfig, CapturedChunk};
use crate::error::CaptureError;

/// Synthetic capture backend
///
/// Emits deterministic tone-shaped chunks at the configured interval.
/// Used by demos and integration tests in place of a real microphone.
#[derive(Debug)]
pub struct SyntheticCapture {
    chunk_bytes: usize,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl SyntheticCapture {
    pub fn new() -> Self {
        Self {
            // ~3s of 16kHz mono 16-bit audio
            chunk_bytes: 96_000,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// Override the emitted chunk size (tests use this to exercise the
    /// minimum-size filter).
    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes;
        self
    }

    fn render_chunk(size: usize, tick: u64) -> Vec<u8> {
        // Cheap 440Hz-ish sawtooth so chunks are non-zero and vary per tick
        let mut bytes = Vec::with_capacity(size);
        for i in 0..size {
            bytes.push(((i as u64 * 7 + tick * 13) % 251) as u8);
        }
        bytes
    }
}

impl Default for SyntheticCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AudioCapture for SyntheticCapture {
    async fn start(
        &mut self,
        config: &CaptureConfig,
    ) -> Result<mpsc::Receiver<CapturedChunk>, CaptureError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CaptureError::AlreadyCapturing);
        }

        info!(
            "Starting synthetic capture ({}ms slices, {} bytes each)",
            config.segment_interval_ms, self.chunk_bytes
        );

        self.running.store(true, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel(32);
        let running = Arc::clone(&self.running);
        let interval_ms = config.segment_interval_ms;
        let chunk_bytes = self.chunk_bytes;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
            // First tick fires immediately; skip it so the first chunk
            // represents a full slice interval.
            ticker.tick().await;

            let mut tick: u64 = 0;
            while running.load(Ordering::SeqCst) {
                ticker.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let chunk = CapturedChunk {
                    bytes: Self::render_chunk(chunk_bytes, tick),
                    captured_at: Utc::now(),
                };
                tick += 1;

                // try_send: the producer never blocks on a slow consumer
                if tx.try_send(chunk).is_err() {
                    debug!("Consumer lagging, dropped synthetic chunk {}", tick);
                }
            }

            debug!("Synthetic capture task stopped after {} chunks", tick);
        });

        self.task = Some(task);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            // Already stopped
            return Ok(());
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }

        info!("Synthetic capture stopped");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
