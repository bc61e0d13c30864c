use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

/// Signal-level tap feeding the visualization layer.
///
/// Holds the latest coarse level computed from captured chunks; presentation
/// polls it through a watch channel at its own cadence. Must be closed as
/// part of the stop teardown, after the capture device is released.
pub struct LevelTap {
    tx: watch::Sender<f32>,
    open: AtomicBool,
}

impl LevelTap {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0.0);
        Self {
            tx,
            open: AtomicBool::new(true),
        }
    }

    /// Coarse level estimate for one opaque encoded chunk.
    ///
    /// Real spectral analysis lives in the presentation layer; the pipeline
    /// only needs a rough activity proxy, so this uses byte dispersion.
    pub fn level_of(bytes: &[u8]) -> f32 {
        if bytes.is_empty() {
            return 0.0;
        }
        let mean = bytes.iter().map(|&b| b as f64).sum::<f64>() / bytes.len() as f64;
        let dev = bytes
            .iter()
            .map(|&b| (b as f64 - mean).abs())
            .sum::<f64>()
            / bytes.len() as f64;
        (dev / 128.0).clamp(0.0, 1.0) as f32
    }

    pub fn update(&self, level: f32) {
        if self.open.load(Ordering::SeqCst) {
            // Send only fails with no receivers; the latest value is still stored.
            let _ = self.tx.send(level.clamp(0.0, 1.0));
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<f32> {
        self.tx.subscribe()
    }

    /// Re-arm the tap for a new recording.
    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    /// Stop accepting level updates and reset the published level.
    ///
    /// Idempotent.
    pub fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            let _ = self.tx.send(0.0);
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl Default for LevelTap {
    fn default() -> Self {
        Self::new()
    }
}
