use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub classifier: ClassifierConfig,
    pub capture: CaptureSettings,
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Base URL of the emotion classification service.
    pub base_url: String,
    /// Request timeout for analyze calls, in seconds.
    pub timeout_secs: u64,
}

/// Settings forwarded to the audio capture backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Slice interval: one segment is emitted per interval while capturing.
    pub segment_interval_ms: u64,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

/// Tuning for the dispatch queue and result history.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Segments smaller than this are presumed silence and dropped.
    pub min_segment_bytes: usize,
    /// Pending-queue length above which a dispatch error clears the backlog.
    pub shed_threshold: usize,
    /// Pause between dispatched segments (bounds outbound request rate).
    pub dispatch_delay_ms: u64,
    /// Short pause after discarding an undersized segment.
    pub skip_delay_ms: u64,
    /// Maximum number of timeline entries kept for display.
    pub history_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "voicemood".to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 5080,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            segment_interval_ms: 3000,
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_segment_bytes: 5000,
            shed_threshold: 3,
            dispatch_delay_ms: 500,
            skip_delay_ms: 100,
            history_capacity: 10,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
