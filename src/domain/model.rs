use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type CartCount = u64;

/// 商品代碼，例如 `P001`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ToastId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Info,
    Success,
    Error,
}

/// Text shown in the voice-order result panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelMessage {
    pub kind: PanelKind,
    pub text: String,
}

impl PanelMessage {
    pub fn processing(transcript: &str) -> Self {
        Self {
            kind: PanelKind::Info,
            text: format!("Processing: \"{}\"", transcript),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: PanelKind::Success,
            text: text.into(),
        }
    }

    pub fn error(description: impl fmt::Display) -> Self {
        Self {
            kind: PanelKind::Error,
            text: format!("Error: {}", description),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceOrderState {
    Idle,
    CapabilityCheckFailed,
    Listening,
    Processing,
}

impl VoiceOrderState {
    pub fn is_active(&self) -> bool {
        matches!(self, VoiceOrderState::Listening | VoiceOrderState::Processing)
    }
}

/// One voice-order attempt. Discarded when the UI returns to idle.
#[derive(Debug, Clone)]
pub struct VoiceOrderSession {
    pub state: VoiceOrderState,
    pub transcript: Option<String>,
    pub last_error: Option<String>,
}

impl VoiceOrderSession {
    pub fn new() -> Self {
        Self {
            state: VoiceOrderState::Idle,
            transcript: None,
            last_error: None,
        }
    }
}

impl Default for VoiceOrderSession {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub locale: String,
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl RecognitionOptions {
    pub fn for_locale(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self::for_locale("en-IN")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionAlternative {
    pub transcript: String,
    pub confidence: f32,
}

/// Final results of one utterance, best alternative first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognitionResult {
    pub alternatives: Vec<RecognitionAlternative>,
}

impl RecognitionResult {
    pub fn single(transcript: impl Into<String>) -> Self {
        Self {
            alternatives: vec![RecognitionAlternative {
                transcript: transcript.into(),
                confidence: 1.0,
            }],
        }
    }

    pub fn best_transcript(&self) -> Option<&str> {
        self.alternatives
            .first()
            .map(|alt| alt.transcript.as_str())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Platform-reported recognition failures, displayed by their platform name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    #[error("no-speech")]
    NoSpeech,
    #[error("not-allowed")]
    PermissionDenied,
    #[error("aborted")]
    Aborted,
    #[error("audio-capture")]
    AudioCapture,
    #[error("network")]
    Network,
    #[error("{0}")]
    Other(String),
}

// 後端 JSON 格式

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoiceOrderRequest {
    pub transcript: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartCountResponse {
    pub count: CartCount,
}

/// Common `{success, error, ...}` envelope returned by the mutation endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiReply {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub cart_size: Option<CartCount>,
}

impl ApiReply {
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartUpdate {
    pub message: Option<String>,
    pub cart_size: Option<CartCount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceOrderConfirmation {
    pub message: String,
    pub cart_size: CartCount,
}
