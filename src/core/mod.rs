pub mod cart;
pub mod storefront;
pub mod toast;
pub mod voice_order;

pub use crate::domain::model::{ProductId, Severity, VoiceOrderState};
pub use crate::domain::ports::{SpeechRecognizer, StorefrontApi, UiSink, VoiceOrderView};
pub use crate::utils::error::Result;
