use crate::domain::model::{
    CartCount, CartUpdate, PanelMessage, ProductId, RecognitionError, RecognitionOptions,
    RecognitionResult, Severity, VoiceOrderConfirmation,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Backend endpoints used by the storefront page.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    async fn fetch_cart_count(&self) -> Result<CartCount>;
    async fn add_to_cart(&self, product_id: &ProductId, quantity: u32) -> Result<CartUpdate>;
    /// `quantity == 0` removes the line item.
    async fn update_cart(&self, product_id: &ProductId, quantity: u32) -> Result<CartUpdate>;
    async fn submit_voice_order(&self, transcript: &str) -> Result<VoiceOrderConfirmation>;
}

/// Host speech-recognition capability.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    fn is_available(&self) -> bool;

    /// Listens for a single utterance and resolves once with its final result.
    async fn listen(
        &self,
        options: &RecognitionOptions,
    ) -> std::result::Result<RecognitionResult, RecognitionError>;

    /// Best-effort: a pending `listen` should resolve with `RecognitionError::Aborted`.
    fn stop(&self);
}

pub trait UiSink: Send + Sync {
    fn set_cart_count(&self, count: CartCount);
    fn show_toast(&self, message: &str, severity: Severity);
}

pub trait VoiceOrderView: UiSink {
    fn set_trigger_enabled(&self, enabled: bool);
    fn set_listening(&self, visible: bool);
    fn show_result(&self, message: PanelMessage);
    fn clear_result(&self);
}
