use crate::core::cart::{CartBadgeService, CartMutationService};
use crate::core::voice_order::VoiceOrderController;
use crate::domain::model::RecognitionOptions;
use crate::domain::ports::{SpeechRecognizer, StorefrontApi, VoiceOrderView};
use std::sync::Arc;

/// Page-level wiring: one backend client and one UI shared by every service.
pub struct Storefront<R: SpeechRecognizer, A: StorefrontApi, V: VoiceOrderView> {
    cart: CartMutationService<A, V>,
    voice: VoiceOrderController<R, A, V>,
}

impl<R: SpeechRecognizer, A: StorefrontApi, V: VoiceOrderView> Storefront<R, A, V> {
    pub fn new(api: A, ui: Arc<V>, recognizer: R, options: RecognitionOptions) -> Self {
        let api = Arc::new(api);
        Self {
            cart: CartMutationService::new(Arc::clone(&api), Arc::clone(&ui)),
            voice: VoiceOrderController::new(Arc::new(recognizer), api, ui, options),
        }
    }

    /// 頁面載入時更新購物車數量，失敗不影響其他功能
    pub async fn init(&self) {
        if self.badge().refresh().await.is_err() {
            tracing::warn!("Cart badge left unchanged after failed initial refresh");
        }
    }

    pub fn badge(&self) -> &CartBadgeService<A, V> {
        self.cart.badge()
    }

    pub fn cart(&self) -> &CartMutationService<A, V> {
        &self.cart
    }

    pub fn voice(&self) -> &VoiceOrderController<R, A, V> {
        &self.voice
    }
}
