use crate::domain::model::{
    PanelMessage, RecognitionError, RecognitionOptions, VoiceOrderConfirmation,
    VoiceOrderSession, VoiceOrderState,
};
use crate::domain::ports::{SpeechRecognizer, StorefrontApi, VoiceOrderView};
use crate::utils::error::{Result, StorefrontError};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type SessionSlot = Mutex<Option<VoiceOrderSession>>;

fn lock_slot(slot: &SessionSlot) -> MutexGuard<'_, Option<VoiceOrderSession>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Restores the idle UI and discards the session when dropped.
///
/// Dropping also happens when the `start()` future itself is dropped, so the
/// trigger cannot stay disabled after a cancelled attempt.
struct IdleGuard<'a, V: VoiceOrderView> {
    view: &'a V,
    slot: &'a SessionSlot,
}

impl<V: VoiceOrderView> Drop for IdleGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_trigger_enabled(true);
        self.view.set_listening(false);
        if let Some(session) = lock_slot(self.slot).take() {
            tracing::debug!(
                "Voice order session closed (last state {:?}, error: {:?})",
                session.state,
                session.last_error
            );
        }
    }
}

/// Drives one voice-order attempt at a time: listen, submit, reset.
pub struct VoiceOrderController<R: SpeechRecognizer, A: StorefrontApi, V: VoiceOrderView> {
    recognizer: Arc<R>,
    api: Arc<A>,
    view: Arc<V>,
    options: RecognitionOptions,
    session: SessionSlot,
}

impl<R: SpeechRecognizer, A: StorefrontApi, V: VoiceOrderView> VoiceOrderController<R, A, V> {
    pub fn new(recognizer: Arc<R>, api: Arc<A>, view: Arc<V>, options: RecognitionOptions) -> Self {
        Self {
            recognizer,
            api,
            view,
            options,
            session: Mutex::new(None),
        }
    }

    pub fn state(&self) -> VoiceOrderState {
        lock_slot(&self.session)
            .as_ref()
            .map(|session| session.state)
            .unwrap_or(VoiceOrderState::Idle)
    }

    pub fn options(&self) -> &RecognitionOptions {
        &self.options
    }

    /// Runs a full attempt. Every error is already shown in the result panel
    /// when it is returned.
    pub async fn start(&self) -> Result<VoiceOrderConfirmation> {
        let available = {
            let mut slot = lock_slot(&self.session);
            if slot.as_ref().is_some_and(|session| session.state.is_active()) {
                tracing::warn!("Ignoring voice order start: a session is already active");
                return Err(StorefrontError::SessionActive);
            }

            let available = self.recognizer.is_available();
            let mut session = VoiceOrderSession::new();
            session.state = if available {
                VoiceOrderState::Listening
            } else {
                VoiceOrderState::CapabilityCheckFailed
            };
            *slot = Some(session);
            available
        };

        let _guard = IdleGuard {
            view: self.view.as_ref(),
            slot: &self.session,
        };
        self.view.clear_result();

        if !available {
            let err = StorefrontError::CapabilityUnavailable;
            tracing::warn!("🎙️ {}", err);
            self.record_error(&err);
            self.view.show_result(PanelMessage::error(&err));
            return Err(err);
        }

        self.view.set_trigger_enabled(false);
        self.view.set_listening(true);
        tracing::info!("🎙️ Listening for a voice order ({})", self.options.locale);

        let transcript = match self.listen().await {
            Ok(transcript) => transcript,
            Err(e) => {
                tracing::warn!("🎙️ Speech recognition failed: {}", e);
                self.record_error(&e);
                self.view.show_result(PanelMessage::error(&e));
                return Err(e.into());
            }
        };

        self.enter_processing(&transcript);
        self.view.show_result(PanelMessage::processing(&transcript));
        tracing::info!("Submitting voice order transcript: {:?}", transcript);

        match self.api.submit_voice_order(&transcript).await {
            Ok(confirmation) => {
                tracing::info!(
                    "✅ Voice order accepted, cart now has {} item(s)",
                    confirmation.cart_size
                );
                self.view
                    .show_result(PanelMessage::success(confirmation.message.clone()));
                self.view.set_cart_count(confirmation.cart_size);
                Ok(confirmation)
            }
            Err(e) => {
                tracing::warn!("❌ Voice order failed: {}", e);
                self.record_error(&e);
                self.view.show_result(PanelMessage::error(&e));
                Err(e)
            }
        }
    }

    /// Runs `start()` and calls `stop()` once `cancel` resolves. The attempt is
    /// still awaited to the end, so an aborted listen is reported and an
    /// already submitted order still shows its confirmation.
    pub async fn start_until<C>(&self, cancel: C) -> Result<VoiceOrderConfirmation>
    where
        C: Future<Output = ()>,
    {
        let attempt = self.start();
        tokio::pin!(attempt);
        tokio::pin!(cancel);

        tokio::select! {
            biased;
            outcome = &mut attempt => outcome,
            _ = &mut cancel => {
                if !self.stop() {
                    tracing::info!("Cancel requested; waiting for the submitted order to finish");
                }
                attempt.await
            }
        }
    }

    /// Asks the recognizer to stop when listening. An already submitted
    /// transcript is not cancelled.
    pub fn stop(&self) -> bool {
        match self.state() {
            VoiceOrderState::Listening => {
                tracing::info!("🎙️ Stopping speech recognition");
                self.recognizer.stop();
                true
            }
            VoiceOrderState::Processing => {
                tracing::debug!("Stop requested while processing; request continues");
                false
            }
            _ => false,
        }
    }

    async fn listen(&self) -> std::result::Result<String, RecognitionError> {
        let result = self.recognizer.listen(&self.options).await?;
        result
            .best_transcript()
            .map(str::to_string)
            .ok_or(RecognitionError::NoSpeech)
    }

    fn enter_processing(&self, transcript: &str) {
        if let Some(session) = lock_slot(&self.session).as_mut() {
            session.state = VoiceOrderState::Processing;
            session.transcript = Some(transcript.to_string());
        }
    }

    fn record_error(&self, err: &dyn std::fmt::Display) {
        if let Some(session) = lock_slot(&self.session).as_mut() {
            session.last_error = Some(err.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::recognizer::{RecognizerScript, ScriptedRecognizer};
    use crate::domain::model::{CartCount, CartUpdate, PanelKind, ProductId, Severity};
    use crate::domain::ports::UiSink;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct MockApi {
        calls: AtomicUsize,
        reply: Mutex<Option<Result<VoiceOrderConfirmation>>>,
        transcripts: Mutex<Vec<String>>,
    }

    impl MockApi {
        fn replying(reply: Result<VoiceOrderConfirmation>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Mutex::new(Some(reply)),
                transcripts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StorefrontApi for MockApi {
        async fn fetch_cart_count(&self) -> Result<CartCount> {
            Ok(0)
        }

        async fn add_to_cart(&self, _: &ProductId, _: u32) -> Result<CartUpdate> {
            unreachable!("voice orders never add directly")
        }

        async fn update_cart(&self, _: &ProductId, _: u32) -> Result<CartUpdate> {
            unreachable!("voice orders never update directly")
        }

        async fn submit_voice_order(&self, transcript: &str) -> Result<VoiceOrderConfirmation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.transcripts.lock().unwrap().push(transcript.to_string());
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(StorefrontError::malformed("no scripted reply")))
        }
    }

    #[derive(Default)]
    struct RecordingView {
        events: Mutex<Vec<String>>,
    }

    impl RecordingView {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl UiSink for RecordingView {
        fn set_cart_count(&self, count: CartCount) {
            self.push(format!("count:{}", count));
        }

        fn show_toast(&self, message: &str, severity: Severity) {
            self.push(format!("toast:{}:{}", severity.as_str(), message));
        }
    }

    impl VoiceOrderView for RecordingView {
        fn set_trigger_enabled(&self, enabled: bool) {
            self.push(format!("trigger:{}", enabled));
        }

        fn set_listening(&self, visible: bool) {
            self.push(format!("listening:{}", visible));
        }

        fn show_result(&self, message: PanelMessage) {
            let kind = match message.kind {
                PanelKind::Info => "info",
                PanelKind::Success => "success",
                PanelKind::Error => "error",
            };
            self.push(format!("result:{}:{}", kind, message.text));
        }

        fn clear_result(&self) {
            self.push("clear".to_string());
        }
    }

    fn controller(
        recognizer: ScriptedRecognizer,
        api: MockApi,
    ) -> (
        VoiceOrderController<ScriptedRecognizer, MockApi, RecordingView>,
        Arc<MockApi>,
        Arc<RecordingView>,
    ) {
        let api = Arc::new(api);
        let view = Arc::new(RecordingView::default());
        let controller = VoiceOrderController::new(
            Arc::new(recognizer),
            Arc::clone(&api),
            Arc::clone(&view),
            RecognitionOptions::default(),
        );
        (controller, api, view)
    }

    fn confirmation(message: &str, cart_size: CartCount) -> Result<VoiceOrderConfirmation> {
        Ok(VoiceOrderConfirmation {
            message: message.to_string(),
            cart_size,
        })
    }

    #[tokio::test]
    async fn test_successful_order_updates_badge_and_resets() {
        let (controller, api, view) = controller(
            ScriptedRecognizer::with_transcript("two pizzas and a coke"),
            MockApi::replying(confirmation("Order placed", 3)),
        );

        let result = controller.start().await.unwrap();
        assert_eq!(result.cart_size, 3);
        assert_eq!(api.calls(), 1);
        assert_eq!(
            api.transcripts.lock().unwrap().as_slice(),
            ["two pizzas and a coke"]
        );
        assert_eq!(
            view.events(),
            vec![
                "clear",
                "trigger:false",
                "listening:true",
                "result:info:Processing: \"two pizzas and a coke\"",
                "result:success:Order placed",
                "count:3",
                "trigger:true",
                "listening:false",
            ]
        );
        assert_eq!(controller.state(), VoiceOrderState::Idle);
    }

    #[tokio::test]
    async fn test_application_failure_leaves_badge_untouched() {
        let (controller, _api, view) = controller(
            ScriptedRecognizer::with_transcript("one coke"),
            MockApi::replying(Err(StorefrontError::Application {
                message: "item out of stock".to_string(),
            })),
        );

        let err = controller.start().await.unwrap_err();
        assert!(matches!(err, StorefrontError::Application { .. }));

        let events = view.events();
        assert!(events.contains(&"result:error:Error: item out of stock".to_string()));
        assert!(!events.iter().any(|e| e.starts_with("count:")));
        assert_eq!(events[events.len() - 2..], ["trigger:true", "listening:false"]);
    }

    #[tokio::test]
    async fn test_unavailable_capability_makes_no_request() {
        let (controller, api, view) = controller(
            ScriptedRecognizer::unavailable(),
            MockApi::replying(confirmation("never", 1)),
        );

        let err = controller.start().await.unwrap_err();
        assert!(matches!(err, StorefrontError::CapabilityUnavailable));
        assert_eq!(api.calls(), 0);
        assert_eq!(controller.state(), VoiceOrderState::Idle);

        let events = view.events();
        assert!(!events.contains(&"trigger:false".to_string()));
        assert!(events.contains(&"trigger:true".to_string()));
        assert!(events.contains(&"listening:false".to_string()));
        assert!(events
            .iter()
            .any(|e| e.starts_with("result:error:") && e.contains("not supported")));
    }

    #[tokio::test]
    async fn test_recognition_error_skips_network() {
        let (controller, api, view) = controller(
            ScriptedRecognizer::new(vec![RecognizerScript::Error(
                RecognitionError::PermissionDenied,
            )]),
            MockApi::replying(confirmation("never", 1)),
        );

        let err = controller.start().await.unwrap_err();
        assert!(matches!(
            err,
            StorefrontError::Recognition(RecognitionError::PermissionDenied)
        ));
        assert_eq!(api.calls(), 0);
        assert!(view
            .events()
            .contains(&"result:error:Error: not-allowed".to_string()));
        assert_eq!(controller.state(), VoiceOrderState::Idle);
    }

    #[tokio::test]
    async fn test_empty_result_counts_as_no_speech() {
        let (controller, api, _view) = controller(
            ScriptedRecognizer::with_transcript("   "),
            MockApi::replying(confirmation("never", 1)),
        );

        let err = controller.start().await.unwrap_err();
        assert!(matches!(
            err,
            StorefrontError::Recognition(RecognitionError::NoSpeech)
        ));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_raw_transcript_is_submitted_unchanged() {
        let (controller, api, view) = controller(
            ScriptedRecognizer::with_transcript(" add 2 kg rice "),
            MockApi::replying(confirmation("Added 2kg rice to cart", 1)),
        );

        controller.start().await.unwrap();
        assert_eq!(
            api.transcripts.lock().unwrap().as_slice(),
            [" add 2 kg rice "]
        );
        assert!(view
            .events()
            .contains(&"result:info:Processing: \" add 2 kg rice \"".to_string()));
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_noop() {
        let (controller, _api, view) = controller(
            ScriptedRecognizer::with_transcript("unused"),
            MockApi::replying(confirmation("never", 1)),
        );

        assert!(!controller.stop());
        assert_eq!(controller.state(), VoiceOrderState::Idle);
        assert!(view.events().is_empty());
    }

    #[tokio::test]
    async fn test_stop_while_listening_aborts_and_second_start_is_rejected() {
        let (controller, api, view) = controller(
            ScriptedRecognizer::new(vec![RecognizerScript::WaitForStop]),
            MockApi::replying(confirmation("never", 1)),
        );
        let controller = Arc::new(controller);

        let running = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.start().await })
        };

        while controller.state() != VoiceOrderState::Listening {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let overlapping = controller.start().await;
        assert!(matches!(overlapping, Err(StorefrontError::SessionActive)));

        assert!(controller.stop());
        let outcome = running.await.unwrap();
        assert!(matches!(
            outcome,
            Err(StorefrontError::Recognition(RecognitionError::Aborted))
        ));
        assert_eq!(api.calls(), 0);
        assert_eq!(controller.state(), VoiceOrderState::Idle);
        assert!(view
            .events()
            .contains(&"result:error:Error: aborted".to_string()));
    }

    #[tokio::test]
    async fn test_dropping_start_future_restores_idle_ui() {
        let (controller, _api, view) = controller(
            ScriptedRecognizer::new(vec![RecognizerScript::WaitForStop]),
            MockApi::replying(confirmation("never", 1)),
        );

        let attempt = tokio::time::timeout(Duration::from_millis(20), controller.start()).await;
        assert!(attempt.is_err());

        assert_eq!(controller.state(), VoiceOrderState::Idle);
        let events = view.events();
        assert_eq!(events[events.len() - 2..], ["trigger:true", "listening:false"]);
    }

    #[tokio::test]
    async fn test_controller_is_reusable_after_failure() {
        let (controller, api, _view) = controller(
            ScriptedRecognizer::new(vec![
                RecognizerScript::Error(RecognitionError::NoSpeech),
                RecognizerScript::Transcript("add 2 kg rice".to_string()),
            ]),
            MockApi::replying(confirmation("Added 2kg rice to cart", 1)),
        );

        assert!(controller.start().await.is_err());
        let confirmation = controller.start().await.unwrap();
        assert_eq!(confirmation.message, "Added 2kg rice to cart");
        assert_eq!(api.calls(), 1);
    }
}
