use crate::domain::model::{RecognitionError, RecognitionOptions, RecognitionResult};
use crate::domain::ports::SpeechRecognizer;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;

/// Stop signal scoped to the listen call that armed it.
#[derive(Default)]
struct StopSignal {
    armed: Mutex<Option<Arc<Notify>>>,
}

impl StopSignal {
    fn arm(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.armed.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&notify));
        notify
    }

    fn disarm(&self, notify: &Arc<Notify>) {
        let mut armed = self.armed.lock().unwrap_or_else(PoisonError::into_inner);
        if armed.as_ref().is_some_and(|current| Arc::ptr_eq(current, notify)) {
            *armed = None;
        }
    }

    /// 沒有進行中的聆聽時不做任何事
    fn fire(&self) {
        if let Some(notify) = self.armed.lock().unwrap_or_else(PoisonError::into_inner).take() {
            notify.notify_one();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecognizerScript {
    Transcript(String),
    Error(RecognitionError),
    /// Stays silent until `stop()` is called.
    WaitForStop,
}

/// Replays a fixed sequence of recognition outcomes.
///
/// Used by the CLI for `--transcript` and by tests. Once the script is
/// exhausted every further `listen` reports `no-speech`.
pub struct ScriptedRecognizer {
    available: bool,
    script: Mutex<VecDeque<RecognizerScript>>,
    stopped: StopSignal,
    last_options: Mutex<Option<RecognitionOptions>>,
}

impl ScriptedRecognizer {
    pub fn new(script: Vec<RecognizerScript>) -> Self {
        Self {
            available: true,
            script: Mutex::new(script.into()),
            stopped: StopSignal::default(),
            last_options: Mutex::new(None),
        }
    }

    pub fn with_transcript(transcript: impl Into<String>) -> Self {
        Self::new(vec![RecognizerScript::Transcript(transcript.into())])
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn last_options(&self) -> Option<RecognitionOptions> {
        self.last_options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn listen(
        &self,
        options: &RecognitionOptions,
    ) -> Result<RecognitionResult, RecognitionError> {
        *self
            .last_options
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(options.clone());

        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match next {
            Some(RecognizerScript::Transcript(text)) => Ok(RecognitionResult::single(text)),
            Some(RecognizerScript::Error(e)) => Err(e),
            Some(RecognizerScript::WaitForStop) => {
                let stop = self.stopped.arm();
                stop.notified().await;
                self.stopped.disarm(&stop);
                Err(RecognitionError::Aborted)
            }
            None => Err(RecognitionError::NoSpeech),
        }
    }

    fn stop(&self) {
        self.stopped.fire();
    }
}

/// Treats one line typed on stdin as the spoken utterance.
pub struct TerminalRecognizer {
    prompt: String,
    stopped: StopSignal,
}

impl TerminalRecognizer {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            stopped: StopSignal::default(),
        }
    }
}

impl Default for TerminalRecognizer {
    fn default() -> Self {
        Self::new("🎙️  Say your order (type it and press Enter):")
    }
}

#[async_trait]
impl SpeechRecognizer for TerminalRecognizer {
    fn is_available(&self) -> bool {
        true
    }

    async fn listen(
        &self,
        options: &RecognitionOptions,
    ) -> Result<RecognitionResult, RecognitionError> {
        tracing::debug!("Terminal recognizer listening ({})", options.locale);
        println!("{}", self.prompt);

        let stop = self.stopped.arm();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let outcome = tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(text)) if !text.trim().is_empty() => Ok(RecognitionResult::single(text)),
                Ok(_) => Err(RecognitionError::NoSpeech),
                Err(e) => Err(RecognitionError::Other(format!("audio-capture: {}", e))),
            },
            _ = stop.notified() => Err(RecognitionError::Aborted),
        };
        self.stopped.disarm(&stop);
        outcome
    }

    fn stop(&self) {
        self.stopped.fire();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_recognizer_replays_in_order() {
        let recognizer = ScriptedRecognizer::new(vec![
            RecognizerScript::Transcript("add 2 kg rice".to_string()),
            RecognizerScript::Error(RecognitionError::Network),
        ]);
        let options = RecognitionOptions::for_locale("en-IN");

        let first = tokio_test::block_on(recognizer.listen(&options)).unwrap();
        assert_eq!(first.best_transcript(), Some("add 2 kg rice"));
        assert_eq!(
            tokio_test::block_on(recognizer.listen(&options)),
            Err(RecognitionError::Network)
        );
        assert_eq!(
            tokio_test::block_on(recognizer.listen(&options)),
            Err(RecognitionError::NoSpeech)
        );

        let seen = recognizer.last_options().unwrap();
        assert_eq!(seen.locale, "en-IN");
        assert!(!seen.interim_results);
        assert_eq!(seen.max_alternatives, 1);
    }

    #[tokio::test]
    async fn test_stop_aborts_pending_listen() {
        let recognizer = ScriptedRecognizer::new(vec![RecognizerScript::WaitForStop]);
        let options = RecognitionOptions::default();

        let (outcome, _) = tokio::join!(recognizer.listen(&options), async {
            tokio::task::yield_now().await;
            recognizer.stop();
        });
        assert_eq!(outcome, Err(RecognitionError::Aborted));
    }

    #[tokio::test]
    async fn test_stop_without_pending_listen_does_not_leak_into_next_listen() {
        let recognizer = ScriptedRecognizer::new(vec![RecognizerScript::WaitForStop]);
        recognizer.stop();

        let pending = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            recognizer.listen(&RecognitionOptions::default()),
        )
        .await;
        assert!(pending.is_err(), "listen should still be waiting for stop");
    }

    #[test]
    fn test_unavailable_recognizer() {
        assert!(!ScriptedRecognizer::unavailable().is_available());
        assert!(ScriptedRecognizer::with_transcript("x").is_available());
    }
}
