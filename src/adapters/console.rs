use crate::core::toast::ToastNotifier;
use crate::domain::model::{CartCount, PanelKind, PanelMessage, Severity};
use crate::domain::ports::{UiSink, VoiceOrderView};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Terminal rendering of the storefront page: badge, toasts and voice panel.
///
/// Keeps the last rendered state so callers (and tests) can inspect it.
pub struct ConsoleUi {
    cart_count: Mutex<Option<CartCount>>,
    result: Mutex<Option<PanelMessage>>,
    trigger_enabled: AtomicBool,
    listening: AtomicBool,
    toasts: ToastNotifier,
    echo: bool,
}

impl ConsoleUi {
    pub fn new(toasts: ToastNotifier) -> Self {
        Self {
            cart_count: Mutex::new(None),
            result: Mutex::new(None),
            trigger_enabled: AtomicBool::new(true),
            listening: AtomicBool::new(false),
            toasts,
            echo: true,
        }
    }

    /// Same state tracking without printing anything.
    pub fn quiet() -> Self {
        Self {
            echo: false,
            ..Self::new(ToastNotifier::default())
        }
    }

    pub fn cart_count(&self) -> Option<CartCount> {
        *self
            .cart_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn result(&self) -> Option<PanelMessage> {
        self.result
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn trigger_enabled(&self) -> bool {
        self.trigger_enabled.load(Ordering::SeqCst)
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    pub fn toasts(&self) -> &ToastNotifier {
        &self.toasts
    }
}

impl UiSink for ConsoleUi {
    fn set_cart_count(&self, count: CartCount) {
        *self
            .cart_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(count);
        if self.echo {
            println!("🛒 Cart: {}", count);
        }
    }

    fn show_toast(&self, message: &str, severity: Severity) {
        self.toasts.show(message, severity);
        if self.echo {
            let icon = match severity {
                Severity::Success => "✅",
                Severity::Info => "ℹ️",
                Severity::Error => "❌",
            };
            println!("{} {}", icon, message);
        }
    }
}

impl VoiceOrderView for ConsoleUi {
    fn set_trigger_enabled(&self, enabled: bool) {
        self.trigger_enabled.store(enabled, Ordering::SeqCst);
    }

    fn set_listening(&self, visible: bool) {
        let was_listening = self.listening.swap(visible, Ordering::SeqCst);
        if self.echo && visible && !was_listening {
            println!("🎙️  Listening...");
        }
    }

    fn show_result(&self, message: PanelMessage) {
        if self.echo {
            match message.kind {
                PanelKind::Info => println!("⏳ {}", message.text),
                PanelKind::Success => println!("✅ {}", message.text),
                PanelKind::Error => eprintln!("❌ {}", message.text),
            }
        }
        *self.result.lock().unwrap_or_else(PoisonError::into_inner) = Some(message);
    }

    fn clear_result(&self) {
        *self.result.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
