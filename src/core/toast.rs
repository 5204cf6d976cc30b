use crate::domain::model::{Severity, Toast, ToastId};
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const DEFAULT_AUTO_HIDE_MS: u64 = 5000;
pub const DEFAULT_CAPACITY: usize = 5;

/// Container of visible toasts, oldest first.
pub struct ToastNotifier {
    next_id: AtomicU64,
    toasts: Mutex<VecDeque<Toast>>,
    auto_hide: Duration,
    capacity: usize,
}

impl ToastNotifier {
    pub fn new(auto_hide_ms: u64, capacity: usize) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            toasts: Mutex::new(VecDeque::new()),
            auto_hide: Duration::milliseconds(auto_hide_ms as i64),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Toast>> {
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn show(&self, message: &str, severity: Severity) -> ToastId {
        self.show_at(message, severity, Utc::now())
    }

    pub fn show_at(&self, message: &str, severity: Severity, now: DateTime<Utc>) -> ToastId {
        let id = ToastId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut toasts = self.lock();

        while toasts.len() >= self.capacity {
            if let Some(evicted) = toasts.pop_front() {
                tracing::debug!("Evicting toast {:?} to make room", evicted.id);
            }
        }

        toasts.push_back(Toast {
            id,
            message: message.to_string(),
            severity,
            created_at: now,
        });
        id
    }

    pub fn dismiss(&self, id: ToastId) -> bool {
        let mut toasts = self.lock();
        let before = toasts.len();
        toasts.retain(|toast| toast.id != id);
        toasts.len() != before
    }

    /// 使用者任何互動都會關閉所有提示
    pub fn on_user_interaction(&self) -> usize {
        let mut toasts = self.lock();
        let dismissed = toasts.len();
        toasts.clear();
        dismissed
    }

    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let mut toasts = self.lock();
        let before = toasts.len();
        toasts.retain(|toast| now - toast.created_at < self.auto_hide);
        before - toasts.len()
    }

    pub fn active(&self) -> Vec<Toast> {
        self.lock().iter().cloned().collect()
    }
}

impl Default for ToastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_HIDE_MS, DEFAULT_CAPACITY)
    }
}
