pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::Cli;
pub use crate::config::StorefrontConfig;

pub use crate::adapters::{
    console::ConsoleUi,
    http::HttpStorefront,
    recognizer::{RecognizerScript, ScriptedRecognizer, TerminalRecognizer},
};
pub use crate::core::{
    cart::{CartBadgeService, CartMutationService},
    storefront::Storefront,
    toast::ToastNotifier,
    voice_order::VoiceOrderController,
};
pub use crate::utils::error::{Result, StorefrontError};
