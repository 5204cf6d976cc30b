use crate::core::toast::{DEFAULT_AUTO_HIDE_MS, DEFAULT_CAPACITY};
use crate::domain::model::RecognitionOptions;
use crate::utils::error::{Result, StorefrontError};
use crate::utils::validation::{
    validate_endpoint_path, validate_non_empty_string, validate_positive_number, validate_range,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub toast: ToastConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub cart_count: String,
    pub add_to_cart: String,
    pub update_cart: String,
    pub voice_order: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            cart_count: "/get_cart_count".to_string(),
            add_to_cart: "/add_to_cart".to_string(),
            update_cart: "/update_cart".to_string(),
            voice_order: "/voice_order".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub locale: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            locale: "en-IN".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    pub auto_hide_ms: u64,
    pub capacity: usize,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            auto_hide_ms: DEFAULT_AUTO_HIDE_MS,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl StorefrontConfig {
    /// 只指定伺服器位址，其餘使用預設值
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            server: ServerConfig {
                base_url: base_url.to_string(),
                timeout_seconds: None,
            },
            endpoints: EndpointConfig::default(),
            voice: VoiceConfig::default(),
            toast: ToastConfig::default(),
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StorefrontError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| StorefrontError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STOREFRONT_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("environment variable pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.server
            .timeout_seconds
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn recognition_options(&self) -> RecognitionOptions {
        RecognitionOptions::for_locale(self.voice.locale.clone())
    }
}

impl Validate for StorefrontConfig {
    fn validate(&self) -> Result<()> {
        validate_url("server.base_url", &self.server.base_url)?;
        validate_range("server.timeout_seconds", self.timeout_seconds(), 1, 300)?;

        validate_endpoint_path("endpoints.cart_count", &self.endpoints.cart_count)?;
        validate_endpoint_path("endpoints.add_to_cart", &self.endpoints.add_to_cart)?;
        validate_endpoint_path("endpoints.update_cart", &self.endpoints.update_cart)?;
        validate_endpoint_path("endpoints.voice_order", &self.endpoints.voice_order)?;

        validate_non_empty_string("voice.locale", &self.voice.locale)?;
        validate_positive_number("toast.capacity", self.toast.capacity, 1)?;

        Ok(())
    }
}
