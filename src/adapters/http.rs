use crate::config::toml_config::{EndpointConfig, StorefrontConfig};
use crate::domain::model::{
    ApiReply, CartCount, CartCountResponse, CartUpdate, ProductId, VoiceOrderConfirmation,
    VoiceOrderRequest,
};
use crate::domain::ports::StorefrontApi;
use crate::utils::error::{Result, StorefrontError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// `StorefrontApi` backed by the storefront's HTTP endpoints.
#[derive(Debug, Clone)]
pub struct HttpStorefront {
    client: Client,
    base_url: Url,
    endpoints: EndpointConfig,
}

impl HttpStorefront {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&StorefrontConfig::with_base_url(base_url))
    }

    pub fn from_config(config: &StorefrontConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.server.base_url).map_err(|e| {
            StorefrontError::InvalidConfigValueError {
                field: "server.base_url".to_string(),
                value: config.server.base_url.clone(),
                reason: e.to_string(),
            }
        })?;

        // 端點相對於 base_url 的路徑，例如 `https://shop/api` + `/voice_order`
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()
            .map_err(|e| StorefrontError::ConfigError {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            endpoints: config.endpoints.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| StorefrontError::InvalidConfigValueError {
                field: "endpoints".to_string(),
                value: path.to_string(),
                reason: e.to_string(),
            })
    }

    /// 只看 JSON 內容判斷成功與否，HTTP 狀態碼僅記錄
    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!("{} responded with HTTP {}", url.path(), status);
        }
        tracing::debug!("{} -> {}", url.path(), body);

        serde_json::from_str(&body).map_err(|e| {
            StorefrontError::malformed(format!("{} (HTTP {} from {})", e, status, url.path()))
        })
    }

    async fn post_cart_form(
        &self,
        path: &str,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<CartUpdate> {
        let url = self.endpoint(path)?;
        let quantity = quantity.to_string();
        tracing::debug!("POST {} product_id={} quantity={}", url, product_id, quantity);

        let response = self
            .client
            .post(url)
            .form(&[("product_id", product_id.as_str()), ("quantity", quantity.as_str())])
            .send()
            .await?;

        let reply: ApiReply = Self::read_json(response).await?;
        if !reply.success {
            return Err(StorefrontError::Application {
                message: reply.failure_message(),
            });
        }

        Ok(CartUpdate {
            message: reply.message,
            cart_size: reply.cart_size,
        })
    }
}

#[async_trait]
impl StorefrontApi for HttpStorefront {
    async fn fetch_cart_count(&self) -> Result<CartCount> {
        let url = self.endpoint(&self.endpoints.cart_count)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let payload: CartCountResponse = Self::read_json(response).await?;
        Ok(payload.count)
    }

    async fn add_to_cart(&self, product_id: &ProductId, quantity: u32) -> Result<CartUpdate> {
        self.post_cart_form(&self.endpoints.add_to_cart, product_id, quantity)
            .await
    }

    async fn update_cart(&self, product_id: &ProductId, quantity: u32) -> Result<CartUpdate> {
        self.post_cart_form(&self.endpoints.update_cart, product_id, quantity)
            .await
    }

    async fn submit_voice_order(&self, transcript: &str) -> Result<VoiceOrderConfirmation> {
        let url = self.endpoint(&self.endpoints.voice_order)?;
        tracing::debug!("POST {} transcript={:?}", url, transcript);

        let request = VoiceOrderRequest {
            transcript: transcript.to_string(),
        };
        let response = self.client.post(url).json(&request).send().await?;

        let reply: ApiReply = Self::read_json(response).await?;
        if !reply.success {
            return Err(StorefrontError::Application {
                message: reply.failure_message(),
            });
        }

        match (reply.message, reply.cart_size) {
            (Some(message), Some(cart_size)) => Ok(VoiceOrderConfirmation { message, cart_size }),
            _ => Err(StorefrontError::malformed(
                "voice order reply is missing `message` or `cart_size`",
            )),
        }
    }
}
