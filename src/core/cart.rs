use crate::domain::model::{CartCount, CartUpdate, ProductId, Severity};
use crate::domain::ports::{StorefrontApi, UiSink};
use crate::utils::error::{Result, StorefrontError};
use std::sync::Arc;

/// Keeps the cart-count badge in sync with the backend.
pub struct CartBadgeService<A: StorefrontApi, U: UiSink> {
    api: Arc<A>,
    ui: Arc<U>,
}

impl<A: StorefrontApi, U: UiSink> Clone for CartBadgeService<A, U> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            ui: Arc::clone(&self.ui),
        }
    }
}

impl<A: StorefrontApi, U: UiSink> CartBadgeService<A, U> {
    pub fn new(api: Arc<A>, ui: Arc<U>) -> Self {
        Self { api, ui }
    }

    pub async fn refresh(&self) -> Result<CartCount> {
        match self.api.fetch_cart_count().await {
            Ok(count) => {
                tracing::debug!("Cart count refreshed: {}", count);
                self.ui.set_cart_count(count);
                Ok(count)
            }
            Err(e) => {
                // badge 保留舊值
                tracing::warn!("Failed to refresh cart count: {}", e);
                Err(e)
            }
        }
    }

    pub fn set(&self, count: CartCount) {
        self.ui.set_cart_count(count);
    }
}

/// Add / update / remove line items and report the outcome as toasts.
pub struct CartMutationService<A: StorefrontApi, U: UiSink> {
    api: Arc<A>,
    ui: Arc<U>,
    badge: CartBadgeService<A, U>,
}

impl<A: StorefrontApi, U: UiSink> CartMutationService<A, U> {
    pub fn new(api: Arc<A>, ui: Arc<U>) -> Self {
        let badge = CartBadgeService::new(Arc::clone(&api), Arc::clone(&ui));
        Self { api, ui, badge }
    }

    pub async fn add_to_cart(&self, product_id: &ProductId, quantity: u32) -> Result<CartUpdate> {
        if quantity == 0 {
            let err = StorefrontError::Validation {
                message: "quantity must be at least 1".to_string(),
            };
            self.ui.show_toast(&format!("Error: {}", err), Severity::Error);
            return Err(err);
        }

        tracing::info!("🛒 Adding {} x {} to cart", quantity, product_id);
        match self.api.add_to_cart(product_id, quantity).await {
            Ok(update) => {
                self.refresh_badge().await;
                self.ui.show_toast("Product added to cart!", Severity::Success);
                Ok(update)
            }
            Err(e) => {
                tracing::warn!("Add to cart failed for {}: {}", product_id, e);
                self.ui.show_toast(&format!("Error: {}", e), Severity::Error);
                Err(e)
            }
        }
    }

    pub async fn update_item(&self, product_id: &ProductId, quantity: u32) -> Result<CartUpdate> {
        tracing::info!("🛒 Updating {} to quantity {}", product_id, quantity);
        match self.api.update_cart(product_id, quantity).await {
            Ok(update) => {
                self.refresh_badge().await;
                let message = if quantity == 0 {
                    "Item removed from cart"
                } else {
                    "Cart updated"
                };
                self.ui.show_toast(message, Severity::Success);
                Ok(update)
            }
            Err(e @ StorefrontError::Application { .. }) => {
                tracing::warn!("Cart update rejected for {}: {}", product_id, e);
                self.ui
                    .show_toast(&format!("Error updating cart: {}", e), Severity::Error);
                Err(e)
            }
            Err(e) => {
                tracing::warn!("Cart update failed for {}: {}", product_id, e);
                self.ui.show_toast(&format!("Error: {}", e), Severity::Error);
                Err(e)
            }
        }
    }

    pub async fn remove_item(&self, product_id: &ProductId) -> Result<CartUpdate> {
        self.update_item(product_id, 0).await
    }

    pub fn badge(&self) -> &CartBadgeService<A, U> {
        &self.badge
    }

    async fn refresh_badge(&self) {
        // 失敗已在 refresh 中記錄，不影響變更結果
        let _ = self.badge.refresh().await;
    }
}
