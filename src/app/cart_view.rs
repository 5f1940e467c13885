use crate::core::pricing::{CartTotals, PricingPolicy};
use crate::domain::model::{Cart, CartItem, ProductId};
use crate::domain::ports::{AccountSession, CartService, Notifier};
use crate::utils::error::Result;

pub const QUANTITY_UPDATED: &str = "Product quantity updated.";
pub const PRODUCT_DELETED: &str = "Product deleted.";

/// Reads an integer the way a browser number input is read: leading
/// whitespace and sign, then digits up to the first non-digit. Digit runs
/// beyond the `i64` range saturate.
fn parse_quantity_input(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * value)
}

/// Cart screen: owns the last fetched cart and its totals.
pub struct CartView<C: CartService, N: Notifier> {
    cart_service: C,
    notifier: N,
    policy: PricingPolicy,
    cart: Option<Cart>,
    totals: CartTotals,
    is_logged_in: bool,
}

impl<C: CartService, N: Notifier> CartView<C, N> {
    pub fn new(cart_service: C, notifier: N, session: &dyn AccountSession) -> Self {
        Self {
            cart_service,
            notifier,
            policy: PricingPolicy::default(),
            cart: None,
            totals: CartTotals::default(),
            is_logged_in: session.is_logged_in(),
        }
    }

    pub fn with_policy(mut self, policy: PricingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    pub fn items(&self) -> &[CartItem] {
        self.cart.as_ref().map(|c| c.items.as_slice()).unwrap_or(&[])
    }

    pub fn totals(&self) -> CartTotals {
        self.totals
    }

    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    /// Replaces the cart wholesale and recomputes every total.
    pub async fn refresh(&mut self) -> Result<()> {
        let cart = self.cart_service.get_cart().await.inspect_err(|e| {
            tracing::warn!("Failed to fetch cart: {}", e);
        })?;

        self.totals = self
            .policy
            .calculate(&cart.items, cart.additional_discount_percentage)
            .inspect_err(|e| tracing::warn!(cart = %cart.id, "Failed to price cart: {}", e))?;
        tracing::debug!(
            cart = %cart.id,
            items = cart.items.len(),
            total = %self.totals.total,
            "Cart refreshed"
        );
        self.cart = Some(cart);
        Ok(())
    }

    /// Input that does not start with a number is ignored; anything below one
    /// is raised to one.
    pub async fn update_quantity(&mut self, product_id: &ProductId, raw_input: &str) -> Result<()> {
        let Some(parsed) = parse_quantity_input(raw_input) else {
            tracing::debug!(input = raw_input, "Ignoring non-numeric quantity");
            return Ok(());
        };
        let quantity = parsed.clamp(1, i64::from(u32::MAX)) as u32;

        match self.cart_service.replace_quantity(product_id, quantity).await {
            Ok(()) => {
                self.notifier.success(QUANTITY_UPDATED);
                self.refresh().await
            }
            Err(e) => {
                tracing::warn!(product = %product_id, "Quantity update failed: {}", e);
                self.notifier.error(&e.user_friendly_message());
                Err(e)
            }
        }
    }

    /// Failures are logged only; the cart stays as it was.
    pub async fn delete(&mut self, product_id: &ProductId) -> Result<()> {
        self.cart_service
            .delete_item(product_id)
            .await
            .inspect_err(|e| tracing::warn!(product = %product_id, "Delete failed: {}", e))?;

        self.notifier.success(PRODUCT_DELETED);
        self.refresh().await
    }
}
