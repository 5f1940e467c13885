use crate::domain::model::CartItem;
use crate::utils::error::{Result, StorefrontError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Knobs of the eco discount. Defaults: more than half of the units must be
/// rated A or B, and the reward is 5% off the already discounted total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub eco_threshold: Decimal,
    pub eco_discount_percentage: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            eco_threshold: Decimal::new(5, 1),
            eco_discount_percentage: Decimal::new(5, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub eco_discount: Decimal,
    pub total: Decimal,
}

/// Units in the cart that are eco-friendly, and all units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EcoShare {
    pub eco_units: u64,
    pub total_units: u64,
}

impl EcoShare {
    pub fn of(items: &[CartItem]) -> Self {
        items.iter().fold(Self::default(), |mut share, item| {
            let units = u64::from(item.quantity);
            share.total_units += units;
            if item.is_eco_friendly() {
                share.eco_units += units;
            }
            share
        })
    }

    /// Strictly greater: a cart that is exactly at the threshold does not qualify.
    pub fn exceeds(&self, threshold: Decimal) -> bool {
        if self.total_units == 0 {
            return false;
        }
        Decimal::from(self.eco_units) / Decimal::from(self.total_units) > threshold
    }
}

fn out_of_range(what: &str) -> StorefrontError {
    StorefrontError::payload("cart", format!("{} is out of range", what))
}

pub fn calculate_subtotal(items: &[CartItem]) -> Result<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |sum, item| {
        item.line_total()
            .and_then(|line| sum.checked_add(line))
            .ok_or_else(|| out_of_range("subtotal"))
    })
}

fn percent_of(amount: Decimal, percentage: Decimal) -> Option<Decimal> {
    amount.checked_mul(percentage)?.checked_div(Decimal::ONE_HUNDRED)
}

impl PricingPolicy {
    /// Runs the discounts in order over one running total: the percentage
    /// discount first, then the eco discount on what is left. The two compound.
    pub fn calculate(&self, items: &[CartItem], discount_percentage: Decimal) -> Result<CartTotals> {
        let subtotal = calculate_subtotal(items)?;
        let mut total = subtotal;

        let discount =
            percent_of(total, discount_percentage).ok_or_else(|| out_of_range("discount"))?;
        total = total
            .checked_sub(discount)
            .ok_or_else(|| out_of_range("total"))?;

        let share = EcoShare::of(items);
        let eco_discount = if share.exceeds(self.eco_threshold) {
            percent_of(total, self.eco_discount_percentage)
                .ok_or_else(|| out_of_range("eco discount"))?
        } else {
            Decimal::ZERO
        };
        total = total
            .checked_sub(eco_discount)
            .ok_or_else(|| out_of_range("total"))?;

        tracing::debug!(
            %subtotal,
            %discount,
            %eco_discount,
            %total,
            eco_units = share.eco_units,
            total_units = share.total_units,
            "cart totals calculated"
        );

        Ok(CartTotals {
            subtotal,
            discount,
            eco_discount,
            total,
        })
    }
}

pub fn calculate_totals(items: &[CartItem], discount_percentage: Decimal) -> Result<CartTotals> {
    PricingPolicy::default().calculate(items, discount_percentage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Co2Rating, ProductId, ProductRef};

    fn line(quantity: u32, price: i64, co2: Option<Co2Rating>) -> CartItem {
        CartItem {
            quantity,
            discounted_price: None,
            discount_percentage: None,
            product: ProductRef {
                id: ProductId::new(format!("p-{}-{}", quantity, price)),
                name: "Pliers".to_string(),
                price: Some(Decimal::from(price)),
                co2_rating: co2,
            },
        }
    }

    fn dec(num: i64, scale: u32) -> Decimal {
        Decimal::new(num, scale)
    }

    #[test]
    fn test_worked_example() {
        let items = vec![
            line(2, 10, Some(Co2Rating::A)),
            line(1, 5, Some(Co2Rating::D)),
        ];

        let totals = calculate_totals(&items, Decimal::from(10)).unwrap();

        assert_eq!(totals.subtotal, Decimal::from(25));
        assert_eq!(totals.discount, dec(25, 1));
        assert_eq!(totals.eco_discount, dec(1125, 3));
        assert_eq!(totals.total, dec(21375, 3));
    }

    #[test]
    fn test_empty_cart_is_all_zero() {
        let totals = calculate_totals(&[], Decimal::from(15)).unwrap();
        assert_eq!(totals, CartTotals::default());
    }

    #[test]
    fn test_subtotal_uses_discounted_price_where_present() {
        let mut discounted = line(3, 20, None);
        discounted.discount_percentage = Some(Decimal::from(25));
        discounted.discounted_price = Some(Decimal::from(15));
        let items = vec![discounted, line(2, 4, None)];

        assert_eq!(calculate_subtotal(&items).unwrap(), Decimal::from(53));
    }

    #[test]
    fn test_percentage_discount_is_exact() {
        let items = vec![line(3, 7, None)];
        let totals = calculate_totals(&items, Decimal::from(33)).unwrap();

        assert_eq!(totals.discount, dec(693, 2));
        assert_eq!(totals.total, totals.subtotal - totals.discount);
        assert_eq!(totals.eco_discount, Decimal::ZERO);
    }

    #[test]
    fn test_eco_discount_not_applied_at_exactly_half() {
        let items = vec![
            line(1, 10, Some(Co2Rating::B)),
            line(1, 10, Some(Co2Rating::C)),
        ];
        let totals = calculate_totals(&items, Decimal::ZERO).unwrap();

        assert_eq!(totals.eco_discount, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::from(20));
    }

    #[test]
    fn test_eco_discount_compounds_on_discounted_total() {
        let items = vec![line(4, 50, Some(Co2Rating::A))];
        let totals = calculate_totals(&items, Decimal::from(20)).unwrap();

        // 200 - 40 = 160, then 5% of 160 rather than of 200
        assert_eq!(totals.discount, Decimal::from(40));
        assert_eq!(totals.eco_discount, Decimal::from(8));
        assert_eq!(totals.total, Decimal::from(152));
    }

    #[test]
    fn test_unrated_units_count_towards_total_only() {
        let items = vec![
            line(2, 1, Some(Co2Rating::A)),
            line(2, 1, None),
        ];
        let share = EcoShare::of(&items);

        assert_eq!(share.eco_units, 2);
        assert_eq!(share.total_units, 4);
        assert!(!share.exceeds(PricingPolicy::default().eco_threshold));
    }

    #[test]
    fn test_zero_quantity_lines_are_ignored() {
        let items = vec![line(0, 99, Some(Co2Rating::A)), line(1, 10, Some(Co2Rating::E))];
        let totals = calculate_totals(&items, Decimal::ZERO).unwrap();

        assert_eq!(totals.subtotal, Decimal::from(10));
        assert_eq!(totals.eco_discount, Decimal::ZERO);
    }

    #[test]
    fn test_custom_policy() {
        let policy = PricingPolicy {
            eco_threshold: Decimal::ZERO,
            eco_discount_percentage: Decimal::from(10),
        };
        let items = vec![line(1, 100, Some(Co2Rating::B)), line(9, 0, None)];
        let totals = policy.calculate(&items, Decimal::ZERO).unwrap();

        assert_eq!(totals.eco_discount, Decimal::from(10));
        assert_eq!(totals.total, Decimal::from(90));
    }

    #[test]
    fn test_out_of_range_prices_are_payload_errors() {
        let mut huge = line(2, 1, Some(Co2Rating::A));
        huge.product.price = Some(Decimal::MAX);

        let err = calculate_totals(&[huge], Decimal::ZERO).unwrap_err();
        assert!(matches!(err, StorefrontError::PayloadError { .. }));

        let mut big = line(1, 1, None);
        big.product.price = Some(Decimal::MAX);
        let err = calculate_subtotal(&[big.clone(), big]).unwrap_err();
        assert!(err.to_string().contains("subtotal"));
    }
}
