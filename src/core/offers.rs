use crate::domain::model::{Page, Product};
use rust_decimal::Decimal;

pub fn default_location_offer_percentage() -> Decimal {
    Decimal::from(15)
}

pub fn discounted_price(price: Decimal, percentage: Decimal) -> Decimal {
    price - price * percentage / Decimal::ONE_HUNDRED
}

/// Fills `discount_price` on every location offer in a listing page.
pub fn apply_location_offers(page: &mut Page<Product>, percentage: Decimal) {
    for product in page.data.iter_mut().filter(|p| p.is_location_offer) {
        product.discount_price = Some(discounted_price(product.price, percentage));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ProductId;

    fn product(id: &str, price: Decimal, is_location_offer: bool) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("Product {}", id),
            description: None,
            price,
            co2_rating: None,
            is_location_offer,
            is_rental: false,
            in_stock: true,
            brand: None,
            category: None,
            discount_price: None,
        }
    }

    #[test]
    fn test_discounted_price() {
        assert_eq!(
            discounted_price(Decimal::new(2000, 2), default_location_offer_percentage()),
            Decimal::from(17)
        );
        assert_eq!(discounted_price(Decimal::from(9), Decimal::ZERO), Decimal::from(9));
    }

    #[test]
    fn test_only_location_offers_get_a_discount_price() {
        let mut page = Page {
            current_page: 1,
            last_page: 1,
            per_page: 9,
            total: 2,
            from: Some(1),
            to: Some(2),
            data: vec![
                product("a", Decimal::from(10), true),
                product("b", Decimal::from(10), false),
            ],
        };

        apply_location_offers(&mut page, Decimal::from(10));

        assert_eq!(page.data[0].discount_price, Some(Decimal::from(9)));
        assert_eq!(page.data[1].discount_price, None);
    }
}
