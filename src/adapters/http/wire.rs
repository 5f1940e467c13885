//! Payloads exactly as the storefront API sends them. Every field is
//! optional here; the `TryFrom` conversions decide what is required.

use crate::domain::model::{
    Brand, BrandId, Cart, CartId, CartItem, Category, CategoryId, CategoryRef, Co2Rating, Page,
    Product, ProductId, ProductRef,
};
use crate::utils::error::{Result, StorefrontError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CartPayload {
    pub id: Option<CartId>,
    pub additional_discount_percentage: Option<Decimal>,
    pub cart_items: Option<Vec<CartItemPayload>>,
}

#[derive(Debug, Deserialize)]
pub struct CartItemPayload {
    pub quantity: Option<i64>,
    pub discount_percentage: Option<Decimal>,
    pub discounted_price: Option<Decimal>,
    pub product: Option<CartProductPayload>,
}

#[derive(Debug, Deserialize)]
pub struct CartProductPayload {
    pub id: Option<ProductId>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub co2_rating: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub id: Option<ProductId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub co2_rating: Option<String>,
    pub is_location_offer: Option<bool>,
    pub is_rental: Option<bool>,
    pub in_stock: Option<bool>,
    pub brand: Option<BrandPayload>,
    pub category: Option<CategoryRefPayload>,
}

#[derive(Debug, Deserialize)]
pub struct BrandPayload {
    pub id: Option<BrandId>,
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRefPayload {
    pub id: Option<CategoryId>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    pub id: Option<CategoryId>,
    pub parent_id: Option<CategoryId>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub sub_categories: Option<Vec<CategoryPayload>>,
}

#[derive(Debug, Deserialize)]
pub struct PagePayload {
    pub current_page: Option<u32>,
    pub last_page: Option<u32>,
    pub per_page: Option<u32>,
    pub total: Option<u64>,
    pub from: Option<u32>,
    pub to: Option<u32>,
    pub data: Option<Vec<ProductPayload>>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorPayload {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuantityUpdate<'a> {
    pub product_id: &'a ProductId,
    pub quantity: u32,
}

fn required<T>(entity: &str, field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| StorefrontError::payload(entity, format!("missing field '{}'", field)))
}

/// Unknown labels are treated as unrated rather than failing the whole cart.
fn parse_co2(entity: &str, label: Option<String>) -> Option<Co2Rating> {
    let label = label?;
    if label.trim().is_empty() {
        return None;
    }
    match label.parse() {
        Ok(rating) => Some(rating),
        Err(reason) => {
            tracing::warn!(entity, %reason, "ignoring CO2 rating");
            None
        }
    }
}

fn clamp_quantity(quantity: Option<i64>) -> u32 {
    quantity
        .unwrap_or(0)
        .clamp(0, i64::from(u32::MAX)) as u32
}

impl TryFrom<CartPayload> for Cart {
    type Error = StorefrontError;

    fn try_from(payload: CartPayload) -> Result<Self> {
        let items = payload
            .cart_items
            .unwrap_or_default()
            .into_iter()
            .map(CartItem::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Cart {
            id: required("cart", "id", payload.id)?,
            items,
            additional_discount_percentage: payload
                .additional_discount_percentage
                .unwrap_or(Decimal::ZERO),
        })
    }
}

impl TryFrom<CartItemPayload> for CartItem {
    type Error = StorefrontError;

    fn try_from(payload: CartItemPayload) -> Result<Self> {
        let product = required("cart item", "product", payload.product)?;

        Ok(CartItem {
            quantity: clamp_quantity(payload.quantity),
            discounted_price: payload.discounted_price,
            discount_percentage: payload.discount_percentage,
            product: ProductRef {
                id: required("cart item", "product.id", product.id)?,
                name: product.name.unwrap_or_default(),
                price: product.price,
                co2_rating: parse_co2("cart item", product.co2_rating),
            },
        })
    }
}

impl TryFrom<BrandPayload> for Brand {
    type Error = StorefrontError;

    fn try_from(payload: BrandPayload) -> Result<Self> {
        Ok(Brand {
            id: required("brand", "id", payload.id)?,
            name: required("brand", "name", payload.name)?,
            slug: payload.slug.unwrap_or_default(),
        })
    }
}

impl TryFrom<ProductPayload> for Product {
    type Error = StorefrontError;

    fn try_from(payload: ProductPayload) -> Result<Self> {
        let category = match payload.category {
            Some(category) => Some(CategoryRef {
                id: required("product", "category.id", category.id)?,
                name: category.name.unwrap_or_default(),
            }),
            None => None,
        };

        Ok(Product {
            id: required("product", "id", payload.id)?,
            name: required("product", "name", payload.name)?,
            description: payload.description,
            price: required("product", "price", payload.price)?,
            co2_rating: parse_co2("product", payload.co2_rating),
            is_location_offer: payload.is_location_offer.unwrap_or(false),
            is_rental: payload.is_rental.unwrap_or(false),
            in_stock: payload.in_stock.unwrap_or(true),
            brand: payload.brand.map(Brand::try_from).transpose()?,
            category,
            discount_price: None,
        })
    }
}

impl TryFrom<PagePayload> for Page<Product> {
    type Error = StorefrontError;

    fn try_from(payload: PagePayload) -> Result<Self> {
        let data = required("page", "data", payload.data)?
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            current_page: payload.current_page.unwrap_or(1),
            last_page: payload.last_page.unwrap_or(1),
            per_page: payload.per_page.unwrap_or(data.len() as u32),
            total: payload.total.unwrap_or(data.len() as u64),
            from: payload.from,
            to: payload.to,
            data,
        })
    }
}

/// Nesting is authoritative: a node without `parent_id` inherits the id of
/// the node it is nested under.
pub fn into_category(payload: CategoryPayload, parent: Option<&CategoryId>) -> Result<Category> {
    let id = required("category", "id", payload.id)?;
    let parent_id = payload.parent_id.or_else(|| parent.cloned());

    let children = payload
        .sub_categories
        .unwrap_or_default()
        .into_iter()
        .map(|child| into_category(child, Some(&id)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Category {
        name: required("category", "name", payload.name)?,
        slug: payload.slug.unwrap_or_default(),
        id,
        parent_id,
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cart_payload_defaults() {
        let payload: CartPayload = serde_json::from_value(json!({
            "id": "c1",
            "cart_items": [
                {"quantity": -3, "product": {"id": 1, "name": "Saw", "price": 12.5, "co2_rating": "a"}},
                {"product": {"id": 2, "name": "Nails", "price": null, "co2_rating": null}}
            ]
        }))
        .unwrap();

        let cart = Cart::try_from(payload).unwrap();

        assert_eq!(cart.additional_discount_percentage, Decimal::ZERO);
        assert_eq!(cart.items[0].quantity, 0);
        assert_eq!(cart.items[0].product.price, Some(Decimal::new(125, 1)));
        assert_eq!(cart.items[0].product.co2_rating, Some(Co2Rating::A));
        assert_eq!(cart.items[1].quantity, 0);
        assert_eq!(cart.items[1].product.price, None);
        assert_eq!(cart.items[1].product.co2_rating, None);
    }

    #[test]
    fn test_cart_item_without_product_is_rejected() {
        let payload: CartPayload = serde_json::from_value(json!({
            "id": "c1",
            "cart_items": [{"quantity": 1}]
        }))
        .unwrap();

        let err = Cart::try_from(payload).unwrap_err();
        assert!(matches!(err, StorefrontError::PayloadError { .. }));
    }

    #[test]
    fn test_unknown_co2_label_is_unrated() {
        assert_eq!(parse_co2("product", Some("Z".to_string())), None);
        assert_eq!(parse_co2("product", Some("".to_string())), None);
        assert_eq!(parse_co2("product", Some("e".to_string())), Some(Co2Rating::E));
    }

    #[test]
    fn test_category_children_inherit_parent_id() {
        let payload: CategoryPayload = serde_json::from_value(json!({
            "id": 1, "name": "Tools", "slug": "tools",
            "sub_categories": [
                {"id": 2, "name": "Hand Tools", "sub_categories": [
                    {"id": 3, "parent_id": 2, "name": "Hammer"}
                ]}
            ]
        }))
        .unwrap();

        let root = into_category(payload, None).unwrap();

        assert_eq!(root.parent_id, None);
        assert_eq!(root.children[0].parent_id, Some(CategoryId::from("1")));
        assert_eq!(root.children[0].children[0].parent_id, Some(CategoryId::from("2")));
    }

    #[test]
    fn test_product_requires_price() {
        let payload: ProductPayload = serde_json::from_value(json!({
            "id": "p1", "name": "Drill"
        }))
        .unwrap();

        assert!(Product::try_from(payload).is_err());
    }
}
