pub mod wire;

use crate::config::toml_config::StorefrontConfig;
use crate::domain::model::{
    Brand, Cart, CartId, Category, Page, Product, ProductId, ProductQuery,
};
use crate::domain::ports::{BrandService, CartService, CategoryService, ProductService};
use crate::utils::error::{Result, StorefrontError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;
use wire::{BrandPayload, CartPayload, CategoryPayload, ErrorPayload, PagePayload, QuantityUpdate};

/// One client for every storefront endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    cart_id: Option<CartId>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            cart_id: None,
        })
    }

    pub fn from_config(config: &StorefrontConfig) -> Result<Self> {
        let client = Self::new(&config.api.base_url, config.timeout())?;
        Ok(match &config.api.cart_id {
            Some(cart_id) => client.with_cart(CartId::new(cart_id.clone())),
            None => client,
        })
    }

    pub fn with_cart(mut self, cart_id: CartId) -> Self {
        self.cart_id = Some(cart_id);
        self
    }

    fn cart_id(&self) -> Result<&CartId> {
        self.cart_id
            .as_ref()
            .ok_or_else(|| StorefrontError::MissingConfigError {
                field: "api.cart_id".to_string(),
            })
    }

    /// Appends escaped path segments to the base URL, keeping any base path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StorefrontError::ConfigError {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Turns a non-2xx response into an API error carrying the server message.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorPayload>(&body)
            .ok()
            .and_then(|payload| payload.message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        tracing::debug!(status = status.as_u16(), %message, "API request failed");
        Err(StorefrontError::ApiError {
            status: status.as_u16(),
            message,
        })
    }
}

pub fn listing_params(query: &ProductQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", query.page.to_string()),
        (
            "between",
            format!("price,{},{}", query.min_price, query.max_price),
        ),
    ];

    if let Some(q) = query.query.as_deref().filter(|q| !q.is_empty()) {
        params.push(("q", q.to_string()));
    }
    if let Some(sort) = query.sort.as_deref().filter(|s| !s.is_empty()) {
        params.push(("sort", sort.to_string()));
    }
    if !query.categories.is_empty() {
        let ids: Vec<&str> = query.categories.iter().map(|id| id.as_str()).collect();
        params.push(("by_category", ids.join(",")));
    }
    if !query.brands.is_empty() {
        let ids: Vec<&str> = query.brands.iter().map(|id| id.as_str()).collect();
        params.push(("by_brand", ids.join(",")));
    }
    if query.eco_friendly {
        params.push(("is_eco_friendly", "true".to_string()));
    }

    params
}

#[async_trait]
impl CartService for ApiClient {
    async fn get_cart(&self) -> Result<Cart> {
        let url = self.endpoint(&["carts", self.cart_id()?.as_str()])?;
        tracing::debug!("Fetching cart from: {}", url);

        let payload: CartPayload = Self::decode(self.client.get(url).send().await?).await?;
        Cart::try_from(payload)
    }

    async fn replace_quantity(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        let url = self.endpoint(&["carts", self.cart_id()?.as_str(), "product", "quantity"])?;
        tracing::debug!(product = %product_id, quantity, "Replacing cart quantity");

        let body = QuantityUpdate {
            product_id,
            quantity,
        };
        Self::check(self.client.put(url).json(&body).send().await?).await?;
        Ok(())
    }

    async fn delete_item(&self, product_id: &ProductId) -> Result<()> {
        let url = self.endpoint(&[
            "carts",
            self.cart_id()?.as_str(),
            "product",
            product_id.as_str(),
        ])?;
        tracing::debug!(product = %product_id, "Deleting cart item");

        Self::check(self.client.delete(url).send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl ProductService for ApiClient {
    async fn get_products(&self, query: &ProductQuery) -> Result<Page<Product>> {
        let url = self.endpoint(&["products"])?;
        let params = listing_params(query);
        tracing::debug!("Fetching products from: {} with {:?}", url, params);

        let payload: PagePayload =
            Self::decode(self.client.get(url).query(&params).send().await?).await?;
        Page::try_from(payload)
    }

    async fn search_products(&self, query: &str) -> Result<Page<Product>> {
        let url = self.endpoint(&["products", "search"])?;
        tracing::debug!(query, "Searching products");

        let payload: PagePayload =
            Self::decode(self.client.get(url).query(&[("q", query)]).send().await?).await?;
        Page::try_from(payload)
    }
}

#[async_trait]
impl BrandService for ApiClient {
    async fn get_brands(&self) -> Result<Vec<Brand>> {
        let url = self.endpoint(&["brands"])?;
        let payload: Vec<BrandPayload> = Self::decode(self.client.get(url).send().await?).await?;
        payload.into_iter().map(Brand::try_from).collect()
    }
}

#[async_trait]
impl CategoryService for ApiClient {
    async fn get_categories_tree(&self) -> Result<Vec<Category>> {
        let url = self.endpoint(&["categories", "tree"])?;
        let payload: Vec<CategoryPayload> =
            Self::decode(self.client.get(url).send().await?).await?;
        payload
            .into_iter()
            .map(|category| wire::into_category(category, None))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{BrandId, CategoryId};
    use rust_decimal::Decimal;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = ApiClient::new("https://shop.example.com/api/", Duration::from_secs(5)).unwrap();
        let url = client.endpoint(&["carts", "abc def"]).unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/api/carts/abc%20def");

        let client = ApiClient::new("https://shop.example.com/api", Duration::from_secs(5)).unwrap();
        let url = client.endpoint(&["brands"]).unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/api/brands");
    }

    #[test]
    fn test_listing_params_skip_empty_filters() {
        let params = listing_params(&ProductQuery::default());
        assert_eq!(
            params,
            vec![
                ("page", "1".to_string()),
                ("between", "price,1,100".to_string()),
            ]
        );
    }

    #[test]
    fn test_listing_params_join_ids() {
        let query = ProductQuery {
            query: Some("saw".to_string()),
            sort: Some("price,asc".to_string()),
            min_price: Decimal::from(5),
            max_price: Decimal::from(50),
            categories: vec![CategoryId::from("1"), CategoryId::from("2")],
            brands: vec![BrandId::from("9")],
            page: 0,
            eco_friendly: true,
        };

        let params = listing_params(&query);

        assert!(params.contains(&("between", "price,5,50".to_string())));
        assert!(params.contains(&("by_category", "1,2".to_string())));
        assert!(params.contains(&("by_brand", "9".to_string())));
        assert!(params.contains(&("is_eco_friendly", "true".to_string())));
        assert!(params.contains(&("q", "saw".to_string())));
        assert!(params.contains(&("page", "0".to_string())));
    }

    #[tokio::test]
    async fn test_cart_calls_require_cart_id() {
        let client = ApiClient::new("http://localhost:1", Duration::from_secs(1)).unwrap();
        let err = client.get_cart().await.unwrap_err();
        assert!(matches!(err, StorefrontError::MissingConfigError { .. }));
    }
}
