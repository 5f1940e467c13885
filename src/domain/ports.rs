use crate::domain::model::{
    Brand, Cart, Category, Page, Product, ProductId, ProductQuery,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait CartService: Send + Sync {
    async fn get_cart(&self) -> Result<Cart>;
    async fn replace_quantity(&self, product_id: &ProductId, quantity: u32) -> Result<()>;
    async fn delete_item(&self, product_id: &ProductId) -> Result<()>;
}

#[async_trait]
pub trait ProductService: Send + Sync {
    async fn get_products(&self, query: &ProductQuery) -> Result<Page<Product>>;
    async fn search_products(&self, query: &str) -> Result<Page<Product>>;
}

#[async_trait]
pub trait BrandService: Send + Sync {
    async fn get_brands(&self) -> Result<Vec<Brand>>;
}

#[async_trait]
pub trait CategoryService: Send + Sync {
    async fn get_categories_tree(&self) -> Result<Vec<Category>>;
}

/// Client-local key/value settings, the browser localStorage analog.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Toast notifications shown to the shopper.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

pub trait AccountSession: Send + Sync {
    fn is_logged_in(&self) -> bool;
}

// Shared handles: one client can back several views.

#[async_trait]
impl<T: CartService + ?Sized> CartService for Arc<T> {
    async fn get_cart(&self) -> Result<Cart> {
        (**self).get_cart().await
    }

    async fn replace_quantity(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        (**self).replace_quantity(product_id, quantity).await
    }

    async fn delete_item(&self, product_id: &ProductId) -> Result<()> {
        (**self).delete_item(product_id).await
    }
}

#[async_trait]
impl<T: ProductService + ?Sized> ProductService for Arc<T> {
    async fn get_products(&self, query: &ProductQuery) -> Result<Page<Product>> {
        (**self).get_products(query).await
    }

    async fn search_products(&self, query: &str) -> Result<Page<Product>> {
        (**self).search_products(query).await
    }
}

#[async_trait]
impl<T: BrandService + ?Sized> BrandService for Arc<T> {
    async fn get_brands(&self) -> Result<Vec<Brand>> {
        (**self).get_brands().await
    }
}

#[async_trait]
impl<T: CategoryService + ?Sized> CategoryService for Arc<T> {
    async fn get_categories_tree(&self) -> Result<Vec<Category>> {
        (**self).get_categories_tree().await
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn success(&self, message: &str) {
        (**self).success(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }
}

impl<T: AccountSession + ?Sized> AccountSession for Arc<T> {
    fn is_logged_in(&self) -> bool {
        (**self).is_logged_in()
    }
}
