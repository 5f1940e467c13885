pub mod filter_tree;
pub mod flags;
pub mod offers;
pub mod pricing;
pub mod search;

pub use crate::domain::model::{
    Brand, BrandId, Cart, CartId, CartItem, Category, CategoryId, Co2Rating, Page, Product,
    ProductId, ProductQuery, ProductRef,
};
pub use crate::domain::ports::{
    AccountSession, BrandService, CartService, CategoryService, Notifier, ProductService,
    SettingsStore,
};
pub use crate::utils::error::Result;
