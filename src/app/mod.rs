// Application layer: the two storefront screens, wired to ports only.

pub mod cart_view;
pub mod overview;

pub use cart_view::CartView;
pub use overview::{ListingDefaults, ProductOverview, ResultState};
