use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront cart and product listing client")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "storefront.toml")]
    pub config: String,

    /// Override the cart id from the configuration
    #[arg(long)]
    pub cart_id: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Work with the shopping cart
    #[command(subcommand)]
    Cart(CartCommand),
    /// List products with filters
    Products(ListingArgs),
    /// Free-text product search
    Search { query: String },
    /// List all brands
    Brands,
    /// Show the category tree
    Categories,
    /// Show or change the eco display flags
    Flags {
        /// Set CO2_SCALE_ENABLED
        #[arg(long)]
        co2_scale: Option<bool>,
        /// Set ECO_BADGE_ENABLED
        #[arg(long)]
        eco_badge: Option<bool>,
    },
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Show line items and totals
    Show,
    /// Replace the quantity of a product
    SetQuantity { product_id: String, quantity: String },
    /// Remove a product from the cart
    Delete { product_id: String },
}

#[derive(Debug, Clone, Args)]
pub struct ListingArgs {
    #[arg(long)]
    pub query: Option<String>,

    /// Sort key, e.g. "name,asc" or "price,desc"
    #[arg(long)]
    pub sort: Option<String>,

    #[arg(long)]
    pub min_price: Option<Decimal>,

    #[arg(long)]
    pub max_price: Option<Decimal>,

    /// Category ids; a parent selects its whole subtree
    #[arg(long, value_delimiter = ',')]
    pub category: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub brand: Vec<String>,

    #[arg(long)]
    pub eco: bool,

    #[arg(long, default_value = "1")]
    pub page: u32,
}
