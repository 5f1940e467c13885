use clap::Parser;
use std::sync::Arc;
use storefront::adapters::http::ApiClient;
use storefront::adapters::notify::TracingNotifier;
use storefront::adapters::settings::{JsonFileSettings, StoredSession};
use storefront::app::{CartView, ListingDefaults, ProductOverview};
use storefront::config::cli::{CartCommand, Command, ListingArgs};
use storefront::core::filter_tree::{CategoryTree, FilterState};
use storefront::core::offers::apply_location_offers;
use storefront::core::{flags, BrandId, Category, CategoryId, Page, Product, ProductId, ProductQuery};
use storefront::domain::ports::{BrandService, CategoryService, ProductService, SettingsStore};
use storefront::utils::error::ErrorSeverity;
use storefront::utils::{logger, validation::Validate};
use storefront::{CliConfig, Result, StorefrontConfig};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let mut config = match StorefrontConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    if let Some(cart_id) = &cli.cart_id {
        config.api.cart_id = Some(cart_id.clone());
    }

    if config.json_logs() {
        logger::init_json_logger(config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
    tracing::debug!("Configuration: {:?}", config);

    if let Err(e) = run(&cli, &config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: &CliConfig, config: &StorefrontConfig) -> Result<()> {
    let api = Arc::new(ApiClient::from_config(config)?);
    let settings = Arc::new(JsonFileSettings::open(&config.settings.path)?);

    match &cli.command {
        Command::Cart(command) => {
            let session = StoredSession::new(settings.clone());
            let mut view = CartView::new(api, TracingNotifier, &session)
                .with_policy(config.pricing_policy());

            match command {
                CartCommand::Show => view.refresh().await?,
                CartCommand::SetQuantity {
                    product_id,
                    quantity,
                } => {
                    view.update_quantity(&ProductId::new(product_id.clone()), quantity)
                        .await?
                }
                CartCommand::Delete { product_id } => {
                    view.delete(&ProductId::new(product_id.clone())).await?
                }
            }

            if cli.json {
                let output = serde_json::json!({
                    "cart": view.cart(),
                    "totals": view.totals(),
                    "logged_in": view.is_logged_in(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for item in view.items() {
                    println!(
                        "{:>4} × {:<40} {:>10} {}",
                        item.quantity,
                        item.product.name,
                        item.line_total().unwrap_or_default(),
                        item.product
                            .co2_rating
                            .map(|r| format!("CO2 {}", r))
                            .unwrap_or_default()
                    );
                }
                let totals = view.totals();
                println!("Subtotal:     {:>10}", totals.subtotal);
                println!("Discount:     {:>10}", totals.discount);
                println!("Eco discount: {:>10}", totals.eco_discount);
                println!("Total:        {:>10}", totals.total);
            }
        }
        Command::Products(args) => {
            let query = listing_query(api.as_ref(), config, args).await?;
            let mut page = api.get_products(&query).await?;
            apply_location_offers(&mut page, config.pricing.location_offer_discount_percentage);
            print_products(&page, cli.json, flags::co2_scale_enabled(settings.as_ref()))?;
        }
        Command::Search { query } => {
            let mut overview =
                ProductOverview::new(api, settings.clone(), ListingDefaults::from_config(config));
            overview.trigger_search(query).await?;
            if let Some(page) = overview.results() {
                print_products(page, cli.json, overview.is_co2_scale_enabled())?;
            }
        }
        Command::Brands => {
            let brands = api.get_brands().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&brands)?);
            } else {
                for brand in &brands {
                    println!("{:<28} {}", brand.id, brand.name);
                }
            }
        }
        Command::Categories => {
            let roots = api.get_categories_tree().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&roots)?);
            } else {
                print_tree(&roots, 0);
            }
        }
        Command::Flags {
            co2_scale,
            eco_badge,
        } => {
            if let Some(enabled) = co2_scale {
                settings.set(flags::CO2_SCALE_ENABLED, &enabled.to_string())?;
            }
            if let Some(enabled) = eco_badge {
                settings.set(flags::ECO_BADGE_ENABLED, &enabled.to_string())?;
            }
            println!("CO2 scale: {}", flags::co2_scale_enabled(settings.as_ref()));
            println!("Eco badge: {}", flags::eco_badge_enabled(settings.as_ref()));
        }
    }

    Ok(())
}

/// Category arguments select whole subtrees, like the parent row checkbox.
async fn listing_query(
    api: &ApiClient,
    config: &StorefrontConfig,
    args: &ListingArgs,
) -> Result<ProductQuery> {
    let categories = if args.category.is_empty() {
        Vec::new()
    } else {
        let tree = CategoryTree::new(api.get_categories_tree().await?);
        let state = args
            .category
            .iter()
            .fold(FilterState::new(config.listing.parent_sync), |state, id| {
                state.select_with_subcategories(&tree, &CategoryId::new(id.clone()), true)
            });
        state.selected().to_vec()
    };

    Ok(ProductQuery {
        query: args.query.clone(),
        sort: args.sort.clone(),
        min_price: args.min_price.unwrap_or(config.listing.default_min_price),
        max_price: args.max_price.unwrap_or(config.listing.default_max_price),
        categories,
        brands: args.brand.iter().cloned().map(BrandId::new).collect(),
        page: args.page,
        eco_friendly: args.eco,
    })
}

fn print_products(page: &Page<Product>, json: bool, show_co2: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(page)?);
        return Ok(());
    }

    for product in &page.data {
        let price = match product.discount_price {
            Some(discounted) => format!("{} (was {})", discounted, product.price),
            None => product.price.to_string(),
        };
        let co2 = match (show_co2, product.co2_rating) {
            (true, Some(rating)) => format!("CO2 {}", rating),
            _ => String::new(),
        };
        println!("{:<28} {:<40} {:>18} {}", product.id, product.name, price, co2);
    }
    println!(
        "Page {}/{} ({} products)",
        page.current_page, page.last_page, page.total
    );
    Ok(())
}

fn print_tree(nodes: &[Category], depth: usize) {
    for node in nodes {
        println!("{}{} [{}]", "  ".repeat(depth), node.name, node.id);
        print_tree(&node.children, depth + 1);
    }
}
