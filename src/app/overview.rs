use crate::config::toml_config::StorefrontConfig;
use crate::core::filter_tree::{CategoryTree, FilterState, ParentSync};
use crate::core::flags;
use crate::core::offers::{self, apply_location_offers};
use crate::core::search::{self, SearchGate};
use crate::domain::model::{Brand, BrandId, CategoryId, Page, Product, ProductQuery};
use crate::domain::ports::{BrandService, CategoryService, ProductService, SettingsStore};
use crate::utils::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;

/// Progress marker a renderer uses to show spinners and "no results" states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultState {
    #[default]
    Idle,
    FilterStarted,
    FilterCompleted,
    SearchStarted,
    SearchCompleted,
    SortingStarted,
    SortingCompleted,
}

#[derive(Debug, Clone)]
pub struct ListingDefaults {
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub parent_sync: ParentSync,
    pub location_offer_percentage: Decimal,
    pub search_debounce: Duration,
    pub min_search_length: usize,
}

impl Default for ListingDefaults {
    fn default() -> Self {
        Self {
            min_price: Decimal::ONE,
            max_price: Decimal::ONE_HUNDRED,
            parent_sync: ParentSync::default(),
            location_offer_percentage: offers::default_location_offer_percentage(),
            search_debounce: search::DEFAULT_DEBOUNCE,
            min_search_length: search::DEFAULT_MIN_QUERY_LENGTH,
        }
    }
}

impl ListingDefaults {
    pub fn from_config(config: &StorefrontConfig) -> Self {
        Self {
            min_price: config.listing.default_min_price,
            max_price: config.listing.default_max_price,
            parent_sync: config.listing.parent_sync,
            location_offer_percentage: config.pricing.location_offer_discount_percentage,
            search_debounce: config.search_debounce(),
            min_search_length: config.listing.min_search_length,
        }
    }
}

/// Product listing screen: search, sort, price range, brand/category/eco
/// filters and paging. Every filter change re-queries from the first page.
///
/// A failed request leaves the previous results (and any "started" state) in
/// place; the error is logged and handed back to the caller.
pub struct ProductOverview<A, S>
where
    A: ProductService + BrandService + CategoryService,
    S: SettingsStore,
{
    api: A,
    settings: S,
    defaults: ListingDefaults,
    search_query: Option<String>,
    sorting: Option<String>,
    min_price: Decimal,
    max_price: Decimal,
    brands_filter: Vec<BrandId>,
    categories_filter: FilterState,
    eco_friendly: bool,
    current_page: u32,
    results: Option<Page<Product>>,
    result_state: ResultState,
    brands: Vec<Brand>,
    tree: CategoryTree,
}

impl<A, S> ProductOverview<A, S>
where
    A: ProductService + BrandService + CategoryService,
    S: SettingsStore,
{
    pub fn new(api: A, settings: S, defaults: ListingDefaults) -> Self {
        Self {
            api,
            settings,
            search_query: None,
            sorting: None,
            min_price: defaults.min_price,
            max_price: defaults.max_price,
            brands_filter: Vec::new(),
            categories_filter: FilterState::new(defaults.parent_sync),
            eco_friendly: false,
            current_page: 1,
            results: None,
            result_state: ResultState::Idle,
            brands: Vec::new(),
            tree: CategoryTree::default(),
            defaults,
        }
    }

    pub fn results(&self) -> Option<&Page<Product>> {
        self.results.as_ref()
    }

    pub fn result_state(&self) -> ResultState {
        self.result_state
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    pub fn category_tree(&self) -> &CategoryTree {
        &self.tree
    }

    pub fn search_query(&self) -> Option<&str> {
        self.search_query.as_deref()
    }

    pub fn sorting(&self) -> Option<&str> {
        self.sorting.as_deref()
    }

    pub fn price_range(&self) -> (Decimal, Decimal) {
        (self.min_price, self.max_price)
    }

    pub fn brand_filter(&self) -> &[BrandId] {
        &self.brands_filter
    }

    pub fn category_filter(&self) -> &FilterState {
        &self.categories_filter
    }

    pub fn eco_friendly(&self) -> bool {
        self.eco_friendly
    }

    pub fn is_category_selected(&self, id: &CategoryId) -> bool {
        self.categories_filter.is_selected(id)
    }

    pub fn is_co2_scale_enabled(&self) -> bool {
        flags::co2_scale_enabled(&self.settings)
    }

    pub fn is_eco_badge_enabled(&self) -> bool {
        flags::eco_badge_enabled(&self.settings)
    }

    /// The listing request for the current filters.
    pub fn query(&self, page: u32) -> ProductQuery {
        ProductQuery {
            query: self.search_query.clone(),
            sort: self.sorting.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            categories: self.categories_filter.selected().to_vec(),
            brands: self.brands_filter.clone(),
            page,
            eco_friendly: self.eco_friendly,
        }
    }

    async fn fetch(&self, page: u32) -> Result<Page<Product>> {
        let mut results = self
            .api
            .get_products(&self.query(page))
            .await
            .inspect_err(|e| tracing::warn!("Product listing failed: {}", e))?;
        apply_location_offers(&mut results, self.defaults.location_offer_percentage);
        Ok(results)
    }

    /// First page of products, the brand list and the category tree. Each
    /// part that loads is kept even if another fails.
    pub async fn load(&mut self) -> Result<()> {
        let (products, brands, tree) = tokio::join!(
            self.fetch(self.current_page),
            self.api.get_brands(),
            self.api.get_categories_tree(),
        );

        let mut first_error = None;

        match products {
            Ok(page) => self.results = Some(page),
            Err(e) => first_error = first_error.or(Some(e)),
        }
        match brands {
            Ok(brands) => self.brands = brands,
            Err(e) => {
                tracing::warn!("Brand list failed: {}", e);
                first_error = first_error.or(Some(e));
            }
        }
        match tree {
            Ok(roots) => self.tree = CategoryTree::new(roots),
            Err(e) => {
                tracing::warn!("Category tree failed: {}", e);
                first_error = first_error.or(Some(e));
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub async fn change_page(&mut self, page: u32) -> Result<()> {
        self.current_page = page;
        self.results = Some(self.fetch(page).await?);
        Ok(())
    }

    /// Re-query after a filter change: back to the first page on success.
    async fn apply_filters(&mut self) -> Result<()> {
        let results = self.fetch(0).await?;
        self.result_state = ResultState::FilterCompleted;
        self.current_page = 1;
        self.results = Some(results);
        Ok(())
    }

    pub async fn filter_by_brand(&mut self, brand_id: BrandId, checked: bool) -> Result<()> {
        self.result_state = ResultState::FilterStarted;
        if checked {
            if !self.brands_filter.contains(&brand_id) {
                self.brands_filter.push(brand_id);
            }
        } else {
            self.brands_filter.retain(|id| id != &brand_id);
        }
        self.apply_filters().await
    }

    /// One category checkbox; `parent_id` is the row it was rendered under.
    pub async fn filter_by_category(
        &mut self,
        category_id: &CategoryId,
        parent_id: Option<&CategoryId>,
        checked: bool,
    ) -> Result<()> {
        self.result_state = ResultState::FilterStarted;
        self.categories_filter = self
            .categories_filter
            .toggle(&self.tree, category_id, parent_id, checked);
        self.apply_filters().await
    }

    /// The checkbox on a top-level category row.
    pub async fn select_parent_with_subcategories(
        &mut self,
        category_id: &CategoryId,
        checked: bool,
    ) -> Result<()> {
        self.categories_filter = self
            .categories_filter
            .select_with_subcategories(&self.tree, category_id, checked);
        self.apply_filters().await
    }

    pub async fn filter_by_eco_friendly(&mut self, eco_friendly: bool) -> Result<()> {
        self.result_state = ResultState::FilterStarted;
        self.eco_friendly = eco_friendly;
        self.apply_filters().await
    }

    pub async fn change_price_range(&mut self, min_price: Decimal, max_price: Decimal) -> Result<()> {
        self.min_price = min_price;
        self.max_price = max_price;
        self.results = Some(self.fetch(0).await?);
        Ok(())
    }

    pub async fn change_sorting(&mut self, sorting: &str) -> Result<()> {
        self.sorting = Some(sorting.to_string()).filter(|s| !s.is_empty());
        self.result_state = ResultState::SortingStarted;
        let results = self.fetch(0).await?;
        self.result_state = ResultState::SortingCompleted;
        self.results = Some(results);
        Ok(())
    }

    /// Free-text search. A successful search clears every other filter except
    /// the eco flag; the query itself sticks for later listing requests.
    pub async fn trigger_search(&mut self, query: &str) -> Result<()> {
        self.result_state = ResultState::SearchStarted;
        self.search_query = Some(query.to_string());

        let mut results = self
            .api
            .search_products(query)
            .await
            .inspect_err(|e| tracing::warn!(query, "Search failed: {}", e))?;
        apply_location_offers(&mut results, self.defaults.location_offer_percentage);

        self.result_state = ResultState::SearchCompleted;
        self.min_price = self.defaults.min_price;
        self.max_price = self.defaults.max_price;
        self.sorting = None;
        self.brands_filter.clear();
        self.categories_filter = self.categories_filter.cleared();
        self.results = Some(results);
        Ok(())
    }

    pub async fn reset(&mut self) -> Result<()> {
        self.min_price = self.defaults.min_price;
        self.max_price = self.defaults.max_price;
        self.search_query = None;
        self.sorting = None;
        self.brands_filter.clear();
        self.categories_filter = self.categories_filter.cleared();
        self.eco_friendly = false;
        self.results = Some(self.fetch(0).await?);
        Ok(())
    }

    /// Feeds raw search-box input through the debouncer and searches for
    /// every settled query until the input side closes. Failed searches are
    /// logged and skipped.
    pub async fn run_search_input(&mut self, input: mpsc::Receiver<String>) {
        let gate = SearchGate::new(self.defaults.min_search_length);
        let (mut settled, handle) = search::spawn_debouncer(input, self.defaults.search_debounce, gate);

        while let Some(query) = settled.recv().await {
            if let Err(e) = self.trigger_search(&query).await {
                tracing::debug!(query = %query, "Skipping failed search: {}", e);
            }
        }

        if let Err(e) = handle.await {
            tracing::warn!("Search debouncer stopped: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::settings::MemorySettings;
    use crate::domain::model::{Category, ProductId};
    use crate::utils::error::StorefrontError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockCatalog {
        queries: Mutex<Vec<ProductQuery>>,
        searches: Mutex<Vec<String>>,
        fail_listing: Mutex<bool>,
        failing_search: Mutex<Option<String>>,
    }

    fn product(id: &str, price: i64, is_location_offer: bool) -> Product {
        Product {
            id: ProductId::from(id),
            name: id.to_string(),
            description: None,
            price: Decimal::from(price),
            co2_rating: None,
            is_location_offer,
            is_rental: false,
            in_stock: true,
            brand: None,
            category: None,
            discount_price: None,
        }
    }

    fn page(data: Vec<Product>) -> Page<Product> {
        Page {
            current_page: 1,
            last_page: 1,
            per_page: 9,
            total: data.len() as u64,
            from: Some(1),
            to: Some(data.len() as u32),
            data,
        }
    }

    fn category(id: &str, parent: Option<&str>, children: Vec<Category>) -> Category {
        Category {
            id: CategoryId::from(id),
            parent_id: parent.map(CategoryId::from),
            name: id.to_string(),
            slug: id.to_string(),
            children,
        }
    }

    impl MockCatalog {
        fn last_query(&self) -> ProductQuery {
            self.queries.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ProductService for MockCatalog {
        async fn get_products(&self, query: &ProductQuery) -> Result<Page<Product>> {
            self.queries.lock().unwrap().push(query.clone());
            if *self.fail_listing.lock().unwrap() {
                return Err(StorefrontError::ApiError {
                    status: 500,
                    message: "Server Error".to_string(),
                });
            }
            Ok(page(vec![product("hammer", 20, true), product("saw", 10, false)]))
        }

        async fn search_products(&self, query: &str) -> Result<Page<Product>> {
            self.searches.lock().unwrap().push(query.to_string());
            if self.failing_search.lock().unwrap().as_deref() == Some(query) {
                return Err(StorefrontError::ApiError {
                    status: 503,
                    message: "Search unavailable".to_string(),
                });
            }
            Ok(page(vec![product("saw", 10, false)]))
        }
    }

    #[async_trait]
    impl BrandService for MockCatalog {
        async fn get_brands(&self) -> Result<Vec<Brand>> {
            Ok(vec![Brand {
                id: BrandId::from("b1"),
                name: "ForgeFlex".to_string(),
                slug: "forgeflex".to_string(),
            }])
        }
    }

    #[async_trait]
    impl CategoryService for MockCatalog {
        async fn get_categories_tree(&self) -> Result<Vec<Category>> {
            Ok(vec![category(
                "hand",
                None,
                vec![
                    category("hammer", Some("hand"), vec![]),
                    category("pliers", Some("hand"), vec![]),
                ],
            )])
        }
    }

    type Overview = ProductOverview<std::sync::Arc<MockCatalog>, MemorySettings>;

    async fn loaded() -> (Overview, std::sync::Arc<MockCatalog>) {
        let catalog = std::sync::Arc::new(MockCatalog::default());
        let mut overview =
            ProductOverview::new(catalog.clone(), MemorySettings::new(), ListingDefaults::default());
        overview.load().await.unwrap();
        (overview, catalog)
    }

    #[tokio::test]
    async fn test_load_fetches_everything_and_prices_offers() {
        let (overview, catalog) = loaded().await;

        assert_eq!(overview.brands().len(), 1);
        assert_eq!(overview.category_tree().len(), 3);
        let results = overview.results().unwrap();
        assert_eq!(results.data[0].discount_price, Some(Decimal::from(17)));
        assert_eq!(results.data[1].discount_price, None);
        assert_eq!(catalog.last_query(), ProductQuery::default());
    }

    #[tokio::test]
    async fn test_category_toggle_sends_selection_and_resets_page() {
        let (mut overview, catalog) = loaded().await;
        overview.change_page(3).await.unwrap();
        assert_eq!(catalog.last_query().page, 3);

        let hand = CategoryId::from("hand");
        overview
            .filter_by_category(&CategoryId::from("hammer"), Some(&hand), true)
            .await
            .unwrap();
        overview
            .filter_by_category(&CategoryId::from("pliers"), Some(&hand), true)
            .await
            .unwrap();

        let query = catalog.last_query();
        assert_eq!(query.page, 0);
        assert_eq!(
            query.categories,
            vec![CategoryId::from("hammer"), CategoryId::from("pliers"), hand.clone()]
        );
        assert!(overview.is_category_selected(&hand));
        assert_eq!(overview.current_page(), 1);
        assert_eq!(overview.result_state(), ResultState::FilterCompleted);
    }

    #[tokio::test]
    async fn test_parent_row_selects_subtree() {
        let (mut overview, catalog) = loaded().await;

        overview
            .select_parent_with_subcategories(&CategoryId::from("hand"), true)
            .await
            .unwrap();

        assert_eq!(catalog.last_query().categories.len(), 3);
    }

    #[tokio::test]
    async fn test_brand_filter_toggles() {
        let (mut overview, catalog) = loaded().await;

        overview.filter_by_brand(BrandId::from("b1"), true).await.unwrap();
        overview.filter_by_brand(BrandId::from("b1"), true).await.unwrap();
        assert_eq!(catalog.last_query().brands, vec![BrandId::from("b1")]);

        overview.filter_by_brand(BrandId::from("b1"), false).await.unwrap();
        assert!(catalog.last_query().brands.is_empty());
    }

    #[tokio::test]
    async fn test_search_clears_filters_but_keeps_eco_flag() {
        let (mut overview, catalog) = loaded().await;
        overview.filter_by_eco_friendly(true).await.unwrap();
        overview.filter_by_brand(BrandId::from("b1"), true).await.unwrap();
        overview.change_sorting("price,desc").await.unwrap();
        overview
            .change_price_range(Decimal::from(10), Decimal::from(20))
            .await
            .unwrap();

        overview.trigger_search("saw").await.unwrap();

        assert_eq!(overview.result_state(), ResultState::SearchCompleted);
        assert_eq!(overview.search_query(), Some("saw"));
        assert_eq!(overview.sorting(), None);
        assert_eq!(overview.price_range(), (Decimal::ONE, Decimal::ONE_HUNDRED));
        assert!(overview.brand_filter().is_empty());
        assert!(overview.eco_friendly());
        assert_eq!(overview.results().unwrap().data.len(), 1);
        assert_eq!(catalog.searches.lock().unwrap().as_slice(), ["saw"]);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let (mut overview, catalog) = loaded().await;
        overview.trigger_search("saw").await.unwrap();
        overview.filter_by_eco_friendly(true).await.unwrap();

        overview.reset().await.unwrap();

        let query = catalog.last_query();
        assert_eq!(query.query, None);
        assert!(!query.eco_friendly);
        assert_eq!(query.page, 0);
    }

    #[tokio::test]
    async fn test_failed_listing_keeps_previous_results_and_state() {
        let (mut overview, catalog) = loaded().await;
        let before = overview.results().cloned();
        *catalog.fail_listing.lock().unwrap() = true;

        let result = overview.filter_by_eco_friendly(true).await;

        assert!(result.is_err());
        assert_eq!(overview.results().cloned(), before);
        assert_eq!(overview.result_state(), ResultState::FilterStarted);
    }

    #[tokio::test]
    async fn test_sorting_states() {
        let (mut overview, catalog) = loaded().await;

        overview.change_sorting("name,asc").await.unwrap();

        assert_eq!(overview.result_state(), ResultState::SortingCompleted);
        assert_eq!(catalog.last_query().sort.as_deref(), Some("name,asc"));
    }

    #[tokio::test]
    async fn test_eco_flags_read_settings() {
        let catalog = std::sync::Arc::new(MockCatalog::default());
        let settings = MemorySettings::with(&[(flags::ECO_BADGE_ENABLED, "false")]);
        let overview = ProductOverview::new(catalog, settings, ListingDefaults::default());

        assert!(overview.is_co2_scale_enabled());
        assert!(!overview.is_eco_badge_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_input_is_debounced() {
        let (mut overview, catalog) = loaded().await;
        let (tx, rx) = mpsc::channel(8);

        let typing = tokio::spawn(async move {
            for partial in ["d", "dr", "dri", "drill"] {
                tx.send(partial.to_string()).await.unwrap();
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
            tx.send("d".to_string()).await.unwrap();
        });

        overview.run_search_input(rx).await;
        typing.await.unwrap();

        assert_eq!(catalog.searches.lock().unwrap().as_slice(), ["drill"]);
        assert_eq!(overview.search_query(), Some("drill"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_search_input_does_not_stop_later_searches() {
        let (mut overview, catalog) = loaded().await;
        *catalog.failing_search.lock().unwrap() = Some("saw".to_string());
        let (tx, rx) = mpsc::channel(8);

        let typing = tokio::spawn(async move {
            tx.send("saw".to_string()).await.unwrap();
            tokio::time::sleep(Duration::from_millis(500)).await;
            tx.send("drill".to_string()).await.unwrap();
        });

        overview.run_search_input(rx).await;
        typing.await.unwrap();

        assert_eq!(catalog.searches.lock().unwrap().as_slice(), ["saw", "drill"]);
        assert_eq!(overview.result_state(), ResultState::SearchCompleted);
        assert_eq!(overview.search_query(), Some("drill"));
    }
}
