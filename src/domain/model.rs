use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend ids arrive either as JSON numbers or as strings (ULIDs).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                Ok(match RawId::deserialize(deserializer)? {
                    RawId::Number(n) => Self(n.to_string()),
                    RawId::Text(s) => Self(s),
                })
            }
        }
    };
}

id_type!(CartId);
id_type!(ProductId);
id_type!(CategoryId);
id_type!(BrandId);

/// CO2 label printed on a product. Only A and B count as eco-friendly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Co2Rating {
    A,
    B,
    C,
    D,
    E,
}

impl Co2Rating {
    pub fn is_eco_friendly(self) -> bool {
        matches!(self, Co2Rating::A | Co2Rating::B)
    }
}

impl FromStr for Co2Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Co2Rating::A),
            "B" => Ok(Co2Rating::B),
            "C" => Ok(Co2Rating::C),
            "D" => Ok(Co2Rating::D),
            "E" => Ok(Co2Rating::E),
            other => Err(format!("unknown CO2 rating '{}'", other)),
        }
    }
}

impl fmt::Display for Co2Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Co2Rating::A => "A",
            Co2Rating::B => "B",
            Co2Rating::C => "C",
            Co2Rating::D => "D",
            Co2Rating::E => "E",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub name: String,
    pub price: Option<Decimal>,
    pub co2_rating: Option<Co2Rating>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub quantity: u32,
    pub discounted_price: Option<Decimal>,
    pub discount_percentage: Option<Decimal>,
    pub product: ProductRef,
}

impl CartItem {
    fn has_discount(&self) -> bool {
        self.discount_percentage.is_some_and(|pct| !pct.is_zero())
    }

    /// Price of one unit: the discounted price when the line carries a
    /// discount, otherwise the product price. Missing prices count as zero.
    pub fn unit_price(&self) -> Decimal {
        let price = if self.has_discount() {
            self.discounted_price
        } else {
            self.product.price
        };
        price.unwrap_or(Decimal::ZERO)
    }

    /// `None` when quantity times unit price leaves the decimal range.
    pub fn line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price())
    }

    pub fn is_eco_friendly(&self) -> bool {
        self.product
            .co2_rating
            .is_some_and(Co2Rating::is_eco_friendly)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub items: Vec<CartItem>,
    pub additional_discount_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub parent_id: Option<CategoryId>,
    pub name: String,
    pub slug: String,
    pub children: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub co2_rating: Option<Co2Rating>,
    pub is_location_offer: bool,
    pub is_rental: bool,
    pub in_stock: bool,
    pub brand: Option<Brand>,
    pub category: Option<CategoryRef>,
    /// Filled in by the listing for location offers.
    pub discount_price: Option<Decimal>,
}

/// Backend pagination envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub from: Option<u32>,
    pub to: Option<u32>,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Everything the listing endpoint filters on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductQuery {
    pub query: Option<String>,
    pub sort: Option<String>,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub categories: Vec<CategoryId>,
    pub brands: Vec<BrandId>,
    pub page: u32,
    pub eco_friendly: bool,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            query: None,
            sort: None,
            min_price: Decimal::ONE,
            max_price: Decimal::ONE_HUNDRED,
            categories: Vec::new(),
            brands: Vec::new(),
            page: 1,
            eco_friendly: false,
        }
    }
}
