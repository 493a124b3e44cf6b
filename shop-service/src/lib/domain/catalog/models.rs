use serde::Deserialize;
use serde::Serialize;

/// Catalog item, read through from upstream and never stored.
///
/// Every field tolerates absence so one sparse item cannot fail a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

impl ProductPage {
    /// Drop items outside `range` and report the post-filter count as total.
    ///
    /// The total only describes this page afterwards; upstream has no price
    /// parameter, so the size of the full filtered catalog is unknown.
    pub fn retain_price_range(&mut self, range: &PriceRange) {
        if !range.is_active() {
            return;
        }
        self.products.retain(|product| range.contains(product.price));
        self.total = self.products.len() as u64;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    Title,
    Rating,
}

impl SortField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "price" => Some(Self::Price),
            "title" => Some(Self::Title),
            "rating" => Some(Self::Rating),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Title => "title",
            Self::Rating => "rating",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than an explicit "desc" sorts ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

/// Inclusive price bounds applied after fetching.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    /// Unparseable or non-finite bounds are ignored.
    pub fn parse(min: Option<&str>, max: Option<&str>) -> Self {
        fn bound(raw: Option<&str>) -> Option<f64> {
            raw.and_then(|value| value.trim().parse::<f64>().ok())
                .filter(|value| value.is_finite())
        }

        Self {
            min: bound(min),
            max: bound(max),
        }
    }

    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, price: f64) -> bool {
        self.min.map_or(true, |min| price >= min) && self.max.map_or(true, |max| price <= max)
    }
}

/// Which upstream listing a query resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRoute {
    Search(String),
    Category(String),
    All,
}

/// Request shape sent to the upstream catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamQuery {
    pub route: CatalogRoute,
    pub limit: u32,
    pub skip: u64,
    pub sort: Option<Sort>,
}

/// Normalised product listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub limit: u32,
    pub skip: u64,
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<Sort>,
    pub price_range: PriceRange,
}

/// Raw listing parameters as received, before normalisation.
#[derive(Debug, Clone, Default)]
pub struct ListingParams<'a> {
    pub limit: Option<&'a str>,
    pub skip: Option<&'a str>,
    pub search: Option<&'a str>,
    pub category: Option<&'a str>,
    pub sort_by: Option<&'a str>,
    pub sort_order: Option<&'a str>,
    pub price_min: Option<&'a str>,
    pub price_max: Option<&'a str>,
}

impl ListingQuery {
    pub const DEFAULT_LIMIT: u32 = 12;
    pub const MAX_LIMIT: u32 = 100;
    const DEFAULT_SORT_BY: &'static str = "title";

    /// Normalise raw parameters. Never fails: out-of-range values fall back
    /// to defaults.
    pub fn from_params(params: ListingParams<'_>) -> Self {
        Self {
            limit: Self::parse_limit(params.limit),
            skip: Self::parse_skip(params.skip),
            search: non_empty(params.search),
            category: non_empty(params.category),
            sort: SortField::parse(params.sort_by.unwrap_or(Self::DEFAULT_SORT_BY)).map(
                |field| Sort {
                    field,
                    order: SortOrder::parse(params.sort_order),
                },
            ),
            price_range: PriceRange::parse(params.price_min, params.price_max),
        }
    }

    /// Non-numeric, non-positive or above-maximum limits become the default.
    pub fn parse_limit(raw: Option<&str>) -> u32 {
        raw.and_then(|value| value.parse::<i64>().ok())
            .filter(|&limit| limit > 0 && limit <= i64::from(Self::MAX_LIMIT))
            .and_then(|limit| u32::try_from(limit).ok())
            .unwrap_or(Self::DEFAULT_LIMIT)
    }

    /// Non-numeric or negative offsets become zero.
    pub fn parse_skip(raw: Option<&str>) -> u64 {
        raw.and_then(|value| value.parse::<i64>().ok())
            .and_then(|skip| u64::try_from(skip).ok())
            .unwrap_or(0)
    }

    /// Search beats category; with neither, list everything.
    pub fn route(&self) -> CatalogRoute {
        if let Some(term) = &self.search {
            CatalogRoute::Search(term.clone())
        } else if let Some(category) = &self.category {
            CatalogRoute::Category(category.clone())
        } else {
            CatalogRoute::All
        }
    }

    pub fn upstream_query(&self) -> UpstreamQuery {
        UpstreamQuery {
            route: self.route(),
            limit: self.limit,
            skip: self.skip,
            sort: self.sort,
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.filter(|value| !value.is_empty()).map(str::to_string)
}
