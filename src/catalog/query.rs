// Product listing query parsing and SQL construction
//
// Raw query-string parameters arrive as optional strings; they are
// validated into a typed ProductFilter before any SQL is built. A
// malformed value is a client error, never a silently-ignored filter.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::validation::VALID_SIZES;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Raw query parameters for GET /api/products, exactly as deserialized
/// from the query string. Numeric fields stay `String` here so parse
/// failures surface as 400s instead of axum rejections.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ProductQueryParams {
    /// Case-insensitive substring match over name and description
    pub search: Option<String>,
    /// Comma-separated category keys
    pub categories: Option<String>,
    /// Comma-separated type keys
    pub types: Option<String>,
    /// Comma-separated objective keys
    pub objectives: Option<String>,
    /// Comma-separated color keys
    pub colors: Option<String>,
    /// Comma-separated size codes
    pub size: Option<String>,
    /// Inclusive lower price bound, in the currency's smallest unit
    pub gte: Option<String>,
    /// Inclusive upper price bound
    pub lte: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// A validated product filter, ready for SQL construction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub categories: Option<Vec<String>>,
    pub types: Option<Vec<String>>,
    pub objectives: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub price_gte: Option<i64>,
    pub price_lte: Option<i64>,
    pub page: u32,
    pub limit: u32,
}

/// Filter validation error with a client-facing message
#[derive(Debug, Clone, PartialEq)]
pub struct FilterError {
    pub message: String,
}

impl FilterError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Split a comma-separated parameter into trimmed, non-empty values
fn parse_csv(raw: Option<&str>) -> Option<Vec<String>> {
    let values: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn parse_price(raw: &str, field: &str) -> Result<i64, FilterError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| FilterError::new(format!("{field} must be an integer")))?;
    if value < 0 {
        return Err(FilterError::new(format!("{field} must be non-negative")));
    }
    Ok(value)
}

fn parse_positive(raw: &str, field: &str) -> Result<u32, FilterError> {
    let value: u32 = raw
        .trim()
        .parse()
        .map_err(|_| FilterError::new(format!("{field} must be a positive integer")))?;
    if value == 0 {
        return Err(FilterError::new(format!("{field} must be a positive integer")));
    }
    Ok(value)
}

impl ProductFilter {
    /// Validate raw query parameters into a typed filter
    pub fn from_params(params: ProductQueryParams) -> Result<Self, FilterError> {
        let sizes = parse_csv(params.size.as_deref());
        if let Some(sizes) = &sizes {
            for size in sizes {
                if !VALID_SIZES.contains(&size.as_str()) {
                    return Err(FilterError::new(format!(
                        "invalid size '{size}', expected one of {}",
                        VALID_SIZES.join(", ")
                    )));
                }
            }
        }

        let price_gte = params
            .gte
            .as_deref()
            .map(|v| parse_price(v, "gte"))
            .transpose()?;
        let price_lte = params
            .lte
            .as_deref()
            .map(|v| parse_price(v, "lte"))
            .transpose()?;

        if let (Some(gte), Some(lte)) = (price_gte, price_lte) {
            if gte > lte {
                return Err(FilterError::new("gte cannot exceed lte"));
            }
        }

        let page = params
            .page
            .as_deref()
            .map(|v| parse_positive(v, "page"))
            .transpose()?
            .unwrap_or(DEFAULT_PAGE);
        let limit = params
            .limit
            .as_deref()
            .map(|v| parse_positive(v, "limit"))
            .transpose()?
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            search,
            categories: parse_csv(params.categories.as_deref()),
            types: parse_csv(params.types.as_deref()),
            objectives: parse_csv(params.objectives.as_deref()),
            colors: parse_csv(params.colors.as_deref()),
            sizes,
            price_gte,
            price_lte,
            page,
            limit,
        })
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

/// A typed bind argument for the dynamically-built product query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryArg {
    Text(String),
    TextList(Vec<String>),
    Int(i64),
}

/// The join block shared by the listing, count and single-product
/// queries. Every reference relation is NOT NULL so inner joins are
/// safe and never drop rows.
pub const PRODUCT_JOINS: &str = "FROM products p \
     JOIN categories c ON c.id = p.category_id \
     JOIN types t ON t.id = p.type_id \
     JOIN objectives o ON o.id = p.objective_id \
     JOIN colors col ON col.id = p.color_id";

pub const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.price, p.stock, p.size, p.variant, \
     p.image_url, p.image_public_id, \
     c.key AS category_key, c.name AS category_name, \
     t.key AS type_key, t.name AS type_name, \
     o.key AS objective_key, o.name AS objective_name, \
     col.key AS color_key, col.name AS color_name, \
     p.created_at, p.updated_at";

/// Builds the listing and count SQL for a validated filter. Both
/// statements share the same WHERE clause and bind arguments so the
/// reported total always describes the same result set as the page.
#[derive(Debug, Default)]
pub struct ProductQueryBuilder {
    conditions: Vec<String>,
    args: Vec<QueryArg>,
}

impl ProductQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate every active filter dimension into a WHERE condition
    pub fn apply(mut self, filter: &ProductFilter) -> Self {
        if let Some(search) = &filter.search {
            let placeholder = self.push_arg(QueryArg::Text(format!("%{search}%")));
            self.conditions.push(format!(
                "(p.name ILIKE {placeholder} OR p.description ILIKE {placeholder})"
            ));
        }
        if let Some(keys) = &filter.categories {
            let placeholder = self.push_arg(QueryArg::TextList(keys.clone()));
            self.conditions.push(format!("c.key = ANY({placeholder})"));
        }
        if let Some(keys) = &filter.types {
            let placeholder = self.push_arg(QueryArg::TextList(keys.clone()));
            self.conditions.push(format!("t.key = ANY({placeholder})"));
        }
        if let Some(keys) = &filter.objectives {
            let placeholder = self.push_arg(QueryArg::TextList(keys.clone()));
            self.conditions.push(format!("o.key = ANY({placeholder})"));
        }
        if let Some(keys) = &filter.colors {
            let placeholder = self.push_arg(QueryArg::TextList(keys.clone()));
            self.conditions.push(format!("col.key = ANY({placeholder})"));
        }
        if let Some(sizes) = &filter.sizes {
            let placeholder = self.push_arg(QueryArg::TextList(sizes.clone()));
            self.conditions.push(format!("p.size = ANY({placeholder})"));
        }
        if let Some(gte) = filter.price_gte {
            let placeholder = self.push_arg(QueryArg::Int(gte));
            self.conditions.push(format!("p.price >= {placeholder}"));
        }
        if let Some(lte) = filter.price_lte {
            let placeholder = self.push_arg(QueryArg::Int(lte));
            self.conditions.push(format!("p.price <= {placeholder}"));
        }
        self
    }

    fn push_arg(&mut self, arg: QueryArg) -> String {
        self.args.push(arg);
        format!("${}", self.args.len())
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// The page query. LIMIT/OFFSET come from the validated filter, so
    /// embedding them as literals is safe.
    pub fn build_listing(&self, filter: &ProductFilter) -> String {
        format!(
            "SELECT {PRODUCT_COLUMNS} {PRODUCT_JOINS}{} ORDER BY p.created_at DESC, p.id LIMIT {} OFFSET {}",
            self.where_clause(),
            filter.limit,
            filter.offset()
        )
    }

    /// The count query over the same WHERE clause
    pub fn build_count(&self) -> String {
        format!("SELECT COUNT(*) {PRODUCT_JOINS}{}", self.where_clause())
    }

    pub fn args(&self) -> &[QueryArg] {
        &self.args
    }
}
