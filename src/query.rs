use serde::Deserialize;
use utoipa::IntoParams;

/// Default page size for list endpoints
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size a client may request
pub const MAX_LIMIT: u32 = 100;

/// SQL query builder for listing documents of one collection
/// Builds a single SQL query with field filters and pagination
pub struct DocumentQueryBuilder {
    base_query: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    limit: u32,
    offset: u32,
}

impl DocumentQueryBuilder {
    /// Creates a builder selecting `id, body` from the given collection table
    ///
    /// `table` is interpolated, so it must come from a trusted constant.
    pub fn new(table: &str) -> Self {
        Self {
            base_query: format!("SELECT id, body FROM {}", table),
            where_clauses: Vec::new(),
            params: Vec::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    /// Adds an exact match on a top-level string field of the document
    /// Both the field name and the value are bound parameters
    pub fn add_field_filter(&mut self, field: &str, value: &str) {
        let field_index = self.params.len() + 1;
        let value_index = field_index + 1;
        self.where_clauses
            .push(format!("body->>${} = ${}", field_index, value_index));
        self.params.push(field.to_string());
        self.params.push(value.to_string());
    }

    /// Sets pagination parameters
    pub fn set_pagination(&mut self, page: Page) {
        self.limit = page.limit;
        self.offset = page.offset();
    }

    /// Builds the final SQL query string with all parameters
    /// Returns a tuple of (query_string, parameters)
    pub fn build(&self) -> (String, Vec<String>) {
        let mut query = self.base_query.clone();

        if !self.where_clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.where_clauses.join(" AND "));
        }

        // Insertion order keeps pages stable
        query.push_str(" ORDER BY created_at, id");

        // LIMIT and OFFSET are validated integers, not bound parameters
        query.push_str(&format!(" LIMIT {}", self.limit));
        query.push_str(&format!(" OFFSET {}", self.offset));

        (query, self.params.clone())
    }
}

/// Pagination parameters extracted from the query string
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<u32>,
    /// Items per page (defaults to 10, at most 100)
    pub limit: Option<u32>,
}

/// Validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub fn offset(&self) -> u32 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Validation error type
#[derive(Debug)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Query parameter validator
pub struct QueryValidator;

impl QueryValidator {
    /// Validates pagination parameters and applies defaults
    pub fn validate(params: ListParams) -> Result<Page, ValidationError> {
        let page = match params.page {
            Some(p) => {
                Self::validate_pagination_param(p, "page")?;
                p
            }
            None => 1,
        };

        let limit = match params.limit {
            Some(l) => {
                Self::validate_pagination_param(l, "limit")?;
                if l > MAX_LIMIT {
                    return Err(ValidationError {
                        message: format!("limit must not exceed {}", MAX_LIMIT),
                    });
                }
                l
            }
            None => DEFAULT_LIMIT,
        };

        Ok(Page { page, limit })
    }

    /// Validates pagination parameters (page and limit)
    /// Must be positive (not zero)
    fn validate_pagination_param(value: u32, param_name: &str) -> Result<(), ValidationError> {
        if value == 0 {
            return Err(ValidationError {
                message: format!("{} must be a positive number (greater than 0)", param_name),
            });
        }
        Ok(())
    }
}
