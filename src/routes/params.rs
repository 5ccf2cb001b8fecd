use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(25).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

/// Search filters; every provided field narrows the result set, except that
/// the genre list matches movies carrying any one of the named genres.
/// Pagination fields are inline rather than flattened so the query-string
/// deserializer keeps their numeric types.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MovieSearchQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub name: Option<String>,
    pub director: Option<String>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub popularity: Option<f64>,
    /// Comma-separated genre names.
    pub genres: Option<String>,
}

impl MovieSearchQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}
