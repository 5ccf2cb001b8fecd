use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Movie;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMovieRequest {
    pub name: String,
    pub director: String,
    pub imdb_score: f64,
    pub popularity: f64,
    pub genres: Vec<String>,
}

/// Partial update; absent fields keep their stored values. A present
/// `genres` list replaces the whole association set.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMovieRequest {
    pub name: Option<String>,
    pub director: Option<String>,
    pub imdb_score: Option<f64>,
    pub popularity: Option<f64>,
    pub genres: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct MovieList {
    #[schema(value_type = Vec<Movie>)]
    pub items: Vec<Movie>,
}
