use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Movie;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddFavoriteRequest {
    pub movie_id: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct FavoriteMovieList {
    #[schema(value_type = Vec<Movie>)]
    pub items: Vec<Movie>,
}
