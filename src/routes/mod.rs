use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod dataset;
pub mod doc;
pub mod favorites;
pub mod health;
pub mod movies;
pub mod params;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/movies", movies::router())
        .nest("/users", users::router())
        .nest("/admin", admin::router())
        .nest("/favorites", favorites::router())
        .nest("/db", dataset::router())
}
