use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::movies::{CreateMovieRequest, MovieList, UpdateMovieRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Movie,
    response::ApiResponse,
    routes::params::{MovieSearchQuery, Pagination},
    services::{cache_service::CacheService, movie_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_movies).post(create_movie))
        .route("/search", get(search_movies))
        .route(
            "/{id}",
            get(get_movie).patch(update_movie).delete(delete_movie),
        )
        .route(
            "/by-name/{name}",
            get(get_movie_by_name)
                .patch(update_movie_by_name)
                .delete(delete_movie_by_name),
        )
}

#[utoipa::path(
    get,
    path = "/api/movies",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 25"),
    ),
    responses(
        (status = 200, description = "List movies", body = ApiResponse<MovieList>),
        (status = 404, description = "No movies in the catalog"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
pub async fn list_movies(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<MovieList>>> {
    let (page, per_page, _) = pagination.normalize();
    let key = CacheService::movie_list_key(page, per_page);
    match state.cache.get::<ApiResponse<MovieList>>(&key).await {
        Ok(Some(cached)) => return Ok(Json(cached)),
        Ok(None) => {}
        Err(err) => tracing::warn!(error = %err, "cache read failed"),
    }

    let resp = movie_service::list_movies(&state, pagination).await?;

    if let Err(err) = state.cache.set(&key, &resp).await {
        tracing::warn!(error = %err, "cache write failed");
    }
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/movies/search",
    params(
        ("name" = Option<String>, Query, description = "Case-insensitive name substring"),
        ("director" = Option<String>, Query, description = "Case-insensitive director substring"),
        ("min_rating" = Option<f64>, Query, description = "Inclusive lower bound on imdb_score"),
        ("max_rating" = Option<f64>, Query, description = "Inclusive upper bound on imdb_score"),
        ("popularity" = Option<f64>, Query, description = "Exact popularity score"),
        ("genres" = Option<String>, Query, description = "Comma-separated genre names, any-of"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 25"),
    ),
    responses(
        (status = 200, description = "Movies matching the criteria", body = ApiResponse<MovieList>),
        (status = 404, description = "No movies match the criteria"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
pub async fn search_movies(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<MovieSearchQuery>,
) -> AppResult<Json<ApiResponse<MovieList>>> {
    let key = CacheService::movie_search_key(&query);
    match state.cache.get::<ApiResponse<MovieList>>(&key).await {
        Ok(Some(cached)) => return Ok(Json(cached)),
        Ok(None) => {}
        Err(err) => tracing::warn!(error = %err, "cache read failed"),
    }

    let resp = movie_service::search_movies(&state, query).await?;

    if let Err(err) = state.cache.set(&key, &resp).await {
        tracing::warn!(error = %err, "cache write failed");
    }
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/movies",
    request_body = CreateMovieRequest,
    responses(
        (status = 200, description = "Movie created", body = ApiResponse<Movie>),
        (status = 403, description = "Admin privilege required"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
pub async fn create_movie(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateMovieRequest>,
) -> AppResult<Json<ApiResponse<Movie>>> {
    let resp = movie_service::create_movie(&state, &user, payload).await?;

    if let Err(err) = state.cache.clear_all().await {
        tracing::warn!(error = %err, "cache invalidation failed");
    }
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/movies/{id}",
    params(
        ("id" = i32, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Get movie", body = ApiResponse<Movie>),
        (status = 404, description = "Movie not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
pub async fn get_movie(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Movie>>> {
    let key = CacheService::movie_id_key(id);
    match state.cache.get::<ApiResponse<Movie>>(&key).await {
        Ok(Some(cached)) => return Ok(Json(cached)),
        Ok(None) => {}
        Err(err) => tracing::warn!(error = %err, "cache read failed"),
    }

    let resp = movie_service::get_movie(&state, id).await?;

    if let Err(err) = state.cache.set(&key, &resp).await {
        tracing::warn!(error = %err, "cache write failed");
    }
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/movies/{id}",
    params(
        ("id" = i32, Path, description = "Movie ID")
    ),
    request_body = UpdateMovieRequest,
    responses(
        (status = 200, description = "Updated movie", body = ApiResponse<Movie>),
        (status = 403, description = "Admin privilege required"),
        (status = 404, description = "Movie not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
pub async fn update_movie(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateMovieRequest>,
) -> AppResult<Json<ApiResponse<Movie>>> {
    let resp = movie_service::update_movie(&state, &user, id, payload).await?;

    if let Err(err) = state.cache.clear_all().await {
        tracing::warn!(error = %err, "cache invalidation failed");
    }
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/movies/{id}",
    params(
        ("id" = i32, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Deleted movie"),
        (status = 403, description = "Admin privilege required"),
        (status = 404, description = "Movie not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
pub async fn delete_movie(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = movie_service::delete_movie(&state, &user, id).await?;

    if let Err(err) = state.cache.clear_all().await {
        tracing::warn!(error = %err, "cache invalidation failed");
    }
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/movies/by-name/{name}",
    params(
        ("name" = String, Path, description = "Movie name; first match wins")
    ),
    responses(
        (status = 200, description = "Get movie", body = ApiResponse<Movie>),
        (status = 404, description = "Movie not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
pub async fn get_movie_by_name(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(name): Path<String>,
) -> AppResult<Json<ApiResponse<Movie>>> {
    let key = CacheService::movie_name_key(&name);
    match state.cache.get::<ApiResponse<Movie>>(&key).await {
        Ok(Some(cached)) => return Ok(Json(cached)),
        Ok(None) => {}
        Err(err) => tracing::warn!(error = %err, "cache read failed"),
    }

    let resp = movie_service::get_movie_by_name(&state, &name).await?;

    if let Err(err) = state.cache.set(&key, &resp).await {
        tracing::warn!(error = %err, "cache write failed");
    }
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/movies/by-name/{name}",
    params(
        ("name" = String, Path, description = "Movie name; first match wins")
    ),
    request_body = UpdateMovieRequest,
    responses(
        (status = 200, description = "Updated movie", body = ApiResponse<Movie>),
        (status = 403, description = "Admin privilege required"),
        (status = 404, description = "Movie not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
pub async fn update_movie_by_name(
    State(state): State<AppState>,
    user: AuthUser,
    Path(name): Path<String>,
    Json(payload): Json<UpdateMovieRequest>,
) -> AppResult<Json<ApiResponse<Movie>>> {
    let resp = movie_service::update_movie_by_name(&state, &user, &name, payload).await?;

    if let Err(err) = state.cache.clear_all().await {
        tracing::warn!(error = %err, "cache invalidation failed");
    }
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/movies/by-name/{name}",
    params(
        ("name" = String, Path, description = "Movie name; first match wins")
    ),
    responses(
        (status = 200, description = "Deleted movie"),
        (status = 403, description = "Admin privilege required"),
        (status = 404, description = "Movie not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
pub async fn delete_movie_by_name(
    State(state): State<AppState>,
    user: AuthUser,
    Path(name): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = movie_service::delete_movie_by_name(&state, &user, &name).await?;

    if let Err(err) = state.cache.clear_all().await {
        tracing::warn!(error = %err, "cache invalidation failed");
    }
    Ok(Json(resp))
}
