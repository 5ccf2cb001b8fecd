use std::collections::HashMap;

use crate::{
    db::DbPool,
    dto::favorites::{AddFavoriteRequest, FavoriteMovieList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Genre, Movie, MovieRow},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

pub async fn list_favorites(
    pool: &DbPool,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<FavoriteMovieList>> {
    let (page, per_page, offset) = pagination.normalize();
    let rows = sqlx::query_as::<_, MovieRow>(
        r#"
        SELECT m.id, m.name, m.director, m.imdb_score, m.popularity
        FROM favorites f
        JOIN movies m ON m.id = f.movie_id
        WHERE f.user_id = $1
        ORDER BY m.popularity ASC, m.id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorites WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(pool)
        .await?;

    let items = attach_genres(pool, rows).await?;

    let meta = Meta::new(page, per_page, total.0);
    let data = FavoriteMovieList { items };
    Ok(ApiResponse::success("Favorites", data, Some(meta)))
}

/// Add a movie to the user's favorites by id. A pair that already exists is
/// rejected with Conflict rather than silently accepted.
pub async fn add_favorite(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddFavoriteRequest,
) -> AppResult<ApiResponse<Movie>> {
    let user_exists: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(pool)
        .await?;
    if user_exists.is_none() {
        return Err(AppError::NotFound);
    }

    let movie: Option<MovieRow> = sqlx::query_as(
        "SELECT id, name, director, imdb_score, popularity FROM movies WHERE id = $1",
    )
    .bind(payload.movie_id)
    .fetch_optional(pool)
    .await?;
    let movie = match movie {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };

    let existing: Option<(i32,)> =
        sqlx::query_as("SELECT movie_id FROM favorites WHERE user_id = $1 AND movie_id = $2")
            .bind(user.user_id)
            .bind(movie.id)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Movie is already in favorites".into()));
    }

    sqlx::query("INSERT INTO favorites (user_id, movie_id) VALUES ($1, $2)")
        .bind(user.user_id)
        .bind(movie.id)
        .execute(pool)
        .await?;

    let genres = genres_for(pool, movie.id).await?;
    Ok(ApiResponse::success(
        "Added to favorites",
        movie.into_movie(genres),
        Some(Meta::empty()),
    ))
}

/// Remove favorites by movie name, the user-facing identifier. Name is not
/// unique, so this drops every favorite of the user's that carries it.
pub async fn remove_favorite(
    pool: &DbPool,
    user: &AuthUser,
    movie_name: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query(
        r#"
        DELETE FROM favorites f
        USING movies m
        WHERE m.id = f.movie_id AND f.user_id = $1 AND m.name = $2
        "#,
    )
    .bind(user.user_id)
    .bind(movie_name)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Removed from favorites",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn genres_for(pool: &DbPool, movie_id: i32) -> AppResult<Vec<Genre>> {
    let genres = sqlx::query_as::<_, Genre>(
        r#"
        SELECT g.id, g.name
        FROM movie_genres mg
        JOIN genres g ON g.id = mg.genre_id
        WHERE mg.movie_id = $1
        ORDER BY g.id
        "#,
    )
    .bind(movie_id)
    .fetch_all(pool)
    .await?;
    Ok(genres)
}

async fn attach_genres(pool: &DbPool, rows: Vec<MovieRow>) -> AppResult<Vec<Movie>> {
    #[derive(sqlx::FromRow)]
    struct GenreRow {
        movie_id: i32,
        id: i32,
        name: String,
    }

    let ids: Vec<i32> = rows.iter().map(|m| m.id).collect();
    let genre_rows: Vec<GenreRow> = sqlx::query_as(
        r#"
        SELECT mg.movie_id, g.id, g.name
        FROM movie_genres mg
        JOIN genres g ON g.id = mg.genre_id
        WHERE mg.movie_id = ANY($1)
        ORDER BY g.id
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_movie: HashMap<i32, Vec<Genre>> = HashMap::new();
    for row in genre_rows {
        by_movie.entry(row.movie_id).or_default().push(Genre {
            id: row.id,
            name: row.name,
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let genres = by_movie.remove(&row.id).unwrap_or_default();
            row.into_movie(genres)
        })
        .collect())
}
