use std::collections::HashSet;

use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, LoaderTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    dto::movies::{CreateMovieRequest, MovieList, UpdateMovieRequest},
    entity::{
        genres::{ActiveModel as GenreActive, Column as GenreCol, Entity as Genres,
                 Model as GenreModel},
        movie_genres::{ActiveModel as MovieGenreActive, Column as MovieGenreCol,
                       Entity as MovieGenres},
        movies::{ActiveModel as MovieActive, Column as MovieCol, Entity as Movies,
                 Model as MovieModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Genre, Movie},
    response::{ApiResponse, Meta},
    routes::params::{MovieSearchQuery, Pagination},
    state::AppState,
};

pub async fn list_movies(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<MovieList>> {
    let (page, per_page, offset) = pagination.normalize();
    let finder = Movies::find().order_by_asc(MovieCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;
    if total == 0 {
        // An empty catalog lists as Not Found, matching the search contract.
        return Err(AppError::NotFound);
    }

    let movies = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = with_genres(&state.orm, movies).await?;

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Movies", MovieList { items }, Some(meta)))
}

/// Compose the optional search filters into one query: every provided filter
/// is ANDed, while the comma-separated genre list matches a movie that carries
/// any one of the named genres.
pub async fn search_movies(
    state: &AppState,
    query: MovieSearchQuery,
) -> AppResult<ApiResponse<MovieList>> {
    let (page, per_page, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(name) = query.name.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(MovieCol::Name).ilike(format!("%{name}%")));
    }

    if let Some(director) = query.director.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(MovieCol::Director).ilike(format!("%{director}%")));
    }

    if let Some(min_rating) = query.min_rating {
        condition = condition.add(MovieCol::ImdbScore.gte(min_rating));
    }

    if let Some(max_rating) = query.max_rating {
        condition = condition.add(MovieCol::ImdbScore.lte(max_rating));
    }

    if let Some(popularity) = query.popularity {
        condition = condition.add(MovieCol::Popularity.eq(popularity));
    }

    if let Some(genres) = query.genres.as_ref().filter(|s| !s.is_empty()) {
        let names: Vec<String> = genres
            .split(',')
            .map(|g| g.trim().to_owned())
            .filter(|g| !g.is_empty())
            .collect();
        if !names.is_empty() {
            let movie_ids_with_genre = Query::select()
                .column(MovieGenreCol::MovieId)
                .from(MovieGenres)
                .inner_join(
                    Genres,
                    Expr::col((Genres, GenreCol::Id))
                        .equals((MovieGenres, MovieGenreCol::GenreId)),
                )
                .and_where(GenreCol::Name.is_in(names))
                .to_owned();
            condition = condition.add(MovieCol::Id.in_subquery(movie_ids_with_genre));
        }
    }

    let finder = Movies::find()
        .filter(condition)
        .order_by_asc(MovieCol::Popularity);

    let total = finder.clone().count(&state.orm).await? as i64;
    if total == 0 {
        return Err(AppError::NotFound);
    }

    let movies = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = with_genres(&state.orm, movies).await?;

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Movies", MovieList { items }, Some(meta)))
}

pub async fn get_movie(state: &AppState, id: i32) -> AppResult<ApiResponse<Movie>> {
    let movie = Movies::find_by_id(id).one(&state.orm).await?;
    let movie = match movie {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };
    let genres = movie.find_related(Genres).all(&state.orm).await?;
    Ok(ApiResponse::success("Movie", to_movie(movie, genres), None))
}

/// Name is not unique; this returns the first stored match.
pub async fn get_movie_by_name(state: &AppState, name: &str) -> AppResult<ApiResponse<Movie>> {
    let movie = Movies::find()
        .filter(MovieCol::Name.eq(name))
        .order_by_asc(MovieCol::Id)
        .one(&state.orm)
        .await?;
    let movie = match movie {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };
    let genres = movie.find_related(Genres).all(&state.orm).await?;
    Ok(ApiResponse::success("Movie", to_movie(movie, genres), None))
}

pub async fn create_movie(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMovieRequest,
) -> AppResult<ApiResponse<Movie>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let movie = insert_movie(&txn, payload).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Movie created",
        movie,
        Some(Meta::empty()),
    ))
}

/// Insert one movie and its genre associations. Shared by the create endpoint
/// and the bulk loader so both take the same genre-resolution path.
pub async fn insert_movie(
    conn: &impl ConnectionTrait,
    payload: CreateMovieRequest,
) -> AppResult<Movie> {
    let genres = resolve_genres(conn, &payload.genres).await?;

    let active = MovieActive {
        name: Set(payload.name),
        director: Set(payload.director),
        imdb_score: Set(payload.imdb_score),
        popularity: Set(payload.popularity),
        ..Default::default()
    };
    let movie = active.insert(conn).await?;

    link_genres(conn, movie.id, &genres).await?;
    Ok(to_movie(movie, genres))
}

pub async fn update_movie(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateMovieRequest,
) -> AppResult<ApiResponse<Movie>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let existing = Movies::find_by_id(id).one(&txn).await?;
    let existing = match existing {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };
    let movie = apply_update(&txn, existing, payload).await?;
    txn.commit().await?;

    Ok(ApiResponse::success("Updated", movie, Some(Meta::empty())))
}

pub async fn update_movie_by_name(
    state: &AppState,
    user: &AuthUser,
    name: &str,
    payload: UpdateMovieRequest,
) -> AppResult<ApiResponse<Movie>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let existing = Movies::find()
        .filter(MovieCol::Name.eq(name))
        .order_by_asc(MovieCol::Id)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };
    let movie = apply_update(&txn, existing, payload).await?;
    txn.commit().await?;

    Ok(ApiResponse::success("Updated", movie, Some(Meta::empty())))
}

pub async fn delete_movie(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Movies::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Item deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn delete_movie_by_name(
    state: &AppState,
    user: &AuthUser,
    name: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let movie = Movies::find()
        .filter(MovieCol::Name.eq(name))
        .order_by_asc(MovieCol::Id)
        .one(&state.orm)
        .await?;
    let movie = match movie {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };
    movie.delete(&state.orm).await?;

    Ok(ApiResponse::success(
        "Item deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Get-or-create each trimmed genre name. The upsert makes the lookup safe
/// under concurrent creation referencing the same brand-new name; duplicate
/// names within one payload collapse to a single row.
pub async fn resolve_genres(
    conn: &impl ConnectionTrait,
    names: &[String],
) -> AppResult<Vec<GenreModel>> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for raw in names {
        let name = raw.trim();
        if name.is_empty() || !seen.insert(name.to_owned()) {
            continue;
        }

        Genres::insert(GenreActive {
            name: Set(name.to_owned()),
            ..Default::default()
        })
        .on_conflict(OnConflict::column(GenreCol::Name).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await?;

        let genre = Genres::find()
            .filter(GenreCol::Name.eq(name))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("genre row missing after upsert")))?;
        resolved.push(genre);
    }

    Ok(resolved)
}

async fn apply_update(
    conn: &impl ConnectionTrait,
    existing: MovieModel,
    payload: UpdateMovieRequest,
) -> AppResult<Movie> {
    let movie_id = existing.id;

    let movie = if payload.name.is_none()
        && payload.director.is_none()
        && payload.imdb_score.is_none()
        && payload.popularity.is_none()
    {
        existing
    } else {
        let mut active: MovieActive = existing.into();
        if let Some(name) = payload.name {
            active.name = Set(name);
        }
        if let Some(director) = payload.director {
            active.director = Set(director);
        }
        if let Some(imdb_score) = payload.imdb_score {
            active.imdb_score = Set(imdb_score);
        }
        if let Some(popularity) = payload.popularity {
            active.popularity = Set(popularity);
        }
        active.update(conn).await?
    };

    let genres = match payload.genres {
        // A genres key replaces the whole association set, while the scalar
        // fields above are merge-patched.
        Some(names) => {
            MovieGenres::delete_many()
                .filter(MovieGenreCol::MovieId.eq(movie_id))
                .exec(conn)
                .await?;
            let resolved = resolve_genres(conn, &names).await?;
            link_genres(conn, movie_id, &resolved).await?;
            resolved
        }
        None => movie.find_related(Genres).all(conn).await?,
    };

    Ok(to_movie(movie, genres))
}

async fn link_genres(
    conn: &impl ConnectionTrait,
    movie_id: i32,
    genres: &[GenreModel],
) -> AppResult<()> {
    if genres.is_empty() {
        return Ok(());
    }
    let links = genres.iter().map(|genre| MovieGenreActive {
        movie_id: Set(movie_id),
        genre_id: Set(genre.id),
    });
    MovieGenres::insert_many(links)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn with_genres(
    conn: &impl ConnectionTrait,
    movies: Vec<MovieModel>,
) -> AppResult<Vec<Movie>> {
    let genre_lists = movies
        .load_many_to_many(Genres, MovieGenres, conn)
        .await?;
    Ok(movies
        .into_iter()
        .zip(genre_lists)
        .map(|(movie, genres)| to_movie(movie, genres))
        .collect())
}

fn to_movie(model: MovieModel, genres: Vec<GenreModel>) -> Movie {
    Movie {
        id: model.id,
        name: model.name,
        director: model.director,
        imdb_score: model.imdb_score,
        popularity: model.popularity,
        genres: genres
            .into_iter()
            .map(|g| Genre {
                id: g.id,
                name: g.name,
            })
            .collect(),
    }
}
