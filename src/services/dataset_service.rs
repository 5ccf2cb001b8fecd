use sea_orm::{ConnectionTrait, Statement, TransactionTrait};
use serde::Deserialize;
use tokio::fs;

use crate::{
    dto::movies::CreateMovieRequest,
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    services::movie_service,
    state::AppState,
};

pub const SAMPLE_DATA_PATH: &str = "data/imdb.json";

/// One record of the bundled IMDB sample dataset. Genre names in the file
/// carry stray whitespace, which the shared resolution path trims.
#[derive(Debug, Deserialize)]
struct SampleRecord {
    name: String,
    director: String,
    imdb_score: f64,
    #[serde(rename = "99popularity")]
    popularity: f64,
    genre: Vec<String>,
}

/// Load the sample dataset through the same insert and genre-resolution path
/// as the live create endpoint, in one transaction.
pub async fn load_sample_data(
    state: &AppState,
    path: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|err| AppError::BadRequest(format!("Sample data file not readable: {err}")))?;
    let records: Vec<SampleRecord> = serde_json::from_str(&raw)
        .map_err(|err| AppError::BadRequest(format!("Sample data file malformed: {err}")))?;

    let txn = state.orm.begin().await?;
    let mut loaded = 0_usize;
    for record in records {
        movie_service::insert_movie(
            &txn,
            CreateMovieRequest {
                name: record.name,
                director: record.director,
                imdb_score: record.imdb_score,
                popularity: record.popularity,
                genres: record.genre,
            },
        )
        .await?;
        loaded += 1;
    }
    txn.commit().await?;

    tracing::info!(loaded, "sample data loaded");
    Ok(ApiResponse::success(
        "Load success",
        serde_json::json!({ "loaded": loaded }),
        Some(Meta::empty()),
    ))
}

/// Clear every data row without dropping the schema. Children are listed
/// before parents so the order stays FK-safe.
pub async fn clear_data(state: &AppState) -> AppResult<ApiResponse<serde_json::Value>> {
    let backend = state.orm.get_database_backend();
    state
        .orm
        .execute(Statement::from_string(
            backend,
            "TRUNCATE TABLE favorites, movie_genres, movies, genres, users, admins RESTART IDENTITY CASCADE",
        ))
        .await?;

    Ok(ApiResponse::success(
        "Clear success",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
