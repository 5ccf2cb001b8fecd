use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// Flat movie row as stored; genre associations are attached separately.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MovieRow {
    pub id: i32,
    pub name: String,
    pub director: String,
    pub imdb_score: f64,
    pub popularity: f64,
}

impl MovieRow {
    pub fn into_movie(self, genres: Vec<Genre>) -> Movie {
        Movie {
            id: self.id,
            name: self.name,
            director: self.director,
            imdb_score: self.imdb_score,
            popularity: self.popularity,
            genres,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Movie {
    pub id: i32,
    pub name: String,
    pub director: String,
    pub imdb_score: f64,
    pub popularity: f64,
    pub genres: Vec<Genre>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Admin {
    pub id: i32,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}
