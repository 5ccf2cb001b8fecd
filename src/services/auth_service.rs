use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;

use crate::{
    db::DbPool,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    error::{AppError, AppResult},
    models::{Admin, User},
    response::{ApiResponse, Meta},
};

#[derive(Debug, sqlx::FromRow)]
struct Credentials {
    id: i32,
    email: String,
    password_hash: String,
}

pub async fn register_user(
    pool: &DbPool,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest { email, password } = payload;
    let exist: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;

    if exist.is_some() {
        return Err(AppError::Conflict(
            "A user with that email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&password)?;

    let user: User = sqlx::query_as(
        "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id, email, created_at",
    )
    .bind(email.as_str())
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success("User created", user, None))
}

pub async fn login_user(
    pool: &DbPool,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let record: Option<Credentials> =
        sqlx::query_as("SELECT id, email, password_hash FROM users WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(pool)
            .await?;

    let record = match record {
        Some(r) => r,
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    verify_password(&password, &record.password_hash)?;
    let access_token = issue_token(&record, false)?;

    Ok(ApiResponse::success(
        "Login successful",
        LoginResponse { access_token },
        Some(Meta::empty()),
    ))
}

pub async fn register_admin(
    pool: &DbPool,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<Admin>> {
    let RegisterRequest { email, password } = payload;
    let exist: Option<(i32,)> = sqlx::query_as("SELECT id FROM admins WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;

    if exist.is_some() {
        return Err(AppError::Conflict(
            "An admin with that email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&password)?;

    let admin: Admin = sqlx::query_as(
        "INSERT INTO admins (email, password_hash) VALUES ($1, $2) RETURNING id, email, is_admin, created_at",
    )
    .bind(email.as_str())
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success("Admin created", admin, None))
}

pub async fn login_admin(
    pool: &DbPool,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let record: Option<Credentials> =
        sqlx::query_as("SELECT id, email, password_hash FROM admins WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(pool)
            .await?;

    let record = match record {
        Some(r) => r,
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    verify_password(&password, &record.password_hash)?;
    let access_token = issue_token(&record, true)?;

    Ok(ApiResponse::success(
        "Login successful",
        LoginResponse { access_token },
        Some(Meta::empty()),
    ))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(password_hash)
}

fn verify_password(password: &str, stored_hash: &str) -> AppResult<()> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }
    Ok(())
}

fn issue_token(record: &Credentials, is_admin: bool) -> AppResult<String> {
    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(1))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: record.email.clone(),
        uid: record.id,
        is_admin,
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok(token)
}
