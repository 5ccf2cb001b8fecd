use axum_movies_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{favorites::AddFavoriteRequest, movies::CreateMovieRequest},
    entity::{Favorites, favorites, users},
    error::AppError,
    middleware::auth::AuthUser,
    routes::params::Pagination,
    services::{cache_service::CacheService, favorite_service, movie_service},
    state::AppState,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    Statement,
};

// Integration flow: a user favorites movies by id, hits the duplicate guard,
// and removes favorites by the (non-unique) movie name.
#[tokio::test]
async fn favorites_add_conflict_and_remove_by_name_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let Some(state) = setup_state().await? else {
        eprintln!(
            "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
        );
        return Ok(());
    };

    let fan_row = users::ActiveModel {
        email: Set("fan@example.com".into()),
        password_hash: Set("dummy".into()),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;
    let fan = AuthUser {
        user_id: fan_row.id,
        email: fan_row.email.clone(),
        is_admin: false,
    };
    let admin = AuthUser {
        user_id: 0,
        email: "admin@example.com".into(),
        is_admin: true,
    };

    // Two movies share a name on purpose; removal is keyed by name.
    let solaris_72 = create_movie(&state, &admin, "Solaris", "Tarkovsky", 8.1, 79.0).await?;
    let solaris_02 = create_movie(&state, &admin, "Solaris", "Soderbergh", 6.2, 71.0).await?;
    let alien = create_movie(&state, &admin, "Alien", "Scott", 8.5, 84.0).await?;

    // Adding by id returns the movie with its genres attached.
    let resp = favorite_service::add_favorite(
        &state.pool,
        &fan,
        AddFavoriteRequest {
            movie_id: solaris_72,
        },
    )
    .await?;
    let favorited = resp.data.expect("favorited movie");
    assert_eq!(favorited.id, solaris_72);
    assert_eq!(favorited.genres.len(), 1);

    // A second identical add is rejected, and the pair stays unique.
    let err = favorite_service::add_favorite(
        &state.pool,
        &fan,
        AddFavoriteRequest {
            movie_id: solaris_72,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let pair_count = Favorites::find()
        .filter(favorites::Column::UserId.eq(fan.user_id))
        .filter(favorites::Column::MovieId.eq(solaris_72))
        .count(&state.orm)
        .await?;
    assert_eq!(pair_count, 1);

    // Unknown movie and unknown user are both NotFound.
    let err = favorite_service::add_favorite(
        &state.pool,
        &fan,
        AddFavoriteRequest { movie_id: 999_999 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let ghost = AuthUser {
        user_id: 999_999,
        email: "ghost@example.com".into(),
        is_admin: false,
    };
    let err = favorite_service::add_favorite(
        &state.pool,
        &ghost,
        AddFavoriteRequest {
            movie_id: solaris_72,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    favorite_service::add_favorite(
        &state.pool,
        &fan,
        AddFavoriteRequest {
            movie_id: solaris_02,
        },
    )
    .await?;
    favorite_service::add_favorite(&state.pool, &fan, AddFavoriteRequest { movie_id: alien })
        .await?;

    let resp = favorite_service::list_favorites(
        &state.pool,
        &fan,
        Pagination {
            page: None,
            per_page: None,
        },
    )
    .await?;
    assert_eq!(resp.meta.expect("meta").total, Some(3));

    // Removing by name drops every favorite sharing it in one go.
    favorite_service::remove_favorite(&state.pool, &fan, "Solaris").await?;
    let remaining = Favorites::find()
        .filter(favorites::Column::UserId.eq(fan.user_id))
        .count(&state.orm)
        .await?;
    assert_eq!(remaining, 1);

    // Nothing left under that name: NotFound.
    let err = favorite_service::remove_favorite(&state.pool, &fan, "Solaris")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

async fn create_movie(
    state: &AppState,
    admin: &AuthUser,
    name: &str,
    director: &str,
    imdb_score: f64,
    popularity: f64,
) -> anyhow::Result<i32> {
    let resp = movie_service::create_movie(
        state,
        admin,
        CreateMovieRequest {
            name: name.into(),
            director: director.into(),
            imdb_score,
            popularity,
            genres: vec!["Sci-Fi".into()],
        },
    )
    .await?;
    Ok(resp.data.expect("created movie").id)
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => return Ok(None),
        };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE favorites, movie_genres, movies, genres, users, admins RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(Some(AppState {
        pool,
        orm,
        cache: CacheService::disabled(),
    }))
}
