use axum_movies_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::movies::{CreateMovieRequest, UpdateMovieRequest},
    entity::{Genres, MovieGenres, genres, movie_genres},
    error::AppError,
    middleware::auth::AuthUser,
    routes::params::{MovieSearchQuery, Pagination},
    services::{cache_service::CacheService, movie_service},
    state::AppState,
};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Statement};

// Integration flow: admin builds up a small catalog, then the search, update
// and delete contracts are exercised against it.
#[tokio::test]
async fn catalog_crud_search_and_pagination_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let Some(state) = setup_state().await? else {
        eprintln!(
            "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
        );
        return Ok(());
    };

    let admin = AuthUser {
        user_id: 1,
        email: "admin@example.com".into(),
        is_admin: true,
    };
    let viewer = AuthUser {
        user_id: 2,
        email: "user@example.com".into(),
        is_admin: false,
    };

    // An empty catalog lists as NotFound rather than an empty page.
    let err = movie_service::list_movies(&state, default_pagination())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Create returns the generated id and both genre objects.
    let resp = movie_service::create_movie(
        &state,
        &admin,
        CreateMovieRequest {
            name: "Inception".into(),
            director: "Nolan".into(),
            imdb_score: 8.8,
            popularity: 87.0,
            genres: vec!["Sci-Fi".into(), "Thriller".into()],
        },
    )
    .await?;
    let inception = resp.data.expect("created movie");
    assert!(inception.id > 0);
    assert_eq!(inception.genres.len(), 2);

    // Creation is gated on the admin flag.
    let err = movie_service::create_movie(
        &state,
        &viewer,
        CreateMovieRequest {
            name: "Bootleg".into(),
            director: "Nobody".into(),
            imdb_score: 1.0,
            popularity: 1.0,
            genres: vec![],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Whitespace variants of the same genre collapse to one row, and an
    // existing genre is reused rather than duplicated.
    let resp = movie_service::create_movie(
        &state,
        &admin,
        CreateMovieRequest {
            name: "Heat".into(),
            director: "Mann".into(),
            imdb_score: 8.3,
            popularity: 92.0,
            genres: vec!["Thriller".into(), " Drama".into(), "Drama ".into()],
        },
    )
    .await?;
    let heat = resp.data.expect("created movie");
    assert_eq!(heat.genres.len(), 2);

    let drama_rows = Genres::find()
        .filter(genres::Column::Name.eq("Drama"))
        .count(&state.orm)
        .await?;
    assert_eq!(drama_rows, 1);

    // A sequential create referencing "Drama" again resolves to the same row.
    let heat_drama_id = heat
        .genres
        .iter()
        .find(|g| g.name == "Drama")
        .expect("drama genre")
        .id;
    let resp = movie_service::create_movie(
        &state,
        &admin,
        CreateMovieRequest {
            name: "Magnolia".into(),
            director: "Anderson".into(),
            imdb_score: 8.0,
            popularity: 85.0,
            genres: vec!["Drama".into()],
        },
    )
    .await?;
    let magnolia = resp.data.expect("created movie");
    assert_eq!(magnolia.genres[0].id, heat_drama_id);

    // Genre + rating search: conjunction of filters, disjunction inside genres.
    let resp = movie_service::search_movies(
        &state,
        MovieSearchQuery {
            min_rating: Some(8.0),
            genres: Some("Thriller".into()),
            ..empty_query()
        },
    )
    .await?;
    let found = resp.data.expect("search results");
    assert!(found.items.iter().any(|m| m.name == "Inception"));
    assert!(found.items.iter().all(|m| {
        m.imdb_score >= 8.0 && m.genres.iter().any(|g| g.name == "Thriller")
    }));
    assert!(
        found
            .items
            .windows(2)
            .all(|w| w[0].popularity <= w[1].popularity),
        "results must be ordered by ascending popularity"
    );

    // Multi-genre disjunction: either name qualifies a movie.
    let resp = movie_service::search_movies(
        &state,
        MovieSearchQuery {
            genres: Some("Sci-Fi,Drama".into()),
            ..empty_query()
        },
    )
    .await?;
    assert_eq!(resp.meta.expect("meta").total, Some(3));

    // Case-insensitive substring match on name and director.
    let resp = movie_service::search_movies(
        &state,
        MovieSearchQuery {
            name: Some("incep".into()),
            ..empty_query()
        },
    )
    .await?;
    assert_eq!(resp.data.expect("search results").items.len(), 1);

    let resp = movie_service::search_movies(
        &state,
        MovieSearchQuery {
            director: Some("MANN".into()),
            ..empty_query()
        },
    )
    .await?;
    assert_eq!(resp.data.expect("search results").items[0].name, "Heat");

    // Exact popularity match.
    let resp = movie_service::search_movies(
        &state,
        MovieSearchQuery {
            popularity: Some(92.0),
            ..empty_query()
        },
    )
    .await?;
    assert_eq!(resp.data.expect("search results").items[0].name, "Heat");

    // Inclusive upper bound on the score.
    let resp = movie_service::search_movies(
        &state,
        MovieSearchQuery {
            max_rating: Some(8.5),
            ..empty_query()
        },
    )
    .await?;
    let capped = resp.data.expect("search results");
    assert!(capped.items.iter().all(|m| m.imdb_score <= 8.5));
    assert!(!capped.items.iter().any(|m| m.name == "Inception"));

    // A criteria set nothing matches is NotFound, not an empty page.
    let err = movie_service::search_movies(
        &state,
        MovieSearchQuery {
            genres: Some("Comedy".into()),
            ..empty_query()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // total counts every matching row, not just the returned page.
    let resp = movie_service::search_movies(
        &state,
        MovieSearchQuery {
            min_rating: Some(8.0),
            per_page: Some(1),
            ..empty_query()
        },
    )
    .await?;
    let meta = resp.meta.expect("meta");
    assert_eq!(meta.total, Some(3));
    assert_eq!(resp.data.expect("search results").items.len(), 1);

    // Patch without a genres key keeps the association set.
    let resp = movie_service::update_movie(
        &state,
        &admin,
        inception.id,
        UpdateMovieRequest {
            name: None,
            director: Some("Christopher Nolan".into()),
            imdb_score: None,
            popularity: None,
            genres: None,
        },
    )
    .await?;
    let updated = resp.data.expect("updated movie");
    assert_eq!(updated.director, "Christopher Nolan");
    assert_eq!(updated.genres.len(), 2);

    // Patch with a genres key replaces the set wholesale.
    let resp = movie_service::update_movie(
        &state,
        &admin,
        inception.id,
        UpdateMovieRequest {
            name: None,
            director: None,
            imdb_score: None,
            popularity: None,
            genres: Some(vec!["Mystery".into()]),
        },
    )
    .await?;
    let updated = resp.data.expect("updated movie");
    assert_eq!(updated.genres.len(), 1);
    assert_eq!(updated.genres[0].name, "Mystery");

    // Name lookup returns the first stored match.
    let resp = movie_service::get_movie_by_name(&state, "Heat").await?;
    assert_eq!(resp.data.expect("movie").id, heat.id);

    // Deleting a movie drops its association rows with it.
    movie_service::delete_movie(&state, &admin, heat.id).await?;
    let leftover_links = MovieGenres::find()
        .filter(movie_genres::Column::MovieId.eq(heat.id))
        .count(&state.orm)
        .await?;
    assert_eq!(leftover_links, 0);

    let err = movie_service::get_movie(&state, heat.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    movie_service::delete_movie_by_name(&state, &admin, "Magnolia").await?;
    let err = movie_service::get_movie_by_name(&state, "Magnolia")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

fn default_pagination() -> Pagination {
    Pagination {
        page: None,
        per_page: None,
    }
}

fn empty_query() -> MovieSearchQuery {
    MovieSearchQuery {
        page: None,
        per_page: None,
        name: None,
        director: None,
        min_rating: None,
        max_rating: None,
        popularity: None,
        genres: None,
    }
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
