use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        favorites::{AddFavoriteRequest, FavoriteMovieList},
        movies::{CreateMovieRequest, MovieList, UpdateMovieRequest},
    },
    models::{Admin, Genre, Movie, User},
    response::{ApiResponse, Meta},
    routes::{admin, dataset, favorites, health, movies, params, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::register,
        users::login,
        admin::register,
        admin::login,
        movies::list_movies,
        movies::search_movies,
        movies::create_movie,
        movies::get_movie,
        movies::update_movie,
        movies::delete_movie,
        movies::get_movie_by_name,
        movies::update_movie_by_name,
        movies::delete_movie_by_name,
        favorites::list_favorites,
        favorites::add_favorite,
        favorites::remove_favorite,
        dataset::load_data,
        dataset::clear_data,
    ),
    components(
        schemas(
            User,
            Admin,
            Movie,
            Genre,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateMovieRequest,
            UpdateMovieRequest,
            MovieList,
            AddFavoriteRequest,
            FavoriteMovieList,
            params::Pagination,
            params::MovieSearchQuery,
            Meta,
            ApiResponse<Movie>,
            ApiResponse<MovieList>,
            ApiResponse<FavoriteMovieList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "User registration and login"),
        (name = "Admin", description = "Admin registration and login"),
        (name = "Movies", description = "Movie catalog endpoints"),
        (name = "Favorites", description = "Favorite endpoints"),
        (name = "Database", description = "Sample data helpers"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
