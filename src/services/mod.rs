pub mod auth_service;
pub mod cache_service;
pub mod dataset_service;
pub mod favorite_service;
pub mod movie_service;
