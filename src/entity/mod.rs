pub mod admins;
pub mod favorites;
pub mod genres;
pub mod movie_genres;
pub mod movies;
pub mod users;

pub use admins::Entity as Admins;
pub use favorites::Entity as Favorites;
pub use genres::Entity as Genres;
pub use movie_genres::Entity as MovieGenres;
pub use movies::Entity as Movies;
pub use users::Entity as Users;
