// Catalog module
// Movies, comments and theaters stored as schemaless documents

pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use models::{Comment, Movie, Theater, UpdateComment, UpdateMovie, UpdateTheater};
pub use store::{Collection, PgCollection};
