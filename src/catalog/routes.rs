// Routed catalog endpoints
//
// One documented handler per collection route. Each delegates to the generic
// handler in `handlers.rs` for its document type.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthenticatedUser;
use crate::catalog::handlers::{
    create_document, delete_document, get_document, list_documents, update_document,
};
use crate::catalog::models::{
    Comment, Movie, Stored, Theater, UpdateComment, UpdateMovie, UpdateTheater,
};
use crate::catalog::store::Collection;
use crate::error::ApiError;
use crate::models::ApiResponse;
use crate::query::ListParams;

type Listed<D> = Result<Json<ApiResponse<Vec<Stored<D>>>>, ApiError>;
type Single<D> = Result<Json<ApiResponse<Stored<D>>>, ApiError>;
type Created<D> = Result<(StatusCode, Json<ApiResponse<Stored<D>>>), ApiError>;
type Deleted = Result<Json<ApiResponse<()>>, ApiError>;

// ---------------------------------------------------------------------------
// Movies
// ---------------------------------------------------------------------------

/// Handler for GET /api/movies
#[utoipa::path(
    get,
    path = "/api/movies",
    params(ListParams),
    responses(
        (status = 200, description = "Page of movies, in `data`", body = [Movie]),
        (status = 400, description = "Invalid pagination", body = String, example = json!({"status": 400, "message": "Invalid query parameters", "error": "limit must not exceed 100"}))
    ),
    tag = "movies"
)]
pub async fn list_movies(
    store: State<Collection<Movie>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Listed<Movie> {
    list_documents(store, params).await
}

/// Handler for POST /api/movies
#[utoipa::path(
    post,
    path = "/api/movies",
    request_body = Movie,
    responses(
        (status = 201, description = "Movie created, in `data`", body = Movie),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "movies"
)]
pub async fn create_movie(
    store: State<Collection<Movie>>,
    user: AuthenticatedUser,
    body: Json<Movie>,
) -> Created<Movie> {
    create_document(store, user, body).await
}

/// Handler for GET /api/movies/:id
#[utoipa::path(
    get,
    path = "/api/movies/{id}",
    params(("id" = String, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Movie found, in `data`", body = Movie),
        (status = 400, description = "Malformed id", body = String, example = json!({"status": 400, "message": "Invalid movie ID", "error": "ID format is incorrect"})),
        (status = 404, description = "Movie not found", body = String, example = json!({"status": 404, "message": "Movie not found", "error": "No movie found with the given ID"}))
    ),
    tag = "movies"
)]
pub async fn get_movie(store: State<Collection<Movie>>, id: Path<String>) -> Single<Movie> {
    get_document(store, id).await
}

/// Handler for PUT /api/movies/:id
#[utoipa::path(
    put,
    path = "/api/movies/{id}",
    params(("id" = String, Path, description = "Movie id")),
    request_body = UpdateMovie,
    responses(
        (status = 200, description = "Movie updated, in `data`", body = Movie),
        (status = 400, description = "Malformed id or invalid input"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Movie not found")
    ),
    tag = "movies"
)]
pub async fn update_movie(
    store: State<Collection<Movie>>,
    user: AuthenticatedUser,
    id: Path<String>,
    patch: Json<UpdateMovie>,
) -> Single<Movie> {
    update_document(store, user, id, patch).await
}

/// Handler for DELETE /api/movies/:id
#[utoipa::path(
    delete,
    path = "/api/movies/{id}",
    params(("id" = String, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Movie deleted"),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Movie not found")
    ),
    tag = "movies"
)]
pub async fn delete_movie(
    store: State<Collection<Movie>>,
    user: AuthenticatedUser,
    id: Path<String>,
) -> Deleted {
    delete_document(store, user, id).await
}

// ---------------------------------------------------------------------------
// Comments (listing by movie lives in handlers::list_comments)
// ---------------------------------------------------------------------------

/// Handler for POST /api/movies/comments
#[utoipa::path(
    post,
    path = "/api/movies/comments",
    request_body = Comment,
    responses(
        (status = 201, description = "Comment created, in `data`", body = Comment),
        (status = 400, description = "Invalid input data or malformed movie_id"),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "comments"
)]
pub async fn create_comment(
    store: State<Collection<Comment>>,
    user: AuthenticatedUser,
    body: Json<Comment>,
) -> Created<Comment> {
    create_document(store, user, body).await
}

/// Handler for GET /api/movies/comments/:id
#[utoipa::path(
    get,
    path = "/api/movies/comments/{id}",
    params(("id" = String, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment found, in `data`", body = Comment),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments"
)]
pub async fn get_comment(store: State<Collection<Comment>>, id: Path<String>) -> Single<Comment> {
    get_document(store, id).await
}

/// Handler for PUT /api/movies/comments/:id
#[utoipa::path(
    put,
    path = "/api/movies/comments/{id}",
    params(("id" = String, Path, description = "Comment id")),
    request_body = UpdateComment,
    responses(
        (status = 200, description = "Comment updated, in `data`", body = Comment),
        (status = 400, description = "Malformed id or invalid input"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments"
)]
pub async fn update_comment(
    store: State<Collection<Comment>>,
    user: AuthenticatedUser,
    id: Path<String>,
    patch: Json<UpdateComment>,
) -> Single<Comment> {
    update_document(store, user, id, patch).await
}

/// Handler for DELETE /api/movies/comments/:id
#[utoipa::path(
    delete,
    path = "/api/movies/comments/{id}",
    params(("id" = String, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    store: State<Collection<Comment>>,
    user: AuthenticatedUser,
    id: Path<String>,
) -> Deleted {
    delete_document(store, user, id).await
}

// ---------------------------------------------------------------------------
// Theaters
// ---------------------------------------------------------------------------

/// Handler for GET /api/theaters
#[utoipa::path(
    get,
    path = "/api/theaters",
    params(ListParams),
    responses(
        (status = 200, description = "Page of theaters, in `data`", body = [Theater]),
        (status = 400, description = "Invalid pagination")
    ),
    tag = "theaters"
)]
pub async fn list_theaters(
    store: State<Collection<Theater>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Listed<Theater> {
    list_documents(store, params).await
}

/// Handler for POST /api/theaters
#[utoipa::path(
    post,
    path = "/api/theaters",
    request_body = Theater,
    responses(
        (status = 201, description = "Theater created, in `data`", body = Theater),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "theaters"
)]
pub async fn create_theater(
    store: State<Collection<Theater>>,
    user: AuthenticatedUser,
    body: Json<Theater>,
) -> Created<Theater> {
    create_document(store, user, body).await
}

/// Handler for GET /api/theaters/:id
#[utoipa::path(
    get,
    path = "/api/theaters/{id}",
    params(("id" = String, Path, description = "Theater id")),
    responses(
        (status = 200, description = "Theater found, in `data`", body = Theater),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Theater not found")
    ),
    tag = "theaters"
)]
pub async fn get_theater(store: State<Collection<Theater>>, id: Path<String>) -> Single<Theater> {
    get_document(store, id).await
}

/// Handler for PUT /api/theaters/:id
#[utoipa::path(
    put,
    path = "/api/theaters/{id}",
    params(("id" = String, Path, description = "Theater id")),
    request_body = UpdateTheater,
    responses(
        (status = 200, description = "Theater updated, in `data`", body = Theater),
        (status = 400, description = "Malformed id or invalid input"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Theater not found")
    ),
    tag = "theaters"
)]
pub async fn update_theater(
    store: State<Collection<Theater>>,
    user: AuthenticatedUser,
    id: Path<String>,
    patch: Json<UpdateTheater>,
) -> Single<Theater> {
    update_document(store, user, id, patch).await
}

/// Handler for DELETE /api/theaters/:id
#[utoipa::path(
    delete,
    path = "/api/theaters/{id}",
    params(("id" = String, Path, description = "Theater id")),
    responses(
        (status = 200, description = "Theater deleted"),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Theater not found")
    ),
    tag = "theaters"
)]
pub async fn delete_theater(
    store: State<Collection<Theater>>,
    user: AuthenticatedUser,
    id: Path<String>,
) -> Deleted {
    delete_document(store, user, id).await
}
