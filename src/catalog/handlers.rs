// HTTP handlers for catalog collections
//
// The CRUD handlers are generic over the document type and are mounted once
// per collection, e.g. `get(get_document::<Movie>)`.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use serde_json::Value;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::catalog::models::{Comment, Document, Movie, Stored};
use crate::catalog::store::{Collection, FieldFilter};
use crate::error::ApiError;
use crate::models::ApiResponse;
use crate::query::{ListParams, QueryValidator};
use crate::validation::parse_document_id;

/// Query parameters for listing the comments of one movie
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommentListParams {
    /// Id of the movie whose comments are listed (required)
    #[serde(rename = "idMovie")]
    pub id_movie: Option<String>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<u32>,
    /// Items per page (defaults to 10, at most 100)
    pub limit: Option<u32>,
}

fn parse_list_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))
}

/// Handler for GET /api/{collection}
pub async fn list_documents<D: Document>(
    State(store): State<Collection<D>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Stored<D>>>>, ApiError> {
    let page = QueryValidator::validate(parse_list_params(params)?)
        .map_err(|e| ApiError::InvalidQuery(e.message))?;

    let documents = store.list(None, page).await?;
    Ok(Json(ApiResponse::ok(documents)))
}

/// Handler for GET /api/{collection}/:id
pub async fn get_document<D: Document>(
    State(store): State<Collection<D>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Stored<D>>>, ApiError> {
    let id = parse_document_id(&id, D::RESOURCE)?;

    let document = store
        .find(id)
        .await?
        .ok_or(ApiError::NotFound { resource: D::RESOURCE })?;

    Ok(Json(ApiResponse::ok(document)))
}

/// Handler for POST /api/{collection}
pub async fn create_document<D: Document>(
    State(store): State<Collection<D>>,
    user: AuthenticatedUser,
    Json(document): Json<D>,
) -> Result<(StatusCode, Json<ApiResponse<Stored<D>>>), ApiError> {
    document.validate()?;

    let stored = store.insert(document.normalize()).await?;
    tracing::info!("{} {} created by {}", D::RESOURCE, stored.id, user.username);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            StatusCode::CREATED,
            format!("{} created", D::RESOURCE),
            stored,
        )),
    ))
}

/// Handler for PUT /api/{collection}/:id
/// Only the fields present in the body are changed
pub async fn update_document<D: Document>(
    State(store): State<Collection<D>>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(patch): Json<D::Patch>,
) -> Result<Json<ApiResponse<Stored<D>>>, ApiError> {
    let id = parse_document_id(&id, D::RESOURCE)?;
    patch.validate()?;

    let fields = match serde_json::to_value(&patch)? {
        Value::Object(fields) => fields,
        _ => return Err(ApiError::InternalError("Patch is not an object".to_string())),
    };

    let updated = store
        .update(id, fields)
        .await?
        .ok_or(ApiError::NotFound { resource: D::RESOURCE })?;

    Ok(Json(ApiResponse::with_message(
        StatusCode::OK,
        format!("{} updated successfully", D::RESOURCE),
        updated,
    )))
}

/// Handler for DELETE /api/{collection}/:id
pub async fn delete_document<D: Document>(
    State(store): State<Collection<D>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_document_id(&id, D::RESOURCE)?;

    if !store.delete(id).await? {
        return Err(ApiError::NotFound { resource: D::RESOURCE });
    }
    tracing::info!("{} {} deleted by {}", D::RESOURCE, id, user.username);

    Ok(Json(ApiResponse::message(
        StatusCode::OK,
        format!("{} deleted successfully", D::RESOURCE),
    )))
}

/// Handler for GET /api/movies/comments?idMovie=
#[utoipa::path(
    get,
    path = "/api/movies/comments",
    params(CommentListParams),
    responses(
        (status = 200, description = "Comments of the movie, in `data`", body = [Comment]),
        (status = 400, description = "Missing or malformed idMovie, or bad pagination", body = String, example = json!({"status": 400, "message": "Invalid movie ID", "error": "ID format is incorrect"}))
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(store): State<Collection<Comment>>,
    params: Result<Query<CommentListParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Stored<Comment>>>>, ApiError> {
    let params = parse_list_params(params)?;

    let movie_id = params
        .id_movie
        .as_deref()
        .ok_or(ApiError::InvalidId { resource: Movie::RESOURCE })
        .and_then(|raw| parse_document_id(raw, Movie::RESOURCE))?;

    let page = QueryValidator::validate(ListParams {
        page: params.page,
        limit: params.limit,
    })
    .map_err(|e| ApiError::InvalidQuery(e.message))?;

    let comments = store
        .list(Some(FieldFilter::new("movie_id", movie_id.to_string())), page)
        .await?;

    Ok(Json(ApiResponse::with_message(
        StatusCode::OK,
        "Comments fetched successfully",
        comments,
    )))
}
