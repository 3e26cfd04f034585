// Catalog document models

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_document_id, validate_not_blank};

/// A document type stored in its own collection
pub trait Document:
    Serialize + DeserializeOwned + Validate + Clone + Send + Sync + 'static
{
    /// Partial update payload; only provided fields are merged
    type Patch: Serialize + DeserializeOwned + Validate + Send + Sync + 'static;

    /// Collection (table) name
    const COLLECTION: &'static str;

    /// Human-readable resource name used in messages
    const RESOURCE: &'static str;

    /// Canonicalize fields before the document is stored
    fn normalize(self) -> Self {
        self
    }
}

/// A document together with its id, serialized as `{_id, ...fields}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stored<D> {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub document: D,
}

/// Movie document
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "Inception")]
    pub title: String,
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "2010-07-16")]
    pub release_date: String,
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "Science Fiction")]
    pub genre: String,
}

/// Partial movie update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMovie {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_not_blank")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_not_blank")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_not_blank")]
    pub genre: Option<String>,
}

impl Document for Movie {
    type Patch = UpdateMovie;
    const COLLECTION: &'static str = "movies";
    const RESOURCE: &'static str = "Movie";
}

/// Comment on a movie
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct Comment {
    #[validate(custom = "validate_document_id")]
    #[schema(example = "5f0c4a52-8a3e-4c55-9b1d-2a6b1c1f9e10")]
    pub movie_id: String,
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "Super film!")]
    pub text: String,
}

/// Partial comment update; the movie reference cannot change
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateComment {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_not_blank")]
    pub text: Option<String>,
}

impl Document for Comment {
    type Patch = UpdateComment;
    const COLLECTION: &'static str = "comments";
    const RESOURCE: &'static str = "Comment";

    fn normalize(mut self) -> Self {
        // Store the hyphenated lowercase form so filtering by movie matches
        if let Ok(id) = Uuid::parse_str(&self.movie_id) {
            self.movie_id = id.to_string();
        }
        self
    }
}

/// Theater or cinema
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct Theater {
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "Cinéma Paradiso")]
    pub name: String,
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "123 Rue du Cinéma, Paris")]
    pub location: String,
}

/// Partial theater update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTheater {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_not_blank")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_not_blank")]
    pub location: Option<String>,
}

impl Document for Theater {
    type Patch = UpdateTheater;
    const COLLECTION: &'static str = "theaters";
    const RESOURCE: &'static str = "Theater";
}
