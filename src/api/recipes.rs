use super::client::ApiClient;
use super::error::ApiError;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// A recipe card as the backend serializes it.
///
/// The backend owns these; the client holds a read-through cache that is
/// replaced wholesale on every collection fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    /// Owner's username (read-only on the backend).
    #[serde(default)]
    pub username: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cuisine_type: Option<String>,
    pub ingredients: String,
    pub instructions: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub external_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Cuisine label for display and filtering; empty string when unset.
    pub fn cuisine(&self) -> &str {
        self.cuisine_type.as_deref().unwrap_or("")
    }
}

/// Client-owned create/update body. Optional fields are omitted when
/// empty rather than sent as empty strings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecipeDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine_type: Option<String>,
    pub ingredients: String,
    pub instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
}

impl ApiClient {
    /// Fetches the full recipe collection for the logged-in user.
    ///
    /// The backend returns the caller's own recipes, newest first. Callers
    /// replace their in-memory collection with the result; on error they
    /// clear it instead of keeping stale data.
    pub async fn list_recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        self.get_json("/api/recipes/").await
    }

    /// Fetches a single recipe by id.
    pub async fn get_recipe(&self, id: i64) -> Result<Recipe, ApiError> {
        self.get_json(&format!("/api/recipes/{id}/")).await
    }

    /// Creates a recipe; the backend assigns ownership and timestamps.
    pub async fn create_recipe(&self, draft: &RecipeDraft) -> Result<Recipe, ApiError> {
        self.send_json(Method::POST, "/api/recipes/", draft).await
    }

    /// Partially updates a recipe.
    pub async fn update_recipe(&self, id: i64, draft: &RecipeDraft) -> Result<Recipe, ApiError> {
        self.send_json(Method::PATCH, &format!("/api/recipes/{id}/"), draft)
            .await
    }

    /// Deletes a recipe.
    pub async fn delete_recipe(&self, id: i64) -> Result<(), ApiError> {
        self.send_no_content::<()>(Method::DELETE, &format!("/api/recipes/{id}/"), None)
            .await
    }
}
