//! DTOs for the shortening endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// `POST /api/shorten` request body.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    #[validate(length(min = 1, message = "URL must not be empty"))]
    pub url: String,
}

/// `POST /api/shorten` response body, used for both `201` and `409`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShortenResponse {
    pub result: String,
}

/// `POST /api/shorten/batch` request body.
#[derive(Debug, Deserialize, Validate)]
#[serde(transparent)]
pub struct BatchShortenRequest {
    #[validate(length(min = 1, message = "Batch must not be empty"), nested)]
    pub items: Vec<BatchRequestItem>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BatchRequestItem {
    pub correlation_id: String,
    #[validate(length(min = 1, message = "URL must not be empty"))]
    pub original_url: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchResponseItem {
    pub correlation_id: String,
    pub short_url: String,
}
