//! DTOs for the per-user URL endpoints.

use serde::{Deserialize, Serialize};

use crate::application::services::UserUrl;

/// One element of the `GET /api/user/urls` response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserUrlItem {
    pub short_url: String,
    pub original_url: String,
}

impl From<UserUrl> for UserUrlItem {
    fn from(url: UserUrl) -> Self {
        Self {
            short_url: url.short_url,
            original_url: url.original_url,
        }
    }
}

/// `DELETE /api/user/urls` request body: a bare array of short codes.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct DeleteUrlsRequest {
    pub codes: Vec<String>,
}
