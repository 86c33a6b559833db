//! JSON-backed list of image URLs stored in a single column.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Ordered list of uploaded image URLs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct ImageList(pub Vec<String>);

impl From<Vec<String>> for ImageList {
    fn from(urls: Vec<String>) -> Self {
        Self(urls)
    }
}
