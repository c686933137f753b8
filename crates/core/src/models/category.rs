use serde::{Deserialize, Serialize};

use crate::types::ResourceId;

/// A course / blog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: ResourceId,
    pub name: String,
}
