use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{dto::validation::validate_checklist_item, state::checklist::Checklist};

/// Checklist items with their done flag, in display order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChecklistResponse {
    /// Item name to done flag.
    pub items: IndexMap<String, bool>,
    /// True once every item is done.
    pub done: bool,
}

impl From<&Checklist> for ChecklistResponse {
    fn from(value: &Checklist) -> Self {
        Self {
            items: value.items().clone(),
            done: value.is_done(),
        }
    }
}

/// Body naming a checklist item.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ChecklistItemRequest {
    /// Item name.
    #[validate(custom(function = "validate_checklist_item"))]
    pub item: String,
}

/// Whether every checklist item is done.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChecklistDoneResponse {
    /// Completion flag.
    pub done: bool,
}
