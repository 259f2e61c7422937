use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockdesk_core::{CategoryId, DomainError, DomainResult, Entity, non_blank};

/// A stored product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn to_draft(&self) -> CategoryDraft {
        CategoryDraft {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Category form values (create or update).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Name is required; a blank description is stored as null.
    pub fn validated(&self) -> DomainResult<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("category name is required"));
        }
        Ok(Self {
            name: name.to_string(),
            description: non_blank(self.description.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validated_rejects_empty_name() {
        let err = CategoryDraft::new("").validated().unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn validated_trims_and_nulls_blank_description() {
        let clean = CategoryDraft::new(" Snacks ")
            .with_description("   ")
            .validated()
            .unwrap();
        assert_eq!(clean.name, "Snacks");
        assert_eq!(clean.description, None);
    }

    #[test]
    fn reads_store_row() {
        let c: Category = serde_json::from_value(json!({
            "id": 5,
            "name": "Snacks",
            "description": null,
            "created_at": "2026-10-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(c.id, CategoryId::new(5));
        assert!(c.created_at.is_some());
        assert_eq!(c.to_draft().name, "Snacks");
    }
}
