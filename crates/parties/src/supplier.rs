use serde::{Deserialize, Serialize};

use stockdesk_core::{DomainError, DomainResult, Entity, SupplierId, contains_ci, non_blank};

/// Contact details of a supplier. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl ContactInfo {
    /// Blank fields are stored as null.
    pub fn normalized(&self) -> Self {
        Self {
            contact_person: non_blank(self.contact_person.as_deref()),
            email: non_blank(self.email.as_deref()),
            phone: non_blank(self.phone.as_deref()),
            address: non_blank(self.address.as_deref()),
        }
    }
}

/// A stored supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    #[serde(flatten)]
    pub contact: ContactInfo,
}

impl Supplier {
    /// Search over name, contact person, email and phone.
    /// `needle` must already be lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle)
            || [
                &self.contact.contact_person,
                &self.contact.email,
                &self.contact.phone,
            ]
            .into_iter()
            .flatten()
            .any(|field| contains_ci(field, needle))
    }

    /// Form values for editing this supplier.
    pub fn to_draft(&self) -> SupplierDraft {
        SupplierDraft {
            name: self.name.clone(),
            contact: self.contact.clone(),
        }
    }
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Supplier form values (create or update).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierDraft {
    pub name: String,
    #[serde(flatten)]
    pub contact: ContactInfo,
}

impl SupplierDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact: ContactInfo::default(),
        }
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.contact = contact;
        self
    }

    /// Validate and normalize for writing: the name is required, blank
    /// optional fields become null, an email (if any) must contain `@`.
    pub fn validated(&self) -> DomainResult<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("supplier name is required"));
        }

        let contact = self.contact.normalized();
        if let Some(email) = &contact.email {
            if !email.contains('@') {
                return Err(DomainError::validation(format!("invalid email address '{email}'")));
            }
        }

        Ok(Self {
            name: name.to_string(),
            contact,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn supplier() -> Supplier {
        Supplier {
            id: SupplierId::new(1),
            name: "Uji Tea Farm".to_string(),
            contact: ContactInfo {
                contact_person: Some("Sato".to_string()),
                email: Some("orders@uji.example".to_string()),
                phone: Some("075-000-1111".to_string()),
                address: None,
            },
        }
    }

    #[test]
    fn validated_rejects_empty_name() {
        let err = SupplierDraft::new("   ").validated().unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn validated_nulls_blank_fields_and_trims() {
        let draft = SupplierDraft::new("  Acme ").with_contact(ContactInfo {
            contact_person: Some(String::new()),
            email: Some(" ".to_string()),
            phone: Some("123".to_string()),
            address: None,
        });
        let clean = draft.validated().unwrap();
        assert_eq!(clean.name, "Acme");
        assert_eq!(clean.contact.contact_person, None);
        assert_eq!(clean.contact.email, None);
        assert_eq!(clean.contact.phone.as_deref(), Some("123"));
    }

    #[test]
    fn validated_rejects_malformed_email() {
        let draft = SupplierDraft::new("Acme").with_contact(ContactInfo {
            email: Some("not-an-email".to_string()),
            ..ContactInfo::default()
        });
        match draft.validated().unwrap_err() {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for malformed email"),
        }
    }

    #[test]
    fn search_matches_contact_fields() {
        let s = supplier();
        assert!(s.matches_search("uji"));
        assert!(s.matches_search("sato"));
        assert!(s.matches_search("orders@"));
        assert!(s.matches_search("075"));
        assert!(!s.matches_search("kyoto"));
    }

    #[test]
    fn reads_flat_store_row() {
        let s: Supplier = serde_json::from_value(json!({
            "id": 4,
            "name": "Acme",
            "contact_person": null,
            "email": "a@acme.example",
            "phone": null,
            "address": "1 Main St",
            "created_at": "2026-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(s.contact.email.as_deref(), Some("a@acme.example"));
        assert_eq!(s.contact.address.as_deref(), Some("1 Main St"));
    }
}
