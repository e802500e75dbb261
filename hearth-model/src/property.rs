use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::ids::{PropertyId, UserId};

/// A rentable unit as stored and served by the API.
///
/// Wire names are camelCase (`pricePerNight`, `imageUrl`); API clients
/// depend on them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Property {
    pub id: PropertyId,
    pub title: String,
    /// Free-form postal address; the search field for location queries.
    pub address: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub description: Option<String>,
    pub price_per_night: f64,
    pub image_url: String,
    /// The user recorded at creation; the sole authorization anchor for
    /// update and delete.
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// Full-document replace, keeping the identifier and creation time.
    /// The caller is responsible for the owner check beforehand.
    pub fn apply_patch(&mut self, patch: &PropertyPatch, now: DateTime<Utc>) {
        self.title = patch.title.clone();
        self.address = patch.address.clone();
        self.description = patch.description.clone();
        self.price_per_night = patch.price_per_night;
        self.image_url = patch.image_url.clone();
        self.owner = patch.owner;
        self.updated_at = now;
    }
}

/// Caller-supplied fields of a new listing. The image URL is resolved
/// separately (direct URL or upload through the file-storage collaborator)
/// before the record is committed.
#[derive(Debug, Clone)]
pub struct PropertyDraft {
    pub title: String,
    pub address: String,
    pub description: Option<String>,
    pub price_per_night: f64,
}

impl PropertyDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.title, &self.address, self.price_per_night)
    }
}

/// Full replacement body for update. PUT replaces the whole document, so
/// every field is carried, including `owner`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PropertyPatch {
    pub title: String,
    pub address: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    pub price_per_night: f64,
    pub image_url: String,
    pub owner: UserId,
}

impl PropertyPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.title, &self.address, self.price_per_night)?;
        if self.image_url.trim().is_empty() {
            return Err(ValidationError::MissingField("imageUrl"));
        }
        Ok(())
    }
}

fn validate_fields(title: &str, address: &str, price: f64) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::MissingField("title"));
    }
    if address.trim().is_empty() {
        return Err(ValidationError::MissingField("address"));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(ValidationError::InvalidPrice);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PropertyDraft {
        PropertyDraft {
            title: "Canal loft".to_string(),
            address: "Prinsengracht 7, Amsterdam".to_string(),
            description: None,
            price_per_night: 120.0,
        }
    }

    #[test]
    fn draft_validates() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn draft_rejects_blank_title() {
        let mut d = draft();
        d.title = "  ".to_string();
        assert_eq!(d.validate(), Err(ValidationError::MissingField("title")));
    }

    #[test]
    fn draft_rejects_negative_price() {
        let mut d = draft();
        d.price_per_night = -1.0;
        assert_eq!(d.validate(), Err(ValidationError::InvalidPrice));
    }

    #[test]
    fn draft_rejects_nan_price() {
        let mut d = draft();
        d.price_per_night = f64::NAN;
        assert_eq!(d.validate(), Err(ValidationError::InvalidPrice));
    }

    #[test]
    fn patch_applies_every_field_but_keeps_identity() {
        let owner = UserId::new();
        let mut property = Property {
            id: PropertyId::new(),
            title: "Old title".to_string(),
            address: "Old address".to_string(),
            description: None,
            price_per_night: 50.0,
            image_url: "https://img.example/old.jpg".to_string(),
            owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = property.id;
        let created_at = property.created_at;

        let patch = PropertyPatch {
            title: "New title".to_string(),
            address: "New address".to_string(),
            description: Some("Freshly painted".to_string()),
            price_per_night: 75.0,
            image_url: "https://img.example/new.jpg".to_string(),
            owner,
        };
        let now = Utc::now();
        property.apply_patch(&patch, now);

        assert_eq!(property.id, id);
        assert_eq!(property.created_at, created_at);
        assert_eq!(property.updated_at, now);
        assert_eq!(property.title, "New title");
        assert_eq!(property.description.as_deref(), Some("Freshly painted"));
        assert_eq!(property.price_per_night, 75.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn property_serializes_with_camel_case_wire_names() {
        let property = Property {
            id: PropertyId::new(),
            title: "Canal loft".to_string(),
            address: "Prinsengracht 7".to_string(),
            description: None,
            price_per_night: 120.0,
            image_url: "https://img.example/loft.jpg".to_string(),
            owner: UserId::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&property).unwrap();
        assert!(json.get("pricePerNight").is_some());
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("owner").is_some());
        // Optional description is omitted entirely when absent.
        assert!(json.get("description").is_none());
    }
}
