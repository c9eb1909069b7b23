use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::expiry::{ExpiryStatus, classify};
use crate::types::{ItemId, UserId};

/// A tracked perishable good.
///
/// Whether the item is expired is never stored; ask [`Item::status`] with the
/// instant you care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Store-assigned identifier.
    pub id: ItemId,
    /// Display name, also the dashboard and top-expired grouping key.
    #[cfg_attr(feature = "openapi", schema(example = "Milk"))]
    pub name: String,
    /// Free-form category.
    #[cfg_attr(feature = "openapi", schema(example = "Dairy"))]
    pub category: String,
    /// Instant after which the item counts as expired.
    pub expiry_date: DateTime<Utc>,
    /// Optional notes, empty when not supplied.
    #[serde(default)]
    pub notes: String,
    /// Owning user. Set once at creation.
    pub added_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Materialize a validated [`NewItem`] with a store-assigned id and
    /// creation time.
    pub fn from_new(new: NewItem, id: ItemId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            category: new.category,
            expiry_date: new.expiry_date,
            notes: new.notes,
            added_by: new.added_by,
            created_at,
        }
    }

    /// Classify this item against `now`.
    pub fn status(&self, now: DateTime<Utc>) -> ExpiryStatus {
        classify(self.expiry_date, now)
    }

    /// Shorthand for `self.status(now) == ExpiryStatus::Expired`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == ExpiryStatus::Expired
    }
}

/// Validated input for creating an item.
///
/// Can only be built through [`NewItem::new`] or [`NewItem::from_parts`], so a
/// value of this type always has every required field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    name: String,
    category: String,
    expiry_date: DateTime<Utc>,
    notes: String,
    added_by: UserId,
}

impl NewItem {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        expiry_date: DateTime<Utc>,
        added_by: UserId,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let category = category.into();
        require_text("name", &name)?;
        require_text("category", &category)?;
        Ok(Self {
            name,
            category,
            expiry_date,
            notes: String::new(),
            added_by,
        })
    }

    /// Build from optional wire fields, reporting the first missing one.
    ///
    /// Fields are checked in the order name, category, expiryDate, owner.
    pub fn from_parts(
        name: Option<String>,
        category: Option<String>,
        expiry_date: Option<DateTime<Utc>>,
        notes: Option<String>,
        added_by: Option<UserId>,
    ) -> Result<Self, ValidationError> {
        let name = name.ok_or(ValidationError::MissingField("name"))?;
        let category = category.ok_or(ValidationError::MissingField("category"))?;
        let expiry_date = expiry_date.ok_or(ValidationError::MissingField("expiryDate"))?;
        let added_by = added_by.ok_or(ValidationError::MissingField("userId"))?;
        let item = Self::new(name, category, expiry_date, added_by)?;
        Ok(match notes {
            Some(notes) => item.with_notes(notes),
            None => item,
        })
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn expiry_date(&self) -> DateTime<Utc> {
        self.expiry_date
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn added_by(&self) -> UserId {
        self.added_by
    }
}

/// Unvalidated item fields as they arrive on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    #[cfg_attr(feature = "openapi", schema(example = "Milk"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "openapi", schema(example = "Dairy"))]
    pub category: Option<String>,
    /// RFC 3339 timestamp or bare `YYYY-MM-DD` date (midnight UTC).
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_option")]
    pub expiry_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// Owner of the new item.
    pub user_id: Option<UserId>,
}

impl ItemDraft {
    pub fn validate(self) -> Result<NewItem, ValidationError> {
        NewItem::from_parts(
            self.name,
            self.category,
            self.expiry_date,
            self.notes,
            self.user_id,
        )
    }
}

/// A partial update. Absent fields are left untouched; the owner can never be
/// changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::timestamp::deserialize_option"
    )]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ItemPatch {
    /// Check that the patch changes something and keeps required fields
    /// non-blank.
    ///
    /// Empty notes on their own do not count as a change.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let has_notes = self.notes.as_deref().is_some_and(|n| !n.is_empty());
        if self.name.is_none() && self.category.is_none() && self.expiry_date.is_none() && !has_notes
        {
            return Err(ValidationError::EmptyPatch);
        }
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(category) = &self.category {
            require_text("category", category)?;
        }
        Ok(())
    }

    /// Overwrite the supplied fields on `item`.
    pub fn apply(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            name.clone_into(&mut item.name);
        }
        if let Some(category) = &self.category {
            category.clone_into(&mut item.category);
        }
        if let Some(expiry_date) = self.expiry_date {
            item.expiry_date = expiry_date;
        }
        if let Some(notes) = &self.notes {
            notes.clone_into(&mut item.notes);
        }
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}
