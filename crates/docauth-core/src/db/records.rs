// Store-shaped records: documents as persisted, keyed by `ObjectId`.
//
// Timestamps are native BSON dates (millisecond precision). Optional fields
// are omitted rather than stored as null, which keeps sparse unique indexes
// (e.g. on `email`) from colliding on absent values.

use bson::oid::ObjectId;
use bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::db::models::AccountType;

// ─── User ────────────────────────────────────────────────────────

/// User fields without a key, as inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A stored user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl UserRecord {
    pub fn from_fields(id: ObjectId, fields: UserFields) -> Self {
        Self {
            id,
            name: fields.name,
            email: fields.email,
            email_verified: fields.email_verified,
            image: fields.image,
        }
    }
}

/// Partial user update; serializes to the body of a `$set`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.email_verified.is_none()
            && self.image.is_none()
    }

    /// Merge the set fields into `record`.
    pub fn apply_to(&self, record: &mut UserRecord) {
        if let Some(name) = &self.name {
            record.name = Some(name.clone());
        }
        if let Some(email) = &self.email {
            record.email = Some(email.clone());
        }
        if let Some(verified) = self.email_verified {
            record.email_verified = Some(verified);
        }
        if let Some(image) = &self.image {
            record.image = Some(image.clone());
        }
    }
}

// ─── Session ─────────────────────────────────────────────────────

/// A stored session document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_token: String,
    pub user_id: ObjectId,
    pub expires: DateTime,
}

/// Partial session update; the token itself is never rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime>,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.expires.is_none()
    }

    pub fn apply_to(&self, record: &mut SessionRecord) {
        if let Some(user_id) = self.user_id {
            record.user_id = user_id;
        }
        if let Some(expires) = self.expires {
            record.expires = expires;
        }
    }
}

// ─── Account ─────────────────────────────────────────────────────

/// A stored account document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub user_id: ObjectId,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub provider: String,
    pub provider_account_id: String,
    #[serde(rename = "refresh_token", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(rename = "access_token", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "expires_at", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(rename = "token_type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(rename = "id_token", default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(rename = "session_state", default, skip_serializing_if = "Option::is_none")]
    pub session_state: Option<String>,
}

// ─── Verification Token ──────────────────────────────────────────

/// A stored verification token document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationTokenRecord {
    pub identifier: String,
    pub token: String,
    pub expires: DateTime,
}
