use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timestamp::normalize_timestamp;

/// Display state of a review. `Flagged` exists for moderation tooling but is
/// never derived from the backend's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    New,
    Replied,
    Hidden,
    Flagged,
}

impl ReviewStatus {
    pub fn label(self) -> &'static str {
        match self {
            ReviewStatus::New => "new",
            ReviewStatus::Replied => "replied",
            ReviewStatus::Hidden => "hidden",
            ReviewStatus::Flagged => "flagged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub customer_name: String,
    pub customer_photo: Option<String>,
    pub rating: u8,
    pub comment: String,
    pub date: DateTime<Utc>,
    pub location_id: String,
    pub location_name: String,
    pub status: ReviewStatus,
    pub business_reply: Option<BusinessReply>,
    pub helpful_votes: u32,
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessReply {
    pub id: String,
    pub text: String,
    pub date: DateTime<Utc>,
    pub is_public: bool,
}

/// One review record as the backend sends it.
///
/// Flags are 0/1 integers on the wire. Serde rejects wrong JSON types;
/// [`RawReview::validate`] rejects out-of-range values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReview {
    pub account_id: String,
    pub location_id: String,
    pub review_name: String,
    pub comment_en: Option<String>,
    pub comment_native: Option<String>,
    pub has_comment: u8,
    pub is_deleted: u8,
    pub reply: u8,
    pub reply_comment: Option<String>,
    pub rating: i64,
    pub created_date: i64,
    pub update_date: i64,
    pub reply_date: Option<i64>,
    #[serde(rename = "reviewerName")]
    pub reviewer_name: String,
    #[serde(rename = "profilePhotoUrl")]
    pub profile_photo_url: Option<String>,
    // Unit varies between backend versions and nothing here reads it.
    pub response_time: Option<serde_json::Value>,
}

impl RawReview {
    /// Check the invariants serde cannot express. `index` is the record's
    /// position in the page, used for error reporting.
    pub fn validate(&self, index: usize) -> Result<(), ValidationError> {
        if !(1..=5).contains(&self.rating) {
            return Err(ValidationError::Field {
                index,
                field: "rating",
                reason: format!("expected 1-5, got {}", self.rating),
            });
        }

        for (field, value) in [
            ("has_comment", self.has_comment),
            ("is_deleted", self.is_deleted),
            ("reply", self.reply),
        ] {
            if value > 1 {
                return Err(ValidationError::Field {
                    index,
                    field,
                    reason: format!("expected 0 or 1, got {}", value),
                });
            }
        }

        Ok(())
    }

    /// Hidden dominates replied, which dominates new.
    pub fn status(&self) -> ReviewStatus {
        if self.is_deleted == 1 {
            ReviewStatus::Hidden
        } else if self.reply == 1 {
            ReviewStatus::Replied
        } else {
            ReviewStatus::New
        }
    }

    fn business_reply(&self) -> Option<BusinessReply> {
        if self.reply != 1 {
            return None;
        }
        let text = self.reply_comment.as_deref().filter(|c| !c.is_empty())?;

        // A zero reply_date means the backend never stamped the reply.
        let reply_timestamp = self
            .reply_date
            .filter(|&d| d != 0)
            .unwrap_or(self.update_date);

        Some(BusinessReply {
            id: format!("{}/reply", self.review_name),
            text: text.to_string(),
            date: normalize_timestamp(reply_timestamp),
            is_public: true,
        })
    }
}

/// Display label for a location when no profile lookup has been done.
pub fn location_label(location_id: &str) -> String {
    format!("Location {}", location_id)
}

impl From<RawReview> for Review {
    fn from(raw: RawReview) -> Self {
        let status = raw.status();
        let business_reply = raw.business_reply();

        let comment = match raw.comment_en {
            Some(en) if !en.is_empty() => en,
            _ => raw.comment_native.unwrap_or_default(),
        };

        Review {
            location_name: location_label(&raw.location_id),
            id: raw.review_name,
            customer_name: raw.reviewer_name,
            customer_photo: raw.profile_photo_url,
            // validate() has already bounded this to 1..=5
            rating: raw.rating.clamp(1, 5) as u8,
            comment,
            date: normalize_timestamp(raw.created_date),
            location_id: raw.location_id,
            status,
            business_reply,
            helpful_votes: 0,
            photos: Vec::new(),
        }
    }
}
