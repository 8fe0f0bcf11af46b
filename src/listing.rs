use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::review::{RawReview, Review};

/// Paginated list payload as returned by `POST /review/account`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListResponse {
    pub metadata: RawMetadata,
    pub data: Vec<RawReview>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMetadata {
    pub pages: u32,
    pub results_per_page: u32,
    pub current_page: u32,
    pub results: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl From<&RawMetadata> for Pagination {
    fn from(meta: &RawMetadata) -> Self {
        Pagination {
            page: meta.current_page,
            limit: meta.results_per_page,
            total: meta.results,
            total_pages: meta.pages,
            has_next: meta.current_page < meta.pages,
            has_prev: meta.current_page > 1,
        }
    }
}

/// Aggregates over the rows of the current page only; the backend does not
/// report global figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: u64,
    pub average_rating: f64,
    pub rating_distribution: BTreeMap<String, u32>,
}

impl Summary {
    pub fn from_reviews(reviews: &[Review], total: u64) -> Self {
        let mut rating_distribution: BTreeMap<String, u32> =
            (1..=5).map(|star| (star.to_string(), 0)).collect();
        for review in reviews {
            *rating_distribution.entry(review.rating.to_string()).or_default() += 1;
        }

        let average_rating = if reviews.is_empty() {
            0.0
        } else {
            let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
            f64::from(sum) / reviews.len() as f64
        };

        Summary {
            total,
            average_rating,
            rating_distribution,
        }
    }

    pub fn count_for(&self, star: u8) -> u32 {
        self.rating_distribution
            .get(&star.to_string())
            .copied()
            .unwrap_or(0)
    }
}

/// One fetched page, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPage {
    pub reviews: Vec<Review>,
    pub pagination: Pagination,
    pub summary: Summary,
}

impl TryFrom<RawListResponse> for ReviewPage {
    type Error = ValidationError;

    fn try_from(raw: RawListResponse) -> Result<Self, Self::Error> {
        for (index, record) in raw.data.iter().enumerate() {
            record.validate(index)?;
        }

        let pagination = Pagination::from(&raw.metadata);
        let reviews: Vec<Review> = raw.data.into_iter().map(Review::from).collect();
        let summary = Summary::from_reviews(&reviews, pagination.total);

        Ok(ReviewPage {
            reviews,
            pagination,
            summary,
        })
    }
}

/// Validate and normalize a list payload. Any schema or invariant failure
/// rejects the whole payload.
pub fn transform_list_response(payload: &serde_json::Value) -> Result<ReviewPage, ValidationError> {
    let raw = RawListResponse::deserialize(payload)?;
    ReviewPage::try_from(raw)
}

/// Same as [`transform_list_response`] for a response body that has not been parsed yet.
pub fn transform_list_body(body: &str) -> Result<ReviewPage, ValidationError> {
    let payload: serde_json::Value = serde_json::from_str(body)?;
    transform_list_response(&payload)
}
