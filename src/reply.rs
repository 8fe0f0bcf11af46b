use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::ReviewBackend;
use crate::error::ClientError;

/// A reply waiting to be posted. Batch files use the same camelCase keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyDraft {
    pub review_id: String,
    pub text: String,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

fn default_public() -> bool {
    true
}

/// Server acknowledgement of a posted reply. The backend is loose about
/// this shape, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyConfirmation {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug)]
pub struct BatchFailure {
    pub review_id: String,
    pub error: ClientError,
}

/// Result of posting several replies. Every draft lands in exactly one list.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Post each draft in order. A failed item is recorded and the batch
/// carries on with the rest.
pub async fn submit_replies<B>(backend: &B, drafts: &[ReplyDraft]) -> BatchOutcome
where
    B: ReviewBackend + ?Sized,
{
    let mut outcome = BatchOutcome::default();

    for draft in drafts {
        match backend.post_reply(draft).await {
            Ok(_) => outcome.succeeded.push(draft.review_id.clone()),
            Err(error) => {
                warn!(review_id = %draft.review_id, %error, "reply failed");
                outcome.failed.push(BatchFailure {
                    review_id: draft.review_id.clone(),
                    error,
                });
            }
        }
    }

    info!(
        succeeded = outcome.succeeded.len(),
        failed = outcome.failed.len(),
        "reply batch finished"
    );
    outcome
}
