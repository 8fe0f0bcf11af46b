use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{ClientError, ValidationError};
use crate::listing::{transform_list_body, ReviewPage};
use crate::location::{LocationHygiene, LocationProfile};
use crate::query::ReviewQuery;
use crate::reply::{ReplyConfirmation, ReplyDraft};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The calls the review list and reply flows need. `ApiClient` is the real
/// implementation; tests substitute in-memory ones.
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    async fn fetch_reviews(&self, query: &ReviewQuery) -> Result<ReviewPage, ClientError>;

    async fn post_reply(&self, draft: &ReplyDraft) -> Result<ReplyConfirmation, ClientError>;
}

pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: String,
}

#[derive(Serialize)]
struct ReplyBody<'a> {
    text: &'a str,
    #[serde(rename = "isPublic")]
    is_public: bool,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(&config.api_base_url, &config.api_token)
    }

    pub fn with_base_url(base_url: &str, token: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL '{}'", base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("API base URL '{}' cannot carry a path", base_url));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
        })
    }

    /// Append path segments to the base URL, percent-encoding each one so
    /// ids containing `/` stay a single segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request and return the body of a 2xx response.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<String, ClientError> {
        debug!(%method, %url, "api request");

        let mut request = self.client.request(method, url).bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "api request failed");
            return Err(ClientError::Http {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        let text = self.send::<()>(Method::GET, url, None).await?;
        serde_json::from_str(&text).map_err(|e| ClientError::Validation(e.into()))
    }

    pub async fn get_location(&self, location_id: &str) -> Result<LocationProfile, ClientError> {
        self.get_json(self.endpoint(&["locations", location_id])).await
    }

    pub async fn get_location_hygiene(
        &self,
        location_id: &str,
    ) -> Result<LocationHygiene, ClientError> {
        let hygiene: LocationHygiene = self
            .get_json(self.endpoint(&["locations", location_id, "hygiene"]))
            .await?;
        hygiene.validate()?;
        Ok(hygiene)
    }
}

#[async_trait]
impl ReviewBackend for ApiClient {
    async fn fetch_reviews(&self, query: &ReviewQuery) -> Result<ReviewPage, ClientError> {
        let url = self.endpoint(&["review", "account"]);
        let text = self.send(Method::POST, url, Some(query)).await?;
        let page = transform_list_body(&text)?;
        debug!(
            rows = page.reviews.len(),
            page = page.pagination.page,
            pages = page.pagination.total_pages,
            "reviews fetched"
        );
        Ok(page)
    }

    async fn post_reply(&self, draft: &ReplyDraft) -> Result<ReplyConfirmation, ClientError> {
        let text = draft.text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyReply.into());
        }

        let url = self.endpoint(&["review", &draft.review_id, "reply"]);
        let body = ReplyBody {
            text,
            is_public: draft.is_public,
        };
        let response = self.send(Method::POST, url, Some(&body)).await?;

        // Some deployments answer with an empty body.
        let confirmation: ReplyConfirmation = if response.trim().is_empty() {
            ReplyConfirmation::default()
        } else {
            serde_json::from_str(&response).map_err(|e| ClientError::Validation(e.into()))?
        };

        if confirmation.success == Some(false) {
            return Err(ClientError::Rejected(
                confirmation
                    .message
                    .unwrap_or_else(|| "reply not accepted".to_string()),
            ));
        }
        Ok(confirmation)
    }
}
