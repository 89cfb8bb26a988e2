use crate::interface_adapters::protocol::{
    CollectionResponse, DrawResponse, ErrorResponse, QuotaResponse,
};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewardClientError {
    #[error("reward service unreachable or sent an unreadable reply")]
    TransportFailure,
    #[error("no draws remaining until {next_reset_at}")]
    QuotaExhausted { next_reset_at: u64 },
    #[error("another draw for this user is in flight")]
    DrawInProgress,
    #[error("reward service rejected the request with status {0}")]
    Rejected(u16),
    #[error("reward client setup failed: {0}")]
    Setup(String),
}

// Thin reqwest client for the reward endpoints, used by frontends and tests.
#[derive(Clone)]
pub struct RewardClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RewardClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RewardClientError> {
        let base_url = Url::parse(base_url).map_err(|e| RewardClientError::Setup(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(RewardClientError::Setup(format!("{base_url} cannot be a base url")));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RewardClientError::Setup(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    pub async fn draw(&self, user_id: &str) -> Result<DrawResponse, RewardClientError> {
        let response = self
            .http
            .post(self.player_url(user_id, "draw"))
            .send()
            .await
            .map_err(|_| RewardClientError::TransportFailure)?;
        read_json(response).await
    }

    pub async fn quota_status(&self, user_id: &str) -> Result<QuotaResponse, RewardClientError> {
        let response = self
            .http
            .get(self.player_url(user_id, "quota"))
            .send()
            .await
            .map_err(|_| RewardClientError::TransportFailure)?;
        read_json(response).await
    }

    pub async fn collection(&self, user_id: &str) -> Result<CollectionResponse, RewardClientError> {
        let response = self
            .http
            .get(self.player_url(user_id, "collection"))
            .send()
            .await
            .map_err(|_| RewardClientError::TransportFailure)?;
        read_json(response).await
    }

    // `/players/{user_id}/{action}` under the base url, with the id percent-encoded as one segment.
    fn player_url(&self, user_id: &str, action: &str) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base urls, so segments are always editable.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["players", user_id, action]);
        }
        url
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RewardClientError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|_| RewardClientError::TransportFailure);
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let error = response
                .json::<ErrorResponse>()
                .await
                .map_err(|_| RewardClientError::TransportFailure)?;
            Err(RewardClientError::QuotaExhausted {
                next_reset_at: error.next_reset_at.unwrap_or_default(),
            })
        }
        StatusCode::CONFLICT => Err(RewardClientError::DrawInProgress),
        other => Err(RewardClientError::Rejected(other.as_u16())),
    }
}
