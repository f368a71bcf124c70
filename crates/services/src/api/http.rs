use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use guided_core::model::{AuthToken, Problem, ProblemId, ProgressRecord, User};

use crate::error::ApiError;

use super::{
    ApiConfig, NewUser, PlatformApi, ProblemDto, ProblemPage, ProgressDto, ProgressUpdate,
    TokenResponse, UserDto,
};

/// Error payload shape shared by every backend endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// `PlatformApi` over JSON/HTTPS against the real backend.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    config: ApiConfig,
}

impl HttpApi {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Map a non-success response to the client error taxonomy, pulling the
    /// backend's `detail` string when present.
    async fn error_for(response: Response) -> ApiError {
        let status = response.status();
        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .unwrap_or_else(|| status.to_string());

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Authentication(detail),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::Validation(detail)
            }
            StatusCode::NOT_FOUND => ApiError::NotFound(detail),
            _ => ApiError::HttpStatus(status),
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl PlatformApi for HttpApi {
    async fn login(&self, username: &str, password: &str) -> Result<AuthToken, ApiError> {
        debug!(username, "requesting token");
        let response = self
            .client
            .post(self.url("/auth/token"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let body: TokenResponse = Self::decode(response).await?;
        AuthToken::new(body.access_token).map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn register(&self, new_user: &NewUser) -> Result<User, ApiError> {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(new_user)
            .send()
            .await?;

        let body: UserDto = Self::decode(response).await?;
        body.into_domain()
    }

    async fn current_user(&self, token: &AuthToken) -> Result<User, ApiError> {
        let response = self
            .client
            .get(self.url("/auth/me"))
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let body: UserDto = Self::decode(response).await?;
        body.into_domain()
    }

    async fn list_problems(&self, page: ProblemPage) -> Result<Vec<Problem>, ApiError> {
        debug!(skip = page.skip, limit = page.limit, "fetching problems");
        let response = self
            .client
            .get(self.url("/problems"))
            .query(&page)
            .send()
            .await?;

        let body: Vec<ProblemDto> = Self::decode(response).await?;
        body.into_iter().map(ProblemDto::into_domain).collect()
    }

    async fn get_problem(&self, id: ProblemId) -> Result<Problem, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/problems/{id}")))
            .send()
            .await?;

        let body: ProblemDto = Self::decode(response).await?;
        body.into_domain()
    }

    async fn list_progress(&self, token: &AuthToken) -> Result<Vec<ProgressRecord>, ApiError> {
        let response = self
            .client
            .get(self.url("/progress"))
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let body: Vec<ProgressDto> = Self::decode(response).await?;
        body.into_iter().map(ProgressDto::into_domain).collect()
    }

    async fn get_progress(
        &self,
        token: &AuthToken,
        problem_id: ProblemId,
    ) -> Result<ProgressRecord, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/progress/{problem_id}")))
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let body: ProgressDto = Self::decode(response).await?;
        body.into_domain()
    }

    async fn update_progress(
        &self,
        token: &AuthToken,
        problem_id: ProblemId,
        update: &ProgressUpdate,
    ) -> Result<ProgressRecord, ApiError> {
        debug!(%problem_id, "persisting progress");
        let response = self
            .client
            .put(self.url(&format!("/progress/{problem_id}")))
            .bearer_auth(token.as_str())
            .json(update)
            .send()
            .await?;

        let body: ProgressDto = Self::decode(response).await?;
        body.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_doubled_slash() {
        let api = HttpApi::new(ApiConfig::new("http://localhost:8000/"));
        assert_eq!(
            api.url("/problems/3"),
            "http://localhost:8000/api/v1/problems/3"
        );
    }
}
