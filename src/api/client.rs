// src/api/client.rs

use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    auth::{bearer_headers, token_fingerprint},
    config::Config,
    error::ApiError,
    session::SessionStore,
};

/// The one HTTP wrapper every store goes through: base URL, bearer token,
/// timeout and error normalization.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionStore,
}

/// Bodies come either bare or wrapped as `{ "data": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

#[derive(Serialize)]
struct NoQuery {}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    match serde_json::from_str::<Envelope<T>>(body) {
        Ok(Envelope::Wrapped { data }) => Ok(data),
        Ok(Envelope::Bare(value)) => Ok(value),
        Err(_) => {
            // re-run on the bare shape for a useful message
            serde_json::from_str::<T>(body).map_err(|e| ApiError::Decode(e.to_string()))
        }
    }
}

impl ApiClient {
    pub fn new(cfg: &Config, session: SessionStore) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("http client: {e}")))?;

        Ok(Self {
            http,
            base_url: cfg.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let req = self.http.get(self.url(path)).query(query);
        let body = self.dispatch(Method::GET, path, req).await?;
        decode(&body)
    }

    pub async fn get_one<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get(path, &NoQuery {}).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let req = self.http.post(self.url(path)).json(body);
        let body = self.dispatch(Method::POST, path, req).await?;
        decode(&body)
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let req = self.http.patch(self.url(path)).json(body);
        let body = self.dispatch(Method::PATCH, path, req).await?;
        decode(&body)
    }

    /// POST where the response body does not matter.
    pub async fn post_no_content<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let req = self.http.post(self.url(path)).json(body);
        self.dispatch(Method::POST, path, req).await.map(|_| ())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let req = self.http.delete(self.url(path));
        self.dispatch(Method::DELETE, path, req).await.map(|_| ())
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        req: RequestBuilder,
    ) -> Result<String, ApiError> {
        let req = match self.session.token().await {
            Some(token) => {
                tracing::debug!(%method, path, token = %token_fingerprint(&token), "api request");
                req.headers(bearer_headers(&token)?)
            }
            None => {
                tracing::debug!(%method, path, "api request (anonymous)");
                req
            }
        };

        let resp = req.send().await.map_err(|e| {
            let err = ApiError::from(e);
            tracing::warn!(%method, path, error = %err, "api request failed");
            err
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(ApiError::from)?;

        if status.is_success() {
            return Ok(body);
        }

        let err = ApiError::from_status(status, &body);
        if err.is_session_fatal() {
            tracing::warn!(%method, path, %status, "session rejected, logging out");
            self.session.clear().await;
        } else {
            tracing::debug!(%method, path, %status, error = %err, "api error response");
        }
        Err(err)
    }
}
