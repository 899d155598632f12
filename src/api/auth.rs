// src/api/auth.rs

use crate::{
    api::ApiClient,
    error::{ApiError, ValidationError},
    models::{LoginRequest, LoginResponseData, MeResponseData},
    session::Session,
};

impl ApiClient {
    /// `POST /auth/login`; the returned session is persisted.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        device_name: Option<&str>,
        remember_me: bool,
    ) -> Result<Session, ApiError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ValidationError::Required("username and password are required").into());
        }

        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
            device_name: device_name.map(str::to_string),
            remember_me: Some(remember_me),
        };

        let data: LoginResponseData = self.post("/auth/login", &req).await?;
        let session = Session::from(data);
        self.session().set(session.clone()).await?;
        Ok(session)
    }

    /// `GET /auth/me`: who the stored token belongs to.
    pub async fn me(&self) -> Result<MeResponseData, ApiError> {
        if self.session().token().await.is_none() {
            return Err(ApiError::not_logged_in());
        }
        self.get_one("/auth/me").await
    }

    /// `POST /auth/logout`. The local session is dropped whatever the server says.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if self.session().token().await.is_none() {
            return Ok(());
        }

        let result = self
            .post_no_content("/auth/logout", &serde_json::json!({}))
            .await;
        self.session().clear().await;

        match result {
            Err(e) if e.is_session_fatal() => Ok(()),
            other => other,
        }
    }
}
