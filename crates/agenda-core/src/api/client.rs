use crate::actions::Action;
use crate::analysis::{AnalysisResult, Analyzer};
use crate::error::ApiError;
use crate::persistence::{ActionStore, Credential};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    command: &'a str,
}

/// The backend expects this misspelled field name
#[derive(Serialize)]
struct CreateActionRequest<'a> {
    comand: &'a str,
}

#[derive(Serialize)]
struct AuthRequest<'a> {
    user_name: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// HTTP client for the agenda backend
#[derive(Debug, Clone)]
pub struct AgendaClient {
    client: Client,
    base_url: String,
}

impl AgendaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(request: RequestBuilder, credential: Option<&Credential>) -> RequestBuilder {
        match credential {
            Some(credential) => request.bearer_auth(credential.as_str()),
            None => request,
        }
    }

    /// Turn a non-2xx response into an error carrying its body text
    async fn check(response: Response, fallback: &str) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status.as_u16() == 401 {
            return Err(ApiError::Unauthorized);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::status(status.as_u16(), &body, fallback))
    }

    /// `POST /analyze`. A non-2xx reply that still carries an analysis body is
    /// returned as that body.
    pub async fn analyze_command(
        &self,
        command: &str,
        credential: Option<&Credential>,
    ) -> Result<AnalysisResult, ApiError> {
        debug!(command, "POST /analyze");
        let request = self
            .client
            .post(self.url("/analyze"))
            .json(&AnalyzeRequest { command });
        let response = Self::authorized(request, credential).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        match serde_json::from_str::<AnalysisResult>(&body) {
            Ok(result) if !result.success => Ok(result),
            _ => Err(ApiError::status(
                status.as_u16(),
                &body,
                "Error al analizar el comando",
            )),
        }
    }

    /// `POST /actions`
    pub async fn create(&self, credential: &Credential, command: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/actions"))
            .bearer_auth(credential.as_str())
            .json(&CreateActionRequest { comand: command })
            .send()
            .await?;

        Self::check(response, "Error al guardar la acción").await?;
        info!("action created");
        Ok(())
    }

    /// `GET /actions?page=&pageSize=`
    pub async fn list_actions(
        &self,
        credential: &Credential,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Action>, ApiError> {
        debug!(page, page_size, "GET /actions");
        let response = self
            .client
            .get(self.url("/actions"))
            .bearer_auth(credential.as_str())
            .query(&[("page", page), ("pageSize", page_size)])
            .send()
            .await?;

        let response = Self::check(response, "Error al obtener las acciones").await?;
        let body = response.text().await?;
        let actions: Vec<Action> = serde_json::from_str(&body)?;
        debug!(count = actions.len(), "actions loaded");
        Ok(actions)
    }

    /// `DELETE /actions/{id}`
    pub async fn delete_action(&self, credential: &Credential, id: i64) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/actions/{}", id)))
            .bearer_auth(credential.as_str())
            .send()
            .await?;

        let fallback = match response.status().as_u16() {
            400 => "ID de acción inválido",
            403 => "No tenés permiso para eliminar esta acción",
            _ => "Error al eliminar la acción",
        };
        Self::check(response, fallback).await?;
        info!(id, "action deleted");
        Ok(())
    }

    /// `POST /auth/login`, returning the new credential
    pub async fn login(&self, user_name: &str, password: &str) -> Result<Credential, ApiError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&AuthRequest {
                user_name,
                password,
            })
            .send()
            .await?;

        if response.status().as_u16() == 401 {
            return Err(ApiError::status(401, "Credenciales incorrectas", ""));
        }
        let response = Self::check(response, "Error en inicio de sesión").await?;
        let body = response.text().await?;
        let LoginResponse { token } = serde_json::from_str(&body)?;
        info!(user_name, "logged in");
        Ok(Credential::new(token))
    }

    /// `POST /auth/register`
    pub async fn register(&self, user_name: &str, password: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(&AuthRequest {
                user_name,
                password,
            })
            .send()
            .await?;

        Self::check(response, "Error en registro").await?;
        info!(user_name, "registered");
        Ok(())
    }
}

#[async_trait]
impl Analyzer for AgendaClient {
    async fn analyze(
        &self,
        command: &str,
        credential: Option<&Credential>,
    ) -> Result<AnalysisResult, ApiError> {
        self.analyze_command(command, credential).await
    }
}

#[async_trait]
impl ActionStore for AgendaClient {
    async fn create_action(&self, credential: &Credential, command: &str) -> Result<(), ApiError> {
        self.create(credential, command).await
    }
}
