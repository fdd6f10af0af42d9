//! OAuth2 authorization-code flow against the FamilySearch identity service.

use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::Deserialize;
use tracing::info;

use crate::error::OAuthError;
use crate::settings::Settings;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

fn credentials(settings: &Settings) -> Result<(&str, &str), OAuthError> {
    let client_id = settings
        .client_id
        .as_deref()
        .ok_or(OAuthError::Config("client_id"))?;
    let redirect_uri = settings
        .redirect_uri
        .as_deref()
        .ok_or(OAuthError::Config("redirect_uri"))?;
    Ok((client_id, redirect_uri))
}

/// URL the user visits to grant access; it redirects back with `?code=`.
pub fn authorize_url(settings: &Settings) -> Result<Url, OAuthError> {
    let (client_id, redirect_uri) = credentials(settings)?;
    Url::parse_with_params(
        &settings.auth_url,
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
        ],
    )
    .map_err(|_| OAuthError::Config("auth_url"))
}

/// Trade an authorization code for an access token.
pub async fn exchange_code(settings: &Settings, code: &str) -> Result<String, OAuthError> {
    let (client_id, redirect_uri) = credentials(settings)?;
    let form = [
        ("grant_type", "authorization_code"),
        ("client_id", client_id),
        ("redirect_uri", redirect_uri),
        ("code", code),
    ];

    let response = reqwest::Client::new()
        .post(&settings.token_url)
        .header(ACCEPT, "application/json")
        .form(&form)
        .send()
        .await
        .map_err(|e| OAuthError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(OAuthError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| OAuthError::Network(e.to_string()))?;
    let token = token.access_token.ok_or(OAuthError::MissingToken)?;
    info!("Obtained access token");
    Ok(token)
}
