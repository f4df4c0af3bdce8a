//! Authenticated MediaWiki session.
//!
//! Logs in with the three-step handshake (login, confirm login, fetch edit
//! token) once at construction, then reuses the resulting [`AuthContext`]
//! for every `wbeditentity` call. No re-authentication, no token refresh.

use reqwest::header::COOKIE;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::{ApiResponse, AuthContext, CookieJar, WikibaseApi};
use crate::entity::EntityDocument;
use crate::errors::{ImportError, Result};
use crate::types::ImporterConfig;

const ACTION: &str = "action";
const FORMAT: &str = "format";
const JSON_FORMAT: &str = "json";

// ── Client struct ─────────────────────────────────────────────────────────────

/// Wikibase client holding an authenticated session.
pub struct SessionClient {
    http: reqwest::Client,
    endpoint: String,
    auth: AuthContext,
}

impl SessionClient {
    /// Build the HTTP client and run the login handshake.
    ///
    /// # Errors
    /// [`ImportError::Authentication`] if any handshake step fails to produce
    /// its token or cookies; the client is unusable without edit rights.
    pub async fn connect(config: &ImporterConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.request_timeout())
            .timeout(config.request_timeout())
            .build()?;

        let endpoint = config.api_endpoint.clone();
        let auth = handshake(&http, &endpoint, &config.username, &config.password)
            .await
            .inspect_err(|e| {
                error!(error = %e, "couldn't generate edit token, API cannot be used for edit requests");
            })?;

        debug!("generated edit token successfully");

        Ok(Self {
            http,
            endpoint,
            auth,
        })
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }
}

// ── WikibaseApi implementation ────────────────────────────────────────────────

impl WikibaseApi for SessionClient {
    async fn create_entity(&self, entity: &EntityDocument) -> Result<ApiResponse> {
        self.submit(entity, ("new", entity.kind.as_str())).await
    }

    async fn edit_entity(&self, entity: &EntityDocument) -> Result<ApiResponse> {
        let id = entity.id.as_ref().ok_or_else(|| {
            ImportError::Validation(format!(
                "cannot edit {} '{}' without an id",
                entity.kind,
                entity.display_label()
            ))
        })?;
        self.submit(entity, ("id", id.as_str())).await
    }
}

impl SessionClient {
    /// POST `entity` to `wbeditentity`; `target` is either `new=<kind>` or `id=<id>`.
    async fn submit(&self, entity: &EntityDocument, target: (&str, &str)) -> Result<ApiResponse> {
        let data = serde_json::to_string(entity)?;
        let kind = entity.kind.as_str();

        debug!(kind, target = target.1, data = %data, "submit entity");

        let form = [
            (ACTION, "wbeditentity"),
            target,
            ("data", data.as_str()),
            ("token", self.auth.edit_token()),
            (FORMAT, JSON_FORMAT),
        ];

        post_form(&self.http, &self.endpoint, &form, Some(self.auth.cookies()))
            .await?
            .ok_or_else(|| {
                ImportError::Transport(format!(
                    "no usable response for {kind} '{}'",
                    entity.display_label()
                ))
            })
    }
}

// ── Handshake ─────────────────────────────────────────────────────────────────

async fn handshake(
    http: &reqwest::Client,
    endpoint: &str,
    username: &str,
    password: &str,
) -> Result<AuthContext> {
    debug!("try to generate edit token");

    // 1. login → login token + cookies
    let login_response = login(http, endpoint, username, password)
        .await?
        .ok_or_else(|| auth_failure("login request returned no usable response"))?;

    let token = extract_token(&login_response.body, &["login", "token"])
        .ok_or_else(|| auth_failure("login response carries no token"))?;
    if login_response.cookies.is_empty() {
        return Err(auth_failure("login response sets no cookies"));
    }
    debug!("retrieved token with login credentials successfully");

    // 2. confirm login → confirmed session cookies
    let confirm_response = confirm_login(http, endpoint, &token, &login_response.cookies)
        .await?
        .ok_or_else(|| auth_failure("login confirmation returned no usable response"))?;

    let mut cookies = confirm_response.cookies;
    if cookies.is_empty() {
        return Err(auth_failure("login confirmation sets no session cookies"));
    }
    debug!("confirmed login with token and cookies successfully");

    // 3. edit token; cookies from 2 + 3 are merged, 3 wins on clashes
    let edit_token_response = retrieve_edit_token(http, endpoint, &cookies)
        .await?
        .ok_or_else(|| auth_failure("edit token request returned no usable response"))?;

    let edit_token = extract_token(&edit_token_response.body, &["query", "tokens", "csrftoken"])
        .ok_or_else(|| auth_failure("edit token response carries no csrf token"))?;
    debug!("retrieved edit token with cookies successfully");

    cookies.merge(edit_token_response.cookies);

    Ok(AuthContext::new(edit_token, cookies))
}

async fn login(
    http: &reqwest::Client,
    endpoint: &str,
    username: &str,
    password: &str,
) -> Result<Option<ApiResponse>> {
    debug!("try to retrieve token with login credentials");

    let form = [
        (ACTION, "login"),
        ("lgname", username),
        ("lgpassword", password),
        (FORMAT, JSON_FORMAT),
    ];
    post_form(http, endpoint, &form, None).await
}

async fn confirm_login(
    http: &reqwest::Client,
    endpoint: &str,
    token: &str,
    cookies: &CookieJar,
) -> Result<Option<ApiResponse>> {
    debug!("try to confirm login with token and cookies");

    let form = [(ACTION, "login"), ("lgtoken", token)];
    post_form(http, endpoint, &form, Some(cookies)).await
}

async fn retrieve_edit_token(
    http: &reqwest::Client,
    endpoint: &str,
    cookies: &CookieJar,
) -> Result<Option<ApiResponse>> {
    debug!("try to retrieve edit token with cookies");

    let form = [
        (ACTION, "query"),
        ("meta", "tokens"),
        ("continue", ""),
        (FORMAT, JSON_FORMAT),
    ];
    post_form(http, endpoint, &form, Some(cookies)).await
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn auth_failure(message: &str) -> ImportError {
    error!("{message}, cannot continue edit token generation");
    ImportError::Authentication(message.to_string())
}

/// Follow `path` through the JSON body and return the string at its end.
fn extract_token(body: &str, path: &[&str]) -> Option<String> {
    let json: Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(e) => {
            error!(error = %e, body, "cannot extract token, response body is not JSON");
            return None;
        }
    };

    let mut node = &json;
    for key in path {
        match node.get(*key) {
            Some(next) => node = next,
            None => {
                error!(node = *key, body, "cannot extract token, node is not available in response JSON");
                return None;
            }
        }
    }
    node.as_str().map(ToOwned::to_owned)
}

/// POST a form to the API endpoint.
///
/// Only a 200 response counts; any other status is logged and reported as
/// `None` so the caller can fail with the error appropriate to its step.
async fn post_form(
    http: &reqwest::Client,
    endpoint: &str,
    form: &[(&str, &str)],
    cookies: Option<&CookieJar>,
) -> Result<Option<ApiResponse>> {
    let mut request = http.post(endpoint).form(form);
    if let Some(jar) = cookies.filter(|jar| !jar.is_empty()) {
        request = request.header(COOKIE, jar.header_value());
    }

    let response = request.send().await?;
    let status = response.status().as_u16();
    let cookies: CookieJar = response
        .cookies()
        .map(|c| (c.name().to_string(), c.value().to_string()))
        .collect();
    let body = response.text().await?;

    if status != 200 {
        warn!(status, body = %body, "API request did not return 200");
        return Ok(None);
    }

    Ok(Some(ApiResponse {
        status,
        cookies,
        body,
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
