//! Wikibase API client abstraction.
//!
//! # Implementations
//! - [`session::SessionClient`]: authenticated MediaWiki session over `reqwest`.
//!
//! [`response`] turns raw creation responses into entities or error payloads.

pub mod response;
pub mod session;

use std::collections::BTreeMap;

use crate::entity::EntityDocument;
use crate::errors::Result;

pub use response::{ApiErrorPayload, ApiOutcome};
pub use session::SessionClient;

/// Session cookies, keyed by cookie name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar(BTreeMap<String, String>);

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Merge `other` into `self`; cookies in `other` win on name clashes.
    pub fn merge(&mut self, other: CookieJar) {
        self.0.extend(other.0);
    }

    /// Value for a `Cookie` request header (`a=1; b=2`).
    pub fn header_value(&self) -> String {
        self.0
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CookieJar {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Edit rights obtained by the login handshake. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    edit_token: String,
    cookies: CookieJar,
}

impl AuthContext {
    pub fn new(edit_token: impl Into<String>, cookies: CookieJar) -> Self {
        Self {
            edit_token: edit_token.into(),
            cookies,
        }
    }

    pub fn edit_token(&self) -> &str {
        &self.edit_token
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("edit_token", &"<redacted>")
            .field("cookies", &self.cookies.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A raw HTTP response, as handed to the response interpreter.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub cookies: CookieJar,
    pub body: String,
}

impl ApiResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            cookies: CookieJar::new(),
            body: body.into(),
        }
    }
}

/// Trait for clients able to create and edit entities in a Wikibase instance.
///
/// Each call is one round-trip that the caller awaits to completion; there is
/// no retry.
#[allow(async_fn_in_trait)]
pub trait WikibaseApi: Send + Sync {
    /// Submit `entity` for creation and return the raw response.
    async fn create_entity(&self, entity: &EntityDocument) -> Result<ApiResponse>;

    /// Add the terms and claims of `entity` to the existing entity `entity.id`.
    async fn edit_entity(&self, entity: &EntityDocument) -> Result<ApiResponse>;
}
