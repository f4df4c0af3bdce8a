//! Interpretation of `wbeditentity` responses.
//!
//! A response is either the created entity, an API error payload that the
//! caller may still recover from, or a fatal failure.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use super::ApiResponse;
use crate::entity::{EntityId, EntityKind};
use crate::errors::{ImportError, Result};

const FAILED_SAVE: &str = "failed-save";
const LABEL_CONFLICT: &str = "wikibase-validator-label-conflict";

static CONFLICT_LINK_RE: OnceLock<Regex> = OnceLock::new();

fn conflict_link_re() -> &'static Regex {
    CONFLICT_LINK_RE
        .get_or_init(|| Regex::new(r"\[\[Property:([^|\]]+)\|").expect("static regex is valid"))
}

/// Successful interpretation of a creation response.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome {
    /// The `entity` subtree of a successful response.
    Entity(Value),
    /// The `error` object of the response; not fatal by itself.
    Error(ApiErrorPayload),
}

/// The `error` object of a MediaWiki API response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiErrorPayload {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
    #[serde(skip)]
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Value>,
}

/// Parse a raw creation response.
///
/// `entity_label` and `kind` only feed log output and error context.
pub fn interpret(response: &ApiResponse, entity_label: &str, kind: EntityKind) -> Result<ApiOutcome> {
    if response.status != 200 {
        error!(
            entity = entity_label,
            %kind,
            status = response.status,
            body = %response.body,
            "entity creation returned a non-200 status"
        );
        return Err(ImportError::Transport(format!(
            "creating {kind} '{entity_label}' returned HTTP {}",
            response.status
        )));
    }

    let json: Value = serde_json::from_str(&response.body).map_err(|e| {
        error!(entity = entity_label, %kind, body = %response.body, "response body is not JSON");
        ImportError::protocol(entity_label, format!("unreadable response body: {e}"), &response.body)
    })?;

    if let Some(raw_error) = json.get("error") {
        let mut payload: ApiErrorPayload =
            serde_json::from_value(raw_error.clone()).map_err(|e| {
                ImportError::protocol(entity_label, format!("malformed 'error' object: {e}"), &response.body)
            })?;
        payload.raw = raw_error.clone();
        return Ok(ApiOutcome::Error(payload));
    }

    match json.get("success").and_then(Value::as_i64) {
        Some(1) => {}
        _ => {
            error!(entity = entity_label, %kind, body = %response.body, "response does not report success");
            return Err(ImportError::protocol(
                entity_label,
                "missing or unexpected 'success' field",
                &response.body,
            ));
        }
    }

    match json.get("entity") {
        Some(entity) if entity.is_object() => Ok(ApiOutcome::Entity(entity.clone())),
        _ => {
            error!(entity = entity_label, %kind, body = %response.body, "response carries no entity");
            Err(ImportError::protocol(entity_label, "missing 'entity' field", &response.body))
        }
    }
}

/// Recover the identifier of an already existing property from a label
/// conflict error.
///
/// Matches `failed-save` errors whose first message is a label conflict with
/// at least three parameters, the third linking `[[Property:<ID>|...`.
pub fn recover_label_conflict(error: &ApiErrorPayload) -> Option<EntityId> {
    if error.code != FAILED_SAVE {
        return None;
    }

    let message = error.messages.first()?;
    if message.name != LABEL_CONFLICT || message.parameters.len() < 3 {
        return None;
    }

    let link = message.parameters[2].as_str()?;
    conflict_link_re()
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| EntityId::new(m.as_str()))
}

/// Extract the identifier of the entity a creation call produced.
///
/// For properties, a recoverable label conflict yields the existing
/// identifier. Every other error payload is fatal.
pub fn created_entity_id(outcome: ApiOutcome, entity_label: &str, kind: EntityKind) -> Result<EntityId> {
    match outcome {
        ApiOutcome::Entity(entity) => entity
            .get("id")
            .and_then(Value::as_str)
            .map(EntityId::new)
            .ok_or_else(|| {
                ImportError::protocol(entity_label, "created entity has no 'id'", entity.to_string())
            }),
        ApiOutcome::Error(payload) => {
            if kind == EntityKind::Property {
                if let Some(existing) = recover_label_conflict(&payload) {
                    info!(entity = entity_label, id = %existing, "property exists already, reusing it");
                    return Ok(existing);
                }
            }

            error!(
                entity = entity_label,
                %kind,
                code = %payload.code,
                error = %payload.raw,
                "API rejected entity creation"
            );
            Err(ImportError::UnknownApi {
                entity: entity_label.to_string(),
                code: payload.code,
                error: payload.raw.to_string(),
            })
        }
    }
}
