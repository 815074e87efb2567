//! Chat endpoint: one conversational turn per request
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use validator::Validate;

use crate::conversation::ChatResponse;
use crate::error::AppError;
use crate::shared_state::UnifiedAppState;

pub const DEFAULT_USER_ID: &str = "default_user";
pub const MISSING_JSON: &str = "Không có dữ liệu JSON";
pub const INVALID_MESSAGE: &str = "Tin nhắn không hợp lệ hoặc trống";

pub fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    /// Kept untyped so a non-string message is a validation error, not a parse error.
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default = "default_user_id")]
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
}

impl ChatRequest {
    fn message_text(&self) -> Result<&str, AppError> {
        match &self.message {
            Some(Value::String(text)) if !text.trim().is_empty() => Ok(text),
            _ => Err(AppError::Validation(INVALID_MESSAGE.to_string())),
        }
    }
}

/// An empty object counts as no body at all.
fn parse_request(payload: Result<Json<Value>, JsonRejection>) -> Result<ChatRequest, AppError> {
    let missing = || AppError::Validation(MISSING_JSON.to_string());
    let body = match payload {
        Ok(Json(Value::Object(map))) if !map.is_empty() => Value::Object(map),
        Ok(Json(other)) => {
            debug!("Rejected chat body: {}", other);
            return Err(missing());
        }
        Err(e) => {
            debug!("Rejected chat body: {}", e);
            return Err(missing());
        }
    };
    serde_json::from_value(body).map_err(|e| {
        debug!("Rejected chat body: {}", e);
        missing()
    })
}

pub async fn chat(
    State(state): State<UnifiedAppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let req = parse_request(payload)?;

    let message = req.message_text()?;
    req.validate()?;

    let response = state
        .shared_state
        .orchestrator
        .handle_turn(&req.user_id, message)
        .await;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> Result<ChatRequest, AppError> {
        parse_request(Ok(Json(body)))
    }

    #[test]
    fn test_empty_or_non_object_body_is_missing_json() {
        for body in [json!({}), json!(null), json!([]), json!("hi"), json!({"user_id": 7})] {
            match parse(body) {
                Err(AppError::Validation(message)) => assert_eq!(message, MISSING_JSON),
                other => panic!("unexpected: {:?}", other.map(|r| r.user_id)),
            }
        }
    }

    #[test]
    fn test_object_without_message_reaches_message_check() {
        let req = parse(json!({"user_id": "u"})).unwrap();
        assert_eq!(req.user_id, "u");
        match req.message_text() {
            Err(AppError::Validation(message)) => assert_eq!(message, INVALID_MESSAGE),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(parse(json!({"message": "hi"})).unwrap().user_id, DEFAULT_USER_ID);
    }
}
