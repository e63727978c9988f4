use serde_json::{Value, json};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("view {plugin}.{view} not found")]
    ViewNotFound { plugin: String, view: String },

    #[error("malformed request: {0}")]
    MalformedBody(String),

    #[error("view {view} has no handler for event '{event}'")]
    UnknownEvent { view: String, event: String },

    #[error("view engine failure: {0}")]
    Engine(String),
}

impl ViewError {
    pub fn not_found(plugin: &str, view: &str) -> Self {
        ViewError::ViewNotFound {
            plugin: plugin.to_string(),
            view: view.to_string(),
        }
    }

    pub fn engine<T: Into<String>>(msg: T) -> Self {
        ViewError::Engine(msg.into())
    }

    /// Errors caused by the request rather than the engine; a web layer
    /// reports these back to the user instead of failing the request.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, ViewError::Engine(_))
    }

    /// Suggested HTTP status for the web layer
    pub fn status_code(&self) -> u16 {
        match self {
            ViewError::ViewNotFound { .. } => 404,
            ViewError::MalformedBody(_) | ViewError::UnknownEvent { .. } => 400,
            ViewError::Engine(_) => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ViewError::ViewNotFound { .. } => "view_not_found",
            ViewError::MalformedBody(_) => "malformed_body",
            ViewError::UnknownEvent { .. } => "unknown_event",
            ViewError::Engine(_) => "engine_error",
        }
    }

    /// JSON error body; engine internals are not leaked
    pub fn to_json(&self) -> Value {
        let message = if self.is_user_facing() {
            self.to_string()
        } else {
            "internal error while rendering view".to_string()
        };
        json!({ "error": { "code": self.code(), "message": message } })
    }
}
