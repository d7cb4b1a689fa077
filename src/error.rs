//! Errors raised while wiring the game into the page.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum UiError {
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("document has no body")]
    NoBody,
    #[error("javascript error: {0}")]
    Js(String),
    #[error("invalid config: {0}")]
    Config(String),
}

impl From<JsValue> for UiError {
    fn from(v: JsValue) -> Self {
        UiError::Js(v.as_string().unwrap_or_else(|| format!("{v:?}")))
    }
}

impl From<UiError> for JsValue {
    fn from(e: UiError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
