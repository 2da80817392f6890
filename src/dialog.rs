use js_sys::{Function, Promise};
use serde_json::{Value, json};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::engine::tauri::{js_to_json, tauri_function, to_js};

#[derive(Debug, Error)]
pub enum DialogError {
    #[error("single file picker picked multiple files")]
    InvalidSelection,
    #[error("file dialog unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected file dialog result: {0}")]
    Decode(String),
}

/// Asks the user for one track file. `Ok(None)` when the dialog is dismissed.
pub async fn open_single_file_picker() -> Result<Option<String>, DialogError> {
    let open = dialog_open()?;
    let options = to_js(&json!({
        "title": "track picker",
        "multiple": false,
        "directory": false,
    }))
    .map_err(|e| DialogError::Decode(e.to_string()))?;
    let promise = open
        .call1(&JsValue::NULL, &options)
        .map_err(|e| DialogError::Unavailable(format!("{e:?}")))?
        .dyn_into::<Promise>()
        .map_err(|_| DialogError::Unavailable("open() did not return a promise".to_string()))?;
    let picked = JsFuture::from(promise)
        .await
        .map_err(|e| DialogError::Unavailable(format!("{e:?}")))?;
    let picked = js_to_json(&picked).map_err(|e| DialogError::Decode(e.to_string()))?;
    interpret_selection(picked)
}

fn dialog_open() -> Result<Function, DialogError> {
    tauri_function(&["dialog", "open"])
        .ok_or_else(|| DialogError::Unavailable("__TAURI__.dialog.open missing".into()))
}

pub(crate) fn interpret_selection(picked: Value) -> Result<Option<String>, DialogError> {
    match picked {
        Value::Null => Ok(None),
        Value::String(path) if path.is_empty() => Ok(None),
        Value::String(path) => Ok(Some(path)),
        Value::Array(_) => Err(DialogError::InvalidSelection),
        other => Err(DialogError::Decode(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_path_is_returned() {
        let picked = interpret_selection(json!("C:/tracks/uh oh.trk")).unwrap();
        assert_eq!(picked.as_deref(), Some("C:/tracks/uh oh.trk"));
    }

    #[test]
    fn cancelled_dialog_is_not_an_error() {
        assert_eq!(interpret_selection(Value::Null).unwrap(), None);
        assert_eq!(interpret_selection(json!("")).unwrap(), None);
    }

    #[test]
    fn multiple_selection_is_rejected() {
        let err = interpret_selection(json!(["a.trk", "b.trk"])).unwrap_err();
        assert!(matches!(err, DialogError::InvalidSelection));
    }
}
