// Payloads cross the JS boundary as JSON text.

use super::{Engine, EngineError};
use crate::model::{Entity, EntityStart, Frame, Line, Track};
use js_sys::{Function, JSON, Promise, Reflect};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

pub struct TauriEngine {
    invoke: Function,
}

impl TauriEngine {
    /// Looks up `invoke` on the injected Tauri global (v1 `tauri`, v2 `core`).
    pub fn connect() -> Result<Self, EngineError> {
        for namespace in ["tauri", "core"] {
            if let Some(invoke) = tauri_function(&[namespace, "invoke"]) {
                log::info!("connected to engine via __TAURI__.{namespace}.invoke");
                return Ok(Self { invoke });
            }
        }
        Err(EngineError::Transport(
            "__TAURI__ exposes no invoke function".to_string(),
        ))
    }

    async fn invoke<R: DeserializeOwned>(
        &self,
        command: &'static str,
        args: Value,
    ) -> Result<R, EngineError> {
        log::debug!("invoke {command}");
        let args = to_js(&args)?;
        let promise = self
            .invoke
            .call2(&JsValue::NULL, &JsValue::from_str(command), &args)
            .map_err(|e| EngineError::Transport(describe(&e)))?;
        let promise: Promise = promise.dyn_into().map_err(|_| {
            EngineError::Transport(format!("`{command}` did not return a promise"))
        })?;
        let value = JsFuture::from(promise).await.map_err(|e| {
            let err = classify_rejection(command, js_to_json(&e).unwrap_or(Value::Null));
            log::warn!("{err}");
            err
        })?;
        Ok(serde_json::from_value(js_to_json(&value)?)?)
    }
}

impl Engine for TauriEngine {
    async fn entity_positions_at(&self, frame: Frame) -> Result<Vec<Entity>, EngineError> {
        self.invoke("entity_positions_at", args("frame", &frame)?)
            .await
    }

    async fn add_entity(&self, entity: &EntityStart) -> Result<(), EngineError> {
        self.invoke("add_entity", args("entity", entity)?).await
    }

    async fn remove_entity(&self, entity: &EntityStart) -> Result<(), EngineError> {
        self.invoke("remove_entity", args("entity", entity)?).await
    }

    async fn add_line(&self, line: &Line) -> Result<Vec<Line>, EngineError> {
        self.invoke("add_line", args("line", line)?).await
    }

    async fn remove_line(&self, line: &Line) -> Result<Vec<Line>, EngineError> {
        self.invoke("remove_line", args("line", line)?).await
    }

    async fn load_track(&self, path: &str) -> Result<Track, EngineError> {
        self.invoke("load_track", args("path", &path)?).await
    }

    async fn clear(&self) -> Result<(), EngineError> {
        self.invoke("clear", Value::Object(Default::default())).await
    }
}

fn args<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Value, EngineError> {
    let mut map = serde_json::Map::new();
    map.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(Value::Object(map))
}

pub(crate) fn to_js(value: &Value) -> Result<JsValue, EngineError> {
    JSON::parse(&serde_json::to_string(value)?).map_err(|e| EngineError::Transport(describe(&e)))
}

pub(crate) fn js_to_json(value: &JsValue) -> Result<Value, EngineError> {
    if value.is_undefined() || value.is_null() {
        return Ok(Value::Null);
    }
    if let Some(s) = value.as_string() {
        return Ok(Value::String(s));
    }
    let text = JSON::stringify(value).map_err(|e| EngineError::Transport(describe(&e)))?;
    Ok(serde_json::from_str(&String::from(text))?)
}

/// Resolves `window.__TAURI__.<path>` to a function.
pub(crate) fn tauri_function(path: &[&str]) -> Option<Function> {
    let window = web_sys::window()?;
    let mut value = Reflect::get(&window, &JsValue::from_str("__TAURI__")).ok()?;
    for key in path {
        if !value.is_object() {
            return None;
        }
        value = Reflect::get(&value, &JsValue::from_str(key)).ok()?;
    }
    value.dyn_into::<Function>().ok()
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Maps a rejected invoke payload onto the error taxonomy. Commands returning
/// `Result<_, String>` reject with a bare string; structured backends send
/// `{ "kind": "io" | "parse" | ..., "message": ... }`.
pub(crate) fn classify_rejection(command: &'static str, payload: Value) -> EngineError {
    match payload {
        Value::String(message) => EngineError::Rejected { command, message },
        Value::Object(map) => {
            let message = map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(map.clone()).to_string());
            match map.get("kind").and_then(Value::as_str) {
                Some("io") => EngineError::Io(message),
                Some("parse") => EngineError::Parse(message),
                _ => EngineError::Rejected { command, message },
            }
        }
        other => EngineError::Rejected {
            command,
            message: other.to_string(),
        },
    }
}
