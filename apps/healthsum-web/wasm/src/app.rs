//! Page controller exposed to JavaScript

use healthsum_core::{ClientConfig, Dashboard, Document};
use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::File;

use crate::logging;
use crate::outcome_label;
use crate::platform::{download, BrowserClipboard, BrowserLoop, JsNotifier};
use crate::transport::FetchService;

/// Health report dashboard held in Rust memory
///
/// JavaScript only forwards DOM events and renders the view passed to
/// `onChange`.
#[wasm_bindgen]
pub struct HealthSummaryApp {
    dashboard: Dashboard<FetchService>,
    notifier: JsNotifier,
}

#[wasm_bindgen]
impl HealthSummaryApp {
    /// Create the app from an optional JSON `ClientConfig` and load history
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<HealthSummaryApp, JsValue> {
        let config = parse_config(config_json.as_deref()).map_err(|e| JsValue::from_str(&e))?;
        logging::init(&config.log_filter);
        tracing::info!(upload_url = %config.upload_url, "Starting health summary app");

        let notifier = JsNotifier::default();
        let dashboard = Dashboard::new(
            &config,
            FetchService::new(config.clone()),
            BrowserLoop,
            notifier.clone(),
        );
        dashboard.spawn_history_refresh();

        Ok(Self {
            dashboard,
            notifier,
        })
    }

    /// Validate and upload a picked or dropped file
    ///
    /// Resolves to `"rejected"`, `"succeeded"`, `"failed"` or `"superseded"`.
    #[wasm_bindgen(js_name = submitFile)]
    pub fn submit_file(&self, file: File) -> Promise {
        let dashboard = self.dashboard.clone();
        future_to_promise(async move {
            let document = Document::new(file.name(), file.size() as u64, file.type_());
            let outcome = dashboard.submit(document, file).await;
            Ok(JsValue::from_str(outcome_label(outcome)))
        })
    }

    #[wasm_bindgen(js_name = refreshHistory)]
    pub fn refresh_history(&self) -> Promise {
        let dashboard = self.dashboard.clone();
        future_to_promise(async move {
            dashboard.refresh_history().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Show a history entry; resolves to `false` for an unknown id
    #[wasm_bindgen(js_name = openHistoryEntry)]
    pub fn open_history_entry(&self, id: String) -> Promise {
        let dashboard = self.dashboard.clone();
        future_to_promise(async move {
            let opened = dashboard.open_history_entry(&id).await;
            Ok(JsValue::from_bool(opened))
        })
    }

    #[wasm_bindgen(js_name = copySummary)]
    pub fn copy_summary(&self) -> Promise {
        let dashboard = self.dashboard.clone();
        future_to_promise(async move {
            let copied = dashboard.copy_summary(&BrowserClipboard).await;
            Ok(JsValue::from_bool(copied))
        })
    }

    /// Download the displayed summary as Markdown; `false` when there is none
    #[wasm_bindgen(js_name = downloadSummary)]
    pub fn download_summary(&self) -> Result<bool, JsValue> {
        match self.dashboard.export_summary() {
            Some(export) => {
                download(&export)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[wasm_bindgen(js_name = toggleHistory)]
    pub fn toggle_history(&self) {
        self.dashboard.toggle_history();
    }

    #[wasm_bindgen(js_name = toggleColorMode)]
    pub fn toggle_color_mode(&self) {
        self.dashboard.toggle_color_mode();
    }

    /// Current view state as a plain object
    pub fn view(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.dashboard.view())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Register a render callback: `(view) => void`
    ///
    /// The callback may call `view()` but not `onChange`.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: Function) {
        self.dashboard.on_change(move |view| match serde_wasm_bindgen::to_value(view) {
            Ok(value) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    tracing::warn!("onChange callback threw: {:?}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize view: {}", e),
        });
    }

    /// Register the toast callback: `({ level, title, description }) => void`
    #[wasm_bindgen(js_name = onNotify)]
    pub fn on_notify(&self, callback: Function) {
        self.notifier.set_callback(callback);
    }
}

/// Blank input means defaults
fn parse_config(json: Option<&str>) -> Result<ClientConfig, String> {
    match json.map(str::trim) {
        Some(json) if !json.is_empty() => {
            ClientConfig::from_json(json).map_err(|e| format!("Invalid config: {}", e))
        }
        _ => Ok(ClientConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthsum_core::HistoryFallback;

    #[test]
    fn test_parse_config_defaults() {
        assert_eq!(parse_config(None).unwrap(), ClientConfig::default());
        assert_eq!(parse_config(Some("  ")).unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_parse_config_overrides() {
        let config = parse_config(Some(r#"{"history_fallback":"demo","tick_interval_ms":50}"#)).unwrap();
        assert_eq!(config.history_fallback, HistoryFallback::Demo);
        assert_eq!(config.tick_interval_ms, 50);
    }

    #[test]
    fn test_parse_config_rejects_zero_tick_interval() {
        let err = parse_config(Some(r#"{"tick_interval_ms":0}"#)).unwrap_err();
        assert!(err.contains("tick_interval_ms must be at least 1"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_json() {
        let err = parse_config(Some("{not json")).unwrap_err();
        assert!(err.starts_with("Invalid config:"));
    }
}
