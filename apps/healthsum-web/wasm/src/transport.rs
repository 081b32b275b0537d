//! `fetch`-based transport for the analysis service

use async_trait::async_trait;
use healthsum_core::service::{is_success, parse_history, parse_summary};
use healthsum_core::{AnalysisService, ClientConfig, Document, HistoryEntry, ServiceError, SummaryResult};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, File, FormData, Request, RequestInit, RequestMode, Response};

pub struct FetchService {
    config: ClientConfig,
}

impl FetchService {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

/// Status line and body of a finished request
struct Reply {
    status: u16,
    status_text: String,
    body: String,
}

#[async_trait(?Send)]
impl AnalysisService for FetchService {
    type Payload = File;

    async fn upload(&self, document: &Document, file: File) -> Result<SummaryResult, ServiceError> {
        let form = FormData::new().map_err(transport_error)?;
        form.append_with_blob_and_filename("file", &file, &document.name)
            .map_err(transport_error)?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&form);

        let reply = send(&self.config.upload_url, &opts).await?;
        parse_summary(reply.status, &reply.status_text, &reply.body)
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, ServiceError> {
        let reply = send(&self.config.history_url, &get()).await?;
        parse_history(reply.status, &reply.status_text, &reply.body)
    }

    async fn entry_detail(&self, id: &str) -> Result<Option<SummaryResult>, ServiceError> {
        let Some(url) = self.config.detail_url_for(id) else {
            return Ok(None);
        };
        let reply = send(&url, &get()).await?;
        parse_summary(reply.status, &reply.status_text, &reply.body).map(Some)
    }
}

fn get() -> RequestInit {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);
    opts
}

/// Aborts the in-flight request when the future awaiting it is dropped
struct AbortOnDrop {
    controller: AbortController,
    armed: bool,
}

impl AbortOnDrop {
    fn new() -> Result<Self, ServiceError> {
        let controller = AbortController::new().map_err(transport_error)?;
        Ok(Self {
            controller,
            armed: true,
        })
    }

    fn attach(&self, opts: &RequestInit) {
        opts.set_signal(Some(&self.controller.signal()));
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("Aborting superseded request");
            self.controller.abort();
        }
    }
}

async fn send(url: &str, opts: &RequestInit) -> Result<Reply, ServiceError> {
    let window = web_sys::window().ok_or_else(|| ServiceError::Transport("No window".to_string()))?;
    let mut abort = AbortOnDrop::new()?;
    abort.attach(opts);
    let request = Request::new_with_str_and_init(url, opts).map_err(transport_error)?;

    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport_error)?;
    let response: Response = response.dyn_into().map_err(transport_error)?;

    let status = response.status();
    let status_text = response.status_text();
    if !is_success(status) {
        // Error bodies are not inspected
        abort.disarm();
        return Ok(Reply {
            status,
            status_text,
            body: String::new(),
        });
    }

    let text = JsFuture::from(response.text().map_err(transport_error)?)
        .await
        .map_err(transport_error)?;
    abort.disarm();
    Ok(Reply {
        status,
        status_text,
        body: text.as_string().unwrap_or_default(),
    })
}

fn transport_error(error: JsValue) -> ServiceError {
    ServiceError::Transport(describe_js_error(&error))
}

/// Best-effort text for a thrown JS value
pub fn describe_js_error(error: &JsValue) -> String {
    if let Some(message) = error.as_string() {
        return message;
    }
    js_sys::Reflect::get(error, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{:?}", error))
}
