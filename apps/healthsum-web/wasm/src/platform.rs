//! Browser implementations of the dashboard seams

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::LocalBoxFuture;
use healthsum_core::{Clipboard, ClipboardError, EventLoop, Notification, Notifier, SummaryExport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use crate::transport::describe_js_error;

/// `setTimeout` timers and `spawn_local` tasks
pub struct BrowserLoop;

impl EventLoop for BrowserLoop {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window()
                .ok_or_else(|| JsValue::from_str("No window"))
                .and_then(|window| {
                    window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
                });
            if let Err(e) = scheduled {
                // A sleeper that never wakes would stall the progress ticker
                tracing::warn!("setTimeout failed, waking immediately: {}", describe_js_error(&e));
                let _ = resolve.call0(&JsValue::NULL);
            }
        });
        Box::pin(async move {
            let _ = JsFuture::from(promise).await;
        })
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// `navigator.clipboard`
pub struct BrowserClipboard;

#[async_trait(?Send)]
impl Clipboard for BrowserClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let window = web_sys::window().ok_or_else(|| ClipboardError("No window".to_string()))?;
        let promise = window.navigator().clipboard().write_text(text);
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|e| ClipboardError(describe_js_error(&e)))
    }
}

/// Forwards notifications to the page's `onNotify` callback
#[derive(Clone, Default)]
pub struct JsNotifier {
    callback: Rc<RefCell<Option<js_sys::Function>>>,
}

impl JsNotifier {
    pub fn set_callback(&self, callback: js_sys::Function) {
        *self.callback.borrow_mut() = Some(callback);
    }
}

impl Notifier for JsNotifier {
    fn notify(&self, notification: &Notification) {
        tracing::info!(
            level = ?notification.level,
            "{}: {}",
            notification.title,
            notification.description
        );

        // Cloned so the callback may replace itself
        let callback = self.callback.borrow().clone();
        let Some(callback) = callback else {
            return;
        };
        match serde_wasm_bindgen::to_value(notification) {
            Ok(value) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    tracing::warn!("onNotify callback threw: {}", describe_js_error(&e));
                }
            }
            Err(e) => tracing::warn!("Failed to serialize notification: {}", e),
        }
    }
}

/// Save an export through a temporary object URL
pub fn download(export: &SummaryExport) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;

    let parts = js_sys::Array::of1(&JsValue::from_str(&export.content));
    let options = BlobPropertyBag::new();
    options.set_type(&export.mime_type);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(&export.filename);
    anchor.click();

    Url::revoke_object_url(&url)
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn test_sleep_wakes() {
        BrowserLoop.sleep(Duration::from_millis(1)).await;
        BrowserLoop.sleep(Duration::ZERO).await;
    }
}
