//! HTTP transport built on reqwest

use std::path::PathBuf;

use async_trait::async_trait;
use healthsum_core::service::{is_success, parse_history, parse_summary};
use healthsum_core::{AnalysisService, ClientConfig, Document, HistoryEntry, ServiceError, SummaryResult};
use reqwest::multipart::{Form, Part};

pub struct ReqwestService {
    client: reqwest::Client,
    config: ClientConfig,
}

impl ReqwestService {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

struct Reply {
    status: u16,
    status_text: String,
    body: String,
}

#[async_trait(?Send)]
impl AnalysisService for ReqwestService {
    type Payload = PathBuf;

    async fn upload(&self, document: &Document, path: PathBuf) -> Result<SummaryResult, ServiceError> {
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| ServiceError::Transport(format!("cannot read {}: {}", path.display(), e)))?;

        let mime = if document.declared_type.is_empty() {
            "application/octet-stream"
        } else {
            document.declared_type.as_str()
        };
        let part = Part::bytes(bytes)
            .file_name(document.name.clone())
            .mime_str(mime)
            .map_err(transport_error)?;
        let form = Form::new().part("file", part);

        let reply = read_reply(
            self.client
                .post(&self.config.upload_url)
                .multipart(form)
                .send()
                .await,
        )
        .await?;
        parse_summary(reply.status, &reply.status_text, &reply.body)
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, ServiceError> {
        let reply = read_reply(self.client.get(&self.config.history_url).send().await).await?;
        parse_history(reply.status, &reply.status_text, &reply.body)
    }

    async fn entry_detail(&self, id: &str) -> Result<Option<SummaryResult>, ServiceError> {
        let Some(url) = self.config.detail_url_for(id) else {
            return Ok(None);
        };
        let reply = read_reply(self.client.get(&url).send().await).await?;
        parse_summary(reply.status, &reply.status_text, &reply.body).map(Some)
    }
}

async fn read_reply(sent: reqwest::Result<reqwest::Response>) -> Result<Reply, ServiceError> {
    let response = sent.map_err(transport_error)?;
    let status = response.status();
    let status_text = status.canonical_reason().unwrap_or_default().to_string();

    if !is_success(status.as_u16()) {
        return Ok(Reply {
            status: status.as_u16(),
            status_text,
            body: String::new(),
        });
    }

    let body = response.text().await.map_err(transport_error)?;
    Ok(Reply {
        status: status.as_u16(),
        status_text,
        body,
    })
}

fn transport_error(error: reqwest::Error) -> ServiceError {
    ServiceError::Transport(error.to_string())
}

/// MIME type reported for a local file, by extension
pub fn mime_for(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    if lower.ends_with(".pdf") {
        "application/pdf"
    } else if lower.ends_with(".csv") {
        "text/csv"
    } else {
        ""
    }
}
