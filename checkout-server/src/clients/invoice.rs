//! Invoicing service client
//!
//! Two separate calls so callers can tell "no invoice yet" apart from
//! "invoice exists but could not be downloaded": link resolution returns
//! a normal `ok=false` for documents not yet generated, while the byte
//! fetch reports its own failures.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::Config;
use crate::utils::AppError;

/// Result of resolving an ettn to a transient viewer link
#[derive(Debug, Clone)]
pub struct LinkResolution {
    pub ok: bool,
    pub document_viewer_link: Option<String>,
    pub error: Option<String>,
}

/// Invoicing / document service capability
#[async_trait]
pub trait InvoiceService: Send + Sync {
    /// Resolve a tax-authority transaction id to a transient link.
    ///
    /// A non-success result code from the service (document not yet
    /// generated) is a normal outcome, not an error.
    async fn resolve_document_link(&self, ettn: &str) -> Result<LinkResolution, AppError>;

    /// Stream the document bytes from a resolved link.
    async fn fetch_bytes(&self, link: &str) -> Result<Vec<u8>, AppError>;
}

#[derive(Debug, Serialize)]
struct ResolveRequestBody<'a> {
    ettn: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolveResponseBody {
    success: bool,
    document_viewer_link: Option<String>,
    error: Option<String>,
}

/// HTTP implementation against the invoicing backend
pub struct HttpInvoiceService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpInvoiceService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            client: super::build_http_client(config)?,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            api_key: config.backend_api_key.clone(),
        })
    }
}

#[async_trait]
impl InvoiceService for HttpInvoiceService {
    async fn resolve_document_link(&self, ettn: &str) -> Result<LinkResolution, AppError> {
        let url = format!("{}/invoices/resolve", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&ResolveRequestBody { ettn })
            .send()
            .await
            .map_err(|e| AppError::upstream("invoice", format!("resolve failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(
                "invoice",
                format!("resolve returned {status}"),
            ));
        }

        let parsed: ResolveResponseBody = response
            .json()
            .await
            .map_err(|e| AppError::upstream("invoice", format!("resolve malformed body: {e}")))?;

        Ok(LinkResolution {
            ok: parsed.success,
            document_viewer_link: parsed.document_viewer_link,
            error: parsed.error,
        })
    }

    async fn fetch_bytes(&self, link: &str) -> Result<Vec<u8>, AppError> {
        let response = self
            .client
            .get(link)
            .send()
            .await
            .map_err(|e| AppError::upstream("invoice", format!("download failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(
                "invoice",
                format!("download returned {status}"),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::upstream("invoice", format!("download body failed: {e}")))?;

        Ok(bytes.to_vec())
    }
}
