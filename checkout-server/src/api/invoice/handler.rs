//! Invoice API Handlers

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Stream the invoice PDF for a finalized order.
///
/// Returns 404 while the document is still being issued upstream; the
/// client is expected to poll.
pub async fn download(
    State(state): State<ServerState>,
    Path(ettn): Path<String>,
) -> AppResult<impl IntoResponse> {
    if ettn.trim().is_empty() {
        return Err(AppError::validation("ettn must not be empty"));
    }
    let bytes = state.checkout.invoice_pdf(&ettn).await?;
    let disposition = format!("attachment; filename=\"{ettn}.pdf\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
