use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::models::Contract;
use crate::services::{ContractNotice, ContractUpload, Requester};
use crate::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Extension, Json,
};

fn requester(auth: &AuthUser) -> Requester {
    Requester {
        user_id: auth.id,
        is_admin: auth.is_admin(),
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Upload exceeds the size limit".to_string())
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// POST /api/contracts/upload (multipart/form-data)
/// Fields:
/// - file: the contract document (required)
/// - service_id: catalog service the contract belongs to (optional)
pub async fn upload_contract(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let max_bytes = state.contract_service.max_upload_bytes();
    let mut service_id: Option<i64> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("contract").to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                if data.len() > max_bytes {
                    return Err(AppError::PayloadTooLarge(format!(
                        "File exceeds the {} byte limit",
                        max_bytes
                    )));
                }
                file = Some((file_name, data.to_vec()));
            }
            Some("service_id") => {
                let raw = field.text().await.map_err(multipart_error)?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    service_id = Some(raw.parse().map_err(|_| {
                        AppError::Validation("service_id must be a number".to_string())
                    })?);
                }
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| AppError::Validation("A file field is required".to_string()))?;

    let contract = state
        .contract_service
        .upload(ContractUpload {
            user_id: auth.id,
            service_id,
            file_name,
            bytes,
        })
        .await?;

    notify_admin(&state, &auth, &contract).await;

    Ok((StatusCode::CREATED, Json(contract)))
}

/// Emails the administrator about a new upload. Failures are logged only.
async fn notify_admin(state: &AppState, auth: &AuthUser, contract: &Contract) {
    let uploader_email = match state.user_service.find_user_by_id(auth.id).await {
        Ok(Some(user)) => user.email,
        Ok(None) => String::new(),
        Err(e) => {
            tracing::warn!("Could not load uploader {}: {}", auth.id, e);
            String::new()
        }
    };

    let service_title = match contract.service_id {
        Some(id) => state.catalog_service.get(id).await.ok().map(|s| s.title),
        None => None,
    };

    let notice = ContractNotice {
        contract_id: contract.id,
        uploader_name: auth.name.clone(),
        uploader_email,
        file_name: contract.original_name.clone(),
        service_title,
    };

    if let Err(e) = state.email_service.send_contract_notification(&notice).await {
        tracing::warn!(
            "Failed to send contract notification for {}: {}",
            contract.id,
            e
        );
    }
}

/// GET /api/contracts
pub async fn list_contracts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Contract>>> {
    Ok(Json(
        state.contract_service.list_visible(requester(&auth)).await?,
    ))
}

/// GET /api/contracts/{id}/download
pub async fn download_contract(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let (contract, bytes) = state
        .contract_service
        .read_file(id, requester(&auth))
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&contract.content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    if let Ok(value) = HeaderValue::from_str(&content_disposition(&contract.original_name)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((headers, bytes))
}

/// DELETE /api/contracts/{id}
pub async fn delete_contract(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.contract_service.delete(id, requester(&auth)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Attachment header with an ASCII fallback name and the UTF-8 original,
/// since most uploaded names are Arabic.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_keeps_utf8_name() {
        let value = content_disposition("عقد 1.pdf");
        assert!(value.starts_with("attachment; filename=\"____1.pdf\""));
        assert!(value.contains("filename*=UTF-8''%D8%B9%D9%82%D8%AF%201.pdf"));
    }
}
