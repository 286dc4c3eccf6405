//! Ошибки бизнес-логики, по которым handlers выбирают HTTP-статус

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::esign::ESignError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid status transition: {0}")]
    InvalidTransition(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("access denied")]
    Forbidden,
    #[error("link is invalid or expired")]
    InvalidLink,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> anyhow::Error {
        DomainError::Validation(msg.into()).into()
    }
}

/// HTTP-статус для ошибки сервиса
pub fn status_of(err: &anyhow::Error) -> StatusCode {
    if let Some(domain) = err.downcast_ref::<DomainError>() {
        return match domain {
            DomainError::Validation(_) | DomainError::InvalidTransition(_) => {
                StatusCode::BAD_REQUEST
            }
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Forbidden | DomainError::InvalidLink => StatusCode::FORBIDDEN,
        };
    }
    if let Some(esign) = err.downcast_ref::<ESignError>() {
        return match esign {
            ESignError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        };
    }
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Записать ошибку в лог и вернуть статус
pub fn log_status(context: &str, err: anyhow::Error) -> StatusCode {
    let status = status_of(&err);
    if status.is_server_error() {
        tracing::error!("{}: {:#}", context, err);
    } else {
        tracing::warn!("{}: {}", context, err);
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(&DomainError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(&DomainError::NotFound("contract").into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(&DomainError::Forbidden.into()), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(&ESignError::NotConfigured.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_of(&ESignError::Http(500).into()), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_of(&anyhow::anyhow!("db is down")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_context_does_not_hide_kind() {
        let err = anyhow::Error::from(DomainError::NotFound("file")).context("loading file");
        assert_eq!(status_of(&err), StatusCode::NOT_FOUND);
    }
}
