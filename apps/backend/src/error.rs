use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::domain::{
    ConflictKind, DomainError, ForbiddenKind, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;
use crate::trace_ctx;

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Forbidden: {detail}")]
    Forbidden { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Timeout: {detail}")]
    Timeout { code: ErrorCode, detail: String },
    #[error("Unavailable: {detail}")]
    Unavailable { code: ErrorCode, detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    /// The stable error code for this error variant.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. } => *code,
            AppError::BadRequest { code, .. } => *code,
            AppError::NotFound { code, .. } => *code,
            AppError::Forbidden { code, .. } => *code,
            AppError::Conflict { code, .. } => *code,
            AppError::Timeout { code, .. } => *code,
            AppError::Unavailable { code, .. } => *code,
            AppError::Internal { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// Human-oriented detail string for this error.
    fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. } => detail.clone(),
            AppError::BadRequest { detail, .. } => detail.clone(),
            AppError::NotFound { detail, .. } => detail.clone(),
            AppError::Forbidden { detail, .. } => detail.clone(),
            AppError::Conflict { detail, .. } => detail.clone(),
            AppError::Timeout { detail, .. } => detail.clone(),
            AppError::Unavailable { detail, .. } => detail.clone(),
            AppError::Internal { detail, .. } => detail.clone(),
            AppError::Config { detail } => detail.clone(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn forbidden(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Forbidden {
            code,
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn timeout(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Timeout {
            code,
            detail: detail.into(),
        }
    }

    pub fn unavailable(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Unavailable {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::InternalError,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<std::env::VarError> for AppError {
    fn from(e: std::env::VarError) -> Self {
        AppError::config(format!("env var error: {e}"))
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(kind, detail) => {
                let code = match kind {
                    ValidationKind::InvalidStake => ErrorCode::InvalidStake,
                    ValidationKind::InvalidWallet => ErrorCode::InvalidWallet,
                    ValidationKind::InvalidMatchId => ErrorCode::InvalidMatchId,
                    ValidationKind::InvalidGameKind => ErrorCode::InvalidGameKind,
                    ValidationKind::AmountMismatch => ErrorCode::AmountMismatch,
                    ValidationKind::NotYourTurn => ErrorCode::NotYourTurn,
                    ValidationKind::GameNotActive => ErrorCode::GameNotActive,
                    ValidationKind::IllegalMove => ErrorCode::IllegalMove,
                    ValidationKind::SelfJoin => ErrorCode::SelfJoin,
                    ValidationKind::StakeNotFunded => ErrorCode::StakeNotFunded,
                    _ => ErrorCode::ValidationError,
                };
                AppError::validation(code, detail)
            }
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::MatchFull => ErrorCode::MatchFull,
                    ConflictKind::StaleState => ErrorCode::StaleState,
                    ConflictKind::AlreadyClaimed => ErrorCode::AlreadyClaimed,
                    ConflictKind::AlreadyDeposited => ErrorCode::AlreadyDeposited,
                    ConflictKind::AlreadyRefunded => ErrorCode::AlreadyRefunded,
                    ConflictKind::EscrowNotFunded => ErrorCode::EscrowNotFunded,
                    ConflictKind::WinnerConflict => ErrorCode::WinnerConflict,
                    ConflictKind::InviteCodeConflict => ErrorCode::InviteCodeConflict,
                    _ => ErrorCode::Conflict,
                };
                AppError::conflict(code, detail)
            }
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Match => ErrorCode::MatchNotFound,
                    NotFoundKind::Escrow => ErrorCode::EscrowNotFound,
                    _ => ErrorCode::NotFound,
                };
                AppError::not_found(code, detail)
            }
            DomainError::Forbidden(kind, detail) => {
                let code = match kind {
                    ForbiddenKind::NotAParticipant => ErrorCode::NotAParticipant,
                    ForbiddenKind::NotWinner => ErrorCode::NotWinner,
                    ForbiddenKind::NotCreator => ErrorCode::NotCreator,
                    _ => ErrorCode::Forbidden,
                };
                AppError::forbidden(code, detail)
            }
            DomainError::Infra(kind, detail) => match kind {
                InfraErrorKind::Timeout => AppError::timeout(ErrorCode::StoreTimeout, detail),
                InfraErrorKind::StoreUnavailable => {
                    AppError::unavailable(ErrorCode::StoreUnavailable, detail)
                }
                InfraErrorKind::LedgerUnavailable => {
                    AppError::unavailable(ErrorCode::LedgerUnavailable, detail)
                }
                InfraErrorKind::DataCorruption => AppError::Internal {
                    code: ErrorCode::DataCorruption,
                    detail,
                },
                _ => AppError::internal(detail),
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().to_string();
        let detail = self.detail();
        let trace_id = trace_ctx::trace_id();

        let problem_details = ProblemDetails {
            type_: format!("https://stakehouse.dev/errors/{code}"),
            title: Self::humanize_code(&code),
            status: status.as_u16(),
            detail,
            code,
            trace_id: trace_id.clone(),
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id))
            .json(problem_details)
    }
}
