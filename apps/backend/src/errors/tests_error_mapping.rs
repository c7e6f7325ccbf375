// Unit tests for error mapping - pure domain logic without HTTP dependencies
use crate::errors::domain::{
    ConflictKind, DomainError, ForbiddenKind, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn maps_validation_to_422() {
    let de = DomainError::validation(ValidationKind::InvalidStake, "stake must be positive");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::InvalidStake);
    assert_eq!(app.status().as_u16(), 422);

    let de = DomainError::validation(ValidationKind::NotYourTurn, "opponent to act");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::NotYourTurn);
    assert_eq!(app.status().as_u16(), 422);

    // Unnamed kinds fall back to the generic validation code
    let de = DomainError::validation(ValidationKind::Other("odd".into()), "bad field");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::ValidationError);
    assert_eq!(app.status().as_u16(), 422);
}

#[test]
fn maps_conflicts() {
    let full = DomainError::conflict(ConflictKind::MatchFull, "both seats taken");
    let app: AppError = full.into();
    assert_eq!(app.code().as_str(), "MATCH_FULL");
    assert_eq!(app.status().as_u16(), 409);

    let stale = DomainError::conflict(ConflictKind::StaleState, "version mismatch");
    let app: AppError = stale.into();
    assert_eq!(app.code().as_str(), "STALE_STATE");
    assert_eq!(app.status().as_u16(), 409);

    let claimed = DomainError::conflict(ConflictKind::AlreadyClaimed, "payout already taken");
    let app: AppError = claimed.into();
    assert_eq!(app.code().as_str(), "ALREADY_CLAIMED");
    assert_eq!(app.status().as_u16(), 409);

    // Test generic conflict fallback
    let other = DomainError::conflict(
        ConflictKind::Other("some conflict".to_string()),
        "generic conflict",
    );
    let app: AppError = other.into();
    assert_eq!(app.code().as_str(), "CONFLICT");
    assert_eq!(app.status().as_u16(), 409);
}

#[test]
fn maps_not_found() {
    let nf = DomainError::not_found(NotFoundKind::Match, "no such match");
    let app: AppError = nf.into();
    assert_eq!(app.code().as_str(), "MATCH_NOT_FOUND");
    assert_eq!(app.status().as_u16(), 404);

    let nf = DomainError::not_found(NotFoundKind::Escrow, "no escrow opened");
    let app: AppError = nf.into();
    assert_eq!(app.code().as_str(), "ESCROW_NOT_FOUND");
    assert_eq!(app.status().as_u16(), 404);
}

#[test]
fn maps_forbidden() {
    let fb = DomainError::forbidden(ForbiddenKind::NotWinner, "loser cannot claim");
    let app: AppError = fb.into();
    assert_eq!(app.code().as_str(), "NOT_WINNER");
    assert_eq!(app.status().as_u16(), 403);

    let fb = DomainError::forbidden(ForbiddenKind::NotAParticipant, "outsider");
    let app: AppError = fb.into();
    assert_eq!(app.code().as_str(), "NOT_A_PARTICIPANT");
    assert_eq!(app.status().as_u16(), 403);
}

#[test]
fn maps_infra() {
    let t = DomainError::infra(InfraErrorKind::Timeout, "timeout");
    let app: AppError = t.into();
    assert_eq!(app.code().as_str(), "STORE_TIMEOUT");
    assert_eq!(app.status().as_u16(), 504);
    // Verify it's a Timeout AppError, not Validation
    assert!(matches!(app, AppError::Timeout { .. }));

    let down = DomainError::infra(InfraErrorKind::LedgerUnavailable, "down");
    let app: AppError = down.into();
    assert_eq!(app.code().as_str(), "LEDGER_UNAVAILABLE");
    assert_eq!(app.status().as_u16(), 503);

    let corr = DomainError::infra(InfraErrorKind::DataCorruption, "bad");
    let app: AppError = corr.into();
    assert_eq!(app.code().as_str(), "DATA_CORRUPTION");
    assert_eq!(app.status().as_u16(), 500);

    let other = DomainError::infra(InfraErrorKind::Other("unknown".to_string()), "other");
    let app: AppError = other.into();
    assert_eq!(app.code().as_str(), "INTERNAL_ERROR");
    assert_eq!(app.status().as_u16(), 500);
}

#[test]
fn transient_classification() {
    assert!(DomainError::infra(InfraErrorKind::Timeout, "t").is_transient());
    assert!(DomainError::infra(InfraErrorKind::LedgerUnavailable, "t").is_transient());
    assert!(!DomainError::infra(InfraErrorKind::DataCorruption, "t").is_transient());
    assert!(!DomainError::conflict(ConflictKind::StaleState, "t").is_transient());
    assert!(!DomainError::validation(ValidationKind::AmountMismatch, "t").is_transient());
}

#[test]
fn constructor_helpers() {
    let validation = DomainError::validation(ValidationKind::InvalidStake, "invalid input");
    assert!(matches!(
        validation,
        DomainError::Validation(ValidationKind::InvalidStake, _)
    ));

    let conflict = DomainError::conflict(ConflictKind::MatchFull, "seat taken");
    assert!(matches!(
        conflict,
        DomainError::Conflict(ConflictKind::MatchFull, _)
    ));

    let not_found = DomainError::not_found(NotFoundKind::Match, "match missing");
    assert!(matches!(
        not_found,
        DomainError::NotFound(NotFoundKind::Match, _)
    ));

    let infra = DomainError::infra(InfraErrorKind::Timeout, "timeout");
    assert!(matches!(
        infra,
        DomainError::Infra(InfraErrorKind::Timeout, _)
    ));
}
