use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::domain::session::MatchId;
use crate::error::AppError;
use crate::errors::ErrorCode;

/// Match id extracted from the route path parameter.
///
/// Validates shape (length and alphabet) only; whether the match exists
/// is answered by the store when the handler reads it.
#[derive(Debug, Clone)]
pub struct MatchRef(pub MatchId);

impl MatchRef {
    pub fn into_inner(self) -> MatchId {
        self.0
    }
}

impl FromRequest for MatchRef {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let raw = req.match_info().get("match_id").ok_or_else(|| {
                AppError::bad_request(ErrorCode::InvalidMatchId, "Missing match_id parameter")
            })?;

            let match_id = MatchId::parse(raw)?;
            Ok(MatchRef(match_id))
        })
    }
}
