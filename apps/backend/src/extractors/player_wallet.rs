use actix_web::{dev::Payload, FromRequest, HttpRequest};

use crate::domain::wallet::WalletAddr;
use crate::error::AppError;
use crate::errors::ErrorCode;

/// Header carrying the caller's wallet address.
pub const WALLET_HEADER: &str = "x-wallet-addr";

/// Caller identity extracted from the `x-wallet-addr` header.
///
/// The address is validated for shape only; ownership proof is out of
/// scope for this service and handled upstream.
#[derive(Debug, Clone)]
pub struct PlayerWallet(pub WalletAddr);

impl PlayerWallet {
    pub fn into_inner(self) -> WalletAddr {
        self.0
    }
}

impl FromRequest for PlayerWallet {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let raw = req
                .headers()
                .get(WALLET_HEADER)
                .ok_or_else(|| {
                    AppError::bad_request(
                        ErrorCode::InvalidHeader,
                        format!("Missing {WALLET_HEADER} header"),
                    )
                })?
                .to_str()
                .map_err(|_| {
                    AppError::bad_request(
                        ErrorCode::InvalidHeader,
                        format!("{WALLET_HEADER} header must be ASCII"),
                    )
                })?;

            let wallet = WalletAddr::parse(raw)?;
            Ok(PlayerWallet(wallet))
        })
    }
}

/// Header-optional caller identity for read surfaces that also serve
/// spectators. Absence is fine; a present but malformed header is still
/// rejected rather than silently downgraded to a spectator.
#[derive(Debug, Clone)]
pub struct MaybeWallet(pub Option<WalletAddr>);

impl MaybeWallet {
    pub fn into_inner(self) -> Option<WalletAddr> {
        self.0
    }
}

impl FromRequest for MaybeWallet {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let Some(value) = req.headers().get(WALLET_HEADER) else {
                return Ok(MaybeWallet(None));
            };
            let raw = value.to_str().map_err(|_| {
                AppError::bad_request(
                    ErrorCode::InvalidHeader,
                    format!("{WALLET_HEADER} header must be ASCII"),
                )
            })?;

            let wallet = WalletAddr::parse(raw)?;
            Ok(MaybeWallet(Some(wallet)))
        })
    }
}
