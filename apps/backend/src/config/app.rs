use std::env;
use std::time::Duration;

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::error::AppError;

/// Runtime tuning for match coordination and escrow settlement.
///
/// All values come from environment variables with conservative defaults,
/// so a bare `AppConfig::from_env()` works for local development.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// How long the player to act may idle before the match is forfeited.
    pub turn_timeout: Duration,
    /// How long settled matches stay readable after claim/refund.
    pub retention: Duration,
    /// Maximum settlement attempts against the escrow ledger before
    /// parking the match for manual inspection.
    pub escrow_retry_max: u32,
    /// Base delay for exponential settlement backoff.
    pub escrow_retry_base: Duration,
    /// When set, SubmitMove requires both stakes to be deposited.
    /// Off by default: gameplay and funding are decoupled.
    pub require_funded_play: bool,
    /// Process-wide secret mixed into per-match seed derivation.
    pub seed_secret: [u8; 32],
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            turn_timeout: Duration::from_secs(env_u64("MATCH_TURN_TIMEOUT_SECS", 300)?),
            retention: Duration::from_secs(env_u64("MATCH_RETENTION_SECS", 86_400)?),
            escrow_retry_max: env_u64("ESCROW_RETRY_MAX_ATTEMPTS", 5)? as u32,
            escrow_retry_base: Duration::from_millis(env_u64("ESCROW_RETRY_BASE_MS", 50)?),
            require_funded_play: env_flag("ESCROW_REQUIRE_FUNDED_PLAY", false)?,
            seed_secret: seed_secret()?,
        })
    }
}

/// Parse an optional u64 environment variable with a default.
fn env_u64(name: &str, default: u64) -> Result<u64, AppError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| AppError::config(format!("'{name}' must be an integer, got '{raw}'"))),
    }
}

/// Parse an optional boolean flag; accepts 1/0, true/false, yes/no.
fn env_flag(name: &str, default: bool) -> Result<bool, AppError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(AppError::config(format!(
                "'{name}' must be a boolean flag, got '{other}'"
            ))),
        },
    }
}

/// Load the seed secret from MATCH_SEED_SECRET (64 hex chars), or generate
/// a fresh one per process. Sessions live in process memory, so a per-boot
/// secret loses nothing across restarts.
fn seed_secret() -> Result<[u8; 32], AppError> {
    match env::var("MATCH_SEED_SECRET") {
        Ok(hex) => parse_hex_32(hex.trim()).ok_or_else(|| {
            AppError::config("'MATCH_SEED_SECRET' must be exactly 64 hex characters".to_string())
        }),
        Err(_) => {
            let mut secret = [0u8; 32];
            OsRng
                .try_fill_bytes(&mut secret)
                .map_err(|e| AppError::config(format!("OS RNG unavailable: {e}")))?;
            Ok(secret)
        }
    }
}

fn parse_hex_32(s: &str) -> Option<[u8; 32]> {
    if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let mut out = [0u8; 32];
    for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
        let hi = (chunk[0] as char).to_digit(16)?;
        let lo = (chunk[1] as char).to_digit(16)?;
        out[i] = ((hi << 4) | lo) as u8;
    }
    Some(out)
}
