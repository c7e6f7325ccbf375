//! Log-safe identifier helpers.
//!
//! Wallet addresses are stable public identifiers; emitting them verbatim
//! lets log aggregation link request traffic to on-chain activity. Log
//! fields therefore carry a short keyed digest instead of the raw address.
//! The digest is stable within a deployment so operators can still
//! correlate lines for one player.

use xxhash_rust::xxh3::xxh3_64;

/// Short log tag for a wallet address, e.g. `w:91f3a40cb2d917e4`.
///
/// Not reversible from logs alone; stable for the lifetime of the address
/// so repeated actions by the same player correlate.
pub fn wallet_tag(addr: &str) -> String {
    format!("w:{:016x}", xxh3_64(addr.as_bytes()))
}

/// Short log tag for an invite code. Codes are single-use capability
/// strings and never appear raw in logs.
pub fn invite_tag(code: &str) -> String {
    format!("i:{:08x}", (xxh3_64(code.as_bytes()) >> 32) as u32)
}
