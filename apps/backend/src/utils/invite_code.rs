//! Invite code generation for matches.
//!
//! A match is addressed by a 10-character code in Crockford's Base32
//! alphabet. The code doubles as the join handle the creator shares with
//! their opponent, so it is drawn from the OS RNG rather than a counter.

use rand::rngs::OsRng;
use rand::{Rng, TryRngCore};

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ"; // no I, L, O, U

/// Length of every invite code / match id.
pub const INVITE_CODE_LEN: usize = 10;

/// Generate a fresh invite code.
///
/// # Example
/// ```
/// use backend::utils::invite_code::generate_invite_code;
///
/// let code1 = generate_invite_code();
/// let code2 = generate_invite_code();
/// assert_ne!(code1, code2);
/// assert_eq!(code1.len(), 10);
/// ```
pub fn generate_invite_code() -> String {
    let mut rng = OsRng.unwrap_err();

    let mut s = String::with_capacity(INVITE_CODE_LEN);
    for _ in 0..INVITE_CODE_LEN {
        let idx = rng.random_range(0..CROCKFORD.len());
        s.push(CROCKFORD[idx] as char);
    }
    s
}

/// Whether `code` is shaped like an invite code (length and alphabet).
/// Lowercase input is rejected; codes are canonically uppercase.
pub fn is_valid_invite_code(code: &str) -> bool {
    code.len() == INVITE_CODE_LEN && code.bytes().all(|b| CROCKFORD.contains(&b))
}
