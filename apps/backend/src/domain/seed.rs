//! Per-match RNG seed derivation.
//!
//! All hidden game state (deck order, mine placement) is generated on the
//! server from seeds derived here. A seed mixes the process-wide secret
//! with the match id, so it is stable for the lifetime of a match, unique
//! across matches, and unpredictable to clients. Move handling never takes
//! randomness from a request.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Derive the 32-byte base seed for a match.
///
/// Same secret + same match id = same seed, so replays of a create
/// request after a retry reconstruct identical hidden state.
pub fn derive_match_seed(secret: &[u8; 32], match_id: &str) -> [u8; 32] {
    *blake3::keyed_hash(secret, match_id.as_bytes()).as_bytes()
}

/// Deterministic RNG stream for one purpose within a match.
///
/// Contexts keep randomness domains independent: drawing the blackjack
/// deck and placing minesweeper mines from the same base seed must not
/// correlate. Use a distinct context string per purpose.
pub fn rng_for_context(match_seed: &[u8; 32], context: &str) -> ChaCha8Rng {
    let stream_seed = blake3::derive_key(context, match_seed);
    ChaCha8Rng::from_seed(stream_seed)
}
