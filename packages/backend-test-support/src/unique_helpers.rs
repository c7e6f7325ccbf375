//! Test helpers for generating unique test data.
//!
//! Every test that seats players should use distinct wallet addresses
//! so runs never collide on escrow accounts or seats. Addresses follow
//! the base58 shape the backend validates (32-44 characters, no 0/O/I/l).

use rand::Rng;

const BASE58_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of generated addresses. The upper bound of the accepted
/// range, matching what real ed25519 public keys usually encode to.
const WALLET_LEN: usize = 44;

/// Generate a random, shape-valid wallet address.
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_wallet;
///
/// let a = unique_wallet();
/// let b = unique_wallet();
/// assert_ne!(a, b);
/// assert_eq!(a.len(), 44);
/// ```
pub fn unique_wallet() -> String {
    let mut rng = rand::rng();
    (0..WALLET_LEN)
        .map(|_| {
            let idx = rng.random_range(0..BASE58_ALPHABET.len());
            BASE58_ALPHABET[idx] as char
        })
        .collect()
}

/// Two distinct wallet addresses, for creator/opponent pairs.
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_wallet_pair;
///
/// let (creator, opponent) = unique_wallet_pair();
/// assert_ne!(creator, opponent);
/// ```
pub fn unique_wallet_pair() -> (String, String) {
    let first = unique_wallet();
    loop {
        let second = unique_wallet();
        if second != first {
            return (first, second);
        }
    }
}
