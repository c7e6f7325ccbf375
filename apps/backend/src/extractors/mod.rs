pub mod match_ref;
pub mod player_wallet;
pub mod validated_json;

pub use match_ref::MatchRef;
pub use player_wallet::{MaybeWallet, PlayerWallet, WALLET_HEADER};
pub use validated_json::ValidatedJson;
