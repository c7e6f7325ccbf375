//! Realtime match watch over WebSocket.

pub mod protocol;
pub mod session;
