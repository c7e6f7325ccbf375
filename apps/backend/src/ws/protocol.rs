//! Wire messages for the match watch socket.
//!
//! The subscription is the connection: the match id sits in the upgrade
//! path, so there is no topic handshake. The server's first frame is
//! always a full snapshot, and every accepted write pushes another one.
//! Pushes are not strictly ordered under write races; each snapshot
//! carries the document version and receivers keep the highest.

use serde::{Deserialize, Serialize};

use crate::domain::view::SessionView;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Ask for a fresh snapshot out of band, e.g. after the client
    /// suspects it has been backgrounded past the lag window.
    Refresh,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// The match as this viewer may see it. Redaction happened already;
    /// hidden state for the other seat is simply absent.
    Snapshot { view: SessionView },

    Error { code: ErrorCode, message: String },
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    /// The match aged out of the live store; there is nothing left to
    /// watch and the server closes after sending this.
    MatchGone,
}
