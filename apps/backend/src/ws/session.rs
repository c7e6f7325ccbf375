//! One actor per watch socket.
//!
//! The upgrade handler subscribes to the match before reading the
//! initial snapshot, so nothing accepted between snapshot and stream
//! can be missed. The store's broadcast channel does the fan-out; the
//! actor only projects each accepted write for its viewer and keeps
//! the connection honest with heartbeats.

use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::session::{MatchId, MatchSession};
use crate::domain::view::SessionView;
use crate::domain::wallet::WalletAddr;
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::extractors::match_ref::MatchRef;
use crate::extractors::player_wallet::MaybeWallet;
use crate::logging::wallet_tag;
use crate::state::app_state::AppState;
use crate::store::{SessionUpdate, UnsubscribeGuard};
use crate::ws::protocol::{ClientMsg, ErrorCode, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

/// GET /api/ws/matches/{match_id}
///
/// Upgrades to a watch socket. The wallet header is optional: without
/// it the socket streams the spectator projection.
pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    match_ref: MatchRef,
    viewer: MaybeWallet,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let match_id = match_ref.into_inner();

    // Subscribe first: a write landing between the snapshot read and
    // the subscription would otherwise vanish for this client.
    let watch = app_state
        .store
        .subscribe(&match_id)
        .await
        .map_err(AppError::from)?;
    let initial = app_state
        .store
        .get(&match_id)
        .await
        .map_err(AppError::from)?;

    let session = WsSession::new(match_id, viewer.into_inner(), app_state, initial, watch);
    ws::start(session, &req, stream)
}

pub struct WsSession {
    conn_id: Uuid,
    match_id: MatchId,
    viewer: Option<WalletAddr>,
    viewer_tag: String,
    app_state: web::Data<AppState>,

    // Taken in started(); the guard must outlive the stream.
    initial: Option<MatchSession>,
    updates: Option<broadcast::Receiver<SessionUpdate>>,
    _guard: UnsubscribeGuard,

    last_heartbeat: Instant,
}

impl WsSession {
    fn new(
        match_id: MatchId,
        viewer: Option<WalletAddr>,
        app_state: web::Data<AppState>,
        initial: MatchSession,
        watch: crate::store::SessionWatch,
    ) -> Self {
        let viewer_tag = viewer
            .as_ref()
            .map(|wallet| wallet_tag(wallet.as_str()))
            .unwrap_or_else(|| "spectator".to_string());
        let (updates, guard) = watch.into_parts();
        Self {
            conn_id: Uuid::new_v4(),
            match_id,
            viewer,
            viewer_tag,
            app_state,
            initial: Some(initial),
            updates: Some(updates),
            _guard: guard,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error_and_close(
        &self,
        ctx: &mut ws::WebsocketContext<Self>,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        let msg = ServerMsg::Error {
            code,
            message: message.into(),
        };
        Self::send_json(ctx, &msg);
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
        ctx.stop();
    }

    fn push_snapshot(&self, ctx: &mut ws::WebsocketContext<Self>, doc: &MatchSession) {
        let view = SessionView::for_viewer(doc, self.viewer.as_ref());
        Self::send_json(ctx, &ServerMsg::Snapshot { view });
    }

    /// Re-read the live document and push it. Used after broadcast lag
    /// and on client request; a plain push of current truth either way.
    fn refresh(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let app_state = self.app_state.clone();
        let match_id = self.match_id.clone();

        ctx.spawn(
            async move { app_state.store.get(&match_id).await }
                .into_actor(self)
                .map(|res, actor, ctx| match res {
                    Ok(doc) => actor.push_snapshot(ctx, &doc),
                    Err(DomainError::NotFound(..)) => {
                        Self::send_json(
                            ctx,
                            &ServerMsg::Error {
                                code: ErrorCode::MatchGone,
                                message: "Match is no longer live".to_string(),
                            },
                        );
                        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                        ctx.stop();
                    }
                    Err(err) => {
                        warn!(
                            conn_id = %actor.conn_id,
                            match_id = %actor.match_id,
                            error = %err,
                            "[WS SESSION] resync failed"
                        );
                        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                        ctx.stop();
                    }
                }),
        );
    }

    fn start_heartbeat(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    match_id = %actor.match_id,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            match_id = %self.match_id,
            viewer = %self.viewer_tag,
            "[WS SESSION] started"
        );

        // Ordering guarantee: the first frame is always a snapshot.
        if let Some(doc) = self.initial.take() {
            self.push_snapshot(ctx, &doc);
        }
        if let Some(updates) = self.updates.take() {
            ctx.add_stream(BroadcastStream::new(updates));
        }
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            match_id = %self.match_id,
            "[WS SESSION] stopped"
        );
    }
}

/// Accepted writes arriving from the store's broadcast channel.
impl StreamHandler<Result<SessionUpdate, BroadcastStreamRecvError>> for WsSession {
    fn handle(
        &mut self,
        item: Result<SessionUpdate, BroadcastStreamRecvError>,
        ctx: &mut Self::Context,
    ) {
        match item {
            Ok(update) => self.push_snapshot(ctx, &update),
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                warn!(
                    conn_id = %self.conn_id,
                    match_id = %self.match_id,
                    missed,
                    "[WS SESSION] watch lagged; resyncing"
                );
                self.refresh(ctx);
            }
        }
    }

    fn finished(&mut self, ctx: &mut Self::Context) {
        // Sender dropped: the match passed its retention window.
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code: ErrorCode::MatchGone,
                message: "Match is no longer live".to_string(),
            },
        );
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
        ctx.stop();
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();

                let parsed: Result<ClientMsg, _> = serde_json::from_str(&text);
                let Ok(cmd) = parsed else {
                    self.send_error_and_close(ctx, ErrorCode::BadRequest, "Malformed JSON");
                    return;
                };

                match cmd {
                    ClientMsg::Refresh => self.refresh(ctx),
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                self.send_error_and_close(ctx, ErrorCode::BadRequest, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    match_id = %self.match_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}
