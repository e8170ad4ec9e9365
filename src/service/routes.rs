//! RPC routes. Every method passes through the [`RequestInterceptor`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::endorser::messages::{
    EndorserRequest, EndorserResponse, PingRequest, PingResponse, ENDORSER_CALL_PATH, PING_PATH,
};
use crate::endorser::EndorserService;
use crate::error::GatewayError;
use crate::rpc::context::Peer;
use crate::rpc::envelope::{HasEnvelope, CODE_PARAM_ERROR};
use crate::rpc::interceptor::{Reply, RequestInterceptor};

/// State shared by all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub interceptor: Arc<RequestInterceptor>,
    pub endorser: Arc<EndorserService>,
}

/// Build the RPC router.
///
/// No timeout layer wraps the routes: a call runs to completion inside the
/// interceptor, and outbound peer calls are bounded by the peer client.
pub fn build_router(state: AppState, enable_endorser: bool) -> Router {
    let mut router = Router::new().route(PING_PATH, post(ping));
    if enable_endorser {
        router = router.route(ENDORSER_CALL_PATH, post(endorser_call));
    }
    router.with_state(state).layer(TraceLayer::new_for_http())
}

async fn endorser_call(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    body: Result<Json<EndorserRequest>, JsonRejection>,
) -> Response {
    let peer = Peer::new(addr);
    let reply = match body {
        Ok(Json(req)) => {
            let svc = state.endorser.clone();
            state
                .interceptor
                .intercept(Some(&peer), ENDORSER_CALL_PATH, req, |ctx, req| async move {
                    svc.endorser_call(ctx, req).await
                })
                .await
        }
        Err(rejection) => {
            malformed::<EndorserRequest, EndorserResponse>(
                &state.interceptor,
                &peer,
                ENDORSER_CALL_PATH,
                rejection,
            )
            .await
        }
    };
    into_response(reply)
}

async fn ping(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    body: Result<Json<PingRequest>, JsonRejection>,
) -> Response {
    let peer = Peer::new(addr);
    let reply = match body {
        Ok(Json(req)) => {
            let svc = state.endorser.clone();
            state
                .interceptor
                .intercept(Some(&peer), PING_PATH, req, |ctx, req| async move {
                    svc.ping(ctx, req).await
                })
                .await
        }
        Err(rejection) => {
            malformed::<PingRequest, PingResponse>(&state.interceptor, &peer, PING_PATH, rejection)
                .await
        }
    };
    into_response(reply)
}

/// Answer an undecodable body through the interceptor, so the caller still
/// gets an `InvalidRequest` envelope and the call is logged.
async fn malformed<Req, Resp>(
    interceptor: &RequestInterceptor,
    peer: &Peer,
    method: &str,
    rejection: JsonRejection,
) -> Reply<Resp>
where
    Req: HasEnvelope + Default,
    Resp: HasEnvelope + Default,
{
    let reason = rejection.body_text();
    interceptor
        .intercept(Some(peer), method, Req::default(), |_ctx, _req: Req| async move {
            Err::<Resp, _>(GatewayError::handler(CODE_PARAM_ERROR, reason))
        })
        .await
}

/// Transport errors become HTTP 500; handler errors stay 200 with the
/// envelope status set. The body always carries the envelope.
fn into_response<R: Serialize>(reply: Reply<R>) -> Response {
    let status = match &reply.error {
        Some(e) if e.is_transport() => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };
    (status, Json(reply.response)).into_response()
}
