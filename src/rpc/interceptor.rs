//! Inbound call interceptor.
//!
//! # Responsibilities
//! - Inject or repair the request envelope
//! - Derive the per-call [`RequestContext`] from peer metadata
//! - Emit access and completion log lines
//! - Contain handler panics at a per-call boundary
//! - Map the handler outcome to a status and finalize the response envelope
//!
//! # Design Decisions
//! - The envelope status is the authoritative outcome; the transport-level
//!   error is returned alongside it in [`Reply`], never instead of it
//! - A panicking handler yields a default response with an `InternalError`
//!   envelope; the serving task keeps running

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tracing::Instrument;

use crate::error::GatewayError;
use crate::rpc::context::{Peer, RequestContext};
use crate::rpc::envelope::{
    attach_response_envelope, inject_request_envelope, Envelope, HasEnvelope, StdError,
};

/// Response produced by the interceptor.
///
/// `error` carries the transport-level error channel. Callers check
/// `response`'s envelope status first.
#[derive(Debug)]
pub struct Reply<R> {
    pub response: R,
    pub error: Option<GatewayError>,
}

impl<R: HasEnvelope> Reply<R> {
    /// Envelope attached to the response.
    pub fn envelope(&self) -> Option<&Envelope> {
        self.response.envelope()
    }
}

/// Wraps every inbound call handled by this node.
#[derive(Debug, Clone)]
pub struct RequestInterceptor {
    node_id: String,
}

impl RequestInterceptor {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
        }
    }

    /// Identifier written into `origin_id` of every response envelope.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Run `handler` for `req` inside the interceptor pipeline.
    pub async fn intercept<Req, Resp, H, Fut>(
        &self,
        peer: Option<&Peer>,
        method: &str,
        mut req: Req,
        handler: H,
    ) -> Reply<Resp>
    where
        Req: HasEnvelope,
        Resp: HasEnvelope + Default,
        H: FnOnce(RequestContext, Req) -> Fut,
        Fut: Future<Output = Result<Resp, GatewayError>>,
    {
        let req_envelope = inject_request_envelope(&mut req);

        let ctx = match RequestContext::from_peer(peer, &req_envelope.correlation_id) {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::error!(
                    correlation_id = %req_envelope.correlation_id,
                    rpc_method = method,
                    error = %e,
                    "access proc failed because create request context failed"
                );
                let std_err = StdError::cast(&e);
                let response = self.finalize(Resp::default(), &req_envelope, &std_err);
                return Reply {
                    response,
                    error: Some(e),
                };
            }
        };

        tracing::debug!(
            parent: ctx.span(),
            from = %req_envelope.origin_id,
            client_ip = %ctx.client_address,
            rpc_method = method,
            "access request"
        );

        let call = AssertUnwindSafe(async { handler(ctx.clone(), req).await })
            .catch_unwind()
            .instrument(ctx.span().clone());

        let (response, error) = match call.await {
            Ok(Ok(resp)) => (resp, None),
            Ok(Err(e)) => (Resp::default(), Some(e)),
            Err(payload) => {
                let fault = panic_message(payload.as_ref());
                tracing::error!(
                    parent: ctx.span(),
                    rpc_method = method,
                    error = %fault,
                    "rpc handler panicked"
                );
                (Resp::default(), Some(GatewayError::ContainedFault(fault)))
            }
        };

        let std_err = StdError::from_outcome(error.as_ref());
        let response = self.finalize(response, &req_envelope, &std_err);

        tracing::info!(
            parent: ctx.span(),
            from = %req_envelope.origin_id,
            client_ip = %ctx.client_address,
            rpc_method = method,
            status = std_err.status,
            err_code = std_err.code,
            err_msg = %std_err.msg,
            cost_time = %ctx.timer(),
            "request done"
        );

        Reply { response, error }
    }

    fn finalize<Resp: HasEnvelope>(
        &self,
        mut response: Resp,
        req_envelope: &Envelope,
        std_err: &StdError,
    ) -> Resp {
        let envelope = Envelope {
            correlation_id: req_envelope.correlation_id.clone(),
            origin_id: self.node_id.clone(),
            status: std_err.wire_status(),
        };
        attach_response_envelope(&mut response, envelope);
        response
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
