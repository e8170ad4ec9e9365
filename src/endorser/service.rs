//! Endorser RPC handlers.
//!
//! `EndorserCall` is forwarded to a random configured peer when peers exist
//! and served by the local engine otherwise.

use std::sync::Arc;

use crate::endorser::cache::{ConnectionCache, Dialer};
use crate::endorser::client::{EndorserClient, HttpDialer};
use crate::endorser::messages::{EndorserRequest, EndorserResponse, PingRequest, PingResponse};
use crate::engine::NodeEngine;
use crate::error::GatewayError;
use crate::rpc::context::RequestContext;

pub struct EndorserService<D: Dialer = HttpDialer> {
    node_id: String,
    engine: Arc<NodeEngine>,
    cache: ConnectionCache<D>,
}

impl<D> EndorserService<D>
where
    D: Dialer<Connection = EndorserClient>,
{
    pub fn new(
        node_id: impl Into<String>,
        engine: Arc<NodeEngine>,
        cache: ConnectionCache<D>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            engine,
            cache,
        }
    }

    pub fn cache(&self) -> &ConnectionCache<D> {
        &self.cache
    }

    pub async fn endorser_call(
        &self,
        ctx: RequestContext,
        req: EndorserRequest,
    ) -> Result<EndorserResponse, GatewayError> {
        if let Some(host) = self.cache.select_host() {
            let client = self.cache.get_connection(&host).await?;
            tracing::debug!(
                correlation_id = %ctx.correlation_id,
                endorser = %host,
                request_name = %req.request_name,
                "forwarding endorser call"
            );
            return client.endorser_call(&req).await;
        }

        let data = self.engine.handle_endorsement(&req.request_name, &req.request_data)?;
        Ok(EndorserResponse {
            header: None,
            endorser_address: self.node_id.clone(),
            response_name: req.request_name,
            response_data: data,
        })
    }

    pub async fn ping(
        &self,
        _ctx: RequestContext,
        _req: PingRequest,
    ) -> Result<PingResponse, GatewayError> {
        Ok(PingResponse {
            header: None,
            node_name: self.node_id.clone(),
        })
    }
}
