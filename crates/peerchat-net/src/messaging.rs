//! Client for the peer-messaging (web peer) service.
//!
//! The service relays messages between peers and buffers what each peer
//! received; the client only pulls that buffer and submits sends.

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, warn};

use peerchat_shared::error::ProtocolError;
use peerchat_shared::protocol::{
    BroadcastRequest, ChannelMembershipRequest, ConnectPeerRequest, InboundRecord,
    InitPeerRequest, PendingMessagesRequest, PendingMessagesResponse, SendPeerRequest,
    StatusResponse,
};

use crate::error::{NetError, Result};
use crate::http::{parse_base, post_json};

/// One fetched batch. Each record decodes on its own so a malformed entry
/// can be skipped without losing the others.
pub type PendingBatch = Vec<std::result::Result<InboundRecord, ProtocolError>>;

/// Operations the client needs from the peer-messaging service.
#[async_trait]
pub trait MessagingEndpoint: Send + Sync {
    /// Start the service-side peer for `request.username`.
    async fn init_peer(&self, request: &InitPeerRequest) -> Result<()>;

    /// Pull the pending inbound records for `username`.
    ///
    /// A reply whose status is not `"success"` is an error.
    async fn fetch_pending(&self, username: &str) -> Result<PendingBatch>;

    async fn send_direct(&self, request: &SendPeerRequest) -> Result<()>;

    /// Returns how many peers the broadcast reached.
    async fn broadcast(&self, request: &BroadcastRequest) -> Result<u32>;

    async fn connect_peer(&self, request: &ConnectPeerRequest) -> Result<()>;

    async fn join_channel(&self, request: &ChannelMembershipRequest) -> Result<()>;
}

/// [`MessagingEndpoint`] over JSON HTTP.
#[derive(Debug, Clone)]
pub struct HttpMessagingClient {
    client: reqwest::Client,
    base: Url,
}

impl HttpMessagingClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            base: parse_base(base_url)?,
        })
    }

    async fn status_call<Req: serde::Serialize + Sync>(
        &self,
        path: &str,
        operation: &'static str,
        body: &Req,
    ) -> Result<StatusResponse> {
        let response: StatusResponse =
            post_json(&self.client, &self.base, path, operation, body).await?;
        check_status(operation, response)
    }
}

fn check_status(operation: &'static str, response: StatusResponse) -> Result<StatusResponse> {
    response.into_result().map_err(|e| match e {
        ProtocolError::Rejected { status, message } => {
            warn!(operation, status = %status, message = %message, "Request rejected");
            NetError::Rejected {
                operation,
                status,
                message,
            }
        }
        other => NetError::Rejected {
            operation,
            status: String::new(),
            message: other.to_string(),
        },
    })
}

#[async_trait]
impl MessagingEndpoint for HttpMessagingClient {
    async fn init_peer(&self, request: &InitPeerRequest) -> Result<()> {
        self.status_call("init-peer", "init-peer", request).await?;
        Ok(())
    }

    async fn fetch_pending(&self, username: &str) -> Result<PendingBatch> {
        let request = PendingMessagesRequest::for_user(username);
        let response: PendingMessagesResponse = post_json(
            &self.client,
            &self.base,
            "get-messages",
            "get-messages",
            &request,
        )
        .await?;

        if !response.is_success() {
            return Err(NetError::Rejected {
                operation: "get-messages",
                status: response.status,
                message: response.message.unwrap_or_default(),
            });
        }

        let batch = response.records();
        debug!(count = batch.len(), "Fetched pending records");
        Ok(batch)
    }

    async fn send_direct(&self, request: &SendPeerRequest) -> Result<()> {
        self.status_call("send-peer", "send-peer", request).await?;
        Ok(())
    }

    async fn broadcast(&self, request: &BroadcastRequest) -> Result<u32> {
        let response = self
            .status_call("broadcast-peer", "broadcast-peer", request)
            .await?;
        Ok(response.sent_count.unwrap_or(0))
    }

    async fn connect_peer(&self, request: &ConnectPeerRequest) -> Result<()> {
        self.status_call("connect-peer", "connect-peer", request)
            .await?;
        Ok(())
    }

    async fn join_channel(&self, request: &ChannelMembershipRequest) -> Result<()> {
        self.status_call("join-channel", "join-channel", request)
            .await?;
        Ok(())
    }
}
