//! Client for the directory (tracker) service: accounts, peer registration,
//! channel membership and the roster.

use async_trait::async_trait;
use reqwest::Url;
use tracing::info;

use peerchat_shared::protocol::{
    ChannelMembershipRequest, CredentialsRequest, GetListRequest, GetListResponse,
    MembershipResponse, StatusResponse, SubmitInfoRequest,
};

use crate::error::{NetError, Result};
use crate::http::{parse_base, post_json};

#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn register(&self, credentials: &CredentialsRequest) -> Result<()>;

    async fn login(&self, credentials: &CredentialsRequest) -> Result<()>;

    /// Announce this peer's address and channels.
    async fn submit_info(&self, request: &SubmitInfoRequest) -> Result<()>;

    /// Join a channel; returns its members after the join.
    async fn add_to_channel(&self, request: &ChannelMembershipRequest) -> Result<Vec<String>>;

    async fn remove_from_channel(&self, request: &ChannelMembershipRequest) -> Result<()>;

    async fn get_list(&self, request: &GetListRequest) -> Result<GetListResponse>;
}

/// [`DirectoryService`] over JSON HTTP. Keeps a cookie jar so a login
/// session cookie rides along on later calls.
#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    client: reqwest::Client,
    base: Url,
}

impl HttpDirectoryClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base: parse_base(base_url)?,
        })
    }

    async fn status_call<Req: serde::Serialize + Sync>(
        &self,
        path: &str,
        operation: &'static str,
        body: &Req,
    ) -> Result<()> {
        let response: StatusResponse =
            post_json(&self.client, &self.base, path, operation, body).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(NetError::Rejected {
                operation,
                status: response.status,
                message: response.message.unwrap_or_default(),
            })
        }
    }
}

#[async_trait]
impl DirectoryService for HttpDirectoryClient {
    async fn register(&self, credentials: &CredentialsRequest) -> Result<()> {
        self.status_call("register", "register", credentials).await?;
        info!(username = %credentials.username, "Account registered");
        Ok(())
    }

    async fn login(&self, credentials: &CredentialsRequest) -> Result<()> {
        self.status_call("login", "login", credentials).await?;
        info!(username = %credentials.username, "Logged in to directory");
        Ok(())
    }

    async fn submit_info(&self, request: &SubmitInfoRequest) -> Result<()> {
        self.status_call("submit-info", "submit-info", request).await
    }

    async fn add_to_channel(&self, request: &ChannelMembershipRequest) -> Result<Vec<String>> {
        let response: MembershipResponse =
            post_json(&self.client, &self.base, "add-list", "add-list", request).await?;
        if !response.is_success() {
            return Err(NetError::Rejected {
                operation: "add-list",
                status: response.status,
                message: response.message.unwrap_or_default(),
            });
        }
        Ok(response.members)
    }

    async fn remove_from_channel(&self, request: &ChannelMembershipRequest) -> Result<()> {
        self.status_call("remove-list", "remove-list", request).await
    }

    async fn get_list(&self, request: &GetListRequest) -> Result<GetListResponse> {
        let response: GetListResponse =
            post_json(&self.client, &self.base, "get-list", "get-list", request).await?;
        if !response.is_success() {
            return Err(NetError::Rejected {
                operation: "get-list",
                status: response.status,
                message: response.message.unwrap_or_default(),
            });
        }
        Ok(response)
    }
}
