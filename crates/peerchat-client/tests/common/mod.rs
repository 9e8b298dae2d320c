//! In-memory fakes of the two services and the notification outputs.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use peerchat_client::notify::NotificationSink;
use peerchat_client::{ClientConfig, ClientContext};
use peerchat_media::{AudioError, ChimeConfig, ChimePlayer};
use peerchat_net::{DirectoryService, MessagingEndpoint, NetError, PendingBatch};
use peerchat_shared::protocol::{
    BroadcastRequest, ChannelMembershipRequest, ConnectPeerRequest, CredentialsRequest,
    GetListRequest, GetListResponse, InboundRecord, InitPeerRequest, SendPeerRequest,
    SubmitInfoRequest,
};
use peerchat_store::{Database, Preferences};

pub fn records(values: Vec<Value>) -> PendingBatch {
    values
        .into_iter()
        .map(|v| Ok(serde_json::from_value::<InboundRecord>(v).unwrap()))
        .collect()
}

fn rejected(operation: &'static str) -> NetError {
    NetError::Rejected {
        operation,
        status: "error".into(),
        message: "unavailable".into(),
    }
}

#[derive(Default)]
pub struct FakeMessaging {
    batches: Mutex<VecDeque<Result<PendingBatch, NetError>>>,
    pub fetches: AtomicUsize,
    pub direct_sends: Mutex<Vec<SendPeerRequest>>,
    pub broadcasts: Mutex<Vec<BroadcastRequest>>,
    pub joins: Mutex<Vec<ChannelMembershipRequest>>,
    pub connects: Mutex<Vec<ConnectPeerRequest>>,
    pub inits: Mutex<Vec<InitPeerRequest>>,
    pub fail_sends: AtomicBool,
    pub fail_joins: AtomicBool,
    hold_fetch: AtomicBool,
    pub fetch_started: Notify,
    pub release_fetch: Notify,
}

impl FakeMessaging {
    /// Queue the reply of a future fetch. An empty queue answers with an
    /// empty batch.
    pub fn push_batch(&self, batch: PendingBatch) {
        self.batches.lock().unwrap().push_back(Ok(batch));
    }

    pub fn push_failure(&self) {
        self.batches
            .lock()
            .unwrap()
            .push_back(Err(rejected("get-messages")));
    }

    /// Make fetches wait for `release_fetch` after signalling `fetch_started`.
    pub fn hold_fetches(&self, hold: bool) {
        self.hold_fetch.store(hold, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessagingEndpoint for FakeMessaging {
    async fn init_peer(&self, request: &InitPeerRequest) -> peerchat_net::Result<()> {
        self.inits.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn fetch_pending(&self, _username: &str) -> peerchat_net::Result<PendingBatch> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.hold_fetch.load(Ordering::SeqCst) {
            self.fetch_started.notify_one();
            self.release_fetch.notified().await;
        }
        self.batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn send_direct(&self, request: &SendPeerRequest) -> peerchat_net::Result<()> {
        self.direct_sends.lock().unwrap().push(request.clone());
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(rejected("send-peer"));
        }
        Ok(())
    }

    async fn broadcast(&self, request: &BroadcastRequest) -> peerchat_net::Result<u32> {
        self.broadcasts.lock().unwrap().push(request.clone());
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(rejected("broadcast-peer"));
        }
        Ok(2)
    }

    async fn connect_peer(&self, request: &ConnectPeerRequest) -> peerchat_net::Result<()> {
        self.connects.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn join_channel(&self, request: &ChannelMembershipRequest) -> peerchat_net::Result<()> {
        self.joins.lock().unwrap().push(request.clone());
        if self.fail_joins.load(Ordering::SeqCst) {
            return Err(rejected("join-channel"));
        }
        Ok(())
    }
}

pub struct FakeDirectory {
    pub roster: Mutex<GetListResponse>,
    pub logins: AtomicUsize,
    pub registrations: Mutex<Vec<String>>,
    pub submitted: Mutex<Vec<SubmitInfoRequest>>,
    pub removed: Mutex<Vec<ChannelMembershipRequest>>,
    pub reject_login: AtomicBool,
}

impl Default for FakeDirectory {
    fn default() -> Self {
        Self {
            roster: Mutex::new(GetListResponse {
                status: "success".into(),
                peers: Vec::new(),
                channels: Default::default(),
                message: None,
            }),
            logins: AtomicUsize::new(0),
            registrations: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            reject_login: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl DirectoryService for FakeDirectory {
    async fn register(&self, credentials: &CredentialsRequest) -> peerchat_net::Result<()> {
        self.registrations
            .lock()
            .unwrap()
            .push(credentials.username.clone());
        Ok(())
    }

    async fn login(&self, _credentials: &CredentialsRequest) -> peerchat_net::Result<()> {
        if self.reject_login.load(Ordering::SeqCst) {
            return Err(rejected("login"));
        }
        self.logins.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn submit_info(&self, request: &SubmitInfoRequest) -> peerchat_net::Result<()> {
        self.submitted.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn add_to_channel(
        &self,
        request: &ChannelMembershipRequest,
    ) -> peerchat_net::Result<Vec<String>> {
        Ok(vec![request.username.clone(), "carol".into()])
    }

    async fn remove_from_channel(
        &self,
        request: &ChannelMembershipRequest,
    ) -> peerchat_net::Result<()> {
        self.removed.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn get_list(&self, _request: &GetListRequest) -> peerchat_net::Result<GetListResponse> {
        Ok(self.roster.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub seen: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, title: &str, body: &str) -> peerchat_client::Result<()> {
        self.seen
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingPlayer {
    pub plays: AtomicUsize,
}

impl ChimePlayer for CountingPlayer {
    fn play(&self, _samples: &[f32], _config: &ChimeConfig) -> Result<(), AudioError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct Harness {
    pub ctx: ClientContext,
    pub messaging: Arc<FakeMessaging>,
    pub directory: Arc<FakeDirectory>,
    pub sink: Arc<RecordingSink>,
    pub player: Arc<CountingPlayer>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ClientConfig {
            // Long enough that the timer never fires unless a test waits for it.
            poll_interval: Duration::from_secs(3600),
            ..ClientConfig::default()
        })
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let messaging = Arc::new(FakeMessaging::default());
        let directory = Arc::new(FakeDirectory::default());
        let sink = Arc::new(RecordingSink::default());
        let player = Arc::new(CountingPlayer::default());
        let preferences = Preferences::new(Database::open_in_memory().unwrap());

        let ctx = ClientContext::new(
            config,
            messaging.clone(),
            directory.clone(),
            preferences,
            sink.clone(),
            player.clone(),
        );

        Self {
            ctx,
            messaging,
            directory,
            sink,
            player,
        }
    }

    pub fn plays(&self) -> usize {
        self.player.plays.load(Ordering::SeqCst)
    }
}
