use async_trait::async_trait;
use log::debug;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::actions::{Action, Envelope, PlaybackInfo, Reply, Station};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("background player is unreachable")]
    Unreachable,
    #[error("background player rejected the request: {0}")]
    Rejected(String),
    #[error("unexpected reply to {0}")]
    UnexpectedReply(&'static str),
}

/// Request/response access to the background player.
///
/// Every call completes exactly once and only after the player has had a
/// chance to run, so callers always see a suspension point.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, action: Action) -> Result<Reply, MessageError>;

    /// Direct now-playing lookup, used when `info` has no track metadata yet.
    async fn fetch_current_track_info(&self, station: &str) -> Result<PlaybackInfo, MessageError> {
        let action = Action::TrackInfo { station: station.to_string() };
        match self.send(action).await? {
            Reply::Info(info) => Ok(info),
            _ => Err(MessageError::UnexpectedReply("track_info")),
        }
    }

    async fn stations(&self, action: Action) -> Result<Vec<Station>, MessageError> {
        let name = action.name();
        match self.send(action).await? {
            Reply::Stations(stations) => Ok(stations),
            _ => Err(MessageError::UnexpectedReply(name)),
        }
    }

    async fn info(&self) -> Result<PlaybackInfo, MessageError> {
        match self.send(Action::Info).await? {
            Reply::Info(info) => Ok(info),
            _ => Err(MessageError::UnexpectedReply("info")),
        }
    }
}

/// Messenger backed by the background worker's request channel.
#[derive(Debug, Clone)]
pub struct ChannelMessenger {
    req_tx: mpsc::Sender<Envelope>,
}

impl ChannelMessenger {
    pub fn new(req_tx: mpsc::Sender<Envelope>) -> Self {
        Self { req_tx }
    }
}

#[async_trait]
impl Messenger for ChannelMessenger {
    async fn send(&self, action: Action) -> Result<Reply, MessageError> {
        debug!("sending {:?}", action);
        let (reply_tx, reply_rx) = oneshot::channel();
        self.req_tx
            .send(Envelope { action, reply: reply_tx })
            .await
            .map_err(|_| MessageError::Unreachable)?;

        match reply_rx.await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(reason)) => Err(MessageError::Rejected(reason)),
            Err(_) => Err(MessageError::Unreachable),
        }
    }
}
