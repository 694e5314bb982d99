//! In-process stand-in for the background player.
//!
//! It owns the station cache and the live playback state and answers the
//! panel's actions over a request channel. Network lookups run in their own
//! tasks and report back through a completion channel, so `info`, `play`
//! and `pause` are never queued behind an HTTP request. No audio is decoded
//! here; "playing" is the state the panel reconciles against.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::actions::{Action, Envelope, PlaybackInfo, Reply, Station, StationId};
use crate::api::{Catalog, Track};
use crate::messaging::ChannelMessenger;

const METADATA_REFRESH: Duration = Duration::from_secs(10);
const REQUEST_QUEUE: usize = 32;
/// Upper bound on any catalog lookup, whatever the catalog's own transport does.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);

type ReplyTx = oneshot::Sender<Result<Reply, String>>;

enum Completion {
    StationsFetched {
        result: anyhow::Result<Vec<Station>>,
        reply: ReplyTx,
    },
    TrackFetched {
        station: StationId,
        result: anyhow::Result<Option<Track>>,
        reply: Option<ReplyTx>,
    },
}

pub struct Background<C: Catalog> {
    catalog: Arc<C>,
    lookup_timeout: Duration,
    cache: Option<Vec<Station>>,
    state: PlaybackInfo,
    done_tx: mpsc::UnboundedSender<Completion>,
}

/// Start the worker and hand back a messenger connected to it.
pub fn spawn<C: Catalog>(catalog: C, cancel: CancellationToken) -> (ChannelMessenger, JoinHandle<()>) {
    spawn_with_timeout(catalog, LOOKUP_TIMEOUT, cancel)
}

pub fn spawn_with_timeout<C: Catalog>(
    catalog: C,
    lookup_timeout: Duration,
    cancel: CancellationToken,
) -> (ChannelMessenger, JoinHandle<()>) {
    let (req_tx, req_rx) = mpsc::channel(REQUEST_QUEUE);
    let (done_tx, done_rx) = mpsc::unbounded_channel();
    let mut worker = Background::new(catalog, done_tx);
    worker.lookup_timeout = lookup_timeout;
    let handle = tokio::spawn(worker.run(req_rx, done_rx, cancel));
    (ChannelMessenger::new(req_tx), handle)
}

async fn with_limit<T>(
    limit: Duration,
    lookup: impl std::future::Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    tokio::time::timeout(limit, lookup)
        .await
        .unwrap_or_else(|_| Err(anyhow::anyhow!("catalog lookup timed out after {:?}", limit)))
}

impl<C: Catalog> Background<C> {
    fn new(catalog: C, done_tx: mpsc::UnboundedSender<Completion>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            lookup_timeout: LOOKUP_TIMEOUT,
            cache: None,
            state: PlaybackInfo { paused: true, ..Default::default() },
            done_tx,
        }
    }

    async fn run(
        mut self,
        mut req_rx: mpsc::Receiver<Envelope>,
        mut done_rx: mpsc::UnboundedReceiver<Completion>,
        cancel: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(METADATA_REFRESH);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("background player shutting down");
                    break;
                }
                request = req_rx.recv() => match request {
                    Some(envelope) => self.handle(envelope),
                    None => break,
                },
                Some(done) = done_rx.recv() => self.complete(done),
                _ = ticker.tick() => self.refresh_metadata(),
            }
        }
    }

    fn handle(&mut self, envelope: Envelope) {
        let Envelope { action, reply } = envelope;
        debug!("background received {:?}", action);

        match action {
            Action::GetStations => {
                let cached = self.cache.clone().unwrap_or_default();
                let _ = reply.send(Ok(Reply::Stations(cached)));
            }
            Action::FetchStations => {
                let catalog = self.catalog.clone();
                let done_tx = self.done_tx.clone();
                let limit = self.lookup_timeout;
                tokio::spawn(async move {
                    let result = with_limit(limit, catalog.stations()).await;
                    let _ = done_tx.send(Completion::StationsFetched { result, reply });
                });
            }
            Action::Info => {
                let _ = reply.send(Ok(Reply::Info(self.state.clone())));
            }
            Action::Play { station } => {
                if self.state.station.as_deref() != Some(station.as_str()) {
                    self.state.title.clear();
                    self.state.artist.clear();
                }
                info!("playing {}", station);
                self.state.station = Some(station.clone());
                self.state.paused = false;
                let _ = reply.send(Ok(Reply::Ack));
                self.fetch_track(station, None);
            }
            Action::Pause { station } => {
                if station.is_some() && station != self.state.station {
                    debug!("pause for {:?} while {:?} is loaded", station, self.state.station);
                }
                self.state.paused = true;
                let _ = reply.send(Ok(Reply::Ack));
            }
            Action::Clear => {
                self.state = PlaybackInfo { paused: true, ..Default::default() };
                let _ = reply.send(Ok(Reply::Ack));
            }
            Action::TrackInfo { station } => self.fetch_track(station, Some(reply)),
        }
    }

    fn fetch_track(&self, station: StationId, reply: Option<ReplyTx>) {
        let catalog = self.catalog.clone();
        let done_tx = self.done_tx.clone();
        let limit = self.lookup_timeout;
        tokio::spawn(async move {
            let result = with_limit(limit, catalog.current_track(&station)).await;
            let _ = done_tx.send(Completion::TrackFetched { station, result, reply });
        });
    }

    fn refresh_metadata(&self) {
        if self.state.paused {
            return;
        }
        if let Some(station) = &self.state.station {
            self.fetch_track(station.clone(), None);
        }
    }

    fn complete(&mut self, done: Completion) {
        match done {
            Completion::StationsFetched { result, reply } => match result {
                Ok(stations) => {
                    info!("cached {} stations", stations.len());
                    self.cache = Some(stations.clone());
                    let _ = reply.send(Ok(Reply::Stations(stations)));
                }
                Err(e) => {
                    debug!("station fetch failed: {:#}", e);
                    let _ = reply.send(Err(e.to_string()));
                }
            },
            Completion::TrackFetched { station, result, reply } => {
                let is_live =
                    !self.state.paused && self.state.station.as_deref() == Some(station.as_str());

                match result {
                    Ok(track) => {
                        let (title, artist) = track.map(|t| (t.title, t.artist)).unwrap_or_default();
                        // Only the station that is still on air gets its metadata updated.
                        if is_live {
                            self.state.title = title.clone();
                            self.state.artist = artist.clone();
                        }
                        if let Some(reply) = reply {
                            let info = PlaybackInfo {
                                station: Some(station),
                                paused: !is_live,
                                title,
                                artist,
                            };
                            let _ = reply.send(Ok(Reply::Info(info)));
                        }
                    }
                    Err(e) => {
                        debug!("track lookup for {} failed: {:#}", station, e);
                        if let Some(reply) = reply {
                            let _ = reply.send(Err(e.to_string()));
                        }
                    }
                }
            }
        }
    }
}
