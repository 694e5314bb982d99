use crossterm::event::KeyCode;
use log::{debug, info};
use tokio::sync::mpsc;

use crate::actions::{Action, PlaybackInfo, Station, StationId};
use crate::config::{Options, Theme};
use crate::links::{self, LinkTarget, Navigator};
use crate::messaging::{MessageError, Messenger};
use crate::stations::fallback_stations;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Selector,
    Controls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Panel,
    Options,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
}

/// Results of detached work, applied back on the controller's thread.
#[derive(Debug)]
pub enum Deferred {
    TrackInfo { station: StationId, info: PlaybackInfo },
}

/// Everything the panel shows.
///
/// Play/pause visibility is derived from `playback`, so exactly one of the
/// two controls is visible at any time. Only the controller's transition
/// methods write the playback fields.
#[derive(Debug, Clone)]
pub struct Panel {
    pub stations: Vec<Station>,
    selected: Option<StationId>,
    selector_enabled: bool,
    playback: Playback,
    play_enabled: bool,
    track: Option<NowPlaying>,
    pub focus: Focus,
    pub screen: Screen,
    pub theme: Theme,
    /// Highlighted row in the selector; row 0 is the empty option.
    pub cursor: usize,
}

impl Panel {
    fn new() -> Self {
        Self {
            stations: Vec::new(),
            selected: None,
            selector_enabled: false,
            playback: Playback::Paused,
            play_enabled: false,
            track: None,
            focus: Focus::Selector,
            screen: Screen::Panel,
            theme: Theme::default(),
            cursor: 0,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selector_enabled(&self) -> bool {
        self.selector_enabled
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn play_visible(&self) -> bool {
        self.playback == Playback::Paused
    }

    pub fn pause_visible(&self) -> bool {
        self.playback == Playback::Playing
    }

    pub fn play_enabled(&self) -> bool {
        self.play_enabled
    }

    pub fn play_actionable(&self) -> bool {
        self.play_visible() && self.play_enabled
    }

    pub fn pause_actionable(&self) -> bool {
        self.pause_visible()
    }

    pub fn track(&self) -> Option<&NowPlaying> {
        self.track.as_ref()
    }

    /// Number of selector rows, counting the leading empty option.
    pub fn option_count(&self) -> usize {
        self.stations.len() + 1
    }

    pub fn option_at(&self, row: usize) -> Option<&Station> {
        row.checked_sub(1).and_then(|i| self.stations.get(i))
    }

    fn row_of(&self, station: Option<&str>) -> usize {
        station
            .and_then(|id| self.stations.iter().position(|s| s.id == id))
            .map_or(0, |i| i + 1)
    }
}

pub struct PlayerController<M, N> {
    pub panel: Panel,
    messenger: M,
    navigator: N,
    options: Options,
    deferred_tx: mpsc::UnboundedSender<Deferred>,
    deferred_rx: mpsc::UnboundedReceiver<Deferred>,
}

impl<M, N> PlayerController<M, N>
where
    M: Messenger + Clone + 'static,
    N: Navigator,
{
    pub fn new(messenger: M, navigator: N, options: Options) -> Self {
        let (deferred_tx, deferred_rx) = mpsc::unbounded_channel();
        Self {
            panel: Panel::new(),
            messenger,
            navigator,
            options,
            deferred_tx,
            deferred_rx,
        }
    }

    pub async fn initialize(&mut self) {
        self.apply_theme();
        self.load_stations().await;
    }

    pub fn apply_theme(&mut self) {
        self.panel.theme = self.options.theme();
        debug!("applied theme {}", self.panel.theme.name());
    }

    /// Cache first, then a fresh fetch, then the built-in list.
    pub async fn load_stations(&mut self) {
        let cached = match self.messenger.stations(Action::GetStations).await {
            Ok(stations) => stations,
            Err(e) => {
                debug!("station cache unavailable: {}", e);
                Vec::new()
            }
        };
        debug!("{} stations already stored", cached.len());

        if !cached.is_empty() {
            self.insert_station_options(cached).await;
            return;
        }

        match self.messenger.stations(Action::FetchStations).await {
            Ok(stations) => self.insert_station_options(stations).await,
            Err(e) => {
                info!("loading default station list: {}", e);
                self.insert_station_options(fallback_stations()).await;
            }
        }
    }

    async fn insert_station_options(&mut self, stations: Vec<Station>) {
        self.panel.stations = stations;
        self.panel.selector_enabled = true;
        self.load_current_info().await;
    }

    /// Bring the panel in line with what the background player reports.
    pub async fn load_current_info(&mut self) {
        self.panel.selector_enabled = false;
        match self.messenger.info().await {
            Ok(info) => {
                debug!("finished info request, info {:?}", info);
                self.select_reported(info.station.as_deref());
                if info.paused {
                    self.station_is_paused();
                } else {
                    self.station_is_playing();
                }
                self.panel.selector_enabled = true;
                self.display_track_info(&info);
            }
            Err(e) => {
                debug!("could not load current info: {}", e);
                self.panel.selector_enabled = true;
            }
        }
    }

    /// A station id that is not among the options selects the empty option.
    fn select_reported(&mut self, station: Option<&str>) {
        let row = self.panel.row_of(station);
        self.panel.selected = self.panel.option_at(row).map(|s| s.id.clone());
        self.panel.cursor = row;
    }

    fn station_is_playing(&mut self) {
        self.panel.playback = Playback::Playing;
        self.panel.focus = Focus::Selector;
    }

    fn station_is_paused(&mut self) {
        self.panel.playback = Playback::Paused;
        self.panel.play_enabled = self.panel.selected.is_some();
        self.panel.focus = Focus::Selector;
    }

    fn display_track_info(&mut self, info: &PlaybackInfo) {
        if info.has_track() {
            self.panel.track = Some(NowPlaying {
                title: info.title.clone(),
                artist: info.artist.clone(),
            });
        }
    }

    fn hide_track_info(&mut self) {
        self.panel.track = None;
    }

    pub async fn play(&mut self) {
        let Some(station) = self.panel.selected.clone() else {
            debug!("play requested with no station selected");
            return;
        };
        debug!("play requested, station {}", station);

        if let Err(e) = self.messenger.send(Action::Play { station: station.clone() }).await {
            debug!("play {} failed: {}", station, e);
            return;
        }
        debug!("finished telling {} to play", station);
        self.station_is_playing();

        match self.messenger.info().await {
            Ok(info) if info.has_track() => self.display_track_info(&info),
            Ok(_) => self.fetch_track_info_later(station),
            Err(e) => debug!("info after play failed: {}", e),
        }
    }

    /// The first `info` after starting a station often has no metadata yet.
    fn fetch_track_info_later(&self, station: StationId) {
        let messenger = self.messenger.clone();
        let deferred_tx = self.deferred_tx.clone();
        tokio::spawn(async move {
            match messenger.fetch_current_track_info(&station).await {
                Ok(info) => {
                    let _ = deferred_tx.send(Deferred::TrackInfo { station, info });
                }
                Err(e) => debug!("track info for {} failed: {}", station, e),
            }
        });
    }

    pub async fn pause(&mut self) {
        let station = self.panel.selected.clone();
        if let Err(e) = self.pause_station(station).await {
            debug!("pause failed: {}", e);
        }
    }

    async fn pause_station(&mut self, station: Option<StationId>) -> Result<(), MessageError> {
        debug!("pause requested, station {:?}", station);
        self.messenger.send(Action::Pause { station }).await?;
        debug!("finished telling station to pause");
        self.station_is_paused();
        Ok(())
    }

    pub async fn on_station_changed(&mut self, station: Option<StationId>) {
        self.panel.selected = station.clone();
        self.panel.cursor = self.panel.row_of(station.as_deref());

        let Some(new_station) = station else {
            if let Err(e) = self.messenger.send(Action::Clear).await {
                debug!("clear failed: {}", e);
                return;
            }
            debug!("station cleared");
            self.panel.play_enabled = false;
            self.hide_track_info();
            self.pause().await;
            return;
        };

        // The background player knows what is actually on air.
        let current = match self.messenger.info().await {
            Ok(info) => info.station,
            Err(e) => {
                debug!("info before station change failed: {}", e);
                return;
            }
        };
        if current.as_deref() == Some(new_station.as_str()) {
            debug!("{} is already the current station", new_station);
            return;
        }

        debug!("station changed to {}", new_station);
        self.panel.play_enabled = true;
        // The old station must be confirmed paused before the new one starts.
        if let Err(e) = self.pause_station(current).await {
            debug!("pause before switching to {} failed: {}", new_station, e);
            return;
        }
        self.play().await;
    }

    pub async fn on_station_keypress(&mut self, key: KeyCode) {
        if key != KeyCode::Enter || self.panel.selected.is_none() {
            return;
        }
        if self.panel.play_actionable() {
            debug!("pressing play");
            self.play().await;
        } else if self.panel.pause_actionable() {
            debug!("pressing pause");
            self.pause().await;
        }
    }

    pub fn handle_link(&mut self, href: &str) {
        match links::route(href) {
            LinkTarget::Options => self.panel.screen = Screen::Options,
            LinkTarget::External(url) => {
                if let Err(e) = self.navigator.open_external(&url) {
                    debug!("could not open {}: {:#}", url, e);
                }
            }
        }
    }

    pub fn apply_deferred(&mut self, deferred: Deferred) {
        match deferred {
            Deferred::TrackInfo { station, info } => {
                if self.panel.selected.as_deref() == Some(station.as_str()) {
                    self.display_track_info(&info);
                } else {
                    debug!("dropping track info for {}, no longer selected", station);
                }
            }
        }
    }

    /// Apply whatever detached work has finished. Returns true if anything changed.
    pub fn poll_deferred(&mut self) -> bool {
        let mut applied = false;
        while let Ok(deferred) = self.deferred_rx.try_recv() {
            self.apply_deferred(deferred);
            applied = true;
        }
        applied
    }

    /// Returns true when quit was requested.
    pub async fn handle_key_event(&mut self, key_code: KeyCode) -> bool {
        if self.panel.screen == Screen::Options {
            match key_code {
                KeyCode::Esc | KeyCode::Char('o') | KeyCode::Char('q') => {
                    self.panel.screen = Screen::Panel;
                }
                KeyCode::Char('t') => {
                    let theme = self.panel.theme.toggled();
                    self.options.theme = Some(theme.name().to_string());
                    self.apply_theme();
                }
                _ => {}
            }
            return false;
        }

        match key_code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::BackTab => {
                self.panel.focus = match self.panel.focus {
                    Focus::Selector => Focus::Controls,
                    Focus::Controls => Focus::Selector,
                };
            }
            KeyCode::Char('o') => self.handle_link(links::OPTIONS_LINK),
            KeyCode::Char('w') => self.handle_link(links::SOMAFM_LINK),
            _ => match self.panel.focus {
                Focus::Selector => self.handle_selector_key(key_code).await,
                Focus::Controls => {
                    if matches!(key_code, KeyCode::Enter | KeyCode::Char(' ')) {
                        self.click_visible_control().await;
                    }
                }
            },
        }
        false
    }

    async fn handle_selector_key(&mut self, key_code: KeyCode) {
        if !self.panel.selector_enabled {
            return;
        }
        match key_code {
            KeyCode::Up => {
                let count = self.panel.option_count();
                self.panel.cursor = (self.panel.cursor + count - 1) % count;
            }
            KeyCode::Down => {
                self.panel.cursor = (self.panel.cursor + 1) % self.panel.option_count();
            }
            KeyCode::Char(' ') => {
                let chosen = self.panel.option_at(self.panel.cursor).map(|s| s.id.clone());
                if chosen != self.panel.selected {
                    self.on_station_changed(chosen).await;
                }
            }
            other => self.on_station_keypress(other).await,
        }
    }

    async fn click_visible_control(&mut self) {
        if self.panel.pause_actionable() {
            self.pause().await;
        } else if self.panel.play_actionable() {
            self.play().await;
        }
    }

    #[cfg(test)]
    async fn next_deferred(&mut self) -> Option<Deferred> {
        self.deferred_rx.recv().await
    }
}
