//! Actions and messages exchanged with the background player
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tokio::sync::oneshot;

pub type StationId = String;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Station {
    pub id: StationId,
    pub title: String,
}

impl Station {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into() }
    }
}

/// Live state reported by the background player.
///
/// `station` is `None` when nothing is selected; on the wire that is an
/// empty string, the same way the panel's selector models it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlaybackInfo {
    #[serde(
        default,
        serialize_with = "serialize_station",
        deserialize_with = "deserialize_station"
    )]
    pub station: Option<StationId>,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
}

impl PlaybackInfo {
    pub fn has_track(&self) -> bool {
        !self.title.is_empty() || !self.artist.is_empty()
    }
}

fn serialize_station<S>(station: &Option<StationId>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(station.as_deref().unwrap_or(""))
}

fn deserialize_station<'de, D>(deserializer: D) -> Result<Option<StationId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()))
}

// Requests from the panel to the background player
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    GetStations,
    FetchStations,
    Info,
    Play { station: StationId },
    Pause {
        #[serde(
            default,
            serialize_with = "serialize_station",
            deserialize_with = "deserialize_station"
        )]
        station: Option<StationId>,
    },
    Clear,
    TrackInfo { station: StationId },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::GetStations => "get_stations",
            Action::FetchStations => "fetch_stations",
            Action::Info => "info",
            Action::Play { .. } => "play",
            Action::Pause { .. } => "pause",
            Action::Clear => "clear",
            Action::TrackInfo { .. } => "track_info",
        }
    }
}

// Replies from the background player back to the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Stations(Vec<Station>),
    Info(PlaybackInfo),
    Ack,
}

/// One request in flight: the action plus the channel its single reply goes to.
#[derive(Debug)]
pub struct Envelope {
    pub action: Action,
    pub reply: oneshot::Sender<Result<Reply, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn actions_serialize_with_action_tag() {
        let play = serde_json::to_value(Action::Play { station: "lush".into() }).unwrap();
        assert_eq!(play, json!({ "action": "play", "station": "lush" }));

        let pause = serde_json::to_value(Action::Pause { station: None }).unwrap();
        assert_eq!(pause, json!({ "action": "pause", "station": "" }));

        let info = serde_json::to_value(Action::Info).unwrap();
        assert_eq!(info, json!({ "action": "info" }));
    }

    #[test]
    fn pause_without_a_station_keeps_the_key() {
        let pause: Action = serde_json::from_value(json!({ "action": "pause", "station": "" })).unwrap();
        assert_eq!(pause, Action::Pause { station: None });

        let pause: Action = serde_json::from_value(json!({ "action": "pause" })).unwrap();
        assert_eq!(pause, Action::Pause { station: None });
    }

    #[test]
    fn playback_info_treats_empty_station_as_none() {
        let info: PlaybackInfo =
            serde_json::from_value(json!({ "station": "", "paused": true, "title": "", "artist": "" }))
                .unwrap();
        assert_eq!(info.station, None);
        assert!(!info.has_track());

        let info = PlaybackInfo { station: None, ..Default::default() };
        assert_eq!(serde_json::to_value(&info).unwrap()["station"], json!(""));
    }

    #[test]
    fn has_track_needs_title_or_artist() {
        let info = PlaybackInfo { artist: "Bonobo".into(), ..Default::default() };
        assert!(info.has_track());
    }
}
