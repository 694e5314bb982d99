use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

use crate::actions::Station;

const CHANNELS_URL: &str = "https://somafm.com/channels.json";
const SONGS_URL: &str = "https://somafm.com/songs";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: u64,
}

#[derive(Debug, Deserialize)]
struct SongsResponse {
    #[serde(default)]
    songs: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    id: String,
    title: String,
    #[serde(default, deserialize_with = "deserialize_listeners")]
    listeners: u32,
}

#[derive(Debug, Deserialize)]
struct ChannelsResponse {
    channels: Vec<Channel>,
}

fn deserialize_listeners<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u32),
    }

    match StringOrNumber::deserialize(deserializer) {
        Ok(StringOrNumber::String(s)) => s.parse().map_err(serde::de::Error::custom),
        Ok(StringOrNumber::Number(n)) => Ok(n),
        Err(_) => Ok(0),
    }
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    match StringOrNumber::deserialize(deserializer) {
        Ok(StringOrNumber::String(s)) => s.parse().map_err(serde::de::Error::custom),
        Ok(StringOrNumber::Number(n)) => Ok(n),
        Err(_) => Ok(0),
    }
}

/// Where the background player gets its station list and now-playing data.
#[async_trait]
pub trait Catalog: Send + Sync + 'static {
    async fn stations(&self) -> Result<Vec<Station>>;
    async fn current_track(&self, station_id: &str) -> Result<Option<Track>>;
}

pub struct SomaFMClient {
    client: reqwest::Client,
}

impl SomaFMClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Catalog for SomaFMClient {
    async fn stations(&self) -> Result<Vec<Station>> {
        let response = self
            .client
            .get(CHANNELS_URL)
            .send()
            .await?
            .error_for_status()?;

        let channels_response: ChannelsResponse = response.json().await?;
        debug!("Fetched {} channels", channels_response.channels.len());
        Ok(into_stations(channels_response.channels))
    }

    async fn current_track(&self, station_id: &str) -> Result<Option<Track>> {
        let url = format!("{}/{}.json", SONGS_URL, station_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?;

        let songs_response: SongsResponse = response.json().await?;

        debug!("Fetched {} tracks for station {}", songs_response.songs.len(), station_id);

        // The newest entry is what is on air.
        Ok(songs_response.songs.into_iter().max_by_key(|t| t.date))
    }
}

/// Most listened-to channels first; ties keep the feed's order.
fn into_stations(mut channels: Vec<Channel>) -> Vec<Station> {
    channels.sort_by(|a, b| b.listeners.cmp(&a.listeners));
    channels
        .into_iter()
        .map(|c| Station { id: c.id, title: c.title })
        .collect()
}
