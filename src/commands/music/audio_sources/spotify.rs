//! Implements the `CatalogLookup` trait for Spotify.
//! Handles authentication (client credentials flow), link parsing and track lookups.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use dashmap::DashMap;
use regex::Regex;
use reqwest::{StatusCode, header};
use serde::{Deserialize, Serialize};
use serenity::async_trait;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{CatalogLookup, CatalogTrack};
use crate::HTTP_CLIENT;
use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use crate::config::SpotifyCredentials;

/// Represents the response from Spotify's token endpoint.
#[derive(Debug, Serialize, Deserialize)]
struct SpotifyToken {
    /// The OAuth2 access token.
    access_token: String,
    /// The type of token (usually "Bearer").
    token_type: String,
    /// The duration in seconds for which the token is valid.
    expires_in: u64,
    /// The time when the token was created, used to check expiry.
    #[serde(skip, default = "Instant::now")]
    created_at: Instant,
}

impl SpotifyToken {
    /// Checks if the token has expired or is close to expiring.
    /// Considers the token expired 30 seconds before its actual expiry time.
    fn is_expired(&self) -> bool {
        let expiry = Duration::from_secs(self.expires_in);
        let elapsed = self.created_at.elapsed();
        elapsed > expiry.saturating_sub(Duration::from_secs(30))
    }
}

/// Anything on the Spotify web player host, or a `spotify:` URI.
static SPOTIFY_LINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(?:https?://)?open\.spotify\.com/|spotify:)").unwrap());

/// Regex to match and capture Spotify track links and URIs.
static SPOTIFY_TRACK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:https?://)?open\.spotify\.com/(?:intl-[a-zA-Z-]+/)?track/|spotify:track:)([a-zA-Z0-9]+)(?:[/?#].*)?$",
    )
    .unwrap()
});

/// Base URLs of the two Spotify services used.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotifyEndpoints {
    /// Serves `/api/token`.
    pub accounts_url: String,
    /// Serves `/v1/tracks/{id}`.
    pub api_url: String,
}

impl Default for SpotifyEndpoints {
    fn default() -> Self {
        Self {
            accounts_url: "https://accounts.spotify.com".to_string(),
            api_url: "https://api.spotify.com".to_string(),
        }
    }
}

/// Spotify Web API client used as the music catalog.
pub struct SpotifyApi {
    credentials: SpotifyCredentials,
    endpoints: SpotifyEndpoints,
    client: reqwest::Client,
    /// Cached access token, refreshed shortly before it expires.
    token: Mutex<Option<SpotifyToken>>,
    /// Track lookups by Spotify track id.
    cache: DashMap<String, CatalogTrack>,
}

impl SpotifyApi {
    pub fn new(credentials: SpotifyCredentials) -> Self {
        Self::with_endpoints(credentials, SpotifyEndpoints::default())
    }

    pub fn with_endpoints(credentials: SpotifyCredentials, endpoints: SpotifyEndpoints) -> Self {
        Self {
            credentials,
            endpoints,
            client: HTTP_CLIENT.clone(),
            token: Mutex::new(None),
            cache: DashMap::new(),
        }
    }

    /// Checks if the URL points at Spotify at all (track, album, playlist, ...).
    pub fn is_spotify_url(url: &str) -> bool {
        SPOTIFY_LINK_REGEX.is_match(url.trim())
    }

    /// Attempts to extract the Spotify track ID from a link or URI.
    pub fn extract_track_id(url: &str) -> Option<String> {
        SPOTIFY_TRACK_REGEX
            .captures(url.trim())
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Retrieves a valid Spotify API access token.
    ///
    /// Checks the cached token first. If it's missing or expired, requests a new one
    /// using the client credentials flow and caches it.
    async fn get_access_token(&self) -> MusicResult<String> {
        let mut token_lock = self.token.lock().await;

        if let Some(token) = &*token_lock {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Requesting a new Spotify access token");

        // Encode client ID and secret for Basic auth.
        let auth = BASE64_STANDARD.encode(format!(
            "{}:{}",
            self.credentials.client_id, self.credentials.client_secret
        ));
        let auth_header = format!("Basic {}", auth);

        let params = [("grant_type", "client_credentials")];
        let response = self
            .client
            .post(format!("{}/api/token", self.endpoints.accounts_url))
            .header(header::AUTHORIZATION, auth_header)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                MusicError::ExternalApiError(format!("Failed to request Spotify token: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Cannot read response".to_string());
            return Err(MusicError::ExternalApiError(format!(
                "Spotify API error: {} - {}",
                status, text
            )));
        }

        let token_response = response.json::<SpotifyToken>().await.map_err(|e| {
            MusicError::ExternalApiError(format!("Failed to parse Spotify token: {}", e))
        })?;

        let access_token = token_response.access_token.clone();
        *token_lock = Some(token_response);

        Ok(access_token)
    }

    /// Fetches title, first artist and album art for a single track.
    pub async fn get_track(&self, track_id: &str) -> MusicResult<CatalogTrack> {
        let token = self.get_access_token().await?;
        let url = format!("{}/v1/tracks/{}", self.endpoints.api_url, track_id);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| {
                MusicError::ExternalApiError(format!("Failed to request Spotify track: {}", e))
            })?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => return Err(MusicError::InvalidLink),
            status => {
                let text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Cannot read response".to_string());
                return Err(MusicError::ExternalApiError(format!(
                    "Spotify API error: {} - {}",
                    status, text
                )));
            }
        }

        let track_data: serde_json::Value = response.json().await.map_err(|e| {
            MusicError::ExternalApiError(format!("Failed to parse Spotify track data: {}", e))
        })?;

        let title = track_data["name"]
            .as_str()
            .ok_or_else(|| MusicError::ExternalApiError("Missing track name".to_string()))?
            .to_string();

        let artist = track_data["artists"][0]["name"]
            .as_str()
            .ok_or_else(|| MusicError::ExternalApiError("Missing track artist".to_string()))?
            .to_string();

        let art_url = track_data["album"]["images"][0]["url"]
            .as_str()
            .map(|s| s.to_string());

        Ok(CatalogTrack {
            title,
            artist,
            art_url,
        })
    }
}

#[async_trait]
impl CatalogLookup for SpotifyApi {
    fn is_catalog_link(&self, url: &str) -> bool {
        SpotifyApi::is_spotify_url(url)
    }

    async fn lookup_by_link(&self, url: &str) -> MusicResult<CatalogTrack> {
        info!("Looking up Spotify link: {}", url);

        let track_id = SpotifyApi::extract_track_id(url).ok_or(MusicError::InvalidLink)?;

        if let Some(cached) = self.cache.get(&track_id) {
            debug!("Spotify track {} served from cache", track_id);
            return Ok(cached.clone());
        }

        let track = self.get_track(&track_id).await?;
        self.cache.insert(track_id, track.clone());

        Ok(track)
    }
}
