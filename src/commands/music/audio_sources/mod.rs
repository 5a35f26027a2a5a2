//! This module defines the traits for the external lookup services and the
//! `AudioSources` resolver that turns a user's query into a playable `Track`.
//!
//! Plain queries and video URLs go straight to the search backend. Catalog
//! links (Spotify) are looked up first and the catalog's title and artist are
//! then searched for.

/// Submodule implementing the `CatalogLookup` trait for Spotify.
pub mod spotify;
/// Submodule defining the track descriptors used across audio sources.
pub mod track_metadata;
/// Submodule implementing the `SearchBackend` trait with `yt-dlp`.
pub mod youtube;

use std::sync::Arc;

use poise::serenity_prelude::ChannelId;
use serenity::async_trait;
use tracing::info;
use url::Url;

use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use crate::config::BotConfig;
use spotify::SpotifyApi;
use track_metadata::{CatalogTrack, ResolvedTrack, Track};
use youtube::YoutubeApi;

/// A video-search backend that resolves a search query or URL to a stream.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Resolves `query_or_url` to its best audio stream, or `MusicError::NotFound`.
    async fn resolve(&self, query_or_url: &str) -> MusicResult<ResolvedTrack>;
}

/// A music-metadata catalog that understands share links.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Whether `url` belongs to this catalog at all.
    fn is_catalog_link(&self, url: &str) -> bool;

    /// Looks up the track behind a share link, or `MusicError::InvalidLink`.
    async fn lookup_by_link(&self, url: &str) -> MusicResult<CatalogTrack>;
}

/// A utility struct providing general helper functions related to audio sources.
pub struct AudioSource;

impl AudioSource {
    /// Whether the input is an http(s) URL rather than a search query.
    pub fn is_url(input: &str) -> bool {
        Url::parse(input.trim()).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
    }
}

/// The lookup services the play commands resolve queries through.
#[derive(Clone)]
pub struct AudioSources {
    search: Arc<dyn SearchBackend>,
    catalog: Option<Arc<dyn CatalogLookup>>,
}

impl AudioSources {
    pub fn new(search: Arc<dyn SearchBackend>, catalog: Option<Arc<dyn CatalogLookup>>) -> Self {
        Self { search, catalog }
    }

    /// yt-dlp search, plus Spotify when credentials are configured.
    pub fn from_config(config: &BotConfig) -> Self {
        let search = Arc::new(YoutubeApi::new(config.ytdlp_path.clone()));
        let catalog = config
            .spotify
            .clone()
            .map(|credentials| Arc::new(SpotifyApi::new(credentials)) as Arc<dyn CatalogLookup>);

        if catalog.is_none() {
            info!("Spotify credentials not configured, Spotify links are disabled");
        }

        Self::new(search, catalog)
    }

    fn is_catalog_link(&self, query: &str) -> bool {
        match &self.catalog {
            Some(catalog) => catalog.is_catalog_link(query),
            None => SpotifyApi::is_spotify_url(query),
        }
    }

    /// Resolves any query: catalog links through the catalog, everything else
    /// straight through the search backend.
    pub async fn resolve(
        &self,
        query: &str,
        requested_by: impl Into<String>,
        reply_to: ChannelId,
    ) -> MusicResult<Track> {
        let query = query.trim();

        if self.is_catalog_link(query) {
            return self.resolve_catalog_link(query, requested_by, reply_to).await;
        }

        info!("Searching for: {}", query);
        let resolved = self.search.resolve(query).await?;
        Ok(Track::from_resolved(resolved, reply_to, requested_by))
    }

    /// Resolves a catalog share link only; anything else is `InvalidLink`.
    pub async fn resolve_catalog_link(
        &self,
        url: &str,
        requested_by: impl Into<String>,
        reply_to: ChannelId,
    ) -> MusicResult<Track> {
        let url = url.trim();

        if !self.is_catalog_link(url) {
            return Err(MusicError::InvalidLink);
        }

        let catalog = self.catalog.as_ref().ok_or_else(|| {
            MusicError::ConfigError("Spotify credentials are not configured".to_string())
        })?;

        let catalog_track = catalog.lookup_by_link(url).await?;
        let search_query = catalog_track.search_query();
        info!("Searching for catalog track: {}", search_query);

        let resolved = self.search.resolve(&search_query).await?;
        let thumbnail = catalog_track.art_url.or_else(|| resolved.thumbnail.clone());

        Ok(Track::from_resolved(resolved, reply_to, requested_by).with_thumbnail(thumbnail))
    }
}
