//! Runtime configuration, read from the environment (and `.env`) at startup.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use humantime_serde::re::humantime;
use thiserror::Error;

use crate::commands::music::utils::music_manager::{MAX_VOLUME, PlaybackSettings};

/// Errors raised while reading the bot configuration
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Client credentials for the Spotify Web API
#[derive(Debug, Clone, PartialEq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Everything the bot needs to know before connecting to the gateway
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    /// Prefix for text commands, `.` unless overridden.
    pub command_prefix: String,
    /// Spotify link support is disabled when this is `None`.
    pub spotify: Option<SpotifyCredentials>,
    pub ytdlp_path: String,
    pub playback: PlaybackSettings,
}

impl BotConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let discord_token = lookup("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let spotify = match (lookup("SPOTIFY_CLIENT_ID"), lookup("SPOTIFY_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
                client_id,
                client_secret,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("SPOTIFY_CLIENT_SECRET")),
            (None, Some(_)) => return Err(ConfigError::Missing("SPOTIFY_CLIENT_ID")),
        };

        let defaults = PlaybackSettings::default();
        let retry_delay = match lookup("PLAYBACK_RETRY_DELAY") {
            Some(value) => humantime::parse_duration(&value)
                .map_err(|e| invalid("PLAYBACK_RETRY_DELAY", &value, e))?,
            None => defaults.retry_delay,
        };

        let playback = PlaybackSettings {
            retry_delay,
            max_retries: parse_or(&lookup, "PLAYBACK_MAX_RETRIES", defaults.max_retries)?,
            default_volume: parse_or(&lookup, "DEFAULT_VOLUME", defaults.default_volume)?,
            volume_step: parse_or(&lookup, "VOLUME_STEP", defaults.volume_step)?,
        };

        let config = Self {
            discord_token,
            command_prefix: lookup("COMMAND_PREFIX").unwrap_or_else(|| ".".to_string()),
            spotify,
            ytdlp_path: lookup("YTDLP_PATH").unwrap_or_else(|| "yt-dlp".to_string()),
            playback,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let playback = &self.playback;

        if playback.max_retries == 0 {
            return Err(invalid("PLAYBACK_MAX_RETRIES", "0", "must be at least 1"));
        }

        if !(0.0..=MAX_VOLUME).contains(&playback.default_volume) {
            return Err(invalid(
                "DEFAULT_VOLUME",
                playback.default_volume,
                format!("must be between 0 and {}", MAX_VOLUME),
            ));
        }

        let step = playback.volume_step;
        if step.is_nan() || step <= 0.0 || step > MAX_VOLUME {
            return Err(invalid(
                "VOLUME_STEP",
                playback.volume_step,
                format!("must be greater than 0 and at most {}", MAX_VOLUME),
            ));
        }

        Ok(())
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|e| invalid(key, &value, e)),
        None => Ok(default),
    }
}

fn invalid(key: &'static str, value: impl Display, reason: impl Display) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
