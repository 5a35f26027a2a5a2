//! This module aggregates all the command modules for the bot.

/// General purpose commands (e.g., ping, badge registration).
pub mod general;
/// Commands related to music playback and the voice connection.
pub mod music;
