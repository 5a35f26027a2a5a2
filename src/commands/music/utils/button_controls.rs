use serenity::all::{ButtonStyle, CreateActionRow, CreateButton, ReactionType};

/// Prefix shared by the custom ids of all player buttons
pub const CONTROL_PREFIX: &str = "music_";

/// The actions offered on the player buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerControl {
    Play,
    Pause,
    Next,
    VolumeUp,
    VolumeDown,
}

impl PlayerControl {
    /// Every control, in button order
    pub const ALL: [PlayerControl; 5] = [
        PlayerControl::Play,
        PlayerControl::Pause,
        PlayerControl::Next,
        PlayerControl::VolumeDown,
        PlayerControl::VolumeUp,
    ];

    pub fn custom_id(self) -> &'static str {
        match self {
            PlayerControl::Play => "music_play",
            PlayerControl::Pause => "music_pause",
            PlayerControl::Next => "music_next",
            PlayerControl::VolumeUp => "music_volume_up",
            PlayerControl::VolumeDown => "music_volume_down",
        }
    }

    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|control| control.custom_id() == custom_id)
    }

    pub fn label(self) -> &'static str {
        match self {
            PlayerControl::Play => "Play",
            PlayerControl::Pause => "Pause",
            PlayerControl::Next => "Next",
            PlayerControl::VolumeUp => "Vol +",
            PlayerControl::VolumeDown => "Vol -",
        }
    }

    fn emoji(self) -> &'static str {
        match self {
            PlayerControl::Play => "▶️",
            PlayerControl::Pause => "⏸️",
            PlayerControl::Next => "⏭️",
            PlayerControl::VolumeUp => "🔊",
            PlayerControl::VolumeDown => "🔉",
        }
    }

    fn style(self) -> ButtonStyle {
        match self {
            PlayerControl::Play | PlayerControl::Pause => ButtonStyle::Primary,
            PlayerControl::Next => ButtonStyle::Secondary,
            PlayerControl::VolumeUp | PlayerControl::VolumeDown => ButtonStyle::Success,
        }
    }

    pub fn button(self) -> CreateButton {
        CreateButton::new(self.custom_id())
            .emoji(ReactionType::Unicode(self.emoji().to_string()))
            .style(self.style())
            .label(self.label())
    }
}

/// Creates a row of music control buttons
pub fn create_music_control_buttons() -> Vec<CreateActionRow> {
    let buttons = PlayerControl::ALL
        .into_iter()
        .map(PlayerControl::button)
        .collect();

    vec![CreateActionRow::Buttons(buttons)]
}
