//! Message texts, button templates, and the audio filename table.

use crate::dispatch::{MessagePayload, PostbackButton};

pub const INTRODUCTION_TEXT: &str =
    "Hi there, I can help you select an ambient sound thats right for you.";

pub const CLOSING_WAIT_TEXT: &str = "I'm sending you your ambient sounds now, please wait.";

pub const CLOSING_TEXT: &str =
    "Here is your ambient sound effect. Let me know if you want to pick a new ambient effect.";

/// Audio files, indexed by `sound_index`. Mood-major, location-minor —
/// the order is contract.
pub const SOUND_FILENAMES: [&str; 9] = [
    "forest_birds.mp3",
    "city_hum.mp3",
    "river.mp3",
    "evening_rain_forest.mp3",
    "night_crickets.mp3",
    "night_forest_stream.mp3",
    "ocean_waves.mp3",
    "cafe.mp3",
    "stormy_street.mp3",
];

/// Index into `SOUND_FILENAMES` for a mood/location pair (both 1-based).
pub fn sound_index(mood: u8, location: u8) -> usize {
    (mood as usize - 1) * 3 + (location as usize - 1)
}

/// The mood question — first of the two.
pub fn mood_selection() -> MessagePayload {
    MessagePayload::ButtonTemplate {
        text: "Select the mood that you're trying to achieve right now".into(),
        buttons: vec![
            PostbackButton::new("Relaxation", "mood-option-1"),
            PostbackButton::new("Sleep", "mood-option-2"),
            PostbackButton::new("Concentration", "mood-option-3"),
        ],
    }
}

/// The location-affinity question — second of the two.
pub fn location_selection() -> MessagePayload {
    MessagePayload::ButtonTemplate {
        text: "Does being around people relax you?".into(),
        buttons: vec![
            PostbackButton::new("No Way!", "location-option-1"),
            PostbackButton::new("Yes!", "location-option-2"),
            PostbackButton::new("Sometimes", "location-option-3"),
        ],
    }
}

/// The computed audio link for a completed flow.
pub fn audio_link(server_url: &str, mood: u8, location: u8) -> MessagePayload {
    let filename = SOUND_FILENAMES[sound_index(mood, location)];
    MessagePayload::text(format!("{server_url}/{filename}"))
}
