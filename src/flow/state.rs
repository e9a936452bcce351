//! Flow state — tagged form of the persisted sentinel encoding.

use crate::store::UserRecord;

/// One stored answer.
///
/// The store keeps `NULL` for "never set" and `-1` for "explicitly
/// cleared" (a completed flow resets to `-1` instead of deleting the row).
/// Both mean "needs a prompt"; only the introduction message distinguishes
/// them. That collapse is deliberate and preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Never answered.
    Unset,
    /// Answered before, cleared by a completed flow.
    Cleared,
    /// Answered: 1–3.
    Chosen(u8),
}

impl Answer {
    /// Decode a stored column value.
    ///
    /// Values outside 1–3 (including `-1`) decode as `Cleared`, so a
    /// corrupt row re-prompts instead of computing a bad audio index.
    pub fn from_stored(value: Option<i64>) -> Self {
        match value {
            None => Self::Unset,
            Some(n @ 1..=3) => Self::Chosen(n as u8),
            Some(_) => Self::Cleared,
        }
    }

    /// Whether this answer still needs to be asked for.
    pub fn needs_prompt(&self) -> bool {
        matches!(self, Self::Unset | Self::Cleared)
    }
}

/// Both answers for one user, decoded from the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserFlowState {
    pub mood: Answer,
    pub location: Answer,
}

impl From<&UserRecord> for UserFlowState {
    fn from(record: &UserRecord) -> Self {
        Self {
            mood: Answer::from_stored(record.target_mood),
            location: Answer::from_stored(record.target_location),
        }
    }
}

/// A parsed postback button payload.
///
/// The wire vocabulary is exactly `mood-option-{1,2,3}` and
/// `location-option-{1,2,3}`; anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostbackPayload {
    Mood(u8),
    Location(u8),
}

impl PostbackPayload {
    pub fn parse(payload: &str) -> Option<Self> {
        let option = |prefix: &str| -> Option<u8> {
            match payload.strip_prefix(prefix)? {
                "1" => Some(1),
                "2" => Some(2),
                "3" => Some(3),
                _ => None,
            }
        };
        if let Some(n) = option("mood-option-") {
            return Some(Self::Mood(n));
        }
        if let Some(n) = option("location-option-") {
            return Some(Self::Location(n));
        }
        None
    }
}
