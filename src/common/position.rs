use serde::{Deserialize, Serialize};

/// Coarse horizontal zone of a detection, used for descriptive speech.
///
/// This is deliberately independent from the tighter steering band the
/// guidance controller uses to tell the user which way to turn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    #[default] Center,
    Right,
}

const LEFT_EDGE: f32 = 0.33;
const RIGHT_EDGE: f32 = 0.66;

impl Position {
    /// Buckets a normalized horizontal center into a zone.
    pub fn from_center_x(cx: f32) -> Self {
        if cx < LEFT_EDGE {
            Position::Left
        } else if cx > RIGHT_EDGE {
            Position::Right
        } else {
            Position::Center
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Left => "left",
            Position::Center => "center",
            Position::Right => "right",
        }
    }

    /// Phrase used when the zone is read out loud.
    pub fn spoken(&self) -> &'static str {
        match self {
            Position::Left => "on the left",
            Position::Center => "ahead",
            Position::Right => "on the right",
        }
    }
}
