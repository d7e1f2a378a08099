//! Agent definitions — the editable character and its fixed vocabularies.
//!
//! An [`Agent`] carries a display name, a personality text, a body color
//! drawn from [`AGENT_COLORS`] and a [`Voice`].  Colors and voices are closed
//! enums so an agent can never hold a value outside the palette.  Edits are
//! expressed as [`AgentPatch`]es addressed by [`AgentId`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Identity ─────────────────────────────────────────────────────────

/// Opaque, immutable agent identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(Uuid);

impl AgentId {
    pub fn new() -> Self {
        AgentId(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Body color palette ───────────────────────────────────────────────

/// One entry of the fixed body-color palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BodyColor {
    Blue,
    Red,
    Yellow,
    Green,
    Orange,
    Pink,
    Purple,
    Cyan,
}

/// The palette, in display order.
pub const AGENT_COLORS: [BodyColor; 8] = [
    BodyColor::Blue,
    BodyColor::Red,
    BodyColor::Yellow,
    BodyColor::Green,
    BodyColor::Orange,
    BodyColor::Pink,
    BodyColor::Purple,
    BodyColor::Cyan,
];

impl BodyColor {
    /// Lower-case `#rrggbb` form.
    pub fn hex(self) -> &'static str {
        match self {
            BodyColor::Blue => "#4285f4",
            BodyColor::Red => "#ea4335",
            BodyColor::Yellow => "#fbbc04",
            BodyColor::Green => "#34a853",
            BodyColor::Orange => "#fa7b17",
            BodyColor::Pink => "#f538a0",
            BodyColor::Purple => "#a142f4",
            BodyColor::Cyan => "#24c1e0",
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        let hex = &self.hex()[1..];
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        (channel(0), channel(2), channel(4))
    }

    /// Palette entry at `index` (0-based), if any.
    pub fn from_index(index: usize) -> Option<Self> {
        AGENT_COLORS.get(index).copied()
    }
}

impl fmt::Display for BodyColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0:?} is not in the agent color palette")]
pub struct ParseColorError(String);

impl FromStr for BodyColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('#').to_ascii_lowercase();
        AGENT_COLORS
            .into_iter()
            .find(|color| color.hex()[1..] == wanted)
            .ok_or_else(|| ParseColorError(s.to_string()))
    }
}

impl TryFrom<String> for BodyColor {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BodyColor> for String {
    fn from(color: BodyColor) -> Self {
        color.hex().to_string()
    }
}

// ── Voices ───────────────────────────────────────────────────────────

/// Supported speaking voices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Voice {
    Aoede,
    Charon,
    Fenrir,
    Kore,
    Leda,
    Orus,
    Puck,
    Zephyr,
}

/// All voices, in display order.
pub const VOICES: [Voice; 8] = [
    Voice::Aoede,
    Voice::Charon,
    Voice::Fenrir,
    Voice::Kore,
    Voice::Leda,
    Voice::Orus,
    Voice::Puck,
    Voice::Zephyr,
];

impl Voice {
    pub fn name(self) -> &'static str {
        match self {
            Voice::Aoede => "Aoede",
            Voice::Charon => "Charon",
            Voice::Fenrir => "Fenrir",
            Voice::Kore => "Kore",
            Voice::Leda => "Leda",
            Voice::Orus => "Orus",
            Voice::Puck => "Puck",
            Voice::Zephyr => "Zephyr",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown voice {0:?}")]
pub struct ParseVoiceError(String);

impl FromStr for Voice {
    type Err = ParseVoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        VOICES
            .into_iter()
            .find(|voice| voice.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseVoiceError(s.to_string()))
    }
}

impl TryFrom<String> for Voice {
    type Error = ParseVoiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Voice> for String {
    fn from(voice: Voice) -> Self {
        voice.name().to_string()
    }
}

// ── Agent ────────────────────────────────────────────────────────────

/// The editable conversational character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    /// Display name; may be empty while editing.
    pub name: String,
    /// Free-form personality injected into the character's prompt.
    pub personality: String,
    pub body_color: BodyColor,
    pub voice: Voice,
}

impl Agent {
    /// Create an agent with a fresh id.
    pub fn new(
        name: impl Into<String>,
        personality: impl Into<String>,
        body_color: BodyColor,
        voice: Voice,
    ) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            personality: personality.into(),
            body_color,
            voice,
        }
    }

    /// A blank agent with the given name and palette/voice defaults.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, "", AGENT_COLORS[0], VOICES[0])
    }

    /// Merge the provided fields of `patch` into this agent.
    pub fn apply(&mut self, patch: &AgentPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(personality) = &patch.personality {
            self.personality = personality.clone();
        }
        if let Some(color) = patch.body_color {
            self.body_color = color;
        }
        if let Some(voice) = patch.voice {
            self.voice = voice;
        }
    }
}

// ── Edits ────────────────────────────────────────────────────────────

/// A partial set of agent field changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentPatch {
    pub name: Option<String>,
    pub personality: Option<String>,
    pub body_color: Option<BodyColor>,
    pub voice: Option<Voice>,
}

impl AgentPatch {
    pub fn personality(text: impl Into<String>) -> Self {
        Self {
            personality: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.personality.is_none()
            && self.body_color.is_none()
            && self.voice.is_none()
    }
}

/// A single-field edit intent coming from the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentField {
    Name(String),
    Personality(String),
    BodyColor(BodyColor),
    Voice(Voice),
}

impl From<AgentField> for AgentPatch {
    fn from(field: AgentField) -> Self {
        let mut patch = AgentPatch::default();
        match field {
            AgentField::Name(name) => patch.name = Some(name),
            AgentField::Personality(text) => patch.personality = Some(text),
            AgentField::BodyColor(color) => patch.body_color = Some(color),
            AgentField::Voice(voice) => patch.voice = Some(voice),
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parsing_accepts_only_palette_members() {
        assert_eq!("#FBBC04".parse::<BodyColor>(), Ok(BodyColor::Yellow));
        assert_eq!("24c1e0".parse::<BodyColor>(), Ok(BodyColor::Cyan));
        assert!("#fff".parse::<BodyColor>().is_err());
        assert!("#000000".parse::<BodyColor>().is_err());
    }

    #[test]
    fn color_rgb_matches_hex() {
        assert_eq!(BodyColor::Blue.rgb(), (0x42, 0x85, 0xf4));
        assert_eq!(BodyColor::from_index(7), Some(BodyColor::Cyan));
        assert_eq!(BodyColor::from_index(8), None);
    }

    #[test]
    fn voice_parsing_is_case_insensitive() {
        assert_eq!("zephyr".parse::<Voice>(), Ok(Voice::Zephyr));
        assert_eq!(" Puck ".parse::<Voice>(), Ok(Voice::Puck));
        assert!("V1".parse::<Voice>().is_err());
    }

    #[test]
    fn agent_serializes_with_camel_case_and_palette_strings() {
        let agent = Agent::new("Zeke", "dry", BodyColor::Red, Voice::Orus);
        let value = serde_json::to_value(&agent).unwrap();
        assert_eq!(value["bodyColor"], "#ea4335");
        assert_eq!(value["voice"], "Orus");

        let back: Agent = serde_json::from_value(value).unwrap();
        assert_eq!(back, agent);
    }

    #[test]
    fn deserializing_off_palette_color_fails() {
        let raw = serde_json::json!({
            "id": AgentId::new(),
            "name": "x",
            "personality": "",
            "bodyColor": "#fff",
            "voice": "Puck",
        });
        assert!(serde_json::from_value::<Agent>(raw).is_err());
    }

    #[test]
    fn apply_merges_only_provided_fields() {
        let mut agent = Agent::new("Zeke", "old", BodyColor::Blue, Voice::Kore);
        let id = agent.id;
        agent.apply(&AgentField::Voice(Voice::Leda).into());
        agent.apply(&AgentPatch::personality("new"));

        assert_eq!(agent.id, id);
        assert_eq!(agent.name, "Zeke");
        assert_eq!(agent.personality, "new");
        assert_eq!(agent.body_color, BodyColor::Blue);
        assert_eq!(agent.voice, Voice::Leda);
    }

    #[test]
    fn field_converts_to_single_field_patch() {
        let patch: AgentPatch = AgentField::Name(String::new()).into();
        assert_eq!(patch.name.as_deref(), Some(""));
        assert!(patch.personality.is_none() && patch.body_color.is_none() && patch.voice.is_none());
        assert!(!patch.is_empty());
        assert!(AgentPatch::default().is_empty());
    }
}
