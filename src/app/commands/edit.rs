//! Editor commands — open/close the edit session, field edits, presets,
//! and the background personality suggestion.

use crate::agent::{AGENT_COLORS, AgentField, BodyColor, VOICES, Voice};
use crate::archetypes;
use crate::session::EditSession;
use crate::store::AgentStore;

use super::super::log_src;
use super::super::logging::LogLevel;
use super::super::{App, SuggestionEvent};

// ── Session lifecycle ────────────────────────────────────────────────

impl App {
    pub(crate) fn open_session(&mut self) {
        if let Some(session) = self.session.take() {
            if session.agent_id() == self.store.current_id() {
                let name = session
                    .snapshot()
                    .map(|agent| display_name(&agent.name))
                    .unwrap_or_default();
                self.session = Some(session);
                self.log(LogLevel::Info, format!("Already editing {name}."));
                return;
            }
            session.close();
        }

        match EditSession::open(self.store.clone(), self.suggester.clone()) {
            Some(session) => {
                let name = session
                    .snapshot()
                    .map(|agent| display_name(&agent.name))
                    .unwrap_or_default();
                self.session = Some(session);
                self.log(LogLevel::Info, format!("✏️  Editing {name}. /close when done."));
            }
            None => log_src!(self, LogLevel::Error, "No current agent to edit.".to_string()),
        }
    }

    /// Close the editor.  A suggestion still in flight will be discarded.
    pub(crate) fn close_session(&mut self) {
        let Some(session) = self.session.take() else {
            self.log(LogLevel::Info, "No editor open.".to_string());
            return;
        };
        let pending = session.is_suggesting();
        session.close();

        let name = session
            .snapshot()
            .map(|agent| display_name(&agent.name))
            .unwrap_or_default();
        self.log(LogLevel::Success, format!("{name} is ready. Let's go!"));
        if pending {
            self.log(
                LogLevel::Info,
                "A suggestion was still running; its result will be ignored.".to_string(),
            );
        }
    }

    /// The open session, or a warning when there is none.
    fn editing(&mut self) -> Option<EditSession> {
        if self.session.is_none() {
            log_src!(
                self,
                LogLevel::Warn,
                "No editor open. Use /edit first.".to_string()
            );
        }
        self.session.clone()
    }
}

// ── Field edits ──────────────────────────────────────────────────────

impl App {
    pub(crate) fn edit_name(&mut self, rest: &str) {
        if let Some(session) = self.editing() {
            session.apply_field_edit(AgentField::Name(rest.to_string()));
        }
    }

    pub(crate) fn edit_personality(&mut self, rest: &str) {
        if let Some(session) = self.editing() {
            session.apply_field_edit(AgentField::Personality(rest.to_string()));
        }
    }

    pub(crate) fn edit_color(&mut self, arg: &str) {
        let Some(session) = self.editing() else {
            return;
        };
        match parse_color(arg) {
            Some(color) => session.apply_field_edit(AgentField::BodyColor(color)),
            None => {
                let palette: Vec<String> = AGENT_COLORS
                    .iter()
                    .enumerate()
                    .map(|(i, color)| format!("{}={color}", i + 1))
                    .collect();
                log_src!(
                    self,
                    LogLevel::Warn,
                    format!("Unknown color {arg:?}. Palette: {}", palette.join(" "))
                );
            }
        }
    }

    pub(crate) fn edit_voice(&mut self, arg: &str) {
        let Some(session) = self.editing() else {
            return;
        };
        match arg.parse::<Voice>() {
            Ok(voice) => session.apply_field_edit(AgentField::Voice(voice)),
            Err(err) => {
                let voices: Vec<&str> = VOICES.iter().map(|voice| voice.name()).collect();
                log_src!(
                    self,
                    LogLevel::Warn,
                    format!("{err}. Voices: {}", voices.join(", "))
                );
            }
        }
    }
}

/// Accept a 1-based palette position or a palette hex value.
fn parse_color(arg: &str) -> Option<BodyColor> {
    let arg = arg.trim();
    if let Ok(position) = arg.parse::<usize>() {
        return position.checked_sub(1).and_then(BodyColor::from_index);
    }
    arg.parse().ok()
}

fn display_name(name: &str) -> String {
    if name.trim().is_empty() {
        "(unnamed agent)".to_string()
    } else {
        name.to_string()
    }
}

// ── Presets ──────────────────────────────────────────────────────────

impl App {
    pub(crate) fn list_archetypes(&mut self) {
        self.log(LogLevel::Info, "Archetypes:".to_string());
        for (i, archetype) in self.archetypes.iter().enumerate() {
            self.log(LogLevel::Info, format!("  {}. {}", i + 1, archetype.label));
        }
    }

    pub(crate) fn apply_archetype(&mut self, query: &str) {
        let Some(session) = self.editing() else {
            return;
        };
        match archetypes::find(self.archetypes, query) {
            Some(archetype) => {
                session.apply_archetype(archetype);
                self.log(LogLevel::Info, format!("Applied the {} archetype.", archetype.label));
            }
            None => log_src!(
                self,
                LogLevel::Warn,
                format!("No archetype {query:?}. See /archetypes.")
            ),
        }
    }
}

// ── Suggestion ───────────────────────────────────────────────────────

impl App {
    /// Start a suggestion in the background.  Declined requests (blank name,
    /// one already running) stay silent.
    pub(crate) fn request_suggestion(&mut self) {
        let Some(session) = self.editing() else {
            return;
        };
        let agent_name = session
            .snapshot()
            .map(|agent| agent.name.trim().to_string())
            .unwrap_or_default();

        let was_pending = session.is_suggesting();
        let task = session.request_suggestion();
        if !was_pending && session.is_suggesting() {
            self.log(
                LogLevel::Info,
                format!("Thinking about a personality for {agent_name}…"),
            );
        }

        let tx = self.suggestion_tx.clone();
        let agent_id = session.agent_id();
        self.runtime.spawn(async move {
            let outcome = task.await;
            let _ = tx.send(SuggestionEvent {
                agent_id,
                agent_name,
                outcome,
            });
        });
    }

    pub(crate) fn dismiss_error(&mut self) {
        if let Some(session) = &self.session {
            session.dismiss_error();
        }
    }

    /// Log the agent shown in the card.
    pub(crate) fn show_agent(&mut self) {
        let Some(agent) = self.displayed_agent() else {
            return;
        };
        let editing = self
            .session
            .as_ref()
            .is_some_and(|session| session.agent_id() == agent.id);
        let lines = [
            format!(
                "{}{}",
                display_name(&agent.name),
                if editing { " (editing)" } else { "" }
            ),
            format!("  color: {}  voice: {}", agent.body_color, agent.voice),
            format!(
                "  personality: {}",
                if agent.personality.is_empty() {
                    "(none)"
                } else {
                    agent.personality.as_str()
                }
            ),
        ];
        for line in lines {
            self.log(LogLevel::Info, line);
        }
        if let Some(error) = self.session.as_ref().and_then(|session| session.last_error()) {
            self.log(LogLevel::Warn, format!("  last suggestion: {error}"));
        }
        if self.store.current().map(|current| current.id) != Some(agent.id) {
            self.log(
                LogLevel::Warn,
                "This agent is no longer the current one.".to_string(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::agent::{BodyColor, Voice};
    use crate::app::logging::LogLevel;
    use crate::app::tests::{await_suggestion, last_log, test_app};
    use crate::archetypes::ARCHETYPES;

    use super::parse_color;

    #[test]
    fn field_commands_require_an_open_editor() {
        let mut app = test_app();
        app.handle_command("/name Bob").unwrap();
        assert_eq!(last_log(&app).level, LogLevel::Warn);
        assert_eq!(app.displayed_agent().unwrap().name, "Zeke");
    }

    #[test]
    fn field_commands_patch_the_agent() {
        let mut app = test_app();
        app.handle_command("/edit").unwrap();
        app.handle_command("/name  Zeke  the Bold").unwrap();
        app.handle_command("/personality Dry,  blunt.").unwrap();
        app.handle_command("/color 3").unwrap();
        app.handle_command("/voice charon").unwrap();

        let agent = app.displayed_agent().unwrap();
        assert_eq!(agent.name, "Zeke  the Bold");
        assert_eq!(agent.personality, "Dry,  blunt.");
        assert_eq!(agent.body_color, BodyColor::Yellow);
        assert_eq!(agent.voice, Voice::Charon);
    }

    #[test]
    fn invalid_color_and_voice_are_rejected() {
        let mut app = test_app();
        app.handle_command("/edit").unwrap();
        app.handle_command("/color #fff").unwrap();
        assert_eq!(last_log(&app).level, LogLevel::Warn);
        app.handle_command("/voice V1").unwrap();
        assert_eq!(last_log(&app).level, LogLevel::Warn);

        let agent = app.displayed_agent().unwrap();
        assert_eq!(agent.body_color, BodyColor::Blue);
        assert_eq!(agent.voice, Voice::Puck);
    }

    #[test]
    fn parse_color_accepts_positions_and_hex() {
        assert_eq!(parse_color("1"), Some(BodyColor::Blue));
        assert_eq!(parse_color("#34A853"), Some(BodyColor::Green));
        assert_eq!(parse_color("0"), None);
        assert_eq!(parse_color("9"), None);
    }

    #[test]
    fn archetype_replaces_personality() {
        let mut app = test_app();
        app.handle_command("/edit").unwrap();
        app.handle_command("/archetype comedian").unwrap();
        assert_eq!(app.displayed_agent().unwrap().personality, ARCHETYPES[1].personality);

        app.handle_command("/a 99").unwrap();
        assert_eq!(last_log(&app).level, LogLevel::Warn);
        assert_eq!(app.displayed_agent().unwrap().personality, ARCHETYPES[1].personality);
    }

    #[test]
    fn suggestion_applies_in_background() {
        let mut app = test_app();
        app.handle_command("/edit").unwrap();
        app.handle_command("/suggest").unwrap();
        await_suggestion(&mut app);

        assert_eq!(
            app.displayed_agent().unwrap().personality,
            "I'm Zeke, blunt and dry."
        );
        assert_eq!(last_log(&app).level, LogLevel::Success);
        assert!(!app.session.as_ref().unwrap().is_suggesting());
    }

    #[test]
    fn blank_name_suggestion_is_silent() {
        let mut app = test_app();
        app.handle_command("/edit").unwrap();
        app.handle_command("/name").unwrap();
        let logged = app.logs.len();

        app.handle_command("/suggest").unwrap();
        await_suggestion(&mut app);

        assert_eq!(app.logs.len(), logged);
        assert_eq!(app.displayed_agent().unwrap().personality, "old text");
    }

    #[test]
    fn closing_ends_the_session() {
        let mut app = test_app();
        app.handle_command("/edit").unwrap();
        app.handle_command("/close").unwrap();
        assert!(app.session.is_none());
        assert_eq!(last_log(&app).level, LogLevel::Success);

        app.handle_command("/suggest").unwrap();
        assert_eq!(last_log(&app).level, LogLevel::Warn);
    }

    #[test]
    fn dismiss_clears_last_error() {
        let mut app = test_app();
        app.handle_command("/edit").unwrap();
        app.handle_command("/name Fail").unwrap();
        app.handle_command("/suggest").unwrap();
        await_suggestion(&mut app);
        assert!(app.session.as_ref().unwrap().last_error().is_some());

        app.handle_command("/dismiss").unwrap();
        assert!(app.session.as_ref().unwrap().last_error().is_none());
    }
}
