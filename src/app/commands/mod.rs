//! Slash-command dispatch and handler implementations.
//!
//! Every `/command` typed by the user is routed through [`App::handle_command`]
//! and dispatched to the appropriate handler in a focused submodule:
//!
//! | Module   | Commands                                                     |
//! |----------|--------------------------------------------------------------|
//! | `edit`   | `/edit`, `/close`, field edits, `/archetype`, `/suggest`     |
//! | `roster` | `/agents`, `/use`, `/new`, `/remove`, `/show`                |

mod edit;
mod roster;

use super::App;
use super::log_src;
use super::logging::LogLevel;

// ── Command dispatch ─────────────────────────────────────────────────

impl App {
    /// Route a slash-command to the matching handler.
    ///
    /// Free-text arguments (names, personalities) are passed through as the
    /// raw remainder of the line so inner spacing survives.
    pub(crate) fn handle_command(&mut self, line: &str) -> anyhow::Result<()> {
        let (cmd, rest) = line
            .split_once(char::is_whitespace)
            .map(|(cmd, rest)| (cmd, rest.trim_start()))
            .unwrap_or((line, ""));

        match cmd {
            "/help" => self.show_help(),
            "/quit" | "/exit" => self.should_quit = true,
            "/clear" => self.logs.clear(),
            "/edit" => self.open_session(),
            "/close" | "/done" => self.close_session(),
            "/name" => self.edit_name(rest),
            "/personality" | "/p" => self.edit_personality(rest),
            "/color" => self.edit_color(rest),
            "/voice" => self.edit_voice(rest),
            "/archetypes" => self.list_archetypes(),
            "/archetype" | "/a" => self.apply_archetype(rest),
            "/suggest" => self.request_suggestion(),
            "/dismiss" => self.dismiss_error(),
            "/agents" => self.list_agents(),
            "/use" => self.use_agent(rest),
            "/new" => self.new_agent(rest),
            "/remove" => self.remove_agent(rest),
            "/show" => self.show_agent(),
            _ => log_src!(self, LogLevel::Warn, format!("Unknown command: {cmd}")),
        }

        Ok(())
    }
}

// ── Help ─────────────────────────────────────────────────────────────

impl App {
    fn show_help(&mut self) {
        let lines = [
            "━━━  ◆ Agent Studio  ━━━",
            "",
            "Editing (current agent)",
            "  /edit                   Open the editor on the current agent",
            "  /name <text>            Set the name (may be empty while editing)",
            "  /personality <text>     Replace the personality text (/p)",
            "  /color <1-8|#hex>       Pick a body color from the palette",
            "  /voice <name>           Pick a voice",
            "  /archetypes             List personality presets",
            "  /archetype <n|label>    Apply a preset (/a)",
            "  /suggest                Suggest a personality from the name",
            "  /dismiss                Clear the last suggestion error",
            "  /close                  Close the editor (/done, Esc)",
            "",
            "Agents",
            "  /agents                 List agents",
            "  /use <name>             Switch the current agent",
            "  /new <name>             Create an agent and start editing it",
            "  /remove <name>          Remove an agent",
            "  /show                   Show the current agent",
            "",
            "General",
            "  /clear                  Clear the activity log (Ctrl+L)",
            "  /quit                   Exit (Ctrl+C)",
        ];
        for line in lines {
            self.log(LogLevel::Info, line.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::app::logging::LogLevel;
    use crate::app::tests::{last_log, test_app};

    #[test]
    fn unknown_command_warns() {
        let mut app = test_app();
        app.handle_command("/frobnicate now").unwrap();
        let line = last_log(&app);
        assert_eq!(line.level, LogLevel::Warn);
        assert!(line.message.contains("/frobnicate"));
    }

    #[test]
    fn help_lists_suggest() {
        let mut app = test_app();
        app.handle_command("/help").unwrap();
        assert!(app.logs.iter().any(|l| l.message.contains("/suggest")));
    }

    #[test]
    fn quit_sets_flag() {
        let mut app = test_app();
        app.handle_command("/quit").unwrap();
        assert!(app.should_quit());
    }
}
