//! Application core — state, lifecycle, and event dispatch.
//!
//! The [`App`] struct holds all runtime state and is the single entry point
//! for the rest of the binary.  Heavy concerns are delegated to focused
//! submodules:
//!
//! | Module       | Responsibility                                 |
//! |--------------|------------------------------------------------|
//! | `commands`   | Slash-command dispatch & handlers              |
//! | `input`      | Text-input editing (cursor, insert, history)   |
//! | `logging`    | `LogLevel`, `LogLine`, `mask_key`              |
//! | `ui`         | TUI rendering & status-bar helpers             |
//!
//! Suggestions run on the app-owned tokio runtime; their outcomes come back
//! over an mpsc channel that [`App::tick`] drains between frames.

/// Log a `Warn`/`Error` message, attaching `[file:line]` in debug-logs builds.
///
/// In release (no `debug-logs` feature) this behaves like `self.log()`.
macro_rules! log_src {
    ($app:expr, $level:expr, $msg:expr) => {{
        #[cfg(feature = "debug-logs")]
        {
            let loc = format!("{}:{}", file!(), line!());
            $app.log_with_src($level, $msg, &loc);
        }
        #[cfg(not(feature = "debug-logs"))]
        {
            $app.log($level, $msg);
        }
    }};
}
pub(crate) use log_src;

mod commands;
mod input;
mod logging;
mod ui;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::agent::{Agent, AgentId};
use crate::archetypes::{ARCHETYPES, Archetype};
use crate::config::{ProviderConfig, RosterSource, load_roster};
use crate::constants::MAX_LOGS;
use crate::session::{EditSession, SuggestionOutcome};
use crate::store::{AgentStore, MemoryAgentStore};
use crate::suggest::PersonalitySuggester;

use self::logging::{LogLevel, LogLine, mask_key};

// ── Application state ────────────────────────────────────────────────

/// A finished suggestion reported back from its background task.
#[derive(Debug)]
pub(crate) struct SuggestionEvent {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub outcome: SuggestionOutcome,
}

/// Top-level application state.
///
/// Fields use `pub(crate)` visibility so that the sibling submodules
/// (`commands`, `input`, `ui`) can access them directly.
pub struct App {
    pub(crate) runtime: Runtime,
    pub(crate) input: String,
    pub(crate) cursor: usize,
    pub(crate) input_history: Vec<String>,
    pub(crate) history_index: Option<usize>,
    pub(crate) history_stash: String,
    pub(crate) logs: Vec<LogLine>,
    pub(crate) store: Arc<MemoryAgentStore>,
    pub(crate) archetypes: &'static [Archetype],
    pub(crate) provider: ProviderConfig,
    pub(crate) suggester: Arc<dyn PersonalitySuggester>,
    pub(crate) session: Option<EditSession>,
    pub(crate) suggestion_tx: mpsc::UnboundedSender<SuggestionEvent>,
    pub(crate) suggestion_rx: mpsc::UnboundedReceiver<SuggestionEvent>,
    pub(crate) scroll_offset: u16,
    pub(crate) should_quit: bool,
}

// ── Lifecycle ────────────────────────────────────────────────────────

impl App {
    /// Create and initialise a new application instance from the environment.
    pub fn new() -> Result<Self> {
        let (agents, roster_source) = load_roster()?;
        let provider = ProviderConfig::from_env().context("resolve suggestion provider")?;
        let suggester = provider.build_suggester();
        let store = Arc::new(MemoryAgentStore::from_agents(agents));

        let mut app = Self::from_parts(store, provider, suggester)?;
        app.announce(&roster_source);
        Ok(app)
    }

    /// Assemble an app around an existing store and suggester.
    pub(crate) fn from_parts(
        store: Arc<MemoryAgentStore>,
        provider: ProviderConfig,
        suggester: Arc<dyn PersonalitySuggester>,
    ) -> Result<Self> {
        let runtime = Runtime::new().context("create tokio runtime")?;
        let (suggestion_tx, suggestion_rx) = mpsc::unbounded_channel();
        Ok(App {
            runtime,
            input: String::new(),
            cursor: 0,
            input_history: Vec::new(),
            history_index: None,
            history_stash: String::new(),
            logs: Vec::new(),
            store,
            archetypes: ARCHETYPES,
            provider,
            suggester,
            session: None,
            suggestion_tx,
            suggestion_rx,
            scroll_offset: 0,
            should_quit: false,
        })
    }

    fn announce(&mut self, roster_source: &RosterSource) {
        self.log(
            LogLevel::Info,
            format!(
                "Loaded {} agent(s) from {}.",
                self.store.len(),
                roster_source.label(),
            ),
        );
        match self.provider.api_key.clone() {
            Some(key) => self.log(
                LogLevel::Info,
                format!(
                    "Suggestions via {} ({}).",
                    self.suggester.label(),
                    mask_key(&key)
                ),
            ),
            None => log_src!(
                self,
                LogLevel::Warn,
                format!(
                    "No {} API key found; /suggest will fail until one is set.",
                    self.provider.provider
                )
            ),
        }
        self.log(
            LogLevel::Info,
            "Type /help for commands. /edit opens the current agent.".to_string(),
        );
    }

    /// Whether the user has requested to quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Apply any suggestion outcomes that arrived since the last frame.
    pub fn tick(&mut self) {
        while let Ok(event) = self.suggestion_rx.try_recv() {
            self.handle_suggestion_event(event);
        }
    }

    fn handle_suggestion_event(&mut self, event: SuggestionEvent) {
        let name = if event.agent_name.is_empty() {
            event.agent_id.to_string()
        } else {
            event.agent_name
        };
        match event.outcome {
            SuggestionOutcome::Applied { .. } => self.log(
                LogLevel::Success,
                format!("✨ New personality suggested for {name}."),
            ),
            SuggestionOutcome::Failed(message) => log_src!(self, LogLevel::Error, message),
            SuggestionOutcome::Discarded => self.log(
                LogLevel::Info,
                format!("Suggestion for {name} arrived after its editor closed; discarded."),
            ),
            SuggestionOutcome::Declined(_) => {}
        }
    }

    /// The session's agent, or the store's current agent when no editor is open.
    pub(crate) fn displayed_agent(&self) -> Option<Agent> {
        match &self.session {
            Some(session) => session.snapshot(),
            None => self.store.current(),
        }
    }
}

// ── Event handling ───────────────────────────────────────────────────

impl App {
    /// Route a terminal event to the appropriate handler.
    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Release {
                self.handle_key(key)?;
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match key {
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.should_quit = true,

            KeyEvent {
                code: KeyCode::Char('l'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.logs.clear(),

            KeyEvent { code, .. } => match code {
                KeyCode::Char(ch) => {
                    self.scroll_offset = 0;
                    self.insert_char(ch);
                }
                KeyCode::Backspace => self.backspace(),
                KeyCode::Delete => self.delete(),
                KeyCode::Left => self.move_cursor_left(),
                KeyCode::Right => self.move_cursor_right(),
                KeyCode::Home => self.move_cursor_home(),
                KeyCode::End => self.move_cursor_end(),
                KeyCode::Up => self.history_prev(),
                KeyCode::Down => self.history_next(),
                KeyCode::PageUp => self.scroll_up(10),
                KeyCode::PageDown => self.scroll_down(10),
                KeyCode::Enter => {
                    self.scroll_offset = 0;
                    self.submit_input()?;
                }
                KeyCode::Esc => {
                    if self.session.is_some() {
                        self.close_session();
                    } else {
                        self.should_quit = true;
                    }
                }
                _ => {}
            },
        }
        Ok(())
    }

    /// Submit the current input line for processing.
    fn submit_input(&mut self) -> Result<()> {
        let line = self.input.trim().to_string();
        self.input.clear();
        self.cursor = 0;

        if line.is_empty() {
            return Ok(());
        }
        self.push_history(&line);

        if line.starts_with('/') {
            self.handle_command(&line)?;
        } else {
            self.log(
                LogLevel::Info,
                "Commands start with '/'. Try /help.".to_string(),
            );
        }
        Ok(())
    }
}

// ── Scrolling ────────────────────────────────────────────────────────

impl App {
    /// Scroll the activity log up by `n` lines.
    pub(crate) fn scroll_up(&mut self, n: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(n);
    }

    /// Scroll the activity log down by `n` lines (towards the latest).
    pub(crate) fn scroll_down(&mut self, n: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
    }
}

// ── Activity log ─────────────────────────────────────────────────────

impl App {
    /// Append a message to the activity log and mirror it to `tracing`.
    pub(crate) fn log(&mut self, level: LogLevel, message: String) {
        match level {
            LogLevel::Warn => tracing::warn!(target: "agent_studio::activity", "{message}"),
            LogLevel::Error => tracing::error!(target: "agent_studio::activity", "{message}"),
            _ => tracing::info!(target: "agent_studio::activity", "{message}"),
        }
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        self.logs.push(LogLine {
            timestamp,
            level,
            message,
        });
        if self.logs.len() > MAX_LOGS {
            let overflow = self.logs.len() - MAX_LOGS;
            self.logs.drain(0..overflow);
        }
    }

    /// Append a message with a source location suffix (debug-logs builds only).
    #[cfg(feature = "debug-logs")]
    pub(crate) fn log_with_src(&mut self, level: LogLevel, message: String, src: &str) {
        let tagged = match level {
            LogLevel::Warn | LogLevel::Error => format!("{message}  [{src}]"),
            _ => message,
        };
        self.log(level, tagged);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::agent::{BodyColor, Voice};
    use crate::config::Provider;
    use crate::suggest::SuggestError;

    /// Suggester that echoes the name, or fails when the name is "Fail".
    pub(crate) struct EchoSuggester {
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl PersonalitySuggester for EchoSuggester {
        async fn suggest(&self, character_name: &str) -> Result<String, SuggestError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if character_name == "Fail" {
                return Err(SuggestError::EmptyResponse);
            }
            Ok(format!("I'm {character_name}, blunt and dry."))
        }

        fn label(&self) -> String {
            "echo".to_string()
        }
    }

    pub(crate) fn test_app() -> App {
        let store = Arc::new(MemoryAgentStore::from_agents(vec![
            Agent::new("Zeke", "old text", BodyColor::Blue, Voice::Puck),
            Agent::new("Ada", "", BodyColor::Red, Voice::Kore),
        ]));
        let provider = ProviderConfig {
            provider: Provider::OpenAi,
            model: "test".to_string(),
            base_url: "http://localhost".to_string(),
            api_key: None,
        };
        let suggester = Arc::new(EchoSuggester {
            calls: AtomicUsize::new(0),
        });
        App::from_parts(store, provider, suggester).unwrap()
    }

    /// Block until the next suggestion outcome arrives and apply it.
    pub(crate) fn await_suggestion(app: &mut App) {
        let event = app
            .runtime
            .block_on(app.suggestion_rx.recv())
            .expect("suggestion event");
        app.handle_suggestion_event(event);
    }

    pub(crate) fn last_log(app: &App) -> &LogLine {
        app.logs.last().expect("log line")
    }

    #[test]
    fn plain_text_hints_at_commands() {
        let mut app = test_app();
        app.input = "hello".to_string();
        app.submit_input().unwrap();
        assert!(last_log(&app).message.contains("/help"));
        assert!(app.input.is_empty());
    }

    #[test]
    fn esc_closes_editor_before_quitting() {
        let mut app = test_app();
        app.handle_command("/edit").unwrap();
        let esc = Event::Key(KeyEvent::from(KeyCode::Esc));

        app.handle_event(esc.clone()).unwrap();
        assert!(app.session.is_none());
        assert!(!app.should_quit());

        app.handle_event(esc).unwrap();
        assert!(app.should_quit());
    }

    #[test]
    fn log_is_bounded() {
        let mut app = test_app();
        for i in 0..MAX_LOGS + 5 {
            app.log(LogLevel::Info, format!("line {i}"));
        }
        assert_eq!(app.logs.len(), MAX_LOGS);
        assert_eq!(app.logs[0].message, "line 5");
    }

    #[test]
    fn failed_suggestion_is_logged_as_error() {
        let mut app = test_app();
        app.handle_command("/edit").unwrap();
        app.handle_command("/name Fail").unwrap();
        app.handle_command("/suggest").unwrap();
        await_suggestion(&mut app);

        let line = last_log(&app);
        assert_eq!(line.level, LogLevel::Error);
        assert!(line.message.contains("Could not suggest"));
        assert_eq!(app.displayed_agent().unwrap().personality, "old text");
    }
}
