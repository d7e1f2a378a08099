//! Roster commands — list, switch, create and remove agents.
//!
//! Creating and deleting agents is outside the edit session; these handlers
//! close the open editor whenever the agent it addresses stops being current.

use crate::agent::{Agent, AgentId};

use super::super::log_src;
use super::super::logging::LogLevel;
use super::super::App;

impl App {
    pub(crate) fn list_agents(&mut self) {
        let current = self.store.current_id();
        let agents = self.store.list();
        self.log(LogLevel::Info, format!("Agents ({}):", agents.len()));
        for agent in agents {
            let marker = if agent.id == current { "▶" } else { " " };
            let name = if agent.name.is_empty() {
                "(unnamed)"
            } else {
                agent.name.as_str()
            };
            self.log(
                LogLevel::Info,
                format!("  {marker} {name}  {}  {}", agent.body_color, agent.voice),
            );
        }
    }

    pub(crate) fn use_agent(&mut self, name: &str) {
        let Some(agent) = self.require_agent(name) else {
            return;
        };
        if agent.id == self.store.current_id() {
            self.log(LogLevel::Info, format!("{} is already current.", agent.name));
            return;
        }
        self.close_session_if_editing_other(agent.id);
        if let Err(err) = self.store.set_current(agent.id) {
            log_src!(self, LogLevel::Error, format!("Switch failed: {err}"));
            return;
        }
        self.log(LogLevel::Info, format!("\u{1F916} Agent: {}", agent.name));
    }

    /// Create an agent, make it current, and open the editor on it.
    pub(crate) fn new_agent(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() && self.store.find_by_name(name).is_some() {
            log_src!(
                self,
                LogLevel::Warn,
                format!("An agent named {name} already exists.")
            );
            return;
        }
        let agent = Agent::named(name);
        let id = agent.id;
        self.close_session_if_editing_other(id);
        self.store.add(agent, true);
        self.log(LogLevel::Success, "Created a new agent.".to_string());
        self.open_session();
    }

    pub(crate) fn remove_agent(&mut self, name: &str) {
        let Some(agent) = self.require_agent(name) else {
            return;
        };
        if self
            .session
            .as_ref()
            .is_some_and(|session| session.agent_id() == agent.id)
        {
            self.close_session();
        }
        match self.store.remove(agent.id) {
            Ok(removed) => self.log(LogLevel::Info, format!("Removed {}.", removed.name)),
            Err(err) => log_src!(self, LogLevel::Warn, format!("Cannot remove: {err}")),
        }
    }

    fn require_agent(&mut self, name: &str) -> Option<Agent> {
        let found = self.store.find_by_name(name);
        if found.is_none() {
            log_src!(
                self,
                LogLevel::Warn,
                format!("No agent named {:?}. See /agents.", name.trim())
            );
        }
        found
    }

    fn close_session_if_editing_other(&mut self, next: AgentId) {
        if self
            .session
            .as_ref()
            .is_some_and(|session| session.agent_id() != next)
        {
            self.close_session();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::app::logging::LogLevel;
    use crate::app::tests::{last_log, test_app};
    use crate::store::AgentStore;

    #[test]
    fn use_switches_current_and_closes_editor() {
        let mut app = test_app();
        app.handle_command("/edit").unwrap();
        app.handle_command("/use ada").unwrap();

        assert!(app.session.is_none());
        assert_eq!(app.store.current().unwrap().name, "Ada");
    }

    #[test]
    fn new_agent_opens_editor_on_it() {
        let mut app = test_app();
        app.handle_command("/new Bo").unwrap();

        let current = app.store.current().unwrap();
        assert_eq!(current.name, "Bo");
        assert_eq!(app.session.as_ref().unwrap().agent_id(), current.id);

        app.handle_command("/new bo").unwrap();
        assert_eq!(last_log(&app).level, LogLevel::Warn);
        assert_eq!(app.store.len(), 3);
    }

    #[test]
    fn removing_edited_agent_closes_editor() {
        let mut app = test_app();
        app.handle_command("/edit").unwrap();
        app.handle_command("/remove Zeke").unwrap();

        assert!(app.session.is_none());
        assert_eq!(app.store.current().unwrap().name, "Ada");

        app.handle_command("/remove Ada").unwrap();
        assert_eq!(last_log(&app).level, LogLevel::Warn);
        assert_eq!(app.store.len(), 1);
    }

    #[test]
    fn unknown_agent_warns() {
        let mut app = test_app();
        app.handle_command("/use Nobody").unwrap();
        assert_eq!(last_log(&app).level, LogLevel::Warn);
    }

    #[test]
    fn list_marks_current() {
        let mut app = test_app();
        app.handle_command("/agents").unwrap();
        assert!(app.logs.iter().any(|l| l.message.contains("▶ Zeke")));
    }
}
