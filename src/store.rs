//! Agent roster — the process-wide collection of agents and the current one.
//!
//! The edit session only depends on the [`AgentStore`] trait; the in-memory
//! [`MemoryAgentStore`] also exposes the roster management the command layer
//! needs (create, switch, remove).

use parking_lot::RwLock;
use tracing::debug;

use crate::agent::{Agent, AgentId, AgentPatch};

/// Identity-addressed read/patch access to agents.
pub trait AgentStore: Send + Sync {
    /// The agent currently selected for editing.
    fn current(&self) -> Option<Agent>;

    fn get(&self, id: AgentId) -> Option<Agent>;

    /// Merge `patch` into the agent with `id`.  Unknown ids are ignored.
    fn patch(&self, id: AgentId, patch: AgentPatch);
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("no agent with id {0}")]
    UnknownAgent(AgentId),
    #[error("cannot remove the last agent")]
    LastAgent,
}

struct Roster {
    agents: Vec<Agent>,
    current: AgentId,
}

/// In-memory roster guarded by a read/write lock.
pub struct MemoryAgentStore {
    roster: RwLock<Roster>,
}

impl MemoryAgentStore {
    /// Build a roster whose first agent is current.  An empty list is seeded
    /// with a single blank agent so a current agent always exists.
    pub fn from_agents(mut agents: Vec<Agent>) -> Self {
        if agents.is_empty() {
            agents.push(Agent::named(""));
        }
        let current = agents[0].id;
        MemoryAgentStore {
            roster: RwLock::new(Roster { agents, current }),
        }
    }

    pub fn current_id(&self) -> AgentId {
        self.roster.read().current
    }

    /// All agents in insertion order.
    pub fn list(&self) -> Vec<Agent> {
        self.roster.read().agents.clone()
    }

    pub fn len(&self) -> usize {
        self.roster.read().agents.len()
    }

    /// Case-insensitive lookup by trimmed name.
    pub fn find_by_name(&self, name: &str) -> Option<Agent> {
        let name = name.trim();
        self.roster
            .read()
            .agents
            .iter()
            .find(|agent| agent.name.trim().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Append an agent, optionally selecting it.
    pub fn add(&self, agent: Agent, make_current: bool) -> AgentId {
        let id = agent.id;
        let mut roster = self.roster.write();
        roster.agents.push(agent);
        if make_current {
            roster.current = id;
        }
        debug!(%id, make_current, "agent added");
        id
    }

    pub fn set_current(&self, id: AgentId) -> Result<(), StoreError> {
        let mut roster = self.roster.write();
        if !roster.agents.iter().any(|agent| agent.id == id) {
            return Err(StoreError::UnknownAgent(id));
        }
        roster.current = id;
        Ok(())
    }

    /// Remove an agent.  Removing the current agent selects the first
    /// remaining one.
    pub fn remove(&self, id: AgentId) -> Result<Agent, StoreError> {
        let mut roster = self.roster.write();
        let index = roster
            .agents
            .iter()
            .position(|agent| agent.id == id)
            .ok_or(StoreError::UnknownAgent(id))?;
        if roster.agents.len() == 1 {
            return Err(StoreError::LastAgent);
        }
        let removed = roster.agents.remove(index);
        if roster.current == id {
            roster.current = roster.agents[0].id;
        }
        debug!(%id, "agent removed");
        Ok(removed)
    }
}

impl AgentStore for MemoryAgentStore {
    fn current(&self) -> Option<Agent> {
        let roster = self.roster.read();
        roster
            .agents
            .iter()
            .find(|agent| agent.id == roster.current)
            .cloned()
    }

    fn get(&self, id: AgentId) -> Option<Agent> {
        self.roster
            .read()
            .agents
            .iter()
            .find(|agent| agent.id == id)
            .cloned()
    }

    fn patch(&self, id: AgentId, patch: AgentPatch) {
        if patch.is_empty() {
            return;
        }
        let mut roster = self.roster.write();
        match roster.agents.iter_mut().find(|agent| agent.id == id) {
            Some(agent) => agent.apply(&patch),
            None => debug!(%id, "patch for missing agent ignored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentField, BodyColor, Voice};

    fn roster() -> (MemoryAgentStore, AgentId, AgentId) {
        let a = Agent::new("Ada", "calm", BodyColor::Blue, Voice::Kore);
        let b = Agent::new("Bo", "loud", BodyColor::Red, Voice::Puck);
        let (ida, idb) = (a.id, b.id);
        (MemoryAgentStore::from_agents(vec![a, b]), ida, idb)
    }

    #[test]
    fn empty_roster_is_seeded_with_a_current_agent() {
        let store = MemoryAgentStore::from_agents(Vec::new());
        let current = store.current().expect("current agent");
        assert_eq!(current.name, "");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn first_agent_is_current() {
        let (store, ida, _) = roster();
        assert_eq!(store.current_id(), ida);
        assert_eq!(store.current().map(|a| a.name), Some("Ada".to_string()));
    }

    #[test]
    fn patch_merges_by_identity() {
        let (store, ida, idb) = roster();
        store.patch(idb, AgentField::Name("Bob".into()).into());

        assert_eq!(store.get(idb).unwrap().name, "Bob");
        assert_eq!(store.get(idb).unwrap().personality, "loud");
        assert_eq!(store.get(ida).unwrap().name, "Ada");
    }

    #[test]
    fn patch_for_unknown_id_is_a_noop() {
        let (store, _, _) = roster();
        let before = store.list();
        store.patch(AgentId::new(), AgentPatch::personality("ghost"));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn set_current_rejects_unknown_ids() {
        let (store, ida, idb) = roster();
        store.set_current(idb).unwrap();
        assert_eq!(store.current_id(), idb);

        let stranger = AgentId::new();
        assert_eq!(store.set_current(stranger), Err(StoreError::UnknownAgent(stranger)));
        assert_ne!(store.current_id(), ida);
    }

    #[test]
    fn removing_current_promotes_first_remaining() {
        let (store, ida, idb) = roster();
        store.set_current(idb).unwrap();
        store.remove(idb).unwrap();
        assert_eq!(store.current_id(), ida);
        assert_eq!(store.remove(ida), Err(StoreError::LastAgent));
    }

    #[test]
    fn add_and_find_by_name() {
        let (store, ida, _) = roster();
        let id = store.add(Agent::named("Zeke"), false);
        assert_eq!(store.current_id(), ida);
        assert_eq!(store.find_by_name("  zeke ").map(|a| a.id), Some(id));
        assert!(store.find_by_name("nobody").is_none());
    }
}
