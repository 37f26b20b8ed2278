//! In-memory node-status store.

use async_trait::async_trait;
use dsc_core::{canonical, DscError, DscResult, NodeStatus, RegisterDscAgentRequest};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Keeps registrations in a read/write-locked map.
#[derive(Debug, Default)]
pub struct MemoryNodeStatus {
    agents: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryNodeStatus {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered agents.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.read().len()
    }
}

#[async_trait]
impl NodeStatus for MemoryNodeStatus {
    async fn register_agent(&self, request: &RegisterDscAgentRequest) -> DscResult<()> {
        self.agents.write().insert(
            canonical(&request.agent_id),
            request.body.configuration_names.clone(),
        );
        Ok(())
    }

    async fn registered_names(&self, agent_id: &str) -> DscResult<Vec<String>> {
        self.agents
            .read()
            .get(&canonical(agent_id))
            .cloned()
            .ok_or_else(|| DscError::agent_not_registered(agent_id))
    }
}
