//! Node-status stores.
//!
//! A store only keeps each agent's registered configuration names; the
//! `GetDscAction` decision comes from the default
//! [`NodeStatus::get_dsc_action`](dsc_core::NodeStatus::get_dsc_action).

mod local;
mod memory;

pub use local::LocalNodeStatus;
pub use memory::MemoryNodeStatus;
