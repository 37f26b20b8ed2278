//! Ordered regex router for the DSC pull protocol.
//!
//! Protocol URLs embed their parameters inside OData-style key segments
//! (`Nodes(AgentId='…')/Configurations(ConfigurationName='…')/…`), which a
//! segment-based router cannot express. This crate matches whole paths
//! against anchored regular expressions instead.
//!
//! # Features
//!
//! - **Identifier grammars**: [`grammar`] holds the exact sub-grammars for agent
//!   ids, configuration names and module specs
//! - **URL grammars**: [`urls`] composes them into every protocol path
//! - **Method-aware patterns**: a [`Pattern`] only matches the verbs it allows
//! - **First match wins**: [`Router`] tries routes in insertion order
//!
//! # Example
//!
//! ```rust
//! use dsc_router::{urls, Pattern, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.add(Pattern::get(&urls::get_reports_v2()).unwrap(), "getReports");
//!
//! let path = "/Nodes(AgentId='B1F28971-2CEB-46D5-9DCB-79C044395F81')/Reports(JobId='0B8F3C7E-1A2B-4C5D-8E9F-A1B2C3D4E5F6')";
//! let found = router.route(&Method::GET, path).unwrap();
//! assert_eq!(*found.handler(), "getReports");
//! assert_eq!(found.param("agent_id"), Some("B1F28971-2CEB-46D5-9DCB-79C044395F81"));
//!
//! assert!(router.route(&Method::POST, path).is_none());
//! ```

#![doc(html_root_url = "https://docs.rs/dsc-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod grammar;
mod params;
mod pattern;
mod router;
pub mod urls;

pub use error::PatternError;
pub use params::Params;
pub use pattern::Pattern;
pub use router::{RouteMatch, Router};
