//! Identifier sub-grammars.
//!
//! These are unanchored regular expressions; [`crate::urls`] embeds them in
//! capture groups and [`crate::Pattern`] anchors the result.

/// Configuration names: letters and digits.
pub const CONFIGURATION_NAME: &str = "[a-zA-Z0-9]+";

/// Legacy configuration ids (UUID).
pub const CONFIGURATION_ID: &str =
    "[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}";

/// Module names: letters, digits and underscores.
pub const MODULE_NAME: &str = "[a-zA-Z0-9_]+";

/// Module versions: empty, or two to four dot-separated digit groups.
pub const MODULE_VERSION: &str = r"([0-9]+(\.[0-9]+){1,3}|)";

/// Report job ids (UUID).
pub const JOB_ID: &str =
    "[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}";

/// Agent ids (UUID).
pub const AGENT_ID: &str =
    "[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}";
