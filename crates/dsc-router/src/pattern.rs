//! Method-aware, anchored path patterns.

use crate::error::PatternError;
use crate::params::Params;
use http::Method;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::borrow::Cow;

/// A compiled URL grammar plus the HTTP methods it accepts.
///
/// The grammar is anchored as `^/` + grammar + `$`, so a pattern only ever
/// matches a whole path. Paths are percent-decoded before matching.
///
/// # Example
///
/// ```rust
/// use dsc_router::Pattern;
/// use http::Method;
///
/// let pattern = Pattern::post(r"Nodes\(AgentId='(?P<agent_id>[0-9a-f-]+)'\)\/SendReport").unwrap();
///
/// let params = pattern.matches(&Method::POST, "/Nodes(AgentId='0a1b-2c')/SendReport").unwrap();
/// assert_eq!(params.get("agent_id"), Some("0a1b-2c"));
///
/// // Wrong verb is a miss, not an error.
/// assert!(pattern.matches(&Method::GET, "/Nodes(AgentId='0a1b-2c')/SendReport").is_none());
/// // No prefix matches.
/// assert!(pattern.matches(&Method::POST, "/api/Nodes(AgentId='0a1b-2c')/SendReport").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    methods: Option<Vec<Method>>,
}

impl Pattern {
    /// Compiles a grammar that accepts any method.
    pub fn new(grammar: &str) -> Result<Self, PatternError> {
        let anchored = format!(r"^\/{grammar}$");
        let regex = Regex::new(&anchored).map_err(|source| PatternError {
            pattern: anchored.clone(),
            source,
        })?;
        Ok(Self {
            regex,
            methods: None,
        })
    }

    /// Compiles a grammar restricted to `methods`.
    pub fn with_methods(grammar: &str, methods: &[Method]) -> Result<Self, PatternError> {
        let mut pattern = Self::new(grammar)?;
        pattern.methods = Some(methods.to_vec());
        Ok(pattern)
    }

    /// Compiles a GET-only grammar.
    pub fn get(grammar: &str) -> Result<Self, PatternError> {
        Self::with_methods(grammar, &[Method::GET])
    }

    /// Compiles a POST-only grammar.
    pub fn post(grammar: &str) -> Result<Self, PatternError> {
        Self::with_methods(grammar, &[Method::POST])
    }

    /// Compiles a PUT-only grammar.
    pub fn put(grammar: &str) -> Result<Self, PatternError> {
        Self::with_methods(grammar, &[Method::PUT])
    }

    /// Methods this pattern is restricted to, or `None` for any.
    #[must_use]
    pub fn methods(&self) -> Option<&[Method]> {
        self.methods.as_deref()
    }

    /// Returns true if `method` is accepted.
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        self.methods
            .as_ref()
            .map_or(true, |methods| methods.contains(method))
    }

    /// The anchored expression.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Matches a request, returning the named captures.
    ///
    /// Every named group appears in the result; a group that did not
    /// participate in the match yields an empty value.
    #[must_use]
    pub fn matches(&self, method: &Method, path: &str) -> Option<Params> {
        if !self.allows(method) {
            return None;
        }

        let decoded = decode_path(path)?;
        let captures = self.regex.captures(&decoded)?;

        Some(
            self.regex
                .capture_names()
                .flatten()
                .map(|name| {
                    let value = captures.name(name).map_or("", |m| m.as_str());
                    (name.to_string(), value.to_string())
                })
                .collect(),
        )
    }
}

fn decode_path(path: &str) -> Option<Cow<'_, str>> {
    percent_decode_str(path).decode_utf8().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_any_method() {
        let pattern = Pattern::new("health").unwrap();
        assert!(pattern.methods().is_none());
        assert!(pattern.matches(&Method::GET, "/health").is_some());
        assert!(pattern.matches(&Method::DELETE, "/health").is_some());
        assert_eq!(pattern.as_str(), r"^\/health$");
    }

    #[test]
    fn test_pattern_method_restriction() {
        let pattern = Pattern::with_methods("items", &[Method::GET, Method::PUT]).unwrap();
        assert!(pattern.allows(&Method::PUT));
        assert!(!pattern.allows(&Method::POST));
        assert!(pattern.matches(&Method::POST, "/items").is_none());
    }

    #[test]
    fn test_pattern_is_anchored() {
        let pattern = Pattern::get("items").unwrap();
        assert!(pattern.matches(&Method::GET, "/items/1").is_none());
        assert!(pattern.matches(&Method::GET, "/v2/items").is_none());
        assert!(pattern.matches(&Method::GET, "items").is_none());
    }

    #[test]
    fn test_pattern_decodes_path() {
        let pattern = Pattern::get(r"Nodes\(AgentId='(?P<agent_id>[a-f0-9]+)'\)").unwrap();
        let params = pattern
            .matches(&Method::GET, "/Nodes%28AgentId=%27abc123%27%29")
            .unwrap();
        assert_eq!(params.get("agent_id"), Some("abc123"));
    }

    #[test]
    fn test_pattern_no_captures() {
        let params = Pattern::get("ping")
            .unwrap()
            .matches(&Method::GET, "/ping")
            .unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_invalid_grammar() {
        let err = Pattern::new("(unclosed").unwrap_err();
        assert!(err.pattern.contains("(unclosed"));
        assert!(err.to_string().starts_with("invalid route pattern"));
    }
}
