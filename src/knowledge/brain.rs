//! Brains: the entities knowledge items are linked to

use serde::{Deserialize, Serialize};

/// A brain as supplied by the brain directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brain {
    /// Identifier
    pub id: String,

    /// Routable id, when it differs from `id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brain_id: Option<String>,

    /// Display name
    pub name: String,

    /// Snippet background color (CSS hex)
    #[serde(default = "default_snippet_color")]
    pub snippet_color: String,

    /// Snippet glyph
    #[serde(default = "default_snippet_emoji")]
    pub snippet_emoji: String,
}

fn default_snippet_color() -> String {
    "#d0c6f2".to_string()
}

fn default_snippet_emoji() -> String {
    "🧠".to_string()
}

impl Brain {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            brain_id: None,
            name: name.into(),
            snippet_color: default_snippet_color(),
            snippet_emoji: default_snippet_emoji(),
        }
    }

    /// Set a distinct routable id
    pub fn with_brain_id(mut self, brain_id: impl Into<String>) -> Self {
        self.brain_id = Some(brain_id.into());
        self
    }

    pub fn with_snippet(mut self, color: impl Into<String>, emoji: impl Into<String>) -> Self {
        self.snippet_color = color.into();
        self.snippet_emoji = emoji.into();
        self
    }

    /// Id used for navigation: `brain_id` when present, otherwise `id`
    pub fn route_id(&self) -> &str {
        self.brain_id.as_deref().unwrap_or(&self.id)
    }

    /// Whether `id` names this brain under either of its identifiers
    pub fn matches(&self, id: &str) -> bool {
        self.id == id || self.brain_id.as_deref() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_id_prefers_brain_id() {
        let brain = Brain::new("a", "Research").with_brain_id("b");
        assert_eq!(brain.route_id(), "b");
        assert!(brain.matches("a"));
        assert!(brain.matches("b"));
    }

    #[test]
    fn test_route_id_falls_back_to_id() {
        let brain = Brain::new("a", "Research");
        assert_eq!(brain.route_id(), "a");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let brain: Brain = serde_json::from_str(r#"{"id":"x","name":"Ops"}"#).unwrap();
        assert_eq!(brain.brain_id, None);
        assert_eq!(brain.snippet_emoji, "🧠");
    }
}
