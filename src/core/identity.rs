//! # Identity
//!
//! Id, caption and description for everything addressable in the graph.
//!
//! The id refers to a unique real world object. The caption is the screen
//! name and may change at will; the description is an extended caption.
//! Neither should be relied on to identify anything.

use std::fmt;

use uuid::Uuid;

/// Identity of an exchange item, argument, component or factory entry.
///
/// Equality considers the id only; captions and descriptions are display
/// text and excluded on purpose.
#[derive(Debug, Clone)]
pub struct Identity {
    id: String,
    caption: String,
    description: String,
}

impl Identity {
    /// Creates an identity with the given id.
    pub fn new(id: &str, caption: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            caption: caption.to_string(),
            description: description.to_string(),
        }
    }

    /// Creates an identity with a random v4 UUID as id.
    pub fn random(caption: &str, description: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            caption: caption.to_string(),
            description: description.to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    pub fn set_caption(&mut self, caption: &str) {
        self.caption = caption.to_string();
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Identity {}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{{}}}", self.caption, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_are_unique() {
        let a = Identity::random("a", "");
        let b = Identity::random("b", "");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_equality_by_id_only() {
        let a = Identity::new("x", "first caption", "first");
        let b = Identity::new("x", "second caption", "second");
        assert_eq!(a, b);

        let c = Identity::new("y", "first caption", "first");
        assert_ne!(a, c);
    }
}
