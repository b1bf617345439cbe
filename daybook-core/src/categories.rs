//! User-defined categories.

use serde::{Deserialize, Serialize};

/// Ordered list of distinct, lowercase category names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Categories(Vec<String>);

impl Categories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted values, re-normalizing them.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut categories = Categories::new();
        for name in names {
            categories.add(name.as_ref());
        }
        categories
    }

    /// Add a category. Returns false for blanks and duplicates.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        if name.is_empty() || self.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.0.iter().any(|c| *c == name)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_lowercases_and_dedupes() {
        let mut categories = Categories::new();
        assert!(categories.add("Work"));
        assert!(!categories.add(" work "));
        assert!(!categories.add("   "));
        assert!(categories.add("Home"));

        assert_eq!(categories.as_slice(), &["work", "home"]);
    }

    #[test]
    fn from_names_normalizes_persisted_values() {
        let categories = Categories::from_names(["School", "school", "Gym"]);
        assert_eq!(categories.as_slice(), &["school", "gym"]);
    }

    #[test]
    fn serializes_as_plain_array() {
        let categories = Categories::from_names(["a", "b"]);
        assert_eq!(serde_json::to_string(&categories).unwrap(), r#"["a","b"]"#);
    }
}
