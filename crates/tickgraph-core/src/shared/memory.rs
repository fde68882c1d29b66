//! Named memory banks for loosely-coupled communication between nodes.
//!
//! Two independent tables: numeric entries of four floats and string entries.
//! An entry exists once it has been written; reading an absent name yields a
//! zeroed / empty value rather than an error.

use std::collections::HashMap;

/// A numeric memory bank entry.
pub type Memf = [f32; 4];

/// The numeric and string banks of one graph.
#[derive(Debug, Default, Clone)]
pub struct MemoryBanks {
    numeric: HashMap<String, Memf>,
    strings: HashMap<String, String>,
}

impl MemoryBanks {
    /// Creates empty banks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a numeric entry.
    pub fn set_numeric(&mut self, name: &str, value: Memf) {
        match self.numeric.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.numeric.insert(name.to_string(), value);
            }
        }
    }

    /// Reads a numeric entry, or zeros if it was never written.
    pub fn get_numeric(&self, name: &str) -> Memf {
        self.numeric.get(name).copied().unwrap_or_default()
    }

    /// Writes a string entry.
    pub fn set_string(&mut self, name: &str, value: &str) {
        match self.strings.get_mut(name) {
            Some(slot) => {
                slot.clear();
                slot.push_str(value);
            }
            None => {
                self.strings.insert(name.to_string(), value.to_string());
            }
        }
    }

    /// Reads a string entry, or an empty string if it was never written.
    pub fn get_string(&self, name: &str) -> String {
        self.strings.get(name).cloned().unwrap_or_default()
    }

    /// Returns true if a numeric entry named `name` has been written.
    pub fn has_numeric(&self, name: &str) -> bool {
        self.numeric.contains_key(name)
    }

    /// Returns true if a string entry named `name` has been written.
    pub fn has_string(&self, name: &str) -> bool {
        self.strings.contains_key(name)
    }

    /// Numeric entries sorted by name.
    pub fn numeric_entries(&self) -> Vec<(String, Memf)> {
        let mut entries: Vec<_> = self
            .numeric
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// String entries sorted by name.
    pub fn string_entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self
            .strings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_keys_read_as_default() {
        let banks = MemoryBanks::new();
        assert_eq!(banks.get_numeric("nothing"), [0.0; 4]);
        assert_eq!(banks.get_string("nothing"), "");
        assert!(!banks.has_numeric("nothing"));
    }

    #[test]
    fn overwrite_replaces_value() {
        let mut banks = MemoryBanks::new();
        banks.set_numeric("pos", [1.0, 2.0, 3.0, 0.0]);
        banks.set_numeric("pos", [4.0, 5.0, 6.0, 7.0]);
        assert_eq!(banks.get_numeric("pos"), [4.0, 5.0, 6.0, 7.0]);

        banks.set_string("label", "first");
        banks.set_string("label", "second");
        assert_eq!(banks.get_string("label"), "second");
    }

    #[test]
    fn banks_are_independent() {
        let mut banks = MemoryBanks::new();
        banks.set_numeric("shared", [1.0; 4]);
        assert!(!banks.has_string("shared"));
        assert_eq!(banks.get_string("shared"), "");
    }

    #[test]
    fn entries_are_sorted() {
        let mut banks = MemoryBanks::new();
        banks.set_numeric("b", [2.0; 4]);
        banks.set_numeric("a", [1.0; 4]);
        let names: Vec<String> = banks.numeric_entries().into_iter().map(|e| e.0).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
