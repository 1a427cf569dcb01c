//! Season to regulation lookup table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Derived mapping of season number to regulation letter.
///
/// Backed by a `BTreeMap`, so serialization always emits keys in ascending
/// numeric order: `{"1":"A","36":"J"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct SeasonRegulationTable(BTreeMap<u32, char>);

impl SeasonRegulationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the regulation for a season, replacing any previous value.
    pub fn insert(&mut self, season: u32, regulation: char) -> Option<char> {
        self.0.insert(season, regulation)
    }

    pub fn get(&self, season: u32) -> Option<char> {
        self.0.get(&season).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate pairs in ascending season order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, char)> + '_ {
        self.0.iter().map(|(season, regulation)| (*season, *regulation))
    }

    /// Compact JSON bytes, as published.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse a published table back.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl FromIterator<(u32, char)> for SeasonRegulationTable {
    fn from_iter<I: IntoIterator<Item = (u32, char)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_sorted_numerically() {
        let table: SeasonRegulationTable = [(36, 'J'), (1, 'A'), (10, 'E')].into_iter().collect();

        let json = String::from_utf8(table.to_json_bytes().unwrap()).unwrap();
        assert_eq!(json, r#"{"1":"A","10":"E","36":"J"}"#);
    }

    #[test]
    fn test_round_trip() {
        let table: SeasonRegulationTable = [(9, 'D'), (40, 'J')].into_iter().collect();

        let parsed = SeasonRegulationTable::from_json_bytes(&table.to_json_bytes().unwrap()).unwrap();
        assert_eq!(parsed, table);
        assert_eq!(parsed.get(40), Some('J'));
        assert_eq!(parsed.get(41), None);
    }

    #[test]
    fn test_insert_overwrites() {
        let mut table = SeasonRegulationTable::new();
        assert_eq!(table.insert(3, 'B'), None);
        assert_eq!(table.insert(3, 'C'), Some('B'));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(3), Some('C'));
    }
}
