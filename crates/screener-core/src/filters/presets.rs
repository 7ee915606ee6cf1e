//! Named screener presets.
//!
//! A preset is plain data: a name, a one-line description and a
//! [`FilterSpec`]. The built-in library is compiled in from `presets.json`;
//! user libraries use the same document shape.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::spec::FilterSpec;
use crate::error::ScreenerError;
use crate::ScreenerResult;

const BUILTIN_PRESETS: &str = include_str!("presets.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub filter: FilterSpec,
}

impl Preset {
    /// Built-in preset by id or display name, case-insensitive.
    pub fn find(key: &str) -> ScreenerResult<Preset> {
        PresetLibrary::builtin()?.find(key).cloned()
    }

    fn matches(&self, key: &str) -> bool {
        let key = key.trim();
        self.id.eq_ignore_ascii_case(key) || self.name.eq_ignore_ascii_case(key)
    }
}

/// An ordered collection of presets with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PresetLibrary {
    presets: Vec<Preset>,
}

impl PresetLibrary {
    pub fn builtin() -> ScreenerResult<Self> {
        Self::from_json(BUILTIN_PRESETS)
    }

    /// Parse a JSON array of presets. Duplicate ids are rejected.
    pub fn from_json(json: &str) -> ScreenerResult<Self> {
        let presets: Vec<Preset> = serde_json::from_str(json)?;
        Self::new(presets)
    }

    pub fn new(presets: Vec<Preset>) -> ScreenerResult<Self> {
        let mut seen = HashSet::new();
        for preset in &presets {
            if preset.id.trim().is_empty() {
                return Err(ScreenerError::InvalidInput {
                    field: "id".into(),
                    reason: format!("preset '{}' has an empty id", preset.name),
                });
            }
            if !seen.insert(preset.id.to_ascii_lowercase()) {
                return Err(ScreenerError::InvalidInput {
                    field: "id".into(),
                    reason: format!("duplicate preset id '{}'", preset.id),
                });
            }
        }
        Ok(Self { presets })
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn get(&self, key: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.matches(key))
    }

    /// Like [`get`](Self::get) but an unknown key is an error naming the
    /// available ids.
    pub fn find(&self, key: &str) -> ScreenerResult<&Preset> {
        self.get(key).ok_or_else(|| {
            let ids: Vec<&str> = self.presets.iter().map(|p| p.id.as_str()).collect();
            ScreenerError::InvalidInput {
                field: "preset".into(),
                reason: format!("unknown preset '{}'; available: {}", key, ids.join(", ")),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::spec::Bound;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builtin_library_parses() {
        let lib = PresetLibrary::builtin().unwrap();
        assert_eq!(lib.len(), 16);
        assert_eq!(lib.iter().next().unwrap().id, "custom");
        assert!(lib.get("custom").unwrap().filter.is_empty());
    }

    #[test]
    fn test_find_by_id_or_name_case_insensitive() {
        let by_id = Preset::find("GRAHAM-NET-NET").unwrap();
        let by_name = Preset::find("graham net-net").unwrap();
        assert_eq!(by_id, by_name);
        assert_eq!(by_id.filter.ranges["PB Ratio"], Bound::at_most(dec!(0.66)));
    }

    #[test]
    fn test_unknown_preset_is_invalid_input() {
        let err = Preset::find("nope").unwrap_err();
        assert!(matches!(err, ScreenerError::InvalidInput { .. }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"[{"id": "a", "name": "A"}, {"id": "A", "name": "B"}]"#;
        assert!(PresetLibrary::from_json(json).is_err());
    }

    #[test]
    fn test_sector_presets_use_memberships() {
        let fortress = Preset::find("defensive-fortress").unwrap();
        let sectors = &fortress.filter.memberships["Sector"];
        assert!(sectors.contains("Utilities"));
        assert_eq!(sectors.len(), 3);
    }
}
