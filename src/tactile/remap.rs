use std::collections::HashMap;

use super::types::{LogicalKeyId, PhysicalKeyId};

/// Uppercase logical key name -> physical key name.
pub type RemapTable = HashMap<String, String>;

/// Translates voted keys into the keys actually injected.
///
/// On-screen controls tend to be keys the streamer uses too, so the table can
/// move them somewhere harmless (`"W" -> "1"`).
#[derive(Debug, Clone, Default)]
pub struct KeyRemapper {
    enabled: bool,
    table: HashMap<String, String>,
}

impl KeyRemapper {
    pub fn new(enabled: bool, table: RemapTable) -> Self {
        let table = table
            .into_iter()
            .map(|(from, to)| (from.trim().to_uppercase(), to))
            .collect();
        Self { enabled, table }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn remap(&self, key: &LogicalKeyId) -> PhysicalKeyId {
        if !self.enabled {
            return PhysicalKeyId::from(key);
        }

        match self.table.get(&key.to_upper()) {
            Some(mapped) => PhysicalKeyId::new(mapped.to_lowercase()),
            None => PhysicalKeyId::from(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RemapTable {
        HashMap::from([("W".to_string(), "1".to_string()), ("s".to_string(), "F2".to_string())])
    }

    #[test]
    fn test_disabled_passthrough() {
        let remapper = KeyRemapper::new(false, table());
        assert_eq!(remapper.remap(&LogicalKeyId::new("W")).as_str(), "w");
    }

    #[test]
    fn test_enabled_lookup_lowercases_target() {
        let remapper = KeyRemapper::new(true, table());
        assert_eq!(remapper.remap(&LogicalKeyId::new("w")).as_str(), "1");
        assert_eq!(remapper.remap(&LogicalKeyId::new("s")).as_str(), "f2");
    }

    #[test]
    fn test_unmapped_key_passes_through() {
        let remapper = KeyRemapper::new(true, table());
        assert_eq!(remapper.remap(&LogicalKeyId::new("space")).as_str(), "space");
    }
}
