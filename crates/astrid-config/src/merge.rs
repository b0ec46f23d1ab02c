//! Shallow-recursive deep merge for layered TOML configuration.

/// Merge `overlay` on top of `base`: tables merge key-by-key recursively,
/// anything else (scalars, arrays) in `overlay` replaces `base` outright.
pub fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_value) in overlay_table {
                match base_table.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_table.insert(key.clone(), overlay_value.clone());
                    },
                }
            }
        },
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_replaces_scalars_and_merges_nested_tables() {
        let mut base: toml::Value = toml::from_str("a = 1\n[nested]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("a = 2\n[nested]\nx = 9\n").unwrap();
        deep_merge(&mut base, &overlay);

        assert_eq!(base["a"].as_integer(), Some(2));
        assert_eq!(base["nested"]["x"].as_integer(), Some(9));
        assert_eq!(base["nested"]["y"].as_integer(), Some(2));
    }
}
