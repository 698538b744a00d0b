//! Property bags and merge semantics.
//!
//! Properties are opaque to the engine: string-keyed JSON values that
//! registration merges and resolution hands back. Nothing here validates
//! or interprets them.

use serde_json::{Map, Value};

/// String-keyed bag of arbitrary JSON values.
///
/// This is a plain `serde_json` object map, so property bags round-trip
/// through JSON and YAML configs without conversion.
pub type Properties = Map<String, Value>;

/// Merge `overrides` over `defaults`, key by key.
///
/// A key present in `overrides` replaces the default value wholesale;
/// nested objects are not merged. Keys absent from `overrides` keep
/// their default values.
#[must_use]
pub fn merge_over(defaults: &Properties, overrides: &Properties) -> Properties {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
