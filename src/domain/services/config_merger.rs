//! Config merger
//!
//! Merges two config layers field by field:
//! - Lists: ordered-set union (base items first, then overlay's new items)
//! - Scalars: overlay wins unless empty
//! - Maps: key-wise, base value wins on collision

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use crate::domain::entities::{Config, ConfigSettings, Metadata, Packages, Script, ToolChoice};

/// Merge `overlay` onto `base`.
///
/// Deterministic and idempotent for a fixed overlay:
/// `merge(&merge(a, b), b) == merge(a, b)`.
pub fn merge(base: &Config, overlay: &Config) -> Config {
    Config {
        version: pick_string(&base.version, &overlay.version),
        kind: pick_string(&base.kind, &overlay.kind),
        layer_type: overlay.layer_type,
        metadata: merge_metadata(&base.metadata, &overlay.metadata),
        base: overlay.base.clone().or_else(|| base.base.clone()),
        settings: merge_settings(&base.settings, &overlay.settings),
        packages: merge_packages(&base.packages, &overlay.packages),
        scripts: merge_scripts(&base.scripts, &overlay.scripts),
    }
}

/// Fold layers (already sorted lowest → highest priority) into one config.
pub fn merge_all<'a, I>(layers: I) -> Option<Config>
where
    I: IntoIterator<Item = &'a Config>,
{
    let mut layers = layers.into_iter();
    let first = layers.next()?.clone();
    Some(layers.fold(first, |acc, overlay| merge(&acc, overlay)))
}

/// Sort layers lowest → highest priority.
///
/// Ties break by layer kind (team < personal < project), then by name, so
/// the order never depends on directory iteration order.
pub fn sort_by_priority(layers: &mut [Config]) {
    layers.sort_by(|a, b| {
        a.priority()
            .cmp(&b.priority())
            .then(a.layer_type.cmp(&b.layer_type))
            .then_with(|| a.metadata.name.cmp(&b.metadata.name))
    });
}

/// Ordered-set union: every distinct item once, base order first.
pub fn ordered_union<T>(base: &[T], overlay: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen: HashSet<&T> = HashSet::with_capacity(base.len() + overlay.len());
    base.iter()
        .chain(overlay.iter())
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

fn pick_string(base: &str, overlay: &str) -> String {
    if overlay.is_empty() {
        base.to_string()
    } else {
        overlay.to_string()
    }
}

fn pick_tool(base: &Option<ToolChoice>, overlay: &Option<ToolChoice>) -> Option<ToolChoice> {
    overlay
        .as_ref()
        .filter(|t| !t.kind.is_empty())
        .or(base.as_ref())
        .cloned()
}

fn merge_map<V: Clone>(base: &BTreeMap<String, V>, overlay: &BTreeMap<String, V>) -> BTreeMap<String, V> {
    let mut merged = base.clone();
    for (key, value) in overlay {
        merged.entry(key.clone()).or_insert_with(|| value.clone());
    }
    merged
}

fn merge_metadata(base: &Metadata, overlay: &Metadata) -> Metadata {
    Metadata {
        name: pick_string(&base.name, &overlay.name),
        description: pick_string(&base.description, &overlay.description),
        created: overlay.created.or(base.created),
        updated: overlay.updated.or(base.updated),
        priority: overlay.priority.or(base.priority),
    }
}

fn merge_settings(base: &ConfigSettings, overlay: &ConfigSettings) -> ConfigSettings {
    ConfigSettings {
        shell: pick_tool(&base.shell, &overlay.shell),
        editor: pick_tool(&base.editor, &overlay.editor),
        environment: merge_map(&base.environment, &overlay.environment),
        log_level: overlay.log_level.or(base.log_level),
        auto_update: overlay.auto_update.or(base.auto_update),
        update_interval: overlay
            .update_interval
            .clone()
            .filter(|i| !i.is_empty())
            .or_else(|| base.update_interval.clone()),
    }
}

fn merge_packages(base: &Packages, overlay: &Packages) -> Packages {
    Packages {
        core: ordered_union(&base.core, &overlay.core),
        optional: ordered_union(&base.optional, &overlay.optional),
        additional: ordered_union(&base.additional, &overlay.additional),
        platform: merge_map(&base.platform, &overlay.platform),
        team: merge_map(&base.team, &overlay.team),
    }
}

/// Scripts are a list keyed by name; the first definition of a name wins.
fn merge_scripts(base: &[Script], overlay: &[Script]) -> Vec<Script> {
    let mut seen: HashSet<&str> = HashSet::new();
    base.iter()
        .chain(overlay.iter())
        .filter(|script| seen.insert(script.name.as_str()))
        .cloned()
        .collect()
}
