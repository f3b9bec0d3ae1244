//! Reader for the OCI CLI/SDK configuration file.
//!
//! The file is INI-like: `[PROFILE]` headers followed by `key=value`
//! lines. Every profile inherits the entries of `[DEFAULT]`.

use std::collections::HashMap;

pub(crate) const DEFAULT_PROFILE: &str = "DEFAULT";

pub(crate) type Profile = HashMap<String, String>;

/// Parses `content` and returns the merged entries of `profile`, or
/// `None` if the profile is not declared.
pub(crate) fn parse_profile(content: &str, profile: &str) -> Option<Profile> {
    let mut sections: HashMap<&str, Profile> = HashMap::new();
    let mut current: Option<&str> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) =
            line.strip_prefix('[').and_then(|l| l.strip_suffix(']'))
        {
            let name = name.trim();
            sections.entry(name).or_default();
            current = Some(name);
            continue;
        }
        let (Some(section), Some((key, value))) = (current, line.split_once('='))
        else {
            trace!("skipping line outside of a key-value section");
            continue;
        };
        sections
            .entry(section)
            .or_default()
            .insert(key.trim().to_owned(), value.trim().to_owned());
    }

    let mut merged = sections.get(DEFAULT_PROFILE).cloned().unwrap_or_default();
    if profile != DEFAULT_PROFILE {
        let named = sections.remove(profile)?;
        merged.extend(named);
    } else if !sections.contains_key(DEFAULT_PROFILE) {
        return None;
    }
    Some(merged)
}
