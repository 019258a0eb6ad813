use semver::Version;
use std::collections::HashMap;
use tracing::warn;

/// All discovered tags in discovery order, optionally narrowed by prefix.
pub fn select_all<'a>(tags: &'a [String], prefix: &str) -> Vec<&'a str> {
    tags.iter()
        .map(String::as_str)
        .filter(|t| t.starts_with(prefix))
        .collect()
}

/// Collapses tags to the highest release per MAJOR.MINOR line, ascending by
/// version. Tags that do not parse are skipped with a warning; the returned
/// strings are the original tags, preserving upstream formatting (leading
/// 'v', trimmed trailing components, ...).
pub fn latest_per_minor<'a>(tags: &'a [String], prefix: &str) -> Vec<&'a str> {
    let mut minors: HashMap<String, (Version, &'a str)> = HashMap::new();
    for tag in tags {
        if !tag.starts_with(prefix) {
            continue;
        }
        let Some(version) = parse_tag(tag) else {
            warn!("Error parsing SemVer for {tag}");
            continue;
        };
        let key = format!("{}.{}", version.major, version.minor);
        match minors.get(&key) {
            // full semver precedence, so 1.3.0-beta loses to 1.3.0
            Some((best, _)) if *best >= version => {}
            _ => {
                minors.insert(key, (version, tag));
            }
        }
    }
    let mut picked: Vec<(Version, &str)> = minors.into_values().collect();
    picked.sort_by(|a, b| a.0.cmp(&b.0));
    picked.into_iter().map(|(_, tag)| tag).collect()
}

/// Lenient tag parse: tolerates a leading 'v' and pads missing minor/patch
/// components with zeros, the way upstreams like bronze1man tag "v1.3".
pub fn parse_tag(tag: &str) -> Option<Version> {
    let bare = tag.trim().trim_start_matches('v');
    if let Ok(version) = Version::parse(bare) {
        return Some(version);
    }
    let (core, rest) = match bare.find(['-', '+']) {
        Some(idx) => bare.split_at(idx),
        None => (bare, ""),
    };
    if core.is_empty() || !core.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let padded = match core.chars().filter(|c| *c == '.').count() {
        0 => format!("{core}.0.0{rest}"),
        1 => format!("{core}.0{rest}"),
        _ => return None,
    };
    Version::parse(&padded).ok()
}
