//! Pre-parse rewrite of dynamically-named collector component identifiers.
//!
//! Policies that embed an OTel collector configuration name each component
//! instance with a key of the shape `<type>/<suffix>`, where the suffix is
//! generated per installation. The same string is then referenced from
//! ordered lists under `service.extensions` and
//! `service.pipelines.<signal>.{receivers,processors,exporters}`.
//!
//! The rewrite runs on raw text, before structural parsing, because the
//! replacement identifiers are numbered by textual order of declaration
//! within each section, and because the references live inside ordered
//! lists that must stay ordered. A parsed-and-resorted tree would not
//! reliably preserve either.

use std::collections::BTreeMap;

use regex::Regex;

/// Matches the top-level sections that can hold component identifiers,
/// either as an explicit empty map or as a run of indented child lines.
/// `service` is included so that dynamically-suffixed pipeline names are
/// rewritten as well.
const COMPONENT_SECTIONS: &str =
    r"(?m)^(?:extensions|receivers|processors|connectors|exporters|service):(?:\s\{\}\n|\n(?:\s{2,}.+\n)+)";

/// Matches one component header line inside a section, like
/// `  httpcheck/b0f518d6-4e2d-4c5d-bda7-f9808df537b7:` or
/// `  health_check/4391d954-1ffe-4014-a256-5eda78a71828: {}`.
const COMPONENT_HEADER: &str = r"^(\s{2,})([^/]+)/([^:]+):(\s\{\}|\s*)$";

/// Matches a suffix that is already canonical; such headers are left
/// untouched so that canonicalization is idempotent on its own output.
const CANONICAL_SUFFIX: &str = r"^componentid-\d+$";

/// Rewrites component identifiers to `<type>/componentid-N`, numbering
/// headers per section in textual order, and substitutes every reference
/// to a rewritten identifier anywhere else in the document.
///
/// The reference substitution is a plain textual replacement; it assumes
/// that no original identifier is a substring of another one. Generated
/// suffixes are UUID-derived, which makes collisions unlikely, but the
/// assumption is not enforced.
pub fn rewrite_component_ids(policy: &str) -> String {
    let sections = Regex::new(COMPONENT_SECTIONS).expect("invalid section regex");
    let header = Regex::new(COMPONENT_HEADER).expect("invalid header regex");
    let canonical = Regex::new(CANONICAL_SUFFIX).expect("invalid suffix regex");

    // Original identifier -> canonical identifier, without indentation or
    // the trailing colon. Sorted so the substitution pass is deterministic.
    let mut replacements: BTreeMap<String, String> = BTreeMap::new();

    let rewritten = sections.replace_all(policy, |caps: &regex::Captures| {
        let mut count = 0;
        let mut section = String::with_capacity(caps[0].len());
        for line in caps[0].lines() {
            match header.captures(line) {
                Some(parts) if !canonical.is_match(&parts[3]) => {
                    let rewritten = format!(
                        "{}{}/componentid-{}:{}",
                        &parts[1], &parts[2], count, &parts[4]
                    );
                    replacements.insert(component_id(line), component_id(&rewritten));
                    section.push_str(&rewritten);
                    count += 1;
                }
                Some(_) => {
                    // Already canonical; keep it but let it occupy its slot.
                    section.push_str(line);
                    count += 1;
                }
                None => section.push_str(line),
            }
            section.push('\n');
        }
        section
    });

    let mut policy = rewritten.into_owned();
    for (original, replacement) in &replacements {
        policy = policy.replace(original.as_str(), replacement.as_str());
    }
    policy
}

/// Extracts the bare component identifier from a header line: everything
/// before the first colon, with surrounding whitespace stripped.
fn component_id(line: &str) -> String {
    let trimmed = line.trim();
    match trimmed.split_once(':') {
        Some((id, _)) => id.to_string(),
        None => trimmed.to_string(),
    }
}
