//! Test-case derivation
//!
//! Turns the layered defaults/override document into a flat, ordered list of
//! concrete test cases. A key set to explicit null in a case deletes the
//! same-named inherited default instead of overriding it; that deletion is
//! scoped to the `json` mapping, the `expected` mapping, and one level inside
//! `expected.json`. A null with no matching default survives the merge as a
//! literal null.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use super::config::{RawSection, ResolvedTestCase, Section, SECTION_ORDER};
use crate::common::{Error, Result};

/// Load a test document from disk and resolve it into ordered sections.
pub fn load(path: &Path) -> Result<Vec<Section>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    let document: Value =
        serde_yaml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))?;
    resolve(&document)
}

/// Resolve a parsed document into one `Section` per canonical section name.
///
/// Sections absent from the document (or present but empty) still occupy
/// their slot with zero cases, so the executor always sees the fixed order.
pub fn resolve(document: &Value) -> Result<Vec<Section>> {
    let mut sections = Vec::with_capacity(SECTION_ORDER.len());
    for name in SECTION_ORDER {
        let mut section = Section {
            name,
            cases: Vec::new(),
        };
        if let Some(raw) = present_section(document, name)? {
            for case in &raw.cases {
                let case = case.as_mapping().cloned().ok_or_else(|| {
                    Error::Config(format!("section '{}': test case must be a mapping", name))
                })?;
                section.cases.push(resolve_case(&raw.defaults, case, name)?);
            }
        }
        tracing::debug!(section = name, cases = section.cases.len(), "resolved section");
        sections.push(section);
    }
    Ok(sections)
}

/// A section participates only when it maps to a non-empty structure.
fn present_section(document: &Value, name: &str) -> Result<Option<RawSection>> {
    let Some(value) = document.get(name) else {
        return Ok(None);
    };
    if is_falsy(value) {
        return Ok(None);
    }
    let raw = serde_yaml::from_value(value.clone())
        .map_err(|e| Error::Config(format!("section '{}': {}", name, e)))?;
    Ok(Some(raw))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Sequence(seq) => seq.is_empty(),
        Value::Mapping(mapping) => mapping.is_empty(),
        Value::Tagged(_) => false,
    }
}

/// Merge the section defaults into one case.
///
/// The defaults are cloned per case so pruning for one case can never leak
/// into the next.
fn resolve_case(defaults: &Mapping, mut case: Mapping, section: &str) -> Result<ResolvedTestCase> {
    let mut defaults = defaults.clone();
    prune_null_overrides(&mut defaults, &mut case);
    let merged = deep_merge(defaults, case);
    serde_yaml::from_value(Value::Mapping(merged))
        .map_err(|e| Error::Config(format!("invalid test case in section '{}': {}", section, e)))
}

/// Apply the subtractive null rule at its three scopes.
///
/// A null-valued key is dropped from both the case and the per-case defaults
/// when the defaults define the same key at the same scope; the merge step
/// then neither inherits nor sets it.
fn prune_null_overrides(defaults: &mut Mapping, case: &mut Mapping) {
    for key in null_keys(case.get("json")) {
        if nested_contains(defaults, &["json"], &key) {
            remove_nested(defaults, &["json"], &key);
            remove_nested(case, &["json"], &key);
        }
    }

    // expected.json goes exactly one level deeper, before the generic
    // expected pass so a null `json:` block itself is still handled below
    for key in null_keys(case.get("expected").and_then(|e| e.get("json"))) {
        if nested_contains(defaults, &["expected", "json"], &key) {
            remove_nested(defaults, &["expected", "json"], &key);
            remove_nested(case, &["expected", "json"], &key);
        }
    }

    for key in null_keys(case.get("expected")) {
        if nested_contains(defaults, &["expected"], &key) {
            remove_nested(defaults, &["expected"], &key);
            remove_nested(case, &["expected"], &key);
        }
    }
}

/// String keys whose value is an explicit null in the given mapping
fn null_keys(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_mapping)
        .map(|mapping| {
            mapping
                .iter()
                .filter(|(_, v)| v.is_null())
                .filter_map(|(k, _)| k.as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

fn nested_mapping<'a>(root: &'a Mapping, path: &[&str]) -> Option<&'a Mapping> {
    let mut current = root;
    for segment in path {
        current = current.get(*segment)?.as_mapping()?;
    }
    Some(current)
}

fn nested_mapping_mut<'a>(root: &'a mut Mapping, path: &[&str]) -> Option<&'a mut Mapping> {
    let mut current = root;
    for segment in path {
        current = current.get_mut(*segment)?.as_mapping_mut()?;
    }
    Some(current)
}

fn nested_contains(root: &Mapping, path: &[&str], key: &str) -> bool {
    nested_mapping(root, path).is_some_and(|mapping| mapping.contains_key(key))
}

fn remove_nested(root: &mut Mapping, path: &[&str], key: &str) {
    if let Some(mapping) = nested_mapping_mut(root, path) {
        mapping.remove(key);
    }
}

/// Recursively merge a case over its defaults.
///
/// Mappings present on both sides merge key-by-key; any other case value
/// replaces the default wholesale.
fn deep_merge(defaults: Mapping, case: Mapping) -> Mapping {
    let mut merged = defaults;
    for (key, value) in case {
        let value = match (merged.remove(&key), value) {
            (Some(Value::Mapping(base)), Value::Mapping(over)) => {
                Value::Mapping(deep_merge(base, over))
            }
            (_, over) => over,
        };
        merged.insert(key, value);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::Method;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn mapping(text: &str) -> Mapping {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn defaults_round_trip_onto_a_bare_case() {
        let document = yaml(
            r#"
health:
  defaults:
    expected:
      status_code: 200
  cases:
    - name: ping
      path: /health
"#,
        );
        let sections = resolve(&document).unwrap();
        assert_eq!(sections[0].cases.len(), 1);
        let case = &sections[0].cases[0];
        assert_eq!(case.name, "ping");
        assert_eq!(case.path, "/health");
        assert_eq!(case.method, Method::Get);
        assert_eq!(case.expected.status_code, Some(200));
    }

    #[test]
    fn null_deletes_the_inherited_default() {
        let document = yaml(
            r#"
health:
  defaults:
    expected:
      status_code: 200
  cases:
    - name: ping
      path: /health
      expected:
        status_code: null
"#,
        );
        let sections = resolve(&document).unwrap();
        let case = &sections[0].cases[0];
        assert_eq!(case.expected.status_code, None);
    }

    #[test]
    fn null_without_matching_default_survives_literally() {
        // No default defines status_code, so the null is passed through
        // instead of pruned. The key stays present in the merged mapping.
        let mut defaults = mapping("json:\n  amount: 1\n");
        let mut case = mapping("expected:\n  status_code: null\n");
        prune_null_overrides(&mut defaults, &mut case);
        let merged = deep_merge(defaults, case);

        let expected = merged.get("expected").unwrap().as_mapping().unwrap();
        assert!(expected.contains_key("status_code"));
        assert!(expected.get("status_code").unwrap().is_null());
    }

    #[test]
    fn json_scope_prunes_only_defaulted_keys() {
        let mut defaults = mapping("json:\n  amount: 10\n  currency: EUR\n");
        let mut case = mapping("json:\n  currency: null\n  note: null\n  amount: 25\n");
        prune_null_overrides(&mut defaults, &mut case);
        let merged = deep_merge(defaults, case);

        let body = merged.get("json").unwrap().as_mapping().unwrap();
        assert_eq!(body.get("amount").unwrap().as_u64(), Some(25));
        assert!(!body.contains_key("currency"));
        // `note` had no default, so its null is literal
        assert!(body.get("note").unwrap().is_null());
    }

    #[test]
    fn expected_json_prunes_one_level_deep() {
        let mut defaults = mapping(
            "expected:\n  status_code: 200\n  json:\n    ok: true\n    detail: full\n",
        );
        let mut case = mapping("expected:\n  json:\n    detail: null\n");
        prune_null_overrides(&mut defaults, &mut case);
        let merged = deep_merge(defaults, case);

        let expected = merged.get("expected").unwrap().as_mapping().unwrap();
        assert_eq!(
            expected.get("status_code").unwrap().as_u64(),
            Some(200),
            "untouched expected keys still inherit"
        );
        let body = expected.get("json").unwrap().as_mapping().unwrap();
        assert_eq!(body.get("ok").unwrap().as_bool(), Some(true));
        assert!(!body.contains_key("detail"));
    }

    #[test]
    fn whole_expected_json_block_can_be_deleted() {
        let document = yaml(
            r#"
health:
  defaults:
    expected:
      status_code: 200
      json:
        ok: true
  cases:
    - name: ping
      expected:
        json: null
"#,
        );
        let sections = resolve(&document).unwrap();
        let case = &sections[0].cases[0];
        assert_eq!(case.expected.status_code, Some(200));
        assert!(case.expected.json.is_none());
    }

    #[test]
    fn merge_is_idempotent_without_null_overrides() {
        let defaults = mapping("method: POST\nexpected:\n  status_code: 200\n  json:\n    ok: true\n");
        let case = mapping("name: one\njson:\n  amount: 3\nexpected:\n  status_code: 201\n");

        let once = deep_merge(defaults.clone(), case.clone());
        let twice = deep_merge(defaults, once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn mappings_merge_key_by_key_and_scalars_replace() {
        let defaults = mapping("expected:\n  status_code: 200\n  json:\n    ok: true\npath: /\n");
        let case = mapping("expected:\n  status_code: 404\npath: /missing\n");
        let merged = deep_merge(defaults, case);

        let expected = merged.get("expected").unwrap().as_mapping().unwrap();
        assert_eq!(expected.get("status_code").unwrap().as_u64(), Some(404));
        // the untouched sibling inside the mapping is kept, not replaced away
        assert!(expected.contains_key("json"));
        assert_eq!(merged.get("path").unwrap().as_str(), Some("/missing"));
    }

    #[test]
    fn sections_come_out_in_canonical_order() {
        let document = yaml(
            r#"
transaction:
  cases:
    - name: pay
      expected:
        status_code: 201
health:
  cases:
    - name: ping
      expected:
        status_code: 200
"#,
        );
        let sections = resolve(&document).unwrap();
        assert_eq!(sections[0].name, "health");
        assert_eq!(sections[1].name, "transaction");
    }

    #[test]
    fn absent_and_empty_sections_keep_their_slot() {
        let document = yaml(
            r#"
transaction: {}
"#,
        );
        let sections = resolve(&document).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name, "health");
        assert!(sections[0].cases.is_empty());
        assert_eq!(sections[1].name, "transaction");
        assert!(sections[1].cases.is_empty());
    }

    #[test]
    fn pruning_for_one_case_never_leaks_into_the_next() {
        let document = yaml(
            r#"
transaction:
  defaults:
    json:
      amount: 10
    expected:
      status_code: 201
  cases:
    - name: without_amount
      json:
        amount: null
    - name: with_amount
"#,
        );
        let sections = resolve(&document).unwrap();
        let cases = &sections[1].cases;

        assert!(cases[0].json.as_ref().unwrap().is_empty());
        // the second case still inherits the full defaults
        let body = cases[1].json.as_ref().unwrap();
        assert_eq!(body.get("amount").unwrap().as_u64(), Some(10));
        assert_eq!(cases[1].expected.status_code, Some(201));
    }

    #[test]
    fn present_section_without_cases_is_a_config_error() {
        let document = yaml(
            r#"
health:
  defaults:
    expected:
      status_code: 200
"#,
        );
        let error = resolve(&document).unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }

    #[test]
    fn unknown_verb_is_a_config_error() {
        let document = yaml(
            r#"
health:
  cases:
    - name: ping
      method: FETCH
      expected:
        status_code: 200
"#,
        );
        assert!(resolve(&document).is_err());
    }

    #[test]
    fn case_missing_name_is_a_config_error() {
        let document = yaml(
            r#"
health:
  cases:
    - path: /health
      expected:
        status_code: 200
"#,
        );
        assert!(resolve(&document).is_err());
    }
}
