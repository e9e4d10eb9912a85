//! Test document types
//!
//! Defines the raw shape of the YAML test document and the fully-resolved
//! case handed to the executor.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

/// Canonical section execution order.
///
/// Sections absent from the document contribute no cases; document key order
/// never matters.
pub const SECTION_ORDER: [&str; 2] = ["health", "transaction"];

/// Raw shape of one section before case resolution
#[derive(Deserialize, Debug)]
pub struct RawSection {
    /// Defaults applied to every case in the section
    #[serde(default)]
    pub defaults: Mapping,
    /// The test cases themselves
    pub cases: Vec<Value>,
}

/// A named group of resolved cases, in canonical order
#[derive(Debug)]
pub struct Section {
    pub name: &'static str,
    pub cases: Vec<ResolvedTestCase>,
}

/// A test case after defaults merge and null pruning, immutable from here on
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ResolvedTestCase {
    /// Case name, unique within its section
    pub name: String,
    /// Request path appended to the base URL
    #[serde(default = "default_path")]
    pub path: String,
    /// HTTP verb
    #[serde(default)]
    pub method: Method,
    /// Optional JSON request body
    #[serde(default)]
    pub json: Option<serde_json::Map<String, serde_json::Value>>,
    /// Free-form description shown in the report
    #[serde(default)]
    pub description: String,
    /// Response expectations
    pub expected: Expected,
}

fn default_path() -> String {
    "/".to_string()
}

/// Response expectations for one case. Keys beyond these are ignored.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Expected {
    /// Expected HTTP status code
    #[serde(default)]
    pub status_code: Option<u16>,
    /// Expected JSON body; an empty mapping means "no expectation"
    #[serde(default)]
    pub json: Option<serde_json::Map<String, serde_json::Value>>,
}

/// The closed set of supported HTTP verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
            Self::Patch => reqwest::Method::PATCH,
            Self::Head => reqwest::Method::HEAD,
            Self::Options => reqwest::Method::OPTIONS,
        }
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "delete" => Ok(Self::Delete),
            "patch" => Ok(Self::Patch),
            "head" => Ok(Self::Head),
            "options" => Ok(Self::Options),
            _ => Err(format!("unsupported HTTP method '{}'", s)),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        })
    }
}

impl<'de> Deserialize<'de> for Method {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let verb = String::deserialize(deserializer)?;
        verb.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("POST".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("Delete".parse::<Method>().unwrap(), Method::Delete);
        assert!("fetch".parse::<Method>().is_err());
    }

    #[test]
    fn case_fields_default_when_omitted() {
        let case: ResolvedTestCase =
            serde_yaml::from_str("name: ping\nexpected:\n  status_code: 200\n").unwrap();
        assert_eq!(case.path, "/");
        assert_eq!(case.method, Method::Get);
        assert!(case.json.is_none());
        assert_eq!(case.description, "");
        assert_eq!(case.expected.status_code, Some(200));
        assert!(case.expected.json.is_none());
    }

    #[test]
    fn unknown_case_fields_are_rejected() {
        let result = serde_yaml::from_str::<ResolvedTestCase>(
            "name: ping\nexpected: {}\nsurprise: true\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn extra_expected_keys_are_ignored() {
        let case: ResolvedTestCase = serde_yaml::from_str(
            "name: ping\nexpected:\n  status_code: 200\n  headers: ignored\n",
        )
        .unwrap();
        assert_eq!(case.expected.status_code, Some(200));
    }
}
