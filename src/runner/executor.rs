//! Test executor
//!
//! Replays resolved cases against the live server, strictly in order, and
//! records expected-vs-actual mismatches per case. Transport-level failures
//! are run errors and abort the remaining run.

use reqwest::Client;
use serde_json::Value;

use super::report;
use crate::common::Result;
use crate::suite::{ResolvedTestCase, Section};

/// Recorded status-code difference for one case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMismatch {
    pub expected: u16,
    pub actual: u16,
}

/// Recorded JSON body difference for one case
#[derive(Debug, Clone, PartialEq)]
pub struct JsonMismatch {
    pub expected: Value,
    /// None when the response body was not valid JSON
    pub actual: Option<Value>,
}

/// Outcome of a single case; empty means the case passed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestResult {
    pub status_code: Option<StatusMismatch>,
    pub json: Option<JsonMismatch>,
}

impl TestResult {
    pub fn passed(&self) -> bool {
        self.status_code.is_none() && self.json.is_none()
    }
}

/// A finalized case outcome, ready for reporting
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub name: String,
    pub section: &'static str,
    pub description: String,
    pub result: TestResult,
}

impl CaseReport {
    /// Failure-dump record in `{name, section, result}` shape
    pub fn as_record(&self) -> Value {
        let mut result = serde_json::Map::new();
        if let Some(mismatch) = &self.result.status_code {
            result.insert(
                "status_code".to_string(),
                Value::String(format!("{} != {}", mismatch.expected, mismatch.actual)),
            );
        }
        if let Some(mismatch) = &self.result.json {
            let actual = mismatch.actual.clone().unwrap_or(Value::Null);
            result.insert(
                "json".to_string(),
                Value::String(format!("{} != {}", mismatch.expected, actual)),
            );
        }
        serde_json::json!({
            "name": self.name,
            "section": self.section,
            "result": Value::Object(result),
        })
    }
}

/// Execute every resolved case in section order against `base_url`.
///
/// Returns the passing and failing cases. Sections with no cases are
/// skipped; each executed section shares one keep-alive client across its
/// cases, dropped when the section completes.
pub async fn execute(
    sections: &[Section],
    base_url: &str,
) -> Result<(Vec<CaseReport>, Vec<CaseReport>)> {
    let mut passed = Vec::new();
    let mut failed = Vec::new();

    for section in sections {
        if section.cases.is_empty() {
            continue;
        }
        report::subheader(section.name);

        let client = Client::new();
        for case in &section.cases {
            let result = run_case(&client, case, base_url).await?;
            report::case_line(case, result.passed());

            let outcome = CaseReport {
                name: case.name.clone(),
                section: section.name,
                description: case.description.clone(),
                result,
            };
            if outcome.result.passed() {
                passed.push(outcome);
            } else {
                failed.push(outcome);
            }
        }
    }

    Ok((passed, failed))
}

async fn run_case(client: &Client, case: &ResolvedTestCase, base_url: &str) -> Result<TestResult> {
    let url = format!("{}{}", base_url, case.path);
    tracing::debug!(name = %case.name, method = %case.method, %url, "sending request");

    let mut request = client.request(case.method.as_reqwest(), &url);
    if let Some(body) = &case.json {
        request = request.json(body);
    }
    let response = request.send().await?;

    let mut result = TestResult::default();
    let status = response.status().as_u16();
    if let Some(expected) = case.expected.status_code {
        if expected != status {
            result.status_code = Some(StatusMismatch {
                expected,
                actual: status,
            });
        }
    }

    if let Some(expected) = case.expected.json.as_ref().filter(|body| !body.is_empty()) {
        let expected = Value::Object(expected.clone());
        // an unparseable body counts as "no JSON came back"
        let actual = response.json::<Value>().await.ok();
        if actual.as_ref() != Some(&expected) {
            result.json = Some(JsonMismatch { expected, actual });
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with(result: TestResult) -> CaseReport {
        CaseReport {
            name: "pay".to_string(),
            section: "transaction",
            description: String::new(),
            result,
        }
    }

    #[test]
    fn empty_result_is_a_pass() {
        let report = report_with(TestResult::default());
        assert!(report.result.passed());
        assert_eq!(report.as_record()["result"], serde_json::json!({}));
    }

    #[test]
    fn status_mismatch_renders_expected_vs_actual() {
        let report = report_with(TestResult {
            status_code: Some(StatusMismatch {
                expected: 200,
                actual: 404,
            }),
            json: None,
        });
        assert!(!report.result.passed());
        assert_eq!(report.as_record()["result"]["status_code"], "200 != 404");
    }

    #[test]
    fn json_mismatch_renders_null_for_unparseable_bodies() {
        let report = report_with(TestResult {
            status_code: None,
            json: Some(JsonMismatch {
                expected: serde_json::json!({"ok": true}),
                actual: None,
            }),
        });
        assert_eq!(
            report.as_record()["result"]["json"],
            "{\"ok\":true} != null"
        );
    }
}
