//! JSON reporter
//!
//! Outputs the full CheckReport as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use crate::models::CheckReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &CheckReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render report as compact JSON (single line)
#[allow(dead_code)] // Public API helper
pub fn render_compact(report: &CheckReport) -> Result<String> {
    Ok(serde_json::to_string(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_json_render_valid() {
        let report = test_report();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["assembly"], "Sample");
        assert_eq!(parsed["summary"]["high"], 2);
        let defects = parsed["defects"].as_array().expect("defects array");
        assert_eq!(defects[0]["location"]["kind"], "method");
        assert_eq!(defects[1]["location"]["field"], "handle");
        assert_eq!(defects[0]["severity"], "high");
    }

    #[test]
    fn test_json_render_compact() {
        let report = test_report();
        let json_str = render_compact(&report).expect("render compact JSON");
        assert!(!json_str.contains('\n'));
        let back: CheckReport = serde_json::from_str(&json_str).expect("parse compact JSON");
        assert_eq!(back.defects, report.defects);
    }

    #[test]
    fn test_json_empty_defects() {
        let mut report = test_report();
        report.defects.clear();
        report.summary = Default::default();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["defects"].as_array().expect("defects array").len(), 0);
    }
}
