//! Text (terminal) reporter with colors and formatting

use crate::models::{CheckReport, Defect, Severity};
use anyhow::Result;

/// Severity colors
fn severity_color(severity: &Severity) -> &'static str {
    match severity {
        Severity::Critical => "\x1b[31m", // Red
        Severity::High => "\x1b[91m",     // Light red
        Severity::Medium => "\x1b[33m",   // Yellow
        Severity::Low => "\x1b[34m",      // Blue
        Severity::Audit => "\x1b[90m",    // Gray
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Severity tag
fn severity_tag(severity: &Severity) -> &'static str {
    match severity {
        Severity::Critical => "[C]",
        Severity::High => "[H]",
        Severity::Medium => "[M]",
        Severity::Low => "[L]",
        Severity::Audit => "[A]",
    }
}

/// Render report as formatted terminal output
pub fn render(report: &CheckReport) -> Result<String> {
    let mut out = String::new();

    // Header
    out.push_str(&format!("\n{BOLD}ilcheck: {}{RESET}\n", report.assembly));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Types: {}  Methods: {}  Time: {}ms\n\n",
        report.types_checked, report.methods_checked, report.duration_ms
    ));

    // Defect summary
    let s = &report.summary;
    out.push_str(&format!("{BOLD}DEFECTS{RESET} ({} total)\n", s.total));

    let mut summary_parts = Vec::new();
    for (count, severity) in [
        (s.critical, Severity::Critical),
        (s.high, Severity::High),
        (s.medium, Severity::Medium),
        (s.low, Severity::Low),
        (s.audit, Severity::Audit),
    ] {
        if count > 0 {
            let color = severity_color(&severity);
            summary_parts.push(format!("{color}{} {}{RESET}", count, severity));
        }
    }
    if !summary_parts.is_empty() {
        out.push_str(&format!("  {}\n", summary_parts.join(" | ")));
    }
    out.push('\n');

    for defect in &report.defects {
        out.push_str(&format_defect(defect));
    }
    if !report.defects.is_empty() {
        out.push('\n');
    }
    if report.defects_dropped > 0 {
        out.push_str(&format!(
            "  {DIM}...{} more defects dropped after the defect limit{RESET}\n\n",
            report.defects_dropped
        ));
    }

    // Per-rule verdicts
    out.push_str(&format!("{BOLD}RULES{RESET}\n"));
    out.push_str(&format!(
        "{DIM}  {:<42} {:>6} {:>6} {:>6} {:>6}{RESET}\n",
        "RULE", "FAIL", "PASS", "N/A", "ERR"
    ));
    for stats in &report.rules {
        out.push_str(&format!(
            "  {:<42} {:>6} {:>6} {:>6} {:>6}\n",
            stats.rule, stats.failure, stats.success, stats.not_applicable, stats.errors
        ));
    }

    Ok(out)
}

fn format_defect(defect: &Defect) -> String {
    let sev_c = severity_color(&defect.severity);
    let sev_tag = severity_tag(&defect.severity);
    let mut line = format!(
        "  {sev_c}{}{RESET}  {}  {DIM}{} ({}){RESET}\n",
        sev_tag, defect.location, defect.rule, defect.confidence
    );
    if !defect.message.is_empty() {
        line.push_str(&format!("       {}\n", defect.message));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_text_render() {
        let out = render(&test_report()).expect("render text");
        assert!(out.contains("ilcheck: Sample"));
        assert!(out.contains("(2 total)"));
        assert!(out.contains("[H]"));
        assert!(out.contains("Ns.Foo::Run()"));
        assert!(out.contains("Logical SLOC: 43. Maximum: 42"));
        assert!(out.contains("Ns.Handle::handle"));
        assert!(out.contains("DisposableTypesShouldHaveFinalizerRule"));
    }

    #[test]
    fn test_text_dropped_notice() {
        let mut report = test_report();
        report.defects_dropped = 5;
        let out = render(&report).expect("render text");
        assert!(out.contains("5 more defects dropped"));
    }
}
