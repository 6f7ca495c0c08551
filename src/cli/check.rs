//! `ilcheck check` and `ilcheck rules`

use crate::config::{load_project_config, load_project_config_file, Configuration};
use crate::metadata::load_assembly;
use crate::models::{CheckReport, Severity};
use crate::reporters;
use crate::rules::{create_default_engine, default_rules, RuleTarget};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{debug, info};

const DEFAULT_MAX_DEFECTS: usize = 10_000;

/// Resolved arguments of the `check` subcommand
#[derive(Debug, Clone, Default)]
pub struct CheckArgs {
    pub model: PathBuf,
    pub config: Option<PathBuf>,
    pub format: Option<String>,
    pub output: Option<PathBuf>,
    pub approximate: bool,
    pub max_defects: Option<usize>,
    pub skip_rules: Vec<String>,
    pub fail_on: Option<String>,
    pub workers: Option<usize>,
}

pub fn run(args: CheckArgs) -> Result<ExitCode> {
    let mut project = match &args.config {
        Some(path) => load_project_config_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => load_project_config(model_dir(&args.model)),
    };
    project
        .defaults
        .skip_rules
        .extend(args.skip_rules.iter().cloned());

    let mut config = Configuration::from_project(&project)?;
    if args.approximate {
        config = config.with_approximation(true);
    }
    debug!("Thresholds: {:?}", config);

    let assembly = load_assembly(&args.model)?;

    let workers = args.workers.or(project.defaults.workers).unwrap_or(0);
    let max_defects = args
        .max_defects
        .or(project.defaults.max_defects)
        .unwrap_or(DEFAULT_MAX_DEFECTS);
    let engine = create_default_engine(workers, max_defects, config, &project)?;
    let report = engine.run(&assembly)?;

    let format = args
        .format
        .clone()
        .or_else(|| project.defaults.format.clone())
        .unwrap_or_else(|| "text".to_string());
    let rendered = reporters::report(&report, &format)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => print!("{}", rendered),
    }

    let fail_on = args.fail_on.or_else(|| project.defaults.fail_on.clone());
    if let Some(threshold) = fail_on {
        if exceeds_fail_threshold(&threshold, &report)? {
            eprintln!("Failing due to --fail-on={} threshold", threshold);
            return Ok(ExitCode::from(1));
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Directory searched for a project config when none is given
fn model_dir(model: &Path) -> &Path {
    match model.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Whether defects at or above the threshold severity exist
fn exceeds_fail_threshold(threshold: &str, report: &CheckReport) -> Result<bool> {
    let severity = Severity::from_str(threshold)?;
    Ok(report.summary.at_or_above(severity) > 0)
}

/// Table of built-in rules
pub fn list_rules() -> String {
    let mut out = String::new();
    for rule in default_rules() {
        let target = match rule.target() {
            RuleTarget::Method => "method",
            RuleTarget::Type => "type",
        };
        out.push_str(&format!(
            "{:<42} {:<7} {:<16} {}\n",
            rule.name(),
            target,
            rule.category(),
            rule.description()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DefectSummary, RuleStats};

    fn report_with(summary: DefectSummary) -> CheckReport {
        CheckReport {
            assembly: "T".into(),
            defects: Vec::new(),
            summary,
            rules: vec![RuleStats::for_rule("R")],
            types_checked: 0,
            methods_checked: 0,
            defects_dropped: 0,
            duration_ms: 0,
        }
    }

    #[test]
    fn test_fail_threshold() {
        let report = report_with(DefectSummary {
            medium: 1,
            total: 1,
            ..Default::default()
        });
        assert!(!exceeds_fail_threshold("high", &report).unwrap());
        assert!(exceeds_fail_threshold("medium", &report).unwrap());
        assert!(exceeds_fail_threshold("audit", &report).unwrap());
        assert!(exceeds_fail_threshold("urgent", &report).is_err());
    }

    #[test]
    fn test_model_dir() {
        assert_eq!(model_dir(Path::new("Lib.json")), Path::new("."));
        assert_eq!(model_dir(Path::new("out/Lib.json")), Path::new("out"));
    }

    #[test]
    fn test_list_rules() {
        let table = list_rules();
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("DisposableTypesShouldHaveFinalizerRule"));
        assert!(table.contains("type"));
    }
}
