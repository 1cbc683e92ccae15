use contract_protocol::{CheckId, CheckSummary, Report, Violation};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Informational part of the text report (stdout)
pub fn render_summary(report: &Report) -> String {
    let stats = &report.reachability;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "contract-gate: {} files reachable from {} entries ({} imports followed)",
        stats.reachable_files, stats.entries, stats.followed_edges
    );
    if report.strict {
        out.push_str("strict mode: compat components are errors\n");
    }

    for summary in &report.checks {
        let _ = writeln!(out, "  {:<10} {}", summary.check.as_str(), status(summary));
    }

    let verdict = if report.has_errors() { "FAILED" } else { "PASSED" };
    let _ = write!(
        out,
        "{verdict}: {}, {}",
        plural(report.error_count(), "error"),
        plural(report.warning_count(), "warning")
    );
    out
}

fn status(summary: &CheckSummary) -> String {
    if let Some(reason) = &summary.skipped {
        return format!("skipped ({reason})");
    }
    match (summary.errors, summary.warnings) {
        (0, 0) => "ok".to_string(),
        (0, warnings) => format!("ok, {}", plural(warnings, "warning")),
        (errors, 0) => plural(errors, "error"),
        (errors, warnings) => format!(
            "{}, {}",
            plural(errors, "error"),
            plural(warnings, "warning")
        ),
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Violations grouped by rule (stderr). Empty when the run is clean.
pub fn render_violations(report: &Report) -> String {
    let mut groups: BTreeMap<CheckId, Vec<&Violation>> = BTreeMap::new();
    for violation in &report.violations {
        groups.entry(violation.rule).or_default().push(violation);
    }

    let mut out = String::new();
    for (rule, violations) in groups {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "{rule} ({})", violations.len());
        for violation in violations {
            let location = match violation.line {
                Some(line) => format!("{}:{line}", violation.subject),
                None => violation.subject.clone(),
            };
            let _ = writeln!(
                out,
                "  {:<7} {location}: {}",
                violation.level.as_str(),
                violation.message
            );
            if let Some(hint) = &violation.hint {
                let _ = writeln!(out, "          hint: {hint}");
            }
        }
    }
    out
}

/// `--why` output: the chain of importers from an entry to the target
pub fn render_chain(target: &str, chain: Option<&[String]>) -> String {
    match chain {
        None => format!("{target} is not reachable from any entry"),
        Some(chain) => {
            let mut out = format!("why {target}:");
            for (depth, step) in chain.iter().enumerate() {
                let _ = write!(out, "\n  {}{step}", "  ".repeat(depth));
            }
            out
        }
    }
}
