use crate::context::CheckContext;
use crate::error::{Result, RuleError};
use contract_protocol::path_filters::normalize_filter_path;
use contract_protocol::{
    relative_display, BudgetMetric, BudgetRule, CheckId, ConfigError, PathGlobs, Violation,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories never descended into unless a glob names them explicitly
const SKIPPED_DIRS: [&str; 2] = ["node_modules", ".git"];

pub fn check(ctx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();
    for rule in &ctx.config.budgets {
        match evaluate(ctx.root, rule) {
            Ok(found) => violations.extend(found),
            Err(err) => violations.push(Violation::config_error(CheckId::Budgets, &rule.id, err)),
        }
    }
    violations
}

/// Measures every file the rule's globs select and compares against `max`.
pub fn evaluate(root: &Path, rule: &BudgetRule) -> Result<Vec<Violation>> {
    let globs = PathGlobs::new(&rule.files)?;
    let literal = match rule.metric {
        BudgetMetric::Bytes => None,
        BudgetMetric::Occurrences => Some(
            rule.literal
                .as_deref()
                .filter(|literal| !literal.is_empty())
                .ok_or_else(|| {
                    ConfigError::invalid("occurrences budget needs a non-empty literal")
                })?,
        ),
    };

    let files = matched_files(root, &rule.files, &globs)?;
    if files.is_empty() {
        return Err(ConfigError::invalid(format!("files {:?} matched nothing", rule.files)).into());
    }

    let mut measured = Vec::with_capacity(files.len());
    for (rel, path) in &files {
        measured.push((rel.as_str(), measure(path, literal)?));
    }

    let unit = unit(rule.metric);
    if rule.aggregate {
        let total: u64 = measured.iter().map(|(_, value)| value).sum();
        log::debug!("budget {}: {total} {unit} over {} files", rule.id, files.len());
        if total <= rule.max {
            return Ok(Vec::new());
        }
        return Ok(vec![Violation::error(
            CheckId::Budgets,
            &rule.id,
            format!(
                "{total} {unit} across {} files exceeds the budget of {}",
                files.len(),
                rule.max
            ),
        )
        .with_hint(rule.hint.clone())]);
    }

    Ok(measured
        .into_iter()
        .filter(|(_, value)| *value > rule.max)
        .map(|(rel, value)| {
            Violation::error(
                CheckId::Budgets,
                rel,
                format!("{value} {unit} exceeds the {} budget of {}", rule.id, rule.max),
            )
            .with_hint(rule.hint.clone())
        })
        .collect())
}

fn unit(metric: BudgetMetric) -> &'static str {
    match metric {
        BudgetMetric::Bytes => "bytes",
        BudgetMetric::Occurrences => "occurrences",
    }
}

fn measure(path: &Path, literal: Option<&str>) -> Result<u64> {
    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    match literal {
        None => Ok(fs::metadata(path).map_err(io_error)?.len()),
        Some(literal) => {
            let bytes = fs::read(path).map_err(io_error)?;
            let text = String::from_utf8_lossy(&bytes);
            Ok(text.matches(literal).count() as u64)
        }
    }
}

/// Walks only the literal directory prefix of each glob.
fn matched_files(
    root: &Path,
    patterns: &[String],
    globs: &PathGlobs,
) -> Result<Vec<(String, PathBuf)>> {
    let bases: BTreeSet<String> = patterns.iter().map(|p| glob_base(p)).collect();
    let mut found: BTreeSet<(String, PathBuf)> = BTreeSet::new();

    for base in bases {
        let start = if base.is_empty() {
            root.to_path_buf()
        } else {
            root.join(&base)
        };
        if !start.exists() {
            continue;
        }
        let walker = WalkDir::new(&start)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !SKIPPED_DIRS.iter().any(|dir| entry.file_name() == *dir)
            });
        for entry in walker {
            let entry = entry.map_err(|err| RuleError::Walk {
                path: start.clone(),
                message: err.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = relative_display(root, entry.path());
            if globs.is_match(&rel) {
                found.insert((rel, entry.path().to_path_buf()));
            }
        }
    }

    Ok(found.into_iter().collect())
}

/// `dist/assets/*.css` -> `dist/assets`; `**/*.svg` -> ``
fn glob_base(pattern: &str) -> String {
    let normalized = normalize_filter_path(pattern);
    normalized
        .split('/')
        .take_while(|segment| !segment.contains(['*', '?', '[', '{']))
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn rule(metric: BudgetMetric, files: &[&str], max: u64) -> BudgetRule {
        BudgetRule {
            id: "css-size".to_string(),
            metric,
            files: files.iter().map(|f| (*f).to_string()).collect(),
            max,
            aggregate: false,
            literal: None,
            hint: String::new(),
        }
    }

    #[test]
    fn test_glob_base_stops_at_first_wildcard() {
        assert_eq!(glob_base("dist/assets/*.css"), "dist/assets");
        assert_eq!(glob_base("./src/**/index.ts"), "src");
        assert_eq!(glob_base("**/*.svg"), "");
        assert_eq!(glob_base("public/logo.svg"), "public/logo.svg");
    }

    #[test]
    fn test_bytes_budget_per_file() {
        let temp = TempDir::new().unwrap();
        let assets = temp.path().join("dist/assets");
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join("small.css"), "a{}").unwrap();
        fs::write(assets.join("big.css"), "x".repeat(64)).unwrap();

        let budget = rule(BudgetMetric::Bytes, &["dist/assets/*.css"], 32);
        let violations = evaluate(temp.path(), &budget).unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].subject, "dist/assets/big.css");
        assert_eq!(violations[0].message, "64 bytes exceeds the css-size budget of 32");
    }

    #[test]
    fn test_occurrences_budget_aggregates() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.tsx"), "useEffect(); useEffect();").unwrap();
        fs::write(src.join("b.tsx"), "useEffect();").unwrap();

        let mut budget = rule(BudgetMetric::Occurrences, &["src/*.tsx"], 2);
        budget.aggregate = true;
        budget.literal = Some("useEffect(".to_string());

        let violations = evaluate(temp.path(), &budget).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].subject, "css-size");
        assert!(violations[0].message.starts_with("3 occurrences across 2 files"));
    }

    #[test]
    fn test_globs_matching_nothing_are_a_config_error() {
        let temp = TempDir::new().unwrap();
        let budget = rule(BudgetMetric::Bytes, &["dist/*.js"], 10);
        let err = evaluate(temp.path(), &budget).unwrap_err();
        assert!(err.to_string().contains("matched nothing"), "{err}");
    }
}
