use crate::context::CheckContext;
use crate::error::{Result, RuleError};
use contract_imports::{normalize_path, SourceLanguage};
use contract_protocol::{CheckId, PathGlobs, ShellConfig, Violation};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Matches any accepted wrapper as a whole word
pub fn wrapper_matcher(wrappers: &[String]) -> Result<Regex> {
    let alternatives: Vec<String> = wrappers
        .iter()
        .map(|name| regex::escape(name.trim()))
        .collect();
    let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
    Regex::new(&pattern).map_err(|err| RuleError::invalid_pattern("shell.wrappers", err))
}

pub fn check(ctx: &CheckContext<'_>) -> Vec<Violation> {
    let Some(section) = ctx.config.shell.as_ref() else {
        return Vec::new();
    };
    let exempt = match PathGlobs::new(&section.exempt) {
        Ok(globs) => globs,
        Err(err) => return vec![Violation::config_error(CheckId::Shell, "shell.exempt", err)],
    };
    let matcher = match wrapper_matcher(&section.wrappers) {
        Ok(matcher) => matcher,
        Err(err) => return vec![Violation::config_error(CheckId::Shell, "shell.wrappers", err)],
    };

    let routes_dir = ctx.resolve(&section.routes_dir);
    if !routes_dir.is_dir() {
        return vec![Violation::config_error(
            CheckId::Shell,
            &section.routes_dir,
            format!("routes_dir {} is not a directory", section.routes_dir),
        )];
    }

    let mut violations = Vec::new();
    for file in ctx.files() {
        if !is_route_file(&routes_dir, file.path()) || exempt.is_match(file.rel_path()) {
            continue;
        }
        let Some(text) = file.text() else {
            continue;
        };
        if !matcher.is_match(text) {
            violations.push(
                Violation::error(
                    CheckId::Shell,
                    file.rel_path(),
                    format!(
                        "route does not render a layout wrapper (expected one of: {})",
                        section.wrappers.join(", ")
                    ),
                )
                .with_hint(wrapper_hint(section)),
            );
        }
    }

    match orphan_routes(ctx, &routes_dir, &exempt) {
        Ok(orphans) => violations.extend(orphans),
        Err(err) => {
            violations.push(Violation::config_error(CheckId::Shell, &section.routes_dir, err))
        }
    }

    violations
}

/// Top-level script files of the routes directory only
fn is_route_file(routes_dir: &Path, path: &Path) -> bool {
    path.parent() == Some(routes_dir) && SourceLanguage::from_path(path).is_script()
}

fn wrapper_hint(section: &ShellConfig) -> String {
    match section.wrappers.first() {
        Some(first) => format!("Wrap the page content in <{first}>"),
        None => String::new(),
    }
}

/// Route files on disk that no entry reaches
fn orphan_routes(
    ctx: &CheckContext<'_>,
    routes_dir: &Path,
    exempt: &PathGlobs,
) -> Result<Vec<Violation>> {
    let mut on_disk: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(routes_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| RuleError::Walk {
            path: routes_dir.to_path_buf(),
            message: err.to_string(),
        })?;
        if entry.file_type().is_file() && is_route_file(routes_dir, entry.path()) {
            on_disk.push(normalize_path(entry.path()));
        }
    }

    Ok(on_disk
        .into_iter()
        .filter(|path| !ctx.reachable.contains(path))
        .map(|path| ctx.rel(&path))
        .filter(|rel| !exempt.is_match(rel))
        .map(|rel| {
            Violation::warning(
                CheckId::Shell,
                rel,
                "orphan route: not reachable from any entry",
            )
            .with_hint("Register the route or delete the file")
        })
        .collect())
}
