use crate::context::CheckContext;
use crate::error::{Result, RuleError};
use contract_protocol::{CheckId, Level, PathGlobs, PatternRule, PatternsConfig, Violation};
use regex::Regex;

const SNIPPET_MAX_CHARS: usize = 80;

/// A single regex hit inside one text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// 1-based
    pub line: usize,
    pub text: String,
}

/// Every non-empty match of `pattern` in `text`, in order. Knows nothing about files.
pub fn scan_text(pattern: &Regex, text: &str) -> Vec<PatternMatch> {
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
        .collect();

    pattern
        .find_iter(text)
        .filter(|found| !found.is_empty())
        .map(|found| {
            let line = line_starts.partition_point(|start| *start <= found.start());
            PatternMatch {
                line,
                text: snippet(found.as_str()),
            }
        })
        .collect()
}

fn snippet(raw: &str) -> String {
    let one_line = raw.lines().next().unwrap_or(raw).trim();
    if one_line.chars().count() <= SNIPPET_MAX_CHARS {
        return one_line.to_string();
    }
    let mut cut: String = one_line.chars().take(SNIPPET_MAX_CHARS).collect();
    cut.push('…');
    cut
}

/// A pattern rule with its regex and exception globs compiled
#[derive(Debug)]
pub struct CompiledRule {
    pub id: String,
    pub regex: Regex,
    pub hint: String,
    pub level: Level,
    exceptions: PathGlobs,
}

impl CompiledRule {
    pub fn compile(rule: &PatternRule, exceptions: &[String]) -> Result<Self> {
        let regex =
            Regex::new(&rule.pattern).map_err(|err| RuleError::invalid_pattern(&rule.id, err))?;
        if regex.is_match("") {
            return Err(RuleError::invalid_pattern(
                &rule.id,
                "pattern matches the empty string",
            ));
        }
        Ok(Self {
            id: rule.id.clone(),
            regex,
            hint: rule.hint.clone(),
            level: rule.level,
            exceptions: PathGlobs::new(exceptions)?,
        })
    }

    /// Exceptions only exempt files from this rule
    pub fn is_excepted(&self, rel_path: &str) -> bool {
        self.exceptions.is_match(rel_path)
    }
}

pub fn check(ctx: &CheckContext<'_>) -> Vec<Violation> {
    let Some(section) = ctx.config.patterns.as_ref() else {
        return Vec::new();
    };

    let mut violations = Vec::new();
    let scan = match PathGlobs::new(&section.scan) {
        Ok(globs) => globs,
        Err(err) => return vec![Violation::config_error(CheckId::Patterns, "patterns.scan", err)],
    };

    let rules = compile_rules(section, &mut violations);

    for file in ctx.files() {
        if !scan.is_empty() && !scan.is_match(file.rel_path()) {
            continue;
        }
        let Some(text) = file.text() else {
            continue;
        };
        for rule in &rules {
            if rule.is_excepted(file.rel_path()) {
                log::debug!("{}: excepted from {}", file.rel_path(), rule.id);
                continue;
            }
            for found in scan_text(&rule.regex, text) {
                violations.push(
                    Violation::new(
                        CheckId::Patterns,
                        rule.level,
                        file.rel_path(),
                        format!("{}: `{}`", rule.id, found.text),
                    )
                    .with_hint(rule.hint.clone())
                    .at_line(found.line),
                );
            }
        }
    }

    violations
}

/// A broken rule is reported and dropped; the remaining rules still scan.
fn compile_rules(section: &PatternsConfig, violations: &mut Vec<Violation>) -> Vec<CompiledRule> {
    for id in section.exceptions.keys() {
        if !section.rules.iter().any(|rule| &rule.id == id) {
            violations.push(Violation::config_error(
                CheckId::Patterns,
                id,
                format!("exceptions name unknown rule '{id}'"),
            ));
        }
    }

    let mut rules = Vec::with_capacity(section.rules.len());
    for rule in &section.rules {
        let exceptions = section
            .exceptions
            .get(&rule.id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        match CompiledRule::compile(rule, exceptions) {
            Ok(compiled) => rules.push(compiled),
            Err(err) => violations.push(Violation::config_error(CheckId::Patterns, &rule.id, err)),
        }
    }
    rules
}
