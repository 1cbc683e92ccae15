use crate::context::CheckContext;
use contract_protocol::{CheckId, Violation};

/// Literal specifier rules. External and unresolved specifiers are matched too.
pub fn check(ctx: &CheckContext<'_>) -> Vec<Violation> {
    let rules = &ctx.config.banned_imports;
    if rules.is_empty() {
        return Vec::new();
    }

    let mut violations = Vec::new();
    for file in ctx.files() {
        for edge in file.parsed_imports() {
            if edge.type_only {
                continue;
            }
            for rule in rules.iter().filter(|rule| rule.matches(&edge.specifier)) {
                violations.push(
                    Violation::error(
                        CheckId::Imports,
                        file.rel_path(),
                        format!("imports '{}' (banned by {})", edge.specifier, rule.id),
                    )
                    .with_hint(rule.hint.clone())
                    .at_line(edge.line),
                );
            }
        }
    }
    violations
}
