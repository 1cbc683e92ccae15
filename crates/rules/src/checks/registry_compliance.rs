use crate::context::CheckContext;
use crate::registry::{ComponentStatus, Registry, RegistryEntry};
use contract_imports::{
    is_barrel, module_base_name, ImportBinding, ImportEdge, ImportKind, SourceLanguage,
};
use contract_protocol::{CheckId, Level, PathGlobs, Violation};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// What one import asks the registry about
#[derive(Debug, Clone, PartialEq, Eq)]
enum Lookup {
    Component(String),
    /// `import * as ui from './components'` and friends: members cannot be checked one by one
    WholeBarrel(&'static str),
}

pub fn check(ctx: &CheckContext<'_>) -> Vec<Violation> {
    let (Some(section), Some(loaded)) = (ctx.config.registry.as_ref(), ctx.registry) else {
        return Vec::new();
    };
    let registry = match loaded {
        Ok(registry) => registry,
        Err(err) => return vec![Violation::config_error(CheckId::Registry, &section.table, err)],
    };
    let ignore = match PathGlobs::new(&section.ignore) {
        Ok(globs) => globs,
        Err(err) => {
            return vec![Violation::config_error(CheckId::Registry, "registry.ignore", err)]
        }
    };

    let scope = RegistryScope {
        component_root: ctx.resolve(&section.component_root),
        ignore,
    };

    let mut violations = Vec::new();
    for file in ctx.files() {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        for edge in file.parsed_imports() {
            let Some(target) = scope.target_of(ctx, edge) else {
                continue;
            };
            for lookup in lookups(edge, target, scope.is_root_barrel(target)) {
                let key = match &lookup {
                    Lookup::Component(name) => name.clone(),
                    Lookup::WholeBarrel(how) => format!("{how} {}", edge.specifier),
                };
                if !seen.insert(key) {
                    continue;
                }
                if let Some(violation) =
                    judge(registry, &lookup, edge, file.rel_path(), ctx.strict)
                {
                    violations.push(violation);
                }
            }
        }
    }

    log::debug!(
        "registry: {} violations against {} entries",
        violations.len(),
        registry.len()
    );
    violations
}

struct RegistryScope {
    component_root: PathBuf,
    ignore: PathGlobs,
}

impl RegistryScope {
    /// The resolved component file, when this edge is subject to the registry
    fn target_of<'e>(&self, ctx: &CheckContext<'_>, edge: &'e ImportEdge) -> Option<&'e Path> {
        if edge.type_only || edge.kind == ImportKind::ReExport {
            return None;
        }
        let target = edge.resolved.as_deref()?;
        if !target.starts_with(&self.component_root) {
            return None;
        }
        if !SourceLanguage::from_path(target).is_script() {
            return None;
        }
        if self.ignore.is_match(&ctx.rel(target)) {
            return None;
        }
        Some(target)
    }

    /// `index` module sitting directly in the component root; its directory name is no component
    fn is_root_barrel(&self, target: &Path) -> bool {
        is_barrel(target) && target.parent() == Some(self.component_root.as_path())
    }
}

fn lookups(edge: &ImportEdge, target: &Path, root_barrel: bool) -> Vec<Lookup> {
    if edge.bindings.is_empty() {
        if is_barrel(target) && edge.kind == ImportKind::SideEffect {
            return Vec::new();
        }
        if root_barrel {
            return vec![Lookup::WholeBarrel("dynamic")];
        }
        // side-effect and dynamic imports name the module itself
        return module_base_name(target)
            .map(Lookup::Component)
            .into_iter()
            .collect();
    }

    edge.bindings
        .iter()
        .filter_map(|binding| match binding {
            ImportBinding::Namespace { .. } if is_barrel(target) => {
                Some(Lookup::WholeBarrel("namespace"))
            }
            ImportBinding::Namespace { .. } => module_base_name(target).map(Lookup::Component),
            ImportBinding::Default { .. } if root_barrel => Some(Lookup::WholeBarrel("default")),
            other => other.component_name().map(|name| Lookup::Component(name.to_string())),
        })
        .collect()
}

fn judge(
    registry: &Registry,
    lookup: &Lookup,
    edge: &ImportEdge,
    subject: &str,
    strict: bool,
) -> Option<Violation> {
    let name = match lookup {
        Lookup::Component(name) => name,
        Lookup::WholeBarrel(how) => {
            return Some(
                Violation::error(
                    CheckId::Registry,
                    subject,
                    format!(
                        "{how} import of barrel '{}' cannot be checked against the registry",
                        edge.specifier
                    ),
                )
                .with_hint("Import the components by name")
                .at_line(edge.line),
            );
        }
    };

    let Some(entry) = registry.get(name) else {
        return Some(
            Violation::error(
                CheckId::Registry,
                subject,
                format!("imports {name}, which is not in the component registry"),
            )
            .with_hint("Register the component or import a registered one")
            .at_line(edge.line),
        );
    };

    let level = match entry.status {
        ComponentStatus::Canonical => return None,
        ComponentStatus::Compat if strict => Level::Error,
        ComponentStatus::Compat => Level::Warning,
        ComponentStatus::Legacy | ComponentStatus::Forbidden => Level::Error,
    };

    let mut violation =
        Violation::new(CheckId::Registry, level, subject, status_message(entry)).at_line(edge.line);
    if let Some(note) = &entry.note {
        violation = violation.with_hint(note.clone());
    }
    Some(violation)
}

fn status_message(entry: &RegistryEntry) -> String {
    match entry.replacement.as_deref().filter(|r| !r.trim().is_empty()) {
        Some(replacement) => format!(
            "imports {} ({}). Replace with {}.",
            entry.name, entry.status, replacement
        ),
        None => format!("imports {} ({}).", entry.name, entry.status),
    }
}
