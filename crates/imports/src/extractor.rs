use crate::error::{ImportError, Result};
use crate::language::SourceLanguage;
use crate::resolver::ImportResolver;
use crate::types::{module_base_name, ImportBinding, ImportEdge, ImportKind};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Import declaration as written, before resolution
struct RawImport {
    specifier: String,
    bindings: Vec<RawBinding>,
    type_only: bool,
    kind: ImportKind,
    line: usize,
}

enum RawBinding {
    Default { local: String },
    Named { imported: String, local: String },
    Namespace { local: String },
}

/// Tree-sitter based import extractor. Reads declarations only, never evaluates.
pub struct ImportExtractor {
    resolver: ImportResolver,
    parsers: HashMap<SourceLanguage, Parser>,
}

impl ImportExtractor {
    pub fn new(resolver: ImportResolver) -> Self {
        Self {
            resolver,
            parsers: HashMap::new(),
        }
    }

    pub fn resolver(&self) -> &ImportResolver {
        &self.resolver
    }

    /// Parse `content` as the file at `path` and return its resolved import edges.
    ///
    /// Non-script files yield no edges. A tree with syntax errors is an
    /// [`ImportError::ParseError`] naming the first broken line.
    pub fn extract(&mut self, path: &Path, content: &str) -> Result<Vec<ImportEdge>> {
        let language = SourceLanguage::from_path(path);
        if !language.is_script() {
            return Ok(Vec::new());
        }

        let parser = self.parser(language)?;
        let tree = parser
            .parse(content, None)
            .ok_or_else(|| ImportError::parse("Failed to parse source code"))?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(root).unwrap_or(1);
            return Err(ImportError::parse(format!(
                "syntax error near line {line} ({})",
                language.as_str()
            )));
        }

        let raw = collect_imports(root, content.as_bytes());
        let edges = raw
            .into_iter()
            .map(|import| self.resolve_import(path, import))
            .collect();
        Ok(edges)
    }

    fn parser(&mut self, language: SourceLanguage) -> Result<&mut Parser> {
        match self.parsers.entry(language) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let ts_language = language.tree_sitter_language()?;
                let mut parser = Parser::new();
                parser.set_language(&ts_language).map_err(|e| {
                    ImportError::tree_sitter(format!("Failed to set language: {e}"))
                })?;
                Ok(entry.insert(parser))
            }
        }
    }

    fn resolve_import(&self, from: &Path, import: RawImport) -> ImportEdge {
        let resolved = self.resolver.resolve(from, &import.specifier).into_local();

        let module_name = resolved
            .as_deref()
            .and_then(module_base_name)
            .or_else(|| specifier_base_name(&import.specifier));

        let bindings = import
            .bindings
            .into_iter()
            .map(|binding| match binding {
                RawBinding::Default { local } => ImportBinding::Default {
                    name: module_name.clone().unwrap_or_else(|| local.clone()),
                    local,
                },
                RawBinding::Named { imported, local } => ImportBinding::Named { imported, local },
                RawBinding::Namespace { local } => ImportBinding::Namespace { local },
            })
            .collect();

        ImportEdge {
            from: from.to_path_buf(),
            specifier: import.specifier,
            resolved,
            bindings,
            type_only: import.type_only,
            kind: import.kind,
            line: import.line,
        }
    }
}

/// Last path segment of an unresolved specifier, without extension
fn specifier_base_name(specifier: &str) -> Option<String> {
    let specifier = specifier.split(['?', '#']).next().unwrap_or(specifier);
    let segment = specifier.rsplit('/').find(|s| !s.is_empty() && *s != "." && *s != "..")?;
    module_base_name(Path::new(segment))
}

fn collect_imports(root: Node, source: &[u8]) -> Vec<RawImport> {
    let mut imports = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        match node.kind() {
            "import_statement" => {
                if let Some(import) = import_statement(node, source) {
                    imports.push(import);
                }
                continue;
            }
            "export_statement" if node.child_by_field_name("source").is_some() => {
                if let Some(import) = reexport_statement(node, source) {
                    imports.push(import);
                }
                continue;
            }
            "call_expression" => {
                if let Some(import) = dynamic_import(node, source) {
                    imports.push(import);
                }
            }
            _ => {}
        }

        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    imports.sort_by_key(|import| import.line);
    imports
}

fn import_statement(node: Node, source: &[u8]) -> Option<RawImport> {
    let line = node.start_position().row + 1;
    let mut type_only = has_type_keyword(node);

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();

    // import x = require('y')
    if let Some(require) = children.iter().find(|c| c.kind() == "import_require_clause") {
        let specifier = string_literal(require.child_by_field_name("source")?, source)?;
        let local = first_named_child_text(*require, "identifier", source)?;
        return Some(RawImport {
            specifier,
            bindings: vec![RawBinding::Default { local }],
            type_only,
            kind: ImportKind::Static,
            line,
        });
    }

    let specifier = string_literal(node.child_by_field_name("source")?, source)?;

    let Some(clause) = children.iter().find(|c| c.kind() == "import_clause") else {
        return Some(RawImport {
            specifier,
            bindings: Vec::new(),
            type_only,
            kind: ImportKind::SideEffect,
            line,
        });
    };

    let mut bindings = Vec::new();
    let mut skipped_type_specifiers = 0usize;

    let mut clause_cursor = clause.walk();
    for part in clause.named_children(&mut clause_cursor) {
        match part.kind() {
            "identifier" => bindings.push(RawBinding::Default {
                local: node_text(part, source)?,
            }),
            "namespace_import" => {
                if let Some(local) = first_named_child_text(part, "identifier", source) {
                    bindings.push(RawBinding::Namespace { local });
                }
            }
            "named_imports" => {
                let mut spec_cursor = part.walk();
                for spec in part.named_children(&mut spec_cursor) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    if has_type_keyword(spec) {
                        skipped_type_specifiers += 1;
                        continue;
                    }
                    if let Some(binding) = specifier_binding(spec, source) {
                        bindings.push(binding);
                    }
                }
            }
            _ => {}
        }
    }

    // `import { type A, type B } from './x'` is erased entirely
    if bindings.is_empty() && skipped_type_specifiers > 0 {
        type_only = true;
    }

    Some(RawImport {
        specifier,
        bindings,
        type_only,
        kind: ImportKind::Static,
        line,
    })
}

fn specifier_binding(spec: Node, source: &[u8]) -> Option<RawBinding> {
    let imported = module_export_name(spec.child_by_field_name("name")?, source)?;
    let local = match spec.child_by_field_name("alias") {
        Some(alias) => node_text(alias, source)?,
        None => imported.clone(),
    };
    if imported == "default" {
        return Some(RawBinding::Default { local });
    }
    Some(RawBinding::Named { imported, local })
}

fn reexport_statement(node: Node, source: &[u8]) -> Option<RawImport> {
    let line = node.start_position().row + 1;
    let specifier = string_literal(node.child_by_field_name("source")?, source)?;
    let mut type_only = has_type_keyword(node);

    let mut bindings = Vec::new();
    let mut skipped_type_specifiers = 0usize;

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "export_clause" => {
                let mut spec_cursor = child.walk();
                for spec in child.named_children(&mut spec_cursor) {
                    if spec.kind() != "export_specifier" {
                        continue;
                    }
                    if has_type_keyword(spec) {
                        skipped_type_specifiers += 1;
                        continue;
                    }
                    let Some(name_node) = spec.child_by_field_name("name") else {
                        continue;
                    };
                    let Some(imported) = module_export_name(name_node, source) else {
                        continue;
                    };
                    let local = spec
                        .child_by_field_name("alias")
                        .and_then(|alias| module_export_name(alias, source))
                        .unwrap_or_else(|| imported.clone());
                    bindings.push(RawBinding::Named { imported, local });
                }
            }
            "namespace_export" => {
                if let Some(local) = last_named_text(child, source) {
                    bindings.push(RawBinding::Namespace { local });
                }
            }
            _ => {}
        }
    }

    if bindings.is_empty() && skipped_type_specifiers > 0 {
        type_only = true;
    }

    Some(RawImport {
        specifier,
        bindings,
        type_only,
        kind: ImportKind::ReExport,
        line,
    })
}

fn dynamic_import(node: Node, source: &[u8]) -> Option<RawImport> {
    let function = node.child_by_field_name("function")?;
    if function.kind() != "import" {
        return None;
    }
    let arguments = node.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let first = arguments.named_children(&mut cursor).next()?;
    if first.kind() != "string" {
        // computed specifiers cannot be followed statically
        return None;
    }
    Some(RawImport {
        specifier: string_literal(first, source)?,
        bindings: Vec::new(),
        type_only: false,
        kind: ImportKind::Dynamic,
        line: node.start_position().row + 1,
    })
}

/// `type` / `typeof` keyword as a direct child marks a type-only declaration or specifier
fn has_type_keyword(node: Node) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && matches!(child.kind(), "type" | "typeof"));
    found
}

fn module_export_name(node: Node, source: &[u8]) -> Option<String> {
    if node.kind() == "string" {
        string_literal(node, source)
    } else {
        node_text(node, source)
    }
}

fn string_literal(node: Node, source: &[u8]) -> Option<String> {
    let raw = node.utf8_text(source).ok()?;
    let trimmed = raw.trim_matches(|c| c == '\'' || c == '"' || c == '`');
    Some(trimmed.to_string())
}

fn node_text(node: Node, source: &[u8]) -> Option<String> {
    node.utf8_text(source).ok().map(str::to_string)
}

fn first_named_child_text(node: Node, kind: &str, source: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| child.kind() == kind);
    found.and_then(|child| node_text(child, source))
}

fn last_named_text(node: Node, source: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    let last = node.named_children(&mut cursor).last();
    last.and_then(|child| module_export_name(child, source))
}

fn first_error_line(root: Node) -> Option<usize> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn extractor() -> ImportExtractor {
        let resolver = ImportResolver::new(ResolverConfig::new("/virtual")).unwrap();
        ImportExtractor::new(resolver)
    }

    fn extract(path: &str, code: &str) -> Vec<ImportEdge> {
        extractor()
            .extract(&PathBuf::from(path), code)
            .expect("extraction failed")
    }

    #[test]
    fn named_imports_register_original_name() {
        let edges = extract("/virtual/src/App.tsx", "import { Foo as Bar } from 'ui';\n");
        assert_eq!(
            edges[0].bindings,
            vec![ImportBinding::Named {
                imported: "Foo".into(),
                local: "Bar".into()
            }]
        );
    }

    #[test]
    fn default_import_of_unresolved_module_uses_specifier_name() {
        let edges = extract(
            "/virtual/src/App.tsx",
            "import Header from './components/Header';\n",
        );
        assert_eq!(
            edges[0].bindings,
            vec![ImportBinding::Default {
                local: "Header".into(),
                name: "Header".into()
            }]
        );
        assert_eq!(edges[0].kind, ImportKind::Static);
        assert!(edges[0].resolved.is_none());
    }

    #[test]
    fn renamed_default_import_keeps_module_name() {
        let edges = extract("/virtual/src/App.tsx", "import Shell from './layout/PageShell';\n");
        assert_eq!(
            edges[0].bindings[0].component_name(),
            Some("PageShell"),
        );
    }

    #[test]
    fn type_only_declarations_and_specifiers_are_marked() {
        let code = r#"
import type { Props } from './types';
import { type Theme, Button } from './ui';
import { type Only } from './only';
"#;
        let edges = extract("/virtual/src/App.tsx", code);
        assert_eq!(edges.len(), 3);
        assert!(edges[0].type_only);
        assert!(!edges[1].type_only);
        assert_eq!(
            edges[1].bindings,
            vec![ImportBinding::Named {
                imported: "Button".into(),
                local: "Button".into()
            }]
        );
        assert!(edges[2].type_only);
    }

    #[test]
    fn namespace_side_effect_and_default_forms() {
        let code = r#"
import * as Icons from './icons';
import './index.css';
import React, { useState } from 'react';
import { default as Card } from './Card';
"#;
        let edges = extract("/virtual/src/main.tsx", code);
        assert_eq!(
            edges[0].bindings,
            vec![ImportBinding::Namespace {
                local: "Icons".into()
            }]
        );
        assert_eq!(edges[1].kind, ImportKind::SideEffect);
        assert!(edges[1].bindings.is_empty());
        assert_eq!(edges[2].bindings.len(), 2);
        assert_eq!(edges[3].bindings[0].component_name(), Some("Card"));
    }

    #[test]
    fn reexports_and_dynamic_imports_are_edges() {
        let code = r#"
export { Button, Card as Tile } from './Button';
export * from './Layout';
export type { ButtonProps } from './Button.types';
const Pricing = lazy(() => import('./pages/Pricing'));
export const load = () => import(`./pages/${name}`);
"#;
        let edges = extract("/virtual/src/components/index.ts", code);
        let kinds: Vec<ImportKind> = edges.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ImportKind::ReExport,
                ImportKind::ReExport,
                ImportKind::ReExport,
                ImportKind::Dynamic
            ]
        );
        assert_eq!(edges[0].bindings.len(), 2);
        assert!(edges[2].type_only);
        assert_eq!(edges[3].specifier, "./pages/Pricing");
    }

    #[test]
    fn javascript_files_with_jsx_parse() {
        let code = "import Hero from './Hero';\nexport default () => <Hero title=\"x\" />;\n";
        let edges = extract("/virtual/src/pages/Home.jsx", code);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].line, 1);
    }

    #[test]
    fn broken_files_are_parse_errors() {
        let err = extractor()
            .extract(
                &PathBuf::from("/virtual/src/Broken.tsx"),
                "import { from './x';\nconst = ;\n",
            )
            .unwrap_err();
        assert!(matches!(err, ImportError::ParseError(_)), "{err}");
    }

    #[test]
    fn assets_have_no_edges() {
        let edges = extract("/virtual/src/index.css", "@import url('./x.css');");
        assert!(edges.is_empty());
    }
}
