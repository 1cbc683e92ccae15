use contract_graph::{GraphBuilder, GraphError};
use contract_imports::{normalize_path, ImportExtractor, ImportResolver, ResolverConfig};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, body: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, body).unwrap();
    normalize_path(&path)
}

fn builder(root: &Path) -> GraphBuilder {
    let config = ResolverConfig::new(root).alias("@/", "src/");
    let resolver = ImportResolver::new(config).expect("resolver");
    GraphBuilder::new(ImportExtractor::new(resolver), "src")
}

fn app(root: &Path) {
    write(
        root,
        "src/main.tsx",
        "import App from './App';\nimport './styles.css';\n",
    );
    write(
        root,
        "src/App.tsx",
        "import { Home } from '@/pages/Home';\nimport React from 'react';\nexport default function App() { return <Home />; }\n",
    );
    write(
        root,
        "src/pages/Home.tsx",
        "import { Card } from '../components';\nexport const Home = () => <Card />;\n",
    );
    write(
        root,
        "src/components/index.ts",
        "export { Card } from './Card';\n",
    );
    write(
        root,
        "src/components/Card.tsx",
        "export const Card = () => <div />;\n",
    );
    write(root, "src/styles.css", "body { margin: 0; }\n");
    write(
        root,
        "src/components/Unused.tsx",
        "export const Unused = () => null;\n",
    );
}

#[test]
fn reachable_set_follows_aliases_barrels_and_assets() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    app(root);

    let set = builder(root).build(&["src/main.tsx"]).unwrap();
    let rel: Vec<String> = set.rel_paths().into_iter().collect();

    assert_eq!(
        rel,
        [
            "src/App.tsx",
            "src/components/Card.tsx",
            "src/components/index.ts",
            "src/main.tsx",
            "src/pages/Home.tsx",
            "src/styles.css",
        ]
    );
}

#[test]
fn repeated_builds_yield_the_same_set() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    app(root);

    let first = builder(root).build(&["src/main.tsx"]).unwrap();
    let second = builder(root).build(&["src/main.tsx"]).unwrap();
    assert_eq!(first.paths(), second.paths());
}

#[test]
fn import_cycles_terminate() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/a.ts", "import { b } from './b';\nexport const a = 1;\n");
    write(root, "src/b.ts", "import { a } from './a';\nexport const b = 2;\n");

    let set = builder(root).build(&["src/a.ts"]).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.graph().edge_count(), 2);
}

#[test]
fn dynamic_imports_are_followed() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "src/main.ts",
        "const Settings = () => import('./pages/Settings');\n",
    );
    write(root, "src/pages/Settings.tsx", "export default () => null;\n");

    let set = builder(root).build(&["src/main.ts"]).unwrap();
    assert!(set.contains(&normalize_path(&root.join("src/pages/Settings.tsx"))));
}

#[test]
fn missing_entry_aborts_the_run() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/main.ts", "export {};\n");

    let err = builder(root)
        .build(&["src/main.ts", "src/admin.ts"])
        .unwrap_err();
    match err {
        GraphError::MissingEntry(path) => assert!(path.ends_with("src/admin.ts")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn import_chain_starts_at_an_entry() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    app(root);

    let set = builder(root).build(&["src/main.tsx"]).unwrap();
    let card = normalize_path(&root.join("src/components/Card.tsx"));
    let chain: Vec<String> = set
        .import_chain(&card)
        .unwrap()
        .iter()
        .map(|p| contract_protocol::relative_display(root, p))
        .collect();

    assert_eq!(
        chain,
        [
            "src/main.tsx",
            "src/App.tsx",
            "src/pages/Home.tsx",
            "src/components/index.ts",
            "src/components/Card.tsx",
        ]
    );

    let unused = normalize_path(&root.join("src/components/Unused.tsx"));
    assert!(set.import_chain(&unused).is_none());
}
