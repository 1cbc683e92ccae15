use contract_imports::{ImportEdge, ImportExtractor, ImportKind, SourceLanguage};
use contract_protocol::relative_display;
use once_cell::unsync::OnceCell;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Why a file contributes no import edges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub message: String,
}

enum SourceText {
    Text(String),
    /// Asset bytes that are not UTF-8 (images, fonts); never scanned
    Binary,
    Unreadable(String),
}

/// One file of the analysed tree. Imports are parsed on first request and
/// memoised for the rest of the run.
pub struct SourceFile {
    path: PathBuf,
    rel_path: String,
    language: SourceLanguage,
    text: SourceText,
    imports: OnceCell<Result<Vec<ImportEdge>, ParseFailure>>,
}

impl SourceFile {
    pub fn load(root: &Path, path: PathBuf) -> Self {
        let language = SourceLanguage::from_path(&path);
        let text = match fs::read(&path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => SourceText::Text(text),
                Err(_) if !language.is_script() => SourceText::Binary,
                Err(_) => SourceText::Unreadable("source is not valid UTF-8".to_string()),
            },
            Err(err) => SourceText::Unreadable(format!("cannot read file: {err}")),
        };
        Self::with_text(root, path, language, text)
    }

    pub fn from_text(root: &Path, path: PathBuf, text: impl Into<String>) -> Self {
        let language = SourceLanguage::from_path(&path);
        Self::with_text(root, path, language, SourceText::Text(text.into()))
    }

    fn with_text(root: &Path, path: PathBuf, language: SourceLanguage, text: SourceText) -> Self {
        Self {
            rel_path: relative_display(root, &path),
            path,
            language,
            text,
            imports: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root-relative forward-slash path, used as violation subject
    pub fn rel_path(&self) -> &str {
        &self.rel_path
    }

    pub fn language(&self) -> SourceLanguage {
        self.language
    }

    pub fn text(&self) -> Option<&str> {
        match &self.text {
            SourceText::Text(text) => Some(text),
            SourceText::Binary | SourceText::Unreadable(_) => None,
        }
    }

    /// Parse on first call; later calls return the memoised result.
    pub fn imports(
        &self,
        extractor: &mut ImportExtractor,
    ) -> &Result<Vec<ImportEdge>, ParseFailure> {
        self.imports.get_or_init(|| match &self.text {
            SourceText::Text(text) => extractor
                .extract(&self.path, text)
                .map_err(|err| ParseFailure {
                    message: err.to_string(),
                }),
            SourceText::Binary => Ok(Vec::new()),
            SourceText::Unreadable(message) => {
                if self.language.is_script() {
                    Err(ParseFailure {
                        message: message.clone(),
                    })
                } else {
                    Ok(Vec::new())
                }
            }
        })
    }

    /// Edges parsed during the walk; empty when parsing failed or never ran.
    pub fn parsed_imports(&self) -> &[ImportEdge] {
        match self.imports.get() {
            Some(Ok(edges)) => edges.as_slice(),
            _ => &[],
        }
    }

    pub fn parse_failure(&self) -> Option<&ParseFailure> {
        match self.imports.get() {
            Some(Err(failure)) => Some(failure),
            _ => None,
        }
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

/// Followed import edges between reachable files
pub struct ImportGraph {
    /// Directed graph (importer -> imported)
    pub graph: DiGraph<PathBuf, ImportKind>,

    /// File path -> NodeIndex mapping for fast lookup
    pub file_index: HashMap<PathBuf, NodeIndex>,
}

impl ImportGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            file_index: HashMap::new(),
        }
    }

    /// Add a file node once; repeated calls return the same index
    pub fn add_file(&mut self, path: &Path) -> NodeIndex {
        if let Some(idx) = self.file_index.get(path) {
            return *idx;
        }
        let idx = self.graph.add_node(path.to_path_buf());
        self.file_index.insert(path.to_path_buf(), idx);
        idx
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: &Path, kind: ImportKind) {
        let to = self.add_file(to);
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, kind);
        }
    }

    pub fn find_file(&self, path: &Path) -> Option<NodeIndex> {
        self.file_index.get(path).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for ImportGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Files transitively imported from the entries. Built once per run; read-only.
pub struct ReachableSet {
    pub(crate) root: PathBuf,
    pub(crate) entries: Vec<PathBuf>,
    pub(crate) files: BTreeMap<PathBuf, SourceFile>,
    pub(crate) graph: ImportGraph,
}

impl ReachableSet {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    pub fn get(&self, path: &Path) -> Option<&SourceFile> {
        self.files.get(path)
    }

    /// Files in path order
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    /// Order-independent identity of the set
    pub fn paths(&self) -> BTreeSet<PathBuf> {
        self.files.keys().cloned().collect()
    }

    pub fn rel_paths(&self) -> BTreeSet<String> {
        self.files
            .values()
            .map(|file| file.rel_path().to_string())
            .collect()
    }

    pub fn graph(&self) -> &ImportGraph {
        &self.graph
    }

    pub fn parse_failures(&self) -> impl Iterator<Item = (&SourceFile, &ParseFailure)> {
        self.files
            .values()
            .filter_map(|file| file.parse_failure().map(|failure| (file, failure)))
    }
}

impl std::fmt::Debug for ReachableSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReachableSet")
            .field("entries", &self.entries)
            .field("files", &self.files.len())
            .field("edges", &self.graph.edge_count())
            .finish()
    }
}
