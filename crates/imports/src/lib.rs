//! # Contract Imports
//!
//! Static import analysis for TypeScript / JavaScript / JSX sources.
//!
//! ## Architecture
//!
//! ```text
//! Source file
//!     │
//!     ├──> Language detection (from extension)
//!     │
//!     ├──> Tree-sitter parsing → AST
//!     │      └─ syntax errors → ImportError::ParseError
//!     │
//!     ├──> Import extraction
//!     │      ├─ import / export-from / import() declarations
//!     │      ├─ type-only declarations and specifiers marked
//!     │      └─ original exported names kept over local renames
//!     │
//!     └──> Resolution
//!            ├─ alias prefix → configured root
//!            ├─ ./ ../ → importing file's directory
//!            ├─ exact → +extension → dir/index+extension
//!            └─ anything else → external package
//! ```
//!
//! ## Example
//!
//! ```rust
//! use contract_imports::{ImportExtractor, ImportResolver, ResolverConfig};
//! use std::path::Path;
//!
//! let resolver = ImportResolver::new(ResolverConfig::new("/repo").alias("@/", "src/")).unwrap();
//! let mut extractor = ImportExtractor::new(resolver);
//!
//! let edges = extractor
//!     .extract(Path::new("/repo/src/App.tsx"), "import { Foo as Bar } from '@/ui';")
//!     .unwrap();
//! assert_eq!(edges[0].bindings[0].component_name(), Some("Foo"));
//! ```

mod config;
mod error;
mod extractor;
mod language;
mod resolver;
mod types;

pub use config::ResolverConfig;
pub use error::{ImportError, Result};
pub use extractor::ImportExtractor;
pub use language::SourceLanguage;
pub use resolver::{normalize_path, ImportResolver};
pub use types::{is_barrel, module_base_name, ImportBinding, ImportEdge, ImportKind, Resolution};
