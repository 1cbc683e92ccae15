//! # Contract Graph
//!
//! Reachability over the import graph of a front-end source tree.
//!
//! ## Features
//!
//! - **Worklist traversal** - every file transitively imported from the entries, visited once
//! - **Memoised parsing** - each file's imports are extracted at most once per run
//! - **Import chains** - explain why a file is reachable
//!
//! ## Architecture
//!
//! ```text
//! entries
//!     │
//!     ├──> Graph Builder (worklist)
//!     │      ├─ Load SourceFile (text or asset)
//!     │      ├─ Extract imports (contract-imports)
//!     │      └─ Follow local, non-type-only edges inside the source root
//!     │
//!     └──> ReachableSet
//!            ├─ Files in path order, each with memoised imports
//!            └─ ImportGraph (petgraph) for chain queries
//! ```

mod builder;
mod error;
mod graph;
mod types;

pub use builder::GraphBuilder;
pub use error::{GraphError, Result};
pub use types::{ImportGraph, ParseFailure, ReachableSet, SourceFile};
