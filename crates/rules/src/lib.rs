//! # Contract Rules
//!
//! The checks a `contract-gate` run applies to a reachable set.
//!
//! - **parse** - files whose imports could not be extracted
//! - **registry** - component imports against the lifecycle registry
//! - **patterns** - banned regexes over raw source text
//! - **imports** - banned import specifiers
//! - **shell** - route files must render a layout wrapper
//! - **budgets** - byte and occurrence ceilings
//! - **cross-ref** - route blueprints against shared data keys
//!
//! [`Gate::prepare`] fixes the inputs of a run; [`Gate::run`] executes the
//! selected checks and returns a sorted [`contract_protocol::Report`].

pub mod checks;
mod context;
pub mod cross_ref;
mod error;
mod gate;
pub mod registry;

pub use context::CheckContext;
pub use cross_ref::{BlueprintTable, RouteBlueprint, SharedDataTable, SharedDatum};
pub use error::{Result, RuleError};
pub use gate::{Gate, RunOptions};
pub use registry::{ComponentStatus, Registry, RegistryEntry};
