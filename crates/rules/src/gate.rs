use crate::checks::{checker, skip_reason};
use crate::context::CheckContext;
use crate::error::Result;
use crate::registry::Registry;
use contract_graph::{GraphBuilder, ReachableSet};
use contract_imports::{ImportExtractor, ImportResolver, ResolverConfig};
use contract_protocol::{CheckId, CheckSummary, GateConfig, ReachabilityStats, Report};
use std::collections::BTreeSet;
use std::path::Path;

/// Which checks to run and how strictly
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub strict: bool,
    /// Empty selects every check
    pub only: BTreeSet<CheckId>,
}

impl RunOptions {
    pub fn selects(&self, check: CheckId) -> bool {
        self.only.is_empty() || self.only.contains(&check)
    }
}

/// One prepared run: configuration, reachable set and registry, all fixed.
pub struct Gate {
    config: GateConfig,
    reachable: ReachableSet,
    registry: Option<Result<Registry>>,
}

impl Gate {
    /// Builds the reachable set. A missing entry file is the only fatal outcome.
    pub fn prepare(root: &Path, config: GateConfig) -> Result<Self> {
        let mut resolver_config = ResolverConfig::new(root).extensions(&config.extensions);
        for (prefix, target) in &config.aliases {
            resolver_config = resolver_config.alias(prefix.as_str(), target.as_str());
        }
        let resolver = ImportResolver::new(resolver_config)?;

        let mut builder = GraphBuilder::new(ImportExtractor::new(resolver), &config.source_root);
        let reachable = builder.build(&config.entries)?;

        let registry = config
            .registry
            .as_ref()
            .map(|section| Registry::load(&reachable.root().join(&section.table)));
        match &registry {
            Some(Err(err)) => log::warn!("registry table unavailable: {err}"),
            Some(Ok(table)) if table.is_empty() => {
                log::warn!("registry table lists no components; every component import will fail")
            }
            _ => {}
        }

        Ok(Self {
            config,
            reachable,
            registry,
        })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn reachable(&self) -> &ReachableSet {
        &self.reachable
    }

    pub fn stats(&self) -> ReachabilityStats {
        ReachabilityStats {
            entries: self.reachable.entries().len(),
            reachable_files: self.reachable.len(),
            followed_edges: self.reachable.graph().edge_count(),
        }
    }

    /// Runs every selected check to completion and collects one report.
    pub fn run(&self, options: &RunOptions) -> Report {
        let ctx = CheckContext {
            root: self.reachable.root(),
            config: &self.config,
            reachable: &self.reachable,
            registry: self.registry.as_ref(),
            strict: options.strict,
        };

        let mut summaries = Vec::new();
        let mut violations = Vec::new();
        for check in CheckId::ALL {
            if !options.selects(check) {
                continue;
            }
            if let Some(reason) = skip_reason(check, &self.config) {
                if options.only.contains(&check) {
                    log::warn!("{check} skipped: {reason}");
                } else {
                    log::info!("{check} skipped: {reason}");
                }
                summaries.push(CheckSummary {
                    check,
                    errors: 0,
                    warnings: 0,
                    skipped: Some(reason.to_string()),
                });
                continue;
            }

            let found = checker(check)(&ctx);
            let errors = found.iter().filter(|v| v.is_error()).count();
            log::info!("{check}: {errors} errors, {} warnings", found.len() - errors);
            summaries.push(CheckSummary {
                check,
                errors,
                warnings: found.len() - errors,
                skipped: None,
            });
            violations.extend(found);
        }

        Report::new(options.strict, self.stats(), summaries, violations)
    }
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate")
            .field("reachable", &self.reachable)
            .field("registry_loaded", &matches!(self.registry, Some(Ok(_))))
            .finish()
    }
}
