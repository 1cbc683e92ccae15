//! Independent checkers. Each is a pure function of the [`CheckContext`];
//! none of them can stop another from running.

pub mod banned_imports;
pub mod budgets;
pub mod parse;
pub mod patterns;
pub mod registry_compliance;
pub mod shell;

use crate::context::CheckContext;
use crate::cross_ref;
use contract_protocol::{CheckId, GateConfig, Violation};

pub type Checker = fn(&CheckContext<'_>) -> Vec<Violation>;

pub fn checker(check: CheckId) -> Checker {
    match check {
        CheckId::Parse => parse::check,
        CheckId::Registry => registry_compliance::check,
        CheckId::Patterns => patterns::check,
        CheckId::Imports => banned_imports::check,
        CheckId::Shell => shell::check,
        CheckId::Budgets => budgets::check,
        CheckId::CrossRef => cross_ref::check,
    }
}

/// Why a check has nothing to do, if its configuration section is absent
pub fn skip_reason(check: CheckId, config: &GateConfig) -> Option<&'static str> {
    match check {
        CheckId::Parse => None,
        CheckId::Registry => config.registry.is_none().then_some("no [registry] section"),
        CheckId::Patterns => config.patterns.is_none().then_some("no [patterns] section"),
        CheckId::Imports => config
            .banned_imports
            .is_empty()
            .then_some("no [[banned_imports]] rules"),
        CheckId::Shell => config.shell.is_none().then_some("no [shell] section"),
        CheckId::Budgets => config.budgets.is_empty().then_some("no [[budgets]] rules"),
        CheckId::CrossRef => config.cross_ref.is_none().then_some("no [cross_ref] section"),
    }
}
