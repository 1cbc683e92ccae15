//! Bidirectional integrity between route blueprints and shared data keys.
//!
//! A route/key pair is valid only when the blueprint lists the key **and**
//! the datum lists the route among its owners. Both directions always run.

use crate::context::CheckContext;
use crate::error::Result;
use contract_protocol::{read_json_table, CheckId, Violation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintTable {
    pub routes: BTreeMap<String, RouteBlueprint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteBlueprint {
    /// Content sections the route must render
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(default)]
    pub shared_keys: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedDataTable {
    pub keys: BTreeMap<String, SharedDatum>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedDatum {
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub owner_routes: Vec<String>,
}

impl BlueprintTable {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(read_json_table(path)?)
    }
}

impl SharedDataTable {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(read_json_table(path)?)
    }
}

pub fn check(ctx: &CheckContext<'_>) -> Vec<Violation> {
    let Some(section) = ctx.config.cross_ref.as_ref() else {
        return Vec::new();
    };

    let blueprints = BlueprintTable::load(&ctx.resolve(&section.blueprints));
    let shared = SharedDataTable::load(&ctx.resolve(&section.shared_data));

    match (blueprints, shared) {
        (Ok(blueprints), Ok(shared)) => validate(&blueprints, &shared),
        (blueprints, shared) => {
            let mut violations = Vec::new();
            if let Err(err) = blueprints {
                violations.push(Violation::config_error(
                    CheckId::CrossRef,
                    &section.blueprints,
                    err,
                ));
            }
            if let Err(err) = shared {
                violations.push(Violation::config_error(
                    CheckId::CrossRef,
                    &section.shared_data,
                    err,
                ));
            }
            violations
        }
    }
}

/// Pure validation of two already loaded tables
pub fn validate(blueprints: &BlueprintTable, shared: &SharedDataTable) -> Vec<Violation> {
    let mut violations = blueprint_to_datum(blueprints, shared);
    violations.extend(datum_to_blueprint(blueprints, shared));
    violations.extend(blueprint_hygiene(blueprints));
    violations
}

fn blueprint_to_datum(blueprints: &BlueprintTable, shared: &SharedDataTable) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (route, blueprint) in &blueprints.routes {
        let keys: BTreeSet<&str> = blueprint.shared_keys.iter().map(String::as_str).collect();
        for key in keys {
            match shared.keys.get(key) {
                None => violations.push(
                    Violation::error(
                        CheckId::CrossRef,
                        route,
                        format!("blueprint references unknown shared key {key}"),
                    )
                    .with_hint("Add the key to the shared data table or drop it from the blueprint"),
                ),
                Some(datum) if !datum.owner_routes.iter().any(|owner| owner == route) => {
                    violations.push(
                        Violation::error(
                            CheckId::CrossRef,
                            route,
                            format!("blueprint references {key} but {key} omits {route} as owner"),
                        )
                        .with_hint(format!("Add {route} to {key}.owner_routes")),
                    )
                }
                Some(_) => {}
            }
        }
    }
    violations
}

fn datum_to_blueprint(blueprints: &BlueprintTable, shared: &SharedDataTable) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (key, datum) in &shared.keys {
        if datum.owner_routes.is_empty() {
            violations.push(Violation::error(
                CheckId::CrossRef,
                key,
                format!("shared key {key} has no owners"),
            ));
            continue;
        }
        let owners: BTreeSet<&str> = datum.owner_routes.iter().map(String::as_str).collect();
        for owner in owners {
            match blueprints.routes.get(owner) {
                None => violations.push(Violation::error(
                    CheckId::CrossRef,
                    key,
                    format!("owner route {owner} has no blueprint"),
                )),
                Some(blueprint) if !blueprint.shared_keys.iter().any(|k| k == key) => violations
                    .push(
                        Violation::error(
                            CheckId::CrossRef,
                            key,
                            format!("owner route {owner} omits {key}"),
                        )
                        .with_hint(format!("List {key} in the {owner} blueprint's shared_keys")),
                    ),
                Some(_) => {}
            }
        }
    }
    violations
}

fn blueprint_hygiene(blueprints: &BlueprintTable) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (route, blueprint) in &blueprints.routes {
        if blueprint.sections.is_empty() {
            violations.push(Violation::warning(
                CheckId::CrossRef,
                route,
                "blueprint declares no sections",
            ));
        }
        for section in duplicates(&blueprint.sections) {
            violations.push(Violation::warning(
                CheckId::CrossRef,
                route,
                format!("section {section} is declared more than once"),
            ));
        }
        for key in duplicates(&blueprint.shared_keys) {
            violations.push(Violation::warning(
                CheckId::CrossRef,
                route,
                format!("shared key {key} is listed more than once"),
            ));
        }
    }
    violations
}

fn duplicates(values: &[String]) -> BTreeSet<&str> {
    let mut seen = BTreeSet::new();
    values
        .iter()
        .map(String::as_str)
        .filter(|value| !seen.insert(*value))
        .collect()
}
