// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Condition evaluation (§4.3 step 3): each of a job's `conditions` is
//! checked against the derived image version or an installed package's
//! version/release.

use crate::client::PackageInfo;
use mash_core::version::{compare_versions, Operator};
use mash_core::{Condition, MashError};

/// One evaluated condition, carrying its own boolean result (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionResult {
    pub condition: Condition,
    pub status: bool,
}

/// Evaluate every condition against the derived image version and the
/// build's installed package list. Propagates [`mash_core::version::VersionExpressionError`]
/// (wrapped in [`MashError`]) if a package condition names a bare `=` or
/// unrecognised operator.
pub fn evaluate_conditions(
    conditions: &[Condition],
    image_version: &str,
    packages: &[PackageInfo],
) -> Result<Vec<ConditionResult>, MashError> {
    conditions
        .iter()
        .map(|condition| evaluate_one(condition, image_version, packages))
        .collect()
}

fn evaluate_one(
    condition: &Condition,
    image_version: &str,
    packages: &[PackageInfo],
) -> Result<ConditionResult, MashError> {
    let status = match condition {
        Condition::Image { image } => mash_core::version::version_matches(image_version, image),
        Condition::Package { package: (name, op, version, release) } => {
            let operator = Operator::parse(op)?;
            match packages.iter().find(|p| &p.name == name) {
                Some(pkg) => {
                    let actual = versioned_key(&pkg.version, Some(&pkg.release));
                    let expected = versioned_key(version, release.as_deref());
                    operator.evaluate(compare_versions(&actual, &expected))
                }
                None => false,
            }
        }
    };
    Ok(ConditionResult { condition: condition.clone(), status })
}

fn versioned_key(version: &str, release: Option<&str>) -> String {
    match release {
        Some(release) => format!("{version}.{release}"),
        None => version.to_string(),
    }
}

/// iff the image version is known and every condition is satisfied (§3).
pub fn conditions_complied(image_version: &str, conditions: &[ConditionResult]) -> bool {
    image_version != "unknown" && conditions.iter().all(|c| c.status)
}

#[cfg(test)]
#[path = "conditions_tests.rs"]
mod tests;
