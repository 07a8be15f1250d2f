//! Registry-wide validation of descriptor chains.
//!
//! Issues are attributed to the descriptor that introduces them, so a broken
//! family base is reported once and not again for each of its boards.

use std::collections::HashSet;

use crate::error::TargetError;
use crate::registry::TargetRegistry;
use crate::resolve::resolve_detailed;

/// A validation issue found in a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Descriptor the issue belongs to.
    pub target: String,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    fn error(target: &str, message: String) -> Self {
        Self {
            severity: "error",
            target: target.to_string(),
            message,
        }
    }

    fn warning(target: &str, message: String) -> Self {
        Self {
            severity: "warning",
            target: target.to_string(),
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == "error"
    }
}

/// Validate every descriptor in `registry`.
///
/// Returns `Ok(())` if nothing was found, or `Err(issues)` with errors and
/// warnings in registry order.
pub fn validate_registry(registry: &TargetRegistry) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    for name in registry.names() {
        validate_target(registry, name, &mut issues);
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Validate a single descriptor, appending to `issues`.
pub fn validate_target(registry: &TargetRegistry, name: &str, issues: &mut Vec<ValidationIssue>) {
    let descriptor = match registry.lookup(name) {
        Ok(d) => d,
        Err(e) => {
            issues.push(ValidationIssue::error(name, e.to_string()));
            return;
        }
    };

    // 1. Parent must be registered
    if let Some(parent) = descriptor.parent() {
        if !registry.contains(parent) {
            issues.push(ValidationIssue::error(
                name,
                format!("parent '{parent}' is not registered"),
            ));
            return;
        }
    }

    // 2. Chain must resolve; missing ancestors further up are reported there
    let resolution = match resolve_detailed(registry, name) {
        Ok(r) => r,
        Err(TargetError::CyclicTarget { chain }) => {
            if chain.iter().any(|n| n == name) {
                issues.push(ValidationIssue::error(
                    name,
                    format!("parent chain is cyclic: {}", chain.join(" -> ")),
                ));
            }
            return;
        }
        Err(_) => return,
    };
    let recipe = resolution.recipe;

    // 3. Loader-specific linker scripts must name a declared loader
    if !recipe.loaders.is_empty() {
        for script in descriptor.linker_scripts() {
            if let Some(loader) = &script.loader {
                if !recipe.loaders.contains(loader) {
                    issues.push(ValidationIssue::error(
                        name,
                        format!(
                            "linker script '{}' uses loader '{loader}', which is not declared \
                             (declared: {})",
                            script.path,
                            recipe.loaders.join(", ")
                        ),
                    ));
                }
            }
        }
    }

    // 4. Switches this level repeats
    let own = descriptor.compiler_switches();
    let inherited = &recipe.switches[..recipe.switches.len() - own.len()];
    let mut seen: HashSet<&str> = inherited.iter().map(String::as_str).collect();
    for switch in own {
        if !seen.insert(switch) {
            issues.push(ValidationIssue::warning(
                name,
                format!("compiler switch '{switch}' is passed more than once"),
            ));
        }
    }

    // 5. Overrides that replaced nothing
    for stray in resolution
        .stray_overrides
        .iter()
        .filter(|s| s.target == name)
    {
        issues.push(ValidationIssue::warning(
            name,
            format!(
                "override of '{}' in set '{}' matches no inherited entry; appended as-is",
                stray.default, stray.set
            ),
        ));
    }
}
