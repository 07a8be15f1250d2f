//! Build recipe resolution.
//!
//! Walks a descriptor's parent chain and merges it, root ancestor first,
//! into one flattened [`ResolvedRecipe`]:
//!
//! - compiler switches and linker scripts are concatenated, never deduplicated
//!   (a compiler driver that treats the last flag as the winner sees the
//!   descendant's flags last);
//! - source sets are merged by name. An `Override` in a descendant replaces
//!   the inherited entry installed under the same name, in place. Everything
//!   else the descendant declares is appended after the inherited entries.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::descriptor::{LinkerScript, TargetDescriptor};
use crate::error::{Result, TargetError};
use crate::registry::TargetRegistry;
use crate::source_set::{SourceEntry, SourceSet};

/// The flattened build parameters for one target.
///
/// Built fresh on every resolution and owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolvedRecipe {
    /// The requested target.
    pub target_name: String,
    /// Descriptor names from the root ancestor down to the target.
    pub chain: Vec<String>,
    /// Nearest toolchain triplet declared along the chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triplet: Option<String>,
    /// Loaders declared along the chain, first declaration wins the position.
    pub loaders: Vec<String>,
    pub switches: Vec<String>,
    pub linker_scripts: Vec<LinkerScript>,
    pub source_sets: Vec<SourceSet>,
}

impl ResolvedRecipe {
    pub fn source_set(&self, name: &str) -> Option<&SourceSet> {
        self.source_sets.iter().find(|s| s.name() == name)
    }

    /// Files compiled for set `name`, empty if the set does not exist.
    pub fn files(&self, name: &str) -> Vec<&str> {
        self.source_set(name).map(SourceSet::files).unwrap_or_default()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// A descendant override whose `default` matched no inherited entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StrayOverride {
    /// Descriptor declaring the override.
    pub target: String,
    pub set: String,
    pub default: String,
}

/// Recipe plus the merge diagnostics validation cares about.
#[derive(Debug, Clone)]
pub(crate) struct Resolution {
    pub recipe: ResolvedRecipe,
    pub stray_overrides: Vec<StrayOverride>,
}

/// Resolve `name` against `registry`.
pub fn resolve(registry: &TargetRegistry, name: &str) -> Result<ResolvedRecipe> {
    resolve_detailed(registry, name).map(|r| r.recipe)
}

pub(crate) fn resolve_detailed(registry: &TargetRegistry, name: &str) -> Result<Resolution> {
    let chain = ancestry(registry, name)?;
    tracing::debug!(
        target_name = name,
        chain = ?chain.iter().map(|d| d.name()).collect::<Vec<_>>(),
        "resolving target"
    );

    let mut recipe = ResolvedRecipe {
        target_name: name.to_string(),
        chain: Vec::with_capacity(chain.len()),
        triplet: None,
        loaders: Vec::new(),
        switches: Vec::new(),
        linker_scripts: Vec::new(),
        source_sets: Vec::new(),
    };
    let mut stray_overrides = Vec::new();

    for (depth, descriptor) in chain.iter().enumerate() {
        recipe.chain.push(descriptor.name().to_string());
        if let Some(triplet) = descriptor.triplet() {
            recipe.triplet = Some(triplet.to_string());
        }
        for loader in descriptor.loaders() {
            if !recipe.loaders.contains(loader) {
                recipe.loaders.push(loader.clone());
            }
        }
        recipe
            .switches
            .extend(descriptor.compiler_switches().iter().cloned());
        recipe
            .linker_scripts
            .extend(descriptor.linker_scripts().iter().cloned());

        for own in descriptor.source_sets() {
            let strays = merge_set(&mut recipe.source_sets, own);
            if depth > 0 {
                stray_overrides.extend(strays.into_iter().map(|default| StrayOverride {
                    target: descriptor.name().to_string(),
                    set: own.name().to_string(),
                    default,
                }));
            }
        }
    }

    Ok(Resolution {
        recipe,
        stray_overrides,
    })
}

/// Parent chain of `name`, root ancestor first.
pub(crate) fn ancestry<'a>(
    registry: &'a TargetRegistry,
    name: &str,
) -> Result<Vec<&'a Arc<TargetDescriptor>>> {
    let mut chain: Vec<&Arc<TargetDescriptor>> = Vec::new();
    let mut on_path: HashSet<&str> = HashSet::new();
    let mut current = registry.lookup(name)?;

    loop {
        if !on_path.insert(current.name()) {
            let start = chain
                .iter()
                .position(|d| d.name() == current.name())
                .unwrap_or(0);
            let mut cycle: Vec<String> = chain[start..]
                .iter()
                .map(|d| d.name().to_string())
                .collect();
            cycle.push(current.name().to_string());
            return Err(TargetError::CyclicTarget { chain: cycle });
        }
        chain.push(current);
        match current.parent() {
            Some(parent) => current = registry.lookup(parent)?,
            None => break,
        }
    }

    chain.reverse();
    Ok(chain)
}

/// Merge one level's set into the accumulated sets, returning the defaults of
/// overrides that replaced nothing.
fn merge_set(acc: &mut Vec<SourceSet>, own: &SourceSet) -> Vec<String> {
    let Some(index) = acc.iter().position(|s| s.name() == own.name()) else {
        acc.push(own.clone());
        return own
            .entries()
            .iter()
            .filter(|e| e.is_override())
            .map(|e| e.install_name().to_string())
            .collect();
    };

    let entries = acc[index].entries_mut();
    let inherited_len = entries.len();
    let mut appended = Vec::new();
    let mut strays = Vec::new();

    for entry in own.entries() {
        let mut replaced = false;
        if let SourceEntry::Override { default, .. } = entry {
            for slot in entries[..inherited_len]
                .iter_mut()
                .filter(|slot| slot.install_name() == default)
            {
                *slot = entry.clone();
                replaced = true;
            }
            if !replaced {
                strays.push(default.clone());
            }
        }
        if !replaced {
            appended.push(entry.clone());
        }
    }

    entries.extend(appended);
    strays
}
