//! `rtsforge.toml` project configuration and registry assembly.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use rtsforge_targets::{builtin, parse, TargetRegistry};

/// File name searched for upward from the working directory.
pub const MANIFEST_FILE: &str = "rtsforge.toml";

/// The top-level manifest structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RtsforgeManifest {
    /// Project metadata.
    #[serde(default)]
    pub project: Option<ProjectConfig>,
    /// Target configuration.
    #[serde(default)]
    pub targets: TargetsConfig,
}

/// Project metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Targets configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetsConfig {
    /// Target resolved when none is given on the command line.
    #[serde(default)]
    pub default: Option<String>,
    /// Directories of `.target.toml` files, relative to the manifest.
    #[serde(default = "default_dirs")]
    pub dirs: Vec<PathBuf>,
    /// Whether the built-in catalogue is registered.
    #[serde(default = "default_builtins")]
    pub builtins: bool,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            default: None,
            dirs: default_dirs(),
            builtins: default_builtins(),
        }
    }
}

fn default_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("targets")]
}

fn default_builtins() -> bool {
    true
}

impl RtsforgeManifest {
    /// Search upward from `start_dir` for `rtsforge.toml`, parse and return it
    /// along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: RtsforgeManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                tracing::debug!(path = %candidate.display(), "loaded manifest");
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing rtsforge.toml")
    }

    pub fn default_target(&self) -> Option<&str> {
        self.targets.default.as_deref()
    }
}

/// Where descriptors come from for one invocation.
#[derive(Debug, Clone)]
pub struct RegistrySources {
    pub builtins: bool,
    /// Manifest directories; a missing one loads nothing.
    pub dirs: Vec<PathBuf>,
    /// Directories named on the command line; each must exist.
    pub required_dirs: Vec<PathBuf>,
}

impl RegistrySources {
    /// Combine manifest settings with command-line overrides.
    pub fn new(
        manifest: Option<&RtsforgeManifest>,
        project_dir: &Path,
        extra_dirs: &[PathBuf],
        no_builtins: bool,
    ) -> Self {
        let targets = manifest.map(|m| m.targets.clone()).unwrap_or_default();
        Self {
            builtins: targets.builtins && !no_builtins,
            dirs: targets.dirs.iter().map(|d| project_dir.join(d)).collect(),
            required_dirs: extra_dirs.to_vec(),
        }
    }

    /// Build and fill a registry from these sources.
    pub fn load(&self) -> Result<TargetRegistry> {
        let mut registry = if self.builtins {
            builtin::builtin_registry().context("registering built-in targets")?
        } else {
            TargetRegistry::new()
        };
        for dir in &self.required_dirs {
            if !dir.is_dir() {
                bail!("targets directory {} does not exist", dir.display());
            }
        }
        for dir in self.dirs.iter().chain(&self.required_dirs) {
            parse::load_dir(&mut registry, dir)
                .with_context(|| format!("loading targets from {}", dir.display()))?;
        }
        tracing::debug!(targets = registry.len(), "registry ready");
        Ok(registry)
    }
}

/// Generate the default manifest written next to a fresh `targets/` dir.
pub fn template(name: &str, default_target: &str) -> String {
    format!(
        r#"[project]
name = "{name}"

[targets]
default = "{default_target}"
dirs = ["targets"]
"#
    )
}

/// Write a manifest template into `project_dir`, named after the directory.
pub fn write_template(project_dir: &Path, default_target: &str) -> Result<PathBuf> {
    let name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("runtimes");
    let path = project_dir.join(MANIFEST_FILE);
    std::fs::write(&path, template(name, default_target))
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(path)
}
