//! `rtsforge list|describe|validate|init` — descriptor listing and checks.

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use rtsforge_targets::parse::{descriptor_to_toml, generate_template, TARGET_FILE_SUFFIX};
use rtsforge_targets::validate::validate_target;
use rtsforge_targets::{
    validate_registry, SourceEntry, TargetDescriptor, TargetRegistry, ValidationIssue,
};

/// List all registered targets.
pub fn list(registry: &TargetRegistry) -> Result<()> {
    print!("{}", render_list(registry)?);
    Ok(())
}

fn render_list(registry: &TargetRegistry) -> Result<String, fmt::Error> {
    let mut out = String::new();
    if registry.is_empty() {
        out.push_str("No targets registered.\n");
        return Ok(out);
    }
    out.push_str("Registered targets:\n\n");
    for descriptor in registry.descriptors() {
        let parent = descriptor.parent().unwrap_or("-");
        let description = descriptor.description().unwrap_or("");
        writeln!(
            out,
            "  {:<20} {:<12} {description}",
            descriptor.name(),
            parent
        )?;
    }
    out.push_str("\nUse 'rtsforge resolve <name>' for the flattened build recipe.\n");
    Ok(out)
}

/// Describe a descriptor as declared (not flattened).
pub fn describe(registry: &TargetRegistry, name: &str, format: Option<&str>) -> Result<()> {
    let descriptor = registry
        .lookup(name)
        .context("use 'rtsforge list' to see available targets")?;
    match format.unwrap_or("human") {
        "human" => print!("{}", render_descriptor(descriptor)?),
        "toml" => print!("{}", descriptor_to_toml(descriptor)?),
        other => bail!("unknown format '{other}' (expected human or toml)"),
    }
    Ok(())
}

fn render_descriptor(d: &TargetDescriptor) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "=== Target: {} ===", d.name())?;
    if let Some(description) = d.description() {
        writeln!(out, "{description}")?;
    }
    writeln!(out, "Parent:  {}", d.parent().unwrap_or("(none)"))?;
    if let Some(triplet) = d.triplet() {
        writeln!(out, "Triplet: {triplet}")?;
    }
    if !d.loaders().is_empty() {
        writeln!(out, "Loaders: {}", d.loaders().join(", "))?;
    }
    out.push('\n');

    out.push_str("--- Compiler switches ---\n");
    for switch in d.compiler_switches() {
        writeln!(out, "  {switch}")?;
    }
    out.push_str("--- Linker scripts ---\n");
    for script in d.linker_scripts() {
        let loader = script.loader.as_deref().unwrap_or("default");
        writeln!(out, "  {} [{loader}]", script.path)?;
    }
    for set in d.source_sets() {
        writeln!(out, "--- Sources: {} ---", set.name())?;
        for entry in set.entries() {
            match entry {
                SourceEntry::Plain(path) => writeln!(out, "  {path}")?,
                SourceEntry::Override {
                    default,
                    replacement,
                } => writeln!(out, "  {default} => {replacement}")?,
            }
        }
    }
    Ok(out)
}

/// Validate one target, or the whole registry.
pub fn validate(registry: &TargetRegistry, name: Option<&str>) -> Result<()> {
    let issues = match name {
        Some(name) => {
            registry.lookup(name)?;
            let mut issues = Vec::new();
            validate_target(registry, name, &mut issues);
            issues
        }
        None => validate_registry(registry).err().unwrap_or_default(),
    };

    print!("{}", render_issues(&issues)?);
    let errors = issues.iter().filter(|issue| issue.is_error()).count();
    if errors > 0 {
        bail!("{errors} error(s) found");
    }
    match name {
        Some(name) => println!("Target '{name}' is valid."),
        None => println!("All {} targets are valid.", registry.len()),
    }
    Ok(())
}

fn render_issues(issues: &[ValidationIssue]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for issue in issues {
        writeln!(out, "  {} [{}]: {}", issue.severity, issue.target, issue.message)?;
    }
    Ok(out)
}

/// Write a template descriptor into `<project_dir>/targets/`.
pub fn init(project_dir: &Path, name: &str, parent: Option<&str>) -> Result<PathBuf> {
    let targets_dir = project_dir.join("targets");
    let path = targets_dir.join(format!("{name}{TARGET_FILE_SUFFIX}"));
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    std::fs::create_dir_all(&targets_dir)
        .with_context(|| format!("creating {}", targets_dir.display()))?;
    std::fs::write(&path, generate_template(name, parent)?)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtsforge_targets::builtin::builtin_registry;
    use rtsforge_targets::parse::load_descriptor_toml;

    #[test]
    fn list_includes_builtins() {
        let out = render_list(&builtin_registry().unwrap()).unwrap();
        assert!(out.contains("p5634"));
        assert!(out.contains("ppc-spe"));
    }

    #[test]
    fn list_empty() {
        assert!(render_list(&TargetRegistry::new())
            .unwrap()
            .contains("No targets"));
    }

    #[test]
    fn describe_known_target() {
        let registry = builtin_registry().unwrap();
        assert!(describe(&registry, "p5634", None).is_ok());
        assert!(describe(&registry, "p5634", Some("toml")).is_ok());
        assert!(describe(&registry, "p5634", Some("yaml")).is_err());
    }

    #[test]
    fn describe_unknown_target() {
        assert!(describe(&builtin_registry().unwrap(), "nonexistent", None).is_err());
    }

    #[test]
    fn render_shows_overrides() {
        let registry = builtin_registry().unwrap();
        let out = render_descriptor(registry.lookup("p5634").unwrap()).unwrap();
        assert!(out.contains("s-macres.adb => s-macres-p55.adb"));
        assert!(out.contains("powerpc/mpc5634/5634.ld [default]"));
    }

    #[test]
    fn validate_builtins() {
        let registry = builtin_registry().unwrap();
        assert!(validate(&registry, None).is_ok());
        assert!(validate(&registry, Some("p5566")).is_ok());
        assert!(validate(&registry, Some("nonexistent")).is_err());
    }

    #[test]
    fn validate_reports_errors() {
        let mut registry = TargetRegistry::new();
        registry
            .register(TargetDescriptor::new("orphan").with_parent("ghost"))
            .unwrap();
        assert!(validate(&registry, None).is_err());
    }

    #[test]
    fn each_issue_is_reported_once() {
        let mut registry = TargetRegistry::new();
        let mut dup = TargetDescriptor::new("dup");
        dup.add_compiler_switches(["-O2", "-O2"]);
        registry.register(dup).unwrap();
        registry
            .register(TargetDescriptor::new("orphan").with_parent("ghost"))
            .unwrap();

        let issues = validate_registry(&registry).unwrap_err();
        assert!(issues.iter().any(|issue| !issue.is_error()));
        let out = render_issues(&issues).unwrap();
        assert_eq!(out.lines().count(), issues.len());
        for issue in &issues {
            assert_eq!(out.matches(issue.message.as_str()).count(), 1);
        }
    }

    #[test]
    fn init_writes_loadable_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = init(dir.path(), "myboard", Some("ppc-spe")).unwrap();
        let d = load_descriptor_toml(&path).unwrap();
        assert_eq!(d.parent(), Some("ppc-spe"));
        assert!(init(dir.path(), "myboard", None).is_err());
    }
}
