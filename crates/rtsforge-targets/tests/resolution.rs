//! End-to-end resolution through the public API.

use rtsforge_targets::builtin::builtin_registry;
use rtsforge_targets::parse::{load_dir, parse_descriptor_toml};
use rtsforge_targets::{
    LinkerScript, SharedRegistry, SourceSpec, TargetDescriptor, TargetError, TargetRegistry,
};

fn spe() -> TargetDescriptor {
    let mut d = TargetDescriptor::new("spe");
    d.add_compiler_switch("-mcpu=8548");
    d.add_sources("crt0", ["generic_start.S", "s-macres.adb", "s-textio.adb"])
        .expect("spe sources");
    d
}

fn p5634() -> TargetDescriptor {
    let mut d = TargetDescriptor::new("p5634").with_parent("spe");
    d.add_compiler_switch("-mfloat-gprs=single");
    d.add_linker_script("powerpc/mpc5634/5634.ld", None)
        .expect("linker script");
    d.add_sources(
        "crt0",
        [
            SourceSpec::from("start.S"),
            SourceSpec::replace("s-macres.adb", "s-macres-p55.adb"),
            SourceSpec::replace("s-textio.adb", "s-textio-p55.adb"),
        ],
    )
    .expect("p5634 sources");
    d
}

#[test]
fn p5634_over_spe() {
    let mut registry = TargetRegistry::new();
    registry.register(spe()).unwrap();
    registry.register(p5634()).unwrap();

    let recipe = registry.resolve("p5634").unwrap();
    assert_eq!(recipe.target_name, "p5634");
    assert_eq!(recipe.switches, ["-mcpu=8548", "-mfloat-gprs=single"]);
    assert_eq!(
        recipe.linker_scripts,
        [LinkerScript {
            path: "powerpc/mpc5634/5634.ld".into(),
            loader: None,
        }]
    );
    assert_eq!(
        recipe.files("crt0"),
        [
            "generic_start.S",
            "s-macres-p55.adb",
            "s-textio-p55.adb",
            "start.S"
        ]
    );
}

#[test]
fn resolution_is_repeatable() {
    let mut registry = TargetRegistry::new();
    registry.register(spe()).unwrap();
    registry.register(p5634()).unwrap();

    let first = registry.resolve("p5634").unwrap();
    let second = registry.resolve("p5634").unwrap();
    assert_eq!(first, second);
    assert_eq!(registry.lookup("p5634").unwrap().compiler_switches().len(), 1);
}

#[test]
fn registration_order_does_not_matter() {
    let mut registry = TargetRegistry::new();
    registry.register(p5634()).unwrap();
    registry.register(spe()).unwrap();
    assert_eq!(registry.resolve("p5634").unwrap().chain, ["spe", "p5634"]);
}

#[test]
fn unknown_target_fails() {
    let registry = builtin_registry().unwrap();
    let err = registry.resolve("nonexistent").unwrap_err();
    assert!(matches!(err, TargetError::UnknownTarget { .. }));
    assert_eq!(err.to_string(), "unknown target: 'nonexistent'");
}

#[test]
fn builtin_p5634_matches_file_form() {
    let from_file = parse_descriptor_toml(
        r#"
name = "p5634"
parent = "ppc-spe"
description = "Freescale MPC5634M (e200z3)"
compiler-switches = ["-mfloat-gprs=single"]

[[linker-scripts]]
path = "powerpc/mpc5634/5634.ld"

[source-sets]
crt0 = [
    "powerpc/mpc5634/start.S",
    { "s-macres.adb" = "s-macres-p55.adb", "s-textio.adb" = "s-textio-p55.adb" },
]
"#,
    )
    .unwrap();
    let registry = builtin_registry().unwrap();
    assert_eq!(**registry.lookup("p5634").unwrap(), from_file);
}

#[test]
fn hot_reload_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("p5634-debug.target.toml"),
        "name = \"p5634-debug\"\nparent = \"p5634\"\ncompiler-switches = [\"-g\"]\n",
    )
    .unwrap();

    let shared = SharedRegistry::new(builtin_registry().unwrap());
    let before = shared.snapshot();
    assert!(before.resolve("p5634-debug").is_err());

    let mut reloaded = builtin_registry().unwrap();
    load_dir(&mut reloaded, dir.path()).unwrap();
    shared.replace(reloaded);

    let recipe = shared.resolve("p5634-debug").unwrap();
    assert_eq!(recipe.chain, ["ppc-spe", "p5634", "p5634-debug"]);
    assert_eq!(
        recipe.switches,
        ["-mcpu=8548", "-mfloat-gprs=single", "-g"]
    );
    assert!(before.resolve("p5634-debug").is_err());
}
