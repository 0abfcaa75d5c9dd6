// build.rs

use glob::glob;
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// A lightweight description of one regression fixture for the build script.
#[derive(Debug)]
struct FixtureInstance {
    pub name: String,
    pub path: PathBuf,
}

/// Discovers all regression fixtures by scanning the `fixtures/` directory.
fn get_all_fixtures(manifest_dir: &Path) -> Vec<FixtureInstance> {
    let pattern = manifest_dir.join("fixtures").join("*.mat");
    glob(&pattern.to_string_lossy())
        .expect("Failed to read glob pattern")
        .filter_map(|entry| {
            let path = entry.ok()?;
            let name = path
                .file_stem()?
                .to_string_lossy()
                .to_string()
                .replace(['-', '.'], "_");
            Some(FixtureInstance { name, path })
        })
        .collect()
}

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    println!("cargo:rerun-if-changed=fixtures");

    // Get the Cargo output directory where we will place the generated code.
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("fixture_regression_tests.rs");
    let mut file = BufWriter::new(File::create(&dest_path).unwrap());

    // Generate a separate `#[test]` function for each fixture.
    for fixture in get_all_fixtures(&manifest_dir) {
        let test_fn_name = format!("fixture_regression_{}", fixture.name);
        let path_str = fixture.path.to_string_lossy();

        writeln!(
            file,
            r#"
#[test]
fn {fn_name}() -> anyhow::Result<()> {{
    let instance = FixtureInstance {{
        name: "{name}",
        path: "{path}".into(),
    }};
    run_regression_test_for_fixture(&instance)
}}
"#,
            fn_name = test_fn_name,
            name = fixture.name,
            path = path_str.escape_default()
        )
        .unwrap();
    }
}
