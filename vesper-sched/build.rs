use std::env;
use std::fs;
use std::path::Path;

use toml::Value;
use toml::value::Table;

fn read_table(path: &Path) -> Table {
    println!("cargo::rerun-if-changed={}", path.display());

    let content = fs::read_to_string(path).unwrap();
    let value: Value = toml::from_str(&content).unwrap();
    value.as_table().unwrap().clone()
}

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let config_dir = Path::new(&manifest_dir).join("../build-config");

    // the build script runs on the host, so ask cargo for the target arch
    let arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap();
    let common_config = config_dir.join("common.toml");
    let sched_config = config_dir.join(&arch).join(format!("{}-sched.toml", arch));

    let mut config = read_table(&common_config);
    if sched_config.exists() {
        config.extend(read_table(&sched_config));
    }

    for (key, value) in &config {
        match value {
            Value::String(s) => println!("cargo::rustc-env={}={}", key, s),
            other => println!("cargo::rustc-env={}={}", key, other),
        }
    }
}
