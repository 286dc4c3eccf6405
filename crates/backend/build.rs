use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// target/<profile> для текущей сборки (OUT_DIR = target/<profile>/build/backend-xxx/out)
fn profile_dir() -> Option<PathBuf> {
    let out_dir = env::var("OUT_DIR").ok()?;
    let profile = env::var("PROFILE").ok()?;
    Path::new(&out_dir)
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .map(Path::to_path_buf)
}

fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config.toml");
    let Some(target_dir) = profile_dir() else {
        println!("cargo:warning=target profile directory not found, config.toml not copied");
        return;
    };

    // config.toml кладётся рядом с бинарником, его читает shared::config::load_config
    if source.exists() {
        let dest = target_dir.join("config.toml");
        if let Err(e) = fs::copy(&source, &dest) {
            println!("cargo:warning=Failed to copy config.toml: {}", e);
        }
    } else {
        println!("cargo:warning=config.toml not found, embedded defaults will be used");
    }
}
