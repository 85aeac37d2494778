//! Writes `manifest.json` for a MediChat asset directory.
//!
//! Records the SHA-256 digest of the model and its reference tables so the
//! app can refuse tampered assets at startup.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin write_manifest -- [<assets_dir>] [--with-policy]
//! ```

use std::env;
use std::fs;
use std::path::PathBuf;

use medichat::adapters::assets::{DESCRIPTIONS_FILE, PRECAUTIONS_FILE, SYMPTOMS_FILE};
use medichat::adapters::model::{AssetManifest, MANIFEST_FILE, MODEL_FILE};
use medichat::config::POLICY_FILE;

fn usage() -> String {
    "Usage: write_manifest [<assets_dir>] [--with-policy]".to_string()
}

fn parse_args() -> Result<(PathBuf, bool), String> {
    let mut assets_dir: Option<PathBuf> = None;
    let mut with_policy = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--with-policy" => with_policy = true,
            "-h" | "--help" => return Err(usage()),
            _ => {
                if assets_dir.is_some() {
                    return Err(usage());
                }
                assets_dir = Some(PathBuf::from(arg));
            }
        }
    }

    let assets_dir = assets_dir
        .or_else(|| env::var("MEDICHAT_ASSETS_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("assets"));
    Ok((assets_dir, with_policy))
}

fn run() -> Result<(), String> {
    let (assets_dir, with_policy) = parse_args()?;

    let mut names = vec![MODEL_FILE, SYMPTOMS_FILE];
    for optional in [DESCRIPTIONS_FILE, PRECAUTIONS_FILE] {
        if assets_dir.join(optional).exists() {
            names.push(optional);
        }
    }
    if with_policy {
        names.push(POLICY_FILE);
    }

    let manifest = AssetManifest::build(&assets_dir, &names).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| format!("Failed to serialize manifest: {e}"))?;

    let out = assets_dir.join(MANIFEST_FILE);
    fs::write(&out, format!("{json}\n")).map_err(|e| format!("Failed to write {out:?}: {e}"))?;

    println!("Wrote {out:?}");
    for (name, digest) in &manifest.files {
        println!("  {name}  {digest}");
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
