use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use player_market::bronze;
use player_market::config::{AppConfig, load_dotenv};
use player_market::logging::init_tracing;

fn main() -> Result<()> {
    load_dotenv();
    init_tracing();
    let cfg = AppConfig::from_env();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let file = arg_value(&args, "--file")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("usage: bronze_upload --file <path> [--bronze <dir>]"))?;
    let bronze_dir = arg_value(&args, "--bronze")
        .map(PathBuf::from)
        .unwrap_or(cfg.bronze_dir);

    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("file path has no usable name")?
        .to_string();
    let reader = File::open(&file).with_context(|| format!("open {}", file.display()))?;
    let stored = bronze::store_raw_file(&bronze_dir, &name, reader)?;

    println!("File uploaded successfully");
    println!("Path: {}", stored.path.display());
    println!("Bytes: {}", stored.bytes);
    Ok(())
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
