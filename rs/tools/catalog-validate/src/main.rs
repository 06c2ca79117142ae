use anyhow::{anyhow, Context, Result};
use catalog_core::audit::{self, FeedReport};
use catalog_core::Feed;
use clap::Parser;
use std::{fs, path::Path};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "catalog-validate", about = "Validate profile catalog feed JSON")]
struct Args {
    /// Feed file, or a directory searched for *.json feeds
    path: String,

    /// Treat incomplete records as failures
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("catalog_validate=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let root = Path::new(&args.path);
    if !root.exists() {
        return Err(anyhow!("path not found: {}", root.display()));
    }

    let mut count = 0usize;
    let mut failed = 0usize;
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let path = entry.path();
        let data = fs::read_to_string(path)
            .with_context(|| format!("read failed: {}", path.display()))?;
        let report = validate_feed(&data).with_context(|| format!("invalid feed: {}", path.display()))?;
        print_report(path, &report);
        if !passes(&report, args.strict) {
            failed += 1;
        }
        count += 1;
    }

    if count == 0 {
        return Err(anyhow!("no JSON files found under {}", root.display()));
    }
    info!(files = count, failed, "validation finished");
    if failed > 0 {
        return Err(anyhow!("{failed} of {count} feed(s) failed validation"));
    }
    Ok(())
}

/// Decode one feed and audit its records.
fn validate_feed(data: &str) -> Result<FeedReport> {
    // strict JSON parse first so shape errors read clearly
    let v: serde_json::Value = serde_json::from_str(data).context("json parse failed")?;
    let obj = v.as_object().ok_or_else(|| anyhow!("top-level must be an object"))?;
    if !obj.get("profiles").map(|p| p.is_array()).unwrap_or(false) {
        return Err(anyhow!("'profiles' must be an array"));
    }
    let feed = Feed::from_json(data)?;
    Ok(audit::audit(&feed))
}

/// Dropped records and duplicate ids always fail; incomplete ones only in strict mode.
fn passes(report: &FeedReport, strict: bool) -> bool {
    report.dropped.is_empty() && report.duplicate_ids.is_empty() && !(strict && !report.incomplete.is_empty())
}

fn print_report(path: &Path, report: &FeedReport) {
    println!("{}: {} profile(s)", path.display(), report.profiles);
    for d in &report.dropped {
        println!("  dropped record #{}: {}", d.index, d.reason);
    }
    for id in &report.duplicate_ids {
        println!("  duplicate id: {id}");
    }
    for item in &report.incomplete {
        println!("  {}: missing {}", item.id, item.missing.join(", "));
        if let Some(shop) = &item.suggested_shop {
            println!("    profileShopName could be '{shop}'");
        }
    }
    if report.is_clean() {
        println!("  ok");
    } else {
        warn!(path = %path.display(), "feed has problems");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_errors() {
        assert!(validate_feed("[]").is_err());
        assert!(validate_feed(r#"{"profiles":{}}"#).is_err());
        assert!(validate_feed("{oops").is_err());
    }

    #[test]
    fn test_strict_mode_fails_incomplete_records() {
        let report = validate_feed(r#"{"profiles":[{"id":"1","avatarName":"Lime"}]}"#).unwrap();
        assert_eq!(report.incomplete.len(), 1);
        assert!(report.incomplete[0].missing.contains(&"imageUrl"));
        assert!(passes(&report, false));
        assert!(!passes(&report, true));
    }

    #[test]
    fn test_duplicates_always_fail() {
        let report = validate_feed(r#"{"profiles":[{"id":"1"},{"id":"1"}]}"#).unwrap();
        assert!(!passes(&report, false));
    }
}
