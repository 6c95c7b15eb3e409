use gguf_parser::{GGUFFile, GGUFValue, format_balanced_ternary};
use tracing::debug;

use crate::cli::{GlobalArgs, InfoArgs};
use crate::config::AppConfig;

/// Metadata keys whose integer values are also shown in balanced ternary.
const TERNARY_KEY_HINTS: &[&str] = &["count", "size", "dim", "param", "length"];

pub fn execute(global: &GlobalArgs, args: InfoArgs) -> anyhow::Result<()> {
    let cfg = AppConfig::load_or_default()?;
    let ternary = global.ternary(&cfg);
    let file = GGUFFile::open(&args.file)?;
    let model = file.model();
    debug!(path = %args.file.display(), ternary, "info");

    if args.json {
        println!("{}", serde_json::to_string_pretty(model)?);
        return Ok(());
    }

    println!(
        "GGUF v{} | {} tensors | {} metadata KV | {}",
        model.header.version,
        model.header.tensor_count,
        model.header.metadata_kv_count,
        human_size(model.file_size)
    );
    println!("{:=<80}", "=");
    println!("METADATA");
    println!("{:=<80}", "=");
    for kv in &model.metadata {
        println!("{:<40} = {}", kv.key, metadata_value(&kv.key, &kv.value, ternary));
    }

    println!("\n{:=<80}", "=");
    println!("TENSORS");
    println!("{:=<80}", "=");
    for t in &model.tensors {
        let size = t.byte_len.map_or_else(|| "-".to_string(), human_size);
        println!(
            "{:<48} {:<20} {:<8} {:>10} offset={}",
            t.name,
            t.shape(),
            t.type_name(),
            size,
            t.offset
        );
    }
    println!(
        "\nData section at offset {} (alignment {}), {} in tensors.",
        model.data_offset,
        model.alignment,
        human_size(model.tensor_bytes())
    );
    Ok(())
}

fn metadata_value(key: &str, value: &GGUFValue, ternary: bool) -> String {
    match value.as_i64() {
        Some(n) if ternary && TERNARY_KEY_HINTS.iter().any(|h| key.contains(h)) => {
            format!("{value} ({})", format_balanced_ternary(n))
        }
        _ => value.to_string(),
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    for &unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} PiB")
}
