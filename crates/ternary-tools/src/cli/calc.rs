use gguf_parser::{format_balanced_ternary, parse_balanced_ternary};

use crate::cli::CalcArgs;

pub fn execute(args: CalcArgs) -> anyhow::Result<()> {
    println!("{}", convert(args.value.trim())?);
    Ok(())
}

/// Decimal in, balanced ternary out; or the reverse.
fn convert(value: &str) -> anyhow::Result<String> {
    if let Ok(n) = value.parse::<i64>() {
        return Ok(format!("{n} = {}", format_balanced_ternary(n)));
    }
    let n = parse_balanced_ternary(value)
        .map_err(|e| anyhow::anyhow!("'{value}' is neither a decimal integer nor balanced ternary: {e}"))?;
    Ok(format!("{value} = {n}"))
}
