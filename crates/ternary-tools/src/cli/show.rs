use gguf_parser::{GGUFFile, TensorView, format_balanced_ternary};
use tracing::debug;

use crate::cli::{GlobalArgs, ShowArgs};
use crate::config::AppConfig;

/// Bytes per line in `--raw` dumps.
const HEX_ROW: usize = 16;

pub fn execute(global: &GlobalArgs, args: ShowArgs) -> anyhow::Result<()> {
    let cfg = AppConfig::load_or_default()?;
    let head = cfg.preview_len(args.head);
    let file = GGUFFile::open(&args.file)?;
    let view = file.tensor(&args.tensor)?;
    let t = view.descriptor();
    debug!(tensor = %t.name, head, raw = args.raw, "show");

    println!(
        "Tensor : {} | Shape : {} | Type : {}",
        t.name,
        t.shape(),
        t.type_name()
    );
    for line in body(&view, head, args.raw, global.ternary(&cfg))? {
        println!("{line}");
    }
    Ok(())
}

/// Lines printed under the tensor header line.
fn body(view: &TensorView<'_>, head: usize, raw: bool, ternary: bool) -> anyhow::Result<Vec<String>> {
    if raw {
        return Ok(hex_dump(view.raw_prefix(head.saturating_mul(HEX_ROW))));
    }
    if !view.can_preview() {
        let mut lines = vec![format!(
            "(no decoder for {}; showing raw bytes)",
            view.descriptor().type_name()
        )];
        lines.extend(hex_dump(view.raw_prefix(head.saturating_mul(HEX_ROW))));
        return Ok(lines);
    }

    let mut lines = value_lines(view, head, ternary)?;
    let shown = lines.len() as u64;
    let total = view.descriptor().element_count().unwrap_or(0);
    if total > shown {
        lines.push(format!("... ({} more elements)", total - shown));
    }
    Ok(lines)
}

fn value_lines(view: &TensorView<'_>, head: usize, ternary: bool) -> anyhow::Result<Vec<String>> {
    if let Some(ints) = view.integer_preview(head) {
        return Ok(ints
            .iter()
            .enumerate()
            .map(|(i, n)| {
                if ternary {
                    format!(" [{i}] {n} ({})", format_balanced_ternary(*n))
                } else {
                    format!(" [{i}] {n}")
                }
            })
            .collect());
    }
    Ok(view
        .preview(head)?
        .iter()
        .enumerate()
        .map(|(i, v)| format!(" [{i}] {v:.6}"))
        .collect())
}

fn hex_dump(bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(HEX_ROW)
        .enumerate()
        .map(|(row, chunk)| {
            let hex = chunk
                .iter()
                .map(|b| format!("{b:02x}"))
                .collect::<Vec<_>>()
                .join(" ");
            format!("{:08x}: {hex}", row * HEX_ROW)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// v3 file with one tensor `t` of the given shape and type, data at 32.
    fn one_tensor_file(dims: &[u64], type_id: u32, data: &[u8]) -> GGUFFile {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"GGUF");
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.push(b't');
        bytes.extend_from_slice(&(dims.len() as u32).to_le_bytes());
        for d in dims {
            bytes.extend_from_slice(&d.to_le_bytes());
        }
        bytes.extend_from_slice(&type_id.to_le_bytes());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes.resize(bytes.len().div_ceil(32) * 32, 0);
        bytes.extend_from_slice(data);
        GGUFFile::from_bytes(bytes).unwrap()
    }

    #[test]
    fn hex_rows_carry_offsets() {
        let bytes: Vec<u8> = (0..20).collect();
        let lines = hex_dump(&bytes);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000000: 00 01 02"));
        assert_eq!(lines[1], "00000010: 10 11 12 13");
    }

    #[test]
    fn undecodable_type_falls_back_to_hex() {
        // Q4_K has no preview decoder
        let file = one_tensor_file(&[256], 12, &[0xAB; 144]);
        let view = file.tensor("t").unwrap();
        let lines = body(&view, 2, false, false).unwrap();
        assert_eq!(lines[0], "(no decoder for Q4_K; showing raw bytes)");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("00000000: ab ab"));
    }

    #[test]
    fn values_with_remainder_line() {
        let data: Vec<u8> = [5i32, -2, 9].iter().flat_map(|v| v.to_le_bytes()).collect();
        let file = one_tensor_file(&[3], 26, &data);
        let view = file.tensor("t").unwrap();
        assert_eq!(
            body(&view, 2, false, true).unwrap(),
            vec![" [0] 5 (+--)", " [1] -2 (-+)", "... (1 more elements)"]
        );
    }
}
