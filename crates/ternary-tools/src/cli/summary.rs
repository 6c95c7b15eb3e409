use gguf_parser::{GGUFFile, Summary};
use tracing::debug;

use crate::cli::{GlobalArgs, SummaryArgs};
use crate::config::AppConfig;

pub fn execute(global: &GlobalArgs, args: SummaryArgs) -> anyhow::Result<()> {
    let cfg = AppConfig::load_or_default()?;
    let file = GGUFFile::open(&args.file)?;
    let summary = Summary::new(&file);
    debug!(path = %args.file.display(), tensors = summary.tensor_count, "summary");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary.render(global.ternary(&cfg)));
    }
    Ok(())
}
