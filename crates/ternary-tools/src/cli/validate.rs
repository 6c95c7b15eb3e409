use gguf_parser::GGUFFile;
use tracing::{info, warn};

use crate::cli::ValidateArgs;

pub fn execute(args: ValidateArgs) -> anyhow::Result<()> {
    let file = GGUFFile::open(&args.file)?;
    let report = file.validate();
    let blocking = report.blocking().count();
    let advisories = report.advisories().count();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for finding in &report.findings {
            println!("{finding}");
        }
        if report.is_clean() {
            println!("No findings.");
        }
        println!("Checksum : {}", file.checksum());
    }

    if blocking > 0 {
        warn!(path = %args.file.display(), blocking, advisories, "validation failed");
        anyhow::bail!(
            "{} has {blocking} blocking finding(s)",
            args.file.display()
        );
    }
    info!(path = %args.file.display(), advisories, "validation passed");
    Ok(())
}
