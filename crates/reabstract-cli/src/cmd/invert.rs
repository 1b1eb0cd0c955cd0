//! Invert subcommand - reconstruct a single abstract

use std::io::Read;

use anyhow::{Context, Result, anyhow};
use clap::Args;

#[derive(Args, Debug)]
pub struct InvertArgs {
    /// Serialized inverted index (`{"IndexLength":..,"InvertedIndex":{..}}`).
    /// Read from stdin when omitted or "-"
    pub payload: Option<String>,

    /// Strip the trailing separator from the output
    #[arg(long)]
    pub trim: bool,
}

pub fn run(args: InvertArgs) -> Result<()> {
    let payload = match args.payload {
        Some(p) if p != "-" => p,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read payload from stdin")?;
            buf
        }
    };

    let text = reabstract_openalex::invert(payload.trim())
        .map_err(|e| anyhow!("{}: {e}", e.kind()))?;
    if args.trim {
        println!("{}", text.strip_suffix(' ').unwrap_or(&text));
    } else {
        println!("{text}");
    }
    Ok(())
}
