use std::path::PathBuf;

use anyhow::{bail, Context};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args_os().skip(1);
    let Some(script) = args.next().map(PathBuf::from) else {
        bail!("usage: mathpad <script.json> [output.png]");
    };
    let output = args.next().map(PathBuf::from);

    let report = mathpad::run(&script, output.as_deref())
        .with_context(|| format!("replaying {}", script.display()))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
