//! Config command implementation.

use anyhow::{bail, Result};
use storefront_core::generate_default_config;

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Init { base_url, force } => init(ctx, &base_url, force),
    }
}

fn show(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("File", &path.display().to_string()),
        None => ctx.output.kv("File", "(defaults)"),
    }
    ctx.output.kv("API", &ctx.config.api.base_url);
    ctx.output
        .kv("Storage", &ctx.config.storage.path().display().to_string());
    println!();
    print!("{}", toml::to_string_pretty(&ctx.config)?);
    Ok(())
}

fn init(ctx: &Context, base_url: &str, force: bool) -> Result<()> {
    let path = ctx.cwd.join("storefront.toml");
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    std::fs::write(&path, generate_default_config(base_url))?;
    ctx.output
        .success(&format!("Created {}", path.display()));
    Ok(())
}
