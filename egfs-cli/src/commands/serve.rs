use anyhow::Result;
use colored::Colorize;
use egfs_server::EgfsServer;

use crate::GlobalArgs;

pub async fn run(global: &GlobalArgs, port: Option<u16>) -> Result<()> {
    let config = super::load_config(global)?;
    let port = port.unwrap_or(config.port);
    let password = super::password(global, false)?;

    println!("{}", "🚀 Starting egfs server...".bold().cyan());
    println!("   {}: {:?}", "Repository".bold(), config.workdir);
    println!("   {}: {}", "Index branch".bold(), config.primary_branch);

    let server = EgfsServer::from_config(&config, password.as_bytes())?;

    println!(
        "   {}: {}",
        "Files".bold(),
        format!("http://localhost:{}/files", port).green()
    );
    println!();
    println!("{}", "Press Ctrl+C to stop".dimmed());
    println!();

    let addr = format!("0.0.0.0:{}", port).parse()?;
    server.serve(addr).await?;

    Ok(())
}
