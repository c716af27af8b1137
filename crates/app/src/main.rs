// CLI modules
mod cli;
mod payload;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Health, ReceivePayload, SendPayload, Serve, Version};

command_enum! {
    (Serve, Serve),
    (Send, SendPayload),
    (Receive, ReceivePayload),
    (Health, Health),
    (Version, Version),
}

async fn run(args: Args) -> anyhow::Result<String> {
    let ctx = cli::op::OpContext::new(args.remote).context("failed to create API client")?;
    let output = args.command.execute(&ctx).await?;
    Ok(output.to_string())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match run(args).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
