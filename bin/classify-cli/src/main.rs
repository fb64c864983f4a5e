// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `classify` — drive the live classification pipeline from the shell.

mod commands;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "classify", version, about = "Live image classification pipeline")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline over a synthetic frame source.
    Run(commands::run::RunArgs),
    /// Print a model's manifest and label table.
    Inspect(commands::inspect::InspectArgs),
    /// List the available inference backends.
    Backends,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => commands::run::run(args).await,
        Command::Inspect(args) => commands::inspect::run(args),
        Command::Backends => commands::backends::run(),
    }
}
