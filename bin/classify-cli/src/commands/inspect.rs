// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The `inspect` subcommand: show what a model directory contains.

use classifier_model::{load_labels, ModelLoader};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct InspectArgs {
    /// Model directory holding model.json.
    #[arg(long)]
    model: PathBuf,

    /// Quote-delimited label file to check against the class count.
    #[arg(long)]
    labels: Option<PathBuf>,
}

pub fn run(args: InspectArgs) -> anyhow::Result<()> {
    let handle = ModelLoader::load(&args.model)?;
    let manifest = handle.manifest();

    println!("{}", manifest.summary());
    println!(
        "weights: {}",
        if handle.is_file_backed() {
            "file-backed (weights.bin)"
        } else {
            "synthetic (no weights.bin found)"
        }
    );
    for (i, (in_f, out_f)) in manifest.layer_dims().into_iter().enumerate() {
        println!("  layer {i}: {in_f} -> {out_f}");
    }

    if let Some(path) = &args.labels {
        let labels = load_labels(path)?;
        let status = if labels.len() == handle.num_classes() {
            "matches the class count"
        } else {
            "DOES NOT match the class count"
        };
        println!("labels: {} entries, {status}", labels.len());
        for (i, label) in labels.iter().enumerate() {
            println!("  {i}: {label}");
        }
    }

    Ok(())
}
