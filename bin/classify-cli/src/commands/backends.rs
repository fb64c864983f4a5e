// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The `backends` subcommand: list execution backends and whether they
//! can run on this machine.

use compute_backend::{BackendKind, GpuContext};

pub fn run() -> anyhow::Result<()> {
    for kind in BackendKind::all() {
        let status = if kind.requires_gpu() {
            match GpuContext::acquire(kind) {
                Ok(ctx) => format!("available ({})", ctx.adapter_name),
                Err(e) => format!("unavailable: {e}"),
            }
        } else {
            "available".to_string()
        };
        println!("{:<16} {status}", kind.name());
    }
    Ok(())
}
