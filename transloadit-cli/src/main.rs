//! Transloadit CLI
//!
//! Credentials come from `TRANSLOADIT_KEY` / `TRANSLOADIT_SECRET` (or `.env`).
//!
//! ```bash
//! # Submit files to a template and wait for the result
//! transloadit submit 0123abcd video.mp4 poster.jpg --field tag=launch
//!
//! # Print a signed Smart CDN URL
//! transloadit smart-cdn my-app thumbs inputs/cat.jpg width=200 height=200
//! ```
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


mod params;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};
use transloadit_client::lifecycle::DEFAULT_RELOAD_TRIES;
use transloadit_client::{
    AssemblyOptions, AssemblyStatusExt, CancellationToken, CreateParams, SmartCdnRequest,
    Transloadit, Upload,
};
use transloadit_config::TransloaditConfig;
use transloadit_logging::{init_logging, LogFormat};

/// Transloadit command-line client
#[derive(Parser)]
#[command(name = "transloadit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format, `console` or `json` [env: TRANSLOADIT_LOG_FORMAT]
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an assembly from a template and poll it until it finishes
    Submit {
        template_id: String,

        /// Files to upload; none for templates that import their input
        files: Vec<PathBuf>,

        /// Form field as `name=value` (repeatable)
        #[arg(short, long = "field", value_parser = params::parse_pair)]
        fields: Vec<(String, String)>,

        /// Print the creation reply without polling
        #[arg(long)]
        no_wait: bool,

        #[arg(long, default_value_t = DEFAULT_RELOAD_TRIES)]
        reload_tries: u32,
    },

    /// Print a signed Smart CDN URL
    SmartCdn {
        workspace: String,
        template: String,
        input: String,

        /// URL parameters as `key=value`; repeat a key to send a list
        url_params: Vec<String>,

        #[arg(long)]
        expire_in_ms: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TransloaditConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    let level = match cli.verbose {
        0 => config.log_level(),
        1 => "debug",
        _ => "trace",
    };
    let format = match cli.log_format {
        Some(format) => format,
        None => config.log_format().parse().map_err(anyhow::Error::msg)?,
    };
    init_logging("transloadit", level, format);

    let transloadit = Transloadit::from_config(&config).context("Failed to create client")?;

    match cli.command {
        Commands::Submit {
            template_id,
            files,
            fields,
            no_wait,
            reload_tries,
        } => {
            let cancel = CancellationToken::new();
            let trigger = cancel.clone();
            tokio::spawn(async move {
                if signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, stopping");
                    trigger.cancel();
                }
            });

            let mut options = AssemblyOptions::new().template_id(template_id);
            for (name, value) in fields {
                options = options.field(name, value);
            }

            submit(&transloadit, options, &files, no_wait, reload_tries, &cancel).await
        }
        Commands::SmartCdn {
            workspace,
            template,
            input,
            url_params,
            expire_in_ms,
        } => {
            let mut request = SmartCdnRequest::new(workspace, template, input);
            let url_params =
                params::group_url_params(&url_params).map_err(anyhow::Error::msg)?;
            for (key, value) in url_params {
                request = request.param(key, value);
            }
            if let Some(expire_in_ms) = expire_in_ms {
                request = request.expire_in_ms(expire_in_ms);
            }

            println!("{}", transloadit.signed_smart_cdn_url(&request)?);
            Ok(())
        }
    }
}

async fn submit(
    transloadit: &Transloadit,
    options: AssemblyOptions,
    files: &[PathBuf],
    no_wait: bool,
    reload_tries: u32,
    cancel: &CancellationToken,
) -> Result<()> {
    let uploads: Vec<Upload> = files.iter().map(Upload::path).collect();

    let mut assembly = transloadit
        .assembly(options)?
        .create_with(&uploads, CreateParams::default(), cancel)
        .await?;

    info!(
        assembly_id = assembly.assembly_id().unwrap_or_default(),
        files = uploads.len(),
        "Assembly created"
    );

    if !no_wait && !assembly.is_finished() {
        assembly
            .reload_until_finished_with(reload_tries, cancel)
            .await?;
    }

    println!("{}", &*assembly);

    if assembly.is_error() {
        anyhow::bail!(
            "Assembly failed: {}",
            assembly.get_str("message").unwrap_or("unknown error")
        );
    }

    Ok(())
}
