///
/// This module implements the CLI for gcs-indexer: command parsing, writer
/// parameters and the async entrypoint.
///
/// All indexing logic (document mapping, content selection, ACLs, writer
/// lifecycle) lives in the [`gcs-indexer-core`] crate. This module only wires
/// the production [`DefaultHelper`] into a writer and drives a batch.
///
/// ## How To Use
/// - From the shell: `gcs-indexer index --config cfg.yaml --input docs.jsonl`
///   or `gcs-indexer delete --config cfg.yaml <id>...`.
/// - From code and tests: call [`run`] with a constructed [`Cli`].
///
/// [`gcs-indexer-core`]: ../../gcs-indexer-core/
use crate::batch::{delete_session, index_session, BatchReport};
use crate::helper::DefaultHelper;
use anyhow::Result;
use clap::{Parser, Subcommand};
use gcs_indexer_core::contract::IndexWriterParams;
use gcs_indexer_core::writer::{
    CloudSearchIndexWriter, CONFIG_KEY_CONFIG_FILE, CONFIG_KEY_UPLOAD_FORMAT,
};
use std::path::{Path, PathBuf};

/// CLI for gcs-indexer: push crawled documents into a hosted search index.
#[derive(Parser, Debug)]
#[clap(
    name = "gcs-indexer",
    version,
    about = "Index crawled documents (JSON lines) into a hosted search datasource"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index every document in a JSON-lines file
    Index {
        /// Path to the YAML backend-client config file
        #[clap(long)]
        config: PathBuf,
        /// JSON-lines file with one document object per line
        #[clap(long)]
        input: PathBuf,
        /// RAW (base64 `binaryContent`) or TEXT (`content`); defaults to RAW
        #[clap(long)]
        upload_format: Option<String>,
    },
    /// Delete items by id
    Delete {
        /// Path to the YAML backend-client config file
        #[clap(long)]
        config: PathBuf,
        /// Item ids to delete
        #[clap(required = true)]
        ids: Vec<String>,
    },
}

/// Writer parameters for the given config path and optional upload format.
pub fn writer_params(config: &Path, upload_format: Option<&str>) -> IndexWriterParams {
    let mut params = IndexWriterParams::new();
    params.insert(CONFIG_KEY_CONFIG_FILE, config.display().to_string());
    if let Some(format) = upload_format {
        params.insert(CONFIG_KEY_UPLOAD_FORMAT, format);
    }
    params
}

fn print_report(report: &BatchReport, writer: &CloudSearchIndexWriter) {
    let stats = writer.stats();
    println!("{report}");
    println!(
        "Backend: {} indexed, {} failed, {} deleted",
        stats.indexed, stats.failed, stats.deleted
    );
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!(command = ?cli.command, "[RUN] Starting");

    match cli.command {
        Commands::Index {
            config,
            input,
            upload_format,
        } => {
            let params = writer_params(&config, upload_format.as_deref());
            let mut writer = CloudSearchIndexWriter::new(DefaultHelper);
            match index_session(&mut writer, &params, &input).await {
                Ok(report) => {
                    tracing::info!(command = "index", ?report, "[RUN] Indexing complete");
                    print_report(&report, &writer);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "index", error = %e, "[RUN] Indexing failed");
                    Err(e)
                }
            }
        }
        Commands::Delete { config, ids } => {
            let params = writer_params(&config, None);
            let mut writer = CloudSearchIndexWriter::new(DefaultHelper);
            match delete_session(&mut writer, &params, &ids).await {
                Ok(report) => {
                    tracing::info!(command = "delete", ?report, "[RUN] Deletes complete");
                    print_report(&report, &writer);
                    if report.failed_deletes > 0 {
                        anyhow::bail!("{} of {} deletes failed", report.failed_deletes, ids.len());
                    }
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "delete", error = %e, "[RUN] Deletes failed");
                    Err(e)
                }
            }
        }
    }
}
