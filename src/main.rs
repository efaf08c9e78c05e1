use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use mkuzo_admissions::{
    AdmissionForm, AdmissionsResult,
    logging,
    services::{
        export_service::{DEFAULT_EXPORT_FILENAME, DEFAULT_SHEET_NAME, ExportOptions},
        messaging_service::{BatchPolicy, StdoutLinkOpener},
    },
    state::{AppConfig, AppState},
    utils::recipients,
};

/// Admission form client: submissions, admin listing, bulk messaging and export.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit an admission form given as a flat JSON object of form fields
    Submit { form: PathBuf },

    /// Print all admissions as JSON (remote, falling back to the local backup)
    List,

    /// Open WhatsApp links for every recipient, in batches
    Whatsapp {
        /// Recipients separated by newlines, commas or semicolons, or @file
        #[arg(long)]
        numbers: String,
        #[arg(long)]
        message: String,
        #[arg(long)]
        batch_size: Option<usize>,
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Open sms: links for every recipient
    Sms {
        #[arg(long)]
        numbers: String,
        #[arg(long)]
        message: String,
    },

    /// Export all admissions to an xlsx workbook
    Export {
        #[arg(long, default_value = DEFAULT_EXPORT_FILENAME)]
        output: PathBuf,
        #[arg(long, default_value = DEFAULT_SHEET_NAME)]
        sheet: String,
    },
}

fn read_numbers(arg: &str) -> AdmissionsResult<Vec<String>> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => arg.to_string(),
    };
    Ok(recipients::parse(&text))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let args = Args::parse();

    let config = AppConfig::from_env()?;
    let state = AppState::new(config, Arc::new(StdoutLinkOpener))?;

    match args.command {
        Command::Submit { form } => {
            let form: AdmissionForm = serde_json::from_str(&std::fs::read_to_string(form)?)?;
            let outcome = state.submission_service.submit(&form).await?;
            println!("{}", outcome.reference());
        }
        Command::List => {
            let records = state.sync_client.list().await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Whatsapp { numbers, message, batch_size, delay_ms } => {
            let defaults = state.config.batch_policy();
            let policy = BatchPolicy::new(
                batch_size.unwrap_or(defaults.batch_size),
                delay_ms.map(Duration::from_millis).unwrap_or(defaults.delay),
            );
            let numbers = read_numbers(&numbers)?;
            let summary = state.whatsapp.run_with(&numbers, &message, policy).await?;
            tracing::info!(
                "Opened {} WhatsApp links in {} batches ({} failed)",
                summary.opened,
                summary.batch_sizes.len(),
                summary.failed
            );
        }
        Command::Sms { numbers, message } => {
            let numbers = read_numbers(&numbers)?;
            state.sms.dispatch(&numbers, &message);
        }
        Command::Export { output, sheet } => {
            let records = state.sync_client.list().await?;
            let options = ExportOptions::default().with_filename(output).with_sheet_name(sheet);
            let summary = state.export_service.export_records(&records, &options)?;
            println!("{}", summary.path.display());
        }
    }

    Ok(())
}
