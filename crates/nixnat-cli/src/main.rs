//! nixnat - command-line access to an XNAT project.
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use nixnat_core::dicom::{classify_directory, classify_file};
use nixnat_core::{
    CredentialStore, Credentials, HttpTransport, HttpTransportConfig, ScanFilter, ScanSyncRequest,
    Transport, XnatApi,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "nixnat")]
#[command(about = "Download scans from XNAT and sort DICOM files by acquisition")]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Directory holding xnat.json (defaults to ~/.niftypet)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Reuse an existing session cookie instead of logging in
    #[arg(long, global = true)]
    cookie: Option<String>,

    /// Accept self-signed server certificates
    #[arg(long, global = true)]
    insecure: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prompt for project, server and login, and store them
    Setup {
        /// Preferred download directory
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Print the rows of a listing URI
    List { uri: String },
    /// Download scans of one experiment
    Scans {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        experiment: String,
        /// Scan type substring (repeatable)
        #[arg(long = "type", conflicts_with = "ids")]
        types: Vec<String>,
        /// Exact scan ID (repeatable)
        #[arg(long = "id")]
        ids: Vec<String>,
        /// Accepted resource format (repeatable, defaults to DICOM and NIFTI)
        #[arg(long = "format")]
        formats: Vec<String>,
        #[arg(long)]
        out: Option<PathBuf>,
        /// Suffix appended to every file name
        #[arg(long, default_value = "")]
        comment: String,
        /// Leave the scan quality out of directory and file names
        #[arg(long)]
        no_quality: bool,
        /// List files without downloading
        #[arg(long)]
        info_only: bool,
    },
    /// Download the files of an experiment resource
    Resources {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        experiment: String,
        #[arg(long)]
        resource: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Classify DICOM files or directories
    Classify {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let store = match &args.config_dir {
        Some(dir) => CredentialStore::new(dir),
        None => CredentialStore::default_location()?,
    };

    match args.command {
        Command::Setup { dir } => setup(&store, dir),
        Command::List { uri } => {
            let api = open(&store, args.cookie, args.insecure).await?;
            let rows = api.list(&uri).await?;
            print_json(&rows)
        }
        Command::Scans {
            subject,
            experiment,
            types,
            ids,
            formats,
            out,
            comment,
            no_quality,
            info_only,
        } => {
            let mut request = ScanSyncRequest::new(&subject, experiment.as_str())
                .filter(ScanFilter::new(types, ids)?)
                .comment(&comment)
                .quality_in_path(!no_quality)
                .info_only(info_only);
            if !formats.is_empty() {
                request = request.formats(formats);
            }
            if let Some(out) = out {
                request = request.destination(out);
            }

            let api = open(&store, args.cookie, args.insecure).await?;
            let manifest = api.sync_scans(&request).await?;
            print_json(&manifest)
        }
        Command::Resources {
            subject,
            experiment,
            resource,
            out,
        } => {
            let api = open(&store, args.cookie, args.insecure).await?;
            let files = api
                .experiment_resource_files(&subject, &experiment, &resource)
                .await?;
            let manifest = api.sync_resources(&files, out.as_deref()).await?;
            print_json(&manifest)
        }
        Command::Classify { paths } => classify(&paths),
    }
}

/// Log in with the stored credentials, or resume a given cookie.
async fn open(store: &CredentialStore, cookie: Option<String>, insecure: bool) -> Result<XnatApi> {
    if !store.exists() {
        bail!(
            "No credentials at {}; run `nixnat setup` first",
            store.path().display()
        );
    }
    let credentials = store.load()?;

    let config = HttpTransportConfig {
        accept_invalid_certs: insecure,
        ..Default::default()
    };
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::with_config(config)?);

    match cookie {
        Some(cookie) => Ok(XnatApi::resume(credentials, transport, cookie)?),
        None => Ok(XnatApi::with_transport(credentials, transport).await?),
    }
}

fn setup(store: &CredentialStore, dir: Option<PathBuf>) -> Result<()> {
    let stdin = std::io::stdin();
    let credentials = read_credentials(&mut stdin.lock(), |label| {
        rpassword::prompt_password(format!("{}: ", label))
    })?;
    let credentials = match dir {
        Some(dir) => credentials.with_output_dir(dir),
        None => credentials,
    };

    if store.exists() {
        warn!("Overwriting {}", store.path().display());
    }
    store.save(&credentials)?;
    info!("Subjects collection: {}", credentials.subjects_url);
    Ok(())
}

/// Ask for project, server and username on `input`; the password goes
/// through `read_password` so it is never echoed.
fn read_credentials(
    input: &mut impl BufRead,
    read_password: impl FnOnce(&str) -> std::io::Result<String>,
) -> Result<Credentials> {
    let project = prompt(input, "Project ID")?;
    let url = prompt(input, "Server URL")?;
    let username = prompt(input, "Username")?;
    let password = read_password("Password").context("Failed to read Password")?;
    if project.is_empty() || url.is_empty() {
        bail!("Project ID and server URL are required");
    }
    Ok(Credentials::new(&project, &url, &username, &password))
}

fn prompt(input: &mut impl BufRead, label: &str) -> Result<String> {
    eprint!("{}: ", label);
    std::io::stderr().flush()?;
    let mut line = String::new();
    input
        .read_line(&mut line)
        .with_context(|| format!("Failed to read {}", label))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Group files by label sequence (`mr/t1/mmr`) and print the groups.
fn classify(paths: &[PathBuf]) -> Result<()> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for path in paths {
        if path.is_dir() {
            for (labels, files) in classify_directory(path) {
                groups
                    .entry(labels.join("/"))
                    .or_default()
                    .extend(files.iter().map(|f| f.display().to_string()));
            }
            continue;
        }
        match classify_file(path) {
            Ok(result) => groups
                .entry(result.labels().join("/"))
                .or_default()
                .push(path.display().to_string()),
            Err(e) => warn!("{}", e),
        }
    }
    print_json(&groups)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
