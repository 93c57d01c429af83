use std::fs::File;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

mod cli;

use cli::{Cli, OutputFormat};
use ytsum::config::{API_KEY_ENV, Config, Overrides, Settings, config_path};
use ytsum::output::{render_json, render_text};
use ytsum::pipeline::{Outcome, Pipeline};
use ytsum::summarize::GeminiClient;
use ytsum::youtube::YouTubeClient;

const BUSY_MESSAGE: &str = "Fetching transcript and generating summary... This may take a moment.";

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytsum.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsum")
        .join("logs")
}

fn build_after_help() -> String {
    let key_line = match std::env::var(API_KEY_ENV) {
        Ok(v) if !v.trim().is_empty() => format!("  \x1b[32m✅\x1b[0m {API_KEY_ENV}  set"),
        _ => format!("  \x1b[31m❌\x1b[0m {API_KEY_ENV}  (not set; gemini_api_key in the config file also works)"),
    };

    format!(
        "\nCREDENTIALS:\n{key_line}\n\nConfig is read from: {}\nLogs are written to: {}",
        config_path().display(),
        log_dir().join("ytsum.log").display()
    )
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Run one submission and write its rendering; returns whether it succeeded
async fn submit(pipeline: &mut Pipeline, link: &str, cli: &Cli, out: &mut dyn Write) -> Result<bool> {
    let spinner = (!link.trim().is_empty()).then(|| create_spinner(BUSY_MESSAGE));
    let outcome = pipeline.submit(link).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if let (true, Outcome::Success(report)) = (cli.verbose, &outcome) {
        eprintln!("Video: {}\nCached transcript: {}", report.video_id, report.cached);
    }

    let rendered = match cli.format {
        OutputFormat::Text => render_text(&outcome),
        OutputFormat::Json => render_json(&outcome),
    };
    writeln!(out, "{rendered}")?;
    out.flush()?;

    Ok(matches!(outcome, Outcome::Success(_)))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring unreadable config {}: {e}", config_path().display());
        Config::default()
    });

    let overrides = Overrides {
        model: cli.model.clone(),
        languages: cli.langs.clone(),
        no_cache: cli.no_cache,
    };

    // No key, no UI: refuse to start before reading any input
    let settings = Settings::resolve(&config, overrides, std::env::var(API_KEY_ENV).ok())
        .wrap_err("ytsum cannot start without a Gemini API key")?;
    debug!("Resolved settings: {settings:?}");

    let http = reqwest::Client::new();
    let transcripts = Arc::new(YouTubeClient::new(http.clone()));
    let generator = Arc::new(GeminiClient::new(http, &settings));
    let mut pipeline = Pipeline::new(&settings, transcripts, generator);

    let mut out: Box<dyn Write> = match cli.output {
        Some(ref path) => Box::new(
            File::create(path).wrap_err_with(|| format!("cannot write output to {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };

    if let Some(ref url) = cli.url {
        let ok = submit(&mut pipeline, url, &cli, out.as_mut()).await?;
        return Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    loop {
        if interactive {
            eprint!("Enter YouTube Video Link: ");
            io::stderr().flush()?;
        }

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        submit(&mut pipeline, line.trim_end_matches(['\r', '\n']), &cli, out.as_mut()).await?;
    }

    Ok(ExitCode::SUCCESS)
}
