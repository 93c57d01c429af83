use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "ytsum",
    about = "Summarize a YouTube video from its transcript with Gemini",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video link (prompts for links on stdin if omitted)
    pub url: Option<String>,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Transcript languages in order of preference [default: en]
    #[arg(short, long = "lang", value_delimiter = ',')]
    pub langs: Vec<String>,

    /// Gemini model for summarization [default: gemini-2.0-flash]
    #[arg(short, long)]
    pub model: Option<String>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Always fetch transcripts, even for links seen earlier in this run
    #[arg(long)]
    pub no_cache: bool,

    /// Show video id and cache status for each submission
    #[arg(short, long)]
    pub verbose: bool,
}
