//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for trio
#[derive(Parser, Debug)]
#[command(name = "trio")]
#[command(author, version, about = "OpenAI-compatible endpoint that composes several models into one")]
#[command(long_about = r#"
Trio serves an OpenAI-compatible chat-completions API. A request whose
`model` is a plain name is forwarded unchanged to the backend. A request
whose `model` is a composite runs several backend models and combines them:

  trio      A and B draft in parallel, C synthesizes both drafts
  ensemble  N members draft in parallel, then one aggregation method
            (acceptance_voting, random, judge, synthesize, concat)

Composites nest: any member may itself be a trio or an ensemble.

Configuration files are loaded from (in priority order):
1. TRIO_* environment variables
2. --config <path>     Explicit config file
3. ./trio.toml         Project-level config
4. ~/.config/trio/config.toml   Global config

Example:
  trio --backend-url http://localhost:4000 --port 8000
  curl localhost:8000/v1/chat/completions -d '{
    "model": {"trio": [{"model": "gpt-4o"}, {"model": "claude"}, {"model": "gpt-4o"}]},
    "messages": [{"role": "user", "content": "Hi"}]
  }'
"#)]
pub struct Cli {
    /// Address to listen on (overrides [server] host)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on (overrides [server] port)
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the OpenAI-compatible backend (overrides [backend] url)
    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Write the JSONL trace log to this file (overrides [logging] trace_file)
    #[arg(long, value_name = "PATH")]
    pub trace_file: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Default log filter for the `-v` count, used when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn,trio=info",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
