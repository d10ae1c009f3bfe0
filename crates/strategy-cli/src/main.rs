//! Command-line front end for the market strategy pipeline
//!
//! # Usage
//!
//! ```bash
//! export GOOGLE_API_KEY="..."
//! market-strategy --topic "Renewable energy India" --output-dir reports
//!
//! # OpenAI-compatible server
//! export OPENAI_API_KEY="not-needed"
//! market-strategy --provider openai --api-base http://localhost:1234/v1 --model local-model
//! ```

use anyhow::{Context, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use strategy_agents::{LlmBackend, StrategyConfig, build_pipeline};
use strategy_utils::{LogConfig, LogFormat, init_tracing_with};
use strategy_workflow::{PipelineRun, StageEvent};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "market-strategy", version)]
#[command(about = "Generate a market entry strategy report for a topic", long_about = None)]
struct Args {
    /// Market or topic to research; prompted for when omitted
    #[arg(short, long)]
    topic: Option<String>,

    /// Directory the chart and report are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Language-model backend (gemini or openai)
    #[arg(short, long)]
    provider: Option<LlmBackend>,

    /// Model name; defaults to the backend's default model
    #[arg(short, long)]
    model: Option<String>,

    /// Custom API base URL for the backend
    #[arg(long)]
    api_base: Option<String>,

    /// Log output format (pretty or json)
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,

    /// Log pipeline progress at info level
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> anyhow::Result<StrategyConfig> {
        let mut builder = StrategyConfig::builder();
        if let Some(dir) = &self.output_dir {
            builder = builder.output_dir(dir);
        }
        if let Some(provider) = self.provider {
            builder = builder.provider(provider);
        }
        if let Some(model) = &self.model {
            builder = builder.model(model);
        }
        if let Some(base) = &self.api_base {
            builder = builder.api_base(base);
        }
        let config = builder
            .with_env()?
            .build()
            .context("invalid configuration")?;
        Ok(config)
    }
}

fn read_topic() -> anyhow::Result<String> {
    print!("Enter market/topic (e.g. Renewable energy India): ");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("no topic given");
    }
    Ok(line.trim().to_string())
}

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("Running multi-agent workflow...");
    spinner
}

fn print_summary(run: &PipelineRun) {
    for stage in &run.stages {
        println!("  {:<16} {:>8.2}s", stage.stage_name, stage.duration.as_secs_f64());
    }
    if let Some(path) = run.output_path() {
        println!("Report generated: {path}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing_with(&LogConfig {
        default_filter: if args.verbose { "info" } else { "warn" }.to_string(),
        format: args.log_format,
    });

    let config = args.config()?;
    let topic = match &args.topic {
        Some(topic) => topic.trim().to_string(),
        None => read_topic()?,
    };
    if topic.is_empty() {
        bail!("topic must not be empty");
    }

    info!(
        topic = %topic,
        provider = %config.provider,
        model = %config.model,
        output_dir = %config.output_dir.display(),
        "Starting market strategy run"
    );
    let pipeline = build_pipeline(&config)?;

    let progress = spinner();
    let observer = {
        let progress = progress.clone();
        move |event: StageEvent| {
            if let StageEvent::Started { index, total, name } = event {
                progress.set_message(format!("[{}/{}] {}", index + 1, total, name));
            }
        }
    };
    let result = pipeline.run_observed(topic.as_str(), observer).await;
    progress.finish_and_clear();

    match result {
        Ok(run) => {
            print_summary(&run);
            Ok(())
        }
        Err(e) => {
            error!(stage = ?e.failed_stage(), "Pipeline failed");
            Err(e).context("strategy generation failed")
        }
    }
}
