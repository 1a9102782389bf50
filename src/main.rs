mod config;
mod github;
mod message;
mod pr;
mod report;
mod slack;
mod summary;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, info_span};
use tracing_subscriber::EnvFilter;

use config::Config;
use github::{GitHubClient, PullRequestSource};
use pr::WeeksBack;
use slack::{ChatSink, SlackNotifier};
use summary::{ClaudeClient, CompletionClient, SummaryOutcome};

type BoxError = Box<dyn std::error::Error>;

/// Weekly Updates — track your GitHub pull requests and post updates to Slack.
#[derive(Parser, Debug)]
#[command(name = "weekly-updates", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Post your open PRs that are waiting for reviews
    OpenPrs,

    /// Post your PRs merged in the last few weeks
    MergedPrs(WeeksArg),

    /// Post open PRs, then merged PRs
    All(WeeksArg),

    /// Post an executive summary of open and merged PRs (AI-written when a Claude key is set)
    Summary(WeeksArg),

    /// Print open and merged PRs locally without posting to Slack
    Preview {
        #[command(flatten)]
        weeks: WeeksArg,

        /// Write a markdown report to this path instead of the terminal
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also generate the executive summary (AI-written when a Claude key is set)
        #[arg(short, long)]
        summary: bool,
    },
}

#[derive(Args, Debug)]
struct WeeksArg {
    /// Number of weeks to look back for merged PRs (default: 2, max: 4)
    #[arg(short, long)]
    weeks: Option<u8>,
}

/// Upstream clients built once per process.
struct Clients {
    username: String,
    github: GitHubClient,
}

impl Clients {
    fn new(config: &Config) -> Result<Self, BoxError> {
        Ok(Self {
            username: config.github_username()?,
            github: GitHubClient::new(config.github_api_url(), config.github_token()?),
        })
    }

    fn source(&self) -> &dyn PullRequestSource {
        &self.github
    }
}

/// Claude client when an API key is configured.
fn completion_client(config: &Config) -> Option<ClaudeClient> {
    config
        .claude_api_key()
        .map(|key| ClaudeClient::new(config.claude_api_url(), key, config.claude_model()))
}

fn notifier(config: &Config) -> Result<SlackNotifier, BoxError> {
    Ok(SlackNotifier::new(
        config.slack_api_url(),
        config.slack_bot_token()?,
        config.slack_channel_id()?,
    ))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), BoxError> {
    info!("loading configuration");
    let config = Config::load()?;

    match command {
        Command::OpenPrs => {
            let clients = Clients::new(&config)?;
            let sink = notifier(&config)?;
            check_open_prs(&clients, &sink).await?;
            println!("{}", "✅ Open PRs check completed!".green());
        }
        Command::MergedPrs(arg) => {
            let weeks = config.resolve_weeks(arg.weeks)?;
            let clients = Clients::new(&config)?;
            let sink = notifier(&config)?;
            check_merged_prs(&clients, &sink, weeks).await?;
            println!("{}", "✅ Merged PRs check completed!".green());
        }
        Command::All(arg) => {
            let weeks = config.resolve_weeks(arg.weeks)?;
            let clients = Clients::new(&config)?;
            let sink = notifier(&config)?;
            check_open_prs(&clients, &sink).await?;
            println!("{}", "✅ Open PRs check completed!".green());
            check_merged_prs(&clients, &sink, weeks).await?;
            println!("{}", "✅ Merged PRs check completed!".green());
            println!("{}", "🎉 All checks completed successfully!".green());
        }
        Command::Summary(arg) => {
            let weeks = config.resolve_weeks(arg.weeks)?;
            let clients = Clients::new(&config)?;
            let sink = notifier(&config)?;
            let claude = completion_client(&config);
            let completion = claude.as_ref().map(|c| c as &dyn CompletionClient);
            send_executive_summary(&clients, &sink, completion, weeks).await?;
            println!("{}", "✅ Executive summary sent!".green());
        }
        Command::Preview {
            weeks,
            output,
            summary: with_summary,
        } => {
            let weeks = config.resolve_weeks(weeks.weeks)?;
            let clients = Clients::new(&config)?;
            let _span = info_span!("preview", weeks = weeks.get(), summary = with_summary).entered();

            let open = pr::collect_open_prs(clients.source(), &clients.username).await?;
            let merged = pr::collect_merged_prs(clients.source(), &clients.username, weeks).await?;
            let outcome = if with_summary {
                let claude = completion_client(&config);
                let completion = claude.as_ref().map(|c| c as &dyn CompletionClient);
                Some(summary::generate_summary(completion, &open, &merged, weeks).await)
            } else {
                None
            };

            let mut built_report = report::build(open, merged, weeks);
            if let Some(outcome) = outcome {
                built_report = built_report.with_summary(outcome);
            }
            if built_report.is_empty() {
                info!("nothing to report");
            }
            report::output(&built_report, output.as_deref())?;
        }
    }

    Ok(())
}

async fn check_open_prs(clients: &Clients, sink: &dyn ChatSink) -> Result<(), BoxError> {
    info!("checking open pull requests");
    let open = pr::collect_open_prs(clients.source(), &clients.username).await?;
    info!(count = open.len(), "collected open pull requests");
    sink.post(&message::open_prs_message(&open)).await?;
    Ok(())
}

async fn check_merged_prs(
    clients: &Clients,
    sink: &dyn ChatSink,
    weeks: WeeksBack,
) -> Result<(), BoxError> {
    info!(weeks = weeks.get(), "checking merged pull requests");
    let merged = pr::collect_merged_prs(clients.source(), &clients.username, weeks).await?;
    info!(count = merged.len(), "collected merged pull requests");
    sink.post(&message::merged_prs_message(&merged, weeks)).await?;
    Ok(())
}

async fn send_executive_summary(
    clients: &Clients,
    sink: &dyn ChatSink,
    completion: Option<&dyn CompletionClient>,
    weeks: WeeksBack,
) -> Result<(), BoxError> {
    info!(weeks = weeks.get(), "building executive summary");
    let open = pr::collect_open_prs(clients.source(), &clients.username).await?;
    let merged = pr::collect_merged_prs(clients.source(), &clients.username, weeks).await?;

    let outcome = summary::generate_summary(completion, &open, &merged, weeks).await;
    if let SummaryOutcome::Fallback(_) = outcome {
        info!("sending fallback executive summary");
    }
    let message = summary::executive_summary_message(&outcome, &open, &merged, weeks);
    sink.post(&message).await?;
    Ok(())
}
