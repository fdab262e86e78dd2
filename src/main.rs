use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use covdelta::cli::{cmd_comment, cmd_diff, cmd_merge, cmd_summary, Style};
use covdelta::config::Config;
use covdelta::github::{self, GitHubApi};
use covdelta::report::DEFAULT_HEADING;

/// covdelta — merge sharded SimpleCov result sets and report coverage changes.
#[derive(Parser)]
#[command(name = "covdelta", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DiffArgs {
    /// Result set for the baseline revision.
    #[arg(long)]
    baseline: PathBuf,

    /// Result set for the current revision.
    #[arg(long)]
    current: PathBuf,

    /// Directory prefix to remove from displayed file names.
    #[arg(long, env = "GITHUB_WORKSPACE")]
    strip_prefix: Option<String>,

    /// Heading for Markdown reports.
    #[arg(long, default_value = DEFAULT_HEADING)]
    heading: String,
}

impl DiffArgs {
    fn into_config(self) -> Config {
        Config::new(self.baseline, self.current)
            .with_strip_prefix(self.strip_prefix)
            .with_heading(self.heading)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show totals for a result set.
    Summary {
        /// Path to the result set.
        file: PathBuf,
    },

    /// Consolidate result sets into a single shard.
    Merge {
        /// Result set files to merge.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write the merged result set here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Shard name for the merged result.
        #[arg(long, default_value = "covdelta")]
        name: String,
    },

    /// Compare baseline and current coverage.
    Diff {
        #[command(flatten)]
        args: DiffArgs,

        /// Output style.
        #[arg(long, value_enum, default_value = "text")]
        style: Style,
    },

    /// Replace the coverage report comment on a pull request.
    Comment {
        #[command(flatten)]
        args: DiffArgs,

        /// GitHub token.
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: String,

        /// Repository as owner/name.
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repo: String,

        /// Pull request number. Defaults to the one in GITHUB_REF.
        #[arg(long)]
        pr: Option<u64>,

        /// Git ref of the triggering event, e.g. refs/pull/42/merge.
        #[arg(long, env = "GITHUB_REF")]
        github_ref: Option<String>,

        /// GitHub API root.
        #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
        api_url: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Summary { file } => cmd_summary(&file)?,
        Commands::Merge {
            files,
            output,
            name,
        } => cmd_merge(&files, output.as_deref(), &name)?,
        Commands::Diff { args, style } => cmd_diff(&args.into_config(), &style)?,
        Commands::Comment {
            args,
            token,
            repo,
            pr,
            github_ref,
            api_url,
        } => {
            let pr_number = pr
                .or_else(|| github_ref.as_deref().and_then(github::pr_number_from_ref))
                .context("Not a pull request: pass --pr or run on a pull_request event")?;
            let context = github::Context::new(token, repo, pr_number).with_api_url(&api_url);
            tracing::info!(repo = context.repo(), pr = context.pr_number(), "commenting");
            cmd_comment(&args.into_config(), &GitHubApi::new(context))?
        }
    };

    print!("{output}");
    Ok(())
}
