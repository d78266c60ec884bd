//! quizdesk CLI: grade quiz submissions and inspect results.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

use commands::FilterArgs;

#[derive(Parser)]
#[command(name = "quizdesk", version, about = "Quiz grading and results dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and example quiz
    Init,

    /// Validate quiz TOML files
    Validate {
        /// Path to a quiz file or directory
        #[arg(long)]
        quizzes: PathBuf,
    },

    /// Grade a submission and store the result
    Submit {
        /// Submission JSON file
        #[arg(long)]
        submission: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List stored results
    Results {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Summary statistics over stored results
    Stats {
        #[command(flatten)]
        filter: FilterArgs,

        /// Break statistics down per quiz
        #[arg(long)]
        by_quiz: bool,

        /// Break statistics down per quiz subject
        #[arg(long)]
        by_subject: bool,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Rank learners by average score
    Leaderboard {
        #[command(flatten)]
        filter: FilterArgs,

        /// Show only the top N entries
        #[arg(long)]
        limit: Option<usize>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show a learner's dashboard statistics
    Profile {
        /// Learner id
        #[arg(long)]
        learner: String,

        /// Blend policy: prefer-observed, observed-only, synthetic-only
        #[arg(long)]
        policy: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Export results as CSV, HTML or a JSON report
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output format: csv, html, json, all
        #[arg(long, default_value = "csv")]
        format: String,

        /// Output directory (defaults to `output_dir` from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two JSON results reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Change in average score (points) treated as significant
        #[arg(long, default_value = "5")]
        threshold: u32,

        /// Exit code 1 if any quiz average declined
        #[arg(long)]
        fail_on_decline: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() {
    let directive = match "quizdesk=info".parse::<tracing_subscriber::filter::Directive>() {
        Ok(directive) => directive,
        Err(e) => {
            eprintln!("Error: invalid log directive: {e}");
            process::exit(1);
        }
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { quizzes } => commands::validate::execute(quizzes),
        Commands::Submit {
            submission,
            format,
            config,
        } => commands::submit::execute(submission, format, config),
        Commands::Results {
            filter,
            format,
            config,
        } => commands::results::execute(filter, format, config),
        Commands::Stats {
            filter,
            by_quiz,
            by_subject,
            format,
            config,
        } => commands::stats::execute(filter, by_quiz, by_subject, format, config),
        Commands::Leaderboard {
            filter,
            limit,
            format,
            config,
        } => commands::leaderboard::execute(filter, limit, format, config),
        Commands::Profile {
            learner,
            policy,
            format,
            config,
        } => commands::profile::execute(learner, policy, format, config),
        Commands::Export {
            filter,
            format,
            output,
            config,
        } => commands::export::execute(filter, format, output, config),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_decline,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_decline, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
