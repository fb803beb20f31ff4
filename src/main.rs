use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use scoutgrade::error::RunError;
use scoutgrade::input::load_tables;
use scoutgrade::input::profiles::load_profiles;
use scoutgrade::input::team_stats::load_team_stats;
use scoutgrade::logging::init_logging;
use scoutgrade::model::config::EngineConfig;
use scoutgrade::model::profile::AccuracyVariant;
use scoutgrade::pipeline::stage1_possession::{PossessionBaseline, estimate_possessions};
use scoutgrade::pipeline::stage8_report::{ReportInput, write_reports};
use scoutgrade::pipeline::{RunContext, run_all};

#[derive(Parser)]
#[command(name = "scoutgrade", version)]
#[command(about = "Score, grade and rank players against conference and Power-Five pools")]
struct Cli {
    /// Debug-level logging unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score every configured position profile for one conference
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Position profile configuration (JSON)
    #[arg(long)]
    config: PathBuf,

    /// Directory of `{CONF} {source key} {YEAR}.csv` player tables
    #[arg(long)]
    input: PathBuf,

    /// Directory of `Team Stats {team}.csv` match logs
    #[arg(long)]
    team_stats: Option<PathBuf>,

    /// Output directory for scores.tsv, summary.json and report.txt
    #[arg(long)]
    out: PathBuf,

    /// Conference being reported, e.g. ACC
    #[arg(long)]
    conference: String,

    /// Only run these profiles (repeatable)
    #[arg(long = "profile")]
    profiles: Vec<String>,

    /// Accuracy weighting for pass composites: intent_focused | balanced
    #[arg(long)]
    variant: Option<String>,

    /// Score raw counts without possession adjustment
    #[arg(long)]
    no_padj: bool,

    /// Current season (defaults to the configuration's)
    #[arg(long)]
    year: Option<u32>,

    /// Older report behaviour: bounded-series fast path, score-based grades
    #[arg(long)]
    legacy: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let result = match cli.command {
        Command::Run(args) => run(args),
    };
    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(args: RunArgs) -> Result<(), RunError> {
    let mut file = load_profiles(&args.config)?;
    file.select(&args.profiles)?;

    let mut config = file.engine.clone();
    if args.legacy {
        let legacy = EngineConfig::legacy_v1();
        config.percentage_fast_path = legacy.percentage_fast_path;
        config.score_grade = legacy.score_grade;
        config.scope_grade = legacy.scope_grade;
    }
    if let Some(year) = args.year {
        config.current_year = year;
    }
    if args.no_padj {
        config.possession_adjust = false;
    }
    if let Some(variant) = &args.variant {
        config.accuracy_variant = Some(AccuracyVariant::parse(variant)?);
    }

    let mut loaded = load_tables(&args.input)?;
    let baseline = match &args.team_stats {
        Some(dir) => {
            let stats = load_team_stats(dir)?;
            loaded.issues.extend(stats.issues);
            estimate_possessions(&stats.tallies)
        }
        None => PossessionBaseline::default(),
    };

    let ctx = RunContext::new(&args.conference);
    info!(
        conference = %ctx.conference,
        year = config.current_year,
        profiles = file.profiles.len(),
        possession_adjust = config.possession_adjust,
        "run started"
    );
    let reports = run_all(&file.profiles, &loaded.tables, &baseline, &config, &ctx);

    write_reports(
        &ReportInput {
            reports: &reports,
            config: &config,
            conference: &ctx.conference,
            input_issues: &loaded.issues,
            config_errors: &file.errors,
        },
        &args.out,
    )?;
    info!(
        out = %args.out.display(),
        profiles = reports.len(),
        players = reports.iter().map(|r| r.players.len()).sum::<usize>(),
        "reports written"
    );
    Ok(())
}
