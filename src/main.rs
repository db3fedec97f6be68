use analytics::PerformanceRow;
use analyzer::TeamRanksAnalyzer;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use configuration::Settings;
use core_types::resolve;
use database::DbRepository;
use database::reports::team_ranks::TeamRanksQuery;
use database::reports::tranche::TrancheQuery;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use web_server::format::{date, decimal, float, int, ratio};

/// Debt-settlement servicing reports: web server and terminal views.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; DATABASE_URL may come from the environment.
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let settings = configuration::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => web_server::run_server(settings).await,
        Commands::TeamRanks(args) => handle_team_ranks(args, settings).await,
        Commands::TrancheSummary(args) => handle_tranche_summary(args, settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML settings file. Missing files fall back to defaults.
    #[arg(long, global = true, default_value = configuration::DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the report routes over HTTP.
    Serve,
    /// Print agent, team and company rankings.
    TeamRanks(TeamRanksArgs),
    /// Print the tranche recovery waterfall.
    TrancheSummary(RangeArgs),
}

#[derive(Args)]
struct RangeArgs {
    /// Named range: today, this_month, last_month, all, custom, or a day count.
    #[arg(long)]
    range: Option<String>,

    /// First day of the window, YYYY-MM-DD.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the window, YYYY-MM-DD.
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Args)]
struct TeamRanksArgs {
    #[command(flatten)]
    range: RangeArgs,

    /// Restrict to one data source.
    #[arg(long)]
    data_source: Option<String>,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

async fn repository(settings: &Settings) -> anyhow::Result<DbRepository> {
    let pool = database::connect(&settings.database).await?;
    Ok(DbRepository::new(pool))
}

async fn handle_team_ranks(args: TeamRanksArgs, settings: Settings) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let analyzer = TeamRanksAnalyzer::new(settings.team_ranks.clone());
    let range = analyzer.window(args.range.range.as_deref(), args.range.from, args.range.to, today);
    let data_source = args
        .data_source
        .filter(|source| source.as_str() != core_types::ALL_DATA_SOURCES);
    let query = TeamRanksQuery { range, data_source };

    let db_repo = repository(&settings).await?;
    let ranks = analyzer.run(&db_repo, &query).await?;

    println!("Window: {} to {}", date(query.range.from), date(query.range.to));
    println!("{}", performance_table(&ranks.agents));
    println!("\nTeams");
    println!("{}", performance_table(&ranks.teams));
    println!("\nCompany-Wide");
    println!("{}", performance_table(std::slice::from_ref(&ranks.company)));
    Ok(())
}

fn performance_table(rows: &[PerformanceRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Team", "Agent", "Contacts", "WCC", "Cancels", "NSFs", "Enrolled Debt", "Net", "Ratio",
        "Rank Ratio", "Rank WCC", "Rank Debt", "Score",
    ]);
    for row in rows {
        table.add_row(vec![
            row.team.clone(),
            row.agent.clone(),
            row.contacts.to_string(),
            row.wcc.to_string(),
            row.cancels.to_string(),
            row.nsfs.to_string(),
            decimal(Some(row.enrolled_debt), 2),
            row.net.to_string(),
            float(row.ratio, 4),
            int(row.rank_ratio),
            int(row.rank_wcc),
            int(row.rank_debt),
            float(row.score, 2),
        ]);
    }
    table
}

async fn handle_tranche_summary(args: RangeArgs, settings: Settings) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let range = resolve(args.range.as_deref(), args.from, args.to, today);
    let query = TrancheQuery::new(range, settings.tranche.epf_payee_ids.clone());

    let db_repo = repository(&settings).await?;
    let rows = db_repo.all(&query).await?;
    tracing::info!(rows = rows.len(), "Tranche summary loaded");

    let mut table = Table::new();
    table.set_header(vec![
        "Tranche", "Payment Date", "Payment", "Lookback", "K", "N", "Q", "R", "S", "T", "U", "Flip Date",
    ]);
    for row in &rows {
        let w = &row.waterfall;
        table.add_row(vec![
            row.tranche.to_string(),
            date(row.payment_date),
            decimal(row.payment, 2),
            decimal(row.sold_debt_lookback, 2),
            decimal(Some(w.k), 2),
            decimal(Some(w.n), 2),
            decimal(Some(w.q), 2),
            decimal(Some(w.r), 2),
            decimal(Some(w.s), 2),
            decimal(Some(w.t), 2),
            ratio(Some(w.u)),
            date(row.flip_date),
        ]);
    }
    println!("{table}");
    Ok(())
}
