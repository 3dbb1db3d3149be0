use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use members::contract::client::MembersApi;
use members::contract::model::{MemberTeamRow, NewMember, SearchCondition};
use members::domain::service::Service;
use members::gateways::local::MembersLocalClient;
use members::infra::storage::{migrations::Migrator, SeaOrmMembersRepository};
use members::MembersConfig;
use query_core::{CountStrategy, Page, PageRequest, SortSpec};
use query_db::{redact_credentials_in_dsn, DbHandle};
use runtime::{AppConfig, CliArgs};
use sea_orm_migration::MigratorTrait;
use serde::Serialize;

/// Members CLI - search members and teams stored through SeaORM
#[derive(Parser)]
#[command(name = "members-cli")]
#[command(about = "Members CLI - dynamic member search with paging")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a paged member search and print the page as JSON
    Search(SearchArgs),
    /// Check configuration
    Check,
}

#[derive(Args)]
struct SearchArgs {
    /// Exact username
    #[arg(long)]
    username: Option<String>,

    /// Exact team name
    #[arg(long)]
    team_name: Option<String>,

    /// Minimum age (inclusive)
    #[arg(long, allow_negative_numbers = true)]
    age_goe: Option<i32>,

    /// Maximum age (inclusive)
    #[arg(long, allow_negative_numbers = true)]
    age_loe: Option<i32>,

    /// Zero-based page index
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    page: i64,

    /// Page size (defaults to modules.members.default_page_size)
    #[arg(long, allow_negative_numbers = true)]
    size: Option<i64>,

    /// Sort keys, e.g. "-age,+username nulls last"
    #[arg(long, allow_hyphen_values = true)]
    sort: Option<String>,

    /// Where the total count comes from (defaults to modules.members.count_strategy)
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Insert the demo teams and members when the store is empty
    #[arg(long)]
    seed: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Combined,
    Separate,
}

impl From<StrategyArg> for CountStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Combined => CountStrategy::Combined,
            StrategyArg::Separate => CountStrategy::Separate,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.clone(),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, &config.home_path());
    tracing::info!(home_dir = %config.home_dir, "members-cli starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Search(search) => run_search(config, search).await,
        Commands::Check => check_config(&config),
    }
}

async fn run_search(config: AppConfig, args: SearchArgs) -> Result<()> {
    let members_cfg: MembersConfig = config.module_config("members")?;
    let db_cfg = config.database_or_default();
    let dsn = db_cfg
        .resolve_dsn(&config.home_path())
        .context("Invalid database DSN")?;

    let db = DbHandle::connect(&dsn, db_cfg.connect_opts())
        .await
        .with_context(|| {
            format!(
                "Failed to connect to {}",
                redact_credentials_in_dsn(Some(&dsn))
            )
        })?;
    tracing::debug!(engine = ?db.engine(), "database connected");
    Migrator::up(&db.sea(), None)
        .await
        .context("Failed to apply migrations")?;

    let default_size = members_cfg.default_page_size as i64;
    let default_strategy = members_cfg.count_strategy;
    let repo = Arc::new(SeaOrmMembersRepository::new(db.sea()));
    let service = Arc::new(Service::new(repo, members_cfg.into()));
    let client: Arc<dyn MembersApi> = Arc::new(MembersLocalClient::new(service));

    if args.seed {
        seed_demo_data(client.as_ref()).await?;
    }

    let condition = SearchCondition {
        username: args.username,
        team_name: args.team_name,
        age_goe: args.age_goe,
        age_loe: args.age_loe,
    };
    let sort = match args.sort.as_deref() {
        Some(tokens) => SortSpec::from_signed_tokens(tokens)?,
        None => SortSpec::empty(),
    };
    let request =
        PageRequest::new(args.page, args.size.unwrap_or(default_size))?.with_sort(sort);
    let strategy = args.strategy.map(Into::into).unwrap_or(default_strategy);

    let page = client
        .search_page_with(condition, request, strategy)
        .await?;
    let out = PageOutput::from(page);
    println!("{}", serde_json::to_string_pretty(&out)?);

    db.close().await?;
    Ok(())
}

/// JSON shape of one search row.
#[derive(Serialize)]
struct MemberRowDto {
    member_id: i64,
    username: Option<String>,
    age: i32,
    team_id: Option<i64>,
    team_name: Option<String>,
}

impl From<MemberTeamRow> for MemberRowDto {
    fn from(row: MemberTeamRow) -> Self {
        Self {
            member_id: row.member_id,
            username: row.username,
            age: row.age,
            team_id: row.team_id,
            team_name: row.team_name,
        }
    }
}

#[derive(Serialize)]
struct PageOutput {
    #[serde(flatten)]
    page: Page<MemberRowDto>,
    total_pages: u64,
}

impl From<Page<MemberTeamRow>> for PageOutput {
    fn from(page: Page<MemberTeamRow>) -> Self {
        let total_pages = page.total_pages();
        Self {
            page: page.map_content(MemberRowDto::from),
            total_pages,
        }
    }
}

/// teamA: member1 (10), member2 (20); teamB: member3 (30), member4 (40).
async fn seed_demo_data(client: &dyn MembersApi) -> Result<()> {
    if !client.list_members().await?.is_empty() {
        tracing::info!("store already has members; skipping seed");
        return Ok(());
    }

    let team_a = client.create_team("teamA".to_string()).await?;
    let team_b = client.create_team("teamB".to_string()).await?;
    for (name, age, team) in [
        ("member1", 10, &team_a),
        ("member2", 20, &team_a),
        ("member3", 30, &team_b),
        ("member4", 40, &team_b),
    ] {
        client
            .create_member(NewMember::new(name, age).in_team(team.id))
            .await?;
    }
    tracing::info!("demo data seeded");
    Ok(())
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    let _: MembersConfig = config.module_config("members")?;
    config
        .database_or_default()
        .resolve_dsn(&config.home_path())
        .context("Invalid database DSN")?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
