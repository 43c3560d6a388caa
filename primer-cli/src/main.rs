//! Primer CLI
//!
//! Runs one lesson per subcommand and prints what it shows. The ORM lessons
//! talk to PostgreSQL, or with `--dry-run` print the SQL they would issue.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use primer::connection::connect;
use primer::lessons::{arrays, enums, floats, functions, orm, sync, user};
use primer::{DatabaseConfig, Executor, MockExecutor, PostgresExecutor, Record};
use std::convert::Infallible;
use std::process;

#[derive(Parser)]
#[command(name = "primer")]
#[command(about = "Run a lesson and print what it demonstrates")]
#[command(version = "0.1.0")]
struct Cli {
    /// Database connection URL (ORM lessons only)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parameters, results, variadics, function values and closures
    Functions,

    /// Fixed-size arrays, passed by value and by reference
    Arrays,

    /// Discriminants and index-derived constants
    Enums,

    /// Float precision loss and decimal arithmetic
    Floats,

    /// A wait group over one coroutine
    Sync,

    /// Query-building lessons against the "User" table
    Orm {
        /// Which lesson to run
        #[arg(value_enum, default_value_t = OrmLesson::All)]
        lesson: OrmLesson,

        /// Print the SQL without connecting
        #[arg(long)]
        dry_run: bool,
    },

    /// Create the "User" table and insert the rows the ORM lessons expect
    Setup {
        /// Print the SQL without connecting
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OrmLesson {
    SelectField,
    SubQuery,
    FromSubQuery,
    WhereGroup,
    MultiColumnIn,
    NamedParameter,
    ResultToMap,
    FirstOrInit,
    FirstOrCreate,
    All,
}

impl OrmLesson {
    const EACH: [OrmLesson; 9] = [
        OrmLesson::SelectField,
        OrmLesson::SubQuery,
        OrmLesson::FromSubQuery,
        OrmLesson::WhereGroup,
        OrmLesson::MultiColumnIn,
        OrmLesson::NamedParameter,
        OrmLesson::ResultToMap,
        OrmLesson::FirstOrInit,
        OrmLesson::FirstOrCreate,
    ];
}

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    #[cfg(feature = "tracing")]
    if cli.verbose {
        primer::telemetry::tracing_helpers::init_subscriber(true);
    }

    let result = match &cli.command {
        Commands::Functions => print_lines("functions", functions::run()),
        Commands::Arrays => print_lines("arrays", Ok::<_, Infallible>(arrays::array_demo())),
        Commands::Enums => print_lines("enums", Ok::<_, Infallible>(enums::enum_demo())),
        Commands::Floats => print_lines("floats", floats::run()),
        Commands::Sync => print_lines("sync", sync::run()),
        Commands::Orm { lesson, dry_run } => handle_orm(&cli, *lesson, *dry_run),
        Commands::Setup { dry_run } => handle_setup(&cli, *dry_run),
    };

    if let Err(e) = result {
        eprintln!("{} {e:#}", "Error:".red().bold());
        process::exit(1);
    }
}

fn heading(title: &str) {
    println!("{}", format!("== {title} ==").cyan().bold());
}

fn print_lines<L, E>(title: &str, lines: std::result::Result<Vec<L>, E>) -> Result<()>
where
    L: std::fmt::Display,
    E: std::error::Error + Send + Sync + 'static,
{
    #[cfg(feature = "tracing")]
    let _span = primer::telemetry::tracing_helpers::lesson_span(title).entered();

    let lines = lines.with_context(|| format!("{title} lesson failed"))?;
    heading(title);
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// `--database-url`, then `PRIMER_DATABASE_URL`, then `DATABASE_URL`, then
/// the `[database]` section of `config/config.toml`.
fn database_url(cli: &Cli) -> Result<String> {
    if let Some(url) = cli
        .database_url
        .clone()
        .or_else(|| std::env::var("PRIMER_DATABASE_URL").ok())
        .or_else(|| std::env::var("DATABASE_URL").ok())
    {
        return Ok(url);
    }
    let config = DatabaseConfig::load().context("failed to load database configuration")?;
    log::debug!("using database url from configuration");
    Ok(config.url)
}

fn open_database(cli: &Cli) -> Result<PostgresExecutor> {
    let url = database_url(cli)?;
    let client = connect(&url).with_context(|| {
        format!(
            "could not connect to {}",
            primer::connection::redact(&url)
        )
    })?;
    Ok(PostgresExecutor::new(client))
}

fn print_dry_run(mock: &MockExecutor) {
    println!("{}", "SQL that would run:".bold());
    for sql in mock.debug_sql() {
        println!("  {sql}");
    }
}

fn handle_orm(cli: &Cli, lesson: OrmLesson, dry_run: bool) -> Result<()> {
    if dry_run {
        let mock = MockExecutor::new();
        run_orm_lesson(&mock, lesson)?;
        print_dry_run(&mock);
        return Ok(());
    }

    let db = open_database(cli)?;
    run_orm_lesson(&db, lesson)
}

fn record_line(record: &Record) -> String {
    serde_json::to_string(record).unwrap_or_else(|e| format!("<unprintable record: {e}>"))
}

fn run_orm_lesson<Ex>(db: &Ex, lesson: OrmLesson) -> Result<()>
where
    Ex: Executor + ?Sized,
{
    let name = lesson
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default();
    let title = format!("orm {name}");
    #[cfg(feature = "tracing")]
    let _span = primer::telemetry::tracing_helpers::lesson_span(&title).entered();

    if lesson == OrmLesson::All {
        for one in OrmLesson::EACH {
            run_orm_lesson(db, one)?;
        }
        return Ok(());
    }

    heading(&title);
    let failed = || format!("{title} lesson failed");
    match lesson {
        OrmLesson::SelectField => {
            for summary in orm::select_field(db).with_context(failed)? {
                println!("{summary:?}");
            }
        }
        OrmLesson::SubQuery => {
            let result = orm::sub_query(db).with_context(failed)?;
            println!("older than average:");
            for user in &result.above_average {
                println!("  {user}");
            }
            println!("average age per name:");
            for record in &result.averages {
                println!("  {}", record_line(record));
            }
        }
        OrmLesson::FromSubQuery => {
            let result = orm::from_sub_query(db).with_context(failed)?;
            for user in &result.aged_18 {
                println!("{user}");
            }
            println!("{} row(s) from two derived tables", result.cross.len());
        }
        OrmLesson::WhereGroup => print_users(&orm::where_group(db).with_context(failed)?),
        OrmLesson::MultiColumnIn => print_users(&orm::multi_column_in(db).with_context(failed)?),
        OrmLesson::NamedParameter => {
            let (by_named_args, by_map) = orm::named_parameter(db).with_context(failed)?;
            println!("named arguments:");
            print_users(&by_named_args);
            println!("map:");
            print_users(&by_map);
        }
        OrmLesson::ResultToMap => {
            let result = orm::result_to_map(db).with_context(failed)?;
            match &result.first {
                Some(record) => println!("first: {}", record_line(record)),
                None => println!("first: none"),
            }
            for record in &result.rows {
                println!("{}", record_line(record));
            }
        }
        OrmLesson::FirstOrInit => print_cases(&orm::first_or_init(db).with_context(failed)?),
        OrmLesson::FirstOrCreate => print_cases(&orm::first_or_create(db).with_context(failed)?),
        OrmLesson::All => {}
    }
    Ok(())
}

fn print_users(users: &[user::User]) {
    if users.is_empty() {
        println!("{}", "(no rows)".dimmed());
    }
    for user in users {
        println!("{user}");
    }
}

fn print_cases(cases: &[orm::InitCase]) {
    for case in cases {
        println!("{:<28} {}", case.label.green(), case.user);
    }
}

fn handle_setup(cli: &Cli, dry_run: bool) -> Result<()> {
    heading("setup");
    if dry_run {
        let mock = MockExecutor::new();
        seed(&mock)?;
        print_dry_run(&mock);
        return Ok(());
    }
    let db = open_database(cli)?;
    seed(&db)?;
    println!("{}", "Success".green());
    Ok(())
}

fn seed<Ex>(db: &Ex) -> Result<()>
where
    Ex: Executor + ?Sized,
{
    let inserted = user::seed(db).context("failed to seed the \"User\" table")?;
    for row in &inserted {
        log::info!("inserted {row}");
    }
    println!(
        "{} new row(s), {} already present",
        inserted.len(),
        user::seed_users().len() - inserted.len()
    );
    Ok(())
}
