use std::path::PathBuf;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

use campaign_e2e::campaign::manager::PollPolicy;
use campaign_e2e::client::ApiClient;
use campaign_e2e::config::HarnessConfig;
use campaign_e2e::database::ScopedConnection;
use campaign_e2e::scenario::{self, Category, Harness, Outcome, Scenario, SuiteReport};
use campaign_e2e::Error;

/// Runs the campaign scheduling scenarios against a live environment.
#[derive(Debug, Parser)]
#[command(name = "campaign_e2e")]
struct Args {
    /// Scenario categories to run; defaults to e2e and integration.
    #[arg(long = "category", value_enum)]
    categories: Vec<Category>,

    /// Run only the named scenarios; unknown names are rejected.
    #[arg(long = "scenario")]
    scenarios: Vec<Scenario>,

    /// Configuration file; `campaign-e2e.toml` is used if present.
    #[arg(long, env = "CAMPAIGN_E2E_CONFIG")]
    config: Option<PathBuf>,

    /// Skip the database persistence checks.
    #[arg(long)]
    no_database: bool,

    /// Print the report as json.
    #[arg(long)]
    json: bool,

    #[arg(long, short)]
    verbose: bool,
}

#[actix_web::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    let config = HarnessConfig::load(args.config.as_deref())?;
    let selection = Scenario::select(&args.categories, &args.scenarios);
    info!("running {} scenarios", selection.len());

    let connection = if args.no_database {
        None
    } else {
        info!("connecting to db: {}", config.database.name);
        Some(ScopedConnection::connect(&config.database).await?)
    };

    let client = ApiClient::new(&config.http);
    let report = {
        let harness = Harness {
            client: &client,
            endpoints: &config.endpoints,
            records: connection.as_ref().map(|connection| connection.campaigns()),
            consistency: PollPolicy::from(&config.consistency),
        };
        scenario::run_suite(&harness, &selection).await
    };

    if let Some(connection) = connection {
        connection.release().await;
    }

    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(Error::FailedToSerializeToJson)?;
        println!("{}", json);
    } else {
        print_summary(&report);
    }

    if report.failed() > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn print_summary(report: &SuiteReport) {
    for entry in &report.reports {
        match &entry.outcome {
            Outcome::Passed => println!("PASS {} ({}ms)", entry.scenario, entry.elapsed_ms),
            Outcome::Failed {
                stage,
                error_code,
                error,
            } => println!(
                "FAIL {} at {:?} [{}] {}",
                entry.scenario, stage, error_code, error
            ),
        }
    }
    println!("{} passed, {} failed", report.passed(), report.failed());
}
