use std::fmt::Debug;
use std::time::Instant;

use clap::ValueEnum;
use futures::{stream, StreamExt};
use serde::Serialize;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::campaign::db::CampaignRecords;
use crate::campaign::manager::PollPolicy;
use crate::client::ApiClient;
use crate::config::Endpoints;
use crate::error::Error;

pub mod catalog;
pub use catalog::Scenario;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Direct create/update/get against a healthy backend.
    #[value(name = "e2e")]
    #[serde(rename = "e2e")]
    EndToEnd,
    /// Resolves ids from the collaborator services before creating.
    Integration,
    /// Expects a collaborator service to be stopped.
    Down,
}

impl Category {
    pub const DEFAULT: [Category; 2] = [Category::EndToEnd, Category::Integration];
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    BuildPayload,
    SendRequest,
    AssertEnvelope,
    WaitForConsistency,
    VerifyPersistence,
    Done,
}

/// Records which stages a scenario passed through, so a failure can be
/// pinned to the stage it happened in.
#[derive(Debug)]
pub struct Trace {
    visited: Vec<Stage>,
}

impl Trace {
    pub fn new() -> Trace {
        Trace {
            visited: vec![Stage::BuildPayload],
        }
    }

    pub fn enter(&mut self, stage: Stage) {
        debug!(?stage, "entering stage");
        self.visited.push(stage);
    }

    pub fn stage(&self) -> Stage {
        // never empty, starts at BuildPayload
        self.visited.last().copied().unwrap_or(Stage::BuildPayload)
    }

    pub fn visited(&self) -> &[Stage] {
        &self.visited
    }
}

/// Collaborators handed to every scenario of a run.
pub struct Harness<'a> {
    pub client: &'a ApiClient,
    pub endpoints: &'a Endpoints,
    pub records: Option<&'a dyn CampaignRecords>,
    pub consistency: PollPolicy,
}

#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum Outcome {
    Passed,
    Failed {
        stage: Stage,
        error_code: &'static str,
        error: Error,
    },
}

#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub scenario: &'static str,
    pub category: Category,
    pub outcome: Outcome,
    pub stages: Vec<Stage>,
    pub elapsed_ms: u128,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed)
    }
}

#[derive(Debug, Serialize)]
pub struct SuiteReport {
    pub reports: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|report| report.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.passed()
    }

    pub fn report(&self, scenario: Scenario) -> Option<&ScenarioReport> {
        self.reports
            .iter()
            .find(|report| report.scenario == scenario.name())
    }
}

pub async fn run_scenario(harness: &Harness<'_>, scenario: Scenario) -> ScenarioReport {
    let started = Instant::now();
    let mut trace = Trace::new();
    let span = info_span!("scenario", name = scenario.name());

    let result = scenario.run(harness, &mut trace).instrument(span).await;
    let outcome = match result {
        Ok(()) => {
            trace.enter(Stage::Done);
            info!("{} passed", scenario.name());
            Outcome::Passed
        }
        Err(error) => {
            warn!("{} failed at {:?}: {}", scenario.name(), trace.stage(), error);
            Outcome::Failed {
                stage: trace.stage(),
                error_code: error.error_code(),
                error,
            }
        }
    };

    ScenarioReport {
        scenario: scenario.name(),
        category: scenario.category(),
        outcome,
        stages: trace.visited,
        elapsed_ms: started.elapsed().as_millis(),
    }
}

/// Runs `scenarios` one at a time, in order.
pub async fn run_suite(harness: &Harness<'_>, scenarios: &[Scenario]) -> SuiteReport {
    let reports = stream::iter(scenarios.iter().copied())
        .then(move |scenario| run_scenario(harness, scenario))
        .collect()
        .await;

    SuiteReport { reports }
}

pub(crate) fn check_eq<T>(check: &str, expected: &T, actual: &T) -> Result<(), Error>
where
    T: PartialEq + Debug + ?Sized,
{
    if expected != actual {
        return Err(Error::assertion(check, expected, actual));
    }
    Ok(())
}
