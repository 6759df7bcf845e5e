//! Bounded concurrent extraction.
//!
//! Every task runs exactly once on a dedicated pool of `concurrency` threads,
//! so at most that many requests are in flight. Workers return owned
//! per-task outcomes; nothing is shared between them.

use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::data::worldbank::{FetchError, JsonSource, ParsedResponse, endpoint_url, parse_response};
use crate::domain::{FetchTask, Observation};
use crate::error::AppError;

/// Successful result of one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskBatch {
    pub task: FetchTask,
    pub observations: Vec<Observation>,
    pub null_values: usize,
    pub rejected: usize,
}

/// Failed task together with its cause.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFailure {
    pub task: FetchTask,
    pub error: FetchError,
}

impl std::fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Error fetching {} for {}: {}",
            self.task.indicator_code, self.task.country_code, self.error
        )
    }
}

pub type TaskOutcome = Result<TaskBatch, TaskFailure>;

/// Fetch and parse a single task. Never retries.
pub fn fetch_task<S: JsonSource + ?Sized>(source: &S, task: &FetchTask, config: &PipelineConfig) -> TaskOutcome {
    let url = endpoint_url(&config.base_url, task, config.years);
    log::debug!("GET {url}");

    let parsed = source
        .get_json(&url)
        .and_then(|body| parse_response(&body, task, config.years))
        .map_err(|error| TaskFailure {
            task: task.clone(),
            error,
        })?;

    let ParsedResponse {
        observations,
        null_values,
        rejected,
    } = parsed;

    Ok(TaskBatch {
        task: task.clone(),
        observations,
        null_values,
        rejected,
    })
}

/// Run all tasks on a pool of `config.concurrency` workers.
///
/// Only pool construction can fail; individual task failures are returned as
/// `Err` outcomes for the aggregator to report.
pub fn fetch_all<S: JsonSource + ?Sized>(
    source: &S,
    tasks: &[FetchTask],
    config: &PipelineConfig,
) -> Result<Vec<TaskOutcome>, AppError> {
    if config.concurrency == 0 {
        return Err(AppError::config("Concurrency must be at least 1."));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.concurrency)
        .thread_name(|i| format!("fetch-{i}"))
        .build()
        .map_err(|e| AppError::config(format!("Failed to build fetch worker pool: {e}")))?;

    // One task per rayon job: a worker holds its thread for the whole
    // blocking request, which bounds in-flight requests by the pool size.
    let outcomes: Vec<TaskOutcome> = pool.install(|| {
        tasks
            .par_iter()
            .with_max_len(1)
            .map(|task| fetch_task(source, task, config))
            .collect()
    });

    Ok(outcomes)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use serde_json::{Value, json};

    use crate::config::{CountryGroup, IndicatorDef};
    use crate::data::tasks::enumerate_tasks;

    /// Canned responses keyed by country code; unknown countries time out.
    pub(crate) struct StubSource {
        pub responses: HashMap<String, Result<Value, FetchError>>,
        pub delay: Duration,
        pub calls: AtomicUsize,
        in_flight: AtomicUsize,
        pub max_in_flight: AtomicUsize,
        pub urls: Mutex<Vec<String>>,
    }

    impl StubSource {
        pub(crate) fn new(responses: Vec<(&str, Result<Value, FetchError>)>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    impl JsonSource for StubSource {
        fn get_json(&self, url: &str) -> Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());

            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }

            let country = url
                .split("/country/")
                .nth(1)
                .and_then(|rest| rest.split('/').next())
                .unwrap_or_default();
            let result = self
                .responses
                .get(country)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::Request("operation timed out".to_string())));

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    pub(crate) fn wb_entry(country: &str, date: &str, value: Value) -> Value {
        json!({"country": {"id": "XX", "value": country}, "date": date, "value": value})
    }

    fn config(concurrency: usize) -> PipelineConfig {
        PipelineConfig {
            country_groups: vec![CountryGroup::new("G7", &["USA", "GBR", "DEU", "FRA", "ITA", "CAN", "JPN"])],
            indicators: vec![
                IndicatorDef::new("NY.GDP.MKTP.KD.ZG", "GDP Growth (%)"),
                IndicatorDef::new("FP.CPI.TOTL.ZG", "Inflation (%)"),
            ],
            concurrency,
            base_url: "http://stub".to_string(),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn every_task_attempted_once_and_pool_is_bounded() {
        let config = config(3);
        let tasks = enumerate_tasks(&config.country_groups, &config.indicators);
        let source = StubSource::new(vec![]).with_delay(Duration::from_millis(15));

        let outcomes = fetch_all(&source, &tasks, &config).unwrap();

        assert_eq!(outcomes.len(), tasks.len());
        assert_eq!(source.calls.load(Ordering::SeqCst), tasks.len());
        assert!(source.max_in_flight.load(Ordering::SeqCst) <= 3);

        let mut urls = source.urls.lock().unwrap().clone();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), tasks.len());
    }

    #[test]
    fn failures_do_not_abort_other_tasks() {
        let config = config(2);
        let tasks = enumerate_tasks(&config.country_groups, &config.indicators);
        let body = json!([{"page": 1}, [wb_entry("Germany", "2020", json!(-3.8))]]);
        let source = StubSource::new(vec![
            ("DEU", Ok(body)),
            ("FRA", Err(FetchError::Status(502))),
            ("ITA", Ok(json!("not an array"))),
        ]);

        let outcomes = fetch_all(&source, &tasks, &config).unwrap();
        let ok: Vec<&TaskBatch> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
        let failed: Vec<&TaskFailure> = outcomes.iter().filter_map(|o| o.as_ref().err()).collect();

        assert_eq!(ok.len(), 2);
        assert!(ok.iter().all(|b| b.task.country_code == "DEU" && b.observations.len() == 1));
        assert_eq!(failed.len(), tasks.len() - 2);
        assert!(failed.iter().any(|f| f.error == FetchError::Status(502)));
        assert!(failed.iter().any(|f| matches!(f.error, FetchError::Body(_))));
    }

    #[test]
    fn zero_concurrency_is_a_config_error() {
        let config = config(0);
        let source = StubSource::new(vec![]);
        let err = fetch_all(&source, &[], &config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn failure_display_names_indicator_and_country() {
        let task = FetchTask {
            country_code: "JPN".to_string(),
            country_group: "G7".to_string(),
            indicator_code: "SL.UEM.TOTL.ZS".to_string(),
            indicator_name: "Unemployment (%)".to_string(),
        };
        let failure = TaskFailure {
            task,
            error: FetchError::Status(404),
        };
        assert_eq!(failure.to_string(), "Error fetching SL.UEM.TOTL.ZS for JPN: HTTP status 404");
    }
}
