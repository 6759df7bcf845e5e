//! Formatted terminal output.
//!
//! Formatting lives here so the pipeline stages stay free of presentation
//! concerns and output changes are localized.

use std::collections::BTreeSet;

use crate::app::pipeline::RunOutput;
use crate::config::PipelineConfig;
use crate::domain::{FetchTask, IndicatorBounds};

/// Format the run summary: counts, per-indicator fences, and failed tasks.
pub fn format_run_summary(run: &RunOutput, config: &PipelineConfig) -> String {
    let stats = &run.extraction.stats;
    let mut out = String::new();

    out.push_str("=== econ-etl - World Bank indicator extraction ===\n");
    out.push_str(&format!("Run: {}\n", run.started_at.format("%Y-%m-%d %H:%M:%S UTC")));
    out.push_str(&format!(
        "Years: {}:{} | concurrency={} | timeout={}s\n",
        config.years.start,
        config.years.end,
        config.concurrency,
        config.request_timeout.as_secs_f64()
    ));
    let groups: BTreeSet<&str> = run.tasks.iter().map(|t| t.country_group.as_str()).collect();
    out.push_str(&format!(
        "Tasks: {} | groups={} | succeeded={} | failed={}\n",
        run.tasks.len(),
        groups.len(),
        stats.succeeded,
        stats.failed
    ));
    out.push_str(&format!(
        "Rows: extracted={} | null values skipped={} | rejected entries={}\n",
        stats.observations, stats.null_values, stats.rejected_entries
    ));
    out.push_str(&format!(
        "Outliers flagged: {}\n",
        run.extraction.observations.outlier_count()
    ));

    if !run.bounds.is_empty() {
        out.push_str("\nPer-indicator fences (Q1/Q3 linear, 1.5 x IQR):\n");
        out.push_str(&format_bounds_table(&run.bounds, config));
    }

    if !run.extraction.failures.is_empty() {
        out.push_str("\nFailed tasks:\n");
        for failure in &run.extraction.failures {
            out.push_str(&format!("  - {failure}\n"));
        }
    }

    out
}

/// One row per indicator with its fences and outlier count.
pub fn format_bounds_table(bounds: &[IndicatorBounds], config: &PipelineConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<22} {:<28} {:>5} {:>10} {:>10} {:>10} {:>10} {:>8}\n",
        "Code", "Indicator", "n", "Q1", "Q3", "Lower", "Upper", "Outliers"
    ));
    for b in bounds {
        let name = config.indicator_name(&b.indicator_code).unwrap_or("");
        out.push_str(&format!(
            "{:<22} {:<28} {:>5} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>8}\n",
            b.indicator_code,
            truncate(name, 28),
            b.count,
            b.q1,
            b.q3,
            b.lower,
            b.upper,
            b.outliers
        ));
    }
    out
}

/// Format the enumerated task list (one line per task).
pub fn format_task_list(tasks: &[FetchTask]) -> String {
    let mut out = String::new();
    for t in tasks {
        out.push_str(&format!(
            "{:<12} {:<4} {:<22} {}\n",
            t.country_group, t.country_code, t.indicator_code, t.indicator_name
        ));
    }
    out.push_str(&format!("{} tasks\n", tasks.len()));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ExtractStats, Extraction, FetchError, TaskFailure};
    use crate::outlier::iqr_bounds;
    use chrono::{TimeZone, Utc};

    fn task(country: &str) -> FetchTask {
        FetchTask {
            country_code: country.to_string(),
            country_group: "G7".to_string(),
            indicator_code: "FP.CPI.TOTL.ZG".to_string(),
            indicator_name: "Inflation (%)".to_string(),
        }
    }

    #[test]
    fn summary_reports_counts_bounds_and_failures() {
        let bounds = iqr_bounds("FP.CPI.TOTL.ZG", &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let run = RunOutput {
            started_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            tasks: vec![task("USA"), task("GBR")],
            extraction: Extraction {
                observations: Default::default(),
                stats: ExtractStats {
                    tasks: 2,
                    succeeded: 1,
                    failed: 1,
                    observations: 4,
                    null_values: 1,
                    rejected_entries: 0,
                },
                failures: vec![TaskFailure {
                    task: task("GBR"),
                    error: FetchError::Status(503),
                }],
            },
            bounds: vec![bounds],
        };

        let text = format_run_summary(&run, &PipelineConfig::default());
        assert!(text.contains("Run: 2024-05-01 12:00:00 UTC"));
        assert!(text.contains("Tasks: 2 | groups=1 | succeeded=1 | failed=1"));
        assert!(text.contains("Rows: extracted=4 | null values skipped=1"));
        assert!(text.contains("Outliers flagged: 0"));
        assert!(text.contains("Inflation (%)"));
        assert!(text.contains("Error fetching FP.CPI.TOTL.ZG for GBR: HTTP status 503"));
    }

    #[test]
    fn task_list_ends_with_count() {
        let text = format_task_list(&[task("USA"), task("JPN")]);
        assert!(text.lines().next().unwrap().contains("USA"));
        assert_eq!(text.lines().last(), Some("2 tasks"));
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("Private Credit (% of GDP)", 10), "Private C.");
        assert_eq!(truncate("GDP", 10), "GDP");
    }
}
