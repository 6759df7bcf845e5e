//! Expansion of the configured countries and indicators into fetch tasks.

use crate::config::{CountryGroup, IndicatorDef};
use crate::domain::FetchTask;

/// One task per (group, country, indicator), in configuration order.
///
/// Countries are not deduplicated across groups.
pub fn enumerate_tasks(groups: &[CountryGroup], indicators: &[IndicatorDef]) -> Vec<FetchTask> {
    let countries: usize = groups.iter().map(|g| g.countries.len()).sum();
    let mut tasks = Vec::with_capacity(countries * indicators.len());

    for group in groups {
        for country in &group.countries {
            for indicator in indicators {
                tasks.push(FetchTask {
                    country_code: country.clone(),
                    country_group: group.name.clone(),
                    indicator_code: indicator.code.clone(),
                    indicator_name: indicator.name.clone(),
                });
            }
        }
    }

    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn produces_every_country_indicator_pair_once() {
        let groups = vec![
            CountryGroup::new("G7", &["USA", "GBR", "DEU"]),
            CountryGroup::new("AFRICA_TOP5", &["NGA", "ZAF"]),
        ];
        let indicators = vec![
            IndicatorDef::new("NY.GDP.MKTP.KD.ZG", "GDP Growth (%)"),
            IndicatorDef::new("FP.CPI.TOTL.ZG", "Inflation (%)"),
        ];

        let tasks = enumerate_tasks(&groups, &indicators);
        assert_eq!(tasks.len(), 5 * 2);

        let pairs: HashSet<(&str, &str)> = tasks
            .iter()
            .map(|t| (t.country_code.as_str(), t.indicator_code.as_str()))
            .collect();
        assert_eq!(pairs.len(), tasks.len());
        assert!(pairs.contains(&("ZAF", "FP.CPI.TOTL.ZG")));

        let nga = tasks.iter().find(|t| t.country_code == "NGA").unwrap();
        assert_eq!(nga.country_group, "AFRICA_TOP5");
        assert_eq!(nga.indicator_name, "GDP Growth (%)");
    }

    #[test]
    fn country_in_two_groups_yields_one_task_per_group() {
        let groups = vec![
            CountryGroup::new("G7", &["USA"]),
            CountryGroup::new("AMERICAS", &["USA", "CAN"]),
        ];
        let indicators = vec![IndicatorDef::new("SL.UEM.TOTL.ZS", "Unemployment (%)")];

        let tasks = enumerate_tasks(&groups, &indicators);
        assert_eq!(tasks.len(), 3);
        let usa_groups: Vec<&str> = tasks
            .iter()
            .filter(|t| t.country_code == "USA")
            .map(|t| t.country_group.as_str())
            .collect();
        assert_eq!(usa_groups, vec!["G7", "AMERICAS"]);
    }

    #[test]
    fn empty_configuration_yields_no_tasks() {
        assert!(enumerate_tasks(&[], &[IndicatorDef::new("X", "x")]).is_empty());
        assert!(enumerate_tasks(&[CountryGroup::new("G", &["USA"])], &[]).is_empty());
    }
}
