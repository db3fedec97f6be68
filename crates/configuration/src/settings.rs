use chrono::{Days, NaiveDate};
use serde::Deserialize;
use std::time::Duration;

use crate::error::ConfigError;

/// The root configuration structure for the reporting service.
///
/// Every section has defaults, so an empty or missing file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub reports: ReportSettings,
    pub team_ranks: TeamRanksSettings,
    pub tranche: TrancheSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Pool sizing. The connection URL itself always comes from `DATABASE_URL`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// Paging and dropdown limits shared by every report.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub default_per_page: i64,
    pub max_per_page: i64,
    /// Cap on distinct values returned for a filter dropdown.
    pub options_limit: i64,
    /// Larger cap used for client-name datalists.
    pub client_options_limit: i64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            default_per_page: 25,
            max_per_page: 1000,
            options_limit: 500,
            client_options_limit: 1000,
        }
    }
}

/// The window the team ranks report falls back to when no range is given:
/// from `window_start_days` ago to `window_end_days` ago.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TeamRanksSettings {
    pub window_start_days: u64,
    pub window_end_days: u64,
}

impl Default for TeamRanksSettings {
    fn default() -> Self {
        Self {
            window_start_days: 33,
            window_end_days: 3,
        }
    }
}

impl TeamRanksSettings {
    pub fn default_window(&self, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (
            today.checked_sub_days(Days::new(self.window_start_days)),
            today.checked_sub_days(Days::new(self.window_end_days)),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrancheSettings {
    /// Payees whose cleared EPF payments count toward tranche recovery.
    pub epf_payee_ids: Vec<i64>,
}

impl Default for TrancheSettings {
    fn default() -> Self {
        Self {
            epf_payee_ids: vec![31213, 35285],
        }
    }
}

impl Settings {
    /// Rejects combinations that would make paging or the default windows meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let reports = &self.reports;
        if reports.max_per_page < 1 {
            return Err(ConfigError::ValidationError(
                "reports.max_per_page must be at least 1".to_string(),
            ));
        }
        if !(1..=reports.max_per_page).contains(&reports.default_per_page) {
            return Err(ConfigError::ValidationError(format!(
                "reports.default_per_page must be between 1 and {}",
                reports.max_per_page
            )));
        }
        if reports.options_limit < 1 || reports.client_options_limit < 1 {
            return Err(ConfigError::ValidationError(
                "option limits must be at least 1".to_string(),
            ));
        }
        if self.team_ranks.window_start_days < self.team_ranks.window_end_days {
            return Err(ConfigError::ValidationError(
                "team_ranks.window_start_days must not be after window_end_days".to_string(),
            ));
        }
        if self.tranche.epf_payee_ids.is_empty() {
            return Err(ConfigError::ValidationError(
                "tranche.epf_payee_ids must name at least one payee".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.reports.default_per_page, 25);
        assert_eq!(settings.tranche.epf_payee_ids, vec![31213, 35285]);
        assert_eq!(settings.server.address(), "127.0.0.1:8080");
    }

    #[test]
    fn default_team_window_trails_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let (from, to) = TeamRanksSettings::default().default_window(today);
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 2, 6));
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 3, 7));
    }

    #[test]
    fn inconsistent_paging_is_rejected() {
        let mut settings = Settings::default();
        settings.reports.default_per_page = 2000;
        assert!(matches!(settings.validate(), Err(ConfigError::ValidationError(_))));
    }
}
