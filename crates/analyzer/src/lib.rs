use crate::error::AnalyzerError;
use analytics::ranking::{self, team_name};
use analytics::{ActivityCounts, PerformanceRow};
use chrono::NaiveDate;
use configuration::TeamRanksSettings;
use core_types::{ALL_DATA_SOURCES, DateRange, resolve};
use database::DbRepository;
use database::reports::team_ranks::{TeamRanksInput, TeamRanksQuery};
use serde::Serialize;

pub mod error;

/// The three tables of the team ranks report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamRanks {
    /// Ranked agents, grouped by team and best score first.
    pub agents: Vec<PerformanceRow>,
    /// One ranked row per team.
    pub teams: Vec<PerformanceRow>,
    /// Unranked company totals.
    pub company: PerformanceRow,
}

/// Fetches team-ranks aggregates and turns them into ranked rows.
pub struct TeamRanksAnalyzer {
    settings: TeamRanksSettings,
}

impl TeamRanksAnalyzer {
    pub fn new(settings: TeamRanksSettings) -> Self {
        Self { settings }
    }

    /// Resolves the reporting window. With no token and no explicit bounds the
    /// configured trailing window applies instead of "unbounded".
    pub fn window(
        &self,
        token: Option<&str>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
    ) -> DateRange {
        let blank_token = token.is_none_or(|t| t.trim().is_empty());
        if blank_token && from.is_none() && to.is_none() {
            let (from, to) = self.settings.default_window(today);
            return DateRange::new(from, to, None);
        }
        resolve(token, from, to, today)
    }

    pub async fn run(&self, db_repo: &DbRepository, query: &TeamRanksQuery) -> Result<TeamRanks, AnalyzerError> {
        let input = db_repo.team_ranks_input(query).await?;
        let ranks = assemble(input);
        tracing::info!(
            agents = ranks.agents.len(),
            teams = ranks.teams.len(),
            data_source = query.data_source.as_deref().unwrap_or(ALL_DATA_SOURCES),
            "Team ranks computed"
        );
        Ok(ranks)
    }
}

/// Joins the per-agent aggregates onto the roster, then ranks agents and teams.
///
/// Agents with no name are skipped. Agents missing from an aggregate count zero.
pub fn assemble(input: TeamRanksInput) -> TeamRanks {
    let TeamRanksInput { managers, roster, contacts, enrollments, cancels, nsfs } = input;

    let mut agents: Vec<PerformanceRow> = roster
        .into_iter()
        .filter_map(|entry| {
            let agent = entry.agent_name.filter(|name| !name.is_empty())?;
            let manager = entry.manager_id.and_then(|id| managers.get(&id)).map(String::as_str);
            let (wcc, enrolled_debt) = enrollments.get(&agent).copied().unwrap_or_default();
            let counts = ActivityCounts {
                contacts: contacts.get(&agent).copied().unwrap_or(0),
                wcc,
                cancels: cancels.get(&agent).copied().unwrap_or(0),
                nsfs: nsfs.get(&agent).copied().unwrap_or(0),
                enrolled_debt,
            };
            Some(PerformanceRow::for_agent(team_name(manager), agent, counts))
        })
        .collect();

    ranking::rank_agents(&mut agents);
    let teams = ranking::summarize_teams(&agents);
    let company = ranking::summarize_company(&agents);

    TeamRanks { agents, teams, company }
}

/// Data-source dropdown with the "all" sentinel first and no duplicates.
pub fn data_source_options(sources: Vec<String>) -> Vec<String> {
    let mut options = vec![ALL_DATA_SOURCES.to_string()];
    for source in sources {
        if !options.contains(&source) {
            options.push(source);
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::reports::team_ranks::RosterRow;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn roster(manager_id: Option<i64>, name: &str) -> RosterRow {
        RosterRow { manager_id, agent_name: Some(name.to_string()) }
    }

    #[test]
    fn default_window_applies_only_without_any_range_input() {
        let analyzer = TeamRanksAnalyzer::new(TeamRanksSettings::default());
        let today = date(2024, 5, 10);

        let window = analyzer.window(None, None, None, today);
        assert_eq!(window.from, Some(date(2024, 4, 7)));
        assert_eq!(window.to, Some(date(2024, 5, 7)));

        let all = analyzer.window(Some("all"), None, None, today);
        assert!(all.is_unbounded());

        let explicit = analyzer.window(Some(""), Some(date(2024, 1, 1)), None, today);
        assert_eq!(explicit.from, Some(date(2024, 1, 1)));
        assert_eq!(explicit.to, None);
    }

    #[test]
    fn agents_join_their_manager_team_or_training() {
        let input = TeamRanksInput {
            managers: HashMap::from([(1, "Morgan".to_string())]),
            roster: vec![
                roster(Some(1), "Ana"),
                roster(Some(1), "Ben"),
                roster(None, "Cy"),
                RosterRow { manager_id: Some(1), agent_name: None },
            ],
            contacts: HashMap::from([("Ana".to_string(), 10), ("Ben".to_string(), 10), ("Cy".to_string(), 4)]),
            enrollments: HashMap::from([
                ("Ana".to_string(), (4, dec!(60000))),
                ("Ben".to_string(), (2, dec!(20000))),
            ]),
            cancels: HashMap::from([("Ana".to_string(), 1)]),
            nsfs: HashMap::new(),
        };

        let ranks = assemble(input);
        assert_eq!(ranks.agents.len(), 3);

        let ana = &ranks.agents[0];
        assert_eq!((ana.team.as_str(), ana.agent.as_str()), ("Morgan's Team", "Ana"));
        assert_eq!(ana.net, 3);
        assert_eq!(ana.ratio, Some(0.3));
        assert_eq!(ana.score, Some(200.0));

        let cy = ranks.agents.iter().find(|r| r.agent == "Cy").unwrap();
        assert_eq!(cy.team, "Training Team");
        assert_eq!(cy.ratio, None);

        assert_eq!(ranks.teams.len(), 2);
        assert_eq!(ranks.company.contacts, 24);
        assert_eq!(ranks.company.agent, "All Agents");
        assert_eq!(ranks.company.score, None);
    }

    #[test]
    fn sentinel_leads_the_data_source_options() {
        let options = data_source_options(vec!["Mailers".into(), "All Data Sources".into(), "Web".into()]);
        assert_eq!(options, vec!["All Data Sources", "Mailers", "Web"]);
    }
}
