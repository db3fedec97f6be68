use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::AddAssign;

pub const RATIO_WEIGHT: f64 = 50.0;
pub const WCC_WEIGHT: f64 = 30.0;
pub const DEBT_WEIGHT: f64 = 20.0;

pub const TRAINING_TEAM: &str = "Training Team";
pub const ALL_AGENTS: &str = "All Agents";
pub const COMPANY_WIDE: &str = "Company-Wide";

/// Descending "average tie" ranks, returned in input order.
///
/// Rank 1 is the highest value. Tied values share the mean of the positions
/// their group spans, so `[10, 10, 5]` ranks as `[1.5, 1.5, 3]`.
pub fn rank(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let value = values[order[start]];
        let end = order[start..]
            .iter()
            .position(|&i| values[i].total_cmp(&value) != Ordering::Equal)
            .map_or(order.len(), |offset| start + offset);

        // Positions start+1 ..= end, averaged.
        let average = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = average;
        }
        start = end;
    }
    ranks
}

/// Weighted composite score. `None` unless all three ranks are present and non-zero.
pub fn score(
    rank_ratio: Option<f64>,
    rank_wcc: Option<f64>,
    rank_debt: Option<f64>,
    total_count: usize,
) -> Option<f64> {
    let present = |rank: Option<f64>| rank.filter(|r| *r != 0.0);
    let (ratio, wcc, debt) = (present(rank_ratio)?, present(rank_wcc)?, present(rank_debt)?);
    let n = total_count as f64;
    Some((n - ratio) * RATIO_WEIGHT + (n - wcc) * WCC_WEIGHT + (n - debt) * DEBT_WEIGHT)
}

/// Team label for an agent's reporting manager.
pub fn team_name(manager: Option<&str>) -> String {
    match manager.map(str::trim).filter(|m| !m.is_empty()) {
        Some(manager) => format!("{manager}'s Team"),
        None => TRAINING_TEAM.to_string(),
    }
}

/// Raw activity totals for an agent, a team or the company.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActivityCounts {
    pub contacts: i64,
    pub wcc: i64,
    pub cancels: i64,
    pub nsfs: i64,
    pub enrolled_debt: Decimal,
}

impl ActivityCounts {
    pub fn net(&self) -> i64 {
        self.wcc - self.cancels - self.nsfs
    }

    /// Agent ratio: undefined without any welcome-call completion or contacts.
    pub fn agent_ratio(&self) -> Option<f64> {
        if self.wcc < 1 || self.contacts <= 0 {
            return None;
        }
        Some(self.net() as f64 / self.contacts as f64)
    }

    /// Team and company ratio: only requires contacts.
    pub fn aggregate_ratio(&self) -> Option<f64> {
        (self.contacts > 0).then(|| self.net() as f64 / self.contacts as f64)
    }
}

impl AddAssign for ActivityCounts {
    fn add_assign(&mut self, other: Self) {
        self.contacts += other.contacts;
        self.wcc += other.wcc;
        self.cancels += other.cancels;
        self.nsfs += other.nsfs;
        self.enrolled_debt += other.enrolled_debt;
    }
}

/// One line of the team ranks report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRow {
    pub team: String,
    pub agent: String,
    pub contacts: i64,
    pub wcc: i64,
    pub cancels: i64,
    pub nsfs: i64,
    pub enrolled_debt: Decimal,
    pub net: i64,
    pub ratio: Option<f64>,
    pub rank_ratio: Option<f64>,
    pub rank_wcc: Option<f64>,
    pub rank_debt: Option<f64>,
    pub score: Option<f64>,
}

impl PerformanceRow {
    fn build(team: String, agent: String, counts: ActivityCounts, ratio: Option<f64>) -> Self {
        Self {
            team,
            agent,
            contacts: counts.contacts,
            wcc: counts.wcc,
            cancels: counts.cancels,
            nsfs: counts.nsfs,
            enrolled_debt: counts.enrolled_debt,
            net: counts.net(),
            ratio,
            rank_ratio: None,
            rank_wcc: None,
            rank_debt: None,
            score: None,
        }
    }

    pub fn for_agent(team: impl Into<String>, agent: impl Into<String>, counts: ActivityCounts) -> Self {
        Self::build(team.into(), agent.into(), counts, counts.agent_ratio())
    }

    pub fn for_group(team: impl Into<String>, counts: ActivityCounts) -> Self {
        Self::build(team.into(), ALL_AGENTS.to_string(), counts, counts.aggregate_ratio())
    }

    pub fn counts(&self) -> ActivityCounts {
        ActivityCounts {
            contacts: self.contacts,
            wcc: self.wcc,
            cancels: self.cancels,
            nsfs: self.nsfs,
            enrolled_debt: self.enrolled_debt,
        }
    }
}

/// Ranks every row on ratio, WCC and enrolled debt, then scores it.
///
/// A missing ratio ranks as negative infinity so it sorts last.
pub fn rank_rows(rows: &mut [PerformanceRow]) {
    let count = rows.len().max(1);
    let ratios: Vec<f64> = rows.iter().map(|r| r.ratio.unwrap_or(f64::NEG_INFINITY)).collect();
    let wccs: Vec<f64> = rows.iter().map(|r| r.wcc as f64).collect();
    let debts: Vec<f64> = rows
        .iter()
        .map(|r| r.enrolled_debt.to_f64().unwrap_or(0.0))
        .collect();

    let (ratio_ranks, wcc_ranks, debt_ranks) = (rank(&ratios), rank(&wccs), rank(&debts));
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank_ratio = Some(ratio_ranks[i]);
        row.rank_wcc = Some(wcc_ranks[i]);
        row.rank_debt = Some(debt_ranks[i]);
        row.score = score(row.rank_ratio, row.rank_wcc, row.rank_debt, count);
    }
}

/// Team name ascending, then score descending with unscored rows last.
pub fn sort_rows(rows: &mut [PerformanceRow]) {
    rows.sort_by(|a, b| {
        a.team.cmp(&b.team).then_with(|| match (a.score, b.score) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
    });
}

/// Ranks and orders agent rows in place.
pub fn rank_agents(rows: &mut Vec<PerformanceRow>) {
    rank_rows(rows);
    sort_rows(rows);
}

/// One "All Agents" row per team, ranked against the other teams.
pub fn summarize_teams(agents: &[PerformanceRow]) -> Vec<PerformanceRow> {
    let mut totals: BTreeMap<&str, ActivityCounts> = BTreeMap::new();
    for agent in agents {
        *totals.entry(agent.team.as_str()).or_default() += agent.counts();
    }

    let mut teams: Vec<PerformanceRow> = totals
        .into_iter()
        .map(|(team, counts)| PerformanceRow::for_group(team, counts))
        .collect();
    rank_rows(&mut teams);
    sort_rows(&mut teams);
    teams
}

/// Company-wide totals. This row is never ranked.
pub fn summarize_company(agents: &[PerformanceRow]) -> PerformanceRow {
    let mut totals = ActivityCounts::default();
    for agent in agents {
        totals += agent.counts();
    }
    PerformanceRow::for_group(COMPANY_WIDE, totals)
}
