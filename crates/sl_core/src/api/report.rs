//! Operator reports: JSON contract types for the CLI plus their plain-text
//! renderings.
//!
//! Builders read the tables the last aggregation wrote; nothing here
//! recomputes stats. Renderers are pure functions over the report types so
//! the same data can go to stdout as a table or as JSON.

use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{LeagueError, Result};
use crate::models::assignment::AssignmentStatus;
use crate::models::standings::StandingsRow;
use crate::reconcile::{AssignmentReconciler, Conflict, RepairSummary};
use crate::stats::standings::ranked;
use crate::store::LeagueStore;

/// Ranked standings for one round or matchday, display names resolved.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StandingsReport {
    pub tournament: String,
    pub season: String,
    pub round: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matchday: Option<String>,
    /// Rows in presentation order; rank is index + 1.
    pub rows: Vec<StandingsRow>,
}

impl StandingsReport {
    /// Scope header: `Tournament / Season / Round[ / Matchday]`.
    pub fn scope_line(&self) -> String {
        let mut line = format!("{} / {} / {}", self.tournament, self.season, self.round);
        if let Some(md) = &self.matchday {
            line.push_str(" / ");
            line.push_str(md);
        }
        line
    }
}

/// Result of one reconciliation scan.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    /// ASSIGNED assignments examined.
    pub checked: usize,
    pub conflicts: Vec<Conflict>,
}

/// Collection counts of the loaded league state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeagueInfo {
    pub tournaments: usize,
    pub matches: usize,
    pub players: usize,
    pub users: usize,
    pub assignments: usize,
}

/// Read one scope's stored standings and rank them for presentation.
///
/// Callers wanting fresh numbers rebuild through `stats::standings` first.
pub fn standings_report<S: LeagueStore>(
    store: &S,
    config: &EngineConfig,
    tournament: &str,
    season: &str,
    round: &str,
    matchday: Option<&str>,
) -> Result<StandingsReport> {
    debug!("Building standings report for '{tournament}/{season}/{round}'");
    let doc = store
        .get_tournament(tournament)?
        .ok_or_else(|| LeagueError::not_found("Tournament", tournament))?;
    let season_doc = doc
        .season(season)
        .ok_or_else(|| LeagueError::not_found_in("Season", season, format!("'{tournament}'")))?;
    let round_doc = season_doc.round(round).ok_or_else(|| {
        LeagueError::not_found_in("Round", round, format!("season '{season}' of '{tournament}'"))
    })?;

    let (table, matchday_name) = match matchday {
        Some(md) => {
            let md_doc = round_doc.matchday(md).ok_or_else(|| {
                LeagueError::not_found_in(
                    "Matchday",
                    md,
                    format!("round '{round}' of '{tournament}/{season}'"),
                )
            })?;
            if !md_doc.create_standings {
                warn!("Standings are disabled for matchday '{md}'");
            }
            (&md_doc.standings, Some(md_doc.name.clone()))
        }
        None => {
            if !round_doc.create_standings {
                warn!("Standings are disabled for round '{round}'");
            }
            (&round_doc.standings, None)
        }
    };

    let rows: Vec<StandingsRow> = ranked(table, config.tie_break).into_iter().cloned().collect();
    info!("Standings report for '{tournament}/{season}/{round}': {} team(s)", rows.len());
    Ok(StandingsReport {
        tournament: doc.name.clone(),
        season: season_doc.name.clone(),
        round: round_doc.name.clone(),
        matchday: matchday_name,
        rows,
    })
}

/// Run a detection pass and wrap it for presentation.
pub fn conflict_report<S: LeagueStore>(store: &S) -> Result<ConflictReport> {
    let checked = store.assignments_with_status(AssignmentStatus::Assigned)?.len();
    let conflicts = AssignmentReconciler::new(store).detect()?;
    if conflicts.is_empty() {
        info!("Reconciliation scan clean: {checked} assignment(s) checked");
    } else {
        warn!("Reconciliation scan found {} conflict(s)", conflicts.len());
    }
    Ok(ConflictReport { checked, conflicts })
}

/// Consistent point-in-time counts across every collection.
pub fn league_info<S: LeagueStore>(store: &S) -> Result<LeagueInfo> {
    store.transaction(|state| {
        Ok(LeagueInfo {
            tournaments: state.tournaments.len(),
            matches: state.matches.len(),
            players: state.players.len(),
            users: state.users.len(),
            assignments: state.assignments.len(),
        })
    })
}

// ============================================================================
// Text rendering
// ============================================================================

const TEAM_COL: usize = 18;

static TABLE_HEADER: Lazy<String> = Lazy::new(|| {
    table_line(
        "#",
        "TEAM",
        ["GP", "W", "D", "L", "OTW", "OTL", "SOW", "SOL", "GF", "GA", "DIFF", "PTS"],
        "FORM",
    )
});

/// Fixed-width standings table, one line per team in rank order.
pub fn render_standings_table(report: &StandingsReport) -> String {
    let mut out = String::with_capacity(128 + report.rows.len() * 96);
    out.push_str(&report.scope_line());
    out.push('\n');
    out.push_str(&TABLE_HEADER);
    out.push('\n');
    if report.rows.is_empty() {
        out.push_str("(no standings for this scope)\n");
        return out;
    }
    for (i, row) in report.rows.iter().enumerate() {
        out.push_str(&standings_line(i + 1, row));
        out.push('\n');
    }
    out
}

/// Conflict listing: one summary line, then a block per conflict.
pub fn render_conflicts(report: &ConflictReport) -> String {
    let mut out = format!(
        "{} ASSIGNED assignment(s) checked, {} conflict(s)\n",
        report.checked,
        report.conflicts.len()
    );
    for conflict in &report.conflicts {
        out.push('\n');
        out.push_str(&format!(
            "{}  assignment '{}'  match '{}'  position {}\n",
            conflict.kind.name(),
            conflict.assignment_id,
            conflict.match_id,
            conflict.position
        ));
        out.push_str(&format!("  {}\n", conflict.issue));
    }
    out
}

/// One-line repair outcome for the CLI.
pub fn render_repair_summary(summary: &RepairSummary) -> String {
    format!(
        "checked {}, conflicts {}, repaired {}, errors {}",
        summary.checked, summary.conflicts, summary.repaired, summary.errors
    )
}

fn standings_line(rank: usize, row: &StandingsRow) -> String {
    let form = if row.streak.is_empty() {
        "-".to_string()
    } else {
        row.streak.iter().map(|c| c.name()).collect::<Vec<_>>().join(" ")
    };
    let cells = [
        row.games_played.to_string(),
        row.wins.to_string(),
        row.draws.to_string(),
        row.losses.to_string(),
        row.ot_wins.to_string(),
        row.ot_losses.to_string(),
        row.so_wins.to_string(),
        row.so_losses.to_string(),
        row.goals_for.to_string(),
        row.goals_against.to_string(),
        format!("{:+}", row.goal_diff()),
        row.points.to_string(),
    ];
    let cells: [&str; 12] = std::array::from_fn(|i| cells[i].as_str());
    table_line(&rank.to_string(), &row.name, cells, &form)
}

fn table_line(pos: &str, team: &str, cells: [&str; 12], form: &str) -> String {
    let team = fit(team, TEAM_COL);
    let mut line = format!("{pos:>2}  {team:<width$}", width = TEAM_COL);
    for (i, cell) in cells.iter().enumerate() {
        // eight narrow tally columns, four wider score columns
        let width = if i < 8 { 3 } else { 4 };
        line.push_str(&format!(" {cell:>width$}"));
    }
    line.push_str("  ");
    line.push_str(form);
    line.trim_end().to_string()
}

fn fit(name: &str, width: usize) -> String {
    name.chars().take(width).collect()
}
