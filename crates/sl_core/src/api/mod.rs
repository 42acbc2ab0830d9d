pub mod report;


pub use report::{
    conflict_report, league_info, render_conflicts, render_repair_summary,
    render_standings_table, standings_report, ConflictReport, LeagueInfo, StandingsReport,
};
