//! Points policy: finish type × scoreline × settings → per-side outcome.
//!
//! Pure decision logic. Match-finish handling and standings recompute both
//! call [`decide`] with the same inputs so results stay reproducible.

use crate::models::matches::{FinishType, MatchTeamStats};
use crate::models::settings::StandingsSettings;
use crate::models::standings::StreakCode;

/// Result of a match from one side's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum SideOutcome {
    WinReg,
    LossReg,
    Draw,
    WinOvertime,
    LossOvertime,
    WinShootout,
    LossShootout,
}

impl SideOutcome {
    pub fn points(&self, settings: &StandingsSettings) -> u32 {
        match self {
            SideOutcome::WinReg => settings.points_win_reg,
            SideOutcome::LossReg => settings.points_loss_reg,
            SideOutcome::Draw => settings.points_draw_reg,
            SideOutcome::WinOvertime => settings.points_win_overtime,
            SideOutcome::LossOvertime => settings.points_loss_overtime,
            SideOutcome::WinShootout => settings.points_win_shootout,
            SideOutcome::LossShootout => settings.points_loss_shootout,
        }
    }

    pub fn streak_code(&self) -> StreakCode {
        match self {
            SideOutcome::WinReg => StreakCode::W,
            SideOutcome::LossReg => StreakCode::L,
            SideOutcome::Draw => StreakCode::D,
            SideOutcome::WinOvertime => StreakCode::Otw,
            SideOutcome::LossOvertime => StreakCode::Otl,
            SideOutcome::WinShootout => StreakCode::Sow,
            SideOutcome::LossShootout => StreakCode::Sol,
        }
    }

    /// Write this outcome's marker and point value into a stat record,
    /// clearing every other marker first.
    pub fn apply(&self, stats: &mut MatchTeamStats, settings: &StandingsSettings) {
        stats.win = 0;
        stats.loss = 0;
        stats.draw = 0;
        stats.ot_win = 0;
        stats.ot_loss = 0;
        stats.so_win = 0;
        stats.so_loss = 0;
        match self {
            SideOutcome::WinReg => stats.win = 1,
            SideOutcome::LossReg => stats.loss = 1,
            SideOutcome::Draw => stats.draw = 1,
            SideOutcome::WinOvertime => stats.ot_win = 1,
            SideOutcome::LossOvertime => stats.ot_loss = 1,
            SideOutcome::WinShootout => stats.so_win = 1,
            SideOutcome::LossShootout => stats.so_loss = 1,
        }
        stats.points = self.points(settings);
    }
}

/// Decide the (home, away) outcomes for a finished scoreline.
///
/// OVERTIME/SHOOTOUT presuppose a level regulation score; the deciding goal
/// is already part of the tally, so a level tally under those finish types
/// means the deciding goal went to the away side.
pub fn decide(finish: FinishType, home_goals: u32, away_goals: u32) -> (SideOutcome, SideOutcome) {
    use SideOutcome::*;
    match finish {
        FinishType::Regular => {
            if home_goals > away_goals {
                (WinReg, LossReg)
            } else if home_goals < away_goals {
                (LossReg, WinReg)
            } else {
                (Draw, Draw)
            }
        }
        FinishType::Overtime => {
            if home_goals > away_goals {
                (WinOvertime, LossOvertime)
            } else {
                (LossOvertime, WinOvertime)
            }
        }
        FinishType::Shootout => {
            if home_goals > away_goals {
                (WinShootout, LossShootout)
            } else {
                (LossShootout, WinShootout)
            }
        }
    }
}
