//! League operator CLI
//!
//! Loads a league snapshot file, runs reconciliation, standings and roster
//! operations against it, and writes the snapshot back when a command
//! changed state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use sl_core::api;
use sl_core::config::EngineConfig;
use sl_core::models::matches::TeamFlag;
use sl_core::reconcile::AssignmentReconciler;
use sl_core::services::roster::EligibilityReport;
use sl_core::services::RosterService;
use sl_core::stats::standings;
use sl_core::store::MemoryStore;

#[derive(Parser)]
#[command(name = "sl_cli")]
#[command(about = "Operator tools for a league snapshot file", long_about = None)]
struct Cli {
    /// League snapshot file to operate on
    #[arg(long, global = true, value_name = "FILE", default_value = "league.snapshot")]
    league: PathBuf,

    /// Engine config YAML overriding the embedded defaults
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print reports as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan referee assignments against their match slots
    Reconcile {
        /// Rewrite stale match slots from the assignment records
        #[arg(long, default_value = "false")]
        repair: bool,
    },

    /// Print, and optionally rebuild, a standings table
    Standings {
        /// Tournament alias
        #[arg(long)]
        tournament: String,

        /// Season alias
        #[arg(long)]
        season: String,

        /// Round alias; omit together with --rebuild to rebuild the season
        #[arg(long)]
        round: Option<String>,

        /// Matchday alias within the round
        #[arg(long, requires = "round")]
        matchday: Option<String>,

        /// Re-aggregate from the matches before printing
        #[arg(long, default_value = "false")]
        rebuild: bool,
    },

    /// Roster operations
    Roster {
        #[command(subcommand)]
        command: RosterCommands,
    },

    /// League snapshot operations
    League {
        #[command(subcommand)]
        command: LeagueCommands,
    },
}

#[derive(Subcommand)]
enum RosterCommands {
    /// Run the eligibility check over one side of a match
    Validate {
        /// Match document id
        #[arg(long = "match", value_name = "ID")]
        match_id: String,

        /// Side to check: home or away
        #[arg(long, default_value = "home")]
        team: String,
    },
}

#[derive(Subcommand)]
enum LeagueCommands {
    /// Create an empty league snapshot
    Init,

    /// Show collection counts for the snapshot
    Info,
}

fn main() -> Result<()> {
    let Cli { league, config: config_path, json, command } = Cli::parse();

    if let Commands::League { command: LeagueCommands::Init } = &command {
        anyhow::ensure!(
            !league.exists(),
            "refusing to overwrite existing snapshot '{}'",
            league.display()
        );
        MemoryStore::new()
            .save_to_path(&league)
            .with_context(|| format!("failed to create snapshot '{}'", league.display()))?;
        println!("✅ Created empty league snapshot at {}", league.display());
        return Ok(());
    }

    let config = load_config(config_path.as_deref())?;
    let store = MemoryStore::load_from_path(&league)
        .with_context(|| format!("failed to load league snapshot '{}'", league.display()))?;

    match command {
        Commands::Reconcile { repair } => {
            if repair {
                let summary = AssignmentReconciler::new(&store).repair()?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                } else {
                    println!("🔧 {}", api::render_repair_summary(&summary));
                }
                if summary.repaired > 0 {
                    save(&store, &league)?;
                }
            } else {
                let report = api::conflict_report(&store)?;
                let clean = report.conflicts.is_empty();
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print!("{}", api::render_conflicts(&report));
                }
                if !clean {
                    std::process::exit(1);
                }
            }
        }

        Commands::Standings { tournament, season, round, matchday, rebuild } => {
            match (&round, rebuild) {
                (Some(round), _) => {
                    if rebuild {
                        if let Some(md) = &matchday {
                            standings::aggregate_matchday(
                                &store,
                                &tournament,
                                &season,
                                round,
                                md,
                                &config,
                            )?;
                        } else {
                            standings::aggregate_round(
                                &store,
                                &tournament,
                                &season,
                                round,
                                &config,
                            )?;
                        }
                        save(&store, &league)?;
                    }
                    let report = api::standings_report(
                        &store,
                        &config,
                        &tournament,
                        &season,
                        round,
                        matchday.as_deref(),
                    )?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    } else {
                        print!("{}", api::render_standings_table(&report));
                    }
                }
                (None, true) => {
                    let summary =
                        standings::rebuild_season(&store, &tournament, &season, &config)?;
                    save(&store, &league)?;
                    println!(
                        "✅ Rebuilt {} round(s) and {} matchday(s)",
                        summary.rounds, summary.matchdays
                    );
                }
                (None, false) => {
                    anyhow::bail!("--round is required unless --rebuild rebuilds the whole season")
                }
            }
        }

        Commands::Roster { command } => match command {
            RosterCommands::Validate { match_id, team } => {
                let team = TeamFlag::parse(&team)?;
                let report =
                    RosterService::new(&store, &config).validate_eligibility(&match_id, team)?;
                save(&store, &league)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print_eligibility(&match_id, team, &report);
                }
                if report.summary.invalid > 0 {
                    std::process::exit(1);
                }
            }
        },

        Commands::League { command } => match command {
            LeagueCommands::Init => unreachable!("handled before the snapshot is loaded"),
            LeagueCommands::Info => {
                let info = api::league_info(&store)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&info)?);
                } else {
                    println!("📊 League snapshot: {}", league.display());
                    println!("   Tournaments: {}", info.tournaments);
                    println!("   Matches:     {}", info.matches);
                    println!("   Players:     {}", info.players);
                    println!("   Users:       {}", info.users);
                    println!("   Assignments: {}", info.assignments);
                }
            }
        },
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load_from_path(path)
            .with_context(|| format!("failed to load engine config '{}'", path.display())),
        None => Ok(sl_core::config::engine_defaults().clone()),
    }
}

fn save(store: &MemoryStore, path: &Path) -> Result<()> {
    store
        .save_to_path(path)
        .with_context(|| format!("failed to save league snapshot '{}'", path.display()))?;
    println!("💾 Snapshot saved to {}", path.display());
    Ok(())
}

fn print_eligibility(match_id: &str, team: TeamFlag, report: &EligibilityReport) {
    println!("Eligibility for match '{}' ({} side):", match_id, team.name());
    for verdict in &report.verdicts {
        let reasons = if verdict.reasons.is_empty() {
            String::new()
        } else {
            let codes: Vec<&str> = verdict.reasons.iter().map(|r| r.name()).collect();
            format!("  [{}]", codes.join(", "))
        };
        println!("  {:<8} {}{}", verdict.status.name(), verdict.player_id, reasons);
    }
    println!(
        "✅ {} valid, ❌ {} invalid, ❓ {} unknown",
        report.summary.valid, report.summary.invalid, report.summary.unknown
    );
}
