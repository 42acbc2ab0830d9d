use chrono::TimeZone;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use sl_core::config::EngineConfig;
use sl_core::models::matches::{FinishType, Match, MatchStatus, TeamSide};
use sl_core::models::settings::StandingsSettings;
use sl_core::models::tournament::{Matchday, Round, Season, Tournament};
use sl_core::stats::{outcome, standings};
use sl_core::store::{LeagueStore, MemoryStore};

fn finished(
    n: u32,
    home: (&str, &str),
    away: (&str, &str),
    goals: (u32, u32),
    finish: FinishType,
    matchday: &str,
) -> Match {
    let mut m = Match::new(&format!("m-{n}"), n);
    m.tournament = Some(("City League", "city-league").into());
    m.season = Some(("2025", "2025").into());
    m.round = Some(("Main Round", "main").into());
    m.matchday = Some((matchday, matchday).into());
    m.home = TeamSide::named(home.0, home.1);
    m.away = TeamSide::named(away.0, away.1);
    m.match_status = MatchStatus::Finished;
    m.finish_type = finish;
    m.start_date =
        Some(chrono::Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap() + chrono::Duration::hours(n as i64));
    let settings = StandingsSettings::default();
    let (hs, as_) = outcome::compute(m.match_status, finish, &settings, goals.0, goals.1);
    m.home.stats = hs;
    m.away.stats = as_;
    m
}

/// Full round robin between `teams` sides, roughly a season's worth of
/// matches for one round.
fn league_round(teams: usize) -> Vec<Match> {
    let ids: Vec<String> = (0..teams).map(|i| format!("t-{i:02}")).collect();
    let names: Vec<String> = (0..teams).map(|i| format!("Team {i:02}")).collect();

    let mut matches = Vec::new();
    let mut n = 0u32;
    for i in 0..teams {
        for j in (i + 1)..teams {
            n += 1;
            let finish = match n % 3 {
                0 => FinishType::Shootout,
                1 => FinishType::Regular,
                _ => FinishType::Overtime,
            };
            let mut h = n % 4;
            let a = (n / 4) % 4;
            if finish != FinishType::Regular && h == a {
                h += 1;
            }
            let matchday = format!("day-{}", n % 4 + 1);
            matches.push(finished(
                n,
                (&ids[i], &names[i]),
                (&ids[j], &names[j]),
                (h, a),
                finish,
                &matchday,
            ));
        }
    }
    matches
}

fn seeded_store(teams: usize) -> MemoryStore {
    let store = MemoryStore::new();
    let matchdays = (1..=4)
        .map(|d| Matchday {
            name: format!("Day {d}"),
            alias: format!("day-{d}"),
            create_standings: true,
            ..Default::default()
        })
        .collect();
    store
        .insert_tournament(Tournament {
            name: "City League".into(),
            alias: "city-league".into(),
            seasons: vec![Season {
                name: "2025".into(),
                alias: "2025".into(),
                rounds: vec![Round {
                    name: "Main Round".into(),
                    alias: "main".into(),
                    create_standings: true,
                    matchdays,
                    ..Default::default()
                }],
                ..Default::default()
            }],
        })
        .unwrap();
    for m in league_round(teams) {
        store.insert_match(m).unwrap();
    }
    store
}

fn bench_aggregate(c: &mut Criterion) {
    let config = EngineConfig::default();
    let matches = league_round(12);
    c.bench_function("standings_aggregate_66_matches", |b| {
        b.iter(|| {
            let table = standings::aggregate(black_box(&matches), &config);
            black_box(table.len());
        })
    });
}

fn bench_ranked(c: &mut Criterion) {
    let config = EngineConfig::default();
    let table = standings::aggregate(&league_round(12), &config);
    c.bench_function("standings_ranked", |b| {
        b.iter(|| {
            let rows = standings::ranked(black_box(&table), config.tie_break);
            black_box(rows.len());
        })
    });
}

fn bench_rebuild_season(c: &mut Criterion) {
    let config = EngineConfig::default();
    let store = seeded_store(12);
    c.bench_function("season_rebuild", |b| {
        b.iter(|| {
            let summary =
                standings::rebuild_season(&store, "city-league", "2025", &config).unwrap();
            black_box(summary.matchdays);
        })
    });
}

criterion_group!(standings_benches, bench_aggregate, bench_ranked, bench_rebuild_season);
criterion_main!(standings_benches);
