use std::rc::Rc;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;

use guess_the_elo::clock::ManualClock;
use guess_the_elo::daily::DailyLedger;
use guess_the_elo::mode::{GameMode, GameOptions, TimeLimit};
use guess_the_elo::provider::LocalProvider;
use guess_the_elo::record::GameRecord;
use guess_the_elo::session::{GameEvent, LifeChange, Phase, RoundView, Session};
use guess_the_elo::storage::SqliteStorage;

fn games() -> Vec<GameRecord> {
    (0..8)
        .map(|i| GameRecord {
            moves: "d4 d5 c4 e6 Nc3 Nf6".into(),
            site: "https://lichess.org".into(),
            event: "Rated Blitz game".into(),
            time_control: "300+0".into(),
            white_elo: 1200 + i * 100,
            black_elo: 1250 + i * 100,
        })
        .collect()
}

fn session(seed: u64) -> Session {
    let clock = ManualClock::at_reference(NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(), 12, 0);
    let storage = Rc::new(SqliteStorage::in_memory().unwrap());
    let ledger = DailyLedger::load(storage, Rc::new(clock));
    let provider = LocalProvider::new(games(), StdRng::seed_from_u64(seed));
    Session::new(Box::new(provider), ledger, StdRng::seed_from_u64(seed + 1))
}

fn presented(events: &[GameEvent]) -> RoundView {
    events
        .iter()
        .find_map(|e| match e {
            GameEvent::RoundPresented(view) => Some(view.clone()),
            _ => None,
        })
        .expect("round presented")
}

/// Correct rating for the presented round, recovered from the game pool
fn correct_for(view: &RoundView, s: &Session) -> u32 {
    let game = s.current_game().unwrap();
    game.elo_for(view.orientation)
}

#[test]
fn game_score_is_sum_of_round_scores() {
    let mut s = session(10);
    let opts = GameOptions {
        time_limit: TimeLimit::Secs45,
        ..GameOptions::default()
    };
    let mut view = presented(&s.start(GameMode::Classic, opts));
    for round in 0..5 {
        s.tick(round as f64 * 3.0);
        let pick = if round % 2 == 0 {
            correct_for(&view, &s)
        } else {
            *view
                .choices
                .iter()
                .find(|&&c| c != correct_for(&view, &s))
                .unwrap()
        };
        s.submit_answer(pick);
        let next = s.advance();
        if round < 4 {
            view = presented(&next);
        }
    }
    assert_eq!(s.phase(), Phase::SessionComplete);
    let sum: u32 = s.rounds().iter().map(|r| r.round_score).sum();
    assert_eq!(s.game_score(), sum);
    assert_eq!(s.correct_count(), 3);
}

#[test]
fn endless_timeout_with_two_lives_leaves_one() {
    let mut s = session(20);
    let opts = GameOptions {
        time_limit: TimeLimit::Secs90,
        ..GameOptions::default()
    };
    let view = presented(&s.start(GameMode::Endless, opts));
    let wrong = *view
        .choices
        .iter()
        .find(|&&c| c != correct_for(&view, &s))
        .unwrap();
    s.submit_answer(wrong);
    s.advance();
    assert_eq!(s.lives(), 2);

    let events = s.tick(90.0);
    assert_matches!(&events[..], [GameEvent::RoundResolved(o)] => {
        assert!(o.record.timed_out);
        assert_eq!(o.record.round_score, 0);
        assert_eq!(o.life_change, LifeChange::Lost);
        assert!(!o.session_over);
    });
    assert_eq!(s.lives(), 1);
    assert_eq!(s.streak(), 0);
    assert_matches!(
        &s.advance()[..],
        [GameEvent::RoundPresented(_), GameEvent::CountdownStarted { seconds: 90 }]
    );
}

#[test]
fn stale_countdown_cannot_resolve_next_round() {
    let mut s = session(30);
    let opts = GameOptions {
        time_limit: TimeLimit::Secs45,
        ..GameOptions::default()
    };
    let view = presented(&s.start(GameMode::Classic, opts));
    s.tick(44.0);
    s.submit_answer(correct_for(&view, &s));
    s.advance();
    // The new round has a fresh 45s clock
    assert!(s.tick(44.0).is_empty());
    assert_eq!(s.rounds().len(), 1);
}

#[test]
fn rounds_share_text_reflects_session() {
    let mut s = session(40);
    let view = presented(&s.start(GameMode::Endless, GameOptions::default()));
    s.submit_answer(correct_for(&view, &s));
    let text = s.share_text();
    assert!(text.starts_with("Guess The ELO - Endless Mode\n"));
    assert!(text.contains("(1,000)"));
    assert!(text.contains("1 Rounds | Total: 1,000"));
}

#[test]
fn daily_session_uses_fixed_options() {
    let mut s = session(50);
    let events = s.start(
        GameMode::Daily,
        GameOptions {
            time_limit: TimeLimit::None,
            evaluation: false,
            ..GameOptions::default()
        },
    );
    assert_matches!(events[0], GameEvent::SessionStarted { options, .. } if options == GameOptions::daily());
    assert_matches!(events.last(), Some(GameEvent::CountdownStarted { seconds: 90 }));
    assert_eq!(s.rounds_label(), "1 of 1");
}
