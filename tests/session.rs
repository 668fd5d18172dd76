//! End-to-end session through the public engine API: play, save, come back
//! later, catch up offline, prestige.

use tap_to_empire::engine::logic;
use tap_to_empire::engine::rng::seeded;
use tap_to_empire::engine::save::{self, BlobStore, MemoryStore, STORAGE_KEY};
use tap_to_empire::engine::EngineState;
use tap_to_empire::time::{Millis, TICKS_PER_SEC};

const START: Millis = 1_700_000_000_000;
const HOUR: Millis = 3_600_000;

#[test]
fn play_save_return_and_prestige() {
    let mut store = MemoryStore::new();
    let mut state = save::load_game(&mut store, START);
    assert_eq!(state, EngineState::new(START));
    assert!(logic::apply_offline_catch_up(&mut state, START).is_none());

    // Tap up to the first producer, one tap per 100ms.
    let mut rng = seeded(1);
    let mut now = START;
    while state.currency < 25.0 {
        now += 100;
        logic::tap(&mut state, now, &mut rng);
    }
    assert!(logic::purchase_producer(&mut state, "intern"));
    assert!(state.combo.value() > 1.0);

    // Idle for a minute of live ticks: combo decays, income accrues.
    let before = state.currency;
    for _ in 0..60 * TICKS_PER_SEC {
        now += 50;
        logic::tick(&mut state, 1, now);
    }
    assert_eq!(state.combo.value(), 1.0);
    assert!((state.currency - before - 30.0).abs() < 1e-6);

    save::save_game(&mut state, &mut store, now).unwrap();

    // Come back a day later: only 12 hours are paid.
    let later = now + 24 * HOUR;
    let mut state = save::load_game(&mut store, later);
    let offline = logic::apply_offline_catch_up(&mut state, later).unwrap();
    assert_eq!(offline.seconds, logic::OFFLINE_CAP_SECS);
    assert!((offline.earned - 0.5 * 43_200.0).abs() < 1e-6);

    // A windfall worth about 20 × 50k of valuation: four points.
    state.currency += 1_000_000.0;
    let gain = state.prestige_gain();
    assert_eq!(gain, 4);
    assert_eq!(logic::prestige(&mut state), Some(gain));
    assert_eq!(state.prestige_points, gain);
    assert_eq!(state.currency, 0.0);
    assert!(state.producers.iter().all(|p| p.quantity == 0));

    save::save_game(&mut state, &mut store, later).unwrap();
    let reloaded = save::load_game(&mut store, later);
    assert_eq!(reloaded.prestige_points, gain);
    assert!(reloaded.tap_power(later) > 1.0);
}

#[test]
fn legacy_partial_save_upgrades_cleanly() {
    let mut store = MemoryStore::new();
    store.write(STORAGE_KEY, r#"{"currency": 500}"#).unwrap();
    let state = save::load_game(&mut store, START);

    let mut expected = EngineState::new(START);
    expected.currency = 500.0;
    assert_eq!(state, expected);
}

#[test]
fn corrupt_save_starts_fresh() {
    let mut store = MemoryStore::new();
    store.write(STORAGE_KEY, "\u{0}garbage").unwrap();
    let state = save::load_game(&mut store, START);
    assert_eq!(state, EngineState::new(START));
    assert!(store.read(STORAGE_KEY).unwrap().is_none());
}

#[test]
fn offline_matches_live_ticking_for_an_hour() {
    let mut offline = EngineState::new(START);
    offline.producers[1].quantity = 7;
    offline.producers[3].quantity = 2;
    let mut live = offline.clone();

    let end = START + HOUR;
    logic::apply_offline_catch_up(&mut offline, end);

    let ticks = 3_600 * TICKS_PER_SEC;
    for _ in 0..ticks {
        logic::advance_time(&mut live, 1.0 / TICKS_PER_SEC as f64, end);
    }
    let rel = (offline.currency - live.currency).abs() / live.currency;
    assert!(rel < 1e-9, "offline {} live {}", offline.currency, live.currency);
}
