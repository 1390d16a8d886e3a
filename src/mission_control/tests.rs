use super::*;
use crate::dsky::{Code, Directive, IndicatorName, Key};
use crate::flight_control::FlightComputer;
use crate::scenario::{Comparator, EventKind, InitialState, Scenario, ScenarioEvent, Trigger};
use chrono::{TimeDelta, Utc};

const TICK: f64 = 0.1;
const MAX_TICKS: usize = 10_000;

fn initial(program: u8, altitude: f64, velocity: f64, fuel: f64) -> InitialState {
    InitialState {
        program: Code::new(program),
        verb: Code::new(16),
        noun: Code::new(62),
        altitude,
        velocity,
        fuel,
        mission_time: None,
    }
}

fn loaded(init: InitialState, events: Vec<ScenarioEvent>) -> GuidanceComputer {
    let scenario = Scenario::new("test", "Test Flight", Some("Scenario used by the kernel tests."), init, events).unwrap();
    let mut gc = GuidanceComputer::new();
    gc.load_scenario(&scenario, Utc::now());
    gc
}

fn press(gc: &mut GuidanceComputer, keys: &str) {
    for key in Key::parse_sequence(keys).unwrap() {
        gc.handle_key(key);
    }
}

/// Ticks until the flight stops, returning whether the priority lock was ever seen.
fn fly_until_stopped(gc: &mut GuidanceComputer) -> bool {
    let mut lock_seen = false;
    for _ in 0..MAX_TICKS {
        if !gc.flight_state().active {
            break;
        }
        gc.advance(TICK);
        lock_seen |= gc.command_state().priority_lock;
    }
    assert!(!gc.flight_state().active, "flight did not end");
    lock_seen
}

fn count(gc: &GuidanceComputer, prefix: &str) -> usize { gc.log().messages().filter(|m| m.starts_with(prefix)).count() }

fn position(gc: &GuidanceComputer, message: &str) -> Option<usize> { gc.log().messages().position(|m| m == message) }

#[test]
fn test_alarm_then_success_landing() {
    let mut gc = loaded(
        initial(63, 40_000.0, -500.0, 100.0),
        vec![
            ScenarioEvent::alarm(Trigger::Altitude, Comparator::Less, 33_000.0, "1202"),
            ScenarioEvent::outcome(Trigger::Altitude, Comparator::LessOrEqual, 0.0, EventKind::Success, "THE EAGLE HAS LANDED"),
        ],
    );
    press(&mut gc, "V37N63E P");
    assert!(gc.flight_state().active);

    let lock_seen = fly_until_stopped(&mut gc);
    assert!(lock_seen);
    assert_eq!(count(&gc, "ALARM "), 1);
    let alarm = position(&gc, "ALARM 1202. SYSTEM ERROR").unwrap();
    let success = position(&gc, "THE EAGLE HAS LANDED").unwrap();
    assert!(alarm < success);
    assert_eq!(count(&gc, "CRASH"), 0);
    assert_eq!(count(&gc, "TOUCHDOWN"), 0);
    assert_eq!(gc.flight_state().altitude, 0.0);
    assert!(gc.indicators().get(IndicatorName::UplinkActy));
}

#[test]
fn test_fuel_exhaustion_fails_mission() {
    let mut gc = loaded(
        initial(0, 15_000.0, 0.0, 40.0),
        vec![ScenarioEvent {
            trigger: Trigger::Fuel,
            comparator: Comparator::LessOrEqual,
            threshold: 0.0,
            kind: EventKind::Fail,
            code: None,
            message: None,
        }],
    );
    press(&mut gc, "V37N63E P");
    press(&mut gc, &"+ ".repeat(18));
    assert_eq!(gc.flight_state().thrust, 100.0);

    fly_until_stopped(&mut gc);
    let flight = gc.flight_state();
    assert!(!flight.active);
    assert_eq!(flight.fuel, 0.0);
    assert!(flight.altitude > 15_000.0);
    assert_eq!(count(&gc, "MISSION FAILURE"), 1);
    assert_eq!(count(&gc, "MISSION SUCCESS"), 0);
    assert!(gc.indicators().get(IndicatorName::OprErr));
}

#[test]
fn test_hard_impact_is_crash() {
    let mut gc = loaded(initial(0, 100.0, -50.0, 100.0), Vec::new());
    press(&mut gc, "V37N63E P");
    fly_until_stopped(&mut gc);
    assert_eq!(gc.flight_state().altitude, 0.0);
    assert_eq!(count(&gc, "CRASH. VEL: -"), 1);
    assert_eq!(count(&gc, "TOUCHDOWN"), 0);
    assert!(gc.indicators().get(IndicatorName::OprErr));
}

#[test]
fn test_soft_impact_is_touchdown() {
    let mut gc = loaded(initial(0, 1.0, -2.0, 100.0), Vec::new());
    press(&mut gc, "V37N66E P");
    assert_eq!(gc.flight_state().thrust, 0.0);
    fly_until_stopped(&mut gc);
    assert_eq!(gc.flight_state().altitude, 0.0);
    assert_eq!(gc.log().last().unwrap().message, "TOUCHDOWN. ENGINE STOP.");
    assert_eq!(count(&gc, "CRASH"), 0);
    assert!(gc.indicators().get(IndicatorName::UplinkActy));
}

#[test]
fn test_zero_dt_is_idempotent() {
    let mut gc = loaded(initial(63, 40_000.0, -500.0, 100.0), Vec::new());
    press(&mut gc, "V37N63E P");
    let before = gc.flight_state();
    for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(!gc.advance(dt));
        assert_eq!(gc.flight_state(), before);
    }
}

#[test]
fn test_inactive_flight_is_frozen() {
    let mut gc = loaded(initial(0, 110_000.0, 1_600.0, 100.0), Vec::new());
    let before = gc.flight_state();
    for _ in 0..100 {
        gc.advance(TICK);
    }
    assert_eq!(gc.flight_state(), before);
}

#[test]
fn test_small_ticks_accumulate() {
    let mut gc = loaded(initial(0, 1_000.0, 0.0, 100.0), Vec::new());
    press(&mut gc, "V37N66E P");
    let before = gc.flight_state();
    assert!(!gc.advance(0.02));
    assert!(!gc.advance(0.02));
    assert_eq!(gc.flight_state(), before);
    assert!(gc.advance(0.02));
    let expected = -FlightComputer::GRAVITY * 0.06;
    assert!((gc.flight_state().velocity - expected).abs() < 1e-9);
}

#[test]
fn test_long_gap_is_clamped() {
    let mut gc = loaded(initial(0, 1_000.0, 0.0, 100.0), Vec::new());
    press(&mut gc, "V37N66E P");
    assert!(gc.advance(30.0));
    let expected = -FlightComputer::GRAVITY * GuidanceComputer::MAX_STEP;
    assert!((gc.flight_state().velocity - expected).abs() < 1e-9);
    assert!(gc.flight_state().altitude > 999.0);
}

#[test]
fn test_events_fire_at_most_once() {
    let mut gc = loaded(
        initial(63, 20_000.0, -100.0, 100.0),
        vec![ScenarioEvent::alarm(Trigger::Velocity, Comparator::Less, 0.0, "1201")],
    );
    press(&mut gc, "V37N63E P");
    gc.advance(TICK);
    assert!(gc.command_state().priority_lock);
    press(&mut gc, "RSET");
    for _ in 0..50 {
        gc.advance(TICK);
    }
    assert!(!gc.command_state().priority_lock);
    assert_eq!(count(&gc, "ALARM 1201"), 1);
    assert_eq!(gc.events().unfired_count(), 0);
}

#[test]
fn test_events_ignored_while_stopped() {
    let mut gc = loaded(
        initial(0, 500.0, 0.0, 100.0),
        vec![ScenarioEvent::alarm(Trigger::Altitude, Comparator::Less, 1_000.0, "1202")],
    );
    for _ in 0..10 {
        gc.advance(TICK);
    }
    assert!(!gc.command_state().priority_lock);
    assert_eq!(gc.events().unfired_count(), 1);
}

#[test]
fn test_rejected_scenario_leaves_state() {
    let mut gc = loaded(initial(63, 40_000.0, -500.0, 100.0), Vec::new());
    press(&mut gc, "V37N63E P");
    gc.advance(TICK);
    let (flight, display, log_len) = (gc.flight_state(), gc.command_state().clone(), gc.log().len());

    let missing_state = r#"{ "id": "x", "name": "Broken" }"#;
    assert!(gc.load_scenario_json(missing_state, Utc::now()).is_err());
    assert!(gc.load_scenario_json("{", Utc::now()).is_err());
    assert_eq!(gc.flight_state(), flight);
    assert_eq!(gc.command_state(), &display);
    assert_eq!(gc.log().len(), log_len);
    assert_eq!(gc.scenario_id(), Some("test"));
}

#[test]
fn test_load_resets_mission() {
    let mut gc = loaded(initial(0, 100.0, -50.0, 100.0), Vec::new());
    press(&mut gc, "V37N63E P");
    fly_until_stopped(&mut gc);
    assert!(gc.indicators().get(IndicatorName::OprErr));

    let json = r#"{
        "id": "orbit", "name": "Lunar Orbit (Idle)", "description": "Safe orbit. System check.",
        "initialState": { "prog": "00", "verb": "00", "noun": "00", "altitude": 110000, "velocity": 1600, "fuel": 100, "missionTime": 90 }
    }"#;
    let scenario = gc.load_scenario_json(json, Utc::now()).unwrap();
    assert_eq!(scenario.id(), "orbit");
    assert_eq!(gc.scenario_id(), Some("orbit"));
    let flight = gc.flight_state();
    assert_eq!((flight.altitude, flight.velocity, flight.active), (110_000.0, 1_600.0, false));
    assert!(!gc.indicators().get(IndicatorName::OprErr));
    assert!(gc.indicators().get(IndicatorName::Stby));
    assert_eq!(gc.pending(), None);
    assert_eq!(gc.clock().elapsed_secs(), 90);
    let recent: Vec<&str> = gc.log().messages().rev().take(2).collect();
    assert_eq!(recent, ["Safe orbit. System check....", "MISSION LOADED: Lunar Orbit (Idle)"]);
}

#[test]
fn test_system_ready_greeting() {
    let gc = GuidanceComputer::new();
    assert_eq!(gc.log().entries()[0].message, "SYSTEM READY. AWAITING COMMANDS.");
    assert_eq!(gc.log().entries()[0].role, Role::Ground);
}

#[test]
fn test_registers_follow_flight() {
    let mut gc = loaded(initial(63, 40_000.0, -500.0, 100.0), Vec::new());
    press(&mut gc, "V37N63E P");
    gc.advance(TICK);
    let flight = gc.flight_state();
    let expected = crate::dsky::Register::from_signed(flight.velocity);
    assert_eq!(gc.command_state().r1(), &expected);
    assert_eq!(gc.command_state().r2().to_string(), "+00100");
}

#[test]
fn test_flash_directives_and_latched_outcome() {
    let mut gc = loaded(initial(0, 1.0, -1.0, 100.0), Vec::new());
    let directives = gc.take_directives();
    assert!(directives.iter().any(|d| matches!(d, Directive::Flash { indicator: IndicatorName::UplinkActy, .. })));
    gc.clear_indicator(IndicatorName::UplinkActy);
    assert!(!gc.indicators().get(IndicatorName::UplinkActy));

    press(&mut gc, "V37N66E P");
    fly_until_stopped(&mut gc);
    assert!(gc.indicators().get(IndicatorName::UplinkActy));
    // a pending flash expiry must not switch the outcome lamp off
    gc.clear_indicator(IndicatorName::UplinkActy);
    assert!(gc.indicators().get(IndicatorName::UplinkActy));
}

#[test]
fn test_lamp_test_suspends_derivation() {
    let mut gc = loaded(initial(63, 40_000.0, -500.0, 100.0), Vec::new());
    press(&mut gc, "V37N63E P");
    gc.take_directives();
    press(&mut gc, "LAMP");
    gc.advance(TICK);
    assert!(gc.indicators().get(IndicatorName::Restart));
    assert_eq!(gc.command_state().r1().to_string(), "+88888");

    gc.clear_indicator(IndicatorName::CompActy);
    let snapshot = gc
        .take_directives()
        .into_iter()
        .find_map(|d| match d {
            Directive::EndLampTest { snapshot, .. } => Some(snapshot),
            _ => None,
        })
        .unwrap();
    gc.end_lamp_test(snapshot);
    assert!(!gc.indicators().get(IndicatorName::Restart));
    assert!(!gc.indicators().get(IndicatorName::CompActy));
    gc.advance(TICK);
    assert_ne!(gc.command_state().r1().to_string(), "+88888");
    assert!(gc.indicators().get(IndicatorName::Alt));
}

#[test]
fn test_advisory_answer_logged_as_ground() {
    let mut gc = loaded(initial(63, 40_000.0, -500.0, 100.0), Vec::new());
    press(&mut gc, "V06N43E");
    assert!(gc.take_directives().iter().any(|d| matches!(d, Directive::Advise(_))));
    gc.ground_message("MONITOR ALTITUDE WITH V16 N36");
    let last = gc.log().last().unwrap();
    assert_eq!((last.role, last.message.as_str()), (Role::Ground, "MONITOR ALTITUDE WITH V16 N36"));
}

#[test]
fn test_mission_clock() {
    let t0 = Utc::now();
    let mut clock = MissionClock::default();
    assert!(!clock.is_running());
    assert_eq!(clock.to_string(), "00:00:00");
    clock.tick(t0);
    assert_eq!(clock.elapsed_secs(), 0);

    clock.start(t0, 0);
    clock.tick(t0 + TimeDelta::seconds(3_661));
    assert_eq!(clock.to_string(), "01:01:01");
    clock.tick(t0 + TimeDelta::seconds(10));
    assert_eq!(clock.elapsed_secs(), 3_661);

    clock.start(t0, 30);
    clock.tick(t0 + TimeDelta::seconds(5));
    assert_eq!(clock.elapsed_secs(), 35);
}

#[test]
fn test_mission_log_since() {
    let mut log = MissionLog::new();
    log.push(Role::Operator, "RSET");
    log.push(Role::Ground, "PROG CHANGE: P63");
    assert_eq!(log.since(1).len(), 1);
    assert!(log.since(5).is_empty());
    assert!(log.entries()[0].to_string().ends_with("OPERATOR RSET"));
}

#[test]
fn test_events_see_altitude_below_ground() {
    let mut gc = loaded(
        initial(0, 100.0, -50.0, 100.0),
        vec![ScenarioEvent::outcome(Trigger::Altitude, Comparator::Less, 0.0, EventKind::Fail, "LITHOBRAKING")],
    );
    press(&mut gc, "V37N66E P");
    fly_until_stopped(&mut gc);
    assert_eq!(count(&gc, "LITHOBRAKING"), 1);
    assert_eq!(count(&gc, "CRASH"), 0);
    assert_eq!(gc.flight_state().altitude, 0.0);
    assert!(gc.indicators().get(IndicatorName::OprErr));
}

#[test]
fn test_huge_mission_time_saturates() {
    let t0 = Utc::now();
    let mut gc = GuidanceComputer::new();
    let json = r#"{
        "id": "late", "name": "Late Start",
        "initialState": { "altitude": 1000, "velocity": 0, "fuel": 50, "missionTime": 18446744073709551615 }
    }"#;
    gc.load_scenario_json(json, t0).unwrap();
    gc.tick_clock(t0 + TimeDelta::seconds(2));
    assert_eq!(gc.clock().elapsed_secs(), u64::MAX);
    assert!(!gc.clock().to_string().is_empty());
}

/// Ticks until the priority display comes up or the flight ends.
fn fly_until_locked(gc: &mut GuidanceComputer) {
    for _ in 0..MAX_TICKS {
        if gc.command_state().priority_lock || !gc.flight_state().active {
            break;
        }
        gc.advance(TICK);
    }
}

#[test]
fn test_exec_overflow_alarm_on_fast_low_descent() {
    let mut gc = loaded(initial(0, 3_500.0, -100.0, 100.0), Vec::new());
    press(&mut gc, "V37N66E P");
    fly_until_locked(&mut gc);

    let flight = gc.flight_state();
    assert!(flight.altitude < GuidanceComputer::EXEC_OVERFLOW_ALTITUDE);
    assert!(flight.velocity < GuidanceComputer::EXEC_OVERFLOW_VELOCITY);
    assert!(gc.command_state().priority_lock);
    assert_eq!(gc.command_state().alarm_code.as_deref(), Some("01202"));
    assert_eq!(gc.command_state().r1().to_string(), "01202");
    assert!(gc.indicators().get(IndicatorName::Prog));

    // still inside the envelope after RSET, so the alarm does not come back
    press(&mut gc, "RSET");
    fly_until_stopped(&mut gc);
    assert_eq!(count(&gc, "ALARM 1202 DETECTED. EXEC OVERFLOW."), 1);
    assert_eq!(count(&gc, "CRASH"), 1);
}

#[test]
fn test_exec_overflow_waits_for_displayed_alarm() {
    let mut gc = loaded(
        initial(0, 3_500.0, -100.0, 100.0),
        vec![ScenarioEvent::alarm(Trigger::Altitude, Comparator::Less, 3_200.0, "1201")],
    );
    press(&mut gc, "V37N66E P");
    fly_until_locked(&mut gc);
    assert_eq!(gc.command_state().alarm_code.as_deref(), Some("1201"));

    while gc.flight_state().altitude >= GuidanceComputer::EXEC_OVERFLOW_ALTITUDE {
        gc.advance(TICK);
    }
    gc.advance(TICK);
    assert_eq!(gc.command_state().alarm_code.as_deref(), Some("1201"));
    assert_eq!(count(&gc, "ALARM 1202"), 0);

    press(&mut gc, "RSET");
    gc.advance(TICK);
    assert_eq!(gc.command_state().alarm_code.as_deref(), Some("01202"));
    assert_eq!(count(&gc, "ALARM 1202 DETECTED. EXEC OVERFLOW."), 1);
}

#[test]
fn test_slow_low_descent_raises_no_alarm() {
    let mut gc = loaded(initial(0, 2_000.0, -40.0, 100.0), Vec::new());
    press(&mut gc, "V37N63E P");
    for _ in 0..20 {
        gc.advance(TICK);
    }
    assert!(!gc.command_state().priority_lock);
    assert_eq!(count(&gc, "ALARM"), 0);
}
