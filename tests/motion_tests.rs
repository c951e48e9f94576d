//! Vehicle motion against fixed signal states

use intersection_sim::simulation::{
    advance, Approach, MotionParams, Phase, Priority, SignalGroup, SimError, SimId, Vehicle,
    VehicleId, VehicleState,
};

const PARAMS: MotionParams = MotionParams {
    stop_line_offset: 20.0,
    deceleration_factor: 0.6,
};

fn vehicle_at(approach: Approach, priority: Priority, distance: f32) -> Vehicle {
    Vehicle::new(
        VehicleId(SimId(0)),
        approach,
        priority,
        approach.position_at(-distance, 10.0),
        10.0,
        0.0,
    )
}

/// All four groups showing `phase`
fn signals_all(phase: Phase) -> [SignalGroup; 4] {
    Approach::ALL.map(|approach| SignalGroup {
        approach,
        phase,
        remaining: 0.0,
    })
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_red_holds_vehicle_behind_stop_line() {
    let red = signals_all(Phase::Red);
    for approach in Approach::ALL {
        let vehicle = vehicle_at(approach, Priority::Normal, 21.0);
        let next = advance(&vehicle, &red, &PARAMS, 1.0).unwrap();
        assert_eq!(next.position, vehicle.position, "approach {}", approach);
        assert_eq!(next.state(), VehicleState::Approaching);
    }
}

#[test]
fn test_red_does_not_stop_vehicle_past_stop_line() {
    let red = signals_all(Phase::Red);
    for approach in Approach::ALL {
        let vehicle = vehicle_at(approach, Priority::Normal, 19.0);
        let next = advance(&vehicle, &red, &PARAMS, 1.0).unwrap();
        assert_close(next.progress(), -9.0);
    }
}

#[test]
fn test_green_advances_at_nominal_speed() {
    let green = signals_all(Phase::Green);
    for approach in Approach::ALL {
        let vehicle = vehicle_at(approach, Priority::Normal, 60.0);
        let next = advance(&vehicle, &green, &PARAMS, 0.5).unwrap();
        assert_close(next.progress(), -55.0);
    }
}

#[test]
fn test_yellow_slows_vehicle_behind_stop_line() {
    let yellow = signals_all(Phase::Yellow);
    for approach in Approach::ALL {
        let vehicle = vehicle_at(approach, Priority::Normal, 60.0);
        let next = advance(&vehicle, &yellow, &PARAMS, 1.0).unwrap();
        assert_close(next.progress(), -54.0);
    }

    // Past the stop line a yellow light no longer slows the vehicle
    let vehicle = vehicle_at(Approach::South, Priority::Normal, 15.0);
    let next = advance(&vehicle, &yellow, &PARAMS, 1.0).unwrap();
    assert_close(next.progress(), -5.0);
}

#[test]
fn test_emergency_ignores_red() {
    let red = signals_all(Phase::Red);
    let vehicle = vehicle_at(Approach::East, Priority::Emergency, 60.0);
    let next = advance(&vehicle, &red, &PARAMS, 1.0).unwrap();
    assert_close(next.progress(), -50.0);
}

#[test]
fn test_crossed_vehicle_ignores_red() {
    let red = signals_all(Phase::Red);
    let mut vehicle = vehicle_at(Approach::West, Priority::Normal, -5.0);
    vehicle.mark_crossed();

    let next = advance(&vehicle, &red, &PARAMS, 1.0).unwrap();
    assert_close(next.progress(), 15.0);
    assert!(next.has_crossed());
}

#[test]
fn test_crossing_marked_on_tick_that_passes_center() {
    let green = signals_all(Phase::Green);
    let vehicle = vehicle_at(Approach::North, Priority::Normal, 4.0);

    let next = advance(&vehicle, &green, &PARAMS, 0.5).unwrap();
    assert!(next.has_crossed());
    assert_close(next.progress(), 1.0);

    // Landing exactly on the centre is not yet a crossing
    let vehicle = vehicle_at(Approach::North, Priority::Normal, 5.0);
    let next = advance(&vehicle, &green, &PARAMS, 0.5).unwrap();
    assert!(!next.has_crossed());
}

#[test]
fn test_vehicle_already_past_center_is_marked_crossed() {
    let red = signals_all(Phase::Red);
    let vehicle = vehicle_at(Approach::East, Priority::Normal, -2.0);
    assert_eq!(vehicle.state(), VehicleState::Approaching);

    let next = advance(&vehicle, &red, &PARAMS, 1.0).unwrap();
    assert!(next.has_crossed());
    assert_close(next.progress(), 12.0);
}

#[test]
fn test_emergency_vehicle_crossing_is_recorded() {
    let red = signals_all(Phase::Red);
    let vehicle = vehicle_at(Approach::South, Priority::Emergency, 3.0);
    let next = advance(&vehicle, &red, &PARAMS, 1.0).unwrap();
    assert!(next.has_crossed());
}

#[test]
fn test_missing_signal_group_fails_loudly() {
    let vehicle = vehicle_at(Approach::West, Priority::Normal, 60.0);

    let err = advance(&vehicle, &[], &PARAMS, 1.0).unwrap_err();
    assert!(matches!(err, SimError::MissingSignalGroup(Approach::West)));

    let partial = [SignalGroup::new(Approach::North), SignalGroup::new(Approach::East)];
    let err = advance(&vehicle, &partial, &PARAMS, 1.0).unwrap_err();
    assert!(matches!(err, SimError::MissingSignalGroup(Approach::West)));
}

#[test]
fn test_stop_line_predicate_is_symmetric() {
    for approach in Approach::ALL {
        let behind = vehicle_at(approach, Priority::Normal, 20.5);
        let at_line = vehicle_at(approach, Priority::Normal, 20.0);
        let inside = vehicle_at(approach, Priority::Normal, 10.0);

        assert!(behind.is_behind_stop_line(20.0), "approach {}", approach);
        assert!(!at_line.is_behind_stop_line(20.0), "approach {}", approach);
        assert!(!inside.is_behind_stop_line(20.0), "approach {}", approach);
        assert_close(behind.progress(), -20.5);
    }
}

#[test]
fn test_spawn_positions_follow_direction_table() {
    let north = Approach::North.position_at(-60.0, 10.0);
    let south = Approach::South.position_at(-60.0, 10.0);
    let east = Approach::East.position_at(-60.0, 10.0);
    let west = Approach::West.position_at(-60.0, 10.0);

    assert_eq!((north.x, north.y), (-10.0, -60.0));
    assert_eq!((south.x, south.y), (10.0, 60.0));
    assert_eq!((east.x, east.y), (60.0, -10.0));
    assert_eq!((west.x, west.y), (-60.0, 10.0));
}
