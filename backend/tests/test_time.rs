//! Tests for TimeManager

use stockflow_core_rs::TimeManager;

#[test]
fn test_time_manager_new() {
    let time = TimeManager::new(4);
    assert_eq!(time.current_period(), 0);
    assert_eq!(time.current_year(), 0);
    assert_eq!(time.periods_per_year(), 4);
}

#[test]
fn test_year_boundary() {
    let mut time = TimeManager::new(4); // quarterly

    for _ in 0..3 {
        time.advance_period();
    }
    assert_eq!(time.current_period(), 3);
    assert_eq!(time.current_year(), 0);
    assert!(time.is_end_of_year());

    // Cross into year 1
    time.advance_period();
    assert_eq!(time.current_year(), 1);
    assert_eq!(time.period_within_year(), 0);
    assert!(!time.is_end_of_year());
}

#[test]
fn test_single_period_years() {
    let mut time = TimeManager::new(1);
    assert!(time.is_end_of_year());
    time.advance_period();
    assert!(time.is_end_of_year());
    assert_eq!(time.current_year(), 1);
}

#[test]
fn test_period_within_year() {
    let time = TimeManager::at_period(12, 30);
    assert_eq!(time.current_year(), 2);
    assert_eq!(time.period_within_year(), 6);
}
