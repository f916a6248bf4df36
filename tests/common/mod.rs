#![allow(dead_code)]

pub mod synthetic_event;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn assert_close(actual: f64, expected: f64, tol: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{what}: expected {expected:.6}, got {actual:.6} (tol {tol})"
    );
}
