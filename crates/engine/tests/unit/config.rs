//! Configuration parsing tests.

use alvm_core::Config;

#[test]
fn defaults_are_sane() {
    let config = Config::default();
    assert_eq!(config.memory.order, 16);
    assert!(config.evolver.seed.is_none());
}

#[test]
fn json_overrides_the_order() {
    let config = Config::from_json(r#"{"memory": {"order": 12}}"#).unwrap();
    assert_eq!(config.memory.order, 12);
    assert!(config.evolver.seed.is_none());
}

#[test]
fn json_supplies_an_explicit_seed() {
    let config =
        Config::from_json(r#"{"evolver": {"seed": [1, 2, 3, 4]}}"#).unwrap();
    assert_eq!(config.evolver.seed, Some([1, 2, 3, 4]));
    assert_eq!(config.memory.order, 16, "unrelated sections keep defaults");
}

#[test]
fn empty_object_is_the_default_config() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config.memory.order, 16);
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(Config::from_json(r#"{"memroy": {"order": 12}}"#).is_err());
    assert!(Config::from_json(r#"{"memory": {"size": 4096}}"#).is_err());
}

#[test]
#[should_panic(expected = "exceeds maximum")]
fn out_of_range_order_panics() {
    let _ = Config::from_json(r#"{"memory": {"order": 40}}"#);
}
