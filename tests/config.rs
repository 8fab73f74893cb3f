use garden_engine::config::{CritterConfig, GardenConfig, GroundConfig, RainConfig};
use garden_engine::error::GardenError;
use garden_engine::sim::CritterSwarm;
use garden_engine::world::Viewport;

#[test]
fn partial_json_overrides_only_named_keys() {
    let config = GardenConfig::from_json(
        r#"{ "critters": { "count": 3, "scare_radius": 120 }, "ground": { "capacity": 20 } }"#,
    )
    .unwrap();

    assert_eq!(config.critters.count, 3);
    assert_eq!(config.critters.scare_radius, 120.0);
    assert_eq!(config.critters.max_speed, CritterConfig::default().max_speed);
    assert_eq!(config.ground.capacity, 20);
    assert_eq!(config.ground.friction, GroundConfig::default().friction);
    assert_eq!(config.rain, RainConfig::default());
}

#[test]
fn empty_object_is_the_default() {
    assert_eq!(GardenConfig::from_json("{}").unwrap(), GardenConfig::default());
}

#[test]
fn malformed_json_is_a_config_error() {
    let err = GardenConfig::from_json(r#"{ "critters": { "count": "many" } }"#).unwrap_err();
    assert!(matches!(err, GardenError::Config(_)));
    assert!(GardenConfig::from_json("not json").is_err());
}

#[test]
fn nonsense_values_rejected() {
    let err = GardenConfig::from_json(r#"{ "ground": { "capacity": 0 } }"#).unwrap_err();
    assert!(matches!(err, GardenError::InvalidValue { field: "ground.capacity", .. }));

    let err = GardenConfig::from_json(r#"{ "critters": { "max_speed": -1 } }"#).unwrap_err();
    assert!(err.to_string().contains("critters.max_speed"));
}

#[test]
fn configured_count_sizes_the_pool() {
    let config = GardenConfig::from_json(r#"{ "critters": { "count": 4 } }"#).unwrap();
    let mut swarm = CritterSwarm::new(Viewport::new(640.0, 480.0), config.critters, 9);
    swarm.set_mode(false);
    assert_eq!(swarm.critters().len(), 4);
}
