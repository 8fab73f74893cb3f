use garden_engine::assets::{AssetCatalog, Category};
use garden_engine::config::{GroundConfig, RainConfig};
use garden_engine::input::PointerState;
use garden_engine::render::InstanceEncoder;
use garden_engine::sim::{RainState, RainSystem};
use garden_engine::world::Viewport;

const H: f32 = 600.0;

fn loaded(categories: &[Category]) -> AssetCatalog {
    let mut catalog = AssetCatalog::new();
    for &category in categories {
        for i in 0..4 {
            let id = catalog.push(category, format!("{category}/img ({i}).png"));
            catalog.mark_loaded(id);
        }
    }
    catalog
}

fn raining() -> RainSystem {
    let mut rain = RainSystem::new(
        Viewport::new(800.0, H),
        RainConfig::default(),
        GroundConfig::default(),
        loaded(&Category::ALL),
        17,
    );
    assert!(rain.start());
    rain.tick(0.0, &PointerState::default());
    rain
}

#[test]
fn landing_hands_off_to_ground() {
    let mut rain = raining();
    assert_eq!(rain.falling().len(), 1);
    {
        let p = &mut rain.falling_mut().as_mut_slice()[0];
        p.y = H - 35.0;
        p.speed = 3.0;
        p.floor_jitter = 0.0;
    }

    rain.tick_fall();

    assert_eq!(rain.ground().len(), 1);
    let g = rain.ground().particles().next().unwrap();
    assert_eq!(g.life, 1.0);
    assert_eq!(g.vy, 0.0);
    // replacement spawned at the top
    assert_eq!(rain.falling().len(), 1);
    assert_eq!(rain.falling().as_slice()[0].y, RainConfig::default().spawn_y);
}

#[test]
fn ground_pool_never_exceeds_capacity() {
    let mut rain = raining();
    for _ in 0..400 {
        for p in rain.falling_mut().as_mut_slice() {
            p.y = H;
        }
        rain.tick_fall();
        assert!(rain.ground().len() <= 150);
    }
    assert_eq!(rain.ground().len(), 150);
}

#[test]
fn everything_lands_eventually() {
    let mut rain = raining();
    let pointer = PointerState::default();
    for _ in 0..2000 {
        rain.tick(16.0, &pointer);
    }
    assert!(!rain.ground().is_empty());
    for p in rain.falling().as_slice() {
        assert!(p.y <= p.floor_level(rain.viewport(), rain.config()));
    }
}

#[test]
fn stop_then_idle_parks_both_loops() {
    let mut rain = raining();
    let pointer = PointerState::default();
    for _ in 0..600 {
        rain.tick(16.0, &pointer);
    }
    rain.stop();
    assert!(!rain.is_active());

    // decay is at least 0.001 per frame
    for _ in 0..1200 {
        rain.tick(16.0, &pointer);
    }
    assert!(rain.falling().is_empty());
    assert!(rain.ground().is_empty());
    assert!(!rain.is_falling());
    assert!(!rain.is_ground_running());
}

#[test]
fn ground_survives_stop_until_cleared() {
    let mut rain = raining();
    for p in rain.falling_mut().as_mut_slice() {
        p.y = H;
    }
    rain.tick_fall();
    rain.stop();
    rain.tick(16.0, &PointerState::default());
    assert_eq!(rain.ground().len(), 1);

    rain.clear_ground();
    assert!(rain.ground().is_empty());
    assert!(rain.ground().surface().is_empty());
}

#[test]
fn state_tracks_switches() {
    let mut rain = RainSystem::new(
        Viewport::new(800.0, H),
        RainConfig::default(),
        GroundConfig::default(),
        loaded(&Category::ALL),
        3,
    );
    assert_eq!(rain.state(), RainState::default());

    rain.set_active_modes(&[Category::Core, Category::BeLike]);
    assert!(rain.toggle());
    assert_eq!(rain.state(), RainState { is_active: true, modes: vec![Category::Core, Category::BeLike] });

    let saved = serde_json::to_string(&rain.state()).unwrap();
    assert!(!rain.toggle());
    assert!(!rain.state().is_active);

    let mut other = RainSystem::new(
        Viewport::new(800.0, H),
        RainConfig::default(),
        GroundConfig::default(),
        loaded(&Category::ALL),
        4,
    );
    let state: RainState = serde_json::from_str(&saved).unwrap();
    assert!(other.restore(&state));
    assert!(other.start());
    assert_eq!(other.state(), state);
}

#[test]
fn restore_all_categories_is_the_combo() {
    let mut rain = raining();
    let all = RainState { is_active: false, modes: Category::ALL.to_vec() };
    assert!(!rain.restore(&all));
    assert_eq!(rain.categories().len(), 3);
}

#[test]
fn only_active_categories_fall() {
    let mut rain = RainSystem::new(
        Viewport::new(800.0, H),
        RainConfig::default(),
        GroundConfig::default(),
        loaded(&Category::ALL),
        5,
    );
    rain.set_active_modes(&[Category::Core]);
    rain.start();
    rain.tick(5000.0, &PointerState::default());
    assert_eq!(rain.falling().len(), 30);
    for p in rain.falling().as_slice() {
        let asset = rain.catalog().get(p.asset).unwrap();
        assert_eq!(asset.category, Category::Core);
    }
}

#[test]
fn snapshot_holds_ground_and_flight() {
    let mut rain = raining();
    {
        let p = &mut rain.falling_mut().as_mut_slice()[0];
        p.y = H;
    }
    rain.tick_fall();
    let mut out = InstanceEncoder::new();
    rain.draw_into(&mut out);
    assert_eq!(out.count(), rain.ground().len() + rain.falling().len());
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn raster_snapshot_shows_the_pile() {
    use garden_engine::render::RasterSurface;

    let mut rain = raining();
    for p in rain.falling_mut().as_mut_slice() {
        p.x = 400.0;
        p.sway = 0.0;
        p.y = H;
    }
    rain.tick_fall();
    let g = *rain.ground().particles().next().unwrap();

    let mut surface = RasterSurface::new(800, H as u32);
    rain.draw_into(&mut surface);
    assert!(surface.image().get_pixel(g.x as u32, g.y as u32)[3] > 0);
}
