//! Property tests over randomly generated rooms

use hashbrown::HashSet;
use proptest::prelude::*;

use critter_core::ai::{move_creature, plan};
use critter_core::creature::{MoverFlags, SpecialSlot};
use critter_core::light::{LightEnvironment, LightSource, SeenOptions};
use critter_core::map::{DistanceMode, Furniture, Terrain, square_dist};
use critter_core::pathfind::PathSettings;
use critter_core::{Creature, EngineOptions, Map, Tripoint, World};

const SIZE: i32 = 10;

/// A walled 10x10 room with the given interior tiles turned to wall
fn room(walls: &[(i32, i32)]) -> Map {
    let mut map = Map::new(1, 1, 0, 0);
    map.fill_level(0, Terrain::Wall);
    map.fill_rect(Tripoint::new(1, 1, 0), Tripoint::new(SIZE - 2, SIZE - 2, 0), Terrain::Floor);
    for &(x, y) in walls {
        map.set_ter(Tripoint::new(x, y, 0), Terrain::Wall);
    }
    map.build_map_cache();
    map
}

fn interior() -> impl Strategy<Value = (i32, i32)> {
    (1..SIZE - 1, 1..SIZE - 1)
}

fn walls() -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec(interior(), 0..20)
}

fn mode() -> impl Strategy<Value = DistanceMode> {
    prop_oneof![Just(DistanceMode::Roguelike), Just(DistanceMode::Trigonometric)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_sight_is_symmetric(walls in walls(), a in interior(), b in interior(), range in 1..20i32) {
        let map = room(&walls);
        let a = Tripoint::new(a.0, a.1, 0);
        let b = Tripoint::new(b.0, b.1, 0);
        prop_assert_eq!(map.sees(a, b, range), map.sees(b, a, range));
    }

    #[test]
    fn test_seen_cache_is_symmetric(walls in walls(), a in interior(), b in interior(), mode in mode()) {
        let mut map = room(&walls);
        let a = Tripoint::new(a.0, a.1, 0);
        let b = Tripoint::new(b.0, b.1, 0);
        map.set_ter(a, Terrain::Floor);
        map.set_ter(b, Terrain::Floor);
        map.build_map_cache();
        let opts = SeenOptions { mode, ..SeenOptions::default() };

        map.build_seen_cache(a, &opts);
        let a_sees_b = map.is_seen(b);
        map.build_seen_cache(b, &opts);
        prop_assert_eq!(a_sees_b, map.is_seen(a));
    }

    #[test]
    fn test_new_wall_never_brightens(
        walls in walls(),
        lamp in interior(),
        target in interior(),
        blocker in interior(),
        mode in mode(),
    ) {
        prop_assume!(blocker != lamp && blocker != target);
        let mut map = room(&walls);
        let lamp = Tripoint::new(lamp.0, lamp.1, 0);
        let target = Tripoint::new(target.0, target.1, 0);
        map.set_ter(lamp, Terrain::Floor);
        map.set_furn(lamp, Furniture::Lamp);

        let env = LightEnvironment { mode, ..LightEnvironment::default() };
        map.generate_lightmap(0, &env);
        let before = map.light_at(target);

        map.set_ter(Tripoint::new(blocker.0, blocker.1, 0), Terrain::Wall);
        map.generate_lightmap(0, &env);
        let after = map.light_at(target);
        prop_assert!(after <= before + 1e-4, "light rose from {} to {}", before, after);
    }

    #[test]
    fn test_far_wall_never_brightens_wide_floor(blocker in (1..47i32, 1..47i32), mode in mode()) {
        let blocker = Tripoint::new(blocker.0, blocker.1, 0);
        let lamp = Tripoint::new(24, 24, 0);
        let target = Tripoint::new(36, 24, 0);
        prop_assume!(blocker != lamp && blocker != target);
        let mut map = Map::new(4, 4, 0, 0);
        map.fill_level(0, Terrain::Floor);
        let env = LightEnvironment {
            natural_light: 0.0,
            sources: vec![LightSource::new(lamp, 100.0)],
            mode,
        };
        map.generate_lightmap(0, &env);
        let before = map.light_at(target);
        prop_assert!(before > 0.0);

        map.set_ter(blocker, Terrain::Wall);
        map.generate_lightmap(0, &env);
        let after = map.light_at(target);
        prop_assert!(after <= before + 1e-4, "light rose from {} to {}", before, after);
    }

    #[test]
    fn test_routes_are_contiguous(walls in walls(), start in interior(), goal in interior()) {
        let mut map = room(&walls);
        let start = Tripoint::new(start.0, start.1, 0);
        let goal = Tripoint::new(goal.0, goal.1, 0);
        map.set_ter(start, Terrain::Floor);
        let path = map.route(start, goal, &PathSettings::default(), &HashSet::new());
        if let Some(&last) = path.last() {
            prop_assert_eq!(last, goal);
            prop_assert_ne!(path[0], start);
            let mut prev = start;
            for &p in &path {
                prop_assert_eq!(square_dist(prev, p), 1);
                prop_assert!(map.passable(p));
                prev = p;
            }
        }
    }

    #[test]
    fn test_cooldowns_count_down_to_zero(start in prop::collection::vec(0..10i32, 1..5), turns in 0..15i32) {
        let mut c = Creature::new("wolf", Tripoint::ZERO);
        c.specials = start
            .iter()
            .enumerate()
            .map(|(i, &cooldown)| SpecialSlot { cooldown, ..SpecialSlot::new(format!("a{i}")) })
            .collect();
        for _ in 0..turns {
            c.tick_cooldowns();
        }
        for (slot, &initial) in c.specials.iter().zip(&start) {
            prop_assert!(slot.cooldown >= 0);
            prop_assert_eq!(slot.cooldown, (initial - turns).max(0));
        }
    }

    #[test]
    fn test_moves_only_go_down_within_a_turn(
        seed in any::<u64>(),
        walls in walls(),
        spot in interior(),
        speed in 50..300i32,
        stumbles in any::<bool>(),
    ) {
        let avatar = Tripoint::new(1, 1, 0);
        let spot = Tripoint::new(spot.0, spot.1, 0);
        prop_assume!(spot != avatar);
        let mut map = room(&walls);
        map.set_ter(avatar, Terrain::Floor);
        map.set_ter(spot, Terrain::Floor);
        let mut world = World::new(map, EngineOptions { seed: Some(seed), ..EngineOptions::default() });
        world.spawn(Creature::avatar(avatar)).unwrap();
        let mut z = Creature::new("zombie", spot);
        if stumbles {
            z = z.with_flags(MoverFlags::STUMBLES);
        }
        z.speed = speed;
        z.moves = speed;
        let z = world.spawn(z).unwrap();
        world.rebuild_caches();

        let mut last = speed;
        for _ in 0..world.options.max_actions_per_turn {
            if last <= 0 {
                break;
            }
            plan(&mut world, z);
            move_creature(&mut world, z);
            let now = world.creatures.get(z).map_or(0, |c| c.moves);
            prop_assert!(now <= last, "moves rose from {} to {}", last, now);
            last = now;
        }
    }
}
