//! End-to-end behaviour checks against small hand-built worlds

use hashbrown::HashSet;

use critter_core::ai::{move_creature, move_to, plan, resume_deferred};
use critter_core::creature::{Effect, MoverFlags, PendingAction};
use critter_core::light::{LightEnvironment, LightSource};
use critter_core::map::{DistanceMode, Terrain};
use critter_core::pathfind::PathSettings;
use critter_core::{Creature, EngineOptions, Map, Simulation, Tripoint, World, WorldEvent};

fn world_from(rows: &[&str], seed: u64) -> World {
    let mut world = World::new(
        Map::from_ascii(rows),
        EngineOptions {
            seed: Some(seed),
            ..EngineOptions::default()
        },
    );
    world.rebuild_caches();
    world
}

#[test]
fn test_flier_crosses_deep_water_without_drowning() {
    let mut world = world_from(&["######", "#.~~.#", "######"], 1);
    let bat = Creature::new("bat", Tripoint::new(1, 1, 0)).with_flags(MoverFlags::FLIES);
    let bat = world.spawn(bat).unwrap();
    world.creatures.get_mut(bat).unwrap().moves = 300;

    assert!(move_to(&mut world, bat, Tripoint::new(2, 1, 0), false));
    assert!(move_to(&mut world, bat, Tripoint::new(3, 1, 0), false));

    let c = world.creatures.get(bat).unwrap();
    assert!(c.is_alive());
    assert_eq!(c.pos, Tripoint::new(3, 1, 0));
    assert!(!c.underwater);
    assert!(!world.events.iter().any(|e| matches!(e, WorldEvent::Drowned { .. })));
}

#[test]
fn test_point_light_falls_off_toward_corner() {
    let mut map = Map::new(1, 1, 0, 0);
    map.fill_level(0, Terrain::Floor);
    let center = Tripoint::new(5, 5, 0);
    let env = LightEnvironment {
        natural_light: 0.0,
        sources: vec![LightSource::new(center, 10.0)],
        mode: DistanceMode::Roguelike,
    };
    map.generate_lightmap(0, &env);

    assert_eq!(map.light_at(center), 10.0);
    let corner = map.light_at(Tripoint::new(7, 7, 0));
    assert!(corner > 0.0 && corner < 10.0, "corner light {corner}");
}

#[test]
fn test_adjacent_hostile_gets_attacked_not_walked_to() {
    let mut sim = Simulation::new(world_from(&["#######", "#.....#", "#######"], 3));
    let you = sim.world.spawn(Creature::avatar(Tripoint::new(2, 1, 0))).unwrap();
    let z = sim.world.spawn(Creature::new("zombie", Tripoint::new(3, 1, 0))).unwrap();
    sim.tick();

    let events: Vec<_> = sim.world.events.iter().collect();
    assert!(events.iter().any(|e| matches!(
        e,
        WorldEvent::Attacked { attacker, target, .. } if *attacker == z && *target == you
    )));
    assert!(!events.iter().any(|e| matches!(e, WorldEvent::Moved { id, .. } if *id == z)));
    assert_eq!(sim.world.creatures.get(z).unwrap().pos, Tripoint::new(3, 1, 0));
}

#[test]
fn test_route_into_adjacent_wall_is_empty() {
    let map = Map::from_ascii(&["#####", "#.#.#", "#####"]);
    let settings = PathSettings {
        bash_strength: 0,
        ..PathSettings::default()
    };
    let start = Tripoint::new(1, 1, 0);
    let path = map.route(start, Tripoint::new(2, 1, 0), &settings, &HashSet::new());
    assert!(path.is_empty());
}

#[test]
fn test_drag_cleared_once_victim_is_free() {
    let mut world = world_from(&["########", "#......#", "########"], 5);
    let victim = world.spawn(Creature::avatar(Tripoint::new(2, 1, 0))).unwrap();
    let mut brute = Creature::new("brute", Tripoint::new(3, 1, 0));
    brute.goal = Some(Tripoint::new(6, 1, 0));
    brute.moves = 100;
    brute.pending = Some(PendingAction::Dragging { victim });
    brute.add_effect(Effect::Dragging, 5);
    brute.add_effect(Effect::Grabbing, 5);
    let brute = world.spawn(brute).unwrap();

    // Never grabbed, so there is nothing to haul
    assert!(!resume_deferred(&mut world, brute));
    let c = world.creatures.get(brute).unwrap();
    assert_eq!(c.pending, None);
    assert!(!c.has_effect(Effect::Dragging));
    assert!(!world.events.iter().any(|e| matches!(e, WorldEvent::Dragged { .. })));
    assert_eq!(world.creatures.get(victim).unwrap().pos, Tripoint::new(2, 1, 0));

    // The next round is an ordinary one
    plan(&mut world, brute);
    move_creature(&mut world, brute);
    assert!(world.creatures.get(brute).unwrap().pending.is_none());
}

#[test]
fn test_creature_state_survives_json() {
    let mut c = Creature::new("zombie", Tripoint::new(4, 2, 0)).with_special("bite");
    c.path.extend([Tripoint::new(5, 2, 0), Tripoint::new(6, 2, 0)]);
    c.anger = 40;
    c.morale = -5;
    c.fear = 3;
    c.specials[0].cooldown = 2;
    c.add_effect(Effect::Stunned, 2);

    let json = serde_json::to_string(&c).unwrap();
    let back: Creature = serde_json::from_str(&json).unwrap();
    assert_eq!(back.pos, c.pos);
    assert_eq!(back.path, c.path);
    assert_eq!(back.target, c.target);
    assert_eq!(back.specials, c.specials);
    assert_eq!((back.anger, back.morale, back.fear), (40, -5, 3));
    assert!(back.has_effect(Effect::Stunned));
}
