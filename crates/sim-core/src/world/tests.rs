use super::*;
use crate::entity::Portal;
use contracts::PropValue;
use contracts::TickRule;

fn small_world() -> (World, EntityId, EntityId, EntityId) {
    let mut world = World::new("cellar");
    let shelf = world.spawn_in(world.root(), "shelf").expect("spawn shelf");
    let crate_id = world.spawn_in(world.root(), "crate").expect("spawn crate");
    let bottle = world.spawn_in(shelf, "bottle").expect("spawn bottle");
    (world, shelf, crate_id, bottle)
}

#[test]
fn attach_sets_bidirectional_links() {
    let (world, shelf, _, bottle) = small_world();
    assert_eq!(world.entity(bottle).expect("bottle").parent, Some(shelf));
    assert!(world.entity(shelf).expect("shelf").children.contains(&bottle));
}

#[test]
fn attach_moves_entity_between_containers() {
    let (mut world, shelf, crate_id, bottle) = small_world();
    world.attach(crate_id, bottle).expect("reattach");
    assert_eq!(world.entity(bottle).expect("bottle").parent, Some(crate_id));
    assert!(!world.entity(shelf).expect("shelf").children.contains(&bottle));
    assert!(world
        .entity(crate_id)
        .expect("crate")
        .children
        .contains(&bottle));
}

#[test]
fn detach_non_child_errors_and_mutates_nothing() {
    let (mut world, shelf, crate_id, bottle) = small_world();
    let before = world.clone();
    let err = world
        .detach(crate_id, bottle)
        .expect_err("bottle is not in the crate");
    assert_eq!(
        err,
        WorldError::NotAChild {
            parent: crate_id,
            child: bottle
        }
    );
    assert_eq!(world, before);
    assert_eq!(world.entity(bottle).expect("bottle").parent, Some(shelf));
}

#[test]
fn detach_self_is_noop_for_roots() {
    let (mut world, _, _, bottle) = small_world();
    let root = world.root();
    world.detach_self(root).expect("root detach is a no-op");
    world.detach_self(bottle).expect("bottle detaches");
    assert_eq!(world.entity(bottle).expect("bottle").parent, None);
    world.detach_self(bottle).expect("second call is a no-op");
}

#[test]
fn attach_rejects_self_and_descendant_cycles() {
    let (mut world, shelf, _, bottle) = small_world();
    assert!(matches!(
        world.attach(shelf, shelf),
        Err(WorldError::CycleRejected { .. })
    ));
    assert!(matches!(
        world.attach(bottle, shelf),
        Err(WorldError::CycleRejected { .. })
    ));
}

#[test]
fn descendants_are_preorder_depth_first() {
    let (mut world, shelf, crate_id, bottle) = small_world();
    let cork = world.spawn_in(bottle, "cork").expect("spawn cork");
    let ordered = world.descendants(world.root());
    assert_eq!(ordered, vec![shelf, bottle, cork, crate_id]);
}

#[test]
fn find_by_name_is_direct_children_only_and_keeps_ambiguity() {
    let mut world = World::new("vault");
    let first_coin = world.spawn_in(world.root(), "coin").expect("spawn");
    let pouch = world.spawn_in(world.root(), "pouch").expect("spawn");
    let second_coin = world.spawn_in(world.root(), "coin").expect("spawn");
    let nested_coin = world.spawn_in(pouch, "coin").expect("spawn");

    let matches = world.find_by_name(world.root(), "coin");
    assert_eq!(matches, vec![first_coin, second_coin]);
    assert_eq!(world.find_by_name(pouch, "coin"), vec![nested_coin]);
    assert!(world.find_by_name(world.root(), "ingot").is_empty());
}

#[test]
fn first_by_name_picks_preorder_first_match() {
    let mut world = World::new("vault");
    let pouch = world.spawn_in(world.root(), "pouch").expect("spawn");
    let nested_coin = world.spawn_in(pouch, "coin").expect("spawn");
    world.spawn_in(world.root(), "coin").expect("spawn");
    assert_eq!(world.first_by_name("coin"), Some(nested_coin));
    assert_eq!(world.first_by_name("vault"), Some(world.root()));
    assert_eq!(world.first_by_name("ghost"), None);
}

#[test]
fn tick_all_applies_each_rule_exactly_once() {
    let (mut world, _, _, bottle) = small_world();
    {
        let entity = world.entity_mut(bottle).expect("bottle");
        entity.set_property("fill", 10_i64);
        entity.tick_rules.push(TickRule::Adjust {
            key: "fill".to_string(),
            delta: -1.0,
            min: Some(0.0),
            max: None,
        });
    }
    world.tick_all();
    assert_eq!(
        world.entity(bottle).expect("bottle").get_property("fill"),
        Some(&PropValue::Int(9))
    );
}

#[test]
fn detached_entities_do_not_tick() {
    let (mut world, _, _, bottle) = small_world();
    {
        let entity = world.entity_mut(bottle).expect("bottle");
        entity.set_property("fill", 10_i64);
        entity.tick_rules.push(TickRule::Adjust {
            key: "fill".to_string(),
            delta: -1.0,
            min: Some(0.0),
            max: None,
        });
    }
    world.detach_self(bottle).expect("detach");
    world.tick_all();
    assert_eq!(
        world.entity(bottle).expect("bottle").get_property("fill"),
        Some(&PropValue::Int(10))
    );
}

#[test]
fn describe_indents_by_depth() {
    let (mut world, shelf, _, _) = small_world();
    world
        .entity_mut(shelf)
        .expect("shelf")
        .set_property("slots", 3_i64);
    let report = world.describe();
    let lines = report.lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "cellar");
    assert_eq!(lines[1], "  shelf [slots=3]");
    assert_eq!(lines[2], "    bottle");
    assert_eq!(lines[3], "  crate");
}

#[test]
fn open_close_round_trip_through_world() {
    let (mut world, _, crate_id, _) = small_world();
    world.entity_mut(crate_id).expect("crate").portal = Some(Portal::closed());
    let (message, succeeded) = world.open(crate_id).expect("crate exists");
    assert!(succeeded);
    assert_eq!(message, "You open the crate.");
    let (_, succeeded) = world.open(crate_id).expect("crate exists");
    assert!(!succeeded);
    let (message, succeeded) = world.close(crate_id).expect("crate exists");
    assert!(succeeded);
    assert_eq!(message, "You close the crate.");
}

#[test]
fn snapshot_includes_detached_entities() {
    let (mut world, _, _, bottle) = small_world();
    world.detach_self(bottle).expect("detach");
    let snapshot = world.snapshot("run_test", 4);
    assert_eq!(snapshot.tick, 4);
    assert_eq!(snapshot.entities.len(), world.entity_count());
    let entry = snapshot
        .entities
        .iter()
        .find(|entity| entity.id == bottle)
        .expect("bottle present");
    assert_eq!(entry.parent, None);
}

#[test]
fn inspect_by_name_resolves_display_names() {
    let (mut world, shelf, _, _) = small_world();
    world
        .entity_mut(shelf)
        .expect("shelf")
        .set_property("slots", 3_i64);
    let value = world.inspect_by_name("shelf").expect("shelf inspect");
    assert_eq!(
        value.get("parent").and_then(serde_json::Value::as_str),
        Some("cellar")
    );
    let children = value
        .get("children")
        .and_then(serde_json::Value::as_array)
        .expect("children present");
    assert_eq!(children.len(), 1);
    assert!(world.inspect_by_name("ghost").is_none());
}
