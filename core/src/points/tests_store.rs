use super::*;
use crate::variables::{parse_expression, Expr};

fn e(text: &str) -> Expr {
    parse_expression(text).unwrap()
}

#[test]
fn test_ids_are_monotonic_and_never_reused() {
    let mut store = PointStore::new();
    let a = store.insert(Point::absolute(e("0"), e("0")));
    let b = store.insert(Point::absolute(e("1"), e("1")));
    assert!(b > a);

    store.remove(b);
    let c = store.insert(Point::absolute(e("2"), e("2")));
    assert!(c > b, "removed id must not be handed out again");
}

#[test]
fn test_update_keeps_id() {
    let mut store = PointStore::new();
    let a = store.insert_named("neck", Point::absolute(e("0"), e("0")));

    let old = store.update(a, Point::absolute(e("5"), e("5"))).unwrap();

    assert_eq!(old, Point::absolute(e("0"), e("0")));
    assert_eq!(store.get(a), Some(&Point::absolute(e("5"), e("5"))));
    assert_eq!(store.entry(a).unwrap().name, "neck");
    assert!(store.update(PointId(77), Point::absolute(e("1"), e("1"))).is_none());
}

#[test]
fn test_iteration_follows_insertion_order() {
    let mut store = PointStore::new();
    let ids: Vec<_> = (0..5)
        .map(|i| store.insert(Point::absolute(Expr::number(i as f64), e("0"))))
        .collect();
    store.remove(ids[2]);

    let listed: Vec<_> = store.iter().map(|entry| entry.id).collect();
    assert_eq!(listed, vec![ids[0], ids[1], ids[3], ids[4]]);
}

#[test]
fn test_references_and_dependents() {
    let mut store = PointStore::new();
    let a = store.insert(Point::absolute(e("0"), e("0")));
    let b = store.insert(Point::relative(a, e("1"), e("0")));
    let c = store.insert(Point::circle_intersection(a, e("r"), b, e("r"), true));

    assert_eq!(store.get(c).unwrap().references(), vec![a, b]);
    assert_eq!(store.dependents(a), vec![b, c]);
    assert_eq!(store.dependents(c), Vec::<PointId>::new());
}

#[test]
fn test_dangling_references_after_remove() {
    let mut store = PointStore::new();
    let a = store.insert(Point::absolute(e("0"), e("0")));
    let b = store.insert(Point::relative(a, e("1"), e("0")));
    let c = store.insert(Point::between(a, b, e("0.5")));

    assert!(store.dangling_references().is_empty());

    store.remove(a);

    assert_eq!(store.dangling_references(), vec![(b, a), (c, a)]);
}

#[test]
fn test_point_variables() {
    let point = Point::distance(PointId(1), e("sleeve + ease"), e("angle * sleeve"));
    assert_eq!(point.variables(), vec!["sleeve", "ease", "angle"]);
    assert_eq!(point.kind_name(), "Distance");
}

#[test]
fn test_point_json_uses_expression_text() {
    let json = r#"{"type":"Relative","anchor":3,"dx":"seam * 2","dy":"-1.5"}"#;
    let point: Point = serde_json::from_str(json).unwrap();

    assert_eq!(point, Point::relative(PointId(3), e("seam * 2"), e("-1.5")));

    let bad = r#"{"type":"Relative","anchor":3,"dx":"seam *","dy":"0"}"#;
    assert!(serde_json::from_str::<Point>(bad).is_err());
}

#[test]
fn test_store_serialization_round_trip() {
    let mut store = PointStore::new();
    let a = store.insert_named("origin", Point::absolute(e("0"), e("0")));
    store.insert(Point::circle_intersection(a, e("10"), a, e("w / 2"), false));
    store.remove(a);

    let json = serde_json::to_string(&store).unwrap();
    let mut restored: PointStore = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, store);
    // The id counter survives, so ids stay unique after reload
    let next = restored.insert(Point::absolute(e("1"), e("1")));
    assert_eq!(next, PointId(3));
}
