use super::*;
use crate::geometry::{ApproxEq, Vec2};
use crate::variables::{parse_expression, EvalError, Expr, VariableEnv};

fn e(text: &str) -> Expr {
    parse_expression(text).unwrap()
}

fn abs(store: &mut PointStore, x: f64, y: f64) -> PointId {
    store.insert(Point::absolute(Expr::number(x), Expr::number(y)))
}

fn assert_near(p: Vec2, x: f64, y: f64) {
    assert!(
        p.approx_eq(&Vec2::new(x, y)),
        "expected ({}, {}), got ({}, {})",
        x, y, p.x, p.y
    );
}

#[test]
fn test_absolute_ignores_env() {
    let mut store = PointStore::new();
    let p = abs(&mut store, 3.0, 4.0);

    let mut env = VariableEnv::new();
    assert_near(resolve_position(p, &store, &env).unwrap(), 3.0, 4.0);

    env.set_expression("x", "100").unwrap();
    assert_near(resolve_position(p, &store, &env).unwrap(), 3.0, 4.0);
}

#[test]
fn test_absolute_with_variables() {
    let mut store = PointStore::new();
    let p = store.insert(Point::absolute(e("waist / 4"), e("-depth")));

    let mut env = VariableEnv::new();
    env.set_expression("waist", "72").unwrap();
    env.set_expression("depth", "20").unwrap();

    assert_near(resolve_position(p, &store, &env).unwrap(), 18.0, -20.0);
}

#[test]
fn test_relative() {
    let mut store = PointStore::new();
    let anchor = abs(&mut store, 10.0, 10.0);
    let p = store.insert(Point::relative(anchor, e("5"), e("-2")));

    let env = VariableEnv::new();
    assert_near(resolve_position(p, &store, &env).unwrap(), 15.0, 8.0);
}

#[test]
fn test_distance() {
    let mut store = PointStore::new();
    let anchor = abs(&mut store, 1.0, 1.0);
    let right = store.insert(Point::distance(anchor, e("10"), e("0")));
    let up = store.insert(Point::distance(anchor, e("10"), e("half_pi")));

    let mut env = VariableEnv::new();
    env.set("half_pi", Expr::number(std::f64::consts::FRAC_PI_2)).unwrap();

    assert_near(resolve_position(right, &store, &env).unwrap(), 11.0, 1.0);
    assert_near(resolve_position(up, &store, &env).unwrap(), 1.0, 11.0);
}

#[test]
fn test_between_interpolates_and_extrapolates() {
    let mut store = PointStore::new();
    let a = abs(&mut store, 0.0, 0.0);
    let b = abs(&mut store, 10.0, 0.0);
    let mid = store.insert(Point::between(a, b, e("0.5")));
    let beyond = store.insert(Point::between(a, b, e("2")));
    let before = store.insert(Point::between(a, b, e("-0.5")));

    let env = VariableEnv::new();
    assert_near(resolve_position(mid, &store, &env).unwrap(), 5.0, 0.0);
    assert_near(resolve_position(beyond, &store, &env).unwrap(), 20.0, 0.0);
    assert_near(resolve_position(before, &store, &env).unwrap(), -5.0, 0.0);
}

#[test]
fn test_circle_intersection_candidates() {
    let mut store = PointStore::new();
    let a = abs(&mut store, 0.0, 0.0);
    let b = abs(&mut store, 10.0, 0.0);
    let first = store.insert(Point::circle_intersection(a, e("10"), b, e("10"), true));
    let second = store.insert(Point::circle_intersection(a, e("10"), b, e("10"), false));

    let env = VariableEnv::new();
    let p = resolve_position(first, &store, &env).unwrap();
    let q = resolve_position(second, &store, &env).unwrap();

    assert!((p.x - 5.0).abs() < 0.01 && (p.y - 8.66).abs() < 0.01);
    assert!((q.x - 5.0).abs() < 0.01 && (q.y + 8.66).abs() < 0.01);
}

#[test]
fn test_circle_intersection_choice_is_stable() {
    let mut store = PointStore::new();
    let a = abs(&mut store, -3.0, 2.0);
    let b = abs(&mut store, 4.0, 7.0);
    let p = store.insert(Point::circle_intersection(a, e("6"), b, e("5"), true));

    let env = VariableEnv::new();
    let reference = resolve_position(p, &store, &env).unwrap();
    for _ in 0..10 {
        assert_eq!(resolve_position(p, &store, &env).unwrap(), reference);
    }
}

#[test]
fn test_circle_intersection_tangent() {
    let mut store = PointStore::new();
    let a = abs(&mut store, 0.0, 0.0);
    let b = abs(&mut store, 10.0, 0.0);
    let p = store.insert(Point::circle_intersection(a, e("5"), b, e("5"), true));

    let env = VariableEnv::new();
    assert_near(resolve_position(p, &store, &env).unwrap(), 5.0, 0.0);
}

#[test]
fn test_circle_intersection_too_far_apart() {
    let mut store = PointStore::new();
    let a = abs(&mut store, 0.0, 0.0);
    let b = abs(&mut store, 100.0, 0.0);
    let p = store.insert(Point::circle_intersection(a, e("1"), b, e("1"), true));

    let env = VariableEnv::new();
    assert_eq!(
        resolve_position(p, &store, &env),
        Err(ResolveError::GeometricInconsistency(p))
    );
}

#[test]
fn test_circle_intersection_same_center() {
    let mut store = PointStore::new();
    let a = abs(&mut store, 2.0, 2.0);
    let b = abs(&mut store, 2.0, 2.0);
    let p = store.insert(Point::circle_intersection(a, e("3"), b, e("3"), false));

    let env = VariableEnv::new();
    assert_eq!(
        resolve_position(p, &store, &env),
        Err(ResolveError::GeometricInconsistency(p))
    );
}

#[test]
fn test_mutual_reference_is_cyclic_for_both() {
    let mut store = PointStore::new();
    let placeholder = abs(&mut store, 0.0, 0.0);
    let a = store.insert(Point::relative(placeholder, e("1"), e("0")));
    let b = store.insert(Point::relative(a, e("1"), e("0")));
    store.update(a, Point::relative(b, e("1"), e("0")));

    let env = VariableEnv::new();
    assert_eq!(
        resolve_position(a, &store, &env),
        Err(ResolveError::CyclicReference(vec![a, b, a].into()))
    );
    assert_eq!(
        resolve_position(b, &store, &env),
        Err(ResolveError::CyclicReference(vec![b, a, b].into()))
    );
}

#[test]
fn test_self_reference_is_cyclic() {
    let mut store = PointStore::new();
    let root = abs(&mut store, 0.0, 0.0);
    let p = store.insert(Point::between(root, root, e("0.5")));
    store.update(p, Point::between(root, p, e("0.5")));

    let env = VariableEnv::new();
    assert!(matches!(
        resolve_position(p, &store, &env),
        Err(ResolveError::CyclicReference(_))
    ));
}

#[test]
fn test_dependent_of_cycle_fails() {
    let mut store = PointStore::new();
    let root = abs(&mut store, 0.0, 0.0);
    let a = store.insert(Point::relative(root, e("1"), e("1")));
    let b = store.insert(Point::relative(a, e("1"), e("1")));
    store.update(a, Point::relative(b, e("1"), e("1")));
    let hanger = store.insert(Point::relative(a, e("1"), e("1")));

    let env = VariableEnv::new();
    assert!(matches!(
        resolve_position(hanger, &store, &env),
        Err(ResolveError::CyclicReference(_))
    ));
    // The untouched root still resolves
    assert_near(resolve_position(root, &store, &env).unwrap(), 0.0, 0.0);
}

#[test]
fn test_shared_anchor_is_not_a_cycle() {
    // Diamond: d depends on b and c, both of which depend on a
    let mut store = PointStore::new();
    let a = abs(&mut store, 0.0, 0.0);
    let b = store.insert(Point::relative(a, e("10"), e("0")));
    let c = store.insert(Point::relative(a, e("0"), e("10")));
    let d = store.insert(Point::between(b, c, e("0.5")));

    let env = VariableEnv::new();
    assert_near(resolve_position(d, &store, &env).unwrap(), 5.0, 5.0);
}

#[test]
fn test_deleted_anchor_is_unresolved() {
    let mut store = PointStore::new();
    let anchor = abs(&mut store, 10.0, 10.0);
    let p = store.insert(Point::relative(anchor, e("5"), e("-2")));

    assert!(store.remove(anchor).is_some());

    let env = VariableEnv::new();
    assert_eq!(
        resolve_position(p, &store, &env),
        Err(ResolveError::UnresolvedReference(anchor))
    );
}

#[test]
fn test_missing_point_is_unresolved() {
    let store = PointStore::new();
    let env = VariableEnv::new();
    assert_eq!(
        resolve_position(PointId(42), &store, &env),
        Err(ResolveError::UnresolvedReference(PointId(42)))
    );
}

#[test]
fn test_expression_failure_names_the_point() {
    let mut store = PointStore::new();
    let anchor = abs(&mut store, 0.0, 0.0);
    let p = store.insert(Point::relative(anchor, e("seam"), e("0")));

    let env = VariableEnv::new();
    assert_eq!(
        resolve_position(p, &store, &env),
        Err(ResolveError::Expression {
            point: p,
            source: EvalError::UnknownVariable("seam".to_string()),
        })
    );
}

#[test]
fn test_failure_propagates_through_chain() {
    let mut store = PointStore::new();
    let a = store.insert(Point::absolute(e("missing"), e("0")));
    let b = store.insert(Point::relative(a, e("1"), e("1")));
    let c = store.insert(Point::distance(b, e("1"), e("0")));

    let env = VariableEnv::new();
    assert!(matches!(
        resolve_position(c, &store, &env),
        Err(ResolveError::Expression { point, .. }) if point == a
    ));
}

#[test]
fn test_division_by_zero_does_not_fail() {
    let mut store = PointStore::new();
    let p = store.insert(Point::absolute(e("1 / 0"), e("0")));

    let env = VariableEnv::new();
    let pos = resolve_position(p, &store, &env).unwrap();
    assert!(pos.x.is_infinite());
}

#[test]
fn test_resolve_all_matches_single_resolution() {
    let mut store = PointStore::new();
    let a = abs(&mut store, 1.0, 2.0);
    let b = store.insert(Point::relative(a, e("w"), e("0")));
    let c = store.insert(Point::between(a, b, e("0.25")));
    let broken = store.insert(Point::relative(PointId(999), e("0"), e("0")));

    let mut env = VariableEnv::new();
    env.set_expression("w", "8").unwrap();

    let all = Resolver::new(&store, &env).resolve_all();

    assert_eq!(all.len(), 4);
    for id in [a, b, c, broken] {
        assert_eq!(all[&id], resolve_position(id, &store, &env));
    }
    assert_near(all[&c].clone().unwrap(), 3.0, 2.0);
}

#[test]
fn test_long_chain_terminates() {
    let mut store = PointStore::new();
    let mut last = abs(&mut store, 0.0, 0.0);
    for _ in 0..100_000 {
        last = store.insert(Point::relative(last, e("1"), e("0.5")));
    }

    let env = VariableEnv::new();
    assert_near(resolve_position(last, &store, &env).unwrap(), 100_000.0, 50_000.0);

    let all = Resolver::new(&store, &env).resolve_all();
    assert_eq!(all.len(), 100_001);
    assert!(all.values().all(Result::is_ok));
}

#[test]
fn test_long_cycle_reports_full_path() {
    let mut store = PointStore::new();
    let root = abs(&mut store, 0.0, 0.0);
    let first = store.insert(Point::relative(root, e("1"), e("0")));
    let mut last = first;
    for _ in 0..50_000 {
        last = store.insert(Point::relative(last, e("1"), e("0")));
    }
    store.update(first, Point::relative(last, e("1"), e("0")));

    let env = VariableEnv::new();
    match resolve_position(last, &store, &env) {
        Err(ResolveError::CyclicReference(path)) => {
            assert_eq!(path.len(), 50_002);
            assert_eq!(path.first(), Some(&last));
            assert_eq!(path.last(), Some(&last));
        }
        other => panic!("expected a cycle, got {:?}", other),
    }
    assert_near(resolve_position(root, &store, &env).unwrap(), 0.0, 0.0);
}
