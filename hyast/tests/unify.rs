use std::collections::BTreeSet;

use hyast::pattern::Step;
use hyast::prelude::*;

mod common;
use common::Arith;

#[test]
fn match_step_decomposes_nodes_field_by_field() {
    let a = Arith::new();
    let lhs = a.add(Value::var("X"), a.num(1));
    let rhs = a.add(a.num(2), Value::var("Y"));
    let step = match_step(&lhs, &rhs).unwrap();
    assert_eq!(step.binding, None);
    assert_eq!(step.equations.len(), 3);
    assert_eq!(step.equations[0], (Value::var("X"), a.num(2)));
    assert_eq!(step.equations[2], (a.num(1), Value::var("Y")));
}

#[test]
fn match_step_binds_variables_on_either_side() {
    let a = Arith::new();
    let step = match_step(&a.num(2), &Value::var("X")).unwrap();
    assert!(step.equations.is_empty());
    let (name, value) = step.binding.unwrap();
    assert_eq!(&*name, "X");
    assert_eq!(value, a.num(2));

    let same = match_step(&Value::var("X"), &Value::var("X")).unwrap();
    assert_eq!(same, Step::default());
}

#[test]
fn match_step_failures() {
    let a = Arith::new();
    assert!(matches!(
        match_step(&a.num(1), &a.name("x")),
        Err(MatchFailure::NodeMismatch { .. })
    ));
    assert!(matches!(
        match_step(&a.num(1), &Value::int(1)),
        Err(MatchFailure::NodeVsNonNode { .. })
    ));
    assert!(matches!(
        match_step(&Value::int(1), &a.num(1)),
        Err(MatchFailure::NodeVsNonNode { .. })
    ));
    assert!(matches!(
        match_step(&Value::seq([Value::int(1)]), &Value::int(1)),
        Err(MatchFailure::SeqVsNonSeq { .. })
    ));
    assert_eq!(
        match_step(
            &Value::seq([Value::int(1), Value::int(2)]),
            &Value::seq([Value::int(1), Value::int(2), Value::int(3)])
        ),
        Err(MatchFailure::LengthMismatch { left: 2, right: 3 })
    );
    assert!(matches!(
        match_step(&Value::int(1), &Value::int(2)),
        Err(MatchFailure::Constant { .. })
    ));
    assert!(matches!(
        match_step(&Value::int(1), &Value::str("1")),
        Err(MatchFailure::Constant { .. })
    ));
}

#[test]
fn unify_solves_through_chains_of_variables() {
    let a = Arith::new();
    // ((X, Y), Z + _) against ((1, Z), 2 + 3)
    let pattern = Value::seq([
        Value::seq([Value::var("X"), Value::var("Y")]),
        a.add(Value::var("Z"), Value::wildcard()),
    ]);
    let target = Value::seq([
        Value::seq([a.num(1), Value::var("Z")]),
        a.add(a.num(2), a.num(3)),
    ]);

    let subst = unify(&pattern, &target).unwrap();
    assert_eq!(subst.len(), 3);
    assert_eq!(subst.get("X"), Some(&a.num(1)));
    assert_eq!(subst.get("Y"), Some(&a.num(2)));
    assert_eq!(subst.get("Z"), Some(&a.num(2)));

    assert_eq!(
        subst.apply(&target).unwrap(),
        Value::seq([
            Value::seq([a.num(1), a.num(2)]),
            a.add(a.num(2), a.num(3)),
        ])
    );
}

#[test]
fn unify_results_are_idempotent() {
    let a = Arith::new();
    let lhs = Value::seq([Value::var("X"), Value::var("Y")]);
    let rhs = Value::seq([a.add(Value::var("Y"), a.num(1)), a.num(2)]);
    let subst = unify(&lhs, &rhs).unwrap();
    assert_eq!(subst.get("X"), Some(&a.add(a.num(2), a.num(1))));

    for (_, value) in subst.iter() {
        for name in variables(value) {
            assert!(!subst.contains(&name), "{name} still occurs in {subst}");
        }
    }
}

#[test]
fn unify_is_symmetric() {
    let a = Arith::new();
    let cases = [
        (a.add(Value::var("X"), a.num(1)), a.add(a.name("x"), Value::var("Y"))),
        (Value::seq([Value::var("X"), Value::int(1)]), Value::seq([Value::int(2), Value::var("X")])),
        (a.num(1), a.num(2)),
        (Value::wildcard(), a.tuple([])),
    ];
    for (lhs, rhs) in cases {
        assert_eq!(
            try_unify(&lhs, &rhs),
            try_unify(&rhs, &lhs),
            "{lhs} vs {rhs}"
        );
    }
}

#[test]
fn unifying_a_ground_tree_with_itself_binds_nothing() {
    let a = Arith::new();
    let trees = [
        a.add(a.num(1), a.tuple([a.name("x"), a.mul(a.num(2), a.num(3))])),
        Value::seq([Value::int(1), Value::str("s"), Value::Absent]),
        a.tuple([]),
    ];
    for tree in trees {
        let copy = tree.clone();
        assert!(unify(&tree, &copy).unwrap().is_empty(), "{tree}");
    }
    let rebuilt = a.add(a.num(1), a.num(2));
    assert!(unify(&a.add(a.num(1), a.num(2)), &rebuilt).unwrap().is_empty());
}

#[test]
fn wildcards_match_anything_without_binding() {
    let a = Arith::new();
    let subst = unify(&a.add(Value::wildcard(), Value::wildcard()), &a.add(a.num(1), a.name("x"))).unwrap();
    assert!(subst.is_empty());
    assert!(unify(&Value::wildcard(), &Value::var("X")).unwrap().is_empty());
}

#[test]
fn occurs_check_rejects_circular_bindings() {
    let a = Arith::new();
    let x = Value::var("X");
    let tree = a.add(x.clone(), a.num(1));
    assert!(occurs("X", &tree));
    assert!(!occurs("Y", &tree));

    assert!(matches!(
        unify(&x, &tree),
        Err(MatchFailure::Circular { ref var, .. }) if var == "X"
    ));
    assert!(try_unify(&tree, &x).is_none());

    // The cycle only shows up after X := Y is applied.
    let lhs = Value::seq([x.clone(), Value::var("Y")]);
    let rhs = Value::seq([Value::var("Y"), a.tuple([x])]);
    assert!(try_unify(&lhs, &rhs).is_none());
}

#[test]
fn unify_eqs_solves_a_system() {
    let a = Arith::new();
    let subst = unify_eqs(vec![
        (Value::var("X"), a.num(1)),
        (a.add(Value::var("X"), Value::var("Y")), a.add(a.num(1), a.name("y"))),
    ])
    .unwrap();
    assert_eq!(subst.get("X"), Some(&a.num(1)));
    assert_eq!(subst.get("Y"), Some(&a.name("y")));

    assert!(unify_eqs(vec![(Value::var("X"), a.num(1)), (Value::var("X"), a.num(2))]).is_err());
    assert!(unify_eqs(Vec::new()).unwrap().is_empty());
}

#[test]
fn variables_collects_names() {
    let a = Arith::new();
    let tree = a.tuple([a.add(Value::var("B"), Value::var("A")), Value::var("B"), Value::wildcard()]);
    let expected: BTreeSet<String> = ["A", "B"].into_iter().map(String::from).collect();
    assert_eq!(variables(&tree), expected);
}

#[test]
fn substitution_accessors() {
    let a = Arith::new();
    let subst: Substitution = [("N", a.num(3)), ("I", Value::int(4)), ("S", Value::str("s"))]
        .into_iter()
        .collect();

    assert_eq!(subst.int("I").unwrap(), 4);
    assert_eq!(subst.str("S").unwrap(), "s");
    assert_eq!(subst.node("N").unwrap().type_name(), "Num");
    assert!(matches!(subst.value("Q"), Err(AstError::Unbound { .. })));
    assert!(matches!(subst.int("S"), Err(AstError::Binding { .. })));
    assert_eq!(subst.to_string(), "{I = 4, N = Num(n = 3), S = \"s\"}");
}

#[test]
fn substitution_apply_goes_through_checked_constructors() {
    let a = Arith::new();
    let template = a.add(Value::var("X"), Value::var("Unbound"));
    let ok: Substitution = [("X", a.num(1))].into_iter().collect();
    assert_eq!(
        ok.apply(&template).unwrap(),
        a.add(a.num(1), Value::var("Unbound"))
    );

    let ill_typed: Substitution = [("X", Value::int(1))].into_iter().collect();
    assert!(matches!(
        ill_typed.apply(&template),
        Err(AstError::Construction(ConstructionError::WrongType { .. }))
    ));
}
