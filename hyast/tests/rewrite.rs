use hyast::prelude::*;

mod common;
use common::Arith;

/// Folding rules over `BinOp(Num(X), op, Num(Y))`.
///
/// Addition always folds. Multiplication by zero on the left folds and
/// otherwise defers; on the right it folds and otherwise stops the search,
/// so the general multiplication rule never runs.
fn folding_rules(a: &Arith) -> Vec<Rule<'_>> {
    let operands = |op: &str| a.bin(a.num_var("X"), op, a.num_var("Y"));
    vec![
        Rule::new(operands("Add"), move |s: &Substitution| {
            Ok(RuleOutcome::Replace(a.num(s.int("X")? + s.int("Y")?)))
        })
        .named("fold-add"),
        Rule::new(operands("Mult"), move |s: &Substitution| {
            Ok(match s.int("X")? {
                0 => RuleOutcome::Replace(a.num(0)),
                _ => RuleOutcome::Defer,
            })
        })
        .named("zero-left"),
        Rule::new(operands("Mult"), move |s: &Substitution| {
            Ok(match s.int("Y")? {
                0 => RuleOutcome::Replace(a.num(0)),
                _ => RuleOutcome::NoChange,
            })
        })
        .named("zero-right"),
        Rule::new(operands("Mult"), move |s: &Substitution| {
            Ok(RuleOutcome::Replace(a.num(s.int("X")? * s.int("Y")?)))
        })
        .named("fold-mult"),
    ]
}

#[test]
fn rewrites_bottom_up() {
    let a = Arith::new();
    let tree = a.add(a.num(1), a.add(a.num(2), a.num(3)));
    let mut rewriter = Rewriter::new(folding_rules(&a));
    assert_eq!(rewriter.process(&tree).unwrap(), a.num(6));
    assert_eq!(rewriter.steps(), 2);
}

#[test]
fn defer_and_no_change_control_rule_precedence() {
    let a = Arith::new();
    let five_times_two = a.mul(a.num(5), a.num(2));
    let tree = a.mul(
        five_times_two.clone(),
        a.sub(a.mul(a.num(3), a.num(0)), a.num(1)),
    );

    let result = Rewriter::new(folding_rules(&a)).process(&tree).unwrap();
    assert_eq!(
        result,
        a.mul(a.mul(a.num(5), a.num(2)), a.sub(a.num(0), a.num(1)))
    );
    let left = result.as_node().unwrap().get("left").unwrap();
    assert!(left.ptr_eq(&five_times_two));
}

#[test]
fn unmatched_trees_are_returned_as_is() {
    let a = Arith::new();
    let tree = a.tuple([a.sub(a.name("x"), a.num(1)), a.mul(a.name("y"), a.num(2))]);
    let mut rewriter = Rewriter::new(folding_rules(&a));
    let result = rewriter.process(&tree).unwrap();
    assert!(result.ptr_eq(&tree));
    assert_eq!(rewriter.steps(), 0);
}

#[test]
fn rules_reach_nodes_inside_sequences() {
    let a = Arith::new();
    let tree = a.tuple([a.add(a.num(1), a.num(1)), a.name("x"), a.mul(a.num(0), a.num(9))]);
    let result = Rewriter::new(folding_rules(&a)).process(&tree).unwrap();
    assert_eq!(result, a.tuple([a.num(2), a.name("x"), a.num(0)]));
}

#[test]
fn template_rules_instantiate_their_bindings() {
    let a = Arith::new();
    // X - X => 0, and commute additions of names.
    let rules = vec![
        Rule::template(a.sub(Value::var("X"), Value::var("X")), a.num(0)),
        Rule::template(
            a.add(a.name("b"), a.name("a")),
            a.add(a.name("a"), a.name("b")),
        ),
    ];
    let tree = a.tuple([
        a.sub(a.name("x"), a.name("x")),
        a.sub(a.name("x"), a.name("y")),
        a.add(a.name("b"), a.name("a")),
    ]);
    let result = Rewriter::new(rules).process(&tree).unwrap();
    assert_eq!(
        result,
        a.tuple([
            a.num(0),
            a.sub(a.name("x"), a.name("y")),
            a.add(a.name("a"), a.name("b")),
        ])
    );
}

fn distribute(a: &Arith) -> Rule<'static> {
    let (x, y, z) = (Value::var("A"), Value::var("B"), Value::var("C"));
    Rule::template(
        a.mul(x.clone(), a.add(y.clone(), z.clone())),
        a.add(a.mul(x.clone(), y), a.mul(x, z)),
    )
    .named("distribute")
}

fn fold_mult(a: &Arith) -> Rule<'_> {
    Rule::new(a.mul(a.num_var("X"), a.num_var("Y")), move |s: &Substitution| {
        Ok(RuleOutcome::Replace(a.num(s.int("X")? * s.int("Y")?)))
    })
}

#[test]
fn fixpoint_mode_rewrites_replacements_again() {
    let a = Arith::new();
    let tree = a.mul(a.num(2), a.add(a.num(3), a.name("n")));

    let mut once = Rewriter::new(vec![distribute(&a), fold_mult(&a)]);
    assert_eq!(
        once.process(&tree).unwrap(),
        a.add(a.mul(a.num(2), a.num(3)), a.mul(a.num(2), a.name("n")))
    );
    assert_eq!(once.steps(), 1);

    let options = RewriteOptions::default().fixpoint(true);
    let mut fixed = Rewriter::with_options(vec![distribute(&a), fold_mult(&a)], options);
    assert_eq!(
        fixed.process(&tree).unwrap(),
        a.add(a.num(6), a.mul(a.num(2), a.name("n")))
    );
    assert_eq!(fixed.steps(), 2);
}

#[test]
fn fixpoint_mode_enforces_the_step_limit() {
    let a = Arith::new();
    let increment = Rule::new(a.num_var("X"), |s: &Substitution| {
        Ok(RuleOutcome::Replace(a.num(s.int("X")? + 1)))
    });

    let options = RewriteOptions::default().fixpoint(true).step_limit(10);
    let err = Rewriter::with_options(vec![increment], options)
        .process(&a.num(0))
        .unwrap_err();
    assert_eq!(err, AstError::Rewrite(RewriteError::StepLimitExceeded { limit: 10 }));

    // Without fixpoint the same rule fires once per node.
    let increment = Rule::new(a.num_var("X"), |s: &Substitution| {
        Ok(RuleOutcome::Replace(a.num(s.int("X")? + 1)))
    });
    let result = Rewriter::new(vec![increment])
        .process(&a.add(a.num(0), a.num(5)))
        .unwrap();
    assert_eq!(result, a.add(a.num(1), a.num(6)));
}

/// Run `f` on a thread with the default 2 MiB stack of spawned threads.
fn on_small_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(2 << 20)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

#[test]
fn looping_rules_hit_the_default_step_limit_without_exhausting_the_stack() {
    let limit = RewriteOptions::DEFAULT_STEP_LIMIT;

    let err = on_small_stack(|| {
        let a = Arith::new();
        let increment = Rule::new(a.num_var("X"), |s: &Substitution| {
            Ok(RuleOutcome::Replace(a.num(s.int("X")? + 1)))
        });
        let options = RewriteOptions::default().fixpoint(true);
        Rewriter::with_options(vec![increment], options)
            .process(&a.num(0))
            .unwrap_err()
    });
    assert_eq!(err, AstError::Rewrite(RewriteError::StepLimitExceeded { limit }));

    // A rule that grows the tree on every step.
    let err = on_small_stack(|| {
        let a = Arith::new();
        let grow = Rule::template(Value::var("X"), a.add(Value::var("X"), a.num(0)));
        let options = RewriteOptions::default().fixpoint(true);
        Rewriter::with_options(vec![grow], options)
            .process(&a.num(0))
            .unwrap_err()
    });
    assert_eq!(err, AstError::Rewrite(RewriteError::StepLimitExceeded { limit }));
}

#[test]
fn fixpoint_passes_reach_the_children_of_replacements() {
    let a = Arith::new();
    // 2 * (3 + (4 + n)) distributes twice, then folds 2 * 3 and 2 * 4.
    let tree = a.mul(a.num(2), a.add(a.num(3), a.add(a.num(4), a.name("n"))));
    let options = RewriteOptions::default().fixpoint(true);
    let mut rewriter = Rewriter::with_options(vec![distribute(&a), fold_mult(&a)], options);
    assert_eq!(
        rewriter.process(&tree).unwrap(),
        a.add(a.num(6), a.add(a.num(8), a.mul(a.num(2), a.name("n"))))
    );
    assert_eq!(rewriter.steps(), 4);
}

#[test]
fn action_errors_abort_the_rewrite() {
    let a = Arith::new();
    let rule = Rule::new(a.num_var("X"), |s: &Substitution| {
        s.str("X")?;
        Ok(RuleOutcome::NoChange)
    });
    assert!(matches!(
        Rewriter::new(vec![rule]).process(&a.num(1)),
        Err(AstError::Binding { .. })
    ));
}

#[test]
fn rule_display_prefers_the_name() {
    let a = Arith::new();
    let rules = folding_rules(&a);
    assert_eq!(rules[0].to_string(), "fold-add");
    let anonymous = Rule::template(Value::var("X"), Value::var("X"));
    assert_eq!(anonymous.to_string(), "PatVar(id = \"X\")");
    assert_eq!(RewriteOptions::default().step_limit, RewriteOptions::DEFAULT_STEP_LIMIT);
}
