use hyast::grammar::{Grammar, constructor, field};
use hyast::prelude::*;
use hyast_derive::pattern_vars;

#[test]
fn lib_rs_doc_example_compiles_and_behaves() {
    let grammar = Grammar::new().sum(
        "expr",
        [
            constructor("Add", [field("expr", "left"), field("expr", "right")]),
            constructor("Num", [field("int", "n")]),
        ],
    );
    let lang = generate(&grammar, GeneratorOptions::default().type_checked(true)).unwrap();

    let one = lang.make("Num", [Value::int(1)]).unwrap();
    let tree = lang.make("Add", [one.clone(), Value::var("X")]).unwrap();
    assert_eq!(
        tree.to_string(),
        "Add(left = Num(n = 1), right = PatVar(id = \"X\"))"
    );

    let subst = unify(&tree, &lang.make("Add", [one.clone(), one.clone()]).unwrap()).unwrap();
    assert_eq!(subst.get("X"), Some(&one));
    assert_eq!(parse(&lang, &dump(&tree)).unwrap(), tree);
}

#[test]
fn pattern_vars_binds_one_variable_per_name() {
    pattern_vars!(left, right);
    assert_eq!(left, Value::var("left"));
    assert_eq!(right.var_name(), Some("right"));

    let grammar = Grammar::new().product("pair", [field("object", "first"), field("object", "second")]);
    let lang = generate(&grammar, GeneratorOptions::default()).unwrap();
    let pattern = lang.make("pair", [left, right]).unwrap();
    let target = lang.make("pair", [Value::int(1), Value::str("b")]).unwrap();

    let subst = unify(&pattern, &target).unwrap();
    assert_eq!(subst.int("left").unwrap(), 1);
    assert_eq!(subst.str("right").unwrap(), "b");
}
