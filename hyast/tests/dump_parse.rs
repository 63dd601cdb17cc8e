use hyast::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use termcolor::Buffer;

mod common;
use common::Arith;

#[test]
fn dump_aligns_fields_under_the_first_one() {
    let a = Arith::new();
    let tree = a.tuple([a.add(a.num(1), a.num(2)), a.name("x")]);
    let expected = [
        "Tuple(elts = (BinOp(left = Num(n = 1),",
        "                    op = Add(),",
        "                    right = Num(n = 2)),",
        "              Name(id = \"x\")))",
    ]
    .join("\n");
    assert_eq!(dump(&tree), expected);
    assert_eq!(format!("{tree:#}"), expected);
}

#[test]
fn display_is_a_single_line() {
    let a = Arith::new();
    let tree = a.tuple([a.add(a.num(1), Value::var("X")), a.lit(Value::Absent)]);
    assert_eq!(
        tree.to_string(),
        "Tuple(elts = (BinOp(left = Num(n = 1), op = Add(), right = PatVar(id = \"X\")), Lit(value = None)))"
    );
}

#[test]
fn sequences_keep_a_trailing_comma_when_singleton() {
    let a = Arith::new();
    assert_eq!(dump(&a.tuple([a.num(5)])), "Tuple(elts = (Num(n = 5),))");
    assert_eq!(dump(&a.tuple([])), "Tuple(elts = ())");
    assert_eq!(Value::seq([Value::int(5)]).to_string(), "(5,)");
    assert_eq!(Value::seq([Value::int(5), Value::int(6)]).to_string(), "(5, 6)");
}

#[test]
fn primitives_print_as_literals() {
    let cases = [
        (Value::int(-3), "-3"),
        (Value::float(1.0), "1.0"),
        (Value::float(1e-7), "1e-7"),
        (Value::float(f64::NEG_INFINITY), "-inf"),
        (Value::float(f64::NAN), "NaN"),
        (Value::str("a\"b\n"), r#""a\"b\n""#),
        (Value::bytes(b"\x00z"), r#"b"\x00z""#),
        (Value::bool(true), "true"),
        (Value::Absent, "None"),
        (Value::wildcard(), "Wildcard()"),
    ];
    for (value, text) in cases {
        assert_eq!(value.to_string(), text);
        assert_eq!(dump(&value), text);
    }
}

#[test]
fn dump_round_trips() {
    let a = Arith::new();
    let trees = [
        a.tuple([a.add(a.num(1), a.num(2)), a.name("x")]),
        a.tuple([a.num(5)]),
        a.tuple([]),
        a.mul(Value::var("X"), Value::wildcard()),
        a.lit(Value::seq([
            Value::float(2.5),
            Value::bytes(b"\xff\"\\"),
            Value::str("\u{1f600}\t"),
            Value::seq([Value::Absent]),
        ])),
        a.lang
            .make("Call", [a.name("f"), Value::seq([a.num(1)]), Value::Absent])
            .unwrap(),
    ];
    for tree in trees {
        assert_eq!(parse(&a.lang, &dump(&tree)).unwrap(), tree, "dump:\n{tree:#}");
        assert_eq!(parse(&a.lang, &tree.to_string()).unwrap(), tree);
    }
}

#[test]
fn parse_accepts_positional_and_keyword_arguments() {
    let a = Arith::new();
    let expected = a.add(a.num(1), a.num(2));
    let texts = [
        "BinOp(Num(1), Add(), Num(2))",
        "BinOp(right = Num(n = 2), left = Num(1), op = Add())",
        "BinOp(Num(1), Add(), right = Num(n = 2))",
        "  BinOp(\n  Num(1) ,\n Add( ),\n\tNum(2),\n)  ",
    ];
    for text in texts {
        assert_eq!(parse(&a.lang, text).unwrap(), expected, "{text}");
    }
    assert_eq!(
        parse(&a.lang, "PatVar(\"X\")").unwrap(),
        Value::var("X")
    );
}

#[test]
fn parse_errors() {
    let a = Arith::new();
    assert!(matches!(
        parse(&a.lang, "BinOp(left = Num(1), Add(), Num(2))"),
        Err(ParseError::PositionalAfterKeyword { .. })
    ));
    assert!(matches!(
        parse(&a.lang, "Mod(1)"),
        Err(ParseError::UnknownType { ref name }) if name == "Mod"
    ));
    assert!(matches!(
        parse(&a.lang, "Num(n = \"x\")"),
        Err(ParseError::Construction(ConstructionError::WrongType { .. }))
    ));
    assert!(matches!(
        parse(&a.lang, "Num(1, 2)"),
        Err(ParseError::Construction(ConstructionError::FieldCount { .. }))
    ));
    assert!(matches!(
        parse(&a.lang, "Num(n = 1"),
        Err(ParseError::Syntax { .. })
    ));
    assert!(matches!(
        parse(&a.lang, "PatVar(1)"),
        Err(ParseError::MalformedPattern { .. })
    ));
    assert!(matches!(
        parse(&a.lang, "Wildcard(1)"),
        Err(ParseError::MalformedPattern { .. })
    ));
}

#[test]
fn colored_rendering_carries_the_same_text() {
    let a = Arith::new();
    let tree = a.add(a.num(1), a.name("x"));

    let mut plain = Buffer::no_color();
    tree.pretty_render_to(&mut plain).unwrap();
    assert_eq!(String::from_utf8(plain.into_inner()).unwrap(), dump(&tree));

    let mut colored = Buffer::ansi();
    tree.pretty_render_to(&mut colored).unwrap();
    let colored = String::from_utf8(colored.into_inner()).unwrap();
    assert!(colored.contains("\x1b["));
    assert!(colored.contains("BinOp"));
}

fn random_prim(rng: &mut impl Rng) -> Value {
    const FLOATS: [f64; 8] = [0.0, -0.0, 2.5, 1e-7, 1e300, f64::INFINITY, f64::NEG_INFINITY, f64::NAN];
    const STRS: [&str; 6] = ["", "x", "with space", "quote\"", "new\nline", "é\u{0}"];
    match rng.random_range(0..7) {
        0 => Value::int(rng.random_range(-1000..1000)),
        1 => Value::int(if rng.random_bool(0.5) { i64::MIN } else { i64::MAX }),
        2 => Value::float(FLOATS[rng.random_range(0..FLOATS.len())]),
        3 => Value::str(STRS[rng.random_range(0..STRS.len())]),
        4 => {
            let len = rng.random_range(0..4);
            Value::bytes(&(0..len).map(|_| rng.random::<u8>()).collect::<Vec<_>>())
        }
        5 => Value::bool(rng.random_bool(0.5)),
        _ => Value::Absent,
    }
}

fn random_expr(a: &Arith, rng: &mut impl Rng, budget: usize) -> Value {
    if budget == 0 || rng.random_bool(0.2) {
        return match rng.random_range(0..4) {
            0 => a.num(rng.random_range(-50..50)),
            1 => a.name(["x", "y", "z"][rng.random_range(0..3)]),
            2 => Value::var(["X", "Y"][rng.random_range(0..2)]),
            _ => {
                let len = rng.random_range(0..3);
                a.lit(Value::seq((0..len).map(|_| random_prim(rng)).collect::<Vec<_>>()))
            }
        };
    }
    match rng.random_range(0..4) {
        0 => {
            let op = ["Add", "Sub", "Mult", "Div"][rng.random_range(0..4)];
            let left = random_expr(a, rng, budget - 1);
            let right = random_expr(a, rng, budget - 1);
            a.bin(left, op, right)
        }
        1 => {
            let len = rng.random_range(0..4);
            let elts: Vec<Value> = (0..len).map(|_| random_expr(a, rng, budget - 1)).collect();
            a.tuple(elts)
        }
        2 => {
            let func = random_expr(a, rng, budget - 1);
            let len = rng.random_range(0..3);
            let args: Vec<Value> = (0..len).map(|_| random_expr(a, rng, budget - 1)).collect();
            let starargs = match rng.random_bool(0.5) {
                true => random_expr(a, rng, budget - 1),
                false => Value::Absent,
            };
            a.lang
                .make("Call", [func, Value::seq(args), starargs])
                .unwrap()
        }
        _ => a.lit(random_prim(rng)),
    }
}

#[test]
fn random_trees_round_trip() {
    let a = Arith::new();
    let mut rng = ChaCha20Rng::seed_from_u64(0x42);
    for _ in 0..200 {
        let tree = random_expr(&a, &mut rng, 5);
        let text = dump(&tree);
        let parsed = parse(&a.lang, &text).unwrap_or_else(|e| panic!("{e}\n{text}"));
        assert_eq!(parsed, tree, "{text}");
        assert_eq!(dump(&parsed), text);
    }
}
