#![allow(dead_code)]

use hyast::grammar::{Grammar, constructor, field};
use hyast::prelude::*;

/// Small arithmetic language used across the integration tests.
pub struct Arith {
    pub lang: Language,
}

pub fn arith_grammar() -> Grammar {
    Grammar::new()
        .sum(
            "expr",
            [
                constructor(
                    "BinOp",
                    [
                        field("expr", "left"),
                        field("operator", "op"),
                        field("expr", "right"),
                    ],
                ),
                constructor("Num", [field("int", "n")]),
                constructor("Name", [field("identifier", "id")]),
                constructor("Tuple", [field("expr*", "elts")]),
                constructor(
                    "Call",
                    [
                        field("expr", "func"),
                        field("expr*", "args"),
                        field("expr?", "starargs"),
                    ],
                ),
                constructor("Lit", [field("object", "value")]),
            ],
        )
        .sum(
            "operator",
            ["Add", "Sub", "Mult", "Div"].map(|name| constructor(name, Vec::new())),
        )
}

impl Arith {
    pub fn new() -> Self {
        let options = GeneratorOptions::default().type_checked(true);
        Arith {
            lang: generate(&arith_grammar(), options).unwrap(),
        }
    }

    pub fn num(&self, n: i64) -> Value {
        self.lang.make("Num", [Value::int(n)]).unwrap()
    }

    pub fn name(&self, id: &str) -> Value {
        self.lang.make("Name", [Value::str(id)]).unwrap()
    }

    pub fn tuple(&self, elts: impl IntoIterator<Item = Value>) -> Value {
        self.lang.make("Tuple", [Value::seq(elts)]).unwrap()
    }

    pub fn lit(&self, value: Value) -> Value {
        self.lang.make("Lit", [value]).unwrap()
    }

    pub fn op(&self, name: &str) -> Value {
        self.lang.make(name, Vec::new()).unwrap()
    }

    pub fn bin(&self, left: Value, op: &str, right: Value) -> Value {
        self.lang.make("BinOp", [left, self.op(op), right]).unwrap()
    }

    pub fn add(&self, left: Value, right: Value) -> Value {
        self.bin(left, "Add", right)
    }

    pub fn sub(&self, left: Value, right: Value) -> Value {
        self.bin(left, "Sub", right)
    }

    pub fn mul(&self, left: Value, right: Value) -> Value {
        self.bin(left, "Mult", right)
    }

    /// `Num(PatVar(id = name))`
    pub fn num_var(&self, name: &str) -> Value {
        self.lang.make("Num", [Value::var(name)]).unwrap()
    }
}
