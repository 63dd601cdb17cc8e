//! A small language of arithmetic expressions: a visitor turning trees back
//! into text, a hand-written simplifying transformer, and the same
//! simplifications expressed as rewrite rules.

use hyast::grammar::{Grammar, constructor, field};
use hyast::prelude::*;

fn grammar() -> Grammar {
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
                constructor("Neg", [field("expr", "value")]),
                constructor("Num", [field("int", "n")]),
                constructor("Var", [field("identifier", "id")]),
            ],
        )
        .sum(
            "operator",
            ["Add", "Sub", "Mult", "Div"].map(|name| constructor(name, Vec::new())),
        )
}

/// Turns a tree back into an expression string.
#[derive(Default)]
struct Unparser {
    out: String,
}

impl Unparser {
    fn run(tree: &Value) -> String {
        let mut unparser = Unparser::default();
        unparser.process(tree);
        unparser.out
    }

    fn field(&mut self, cx: &mut VisitContext, node: &Node, name: &str) {
        if let Some(value) = node.get(name) {
            self.visit(cx, value);
        }
    }
}

impl Visitor for Unparser {
    fn visit_node(&mut self, cx: &mut VisitContext, node: &Node) {
        match node.type_name() {
            "BinOp" => {
                self.out.push('(');
                self.field(cx, node, "left");
                self.out.push(' ');
                self.field(cx, node, "op");
                self.out.push(' ');
                self.field(cx, node, "right");
                self.out.push(')');
            }
            "Neg" => {
                self.out.push_str("-(");
                self.field(cx, node, "value");
                self.out.push(')');
            }
            "Num" => self.generic_visit(cx, node),
            "Var" => self.out.push_str(node.get("id").and_then(Value::as_str).unwrap_or("?")),
            "Add" => self.out.push('+'),
            "Sub" => self.out.push('-'),
            "Mult" => self.out.push('*'),
            "Div" => self.out.push('/'),
            _ => self.generic_visit(cx, node),
        }
    }

    fn visit_leaf(&mut self, _cx: &mut VisitContext, value: &Value) {
        self.out.push_str(&value.to_string());
    }

    fn visit_pattern(&mut self, _cx: &mut VisitContext, pattern: &Pattern) {
        self.out.push_str(pattern.var_name().unwrap_or("_"));
    }
}

/// Cancels double negations and folds away multiplications and additions
/// involving zero.
struct Simplifier<'l> {
    lang: &'l Language,
}

impl Simplifier<'_> {
    fn is_zero(&self, value: Option<&Value>) -> bool {
        value
            .and_then(Value::as_node)
            .is_some_and(|n| n.type_name() == "Num" && n.get("n") == Some(&Value::int(0)))
    }
}

impl Transformer for Simplifier<'_> {
    fn visit_node(&mut self, cx: &mut VisitContext, node: &Node) -> AstResult<Transformed> {
        // Children first.
        let node = self.generic_visit(cx, node)?;
        let op = node.get("op").and_then(Value::type_name);
        let (left, right) = (node.get("left"), node.get("right"));

        let replacement = match node.type_name() {
            "Neg" => match node.get("value") {
                Some(Value::Node(inner)) if inner.type_name() == "Neg" => inner.get("value").cloned(),
                value if self.is_zero(value) => value.cloned(),
                _ => None,
            },
            "BinOp" if op == Some("Mult") && (self.is_zero(left) || self.is_zero(right)) => {
                Some(self.lang.make("Num", [Value::int(0)])?)
            }
            "BinOp" if op == Some("Add") && self.is_zero(left) => right.cloned(),
            "BinOp" if op == Some("Add") && self.is_zero(right) => left.cloned(),
            _ => None,
        };
        Ok(Transformed::Replace(replacement.unwrap_or_else(|| node.into())))
    }
}

fn rules(lang: &Language) -> AstResult<Vec<Rule<'static>>> {
    let (x, zero) = (Value::var("X"), lang.make("Num", [Value::int(0)])?);
    let neg = |value: Value| lang.make("Neg", [value]);
    let bin = |left: Value, op: &str, right: Value| -> AstResult<Value> {
        lang.make("BinOp", [left, lang.make(op, Vec::new())?, right])
    };

    Ok(vec![
        Rule::template(neg(neg(x.clone())?)?, x.clone()).named("double-neg"),
        Rule::template(neg(zero.clone())?, zero.clone()).named("neg-zero"),
        Rule::template(bin(zero.clone(), "Mult", Value::wildcard())?, zero.clone()).named("zero-mult"),
        Rule::template(bin(Value::wildcard(), "Mult", zero.clone())?, zero.clone()).named("mult-zero"),
        Rule::template(bin(zero.clone(), "Add", x.clone())?, x.clone()).named("zero-add"),
        Rule::template(bin(x.clone(), "Add", zero)?, x).named("add-zero"),
    ])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let lang = generate(&grammar(), GeneratorOptions::default().type_checked(true))?;
    let tree = parse(
        &lang,
        "BinOp(BinOp(BinOp(Var(\"x\"), Add(), Num(3)), Mult(), Neg(Num(0))),
               Add(),
               BinOp(Var(\"x\"), Sub(), Neg(Neg(Num(2)))))",
    )?;

    println!("{tree}\n");
    tree.pretty_print()?;
    println!();
    println!("{}\n", Unparser::run(&tree));

    let simplified = Simplifier { lang: &lang }.process(&tree)?;
    println!("{}", Unparser::run(&simplified));

    let rewritten = Rewriter::new(rules(&lang)?).process(&tree)?;
    println!("{}", Unparser::run(&rewritten));
    assert_eq!(rewritten, simplified);
    Ok(())
}
