//! Column-aligned dump of tree values, with termcolor annotations.
//!
//! Role
//! - Convert a [`Value`] into an annotated document: one field or sequence
//!   element per line, continuation lines aligned under the first one.
//! - Render it as a plain string ([`dump`]) or with terminal colors.
//!
//! Layout
//! ```text
//! Sum(operands = (Add(left = 1,
//!                     right = 2),
//!                 Num(n = 3)))
//! ```
//! Singleton sequences keep their trailing comma (`(5,)`), empty ones print
//! `()`. The output is read back by [`parse`](crate::parser::parse).
//!
//! Performance
//! - Building the doc is O(n) in tree size; every separator is a hard line
//!   break, so rendering never backtracks.

use std::borrow::Cow;
use std::io::{self, Write};

use pretty::{DocAllocator, DocBuilder, FmtWrite, RcAllocator, RcDoc, RenderAnnotated};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::value::{Node, Seq, Value};
use crate::variable::Pattern;

/// Styles used to annotate parts of the dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Punct, // commas, `=`
    /// Parentheses are colored by nesting depth so matching pairs share a color.
    Paren(u8),
    TypeName,
    Field,
    Literal,
    Keyword, // None
    Pattern, // PatVar, Wildcard
}

impl Style {
    fn to_color_spec(self) -> ColorSpec {
        let mut s = ColorSpec::new();
        match self {
            Style::Punct => {
                s.set_dimmed(true);
            }
            Style::Paren(depth) => {
                let fg = match depth % 6 {
                    0 => Color::Blue,
                    1 => Color::Green,
                    2 => Color::White,
                    3 => Color::Yellow,
                    4 => Color::Red,
                    _ => Color::Magenta,
                };
                s.set_fg(Some(fg)).set_dimmed(true);
            }
            Style::TypeName => {
                s.set_fg(Some(Color::Magenta));
            }
            Style::Field => {
                s.set_fg(Some(Color::Cyan));
            }
            Style::Literal => {
                s.set_fg(Some(Color::Green));
            }
            Style::Keyword => {
                s.set_fg(Some(Color::Cyan)).set_bold(true);
            }
            Style::Pattern => {
                s.set_fg(Some(Color::Yellow)).set_bold(true);
            }
        }
        s
    }
}

type Doc = DocBuilder<'static, RcAllocator, Style>;

static ALLOC: RcAllocator = RcAllocator;

fn styled(style: Style, s: impl Into<Cow<'static, str>>) -> Doc {
    ALLOC.text(s).annotate(style)
}

fn punct(s: &'static str) -> Doc {
    styled(Style::Punct, s)
}

#[inline]
fn lparen(depth: u8) -> Doc {
    styled(Style::Paren(depth), "(")
}

#[inline]
fn rparen(depth: u8) -> Doc {
    styled(Style::Paren(depth), ")")
}

fn separator() -> Doc {
    punct(",").append(ALLOC.hardline())
}

fn field(name: &str, value: Doc) -> Doc {
    styled(Style::Field, name.to_string())
        .append(punct(" = "))
        .append(value)
}

/// `Name(f1 = v1,\n     f2 = v2)`, continuation lines aligned after the paren.
fn call(name: Doc, fields: Vec<Doc>, depth: u8) -> Doc {
    name.append(lparen(depth))
        .append(ALLOC.intersperse(fields, separator()).align())
        .append(rparen(depth))
}

fn node_doc(node: &Node, depth: u8) -> Doc {
    let fields = node
        .fields()
        .map(|(name, value)| field(name, to_doc_with_depth(value, depth + 1)))
        .collect();
    call(styled(Style::TypeName, node.type_name().to_string()), fields, depth)
}

fn seq_doc(seq: &Seq, depth: u8) -> Doc {
    let items = seq.iter().map(|item| to_doc_with_depth(item, depth + 1));
    let doc = lparen(depth).append(ALLOC.intersperse(items, separator()).align());
    match seq.len() {
        1 => doc.append(punct(",")).append(rparen(depth)),
        _ => doc.append(rparen(depth)),
    }
}

fn pattern_doc(pattern: &Pattern, depth: u8) -> Doc {
    let name = styled(Style::Pattern, pattern.as_metasyntactic().term_name());
    let fields = match pattern {
        Pattern::Var(var) => vec![field(
            "id",
            styled(Style::Literal, format!("{:?}", var.name())),
        )],
        Pattern::Wildcard(_) => Vec::new(),
    };
    call(name, fields, depth)
}

fn to_doc_with_depth(value: &Value, depth: u8) -> Doc {
    match value {
        Value::Node(node) => node_doc(node, depth),
        Value::Seq(seq) => seq_doc(seq, depth),
        Value::Prim(prim) => styled(Style::Literal, prim.to_string()),
        Value::Absent => styled(Style::Keyword, "None"),
        Value::Pattern(pattern) => pattern_doc(pattern, depth),
    }
}

// A writer that maps Style annotations to termcolor ColorSpec on a WriteColor sink.
struct ColorWriter<'w, W: WriteColor + Write> {
    out: &'w mut W,
}

impl<'a, 'w, W: WriteColor + Write> RenderAnnotated<'a, Style> for ColorWriter<'w, W> {
    fn push_annotation(&mut self, ann: &'a Style) -> io::Result<()> {
        self.out.set_color(&ann.to_color_spec())
    }

    fn pop_annotation(&mut self) -> io::Result<()> {
        self.out.reset()
    }
}

impl<'w, W: WriteColor + Write> pretty::Render for ColorWriter<'w, W> {
    type Error = io::Error;

    fn write_str(&mut self, s: &str) -> io::Result<usize> {
        self.out.write_all(s.as_bytes())?;
        Ok(s.len())
    }

    fn write_str_all(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }

    fn fail_doc(&self) -> Self::Error {
        io::Error::other("render failed")
    }
}

/// Layout width handed to the renderer. Every break is hard, so it only
/// matters for documents composed by callers.
const WIDTH: usize = 80;

fn render_to<W: WriteColor + Write>(doc: &RcDoc<'static, Style>, out: &mut W) -> io::Result<()> {
    let mut cw = ColorWriter { out };
    doc.render_raw(WIDTH, &mut cw)
}

/// Multi-line, column-aligned dump of `value`.
pub fn dump(value: &Value) -> String {
    value.pretty_string()
}

/// ======================== Trait impls =========================

/// Dump conveniences for tree values.
pub trait PrettyValue {
    /// Build an RcDoc representation with style annotations.
    fn pretty_doc(&self) -> RcDoc<'static, Style>;

    /// Render with colors to any termcolor writer.
    fn pretty_render_to<W: WriteColor + Write>(&self, out: &mut W) -> io::Result<()> {
        render_to(&self.pretty_doc(), out)
    }

    /// Print to stdout with colors (TTY-aware), followed by a newline.
    fn pretty_print(&self) -> io::Result<()> {
        let stdout = StandardStream::stdout(ColorChoice::Auto);
        let mut stdout = stdout.lock();
        render_to(&self.pretty_doc(), &mut stdout)?;
        writeln!(stdout)
    }

    /// Format into a plain string (no colors).
    fn pretty_string(&self) -> String {
        let mut buf = String::new();
        let _ = self.pretty_doc().render_fmt(WIDTH, &mut buf);
        buf
    }
}

impl PrettyValue for Value {
    #[inline]
    fn pretty_doc(&self) -> RcDoc<'static, Style> {
        to_doc_with_depth(self, 0).into_doc()
    }
}

impl PrettyValue for Node {
    #[inline]
    fn pretty_doc(&self) -> RcDoc<'static, Style> {
        node_doc(self, 0).into_doc()
    }
}

impl PrettyValue for Seq {
    #[inline]
    fn pretty_doc(&self) -> RcDoc<'static, Style> {
        seq_doc(self, 0).into_doc()
    }
}

/// `{:#}` on a [`Value`] writes the multi-line dump.
pub(crate) fn write_dump(value: &Value, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut w = FmtWrite::new(f);
    value.pretty_doc().render_raw(WIDTH, &mut w)
}
