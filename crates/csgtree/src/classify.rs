//! Line classifier for OpenSCAD CSG text.
//!
//! Each line of a `.csg` file is one of:
//! - an operator opening a block: `multmatrix([[1, 0, 0, 5], ...]) {`
//! - a leaf instance statement: `cylinder($fn = 0, h = 2, r1 = 1, r2 = 1);`
//! - a block close: `}`
//! - anything else (blank lines, comments), which has no structural effect.
//!
//! Calls are matched as `<name>(<params>)` followed by optional whitespace and
//! `{` or `;`. `name` is everything before the first `(` and `params` stops at
//! the first `)`. Parameter text with nested parentheses is therefore not
//! delimited correctly; such lines are flagged as malformed and left with
//! whatever the shortest span produced.

/// Structural meaning of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `<name>(<params>) {`
    OperatorOpen {
        /// Operation name, e.g. `union`.
        name: &'a str,
        /// Raw parameter text between the parentheses.
        params: &'a str,
    },
    /// `<name>(<params>);`
    InstanceLeaf {
        /// Primitive name, e.g. `cube`.
        name: &'a str,
        /// Raw parameter text between the parentheses.
        params: &'a str,
    },
    /// Line starting with `}`.
    BlockClose,
    /// No structural effect.
    Other,
}

/// Result of classifying a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    /// Structural meaning.
    pub kind: LineKind<'a>,
    /// The line looks like a call whose parameter span could not be
    /// delimited by the shortest match (nested parentheses).
    pub malformed: bool,
}

impl<'a> Classification<'a> {
    fn clean(kind: LineKind<'a>) -> Self {
        Self {
            kind,
            malformed: false,
        }
    }
}

/// How far the parameter span may extend.
#[derive(Clone, Copy)]
enum Span {
    /// Up to the first `)`.
    Shortest,
    /// Up to the last `)` that is followed by a delimiter.
    Greedy,
}

/// A matched `<name>(<params>)` plus its trailing delimiter.
struct Call<'a> {
    name: &'a str,
    params: &'a str,
    opens_block: bool,
}

impl<'a> Call<'a> {
    fn into_kind(self) -> LineKind<'a> {
        if self.opens_block {
            LineKind::OperatorOpen {
                name: self.name,
                params: self.params,
            }
        } else {
            LineKind::InstanceLeaf {
                name: self.name,
                params: self.params,
            }
        }
    }
}

/// Classify a single line of CSG text.
///
/// Leading and trailing whitespace (including line terminators) is ignored.
/// A line starting with `}` is always a [`LineKind::BlockClose`], whatever
/// follows it.
pub fn classify(line: &str) -> Classification<'_> {
    let line = line.trim();

    if line.starts_with('}') {
        return Classification::clean(LineKind::BlockClose);
    }

    match match_call(line, Span::Shortest) {
        Some(call) => {
            let malformed = call.params.contains('(');
            Classification {
                kind: call.into_kind(),
                malformed,
            }
        }
        None => Classification {
            kind: LineKind::Other,
            malformed: match_call(line, Span::Greedy).is_some(),
        },
    }
}

fn match_call(line: &str, span: Span) -> Option<Call<'_>> {
    let open = line.find('(')?;
    if open == 0 {
        return None;
    }
    let name = &line[..open];
    let rest = &line[open + 1..];

    match span {
        Span::Shortest => delimited(name, rest, rest.find(')')?),
        Span::Greedy => rest
            .rmatch_indices(')')
            .find_map(|(close, _)| delimited(name, rest, close)),
    }
}

/// Accept `rest[..close]` as the parameter span if the `)` at `close` is
/// followed by optional whitespace and a delimiter.
fn delimited<'a>(name: &'a str, rest: &'a str, close: usize) -> Option<Call<'a>> {
    let after = rest[close + 1..].trim_start();
    let opens_block = match after.as_bytes().first()? {
        b'{' => true,
        b';' => false,
        _ => return None,
    };
    Some(Call {
        name,
        params: &rest[..close],
        opens_block,
    })
}
