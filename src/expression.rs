//! Free-parameter extraction and label substitution for fit-function expressions
//!
//! Fit functions are written as small arithmetic expressions over the
//! independent variable `x`, e.g. `A*numpy.exp(-k*x) + C`. The free parameters
//! are the identifiers that are neither the independent variable, nor a
//! function or module name (followed by `(` or `.`), nor an attribute
//! (preceded by `.`), nor the exponent letter of a numeric literal.
//!
//! ```
//! use fitgrid::expression::{extract_parameters, substitute_labels};
//!
//! let params = extract_parameters("k1*exp(-k2*x)");
//! assert_eq!(params, vec!["k1", "k2"]);
//!
//! let latex = substitute_labels("A*x + B", &["A", "B"], &["\\alpha", "\\beta"]);
//! assert_eq!(latex, "\\alpha*x + \\beta");
//! ```

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, anychar},
    combinator::{all_consuming, recognize},
    multi::{many0, many1},
    sequence::pair,
    IResult, Parser,
};

/// The identifier treated as the independent variable.
pub const INDEPENDENT_VARIABLE: &str = "x";

/// A parameter occurrence inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamToken<'a> {
    /// Byte offset of the identifier in the expression.
    pub start: usize,
    pub text: &'a str,
}

/// Parse a maximal run of word characters (`[A-Za-z0-9_]+`)
fn word(input: &str) -> IResult<&str, &str> {
    recognize(many1(alt((alphanumeric1, tag("_"))))).parse(input)
}

/// Parse an identifier: a letter or underscore followed by word characters
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

/// Returns true if `name` is a valid identifier (usable as a function name).
pub fn is_identifier(name: &str) -> bool {
    all_consuming(identifier).parse(name).is_ok()
}

/// Split `expr` into word runs with their byte offsets.
fn word_runs(expr: &str) -> Vec<(usize, &str)> {
    let mut runs = Vec::new();
    let mut rest = expr;
    while !rest.is_empty() {
        let start = expr.len() - rest.len();
        if let Ok((after, run)) = word(rest) {
            runs.push((start, run));
            rest = after;
        } else {
            match anychar::<&str, nom::error::Error<&str>>(rest) {
                Ok((after, _)) => rest = after,
                Err(_) => break,
            }
        }
    }
    runs
}

/// Scan `expr` for parameter occurrences, excluding `variable`.
///
/// Every occurrence is returned, duplicates included, in left-to-right order.
pub fn parameter_tokens<'a>(expr: &'a str, variable: &str) -> Vec<ParamToken<'a>> {
    let bytes = expr.as_bytes();
    let mut tokens = Vec::new();

    for (start, run) in word_runs(expr) {
        let Some(letter) = run.find(|c: char| c.is_ascii_alphabetic()) else {
            continue;
        };
        let end = start + run.len();
        let token_start = start + letter;

        if letter == 0 {
            if start > 0 && bytes[start - 1] == b'.' {
                continue;
            }
        } else if is_exponent(bytes, token_start, end) {
            continue;
        }

        if matches!(bytes.get(end), Some(b'(') | Some(b'.')) {
            continue;
        }

        let text = &expr[token_start..end];
        if text == variable {
            continue;
        }
        tokens.push(ParamToken {
            start: token_start,
            text,
        });
    }

    tokens
}

/// `1e5`, `2E-3`, `4e+1`: a digit, then `e`/`E`, then an optional sign and a digit.
fn is_exponent(bytes: &[u8], letter_at: usize, run_end: usize) -> bool {
    if !matches!(bytes[letter_at], b'e' | b'E') || !bytes[letter_at - 1].is_ascii_digit() {
        return false;
    }
    let next = letter_at + 1;
    if next < run_end {
        return bytes[next].is_ascii_digit();
    }
    matches!(bytes.get(next), Some(b'+') | Some(b'-'))
        && bytes.get(next + 1).is_some_and(u8::is_ascii_digit)
}

/// Extract the distinct free parameters of `expr` in order of first appearance.
pub fn extract_parameters(expr: &str) -> Vec<String> {
    extract_parameters_excluding(expr, INDEPENDENT_VARIABLE)
}

/// Like [`extract_parameters`] with a custom independent variable.
pub fn extract_parameters_excluding(expr: &str, variable: &str) -> Vec<String> {
    let mut params: Vec<String> = Vec::new();
    for token in parameter_tokens(expr, variable) {
        if !params.iter().any(|p| p == token.text) {
            params.push(token.text.to_string());
        }
    }
    params
}

/// Replace every occurrence of `params[i]` in `expr` with `labels[i]`.
///
/// Occurrences are rewritten in a single left-to-right pass; each replacement
/// shifts the offsets of the following ones by its length delta. Parameters
/// without an aligned label are left untouched.
pub fn substitute_labels<P, L>(expr: &str, params: &[P], labels: &[L]) -> String
where
    P: AsRef<str>,
    L: AsRef<str>,
{
    substitute_labels_excluding(expr, params, labels, INDEPENDENT_VARIABLE)
}

/// Like [`substitute_labels`] with a custom independent variable.
pub fn substitute_labels_excluding<P, L>(
    expr: &str,
    params: &[P],
    labels: &[L],
    variable: &str,
) -> String
where
    P: AsRef<str>,
    L: AsRef<str>,
{
    let mut out = expr.to_string();
    let mut offset: isize = 0;

    for token in parameter_tokens(expr, variable) {
        let Some(idx) = params.iter().position(|p| p.as_ref() == token.text) else {
            continue;
        };
        let Some(label) = labels.get(idx).map(AsRef::as_ref) else {
            continue;
        };
        let at = (token.start as isize + offset) as usize;
        out.replace_range(at..at + token.text.len(), label);
        offset += label.len() as isize - token.text.len() as isize;
    }

    out
}
