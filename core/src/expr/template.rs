//! Raw SQL templates with positional `{n}` arguments.
//!
//! ```ignore
//! string_template("replace({0}, {1}, {2})", [member.username.into(), "member".into(), "M".into()])
//! ```

use compact_str::CompactString;

use super::Expression;
use crate::error::{QueryError, Result};
use crate::predicate::Predicate;
use crate::types::ScalarKind;

pub fn template<I>(kind: Option<ScalarKind>, fragment: impl Into<CompactString>, args: I) -> Expression
where
    I: IntoIterator,
    I::Item: Into<Expression>,
{
    Expression::Template {
        fragment: fragment.into(),
        args: args.into_iter().map(Into::into).collect(),
        kind,
    }
}

pub fn string_template<I>(fragment: impl Into<CompactString>, args: I) -> Expression
where
    I: IntoIterator,
    I::Item: Into<Expression>,
{
    template(Some(ScalarKind::String), fragment, args)
}

pub fn number_template<I>(fragment: impl Into<CompactString>, args: I) -> Expression
where
    I: IntoIterator,
    I::Item: Into<Expression>,
{
    template(Some(ScalarKind::Decimal), fragment, args)
}

pub fn boolean_template<I>(fragment: impl Into<CompactString>, args: I) -> Predicate
where
    I: IntoIterator,
    I::Item: Into<Expression>,
{
    Predicate::from_boolean(template(Some(ScalarKind::Boolean), fragment, args))
}

/// A piece of a parsed template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TemplatePart<'a> {
    Text(&'a str),
    Arg(usize),
}

/// Splits `fragment` into literal text and argument references.
///
/// `{{` and `}}` escape literal braces.
pub(crate) fn parse_template(fragment: &str, arg_count: usize) -> Result<Vec<TemplatePart<'_>>> {
    let invalid = |reason: String| QueryError::InvalidTemplate {
        fragment: fragment.to_string(),
        reason,
    };

    let mut parts = Vec::new();
    let bytes = fragment.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                parts.push(TemplatePart::Text(&fragment[start..=i]));
                i += 2;
                start = i;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                parts.push(TemplatePart::Text(&fragment[start..=i]));
                i += 2;
                start = i;
            }
            b'{' => {
                let close = fragment[i..]
                    .find('}')
                    .map(|offset| i + offset)
                    .ok_or_else(|| invalid(format!("unclosed placeholder at {i}")))?;
                let index: usize = fragment[i + 1..close]
                    .trim()
                    .parse()
                    .map_err(|_| invalid(format!("placeholder at {i} is not an index")))?;
                if index >= arg_count {
                    return Err(invalid(format!(
                        "placeholder {{{index}}} but only {arg_count} argument(s)"
                    )));
                }
                if start < i {
                    parts.push(TemplatePart::Text(&fragment[start..i]));
                }
                parts.push(TemplatePart::Arg(index));
                i = close + 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        parts.push(TemplatePart::Text(&fragment[start..]));
    }
    Ok(parts)
}
