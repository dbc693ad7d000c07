//! Context-aware markup templating.
//!
//! Templates contain literal `%NAME%` placeholders. Each binding carries the
//! context it lands in, so escaping is chosen by the value rather than by the
//! call site:
//!
//! - [`Value::Attr`] for HTML attribute (and text) positions,
//! - [`Value::Js`] for JavaScript string literal positions,
//! - [`Value::Int`] for numeric positions.
//!
//! Rendering is a single pass, so substituted text is never rescanned for
//! placeholders.

use crate::error::{Error, Result};

/// A value bound to a template placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    /// Escaped for an HTML attribute.
    Attr(&'a str),
    /// Encoded as a JavaScript string literal, quotes included.
    Js(&'a str),
    /// Decimal integer.
    Int(i64),
}

impl Value<'_> {
    fn write_to(&self, out: &mut String) {
        match self {
            Value::Attr(s) => out.push_str(&escape_attribute(s)),
            Value::Js(s) => out.push_str(&js_string(s)),
            Value::Int(n) => out.push_str(&n.to_string()),
        }
    }
}

/// A markup template with `%NAME%` placeholders.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    source: &'static str,
}

impl Template {
    /// Wrap a static template source.
    pub const fn new(source: &'static str) -> Self {
        Self { source }
    }

    /// Render the template with the given bindings.
    ///
    /// A `%` that does not open a well-formed placeholder is copied as is.
    /// A well-formed placeholder without a binding is an error.
    pub fn render(&self, bindings: &[(&str, Value<'_>)]) -> Result<String> {
        let src = self.source;
        let mut out = String::with_capacity(src.len() + 64);
        let mut rest = src;

        while let Some(start) = rest.find('%') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];

            match placeholder_name(after) {
                Some(name) => {
                    let (_, value) = bindings
                        .iter()
                        .find(|(key, _)| *key == name)
                        .ok_or_else(|| Error::Template(name.to_string()))?;
                    value.write_to(&mut out);
                    rest = &after[name.len() + 1..];
                }
                None => {
                    out.push('%');
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        Ok(out)
    }
}

/// Name of the placeholder starting right after a `%`, if well-formed.
fn placeholder_name(after: &str) -> Option<&str> {
    let end = after.find(|c: char| !(c.is_ascii_uppercase() || c == '_'))?;
    (end > 0 && after[end..].starts_with('%')).then(|| &after[..end])
}

/// Escape a string for use inside a quoted HTML attribute.
pub fn escape_attribute(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Encode a string as a double-quoted JavaScript string literal.
///
/// The literal is also safe inside an inline `<script>` element: it can
/// never contain `</script>` or an HTML comment opener.
pub fn js_string(s: &str) -> String {
    // JSON string encoding of a &str cannot fail.
    let json = serde_json::Value::String(s.to_owned()).to_string();

    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}
