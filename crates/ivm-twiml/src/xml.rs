//! Minimal XML writer used to serialize verbs.

use std::fmt::Write;

pub(crate) const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Escapes character data for use between tags.
pub(crate) fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes an attribute value for use inside double quotes.
pub(crate) fn escape_attr(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Appends elements to an owned buffer.
#[derive(Debug, Default)]
pub(crate) struct XmlWriter {
    buf: String,
}

impl XmlWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn raw(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    pub(crate) fn text(&mut self, s: &str) {
        self.buf.push_str(&escape_text(s));
    }

    /// Writes `<name attr="v" ...` without closing the tag. Attributes with a
    /// `None` value are skipped.
    fn open_tag(&mut self, name: &str, attrs: &[(&str, Option<String>)]) {
        self.buf.push('<');
        self.buf.push_str(name);
        for (key, value) in attrs {
            if let Some(value) = value {
                // Writing into a String cannot fail.
                let _ = write!(self.buf, " {}=\"{}\"", key, escape_attr(value));
            }
        }
    }

    pub(crate) fn start(&mut self, name: &str, attrs: &[(&str, Option<String>)]) {
        self.open_tag(name, attrs);
        self.buf.push('>');
    }

    pub(crate) fn end(&mut self, name: &str) {
        self.buf.push_str("</");
        self.buf.push_str(name);
        self.buf.push('>');
    }

    pub(crate) fn empty(&mut self, name: &str, attrs: &[(&str, Option<String>)]) {
        self.open_tag(name, attrs);
        self.buf.push_str("/>");
    }

    pub(crate) fn finish(self) -> String {
        self.buf
    }
}
