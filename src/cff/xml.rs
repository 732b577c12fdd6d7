//! Dump CFF data as a tree of tags.
//!
//! Decoded font sets can describe themselves to any `XmlWriter`. `XmlTextWriter` renders the
//! tree as indented XML text.

use std::fmt;

/// Receives a tree of tags.
///
/// Every `begin_tag` is matched by an `end_tag` with the same name. Text and line breaks may
/// appear anywhere inside a tag.
pub trait XmlWriter {
    fn begin_tag(&mut self, name: &str, attrs: &[(&str, &str)]) -> fmt::Result;

    fn end_tag(&mut self, name: &str) -> fmt::Result;

    fn write_text(&mut self, text: &str) -> fmt::Result;

    fn newline(&mut self) -> fmt::Result;
}

/// An `XmlWriter` that writes indented XML text to `W`.
pub struct XmlTextWriter<W: fmt::Write> {
    out: W,
    depth: usize,
    line_start: bool,
    indent: &'static str,
}

impl<W: fmt::Write> XmlTextWriter<W> {
    pub fn new(out: W) -> Self {
        XmlTextWriter {
            out,
            depth: 0,
            line_start: true,
            indent: "  ",
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_indent(&mut self) -> fmt::Result {
        if self.line_start {
            for _ in 0..self.depth {
                self.out.write_str(self.indent)?;
            }
            self.line_start = false;
        }
        Ok(())
    }
}

impl<W: fmt::Write> XmlWriter for XmlTextWriter<W> {
    fn begin_tag(&mut self, name: &str, attrs: &[(&str, &str)]) -> fmt::Result {
        self.write_indent()?;
        write!(self.out, "<{}", name)?;
        for (key, value) in attrs {
            write!(self.out, " {}=\"", key)?;
            escape(&mut self.out, value)?;
            self.out.write_char('"')?;
        }
        self.out.write_char('>')?;
        self.depth += 1;
        Ok(())
    }

    fn end_tag(&mut self, name: &str) -> fmt::Result {
        self.depth = self.depth.saturating_sub(1);
        self.write_indent()?;
        write!(self.out, "</{}>", name)
    }

    fn write_text(&mut self, text: &str) -> fmt::Result {
        self.write_indent()?;
        escape(&mut self.out, text)
    }

    fn newline(&mut self) -> fmt::Result {
        self.out.write_char('\n')?;
        self.line_start = true;
        Ok(())
    }
}

/// Write `s` to `f` with the XML special characters replaced by entities.
fn escape<W: fmt::Write>(f: &mut W, s: &str) -> fmt::Result {
    let mut last = 0;
    for (i, byte) in s.bytes().enumerate() {
        let entity = match byte {
            b'>' => "&gt;",
            b'<' => "&lt;",
            b'&' => "&amp;",
            b'\'' => "&#39;",
            b'"' => "&quot;",
            _ => continue,
        };
        f.write_str(&s[last..i])?;
        f.write_str(entity)?;
        last = i + 1;
    }
    if last < s.len() {
        f.write_str(&s[last..])?;
    }

    Ok(())
}
