//! Range-based text editing over a module's original source.
//!
//! [`EditBuffer`] splits the source into chunks at every edit boundary. A
//! chunk keeps its original range, optional replacement content, and the text
//! inserted before (`intro`) and after (`outro`) it. Every position is a byte
//! offset into the original text, so edits never shift one another and the
//! renderer can address nodes by their spans in any order.
//!
//! [`BundleBuffer`] joins the rendered modules of a chunk and is what the
//! output finalisers wrap, indent and trim.

use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt;
use tracing::trace;

/// Editing operations the renderer needs from a text buffer.
///
/// "Left" insertions stick to the text before `index`, "right" insertions to
/// the text after it; this decides which one survives when a neighbouring
/// range is removed.
pub trait SourceEditor {
    fn original(&self) -> &str;
    fn remove(&mut self, start: u32, end: u32);
    /// Replace `start..end`. Text inserted at the two boundaries is kept.
    fn overwrite(&mut self, start: u32, end: u32, content: &str);
    fn append_left(&mut self, index: u32, content: &str);
    fn prepend_left(&mut self, index: u32, content: &str);
    fn append_right(&mut self, index: u32, content: &str);
    fn prepend_right(&mut self, index: u32, content: &str);
    /// Record a position the source map collaborator should map exactly.
    fn add_anchor(&mut self, index: u32);
    /// Keep `start..end` (a template literal) out of re-indentation.
    fn exclude_from_indent(&mut self, _start: u32, _end: u32) {}
}

#[derive(Clone, Debug)]
struct Chunk {
    start: u32,
    end: u32,
    intro: String,
    outro: String,
    /// Replacement text; `None` while the original text is untouched.
    content: Option<String>,
}

impl Chunk {
    const fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end,
            intro: String::new(),
            outro: String::new(),
            content: None,
        }
    }

    const fn is_edited(&self) -> bool {
        self.content.is_some()
    }

    fn text<'t>(&'t self, original: &'t str) -> &'t str {
        match &self.content {
            Some(content) => content,
            None => &original[self.start as usize..self.end as usize],
        }
    }

    fn clear(&mut self) {
        self.intro.clear();
        self.outro.clear();
        self.content = Some(String::new());
    }
}

#[derive(Clone, Debug)]
pub struct EditBuffer<'a> {
    original: Cow<'a, str>,
    chunks: Vec<Chunk>,
    intro: String,
    outro: String,
    anchors: Vec<u32>,
    indent_exclusions: Vec<(u32, u32)>,
}

impl<'a> EditBuffer<'a> {
    #[must_use]
    pub fn new(original: &'a str) -> Self {
        Self::from_cow(Cow::Borrowed(original))
    }

    #[must_use]
    pub fn from_string(original: String) -> EditBuffer<'static> {
        EditBuffer::from_cow(Cow::Owned(original))
    }

    fn from_cow(original: Cow<'a, str>) -> Self {
        let len = original.len() as u32;
        Self {
            original,
            chunks: vec![Chunk::new(0, len)],
            intro: String::new(),
            outro: String::new(),
            anchors: Vec::new(),
            indent_exclusions: Vec::new(),
        }
    }

    fn len(&self) -> u32 {
        self.original.len() as u32
    }

    /// Make `index` a chunk boundary. Fails inside replaced content.
    fn split(&mut self, index: u32) -> bool {
        if index == 0 || index >= self.len() {
            return true;
        }
        if !self.original.is_char_boundary(index as usize) {
            return false;
        }
        let i = self.chunks.partition_point(|chunk| chunk.end <= index);
        let Some(chunk) = self.chunks.get_mut(i) else {
            return false;
        };
        if chunk.start == index {
            return true;
        }
        if chunk.content.as_deref().is_some_and(|content| !content.is_empty()) {
            trace!(index, "cannot split replaced content");
            return false;
        }
        let mut tail = Chunk::new(index, chunk.end);
        tail.outro = std::mem::take(&mut chunk.outro);
        if chunk.is_edited() {
            tail.content = Some(String::new());
        }
        chunk.end = index;
        self.chunks.insert(i + 1, tail);
        true
    }

    fn starting_at(&self, index: u32) -> Option<usize> {
        let i = self.chunks.partition_point(|chunk| chunk.start < index);
        (self.chunks.get(i)?.start == index && index < self.len()).then_some(i)
    }

    fn ending_at(&self, index: u32) -> Option<usize> {
        let i = self.chunks.partition_point(|chunk| chunk.end < index);
        (self.chunks.get(i)?.end == index && index > 0).then_some(i)
    }

    /// Chunk indices covering `start..end`, after splitting at both ends.
    fn covering(&mut self, start: u32, end: u32) -> Option<std::ops::Range<usize>> {
        let end = end.min(self.len());
        if start >= end || !self.split(start) || !self.split(end) {
            return None;
        }
        let first = self.chunks.partition_point(|chunk| chunk.start < start);
        let last = self.chunks.partition_point(|chunk| chunk.end <= end);
        Some(first..last)
    }

    /// Insert text before everything else.
    pub fn prepend(&mut self, content: &str) {
        self.intro.insert_str(0, content);
    }

    /// Insert text after everything else.
    pub fn append(&mut self, content: &str) {
        self.outro.push_str(content);
    }

    #[must_use]
    pub fn anchors(&self) -> &[u32] {
        &self.anchors
    }

    /// Whether any edit or insertion has been made.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        !self.intro.is_empty()
            || !self.outro.is_empty()
            || self
                .chunks
                .iter()
                .any(|chunk| chunk.is_edited() || !chunk.intro.is_empty() || !chunk.outro.is_empty())
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.to_string().trim().is_empty()
    }

    #[must_use]
    pub fn guess_indent(&self) -> Option<String> {
        guess_indent(&self.original)
    }

    /// Prefix every line start with `indent`, except lines beginning inside
    /// an excluded range. With `indent_start` unset, the first line is left
    /// alone.
    pub fn indent(&mut self, indent: &str, indent_start: bool) {
        if indent.is_empty() {
            return;
        }
        let mut should_indent = indent_start;
        self.intro = indent_inserted(&self.intro, indent, &mut should_indent);
        let original = &self.original;
        let exclusions = &self.indent_exclusions;
        let excluded = |pos: u32| exclusions.iter().any(|&(start, end)| pos >= start && pos < end);
        for chunk in &mut self.chunks {
            chunk.intro = indent_inserted(&chunk.intro, indent, &mut should_indent);
            match &chunk.content {
                Some(content) => {
                    if !excluded(chunk.start) {
                        chunk.content = Some(indent_inserted(content, indent, &mut should_indent));
                    }
                }
                None => {
                    let text = &original[chunk.start as usize..chunk.end as usize];
                    let mut out = String::with_capacity(text.len());
                    let mut changed = false;
                    for (offset, ch) in text.char_indices() {
                        if !excluded(chunk.start + offset as u32) {
                            if ch == '\n' {
                                should_indent = true;
                            } else if ch != '\r' && should_indent {
                                out.push_str(indent);
                                should_indent = false;
                                changed = true;
                            }
                        }
                        out.push(ch);
                    }
                    if changed {
                        chunk.content = Some(out);
                    }
                }
            }
            chunk.outro = indent_inserted(&chunk.outro, indent, &mut should_indent);
        }
        self.outro = indent_inserted(&self.outro, indent, &mut should_indent);
    }

    /// Strip leading whitespace. Returns `true` once non-whitespace text was
    /// reached, `false` when the whole buffer was blank.
    pub fn trim_start(&mut self) -> bool {
        trim_start_in_place(&mut self.intro);
        if !self.intro.is_empty() {
            return true;
        }
        let mut i = 0;
        while i < self.chunks.len() {
            trim_start_in_place(&mut self.chunks[i].intro);
            if !self.chunks[i].intro.is_empty() {
                return true;
            }
            if let Some(content) = self.chunks[i].content.as_mut() {
                trim_start_in_place(content);
                if !content.is_empty() {
                    return true;
                }
            } else {
                let (start, end) = (self.chunks[i].start, self.chunks[i].end);
                let kept = self.original[start as usize..end as usize].trim_start().len() as u32;
                if kept > 0 {
                    let cut = end - kept;
                    if cut > start && self.split(cut) {
                        self.chunks[i].content = Some(String::new());
                    }
                    return true;
                }
                self.chunks[i].content = Some(String::new());
            }
            trim_start_in_place(&mut self.chunks[i].outro);
            if !self.chunks[i].outro.is_empty() {
                return true;
            }
            i += 1;
        }
        trim_start_in_place(&mut self.outro);
        !self.outro.is_empty()
    }

    /// Strip trailing whitespace; see [`EditBuffer::trim_start`].
    pub fn trim_end(&mut self) -> bool {
        trim_end_in_place(&mut self.outro);
        if !self.outro.is_empty() {
            return true;
        }
        let mut i = self.chunks.len();
        while i > 0 {
            i -= 1;
            trim_end_in_place(&mut self.chunks[i].outro);
            if !self.chunks[i].outro.is_empty() {
                return true;
            }
            if let Some(content) = self.chunks[i].content.as_mut() {
                trim_end_in_place(content);
                if !content.is_empty() {
                    return true;
                }
            } else {
                let (start, end) = (self.chunks[i].start, self.chunks[i].end);
                let kept = self.original[start as usize..end as usize].trim_end().len() as u32;
                if kept > 0 {
                    let cut = start + kept;
                    if cut < end && self.split(cut) {
                        self.chunks[i + 1].content = Some(String::new());
                    }
                    return true;
                }
                self.chunks[i].content = Some(String::new());
            }
            trim_end_in_place(&mut self.chunks[i].intro);
            if !self.chunks[i].intro.is_empty() {
                return true;
            }
        }
        trim_end_in_place(&mut self.intro);
        !self.intro.is_empty()
    }

    pub fn trim(&mut self) {
        self.trim_start();
        self.trim_end();
    }
}

impl SourceEditor for EditBuffer<'_> {
    fn original(&self) -> &str {
        &self.original
    }

    fn remove(&mut self, start: u32, end: u32) {
        if let Some(range) = self.covering(start, end) {
            for chunk in &mut self.chunks[range] {
                chunk.clear();
            }
        }
    }

    fn overwrite(&mut self, start: u32, end: u32, content: &str) {
        let Some(range) = self.covering(start, end) else {
            return;
        };
        let (first, last) = (range.start, range.end - 1);
        for i in range {
            let chunk = &mut self.chunks[i];
            if i != first {
                chunk.intro.clear();
            }
            if i != last {
                chunk.outro.clear();
            }
            chunk.content = Some(if i == first { content.to_string() } else { String::new() });
        }
    }

    fn append_left(&mut self, index: u32, content: &str) {
        if !self.split(index) {
            return;
        }
        match self.ending_at(index) {
            Some(i) => self.chunks[i].outro.push_str(content),
            None => self.intro.push_str(content),
        }
    }

    fn prepend_left(&mut self, index: u32, content: &str) {
        if !self.split(index) {
            return;
        }
        match self.ending_at(index) {
            Some(i) => self.chunks[i].outro.insert_str(0, content),
            None => self.intro.insert_str(0, content),
        }
    }

    fn append_right(&mut self, index: u32, content: &str) {
        if !self.split(index) {
            return;
        }
        match self.starting_at(index) {
            Some(i) => self.chunks[i].intro.push_str(content),
            None => self.outro.push_str(content),
        }
    }

    fn prepend_right(&mut self, index: u32, content: &str) {
        if !self.split(index) {
            return;
        }
        match self.starting_at(index) {
            Some(i) => self.chunks[i].intro.insert_str(0, content),
            None => self.outro.insert_str(0, content),
        }
    }

    fn add_anchor(&mut self, index: u32) {
        if let Err(at) = self.anchors.binary_search(&index) {
            self.anchors.insert(at, index);
        }
    }

    fn exclude_from_indent(&mut self, start: u32, end: u32) {
        self.indent_exclusions.push((start, end));
    }
}

impl fmt::Display for EditBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.intro)?;
        for chunk in &self.chunks {
            f.write_str(&chunk.intro)?;
            f.write_str(chunk.text(&self.original))?;
            f.write_str(&chunk.outro)?;
        }
        f.write_str(&self.outro)
    }
}

/// The indentation `text` uses: tabs when at least as many lines start with
/// a tab as with two or more spaces, otherwise the smallest run of leading
/// spaces. `None` without indented lines.
#[must_use]
pub fn guess_indent(text: &str) -> Option<String> {
    let mut tabbed = 0usize;
    let mut spaced = 0usize;
    let mut min_spaces = usize::MAX;
    for line in text.split('\n') {
        if line.starts_with('\t') {
            tabbed += 1;
        } else if line.starts_with("  ") {
            spaced += 1;
            min_spaces = min_spaces.min(line.len() - line.trim_start_matches(' ').len());
        }
    }
    match (tabbed, spaced) {
        (0, 0) => None,
        (t, s) if t >= s => Some(String::from("\t")),
        _ => Some(" ".repeat(min_spaces)),
    }
}

/// The indentation most of `sources` use, `\t` when none is indented.
#[must_use]
pub fn common_indent<'s>(sources: impl IntoIterator<Item = &'s str>) -> String {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for source in sources {
        if let Some(indent) = guess_indent(source) {
            *counts.entry(indent).or_default() += 1;
        }
    }
    let mut best: Option<(&String, usize)> = None;
    for (indent, &count) in &counts {
        if best.is_none_or(|(_, most)| count > most) {
            best = Some((indent, count));
        }
    }
    best.map_or_else(|| String::from("\t"), |(indent, _)| indent.clone())
}

/// Indent the line starts of inserted text. The first line is only indented
/// when the text before it ended a line; later lines always are.
fn indent_inserted(text: &str, indent: &str, should_indent: &mut bool) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(text.len() + indent.len());
    let mut indent_line = *should_indent;
    let mut at_line_start = true;
    for ch in text.chars() {
        if at_line_start && indent_line && ch != '\n' && ch != '\r' {
            out.push_str(indent);
        }
        if ch == '\n' {
            at_line_start = true;
            indent_line = true;
        } else {
            at_line_start = false;
        }
        out.push(ch);
    }
    *should_indent = text.ends_with('\n');
    out
}

fn trim_start_in_place(text: &mut String) {
    let cut = text.len() - text.trim_start().len();
    text.drain(..cut);
}

fn trim_end_in_place(text: &mut String) {
    let kept = text.trim_end().len();
    text.truncate(kept);
}

/// Rendered modules of one chunk, joined by a separator.
#[derive(Debug)]
pub struct BundleBuffer<'a> {
    intro: String,
    separator: &'static str,
    sources: Vec<(EditBuffer<'a>, &'static str)>,
}

impl<'a> BundleBuffer<'a> {
    #[must_use]
    pub fn new(separator: &'static str) -> Self {
        Self {
            intro: String::new(),
            separator,
            sources: Vec::new(),
        }
    }

    pub fn add_source(&mut self, source: EditBuffer<'a>) {
        self.sources.push((source, self.separator));
    }

    /// Append text as a source of its own, joined without a separator.
    pub fn append(&mut self, content: &str) {
        self.sources.push((EditBuffer::from_string(content.to_string()), ""));
    }

    pub fn prepend(&mut self, content: &str) {
        self.intro.insert_str(0, content);
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.intro.trim().is_empty() && self.sources.iter().all(|(source, _)| source.is_blank())
    }

    pub fn indent(&mut self, indent: &str) {
        let mut trailing_newline = self.intro.is_empty() || self.intro.ends_with('\n');
        for (i, (source, separator)) in self.sources.iter_mut().enumerate() {
            let indent_start = trailing_newline || (i > 0 && separator.ends_with('\n'));
            source.indent(indent, indent_start);
            trailing_newline = source.to_string().ends_with('\n');
        }
        if !self.intro.is_empty() {
            let mut should_indent = true;
            self.intro = indent_inserted(&self.intro, indent, &mut should_indent);
        }
    }

    pub fn trim_start(&mut self) {
        trim_start_in_place(&mut self.intro);
        if self.intro.is_empty() {
            for (source, _) in &mut self.sources {
                if source.trim_start() {
                    break;
                }
            }
        }
    }

    pub fn trim_end(&mut self) {
        for (source, _) in self.sources.iter_mut().rev() {
            if source.trim_end() {
                return;
            }
        }
        trim_end_in_place(&mut self.intro);
    }

    pub fn trim(&mut self) {
        self.trim_start();
        self.trim_end();
    }
}

impl fmt::Display for BundleBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.intro)?;
        for (i, (source, separator)) in self.sources.iter().enumerate() {
            if i > 0 {
                f.write_str(separator)?;
            }
            write!(f, "{source}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/edit_buffer.rs"]
mod tests;
