//! # Paragraph Runs
//!
//! A paragraph is an ordered list of inline runs. A run's offset is the sum of
//! the sizes before it, so edits only ever touch run contents and sizes; no
//! absolute position is stored.
//!
//! The last run always ends with the paragraph terminator (`\n`). It is never
//! matched, deleted or split off, so every paragraph keeps exactly one.

use quire_common::text::{byte_to_utf16, utf16_len, utf16_to_byte};
use quire_common::{
    BulletPreset, EditError, EditResult, MutationLedger, ParagraphStyle, TextStyle,
};
use regex::Regex;
use tracing::debug;

use crate::chain::{ElementChain, ElementId};
use crate::directive::{Directive, TextRange};
use crate::snapshot::{
    person_display, rich_link_display, InlineSnapshot, ParagraphSnapshot, ParagraphStyleSnapshot,
};

/// Text to insert, optionally styled
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: Option<TextStyle>,
}

impl Span {
    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style: Some(style),
        }
    }
}

impl From<&str> for Span {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
            style: None,
        }
    }
}

impl From<String> for Span {
    fn from(text: String) -> Self {
        Self { text, style: None }
    }
}

/// Literal or regex text matcher
#[derive(Debug, Clone)]
pub enum Matcher {
    Literal(String),
    Pattern(Regex),
}

impl Matcher {
    /// Byte range of the first match in `haystack`
    pub fn find(&self, haystack: &str) -> Option<(usize, usize)> {
        match self {
            Matcher::Literal(needle) => haystack
                .find(needle.as_str())
                .map(|start| (start, start + needle.len())),
            Matcher::Pattern(regex) => regex.find(haystack).map(|m| (m.start(), m.end())),
        }
    }
}

impl From<&str> for Matcher {
    fn from(needle: &str) -> Self {
        Matcher::Literal(needle.to_string())
    }
}

impl From<String> for Matcher {
    fn from(needle: String) -> Self {
        Matcher::Literal(needle)
    }
}

impl From<Regex> for Matcher {
    fn from(regex: Regex) -> Self {
        Matcher::Pattern(regex)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum RunKind {
    Text(String),
    Person {
        name: Option<String>,
        email: Option<String>,
    },
    RichLink {
        title: Option<String>,
        uri: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Run {
    kind: RunKind,
    size: usize,
}

impl Run {
    fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            size: utf16_len(&content),
            kind: RunKind::Text(content),
        }
    }

    fn terminator() -> Self {
        Self::text("\n")
    }

    fn is_read_only(&self) -> bool {
        !matches!(self.kind, RunKind::Text(_))
    }

    fn display(&self) -> &str {
        match &self.kind {
            RunKind::Text(content) => content,
            RunKind::Person { name, email } => person_display(name.as_deref(), email.as_deref()),
            RunKind::RichLink { title, uri } => rich_link_display(title.as_deref(), uri.as_deref()),
        }
    }

    /// Text a matcher may see. Read-only runs expose nothing and the
    /// paragraph terminator is excluded.
    fn matchable(&self) -> &str {
        match &self.kind {
            RunKind::Text(content) => content.strip_suffix('\n').unwrap_or(content),
            _ => "",
        }
    }

    fn parse(inline: &InlineSnapshot) -> EditResult<Self> {
        let (Some(start), Some(end)) = (inline.start_index, inline.end_index) else {
            return Err(EditError::structural(
                "inline run must have a start and end index",
            ));
        };
        let size = end
            .checked_sub(start)
            .ok_or_else(|| EditError::structural(format!("inline run ends before it starts ({}..{})", start, end)))?;

        if let Some(person) = &inline.person {
            let props = person.person_properties.clone().unwrap_or_default();
            return Ok(Self {
                kind: RunKind::Person {
                    name: props.name,
                    email: props.email,
                },
                size,
            });
        }

        if let Some(link) = &inline.rich_link {
            let props = link.rich_link_properties.clone().unwrap_or_default();
            return Ok(Self {
                kind: RunKind::RichLink {
                    title: props.title,
                    uri: props.uri,
                },
                size,
            });
        }

        let content = inline
            .text_run
            .as_ref()
            .map(|run| run.content.clone())
            .unwrap_or_default();
        let run = Self::text(content);
        if run.size != size {
            return Err(EditError::structural(format!(
                "text length {} does not match its index range {}..{}",
                run.size, start, end
            )));
        }
        Ok(run)
    }

    /// Split a text run at a UTF-16 offset inside it
    fn split(&self, at: usize) -> EditResult<(Run, Run)> {
        let RunKind::Text(content) = &self.kind else {
            return Err(EditError::read_only("cannot split a person or rich link"));
        };
        let byte = utf16_to_byte(content, at).ok_or_else(|| {
            EditError::structural(format!("offset {} does not fall on a character boundary", at))
        })?;
        Ok((Run::text(&content[..byte]), Run::text(&content[byte..])))
    }
}

/// Inline content of one paragraph element
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Paragraph {
    runs: Vec<Run>,
    style: Option<ParagraphStyleSnapshot>,
}

impl Paragraph {
    pub(crate) fn parse(snapshot: &ParagraphSnapshot, start: usize, end: usize) -> EditResult<Self> {
        let runs = snapshot
            .elements
            .iter()
            .map(Run::parse)
            .collect::<EditResult<Vec<_>>>()?;

        let paragraph = Self {
            runs,
            style: snapshot.paragraph_style.clone(),
        };

        if paragraph.runs.is_empty() {
            return Err(EditError::structural(format!(
                "paragraph at {} has no inline runs",
                start
            )));
        }
        if paragraph.size() != end.saturating_sub(start) {
            return Err(EditError::structural(format!(
                "paragraph runs cover {} units but the paragraph spans {}..{}",
                paragraph.size(),
                start,
                end
            )));
        }
        if !paragraph.runs.last().is_some_and(|run| text_of(run).ends_with('\n')) {
            return Err(EditError::structural(format!(
                "paragraph at {} does not end with a terminator",
                start
            )));
        }

        Ok(paragraph)
    }

    /// Empty paragraph sharing `style`
    pub(crate) fn empty(style: Option<ParagraphStyleSnapshot>) -> Self {
        Self {
            runs: vec![Run::terminator()],
            style,
        }
    }

    pub(crate) fn style_snapshot(&self) -> Option<&ParagraphStyleSnapshot> {
        self.style.as_ref()
    }

    pub(crate) fn size(&self) -> usize {
        self.runs.iter().map(|run| run.size).sum()
    }

    pub(crate) fn text(&self) -> String {
        let text: String = self.runs.iter().map(Run::display).collect();
        match text.strip_suffix('\n') {
            Some(stripped) => stripped.to_string(),
            None => text,
        }
    }

    pub(crate) fn is_heading(&self) -> bool {
        self.style
            .as_ref()
            .and_then(|style| style.heading_id.as_deref())
            .is_some_and(|id| !id.is_empty())
    }

    fn offset_of(&self, index: usize) -> usize {
        self.runs[..index].iter().map(|run| run.size).sum()
    }

    /// First run with a match: `(run index, utf16 start in run, utf16 length)`
    fn locate(&self, matcher: &Matcher) -> Option<(usize, usize, usize)> {
        self.runs.iter().enumerate().find_map(|(index, run)| {
            let text = run.matchable();
            let (start, end) = matcher.find(text)?;
            let offset = byte_to_utf16(text, start);
            Some((index, offset, byte_to_utf16(text, end) - offset))
        })
    }

    /// Replace the first match. `None` when nothing matched.
    pub(crate) fn replace(
        &mut self,
        start: usize,
        matcher: &Matcher,
        spans: Vec<Span>,
    ) -> EditResult<Option<Vec<Directive>>> {
        let Some((index, offset, length)) = self.locate(matcher) else {
            return Ok(None);
        };
        if self.runs[index].is_read_only() {
            return Err(EditError::read_only(format!(
                "cannot replace text inside \"{}\"",
                self.runs[index].display()
            )));
        }

        let relative = self.offset_of(index) + offset;
        let mut directives = Vec::new();

        if length > 0 {
            let (head, rest) = self.runs[index].split(offset)?;
            let (_, tail) = rest.split(length)?;
            let remaining = Run::text(format!("{}{}", text_of(&head), text_of(&tail)));

            directives.push(Directive::DeleteRange {
                range: TextRange::new(start + relative, start + relative + length),
            });

            if remaining.size == 0 {
                self.runs.remove(index);
            } else {
                self.runs[index] = remaining;
            }
        }

        directives.extend(self.insert(start, relative, spans)?);
        Ok(Some(directives))
    }

    /// Remove everything but the terminator, then insert `spans`
    pub(crate) fn replace_all(&mut self, start: usize, spans: Vec<Span>) -> EditResult<Vec<Directive>> {
        let size = self.size();
        let mut directives = Vec::new();

        if size > 1 {
            if let Some(run) = self.runs[..self.runs.len() - 1].iter().find(|run| run.is_read_only()) {
                return Err(EditError::read_only(format!(
                    "cannot replace text inside \"{}\"",
                    run.display()
                )));
            }
            directives.push(Directive::DeleteRange {
                range: TextRange::new(start, start + size - 1),
            });
        }

        self.runs = vec![Run::terminator()];
        directives.extend(self.insert(start, 0, spans)?);
        Ok(directives)
    }

    /// Insert spans at a paragraph-relative offset.
    ///
    /// Text directives come first, in order, followed by style directives.
    pub(crate) fn insert(&mut self, start: usize, offset: usize, spans: Vec<Span>) -> EditResult<Vec<Directive>> {
        let size = self.size();
        let offset = if offset >= size {
            debug!(offset, size, "Clamping insert offset to before the terminator");
            size.saturating_sub(1)
        } else {
            offset
        };

        let mut index = 0;
        let mut run_offset = 0;
        while index < self.runs.len() && run_offset + self.runs[index].size <= offset {
            run_offset += self.runs[index].size;
            index += 1;
        }

        if run_offset != offset {
            let (head, tail) = self.runs[index].split(offset - run_offset)?;
            self.runs.splice(index..=index, [head, tail]);
            index += 1;
        }

        let mut texts = Vec::new();
        let mut styles = Vec::new();
        let mut cursor = offset;

        for span in spans.into_iter().filter(|span| !span.text.is_empty()) {
            let run = Run::text(span.text);
            let end = cursor + run.size;

            texts.push(Directive::InsertText {
                at: start + cursor,
                text: text_of(&run).to_string(),
            });
            if let Some(style) = span.style.filter(|style| !style.is_empty()) {
                styles.push(Directive::SetTextStyle {
                    range: TextRange::new(start + cursor, start + end),
                    style,
                });
            }

            self.runs.insert(index, run);
            index += 1;
            cursor = end;
        }

        texts.extend(styles);
        Ok(texts)
    }

    pub(crate) fn append(&mut self, start: usize, spans: Vec<Span>) -> EditResult<Vec<Directive>> {
        let offset = self.size().saturating_sub(1);
        self.insert(start, offset, spans)
    }
}

fn text_of(run: &Run) -> &str {
    match &run.kind {
        RunKind::Text(content) => content,
        _ => "",
    }
}

/// Mutable handle on one paragraph of a loaded document
pub struct ParagraphMut<'a> {
    pub(crate) chain: &'a mut ElementChain,
    pub(crate) ledger: &'a mut MutationLedger<Directive>,
    pub(crate) index: usize,
}

impl<'a> ParagraphMut<'a> {
    pub fn id(&self) -> ElementId {
        self.chain.id_of(self.index)
    }

    pub fn start(&self) -> usize {
        self.chain.start(self.index)
    }

    pub fn end(&self) -> usize {
        self.chain.end(self.index)
    }

    /// Concatenated run text without the trailing terminator
    pub fn text(&self) -> String {
        self.chain.view(self.index).text()
    }

    pub fn is_heading(&self) -> bool {
        self.chain.view(self.index).is_heading()
    }

    pub fn matches(&self, matcher: impl Into<Matcher>) -> bool {
        matcher.into().find(&self.text()).is_some()
    }

    /// The matched substring of the paragraph's text, if any
    pub fn find_match(&self, matcher: impl Into<Matcher>) -> Option<String> {
        let text = self.text();
        matcher
            .into()
            .find(&text)
            .map(|(start, end)| text[start..end].to_string())
    }

    /// Apply an edit to the paragraph and keep the element size in step
    fn edit<R>(
        &mut self,
        f: impl FnOnce(&mut Paragraph, usize) -> EditResult<R>,
    ) -> EditResult<R> {
        let start = self.chain.start(self.index);
        let paragraph = self.chain.paragraph_mut(self.index)?;
        let result = f(paragraph, start)?;
        let size = paragraph.size();
        self.chain.set_size(self.index, size);
        Ok(result)
    }

    /// Replace the first match with `spans`. Returns whether anything changed.
    pub fn replace<I>(&mut self, matcher: impl Into<Matcher>, spans: I) -> EditResult<bool>
    where
        I: IntoIterator,
        I::Item: Into<Span>,
    {
        let matcher = matcher.into();
        let spans = collect(spans);
        let Some(directives) = self.edit(|p, start| p.replace(start, &matcher, spans))? else {
            return Ok(false);
        };
        let changed = !directives.is_empty();
        self.ledger.extend(directives);
        Ok(changed)
    }

    /// Replace every unit but the terminator with `spans`
    pub fn replace_all<I>(&mut self, spans: I) -> EditResult<()>
    where
        I: IntoIterator,
        I::Item: Into<Span>,
    {
        let spans = collect(spans);
        let directives = self.edit(|p, start| p.replace_all(start, spans))?;
        self.ledger.extend(directives);
        Ok(())
    }

    /// Insert spans at a paragraph-relative offset
    pub fn insert<I>(&mut self, offset: usize, spans: I) -> EditResult<()>
    where
        I: IntoIterator,
        I::Item: Into<Span>,
    {
        let spans = collect(spans);
        let directives = self.edit(|p, start| p.insert(start, offset, spans))?;
        self.ledger.extend(directives);
        Ok(())
    }

    /// Insert spans just before the terminator
    pub fn append<I>(&mut self, spans: I) -> EditResult<()>
    where
        I: IntoIterator,
        I::Item: Into<Span>,
    {
        let spans = collect(spans);
        let directives = self.edit(|p, start| p.append(start, spans))?;
        self.ledger.extend(directives);
        Ok(())
    }

    /// Start a new paragraph right after this one, with the same paragraph
    /// style so lists continue, and fill it with `spans`.
    pub fn insert_paragraph<I>(&mut self, spans: I) -> EditResult<ElementId>
    where
        I: IntoIterator,
        I::Item: Into<Span>,
    {
        let spans = collect(spans);
        let end = self.chain.end(self.index);
        let style = self.chain.paragraph_mut(self.index)?.style_snapshot().cloned();

        self.ledger.request(Directive::InsertText {
            at: end.saturating_sub(1),
            text: "\n".to_string(),
        });

        let index = self.chain.insert_paragraph_after(self.index, Paragraph::empty(style))?;
        let mut next = ParagraphMut {
            chain: &mut *self.chain,
            ledger: &mut *self.ledger,
            index,
        };
        next.append(spans)?;
        Ok(next.id())
    }

    /// Style characters `[start, end)` of the paragraph; defaults to all of it
    pub fn style_text(&mut self, style: TextStyle, start: Option<usize>, end: Option<usize>) {
        if style.is_empty() {
            return;
        }
        let base = self.start();
        let size = self.end() - base;
        self.ledger.request(Directive::SetTextStyle {
            range: TextRange::new(base + start.unwrap_or(0), base + end.unwrap_or(size)),
            style,
        });
    }

    pub fn style(&mut self, style: ParagraphStyle) {
        if style.is_empty() {
            return;
        }
        let range = TextRange::new(self.start(), self.end());
        self.ledger.request(Directive::SetParagraphStyle { range, style });
    }

    /// Turn the paragraph into a list item
    pub fn bullet(&mut self, preset: BulletPreset) {
        let range = TextRange::new(self.start(), self.end().saturating_sub(1));
        self.ledger.request(Directive::CreateBullets { range, preset });
    }
}

fn collect<I>(spans: I) -> Vec<Span>
where
    I: IntoIterator,
    I::Item: Into<Span>,
{
    spans.into_iter().map(Into::into).collect()
}
