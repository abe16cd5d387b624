//! Style kinds and their composition.
//!
//! Styles are metadata only: composing them never touches the text. Where
//! several annotations cover the same byte, the one applied last decides
//! each visual attribute, which is why the combined emphasis+strong style is
//! applied after the individual ones.

use std::ops::Range;

use serde::Serialize;

use crate::buffer::Annotation;

/// Closed set of annotations the parser attaches to text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StyleKind {
    Emphasis,
    Strong,
    EmphasisStrong,
    /// Background tint requested by an inline `style` attribute.
    Highlight,
    Underline,
    Spoiler,
    Quote,
    Link { url: Option<String> },
}

/// Font face a run is drawn with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Font {
    #[default]
    Regular,
    Emphasis,
    Strong,
    EmphasisStrong,
}

/// Role deciding a run's text colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Foreground {
    #[default]
    Plain,
    Quote,
    Spoiler,
    Link,
}

/// Visual attributes resolved for one run of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStyle {
    pub font: Font,
    pub foreground: Foreground,
    pub highlight: bool,
    pub underline: bool,
    pub link: Option<String>,
}

impl RunStyle {
    fn apply(&mut self, kind: &StyleKind) {
        match kind {
            StyleKind::Emphasis => self.font = Font::Emphasis,
            StyleKind::Strong => self.font = Font::Strong,
            StyleKind::EmphasisStrong => self.font = Font::EmphasisStrong,
            StyleKind::Highlight => self.highlight = true,
            StyleKind::Underline => self.underline = true,
            StyleKind::Spoiler => self.foreground = Foreground::Spoiler,
            StyleKind::Quote => self.foreground = Foreground::Quote,
            StyleKind::Link { url } => {
                self.foreground = Foreground::Link;
                if let Some(url) = url {
                    self.link = Some(url.clone());
                }
            }
        }
    }
}

/// A maximal byte range sharing one resolved style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub range: Range<usize>,
    pub style: RunStyle,
}

/// Intersections of every emphasis range with every strong range.
///
/// Empty intersections are dropped. The result is ordered by emphasis range
/// first, so swapping the inputs yields the same set in a different order.
#[must_use]
pub fn intersections(emphasis: &[Range<usize>], strong: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    for em in emphasis {
        for st in strong {
            let start = em.start.max(st.start);
            let end = em.end.min(st.end);
            if start < end {
                out.push(start..end);
            }
        }
    }
    out
}

/// Split `0..len` at every annotation boundary and resolve each piece.
///
/// Adjacent pieces with equal styles are merged.
pub(crate) fn flatten_runs(len: usize, annotations: &[Annotation]) -> Vec<TextRun> {
    if len == 0 {
        return Vec::new();
    }
    let mut cuts: Vec<usize> = annotations
        .iter()
        .flat_map(|a| [a.range.start, a.range.end])
        .filter(|&pos| pos < len)
        .chain([0, len])
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut runs: Vec<TextRun> = Vec::new();
    for window in cuts.windows(2) {
        let range = window[0]..window[1];
        let mut style = RunStyle::default();
        for annotation in annotations
            .iter()
            .filter(|a| a.range.start <= range.start && range.end <= a.range.end)
        {
            style.apply(&annotation.style);
        }
        match runs.last_mut() {
            Some(last) if last.style == style => last.range.end = range.end,
            _ => runs.push(TextRun { range, style }),
        }
    }
    runs
}
