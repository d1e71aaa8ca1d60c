//! Detection of glossary terms inside free text.
//!
//! Matching is case-insensitive substring search: a key is reported wherever
//! its lower-cased form occurs, even inside a longer word ("dolo" in
//! "dolorido"). [`TermMatcher::find_terms`] reports every occurrence of every
//! key, overlaps included; [`TermMatcher::find_non_overlapping`] keeps the
//! longest match where spans collide.

use crate::{Glossary, GlossaryEntry, normalize_key};
use once_cell::sync::Lazy;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Which kind of glossary key produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    Term,
    Alias,
}

/// An occurrence of a glossary key. `start..end` are byte offsets into the
/// searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan<'t> {
    pub start: usize,
    pub end: usize,
    pub matched_text: &'t str,
    /// The key as written in the glossary.
    pub key: &'static str,
    pub kind: MatchKind,
    pub entry: GlossaryEntry<'static>,
}

impl MatchSpan<'_> {
    pub fn overlaps(&self, other: &MatchSpan<'_>) -> bool {
        self.start < other.end && other.start < self.end
    }

    fn char_len(&self) -> usize {
        self.matched_text.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'t> {
    Plain(&'t str),
    Term(MatchSpan<'t>),
}

impl<'t> Segment<'t> {
    pub fn text(&self) -> &'t str {
        match self {
            Segment::Plain(text) => text,
            Segment::Term(span) => span.matched_text,
        }
    }
}

struct Needle {
    folded: String,
    key: &'static str,
    kind: MatchKind,
    entry: GlossaryEntry<'static>,
}

// Definition order: each entry's term, then its aliases.
static NEEDLES: Lazy<Vec<Needle>> = Lazy::new(|| {
    let mut needles = Vec::new();
    for entry in Glossary::entries() {
        needles.push(Needle {
            folded: normalize_key(entry.term()),
            key: entry.term(),
            kind: MatchKind::Term,
            entry,
        });
        for alias in entry.related_terms() {
            needles.push(Needle {
                folded: normalize_key(alias),
                key: alias,
                kind: MatchKind::Alias,
                entry,
            });
        }
    }
    needles.retain(|needle| !needle.folded.is_empty());
    needles
});

/// Lower-cased copy of a text with a map back to the original byte offsets.
#[derive(Debug, Clone)]
struct FoldedText {
    lowered: String,
    /// `(lowered offset, original offset)` at every original char boundary.
    boundaries: Vec<(usize, usize)>,
}

impl FoldedText {
    fn new(text: &str) -> Self {
        let mut lowered = String::with_capacity(text.len());
        let mut boundaries = Vec::with_capacity(text.len() + 1);
        for (offset, ch) in text.char_indices() {
            boundaries.push((lowered.len(), offset));
            lowered.extend(ch.to_lowercase());
        }
        boundaries.push((lowered.len(), text.len()));
        Self {
            lowered,
            boundaries,
        }
    }

    fn original_offset(&self, lowered_offset: usize) -> Option<usize> {
        self.boundaries
            .binary_search_by_key(&lowered_offset, |&(lowered, _)| lowered)
            .ok()
            .map(|idx| self.boundaries[idx].1)
    }
}

/// Lazy stream of every glossary key occurrence in a text.
///
/// Keys are visited in definition order; occurrences of one key come in
/// ascending offset order. A clone resumes where the original stands; call
/// [`TermMatcher::find_terms`] again to start over.
#[derive(Clone)]
pub struct TermMatches<'t> {
    text: &'t str,
    folded: FoldedText,
    needle: usize,
    cursor: usize,
}

impl<'t> Iterator for TermMatches<'t> {
    type Item = MatchSpan<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let needle = NEEDLES.get(self.needle)?;
            let haystack = &self.folded.lowered[self.cursor..];
            let Some(relative) = haystack.find(needle.folded.as_str()) else {
                self.needle += 1;
                self.cursor = 0;
                continue;
            };
            let lowered_start = self.cursor + relative;
            let lowered_end = lowered_start + needle.folded.len();
            let step = self.folded.lowered[lowered_start..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            self.cursor = lowered_start + step;

            // A hit that starts or ends inside one original char's expansion is not a real match.
            let (Some(start), Some(end)) = (
                self.folded.original_offset(lowered_start),
                self.folded.original_offset(lowered_end),
            ) else {
                continue;
            };
            return Some(MatchSpan {
                start,
                end,
                matched_text: &self.text[start..end],
                key: needle.key,
                kind: needle.kind,
                entry: needle.entry,
            });
        }
    }
}

/// Stateless matcher over the compiled glossary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermMatcher;

impl TermMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Every occurrence of every term and alias, overlaps included.
    pub fn find_terms<'t>(&self, text: &'t str) -> TermMatches<'t> {
        TermMatches {
            text,
            folded: FoldedText::new(text),
            needle: 0,
            cursor: 0,
        }
    }

    /// Non-overlapping spans sorted by position. Where spans collide the
    /// longest wins; ties go to the earliest start, then to primary terms
    /// over aliases, then to definition order.
    pub fn find_non_overlapping<'t>(&self, text: &'t str) -> Vec<MatchSpan<'t>> {
        resolve_overlaps(self.find_terms(text).collect())
    }

    /// Splits `text` into plain runs and resolved term spans. Concatenating
    /// the segment texts yields `text` again.
    pub fn segments<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        segments_from(text, &self.find_non_overlapping(text))
    }

    /// Distinct glossary keys present in `text`, in discovery order.
    pub fn detect(&self, text: &str) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = Vec::new();
        for span in self.find_terms(text) {
            if !keys.contains(&span.key) {
                keys.push(span.key);
            }
        }
        keys
    }
}

/// Applies the [`TermMatcher::find_non_overlapping`] policy to spans that
/// were already collected, e.g. to report both raw and resolved matches
/// from one scan.
pub fn resolve_overlaps(mut candidates: Vec<MatchSpan<'_>>) -> Vec<MatchSpan<'_>> {
    // Stable sort keeps definition order for full ties.
    candidates.sort_by_cached_key(|span| (Reverse(span.char_len()), span.start, span.kind));
    // Accepted spans are disjoint, so only the neighbours around a
    // candidate's start can collide with it.
    let mut accepted: BTreeMap<usize, MatchSpan<'_>> = BTreeMap::new();
    for candidate in candidates {
        let before = accepted.range(..=candidate.start).next_back();
        let after = accepted.range(candidate.start + 1..).next();
        let collides = before
            .into_iter()
            .chain(after)
            .any(|(_, kept)| kept.overlaps(&candidate));
        if !collides {
            accepted.insert(candidate.start, candidate);
        }
    }
    accepted.into_values().collect()
}

/// Splits `text` around `spans`, which must be sorted and disjoint as
/// returned by [`TermMatcher::find_non_overlapping`].
pub fn segments_from<'t>(text: &'t str, spans: &[MatchSpan<'t>]) -> Vec<Segment<'t>> {
    let mut segments = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0;
    for span in spans {
        if span.start > cursor {
            segments.push(Segment::Plain(&text[cursor..span.start]));
        }
        cursor = span.end;
        segments.push(Segment::Term(*span));
    }
    if cursor < text.len() {
        segments.push(Segment::Plain(&text[cursor..]));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<'t>(spans: impl IntoIterator<Item = MatchSpan<'t>>) -> Vec<&'static str> {
        spans.into_iter().map(|span| span.key).collect()
    }

    #[test]
    fn alias_matches_surface_next_to_the_term() {
        let text = "A usucapião exige posse pacífica.";
        let spans: Vec<_> = TermMatcher::new().find_terms(text).collect();
        let term = spans
            .iter()
            .find(|span| span.key == "usucapião")
            .expect("primary term matched");
        let alias = spans
            .iter()
            .find(|span| span.key == "posse")
            .expect("alias matched");
        assert_eq!(term.kind, MatchKind::Term);
        assert_eq!(alias.kind, MatchKind::Alias);
        assert_eq!(alias.entry, term.entry);
        assert_eq!(&text[term.start..term.end], "usucapião");
        assert_eq!(&text[alias.start..alias.end], "posse");
    }

    #[test]
    fn substring_inside_longer_word_still_matches() {
        let spans: Vec<_> = TermMatcher::new()
            .find_terms("Estava dolorido depois da queda.")
            .collect();
        assert_eq!(keys(spans.iter().copied()), vec!["dolo"]);
        assert_eq!(spans[0].matched_text, "dolo");
    }

    #[test]
    fn case_insensitive_with_original_offsets() {
        let text = "Pedido de USUCAPIÃO e Habeas Corpus";
        let spans: Vec<_> = TermMatcher::new().find_terms(text).collect();
        let matched: Vec<_> = spans.iter().map(|span| span.matched_text).collect();
        assert!(matched.contains(&"USUCAPIÃO"));
        assert!(matched.contains(&"Habeas Corpus"));
        for span in &spans {
            assert_eq!(&text[span.start..span.end], span.matched_text);
        }
    }

    #[test]
    fn empty_text_yields_nothing() {
        let matcher = TermMatcher::new();
        assert_eq!(matcher.find_terms("").count(), 0);
        assert_eq!(matcher.find_terms("Bom dia, como está?").count(), 0);
        assert!(matcher.segments("").is_empty());
    }

    #[test]
    fn repeated_occurrences_are_all_reported() {
        let spans: Vec<_> = TermMatcher::new()
            .find_terms("culpa leve, culpa grave, CULPA")
            .collect();
        let starts: Vec<_> = spans.iter().map(|span| span.start).collect();
        assert_eq!(starts, vec![0, 12, 25]);
    }

    #[test]
    fn overlapping_matches_are_kept_by_find_terms() {
        let text = "Agiu em legítima defesa.";
        let found = keys(TermMatcher::new().find_terms(text));
        assert!(found.contains(&"legítima"));
        assert!(found.contains(&"legítima defesa"));
    }

    #[test]
    fn longest_match_wins_when_resolving() {
        let text = "Agiu em legítima defesa.";
        let resolved = TermMatcher::new().find_non_overlapping(text);
        assert_eq!(keys(resolved.iter().copied()), vec!["legítima defesa"]);
        for pair in resolved.windows(2) {
            assert!(!pair[0].overlaps(&pair[1]));
        }
    }

    #[test]
    fn resolved_spans_are_sorted_and_disjoint() {
        let text = "O código penal pune o dolo; a culpa e a legítima defesa também contam.";
        let resolved = TermMatcher::new().find_non_overlapping(text);
        assert_eq!(
            keys(resolved.iter().copied()),
            vec!["código penal", "dolo", "culpa", "legítima defesa"]
        );
        assert!(resolved.windows(2).all(|pair| pair[0].end <= pair[1].start));
    }

    #[test]
    fn segments_rebuild_the_text() {
        let text = "A usucapião exige posse pacífica.";
        let segments = TermMatcher::new().segments(text);
        let rebuilt: String = segments.iter().map(Segment::text).collect();
        assert_eq!(rebuilt, text);
        let terms = segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Term(_)))
            .count();
        assert_eq!(terms, 2);
        assert_eq!(segments.first(), Some(&Segment::Plain("A ")));
    }

    #[test]
    fn resolving_collected_spans_matches_a_fresh_scan() {
        let matcher = TermMatcher::new();
        let text = "Em legítima defesa, o dolo e a culpa; a legítima do herdeiro.";
        let raw: Vec<_> = matcher.find_terms(text).collect();
        let resolved = resolve_overlaps(raw.clone());
        assert_eq!(resolved, matcher.find_non_overlapping(text));
        assert_eq!(segments_from(text, &resolved), matcher.segments(text));
        assert!(raw.len() > resolved.len());
    }

    #[test]
    fn long_repetitive_input_resolves_every_occurrence() {
        let text = "dolo ".repeat(12_000);
        let resolved = TermMatcher::new().find_non_overlapping(&text);
        assert_eq!(resolved.len(), 12_000);
        assert!(resolved.windows(2).all(|pair| pair[0].end <= pair[1].start));
        assert_eq!(resolved.last().map(|span| span.start), Some(5 * 11_999));
    }

    #[test]
    fn span_starting_inside_a_longer_match_is_dropped() {
        let text = "Acusado de crime doloso.";
        let raw = keys(TermMatcher::new().find_terms(text));
        assert!(raw.contains(&"dolo"));
        let resolved = TermMatcher::new().find_non_overlapping(text);
        assert_eq!(keys(resolved.iter().copied()), vec!["crime doloso"]);
        assert_eq!(resolved[0].kind, MatchKind::Alias);
    }

    #[test]
    fn detect_lists_distinct_keys() {
        let found = TermMatcher::new().detect("posse, posse e usucapião");
        assert_eq!(found, vec!["usucapião", "posse"]);
    }

    #[test]
    fn find_terms_is_restartable() {
        let matcher = TermMatcher::new();
        let text = "O acórdão citou jurisprudência.";
        let first: Vec<_> = matcher.find_terms(text).collect();
        let second: Vec<_> = matcher.find_terms(text).collect();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }
}
