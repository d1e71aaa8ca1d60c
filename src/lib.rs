//! Embedded glossary of Mozambican legal terms.
//!
//! The glossary is compiled into the binary by `build.rs`: an FST maps every
//! normalized term and alias to its entry, and an rkyv archive holds the
//! records. [`TermMatcher`] finds glossary terms in free text and
//! [`TooltipController`] drives the definition popover for a UI session.

mod data;
pub mod matcher;
pub mod tooltip;
#[cfg(feature = "web")]
pub mod web;

use data::{
    ArchivedDataStore, ArchivedEntryRecord, ArchivedPackedStrings, ArchivedRange,
    ArchivedStringId, CATEGORY_SLUGS, decode_key,
};
use fst::Automaton;
use fst::automaton::Str;
use fst::{IntoStreamer, Map, Streamer};
use once_cell::sync::Lazy;
use rkyv::access_unchecked;
use rkyv::util::AlignedVec;
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;
use std::str::{self, FromStr};
use zstd::stream::decode_all;

pub use data::normalize_key;
pub use matcher::{
    MatchKind, MatchSpan, Segment, TermMatcher, TermMatches, resolve_overlaps, segments_from,
};
pub use tooltip::{
    DismissSource, FocusedTerm, Key, ListenerCounter, NoListeners, PanelContent, Point, Position,
    Rect, TooltipConfig, TooltipController, TooltipPanel, TooltipState, Transition, Viewport,
};

static KEY_FST_BYTES: &[u8] = include_bytes!(env!("GLOSSARY_FST"));
static DATA_BYTES: &[u8] = include_bytes!(env!("GLOSSARY_DATA"));

static KEY_MAP: Lazy<Map<&'static [u8]>> =
    Lazy::new(|| Map::new(KEY_FST_BYTES).expect("valid glossary key fst"));
static DATA_SLICE: Lazy<&'static AlignedVec> = Lazy::new(|| {
    let decompressed = decode_all(Cursor::new(DATA_BYTES)).expect("decompress glossary data");
    let mut aligned = AlignedVec::with_capacity(decompressed.len());
    aligned.extend_from_slice(&decompressed);
    Box::leak(Box::new(aligned))
});
static DATA_STORE: Lazy<&'static ArchivedDataStore> =
    Lazy::new(|| unsafe { access_unchecked::<ArchivedDataStore>(DATA_SLICE.as_slice()) });

fn data_store() -> &'static ArchivedDataStore {
    *DATA_STORE
}

/// Area of law an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Civil,
    Penal,
    Trabalho,
    Comercial,
    Constitucional,
    Processual,
    Familiar,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Civil,
        Category::Penal,
        Category::Trabalho,
        Category::Comercial,
        Category::Constitucional,
        Category::Processual,
        Category::Familiar,
    ];

    fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn slug(self) -> &'static str {
        CATEGORY_SLUGS[self as usize]
    }

    /// Portuguese display label.
    pub fn label(self) -> &'static str {
        match self {
            Category::Civil => "Direito Civil",
            Category::Penal => "Direito Penal",
            Category::Trabalho => "Direito do Trabalho",
            Category::Comercial => "Direito Comercial",
            Category::Constitucional => "Direito Constitucional",
            Category::Processual => "Direito Processual",
            Category::Familiar => "Direito da Família",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError(String);

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown category {:?} (expected one of: {})",
            self.0,
            CATEGORY_SLUGS.join(", ")
        )
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let slug = value.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.slug() == slug)
            .ok_or_else(|| ParseCategoryError(value.to_string()))
    }
}

/// Result of resolving a term or alias against the glossary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found(GlossaryEntry<'static>),
    NotFound,
}

impl Lookup {
    pub fn entry(self) -> Option<GlossaryEntry<'static>> {
        match self {
            Lookup::Found(entry) => Some(entry),
            Lookup::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// Tuning for fuzzy suggestions.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Minimum normalized similarity (0.0..=1.0) a key needs to be suggested.
    pub min_score: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { min_score: 0.6 }
    }
}

#[derive(Debug, Clone)]
pub struct Suggestion {
    pub key: String,
    pub entry: GlossaryEntry<'static>,
    pub score: f64,
}

/// Read-only access to the compiled glossary.
pub struct Glossary;

impl Glossary {
    pub fn len() -> usize {
        data_store().entries.len()
    }

    pub fn is_empty() -> bool {
        Self::len() == 0
    }

    /// Resolves a term or one of its aliases, ignoring case and surrounding whitespace.
    pub fn lookup(term: &str) -> Lookup {
        match Self::resolve(term) {
            Some((entry, _)) => Lookup::Found(entry),
            None => Lookup::NotFound,
        }
    }

    pub fn get(term: &str) -> Option<GlossaryEntry<'static>> {
        Self::lookup(term).entry()
    }

    /// Like [`Glossary::lookup`], also reporting whether the alias table was used.
    pub fn resolve(term: &str) -> Option<(GlossaryEntry<'static>, MatchKind)> {
        let key = normalize_key(term);
        if key.is_empty() {
            return None;
        }
        let (entry_id, alias) = decode_key(KEY_MAP.get(&key)?);
        let kind = if alias {
            MatchKind::Alias
        } else {
            MatchKind::Term
        };
        Self::entry_by_id(entry_id).map(|entry| (entry, kind))
    }

    pub fn entry_by_id(entry_id: u32) -> Option<GlossaryEntry<'static>> {
        data_store()
            .entries
            .get(entry_id as usize)
            .map(|record| GlossaryEntry {
                store: data_store(),
                record,
            })
    }

    /// All entries in definition order.
    pub fn entries() -> impl Iterator<Item = GlossaryEntry<'static>> {
        (0..Self::len() as u32).filter_map(Self::entry_by_id)
    }

    pub fn by_category(category: Category) -> impl Iterator<Item = GlossaryEntry<'static>> {
        Self::entries().filter(move |entry| entry.category() == category)
    }

    /// Entries in `category` (or any) whose term, definition or aliases contain `query`.
    pub fn filter(query: &str, category: Option<Category>) -> Vec<GlossaryEntry<'static>> {
        let needle = normalize_key(query);
        Self::entries()
            .filter(|entry| category.is_none_or(|wanted| entry.category() == wanted))
            .filter(|entry| needle.is_empty() || entry.mentions(&needle))
            .collect()
    }

    /// Returns up to `limit` keys (terms or aliases) starting with `prefix`.
    pub fn prefix(prefix: &str, limit: usize) -> Vec<(String, GlossaryEntry<'static>)> {
        let normalized = normalize_key(prefix);
        let automaton = Str::new(&normalized).starts_with();
        let mut stream = KEY_MAP.search(automaton).into_stream();
        let mut results = Vec::new();
        while results.len() < limit {
            let Some((key, value)) = stream.next() else {
                break;
            };
            let (entry_id, _) = decode_key(value);
            if let Some(entry) = Self::entry_by_id(entry_id) {
                results.push((String::from_utf8_lossy(key).into_owned(), entry));
            }
        }
        results
    }

    /// Fuzzy "did you mean" candidates for a query, best first, one per entry.
    pub fn suggest(query: &str, config: &SearchConfig, limit: usize) -> Vec<Suggestion> {
        let needle = normalize_key(query);
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }
        let mut best: HashMap<u32, (String, f64)> = HashMap::new();
        let mut stream = KEY_MAP.stream();
        while let Some((key, value)) = stream.next() {
            let Ok(key) = str::from_utf8(key) else {
                continue;
            };
            let score = rapidfuzz::fuzz::ratio(needle.chars(), key.chars());
            if score < config.min_score {
                continue;
            }
            let (entry_id, _) = decode_key(value);
            let slot = best.entry(entry_id).or_insert_with(|| (key.to_string(), score));
            if score > slot.1 {
                *slot = (key.to_string(), score);
            }
        }
        let mut rows: Vec<Suggestion> = best
            .into_iter()
            .filter_map(|(entry_id, (key, score))| {
                Self::entry_by_id(entry_id).map(|entry| Suggestion { key, entry, score })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.entry.id().cmp(&b.entry.id()))
        });
        rows.truncate(limit);
        rows
    }

    /// Primary terms of [`Glossary::suggest`] rows, for "did you mean" hints.
    pub fn suggest_terms(query: &str, config: &SearchConfig, limit: usize) -> Vec<&'static str> {
        Self::suggest(query, config, limit)
            .into_iter()
            .map(|row| row.entry.term())
            .collect()
    }
}

#[derive(Clone, Copy)]
pub struct GlossaryEntry<'a> {
    store: &'a ArchivedDataStore,
    record: &'a ArchivedEntryRecord,
}

impl<'a> GlossaryEntry<'a> {
    pub fn id(&self) -> u32 {
        self.record.entry_id.to_native()
    }

    pub fn term(&self) -> &'a str {
        self.store.string_from_archived(self.record.term)
    }

    pub fn definition(&self) -> &'a str {
        self.store.string_from_archived(self.record.definition)
    }

    pub fn category(&self) -> Category {
        Category::from_index(self.record.category).unwrap_or(Category::Civil)
    }

    pub fn examples(&self) -> impl Iterator<Item = &'a str> + 'a {
        string_iter(
            self.store,
            &self.record.examples,
            self.store.entry_examples.as_slice(),
        )
    }

    /// Aliases that resolve to this entry.
    pub fn related_terms(&self) -> impl Iterator<Item = &'a str> + 'a {
        string_iter(
            self.store,
            &self.record.related_terms,
            self.store.entry_related_terms.as_slice(),
        )
    }

    fn mentions(&self, needle: &str) -> bool {
        normalize_key(self.term()).contains(needle)
            || normalize_key(self.definition()).contains(needle)
            || self
                .related_terms()
                .any(|alias| normalize_key(alias).contains(needle))
    }
}

impl PartialEq for GlossaryEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for GlossaryEntry<'_> {}

impl fmt::Debug for GlossaryEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlossaryEntry")
            .field("id", &self.id())
            .field("term", &self.term())
            .field("category", &self.category())
            .finish()
    }
}

fn string_iter<'a>(
    store: &'a ArchivedDataStore,
    range: &'a ArchivedRange,
    bucket: &'a [ArchivedStringId],
) -> impl Iterator<Item = &'a str> + 'a {
    let slice = range_slice(bucket, range);
    slice.iter().map(move |id| store.string_from_archived(*id))
}

fn range_slice<'a, T>(data: &'a [T], range: &'a ArchivedRange) -> &'a [T] {
    let start = range.start.to_native() as usize;
    let len = range.len.to_native() as usize;
    &data[start..start + len]
}

trait StoreStrings {
    fn string_from_archived(&self, id: ArchivedStringId) -> &str;
}

impl StoreStrings for ArchivedDataStore {
    fn string_from_archived(&self, id: ArchivedStringId) -> &str {
        self.strings.get(id)
    }
}

impl ArchivedPackedStrings {
    fn get(&self, id: ArchivedStringId) -> &str {
        let idx = id.to_native() as usize;
        let start = self.offsets.as_slice()[idx].to_native() as usize;
        let len = self.lengths.as_slice()[idx].to_native() as usize;
        let data = self.data.as_slice();
        let bytes = &data[start..start + len];
        str::from_utf8(bytes).expect("stored string data is valid UTF-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_term_resolves_in_any_casing() {
        for entry in Glossary::entries() {
            let shouted = format!("  {}\t", entry.term().to_uppercase());
            assert_eq!(Glossary::lookup(entry.term()), Lookup::Found(entry));
            assert_eq!(Glossary::lookup(&shouted), Lookup::Found(entry));
        }
    }

    #[test]
    fn aliases_resolve_to_their_entry() {
        for entry in Glossary::entries() {
            for alias in entry.related_terms() {
                let found = Glossary::get(alias).expect("alias resolves");
                assert_eq!(found, entry, "alias {alias:?}");
                let (_, kind) = Glossary::resolve(alias).expect("alias resolves");
                assert_eq!(kind, MatchKind::Alias);
            }
        }
    }

    #[test]
    fn unknown_terms_are_not_found() {
        assert_eq!(Glossary::lookup("contrato de arrendamento"), Lookup::NotFound);
        assert_eq!(Glossary::lookup(""), Lookup::NotFound);
        assert_eq!(Glossary::lookup("   "), Lookup::NotFound);
        assert!(!Glossary::lookup("dolorido").is_found());
    }

    #[test]
    fn usucapiao_has_posse_alias() {
        let entry = Glossary::get("Usucapião").expect("usucapião present");
        assert_eq!(entry.category(), Category::Civil);
        let aliases: Vec<_> = entry.related_terms().collect();
        assert_eq!(aliases, vec!["posse", "prescrição aquisitiva"]);
        assert_eq!(Glossary::get("POSSE"), Some(entry));
        assert!(entry.examples().count() >= 1);
    }

    #[test]
    fn entries_follow_definition_order() {
        let ids: Vec<u32> = Glossary::entries().map(|entry| entry.id()).collect();
        assert_eq!(ids, (0..Glossary::len() as u32).collect::<Vec<_>>());
        assert!(!Glossary::is_empty());
        assert!(Glossary::len() < 40);
    }

    #[test]
    fn every_category_has_entries() {
        for category in Category::ALL {
            let entries: Vec<_> = Glossary::by_category(category).collect();
            assert!(!entries.is_empty(), "{category:?} is empty");
            assert!(entries.iter().all(|entry| entry.category() == category));
        }
    }

    #[test]
    fn category_slugs_parse_back() {
        for category in Category::ALL {
            assert_eq!(category.slug().parse::<Category>(), Ok(category));
            assert_eq!(category.slug().to_uppercase().parse::<Category>(), Ok(category));
        }
        assert_eq!(Category::Familiar.label(), "Direito da Família");
        assert_eq!(Category::Trabalho.to_string(), "Direito do Trabalho");
        assert!("administrativo".parse::<Category>().is_err());
    }

    #[test]
    fn filter_matches_term_definition_and_alias() {
        let by_alias = Glossary::filter("insolvência", None);
        assert_eq!(by_alias.len(), 1);
        assert_eq!(by_alias[0].term(), "falência");

        let by_definition = Glossary::filter("SINDICATOS", None);
        assert!(by_definition.iter().any(|entry| entry.term() == "acordo coletivo"));

        let penal_only = Glossary::filter("", Some(Category::Penal));
        assert_eq!(
            penal_only.len(),
            Glossary::by_category(Category::Penal).count()
        );

        assert!(Glossary::filter("dolo", Some(Category::Familiar)).is_empty());
        assert_eq!(Glossary::filter("", None).len(), Glossary::len());
    }

    #[test]
    fn prefix_lists_terms_and_aliases() {
        let rows = Glossary::prefix("Código", 10);
        let keys: Vec<_> = rows.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["código civil", "código penal"]);

        let limited = Glossary::prefix("p", 2);
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn suggest_recovers_misspelled_terms() {
        let rows = Glossary::suggest("usucapiao", &SearchConfig::default(), 3);
        assert_eq!(rows.first().map(|row| row.entry.term()), Some("usucapião"));
        assert!(rows.windows(2).all(|pair| pair[0].score >= pair[1].score));
        assert!(Glossary::suggest("", &SearchConfig::default(), 3).is_empty());
    }

    #[test]
    fn suggested_terms_name_the_entry_not_the_alias() {
        let rows = Glossary::suggest("posee", &SearchConfig::default(), 3);
        assert_eq!(rows.first().map(|row| row.key.as_str()), Some("posse"));
        let terms = Glossary::suggest_terms("posee", &SearchConfig::default(), 3);
        assert_eq!(terms.first(), Some(&"usucapião"));
        assert!(!terms.contains(&"posse"));
    }
}
