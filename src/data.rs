use rkyv::{Archive, Serialize};

pub type StringId = u32;
#[allow(dead_code)]
pub type ArchivedStringId = <StringId as Archive>::Archived;

/// Category slugs in archive order. The stored category byte indexes this table.
pub const CATEGORY_SLUGS: [&str; 7] = [
    "civil",
    "penal",
    "trabalho",
    "comercial",
    "constitucional",
    "processual",
    "familiar",
];

const ALIAS_FLAG: u64 = 1;

/// Packs an entry ID and whether the key is an alias into an FST value.
#[allow(dead_code)]
pub const fn encode_key(entry_id: u32, alias: bool) -> u64 {
    ((entry_id as u64) << 1) | if alias { ALIAS_FLAG } else { 0 }
}

#[allow(dead_code)]
pub const fn decode_key(value: u64) -> (u32, bool) {
    ((value >> 1) as u32, value & ALIAS_FLAG == ALIAS_FLAG)
}

/// Lookup form of a term or alias: trimmed and lower-cased char by char.
#[allow(dead_code)]
pub fn normalize_key(value: &str) -> String {
    value.trim().chars().flat_map(char::to_lowercase).collect()
}

#[derive(Archive, Serialize, Debug, Clone, Copy)]
pub struct Range {
    pub start: u32,
    pub len: u32,
}

#[allow(dead_code)]
impl Range {
    pub const fn new(start: u32, len: u32) -> Self {
        Self { start, len }
    }
}

#[derive(Archive, Serialize, Debug)]
pub struct EntryRecord {
    pub entry_id: u32,
    pub term: StringId,
    pub definition: StringId,
    pub category: u8,
    pub examples: Range,
    pub related_terms: Range,
}

#[derive(Archive, Serialize, Debug)]
pub struct PackedStrings {
    pub offsets: Vec<u32>,
    pub lengths: Vec<u32>,
    pub data: Vec<u8>,
}

#[derive(Archive, Serialize, Debug)]
pub struct DataStore {
    pub strings: PackedStrings,
    pub entries: Vec<EntryRecord>,
    pub entry_examples: Vec<StringId>,
    pub entry_related_terms: Vec<StringId>,
}
