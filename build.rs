use std::collections::{BTreeMap, HashMap};
use std::env;
use std::error::Error;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use fst::MapBuilder;
use rkyv::{rancor::Error as RkyvError, to_bytes};
use serde::Deserialize;
use zstd::bulk::compress as zstd_compress;

#[path = "src/data.rs"]
mod data_model;
use data_model::{
    CATEGORY_SLUGS, DataStore, EntryRecord, PackedStrings, Range, StringId, encode_key,
    normalize_key,
};

const ARCHIVE_COMPRESSION_LEVEL: i32 = 9;

fn main() -> Result<(), Box<dyn Error>> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    let entries = load_entries(&manifest_dir)?;
    let keys = collect_keys(&entries)?;
    build_fst(&keys, &out_dir)?;
    build_data_store(entries, &out_dir)?;

    Ok(())
}

#[derive(Debug, Deserialize)]
struct EntryJson {
    term: String,
    definition: String,
    category: String,
    #[serde(default)]
    examples: Vec<String>,
    #[serde(default)]
    related_terms: Vec<String>,
}

fn load_entries(manifest_dir: &Path) -> Result<Vec<EntryJson>, Box<dyn Error>> {
    let glossary_path = manifest_dir.join("data/glossary.jsonl");
    println!("cargo:rerun-if-changed={}", glossary_path.display());
    if !glossary_path.exists() {
        panic!("Missing {}.", glossary_path.display());
    }

    let file = BufReader::new(File::open(&glossary_path)?);
    let mut entries = Vec::new();
    for (line_idx, line_res) in file.lines().enumerate() {
        let line = line_res?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: EntryJson = serde_json::from_str(&line)
            .map_err(|err| format!("Failed to parse JSON line {}: {err}", line_idx + 1))?;
        if entry.term.trim().is_empty() {
            return Err(format!("Empty term on line {}", line_idx + 1).into());
        }
        if category_index(&entry.category).is_none() {
            return Err(format!(
                "Unknown category {:?} on line {}",
                entry.category,
                line_idx + 1
            )
            .into());
        }
        entries.push(entry);
    }
    Ok(entries)
}

fn category_index(slug: &str) -> Option<u8> {
    let slug = slug.trim().to_lowercase();
    CATEGORY_SLUGS
        .iter()
        .position(|candidate| *candidate == slug)
        .map(|idx| idx as u8)
}

/// Builds the key table. Primary terms must be unique and no alias may
/// shadow a primary term; an alias shared by several entries keeps the first.
fn collect_keys(entries: &[EntryJson]) -> Result<BTreeMap<String, u64>, Box<dyn Error>> {
    let mut keys: BTreeMap<String, u64> = BTreeMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        let key = normalize_key(&entry.term);
        if keys.insert(key.clone(), encode_key(idx as u32, false)).is_some() {
            panic!("Duplicate glossary term {key:?}");
        }
    }

    let mut alias_owner: HashMap<String, usize> = HashMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        for alias in &entry.related_terms {
            let key = normalize_key(alias);
            if key.is_empty() {
                return Err(format!("Empty related term on {:?}", entry.term).into());
            }
            if let Some(&owner) = alias_owner.get(&key) {
                if owner != idx {
                    println!(
                        "cargo:warning=related term {key:?} is listed by {:?} and {:?}; keeping {:?}",
                        entries[owner].term, entry.term, entries[owner].term
                    );
                }
                continue;
            }
            if keys.contains_key(&key) {
                panic!(
                    "Related term {key:?} of {:?} collides with a glossary term",
                    entry.term
                );
            }
            keys.insert(key.clone(), encode_key(idx as u32, true));
            alias_owner.insert(key, idx);
        }
    }
    Ok(keys)
}

fn build_fst(keys: &BTreeMap<String, u64>, out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let fst_path = out_dir.join("glossary_keys.fst");
    let writer = BufWriter::new(File::create(&fst_path)?);
    let mut builder = MapBuilder::new(writer)?;
    for (key, value) in keys {
        builder.insert(key, *value)?;
    }
    builder.finish()?;
    println!("cargo:rustc-env=GLOSSARY_FST={}", fst_path.display());
    Ok(())
}

fn build_data_store(entries: Vec<EntryJson>, out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let mut builder = DataBuilder::default();
    for entry in entries {
        builder.add_entry(entry)?;
    }

    let store = builder.finish();
    let bytes = to_bytes::<RkyvError>(&store)
        .map_err(|err| format!("Failed to serialize glossary store: {err}"))?
        .into_vec();
    let compressed = zstd_compress(&bytes, ARCHIVE_COMPRESSION_LEVEL)
        .map_err(|err| format!("Failed to compress glossary store: {err}"))?;

    let data_path = out_dir.join("glossary_data.rkyv");
    fs::write(&data_path, compressed)?;
    println!("cargo:rustc-env=GLOSSARY_DATA={}", data_path.display());
    Ok(())
}

#[derive(Default)]
struct DataBuilder {
    strings: StringTable,
    entries: Vec<EntryRecord>,
    entry_examples: Vec<StringId>,
    entry_related_terms: Vec<StringId>,
}

impl DataBuilder {
    fn add_entry(&mut self, entry: EntryJson) -> Result<(), Box<dyn Error>> {
        let category = category_index(&entry.category)
            .ok_or_else(|| format!("Unknown category {:?}", entry.category))?;
        let entry_id = self.entries.len() as u32;
        let term = self.strings.intern_owned(entry.term.trim().to_string());
        let definition = self.strings.intern_owned(entry.definition);
        let examples = push_strings(
            &mut self.strings,
            &mut self.entry_examples,
            entry.examples.into_iter(),
        );
        let related_terms = push_strings(
            &mut self.strings,
            &mut self.entry_related_terms,
            entry.related_terms.into_iter().map(|alias| alias.trim().to_string()),
        );

        self.entries.push(EntryRecord {
            entry_id,
            term,
            definition,
            category,
            examples,
            related_terms,
        });
        Ok(())
    }

    fn finish(self) -> DataStore {
        DataStore {
            strings: self.strings.into_store(),
            entries: self.entries,
            entry_examples: self.entry_examples,
            entry_related_terms: self.entry_related_terms,
        }
    }
}

#[derive(Default)]
struct StringTable {
    map: HashMap<Box<str>, StringId>,
    offsets: Vec<u32>,
    lengths: Vec<u32>,
    data: Vec<u8>,
}

impl StringTable {
    fn intern_owned(&mut self, value: String) -> StringId {
        if let Some(&id) = self.map.get(value.as_str()) {
            return id;
        }
        let id = self.offsets.len() as u32;
        self.offsets.push(self.data.len() as u32);
        self.lengths.push(value.len() as u32);
        self.data.extend_from_slice(value.as_bytes());
        self.map.insert(value.into_boxed_str(), id);
        id
    }

    fn into_store(self) -> PackedStrings {
        PackedStrings {
            offsets: self.offsets,
            lengths: self.lengths,
            data: self.data,
        }
    }
}

fn push_strings<I>(table: &mut StringTable, target: &mut Vec<StringId>, iter: I) -> Range
where
    I: IntoIterator<Item = String>,
{
    let start = target.len() as u32;
    for value in iter {
        target.push(table.intern_owned(value));
    }
    Range::new(start, target.len() as u32 - start)
}
