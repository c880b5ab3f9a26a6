use std::collections::BTreeSet;

use biblatex::{Bibliography, Chunk, Pair, RawBibliography, RawChunk, RawEntry, Spanned};
use tracing::debug;

use crate::error::{BibrankError, Result};
use crate::models::{BibEntry, normalize_journal_name};

/// biblatex name for the journal field, used when `journal` is absent.
const JOURNALTITLE: &str = "journaltitle";

/// Parses BibTeX text into entries, keeping only those with a journal.
///
/// The journal value is normalized with [`normalize_journal_name`]; all other
/// fields keep their exact source text so they can be written back unchanged.
/// Entries sharing a citation key are all kept.
pub fn read_bibtex(bytes: &[u8]) -> Result<Vec<BibEntry>> {
    let content = String::from_utf8_lossy(bytes);
    let raw = RawBibliography::parse(&content).map_err(parse_error)?;

    let mut entries = Vec::new();
    let mut dropped = 0usize;
    for entry in &raw.entries {
        match convert_entry(entry, &raw.abbreviations)? {
            Some(converted) => entries.push(converted),
            None => {
                debug!(key = entry.v.key.v, "dropping bibliography entry without journal");
                dropped += 1;
            }
        }
    }

    debug!(kept = entries.len(), dropped, "read bibliography");
    Ok(entries)
}

/// Serializes entries back into BibTeX text, in order.
///
/// Every record carries the union of the field names used by `entries`;
/// fields an entry lacks are written with an empty value.
pub fn write_bibtex(entries: &[BibEntry]) -> String {
    let columns: BTreeSet<&str> = entries
        .iter()
        .flat_map(|entry| entry.fields.keys().map(String::as_str))
        .collect();

    entries
        .iter()
        .map(|entry| generate_bibtex(entry, &columns))
        .collect::<Vec<_>>()
        .join("\n")
}

fn generate_bibtex(entry: &BibEntry, columns: &BTreeSet<&str>) -> String {
    let entry_type = if entry.entry_type.is_empty() {
        "misc"
    } else {
        entry.entry_type.as_str()
    };
    let mut bib = format!("@{}{{{},\n", entry_type, entry.key);

    let fields = columns
        .iter()
        .map(|&name| {
            let value = entry.get(name).unwrap_or_default();
            // the journal is plain text, everything else is already TeX source
            if name == BibEntry::JOURNAL {
                format!("  {} = {{{}}}", name, escape_bibtex(value))
            } else {
                format!("  {} = {{{}}}", name, value)
            }
        })
        .collect::<Vec<_>>();
    if !fields.is_empty() {
        bib.push_str(&fields.join(",\n"));
        bib.push('\n');
    }

    bib.push_str("}\n");
    bib
}

fn parse_error(err: biblatex::ParseError) -> BibrankError {
    BibrankError::Parse(format!("bibliography: {err}"))
}

fn convert_entry(entry: &Spanned<RawEntry>, abbreviations: &[Pair]) -> Result<Option<BibEntry>> {
    let Some(journal) = journal_name(entry, abbreviations)? else {
        return Ok(None);
    };

    let mut converted = BibEntry::new(entry.v.key.v, entry.v.kind.v.to_lowercase());
    for pair in &entry.v.fields {
        converted.set(pair.key.v, source_text(&pair.value.v, abbreviations));
    }
    converted.set(BibEntry::JOURNAL, journal);
    Ok(Some(converted))
}

/// The normalized journal name of `entry`, with TeX markup resolved.
fn journal_name(entry: &Spanned<RawEntry>, abbreviations: &[Pair]) -> Result<Option<String>> {
    let Some(pair) = [BibEntry::JOURNAL, JOURNALTITLE].into_iter().find_map(|wanted| {
        entry
            .v
            .fields
            .iter()
            .find(|pair| pair.key.v.eq_ignore_ascii_case(wanted))
    }) else {
        return Ok(None);
    };

    // Resolve the one field on its own so other entries cannot fail it.
    let single = RawBibliography {
        preamble: String::new(),
        entries: vec![Spanned::new(
            RawEntry {
                key: entry.v.key.clone(),
                kind: entry.v.kind.clone(),
                fields: vec![pair.clone()],
            },
            entry.span.clone(),
        )],
        abbreviations: abbreviations.to_vec(),
    };
    let resolved = Bibliography::from_raw(single).map_err(parse_error)?;

    let journal = resolved
        .iter()
        .flat_map(|resolved| resolved.fields.values())
        .map(|chunks| normalize_journal_name(&plain_text(chunks)))
        .find(|journal| !journal.is_empty());
    Ok(journal)
}

/// Field text with all markup dropped. Used for matching.
fn plain_text(chunks: &[Spanned<Chunk>]) -> String {
    chunks
        .iter()
        .map(|chunk| match &chunk.v {
            Chunk::Normal(s) | Chunk::Verbatim(s) | Chunk::Math(s) => s.as_str(),
        })
        .collect()
}

/// Field text as it appears between the outer delimiters in the source.
///
/// Concatenations and `@string` abbreviations are expanded; an abbreviation
/// with no definition keeps its name.
fn source_text(field: &[Spanned<RawChunk>], abbreviations: &[Pair]) -> String {
    field
        .iter()
        .map(|chunk| match chunk.v {
            RawChunk::Normal(text) => text.to_string(),
            RawChunk::Abbreviation(name) => abbreviations
                .iter()
                .rposition(|pair| pair.key.v.eq_ignore_ascii_case(name))
                .map(|pos| source_text(&abbreviations[pos].value.v, &abbreviations[..pos]))
                .unwrap_or_else(|| name.to_string()),
        })
        .collect()
}

/// Escapes TeX special characters that are not already escaped.
fn escape_bibtex(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    let mut prev = None;
    for ch in s.chars() {
        if matches!(ch, '&' | '%' | '#' | '$' | '_') && prev != Some('\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
        prev = Some(ch);
    }
    escaped
}
