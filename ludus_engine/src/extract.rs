//! Record extraction for the line-oriented dataset files.
//!
//! A file is first cut into chunks (blank-line separated, or one chunk per `CREATECLASS:` marker for
//! class definitions), then every line of a chunk is tokenized with the file's line grammar into a
//! [`Record`]. Lines that fail the grammar are skipped and reported as
//! [`Diagnostic::MalformedRecord`]; the rest of the file is still parsed.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use ludus_data::{Diagnostic, Record};

/// Marker that opens every record of the class-definition file.
pub const CLASS_MARKER: &str = "CREATECLASS:";

lazy_static! {
    static ref BLANK_LINE_RUN: Regex = Regex::new(r"\n\s*\n").expect("valid regex");
    static ref CLASS_MARKER_LINE: Regex = Regex::new(r"(?m)^[ \t]*CREATECLASS:").expect("valid regex");
    static ref COLON_LINE: Regex = Regex::new(r"^([A-Za-z][A-Za-z0-9_ ]*?)\s*:\s*(.*?)\s*$").expect("valid regex");
    static ref SPACE_LINE: Regex = Regex::new(r"^([A-Za-z][A-Za-z0-9_]*)(?:\s+(.*?))?\s*$").expect("valid regex");
}

/// How a file is cut into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    BlankLine,
    ClassMarker,
}

/// How a single line is split into key and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineGrammar {
    /// `KEY: value`
    Colon,
    /// `KEY value`
    Space,
}

/// The record-oriented file kinds of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Classes,
    Skills,
    Items,
    Leagues,
    Prizes,
    Roster,
}

impl FileKind {
    pub fn delimiter(self) -> Delimiter {
        match self {
            FileKind::Classes => Delimiter::ClassMarker,
            _ => Delimiter::BlankLine,
        }
    }

    pub fn grammar(self) -> LineGrammar {
        match self {
            FileKind::Leagues | FileKind::Prizes => LineGrammar::Space,
            FileKind::Classes | FileKind::Skills | FileKind::Items | FileKind::Roster => LineGrammar::Colon,
        }
    }
}

/// A chunk of file text and the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub line: usize,
    pub text: String,
}

/// Cut `text` into chunks using `delimiter`. Whitespace-only chunks are dropped.
pub fn split_chunks(text: &str, delimiter: Delimiter) -> Vec<Chunk> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut chunks = Vec::new();
    match delimiter {
        Delimiter::BlankLine => {
            let mut start = 0;
            for sep in BLANK_LINE_RUN.find_iter(text) {
                push_chunk(&mut chunks, text, start, &text[start..sep.start()]);
                start = sep.end();
            }
            push_chunk(&mut chunks, text, start, &text[start..]);
        },
        Delimiter::ClassMarker => {
            let starts: Vec<usize> = CLASS_MARKER_LINE.find_iter(text).map(|m| m.start()).collect();
            let leading_end = starts.first().copied().unwrap_or(text.len());
            push_chunk(&mut chunks, text, 0, &text[..leading_end]);
            // each piece begins at its own marker, so the marker is never lost in the cut
            for (i, &start) in starts.iter().enumerate() {
                let end = starts.get(i + 1).copied().unwrap_or(text.len());
                push_chunk(&mut chunks, text, start, &text[start..end]);
            }
        },
    }
    chunks
}

fn push_chunk(chunks: &mut Vec<Chunk>, whole: &str, offset: usize, piece: &str) {
    if piece.trim().is_empty() {
        return;
    }
    // drop leading blank lines so the text starts on `line`
    let lead = piece.len() - piece.trim_start().len();
    let first_line = piece[..lead].rfind('\n').map_or(0, |newline| newline + 1);
    chunks.push(Chunk {
        line: line_of(whole, offset + first_line),
        text: piece[first_line..].to_string(),
    });
}

fn line_of(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].matches('\n').count() + 1
}

/// True for lines that carry no data: blanks and `//`, `#` or `;` comments.
pub fn is_ignorable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with('#') || trimmed.starts_with(';')
}

/// Split one line into an upper-cased key and an unquoted value.
pub fn tokenize_line(line: &str, grammar: LineGrammar) -> Option<(String, String)> {
    let line = line.trim();
    let caps = match grammar {
        LineGrammar::Colon => COLON_LINE.captures(line)?,
        LineGrammar::Space => SPACE_LINE.captures(line)?,
    };
    let key = caps.get(1)?.as_str().trim().to_uppercase();
    let value = caps.get(2).map_or("", |m| m.as_str());
    Some((key, strip_quotes(value).to_string()))
}

/// Remove one pair of surrounding double quotes, but only when no other quote is inside.
pub fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        let inner = &value[1..value.len() - 1];
        if !inner.contains('"') {
            return inner;
        }
    }
    value
}

/// Split a value on commas into trimmed, unquoted fields.
///
/// ```
/// use ludus_engine::extract::split_fields;
///
/// assert_eq!(split_fields(r#""Bronze Sword", Weapon , 3"#), ["Bronze Sword", "Weapon", "3"]);
/// assert!(split_fields("   ").is_empty());
/// ```
pub fn split_fields(value: &str) -> Vec<String> {
    if value.trim().is_empty() {
        return Vec::new();
    }
    value.split(',').map(|field| strip_quotes(field).to_string()).collect()
}

/// Split a value whose head may be a quoted name: `"Big Bob" 5` gives `("Big Bob", "5")`.
///
/// An unquoted value is taken whole as the head when `comma_tail` is false; otherwise the head ends
/// at the first comma.
pub fn split_quoted_head(value: &str, comma_tail: bool) -> (String, String) {
    let value = value.trim();
    if let Some(rest) = value.strip_prefix('"')
        && let Some(close) = rest.find('"')
    {
        let head = rest[..close].to_string();
        let tail = rest[close + 1..].trim().trim_start_matches(',').trim().to_string();
        return (head, tail);
    }
    if comma_tail && let Some((head, tail)) = value.split_once(',') {
        return (strip_quotes(head).to_string(), tail.trim().to_string());
    }
    (value.to_string(), String::new())
}

/// Parse `text` into records of the given file kind.
///
/// `source` names the file in diagnostics.
pub fn extract_records(text: &str, kind: FileKind, source: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec<Record> {
    let grammar = kind.grammar();
    let mut records = Vec::new();
    for chunk in split_chunks(text, kind.delimiter()) {
        let mut record = Record::new(chunk.line);
        for (offset, line) in chunk.text.lines().enumerate() {
            if is_ignorable(line) {
                continue;
            }
            match tokenize_line(line, grammar) {
                Some((key, value)) => record.push(&key, value),
                None => {
                    let line_no = chunk.line + offset;
                    debug!("{source}:{line_no}: skipping line that is not {grammar:?}-form: {line:?}");
                    diagnostics.push(Diagnostic::MalformedRecord {
                        file: source.to_string(),
                        line: line_no,
                        context: format!("unrecognized line '{}'", line.trim()),
                    });
                },
            }
        }
        if !record.is_empty() {
            records.push(record);
        }
    }
    debug!("{source}: {} records extracted", records.len());
    records
}

/// Parse a numeric field, tolerating surrounding quotes and whitespace.
pub fn parse_number<T: std::str::FromStr>(raw: &str) -> Option<T> {
    strip_quotes(raw).trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKILLS: &str = "SKILLCREATE: \"Slash\"\nSKILLATTRIBUTE: weapon\nSKILLATTRIBUTE: melee\n\n   \n\nSKILLCREATE: \"Bash\"\nSKILLCOSTS: 1, 20\n";

    #[test]
    fn blank_line_runs_separate_records() {
        let mut diags = Vec::new();
        let records = extract_records(SKILLS, FileKind::Skills, "skills.tok", &mut diags);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].first("SKILLCREATE"), Some("Slash"));
        assert_eq!(records[1].first("SKILLCREATE"), Some("Bash"));
        assert_eq!(records[1].line, 7);
        assert!(diags.is_empty());
    }

    #[test]
    fn repeated_attribute_lines_keep_file_order() {
        let mut diags = Vec::new();
        let records = extract_records(SKILLS, FileKind::Skills, "skills.tok", &mut diags);
        assert_eq!(records[0].values("SKILLATTRIBUTE"), ["weapon", "melee"]);
        assert_eq!(records[1].values("SKILLCOSTS"), ["1, 20"]);
    }

    #[test]
    fn class_marker_reprefixes_each_chunk() {
        let text = "// class file\nCREATECLASS: Warrior\nDISPLAYNAMEID: 10\nCREATECLASS: WarriorF\nDISPLAYNAMEID: 11\n";
        let chunks = split_chunks(text, Delimiter::ClassMarker);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[1].text.starts_with("CREATECLASS: Warrior"));
        assert!(chunks[2].text.starts_with("CREATECLASS: WarriorF"));

        let mut diags = Vec::new();
        let records = extract_records(text, FileKind::Classes, "classdefs.tok", &mut diags);
        // the comment-only preamble yields no record
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].first("CREATECLASS"), Some("WarriorF"));
        assert_eq!(records[1].line, 4);
    }

    #[test]
    fn empty_leading_chunk_is_discarded() {
        let chunks = split_chunks("\n\nCREATECLASS: Archer\n", Delimiter::ClassMarker);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].line, 3);
    }

    #[test]
    fn space_grammar_accepts_bare_keys_and_quoted_values() {
        assert_eq!(
            tokenize_line("LEAGUE \"Amateur Cup\"", LineGrammar::Space),
            Some(("LEAGUE".into(), "Amateur Cup".into()))
        );
        assert_eq!(tokenize_line("ENDLEAGUE", LineGrammar::Space), Some(("ENDLEAGUE".into(), String::new())));
        assert_eq!(tokenize_line("12 oops", LineGrammar::Space), None);
    }

    #[test]
    fn colon_grammar_allows_spaces_in_keys() {
        assert_eq!(
            tokenize_line("Stat set: 4", LineGrammar::Colon),
            Some(("STAT SET".into(), "4".into()))
        );
        assert_eq!(tokenize_line("no colon here", LineGrammar::Colon), None);
    }

    #[test]
    fn unmatched_lines_become_diagnostics() {
        let mut diags = Vec::new();
        let records = extract_records("ITEMCREATE: Club\n???\nITEMSKILL: Bonk\n", FileKind::Items, "items.tok", &mut diags);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].first("ITEMSKILL"), Some("Bonk"));
        assert!(matches!(&diags[..], [Diagnostic::MalformedRecord { line: 2, .. }]));
    }

    #[test]
    fn malformed_line_numbers_skip_leading_blank_lines() {
        let mut diags = Vec::new();
        let records = extract_records("\nITEMCREATE: Club\n???\n", FileKind::Items, "items.tok", &mut diags);
        assert_eq!(records[0].line, 2);
        assert!(matches!(&diags[..], [Diagnostic::MalformedRecord { line: 3, .. }]), "{diags:?}");
    }

    #[test]
    fn quotes_are_only_stripped_when_they_wrap_the_value() {
        assert_eq!(strip_quotes("\"Slash\""), "Slash");
        assert_eq!(strip_quotes("\"A\" 3 \"B\""), "\"A\" 3 \"B\"");
        assert_eq!(strip_quotes("\""), "\"");
    }

    #[test]
    fn quoted_head_is_split_from_its_tail() {
        assert_eq!(split_quoted_head("\"Big Bob\" 5 2", false), ("Big Bob".into(), "5 2".into()));
        assert_eq!(split_quoted_head("\"Gold Cup\", 2", true), ("Gold Cup".into(), "2".into()));
        assert_eq!(split_quoted_head("Gold Cup, 2", true), ("Gold Cup".into(), "2".into()));
        assert_eq!(split_quoted_head("Big Bob", false), ("Big Bob".into(), String::new()));
    }
}
