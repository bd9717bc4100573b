//! Localization table: numeric text IDs to display strings and back.

use std::collections::HashMap;

use log::debug;
use ludus_data::{LocalizationEntry, TextId};

/// Bidirectional lookup built from one `id^...^text` file.
#[derive(Debug, Clone, Default)]
pub struct LocalizationTable {
    id_to_text: HashMap<TextId, String>,
    /// Trimmed, lower-cased text to every ID carrying it, in file order.
    text_to_ids: HashMap<String, Vec<TextId>>,
}

impl LocalizationTable {
    /// Parse the lookup file. Blank or malformed lines are skipped.
    ///
    /// ```
    /// use ludus_engine::localization::LocalizationTable;
    ///
    /// let table = LocalizationTable::parse("10^0^Slash\n11^x^y^Power Strike\n12^Slash\n");
    /// assert_eq!(table.text(11), Some("Power Strike"));
    /// assert_eq!(table.ids_for("SLASH"), [10, 12]);
    /// ```
    pub fn parse(text: &str) -> Self {
        let mut table = Self::default();
        let mut skipped = 0usize;
        for line in text.lines() {
            let line = line.trim_start_matches('\u{feff}').trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            match parse_entry(line) {
                Some(entry) => table.insert(entry),
                None => skipped += 1,
            }
        }
        debug!(
            "localization table: {} entries, {} lines skipped",
            table.id_to_text.len(),
            skipped
        );
        table
    }

    pub fn insert(&mut self, entry: LocalizationEntry) {
        let ids = self.text_to_ids.entry(entry.text.trim().to_lowercase()).or_default();
        if !ids.contains(&entry.id) {
            ids.push(entry.id);
        }
        self.id_to_text.insert(entry.id, entry.text);
    }

    pub fn text(&self, id: TextId) -> Option<&str> {
        self.id_to_text.get(&id).map(String::as_str)
    }

    /// Every ID whose text equals `text`, ignoring case.
    pub fn ids_for(&self, text: &str) -> &[TextId] {
        self.text_to_ids.get(&text.trim().to_lowercase()).map_or(&[], Vec::as_slice)
    }

    /// Resolve `id`, falling back to `internal_name` when absent or unknown.
    pub fn display_or(&self, id: Option<TextId>, internal_name: &str) -> String {
        id.and_then(|id| self.text(id))
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(internal_name)
            .to_string()
    }

    pub fn len(&self) -> usize {
        self.id_to_text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_text.is_empty()
    }
}

/// The first field is the ID and the last field the text, kept verbatim.
fn parse_entry(line: &str) -> Option<LocalizationEntry> {
    let fields: Vec<&str> = line.split('^').collect();
    if fields.len() < 2 {
        return None;
    }
    let id = fields[0].trim().parse::<TextId>().ok()?;
    let text = fields[fields.len() - 1].to_string();
    Some(LocalizationEntry { id, text })
}
