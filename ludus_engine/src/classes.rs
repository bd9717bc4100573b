//! Class registry: class variants from the class-definition file and their canonical names.
//!
//! Class codes in the data carry gender, region and tier suffixes (`WarriorImpF`, `UndeadMeleeExpA`).
//! [`canonicalize`] folds every variant onto its base class so variants can be grouped, listed and
//! matched against the roster.

use std::collections::{BTreeMap, HashSet};

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::Serialize;

use ludus_data::{ClassEntity, Diagnostic, Record, TextId};

use crate::extract::{parse_number, split_fields};
use crate::query::QueryError;
use crate::sanitize::sanitize;
use crate::snapshot::DatasetSnapshot;

const REGION_SUFFIXES: [&str; 6] = ["Imp", "Nor", "Ste", "Exp", "A", "B"];

lazy_static! {
    static ref UNDEAD_MELEE: Regex = Regex::new(r"^UndeadMelee(?:Exp|Imp|Nor|Ste)(?:A|B)F?$").expect("valid regex");
}

/// Fold a variant class code onto its canonical class name.
///
/// The three rewrite rules run in order, each against the output of the previous one, and the pass
/// repeats until nothing changes, so the result is stable under re-application.
///
/// ```
/// use ludus_engine::classes::canonicalize;
///
/// assert_eq!(canonicalize("WarriorImpF"), "Warrior");
/// assert_eq!(canonicalize("UndeadMeleeExpA"), "UndeadMelee");
/// assert_eq!(canonicalize("Warrior"), "Warrior");
/// ```
pub fn canonicalize(code: &str) -> String {
    let mut current = code.trim().to_string();
    loop {
        let next = rewrite_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn rewrite_once(code: &str) -> String {
    let mut value = code.to_string();

    // 1: trailing gender marker
    if let Some(prefix) = value.strip_suffix('F')
        && !prefix.is_empty()
    {
        value = prefix.to_string();
    }

    // 2: region/tier suffix, optionally followed by F
    let base = value.strip_suffix('F').filter(|b| !b.is_empty()).unwrap_or(&value);
    if let Some(prefix) = REGION_SUFFIXES
        .iter()
        .find_map(|suffix| base.strip_suffix(*suffix).filter(|p| !p.is_empty()))
    {
        value = prefix.to_string();
    }

    // 3: undead melee tiers
    if UNDEAD_MELEE.is_match(&value) {
        value = "UndeadMelee".to_string();
    }

    value
}

/// Build one [`ClassEntity`] per `CREATECLASS:` record.
pub fn build_classes(records: &[Record], source: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec<ClassEntity> {
    let mut classes = Vec::with_capacity(records.len());
    for record in records {
        let Some(code) = record.first("CREATECLASS").map(str::trim).filter(|c| !c.is_empty()) else {
            diagnostics.push(Diagnostic::MalformedRecord {
                file: source.to_string(),
                line: record.line,
                context: "class record without a CREATECLASS name".to_string(),
            });
            continue;
        };

        let mut equipment_by_category: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in record.values("ITEMCAT") {
            let fields = split_fields(entry);
            match fields.as_slice() {
                [category, kind, style, ..] if !style.is_empty() => {
                    equipment_by_category
                        .entry(category.clone())
                        .or_default()
                        .push(format!("{kind} ({style})"));
                },
                [category, kind, ..] => {
                    equipment_by_category.entry(category.clone()).or_default().push(kind.clone());
                },
                _ => diagnostics.push(Diagnostic::MalformedRecord {
                    file: source.to_string(),
                    line: record.line,
                    context: format!("class '{code}' ITEMCAT '{entry}' needs a category and a type"),
                }),
            }
        }

        classes.push(ClassEntity {
            variant_code: code.to_string(),
            canonical_name: canonicalize(code),
            display_name_id: text_id(record, "DISPLAYNAMEID", source, diagnostics),
            description_id: text_id(record, "DESCRIPTIONID", source, diagnostics),
            attributes: record.values("CLASSATTRIBUTE").to_vec(),
            equipment_by_category,
        });
    }
    debug!("{source}: {} class variants built", classes.len());
    classes
}

/// Parse an optional localization ID, reporting values that are present but not numeric.
pub(crate) fn text_id(record: &Record, key: &str, source: &str, diagnostics: &mut Vec<Diagnostic>) -> Option<TextId> {
    let raw = record.first(key)?;
    let id = parse_number(raw);
    if id.is_none() {
        diagnostics.push(Diagnostic::MalformedRecord {
            file: source.to_string(),
            line: record.line,
            context: format!("{key} '{raw}' is not a text id"),
        });
    }
    id
}

/// Display view of one variant.
#[derive(Debug, Clone, Serialize)]
pub struct ClassVariant {
    pub variant_code: String,
    pub display_name: String,
}

/// Everything known about one canonical class.
#[derive(Debug, Clone, Serialize)]
pub struct ClassReport {
    pub canonical_name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub variants: Vec<ClassVariant>,
    /// Attributes across all variants, first seen first.
    pub attributes: Vec<String>,
    pub equipment_by_category: BTreeMap<String, Vec<String>>,
    /// Roster units whose class folds onto this class.
    pub roster_units: usize,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassListing {
    pub canonical_name: String,
    pub display_name: String,
}

/// Variants of `canonical_name`, in file order.
fn variants_of<'a>(snapshot: &'a DatasetSnapshot, canonical_name: &str) -> Vec<&'a ClassEntity> {
    snapshot
        .classes
        .iter()
        .filter(|class| class.canonical_name.eq_ignore_ascii_case(canonical_name))
        .collect()
}

/// Display name for a canonical class: the base variant's text if it has one, else any variant's.
fn class_display_name(snapshot: &DatasetSnapshot, canonical_name: &str, variants: &[&ClassEntity]) -> String {
    let base = variants
        .iter()
        .find(|v| v.variant_code.eq_ignore_ascii_case(canonical_name))
        .and_then(|v| v.display_name_id)
        .and_then(|id| snapshot.lookup.text(id));
    base.or_else(|| {
        variants
            .iter()
            .filter_map(|v| v.display_name_id)
            .find_map(|id| snapshot.lookup.text(id))
    })
    .filter(|text| !text.trim().is_empty())
    .unwrap_or(canonical_name)
    .to_string()
}

/// Distinct canonical class names from class definitions and the roster, sorted by display name.
pub fn list_classes(snapshot: &DatasetSnapshot) -> Vec<ClassListing> {
    let mut seen = HashSet::new();
    let mut listings = Vec::new();
    let names = snapshot
        .classes
        .iter()
        .map(|class| class.canonical_name.clone())
        .chain(snapshot.roster.iter().map(|unit| canonicalize(&unit.class_variant)));
    for name in names {
        if name.is_empty() || !seen.insert(name.to_lowercase()) {
            continue;
        }
        let variants = variants_of(snapshot, &name);
        listings.push(ClassListing {
            display_name: class_display_name(snapshot, &name, &variants),
            canonical_name: name,
        });
    }
    listings.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
            .then_with(|| a.canonical_name.cmp(&b.canonical_name))
    });
    listings
}

/// Find the canonical class a user search term refers to.
///
/// Tries the canonical name, the canonical form of the term and any variant code before falling back
/// to the localized display name.
/// When display text matches several classes, the first in file order wins and an
/// [`Diagnostic::AmbiguousReference`] is recorded.
pub fn find_canonical_class(snapshot: &DatasetSnapshot, term: &str, diagnostics: &mut Vec<Diagnostic>) -> Option<String> {
    let term = sanitize(term);
    if term.is_empty() {
        return None;
    }
    let canonical_term = canonicalize(&term);
    let known = list_classes(snapshot);
    for wanted in [&term, &canonical_term] {
        if let Some(hit) = known.iter().find(|c| c.canonical_name.eq_ignore_ascii_case(wanted)) {
            return Some(hit.canonical_name.clone());
        }
    }
    if let Some(variant) = snapshot
        .classes
        .iter()
        .find(|class| class.variant_code.eq_ignore_ascii_case(&term))
    {
        return Some(variant.canonical_name.clone());
    }

    let ids = snapshot.lookup.ids_for(&term);
    let mut matches: Vec<&str> = Vec::new();
    for class in &snapshot.classes {
        if class.display_name_id.is_some_and(|id| ids.contains(&id))
            && !matches.iter().any(|m| m.eq_ignore_ascii_case(&class.canonical_name))
        {
            matches.push(&class.canonical_name);
        }
    }
    // display names of roster-only classes are their canonical names, already covered above
    let chosen = matches.first()?.to_string();
    if matches.len() > 1 {
        diagnostics.push(Diagnostic::AmbiguousReference {
            kind: "class".to_string(),
            name: term,
            chosen: chosen.clone(),
        });
    }
    Some(chosen)
}

/// Resolve a class by name and gather all of its variants.
///
/// # Errors
/// [`QueryError::NotFound`] when no class matches.
pub fn resolve_class(snapshot: &DatasetSnapshot, name: &str) -> Result<ClassReport, QueryError> {
    let mut diagnostics = snapshot.diagnostics.clone();
    let canonical_name = find_canonical_class(snapshot, name, &mut diagnostics).ok_or_else(|| QueryError::NotFound {
        kind: "class",
        name: name.to_string(),
    })?;

    let variants = variants_of(snapshot, &canonical_name);
    let display_name = class_display_name(snapshot, &canonical_name, &variants);
    let description = variants
        .iter()
        .filter_map(|v| v.description_id)
        .find_map(|id| snapshot.lookup.text(id))
        .map(str::to_string);

    let mut attributes: Vec<String> = Vec::new();
    let mut equipment_by_category: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for variant in &variants {
        for attribute in &variant.attributes {
            if !attributes.iter().any(|a| a.eq_ignore_ascii_case(attribute)) {
                attributes.push(attribute.clone());
            }
        }
        for (category, entries) in &variant.equipment_by_category {
            let merged = equipment_by_category.entry(category.clone()).or_default();
            for entry in entries {
                if !merged.contains(entry) {
                    merged.push(entry.clone());
                }
            }
        }
    }

    let roster_units = snapshot
        .roster
        .iter()
        .filter(|unit| canonicalize(&unit.class_variant).eq_ignore_ascii_case(&canonical_name))
        .count();

    Ok(ClassReport {
        variants: variants
            .iter()
            .map(|v| ClassVariant {
                variant_code: v.variant_code.clone(),
                display_name: snapshot.lookup.display_or(v.display_name_id, &v.variant_code),
            })
            .collect(),
        canonical_name,
        display_name,
        description,
        attributes,
        equipment_by_category,
        roster_units,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{FileKind, extract_records};
    use crate::localization::LocalizationTable;
    use crate::sanitize::DatasetId;
    use ludus_data::GladiatorRecord;

    const CLASSDEFS: &str = "\
CREATECLASS: Warrior
DISPLAYNAMEID: 100
DESCRIPTIONID: 101
CLASSATTRIBUTE: Male
CLASSATTRIBUTE: Medium
ITEMCAT: Weapon, Sword, Normal
ITEMCAT: Armor, Chain, Medium
CREATECLASS: WarriorImpF
DISPLAYNAMEID: 102
CLASSATTRIBUTE: Female
CLASSATTRIBUTE: Medium
ITEMCAT: Weapon, Axe
CREATECLASS: Amazon
DISPLAYNAMEID: 103
CREATECLASS: Ronin
DISPLAYNAMEID: 103
ITEMCAT: Shield
";

    fn snapshot() -> DatasetSnapshot {
        let mut diagnostics = Vec::new();
        let records = extract_records(CLASSDEFS, FileKind::Classes, "classdefs.tok", &mut diagnostics);
        let classes = build_classes(&records, "classdefs.tok", &mut diagnostics);
        let mut snapshot = DatasetSnapshot::empty(DatasetId::new("vanilla").unwrap());
        snapshot.lookup = LocalizationTable::parse("100^Warrior\n101^Sword and board.\n102^Warrioress\n103^Spear Maiden\n");
        snapshot.classes = classes;
        snapshot.roster = vec![GladiatorRecord {
            name: "Ghoul".into(),
            class_variant: "UndeadMeleeImpB".into(),
            stat_set_id: 4,
        }];
        snapshot.diagnostics = diagnostics;
        snapshot
    }

    #[test]
    fn canonicalize_examples() {
        assert_eq!(canonicalize("WarriorImpF"), "Warrior");
        assert_eq!(canonicalize("UndeadMeleeExpA"), "UndeadMelee");
        assert_eq!(canonicalize("ArcherF"), "Archer");
        assert_eq!(canonicalize("BanditB"), "Bandit");
        assert_eq!(canonicalize("Minotaur"), "Minotaur");
    }

    #[test]
    fn canonicalize_never_empties_a_code() {
        assert_eq!(canonicalize("F"), "F");
        assert_eq!(canonicalize("Imp"), "Imp");
        assert_eq!(canonicalize("A"), "A");
        assert_eq!(canonicalize("ImpF"), "Imp");
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let codes = [
            "WarriorImpF", "UndeadMeleeExpA", "UndeadMeleeNorBF", "ArcherF", "ArcherFF", "WarriorImpA",
            "GolemSteB", "Dwarf", "ImpImp", "F", "", "Peltast", "SatyrExpF", "CentaurNorA",
        ];
        for code in codes {
            let once = canonicalize(code);
            assert_eq!(canonicalize(&once), once, "not idempotent for {code}");
        }
    }

    #[test]
    fn equipment_and_attributes_are_parsed() {
        let snapshot = snapshot();
        let warrior = &snapshot.classes[0];
        assert_eq!(warrior.attributes, ["Male", "Medium"]);
        assert_eq!(warrior.equipment_by_category["Weapon"], ["Sword (Normal)"]);
        assert_eq!(snapshot.classes[1].canonical_name, "Warrior");
        assert_eq!(snapshot.classes[1].equipment_by_category["Weapon"], ["Axe"]);
        // "ITEMCAT: Shield" has no type
        assert!(
            snapshot
                .diagnostics
                .iter()
                .any(|d| matches!(d, Diagnostic::MalformedRecord { context, .. } if context.contains("Shield")))
        );
    }

    #[test]
    fn resolve_merges_variants() {
        let snapshot = snapshot();
        let report = resolve_class(&snapshot, "warriorimpf").unwrap();
        assert_eq!(report.canonical_name, "Warrior");
        assert_eq!(report.display_name, "Warrior");
        assert_eq!(report.description.as_deref(), Some("Sword and board."));
        assert_eq!(report.variants.len(), 2);
        assert_eq!(report.variants[1].display_name, "Warrioress");
        assert_eq!(report.attributes, ["Male", "Medium", "Female"]);
        assert_eq!(report.equipment_by_category["Weapon"], ["Sword (Normal)", "Axe"]);
    }

    #[test]
    fn ambiguous_display_name_takes_first_in_file_order() {
        let snapshot = snapshot();
        let report = resolve_class(&snapshot, "Spear Maiden").unwrap();
        assert_eq!(report.canonical_name, "Amazon");
        assert!(report.diagnostics.iter().any(
            |d| matches!(d, Diagnostic::AmbiguousReference { kind, chosen, .. } if kind == "class" && chosen == "Amazon")
        ));
    }

    #[test]
    fn roster_only_classes_are_listed_and_resolvable() {
        let snapshot = snapshot();
        let listed: Vec<_> = list_classes(&snapshot)
            .into_iter()
            .map(|c| (c.display_name, c.canonical_name))
            .collect();
        let expected = [
            ("Spear Maiden", "Amazon"),
            ("Spear Maiden", "Ronin"),
            ("UndeadMelee", "UndeadMelee"),
            ("Warrior", "Warrior"),
        ];
        assert_eq!(listed.len(), expected.len());
        for ((display, canonical), (want_display, want_canonical)) in listed.iter().zip(expected) {
            assert_eq!(display, want_display);
            assert_eq!(canonical, want_canonical);
        }

        let report = resolve_class(&snapshot, "UndeadMelee").unwrap();
        assert!(report.variants.is_empty());
        assert_eq!(report.roster_units, 1);
    }

    #[test]
    fn unknown_class_is_not_found() {
        let snapshot = snapshot();
        assert!(matches!(
            resolve_class(&snapshot, "Necromancer"),
            Err(QueryError::NotFound { kind: "class", .. })
        ));
        assert!(resolve_class(&snapshot, "!!!").is_err());
    }
}
