//! Roster and recruitment: which units exist, where they can be hired, and which stat set
//! represents a class.

use std::collections::HashSet;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use ludus_data::{Diagnostic, GladiatorRecord, MAX_LEVEL, RecruitDeclaration, STAT_COUNT, StatSet};

use crate::classes::{canonicalize, find_canonical_class};
use crate::extract::{Delimiter, FileKind, extract_records, is_ignorable, parse_number, split_chunks};
use crate::query::QueryError;
use crate::snapshot::DatasetSnapshot;

lazy_static! {
    static ref STAT_SET_HEADER: Regex = Regex::new(r"(?i)^statset\s+(\d+)\s*:?$").expect("valid regex");
    static ref STAT_ROW: Regex = Regex::new(r"^(\d+)\s*:\s*(.*)$").expect("valid regex");
}

/// How a class's representative stat set is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatSetMode {
    /// The stat set referenced by the most units of the class.
    #[default]
    MostCommon,
    /// The stat set with the highest mean of its level-30 stats.
    BestAverage,
}

/// Parse the roster file: one `Name:` / `Class:` / `Stat set:` record per unit.
pub fn parse_roster(text: &str, source: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec<GladiatorRecord> {
    let mut roster = Vec::new();
    for record in extract_records(text, FileKind::Roster, source, diagnostics) {
        let name = record.first("NAME").filter(|v| !v.is_empty());
        let class = record.first("CLASS").filter(|v| !v.is_empty());
        let stat_set = record.first("STAT SET").and_then(parse_number::<u32>);
        match (name, class, stat_set) {
            (Some(name), Some(class), Some(stat_set_id)) => roster.push(GladiatorRecord {
                name: name.to_string(),
                class_variant: class.to_string(),
                stat_set_id,
            }),
            _ => diagnostics.push(Diagnostic::MalformedRecord {
                file: source.to_string(),
                line: record.line,
                context: format!(
                    "roster entry '{}' needs Name, Class and a numeric Stat set",
                    name.unwrap_or("?")
                ),
            }),
        }
    }
    debug!("{source}: {} roster units", roster.len());
    roster
}

/// Parse the stat progression file.
///
/// Each blank-line separated block starts with `Statset N:` and continues with `level: v1 v2 ...`
/// rows. Rows with non-numeric values or a level outside `1..=30` are dropped with a diagnostic;
/// rows with the wrong number of values are kept, since only some queries care.
pub fn parse_stat_sets(text: &str, source: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec<StatSet> {
    let mut stat_sets = Vec::new();
    for chunk in split_chunks(text, Delimiter::BlankLine) {
        let mut lines = chunk
            .text
            .lines()
            .enumerate()
            .filter(|(_, line)| !is_ignorable(line))
            .map(|(offset, line)| (chunk.line + offset, line.trim()));

        let Some((header_line, header)) = lines.next() else {
            continue;
        };
        let Some(id) = STAT_SET_HEADER
            .captures(header)
            .and_then(|caps| caps.get(1))
            .and_then(|m| parse_number::<u32>(m.as_str()))
        else {
            diagnostics.push(Diagnostic::MalformedRecord {
                file: source.to_string(),
                line: header_line,
                context: format!("expected 'Statset N:' but found '{header}'"),
            });
            continue;
        };

        let mut stat_set = StatSet {
            id,
            per_level: Default::default(),
        };
        for (line_no, line) in lines {
            let mut malformed = |context: String| {
                diagnostics.push(Diagnostic::MalformedRecord {
                    file: source.to_string(),
                    line: line_no,
                    context,
                });
            };
            let Some(caps) = STAT_ROW.captures(line) else {
                malformed(format!("stat set {id}: '{line}' is not 'level: values'"));
                continue;
            };
            let Some(level) = parse_number::<u32>(&caps[1]).filter(|level| (1..=MAX_LEVEL).contains(level)) else {
                malformed(format!("stat set {id}: level '{}' is outside 1..={MAX_LEVEL}", &caps[1]));
                continue;
            };
            let values: Option<Vec<i32>> = caps[2]
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|v| !v.is_empty())
                .map(parse_number::<i32>)
                .collect();
            match values {
                Some(values) => {
                    stat_set.per_level.insert(level, values);
                },
                None => malformed(format!("stat set {id}: level {level} has non-numeric values")),
            }
        }
        stat_sets.push(stat_set);
    }
    debug!("{source}: {} stat sets", stat_sets.len());
    stat_sets
}

/// The stat set picked for a class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatSetChoice {
    pub id: u32,
    /// Units of the class using this stat set.
    pub references: usize,
    pub level30: Option<Vec<i32>>,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StatSetSelection {
    Selected(StatSetChoice),
    /// Every candidate was excluded from best-average ranking.
    NoRankedStatSet,
    /// The class has no units, so there is nothing to choose from.
    NoCandidates,
}

/// Mean of a full level-30 row, or the reason the set cannot be ranked.
#[allow(clippy::cast_precision_loss)]
fn level30_average(stat_set: Option<&StatSet>) -> Result<f64, String> {
    let stat_set = stat_set.ok_or_else(|| "not defined in the stat progression file".to_string())?;
    let row = stat_set
        .row(MAX_LEVEL)
        .ok_or_else(|| format!("no level {MAX_LEVEL} row"))?;
    if row.len() != STAT_COUNT {
        return Err(format!("level {MAX_LEVEL} row has {} values, expected {STAT_COUNT}", row.len()));
    }
    let total: f64 = row.iter().copied().map(f64::from).sum();
    Ok(total / STAT_COUNT as f64)
}

/// Choose a representative stat set among `candidates` (one entry per unit, in roster order).
///
/// Ties go to the candidate encountered first. In best-average mode a set without a full level-30
/// row is dropped from the ranking and reported as [`Diagnostic::UnrankedStatSet`].
pub fn select_stat_set(
    mode: StatSetMode,
    candidates: &[u32],
    stat_sets: &[StatSet],
    diagnostics: &mut Vec<Diagnostic>,
) -> StatSetSelection {
    let mut counted: Vec<(u32, usize)> = Vec::new();
    for &id in candidates {
        match counted.iter_mut().find(|(seen, _)| *seen == id) {
            Some((_, count)) => *count += 1,
            None => counted.push((id, 1)),
        }
    }
    if counted.is_empty() {
        return StatSetSelection::NoCandidates;
    }

    let lookup = |id: u32| stat_sets.iter().find(|set| set.id == id);
    let choice = |id: u32, references: usize| StatSetChoice {
        id,
        references,
        level30: lookup(id).and_then(|set| set.row(MAX_LEVEL)).map(<[i32]>::to_vec),
        average: level30_average(lookup(id)).ok(),
    };

    match mode {
        StatSetMode::MostCommon => {
            let mut best = counted[0];
            for &(id, count) in &counted[1..] {
                if count > best.1 {
                    best = (id, count);
                }
            }
            StatSetSelection::Selected(choice(best.0, best.1))
        },
        StatSetMode::BestAverage => {
            let mut best: Option<(u32, usize, f64)> = None;
            for &(id, count) in &counted {
                match level30_average(lookup(id)) {
                    Ok(average) => {
                        if best.is_none_or(|(_, _, top)| average > top) {
                            best = Some((id, count, average));
                        }
                    },
                    Err(reason) => {
                        debug!("stat set {id} left out of best-average ranking: {reason}");
                        diagnostics.push(Diagnostic::UnrankedStatSet { id, reason });
                    },
                }
            }
            match best {
                Some((id, count, _)) => StatSetSelection::Selected(choice(id, count)),
                None => StatSetSelection::NoRankedStatSet,
            }
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recruit {
    pub name: String,
    pub class_variant: String,
    pub stat_set_id: u32,
}

/// Units of the queried class that can be recruited at one location.
#[derive(Debug, Clone, Serialize)]
pub struct LocationRecruits {
    pub location: String,
    pub recruits: Vec<Recruit>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecruitReport {
    pub class_name: String,
    pub mode: StatSetMode,
    pub locations: Vec<LocationRecruits>,
    /// Declarations naming nobody in the roster.
    pub unknown_recruits: Vec<RecruitDeclaration>,
    /// Units of the class that no location declares.
    pub unreachable_units: Vec<String>,
    pub stat_set: StatSetSelection,
    pub diagnostics: Vec<Diagnostic>,
}

/// Find where units of `class_name` can be recruited and pick their representative stat set.
///
/// # Errors
/// [`QueryError::NotFound`] when the class is unknown.
pub fn find_recruit_locations(snapshot: &DatasetSnapshot, class_name: &str, mode: StatSetMode) -> Result<RecruitReport, QueryError> {
    let mut diagnostics = snapshot.diagnostics.clone();
    let canonical = find_canonical_class(snapshot, class_name, &mut diagnostics).ok_or_else(|| QueryError::NotFound {
        kind: "class",
        name: class_name.to_string(),
    })?;
    let of_class = |unit: &&GladiatorRecord| canonicalize(&unit.class_variant).eq_ignore_ascii_case(&canonical);

    let mut declared: HashSet<String> = HashSet::new();
    let mut unknown_recruits = Vec::new();
    let mut locations = Vec::new();
    for location in &snapshot.locations {
        let mut recruits: Vec<Recruit> = Vec::new();
        for declaration in &location.recruits {
            let units: Vec<&GladiatorRecord> = snapshot
                .roster
                .iter()
                .filter(|unit| unit.name.eq_ignore_ascii_case(&declaration.name))
                .collect();
            if units.is_empty() {
                diagnostics.push(Diagnostic::UnknownRecruit {
                    name: declaration.name.clone(),
                    location: location.name.clone(),
                });
                unknown_recruits.push(declaration.clone());
                continue;
            }
            declared.insert(declaration.name.to_lowercase());
            for unit in units.into_iter().filter(of_class) {
                let recruit = Recruit {
                    name: unit.name.clone(),
                    class_variant: unit.class_variant.clone(),
                    stat_set_id: unit.stat_set_id,
                };
                if !recruits.contains(&recruit) {
                    recruits.push(recruit);
                }
            }
        }
        if !recruits.is_empty() {
            locations.push(LocationRecruits {
                location: location.name.clone(),
                recruits,
            });
        }
    }

    let class_units: Vec<&GladiatorRecord> = snapshot.roster.iter().filter(of_class).collect();
    let mut unreachable_units = Vec::new();
    for unit in &class_units {
        if !declared.contains(&unit.name.to_lowercase()) && !unreachable_units.contains(&unit.name) {
            diagnostics.push(Diagnostic::UnreachableUnit {
                name: unit.name.clone(),
                class_name: canonical.clone(),
            });
            unreachable_units.push(unit.name.clone());
        }
    }

    let candidates: Vec<u32> = class_units.iter().map(|unit| unit.stat_set_id).collect();
    let stat_set = select_stat_set(mode, &candidates, &snapshot.stat_sets, &mut diagnostics);

    Ok(RecruitReport {
        class_name: canonical,
        mode,
        locations,
        unknown_recruits,
        unreachable_units,
        stat_set,
        diagnostics,
    })
}
