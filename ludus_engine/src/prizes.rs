//! Prize table and the prizes a league or encounter pays out.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use ludus_data::{Diagnostic, LeagueKind, LeagueOrEncounter, Prize, PrizeKind, PrizeRef, Range, Record};

use crate::extract::{parse_number, split_fields};
use crate::query::QueryError;
use crate::sanitize::sanitize;
use crate::snapshot::DatasetSnapshot;

/// Suffix of the prize-table entry paid for mastering a league.
pub const MASTERY_SUFFIX: &str = "_Mastery";

/// Build the prize table from `PRIZE` records.
pub fn build_prizes(records: &[Record], source: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec<Prize> {
    let mut prizes = Vec::with_capacity(records.len());
    for record in records {
        let Some(name) = record.first("PRIZE").filter(|name| !name.is_empty()) else {
            diagnostics.push(Diagnostic::MalformedRecord {
                file: source.to_string(),
                line: record.line,
                context: "prize record without a PRIZE name".to_string(),
            });
            continue;
        };
        let mut range = |key: &str| {
            let raw = record.first(key)?;
            let parsed = parse_range(raw);
            if parsed.is_none() {
                diagnostics.push(Diagnostic::MalformedRecord {
                    file: source.to_string(),
                    line: record.line,
                    context: format!("prize '{name}' {key} '{raw}' is not 'min, max'"),
                });
            }
            parsed
        };
        let cash_range = range("PRIZECASH");
        let exp_range = range("PRIZEEXP");
        prizes.push(Prize {
            name: name.to_string(),
            cash_range,
            exp_range,
            items: record
                .values("PRIZEITEM")
                .iter()
                .filter_map(|v| split_fields(v).into_iter().next())
                .filter(|item| !item.is_empty())
                .collect(),
            badge: record
                .first("PRIZEBADGE")
                .and_then(|v| split_fields(v).into_iter().next())
                .filter(|badge| !badge.is_empty()),
        });
    }
    debug!("{source}: {} prizes built", prizes.len());
    prizes
}

/// `min, max`, or a single value standing for both.
fn parse_range(raw: &str) -> Option<Range> {
    let fields = split_fields(raw);
    match fields.as_slice() {
        [single] => parse_number(single).map(|v| Range { min: v, max: v }),
        [min, max] => Some(Range {
            min: parse_number(min)?,
            max: parse_number(max)?,
        }),
        _ => None,
    }
}

/// Display label of a league tier.
///
/// ```
/// use ludus_engine::prizes::tier_label;
///
/// assert_eq!(tier_label(1), "Semi-Pro");
/// assert_eq!(tier_label(5), "Tier 5");
/// ```
pub fn tier_label(tier: i32) -> String {
    match tier {
        0 => "Amateur".to_string(),
        1 => "Semi-Pro".to_string(),
        2 => "Pro".to_string(),
        other => format!("Tier {other}"),
    }
}

/// A prize reference, resolved or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PrizeSlot {
    Found(Prize),
    NotFound { name: String, placeholder: String },
}

impl PrizeSlot {
    pub fn name(&self) -> &str {
        match self {
            PrizeSlot::Found(prize) => &prize.name,
            PrizeSlot::NotFound { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrizeTier {
    pub tier: i32,
    pub label: String,
    pub prizes: Vec<PrizeSlot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrizeReport {
    pub kind: LeagueKind,
    pub name: String,
    pub display_name: String,
    pub location: String,
    pub completion: Vec<PrizeSlot>,
    pub mastery: Vec<PrizeSlot>,
    /// Ascending by tier number.
    pub tiers: Vec<PrizeTier>,
    pub diagnostics: Vec<Diagnostic>,
}

fn lookup_prize<'a>(prizes: &'a [Prize], name: &str) -> Option<&'a Prize> {
    prizes
        .iter()
        .find(|prize| prize.name == name)
        .or_else(|| prizes.iter().find(|prize| prize.name.eq_ignore_ascii_case(name)))
}

/// Resolve one prize reference against the prize table.
///
/// Mastery references are keyed `<name>_Mastery`; the plain prize is never used in their place.
pub fn resolve_prize(prizes: &[Prize], prize_ref: &PrizeRef, event: &str, diagnostics: &mut Vec<Diagnostic>) -> PrizeSlot {
    let key = match prize_ref.kind {
        PrizeKind::Mastery if !prize_ref.name.ends_with(MASTERY_SUFFIX) => format!("{}{MASTERY_SUFFIX}", prize_ref.name),
        _ => prize_ref.name.clone(),
    };
    match lookup_prize(prizes, &key) {
        Some(prize) => PrizeSlot::Found(prize.clone()),
        None => {
            diagnostics.push(Diagnostic::UnresolvedReference {
                kind: "prize".to_string(),
                name: key,
                context: format!("{:?} prize of '{event}'", prize_ref.kind),
            });
            PrizeSlot::NotFound {
                name: prize_ref.name.clone(),
                placeholder: format!("{} (not found)", prize_ref.name),
            }
        },
    }
}

/// Leagues and encounters whose internal name or display text is `name`, in location order.
fn find_events<'a>(snapshot: &'a DatasetSnapshot, name: &str) -> Vec<&'a LeagueOrEncounter> {
    let ids = snapshot.lookup.ids_for(name);
    snapshot
        .locations
        .iter()
        .flat_map(|location| &location.events)
        .filter(|event| {
            event.name.eq_ignore_ascii_case(name) || event.localization_id.is_some_and(|id| ids.contains(&id))
        })
        .collect()
}

/// Find the prizes paid by the league or encounter called `name`.
///
/// Prize names missing from the prize table come back as placeholders; they never fail the query.
///
/// # Errors
/// [`QueryError::NotFound`] when no league or encounter matches.
pub fn find_prizes(snapshot: &DatasetSnapshot, name: &str) -> Result<PrizeReport, QueryError> {
    let term = sanitize(name);
    let not_found = || QueryError::NotFound {
        kind: "league",
        name: name.to_string(),
    };
    if term.is_empty() {
        return Err(not_found());
    }
    let events = find_events(snapshot, &term);
    let event = *events.first().ok_or_else(not_found)?;

    let mut diagnostics = snapshot.diagnostics.clone();
    if events.len() > 1 {
        diagnostics.push(Diagnostic::AmbiguousReference {
            kind: "league".to_string(),
            name: term.clone(),
            chosen: format!("{} ({})", event.name, event.location),
        });
    }

    let mut completion = Vec::new();
    let mut mastery = Vec::new();
    let mut tiers: BTreeMap<i32, Vec<PrizeSlot>> = BTreeMap::new();
    for prize_ref in &event.prize_refs {
        let slot = resolve_prize(&snapshot.prizes, prize_ref, &event.name, &mut diagnostics);
        match prize_ref.kind {
            PrizeKind::Completion => completion.push(slot),
            PrizeKind::Mastery => mastery.push(slot),
            PrizeKind::Tier(tier) => tiers.entry(tier).or_default().push(slot),
        }
    }

    Ok(PrizeReport {
        kind: event.kind,
        name: event.name.clone(),
        display_name: snapshot.lookup.display_or(event.localization_id, &event.name),
        location: event.location.clone(),
        completion,
        mastery,
        tiers: tiers
            .into_iter()
            .map(|(tier, prizes)| PrizeTier {
                tier,
                label: tier_label(tier),
                prizes,
            })
            .collect(),
        diagnostics,
    })
}
