//! Skill registry: skill entities, lookup by display name, and the numbers shown for a skill.

use std::collections::BTreeSet;

use log::debug;
use serde::Serialize;

use ludus_data::{CombatMods, ComboMeter, Diagnostic, Record, SkillCosts, SkillEntity};

use crate::classes::text_id;
use crate::combo::{ComboChain, resolve_combo_chain};
use crate::extract::{parse_number, split_fields};
use crate::query::QueryError;
use crate::sanitize::sanitize;
use crate::snapshot::DatasetSnapshot;

/// Game data constant: `SKILLCOSTS` stores SP in tenths.
pub const SP_DIVISOR: f64 = 10.0;
/// Game data constant: `SKILLAFFCOST` stores affinity in twentieths of an orb.
pub const AFFINITY_DIVISOR: f64 = 20.0;

/// Build one [`SkillEntity`] per skill record.
pub fn build_skills(records: &[Record], source: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec<SkillEntity> {
    let mut skills = Vec::with_capacity(records.len());
    for record in records {
        let Some(create_name) = record
            .first("SKILLCREATE")
            .and_then(|v| split_fields(v).into_iter().next())
            .filter(|name| !name.is_empty())
        else {
            diagnostics.push(malformed(source, record, "skill record without a SKILLCREATE name".to_string()));
            continue;
        };

        let mut report = |context: String| diagnostics.push(malformed(source, record, context));

        let costs = match record.first("SKILLCOSTS").map(split_fields) {
            None => SkillCosts::default(),
            Some(fields) => {
                let turns = fields.first().and_then(|f| parse_number::<i32>(f));
                let sp = fields.get(1).and_then(|f| parse_number::<i32>(f));
                if turns.is_none() || sp.is_none() {
                    report(format!("skill '{create_name}' SKILLCOSTS {fields:?} is not 'turns, sp'"));
                }
                SkillCosts {
                    turns: turns.unwrap_or(0),
                    sp: sp.unwrap_or(0),
                }
            },
        };

        let combat_mods = match record.first("SKILLCOMBATMODS").map(split_fields) {
            None => CombatMods::default(),
            Some(fields) => {
                let damage_mod = fields.get(1).and_then(|f| parse_number::<f64>(f));
                if damage_mod.is_none() {
                    report(format!("skill '{create_name}' damage modifier in {fields:?} is not a number"));
                }
                CombatMods {
                    accuracy_mod: fields.first().and_then(|f| parse_number(f)).unwrap_or(0.0),
                    damage_mod: damage_mod.unwrap_or(0.0),
                }
            },
        };

        let combo_meter = record.first("SKILLMETER").map(split_fields).and_then(|fields| {
            let hit_count = fields.get(2).and_then(|f| parse_number::<u32>(f));
            match (fields.first(), hit_count) {
                (Some(label), Some(hit_count)) => Some(ComboMeter {
                    label: label.clone(),
                    base: fields.get(1).and_then(|f| parse_number(f)).unwrap_or(0),
                    hit_count,
                }),
                _ => {
                    report(format!("skill '{create_name}' SKILLMETER {fields:?} is not 'label, base, hits'"));
                    None
                },
            }
        });

        let affinity_cost = record.first("SKILLAFFCOST").and_then(|raw| {
            let parsed = parse_number::<i32>(raw);
            if parsed.is_none() {
                report(format!("skill '{create_name}' SKILLAFFCOST '{raw}' is not a number"));
            }
            parsed
        });

        let multi_hit = record.values("SKILLMULTIHITDATA");

        skills.push(SkillEntity {
            display_name_id: text_id(record, "SKILLDISPLAYNAMEID", source, diagnostics),
            description_id: text_id(record, "SKILLDESCRIPTIONID", source, diagnostics),
            attributes: record.values("SKILLATTRIBUTE").to_vec(),
            costs,
            affinity_cost,
            combat_mods,
            combo_meter,
            sub_skill_ref: record
                .first("SKILLSUBSKILL")
                .and_then(|v| split_fields(v).into_iter().next())
                .filter(|r| !r.is_empty()),
            range_spec: record.first("SKILLRANGE").unwrap_or_default().to_string(),
            multi_hit_spec: (!multi_hit.is_empty()).then(|| multi_hit.to_vec()),
            usable_classes: record.values("SKILLUSECLASS").to_vec(),
            statuses: record.values("SKILLSTATUS").to_vec(),
            effects: record.values("SKILLEFFECT").to_vec(),
            effect_conditions: record.values("SKILLEFFECTCONDITION").to_vec(),
            create_name,
        });
    }
    debug!("{source}: {} skills built", skills.len());
    skills
}

fn malformed(source: &str, record: &Record, context: String) -> Diagnostic {
    Diagnostic::MalformedRecord {
        file: source.to_string(),
        line: record.line,
        context,
    }
}

pub fn turn_cost(skill: &SkillEntity) -> i32 {
    skill.costs.turns
}

pub fn sp_cost(skill: &SkillEntity) -> f64 {
    f64::from(skill.costs.sp) / SP_DIVISOR
}

pub fn affinity_orb_cost(skill: &SkillEntity) -> Option<f64> {
    skill.affinity_cost.map(|raw| f64::from(raw) / AFFINITY_DIVISOR)
}

/// Per-hit damage as a percentage, labelled by what it scales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DamageLine {
    pub percent: f64,
    /// `"DAM"` for weapon skills, `"PWR"` otherwise.
    pub label: &'static str,
}

pub fn damage_line(skill: &SkillEntity) -> DamageLine {
    DamageLine {
        percent: skill.combat_mods.damage_mod * 100.0,
        label: if skill.has_attribute("weapon") { "DAM" } else { "PWR" },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MultiHitSummary {
    /// Distinct zones (`A`-`H`) struck across all hits.
    pub unique_targets: usize,
    pub total_hits: usize,
}

/// Zone letters of one `SKILLMULTIHITDATA` entry (its first field).
fn zone_letters(entry: &str) -> impl Iterator<Item = char> + '_ {
    let zones = entry.split(',').next().unwrap_or_default();
    zones
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| ('A'..='H').contains(c))
}

pub fn multi_hit_summary(skill: &SkillEntity) -> Option<MultiHitSummary> {
    let entries = skill.multi_hit_spec.as_ref()?;
    let mut zones = BTreeSet::new();
    let mut total_hits = 0;
    for entry in entries {
        for zone in zone_letters(entry) {
            zones.insert(zone);
            total_hits += 1;
        }
    }
    Some(MultiHitSummary {
        unique_targets: zones.len(),
        total_hits,
    })
}

/// One resolved skill with everything a caller shows.
#[derive(Debug, Clone, Serialize)]
pub struct SkillReport {
    pub create_name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub attributes: Vec<String>,
    pub usable_classes: Vec<String>,
    pub range: String,
    pub turn_cost: i32,
    pub sp_cost: f64,
    pub affinity_orb_cost: Option<f64>,
    pub accuracy_mod: f64,
    pub damage: DamageLine,
    pub multi_hit: Option<MultiHitSummary>,
    pub combo: Option<ComboChain>,
    pub statuses: Vec<String>,
    pub effects: Vec<String>,
    pub effect_conditions: Vec<String>,
}

impl SkillReport {
    pub fn build(snapshot: &DatasetSnapshot, skill: &SkillEntity, diagnostics: &mut Vec<Diagnostic>) -> Self {
        Self {
            create_name: skill.create_name.clone(),
            display_name: snapshot.lookup.display_or(skill.display_name_id, &skill.create_name),
            description: skill
                .description_id
                .and_then(|id| snapshot.lookup.text(id))
                .map(str::to_string),
            attributes: skill.attributes.clone(),
            usable_classes: skill.usable_classes.clone(),
            range: skill.range_spec.clone(),
            turn_cost: turn_cost(skill),
            sp_cost: sp_cost(skill),
            affinity_orb_cost: affinity_orb_cost(skill),
            accuracy_mod: skill.combat_mods.accuracy_mod,
            damage: damage_line(skill),
            multi_hit: multi_hit_summary(skill),
            combo: resolve_combo_chain(skill, &snapshot.skills, diagnostics),
            statuses: skill.statuses.clone(),
            effects: skill.effects.clone(),
            effect_conditions: skill.effect_conditions.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillResolution {
    pub query: String,
    pub class_filter: Option<String>,
    pub skills: Vec<SkillReport>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Skills whose display name is `display_name`, optionally limited to one usable class.
///
/// The name goes through the localization table; when no skill carries any of its IDs, the create
/// name is matched instead. Results keep file order.
pub fn find_skills<'a>(snapshot: &'a DatasetSnapshot, display_name: &str, class_filter: Option<&str>) -> Vec<&'a SkillEntity> {
    let name = sanitize(display_name);
    if name.is_empty() {
        return Vec::new();
    }
    let ids = snapshot.lookup.ids_for(&name);
    let mut named: Vec<&SkillEntity> = snapshot
        .skills
        .iter()
        .filter(|skill| skill.display_name_id.is_some_and(|id| ids.contains(&id)))
        .collect();
    if named.is_empty() {
        named = snapshot
            .skills
            .iter()
            .filter(|skill| skill.create_name.eq_ignore_ascii_case(&name))
            .collect();
    }
    let class_filter = class_filter.map(sanitize).filter(|c| !c.is_empty());
    named
        .into_iter()
        .filter(|skill| class_filter.as_deref().is_none_or(|class| skill.usable_by(class)))
        .collect()
}

/// Resolve a skill name into every matching skill with derived numbers and combo chains.
///
/// # Errors
/// [`QueryError::NotFound`] when nothing matches.
pub fn resolve_skill(snapshot: &DatasetSnapshot, display_name: &str, class_filter: Option<&str>) -> Result<SkillResolution, QueryError> {
    let matches = find_skills(snapshot, display_name, class_filter);
    if matches.is_empty() {
        return Err(QueryError::NotFound {
            kind: "skill",
            name: match class_filter {
                Some(class) => format!("{display_name} ({class})"),
                None => display_name.to_string(),
            },
        });
    }
    let mut diagnostics = snapshot.diagnostics.clone();
    let skills = matches
        .into_iter()
        .map(|skill| SkillReport::build(snapshot, skill, &mut diagnostics))
        .collect();
    Ok(SkillResolution {
        query: display_name.to_string(),
        class_filter: class_filter.map(str::to_string),
        skills,
        diagnostics,
    })
}
