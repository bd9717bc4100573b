use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Numeric key into the localization table.
pub type TextId = u32;

/// One `id^...^text` line of the localization file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizationEntry {
    pub id: TextId,
    pub text: String,
}

/// A class variant built from one `CREATECLASS:` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntity {
    pub variant_code: String,
    pub canonical_name: String,
    pub display_name_id: Option<TextId>,
    pub description_id: Option<TextId>,
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Item category to `"type (style)"` entries, in declaration order per category.
    #[serde(default)]
    pub equipment_by_category: BTreeMap<String, Vec<String>>,
}

/// Turn and SP cost as written in `SKILLCOSTS`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillCosts {
    pub turns: i32,
    /// Raw SP value; the shown cost is a tenth of this.
    pub sp: i32,
}

/// Accuracy and damage modifiers from `SKILLCOMBATMODS`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatMods {
    pub accuracy_mod: f64,
    pub damage_mod: f64,
}

/// `SKILLMETER: label, base, hitCount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboMeter {
    pub label: String,
    pub base: i32,
    pub hit_count: u32,
}

impl ComboMeter {
    /// Only "Chain" meters link into follow-on skills.
    pub fn is_chain(&self) -> bool {
        self.label.contains("Chain")
    }
}

/// A skill built from one blank-line separated record of the skills file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEntity {
    pub create_name: String,
    pub display_name_id: Option<TextId>,
    pub description_id: Option<TextId>,
    #[serde(default)]
    pub attributes: Vec<String>,
    pub costs: SkillCosts,
    /// Raw `SKILLAFFCOST`; the shown orb cost is a twentieth of this.
    pub affinity_cost: Option<i32>,
    pub combat_mods: CombatMods,
    pub combo_meter: Option<ComboMeter>,
    pub sub_skill_ref: Option<String>,
    #[serde(default)]
    pub range_spec: String,
    /// One entry per `SKILLMULTIHITDATA` line; `None` when the skill declares none.
    pub multi_hit_spec: Option<Vec<String>>,
    #[serde(default)]
    pub usable_classes: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
    #[serde(default)]
    pub effects: Vec<String>,
    #[serde(default)]
    pub effect_conditions: Vec<String>,
}

impl SkillEntity {
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a.eq_ignore_ascii_case(attribute))
    }

    pub fn usable_by(&self, class_name: &str) -> bool {
        self.usable_classes.iter().any(|c| c.eq_ignore_ascii_case(class_name))
    }
}

/// An item built from one record of the items file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEntity {
    pub name: String,
    pub display_name_id: Option<TextId>,
    pub granted_skill_ref: Option<String>,
}

/// One unit of the roster file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GladiatorRecord {
    pub name: String,
    pub class_variant: String,
    pub stat_set_id: u32,
}

/// Number of stats in a progression row: CON, PWR, ACC, DEF, INI.
pub const STAT_COUNT: usize = 5;
/// Highest level a progression row is defined for.
pub const MAX_LEVEL: u32 = 30;

/// A named stat progression shared by roster entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSet {
    pub id: u32,
    /// Level to stat row. A well-formed row has exactly [`STAT_COUNT`] values.
    pub per_level: BTreeMap<u32, Vec<i32>>,
}

impl StatSet {
    pub fn row(&self, level: u32) -> Option<&[i32]> {
        self.per_level.get(&level).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeagueKind {
    League,
    Encounter,
}

/// `RECRUIT "Name" ...` inside a location file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruitDeclaration {
    pub name: String,
    pub location: String,
    pub line: usize,
}

/// Which prize list of a league/encounter a reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrizeKind {
    Completion,
    Mastery,
    Tier(i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeRef {
    pub kind: PrizeKind,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueOrEncounter {
    pub kind: LeagueKind,
    pub name: String,
    pub localization_id: Option<TextId>,
    /// File stem of the location file the record came from.
    pub location: String,
    #[serde(default)]
    pub recruit_declarations: Vec<RecruitDeclaration>,
    #[serde(default)]
    pub prize_refs: Vec<PrizeRef>,
}

/// Inclusive numeric range such as `PRIZECASH 100, 250`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prize {
    pub name: String,
    pub cash_range: Option<Range>,
    pub exp_range: Option<Range>,
    #[serde(default)]
    pub items: Vec<String>,
    pub badge: Option<String>,
}
