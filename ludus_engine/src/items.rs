//! Item-skill association: which items grant a skill.

use log::debug;
use serde::Serialize;

use ludus_data::{Diagnostic, ItemEntity, Record};

use crate::classes::text_id;
use crate::extract::split_fields;
use crate::query::QueryError;
use crate::skills::find_skills;
use crate::snapshot::DatasetSnapshot;

/// Items grant skills either by create name or by that name with this prefix.
pub const ITEM_SKILL_PREFIX: &str = "Item ";

pub fn build_items(records: &[Record], source: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec<ItemEntity> {
    let mut items = Vec::with_capacity(records.len());
    for record in records {
        let Some(name) = record
            .first("ITEMCREATE")
            .and_then(|v| split_fields(v).into_iter().next())
            .filter(|name| !name.is_empty())
        else {
            diagnostics.push(Diagnostic::MalformedRecord {
                file: source.to_string(),
                line: record.line,
                context: "item record without an ITEMCREATE name".to_string(),
            });
            continue;
        };
        items.push(ItemEntity {
            display_name_id: text_id(record, "ITEMDISPLAYNAMEID", source, diagnostics),
            granted_skill_ref: record
                .first("ITEMSKILL")
                .and_then(|v| split_fields(v).into_iter().next())
                .filter(|skill| !skill.is_empty()),
            name,
        });
    }
    debug!("{source}: {} items built", items.len());
    items
}

/// True if `item` grants the skill called `skill_create_name`.
pub fn grants_skill(item: &ItemEntity, skill_create_name: &str) -> bool {
    item.granted_skill_ref.as_deref().is_some_and(|granted| {
        granted == skill_create_name
            || granted
                .strip_prefix(ITEM_SKILL_PREFIX)
                .is_some_and(|rest| rest == skill_create_name)
    })
}

/// Items granting `skill_create_name`, in file order.
pub fn items_granting<'a>(items: &'a [ItemEntity], skill_create_name: &str) -> Vec<&'a ItemEntity> {
    items.iter().filter(|item| grants_skill(item, skill_create_name)).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct GrantingItem {
    pub name: String,
    pub display_name: String,
}

/// One skill and the items that grant it; `items` is empty when nothing does.
#[derive(Debug, Clone, Serialize)]
pub struct SkillItems {
    pub skill_create_name: String,
    pub skill_display_name: String,
    pub items: Vec<GrantingItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemSkillReport {
    pub query: String,
    pub skills: Vec<SkillItems>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Find the items granting each skill named `skill_name` (display name or create name).
///
/// Skills with the same create name are reported once.
///
/// # Errors
/// [`QueryError::NotFound`] when no skill matches.
pub fn find_items_granting_skill(snapshot: &DatasetSnapshot, skill_name: &str) -> Result<ItemSkillReport, QueryError> {
    let skills = find_skills(snapshot, skill_name, None);
    if skills.is_empty() {
        return Err(QueryError::NotFound {
            kind: "skill",
            name: skill_name.to_string(),
        });
    }

    let mut grouped: Vec<SkillItems> = Vec::new();
    for skill in skills {
        if grouped.iter().any(|g| g.skill_create_name == skill.create_name) {
            continue;
        }
        let items = items_granting(&snapshot.items, &skill.create_name)
            .into_iter()
            .map(|item| GrantingItem {
                name: item.name.clone(),
                display_name: snapshot.lookup.display_or(item.display_name_id, &item.name),
            })
            .collect();
        grouped.push(SkillItems {
            skill_create_name: skill.create_name.clone(),
            skill_display_name: snapshot.lookup.display_or(skill.display_name_id, &skill.create_name),
            items,
        });
    }

    let mut diagnostics = snapshot.diagnostics.clone();
    diagnostics.extend(dangling_item_skills(snapshot));
    Ok(ItemSkillReport {
        query: skill_name.to_string(),
        skills: grouped,
        diagnostics,
    })
}

/// Items whose granted skill matches no skill record.
pub fn dangling_item_skills(snapshot: &DatasetSnapshot) -> Vec<Diagnostic> {
    snapshot
        .items
        .iter()
        .filter_map(|item| {
            let granted = item.granted_skill_ref.as_deref()?;
            let known = snapshot.skills.iter().any(|skill| grants_skill(item, &skill.create_name));
            (!known).then(|| Diagnostic::UnresolvedReference {
                kind: "item skill".to_string(),
                name: granted.to_string(),
                context: format!("granted by item '{}'", item.name),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{FileKind, extract_records};
    use crate::localization::LocalizationTable;
    use crate::sanitize::DatasetId;
    use crate::skills::build_skills;

    const SKILLS: &str = "\
SKILLCREATE: \"Slash\"
SKILLDISPLAYNAMEID: 10

SKILLCREATE: \"Slash\"
SKILLDISPLAYNAMEID: 10
SKILLUSECLASS: Amazon

SKILLCREATE: \"Heal\"
SKILLDISPLAYNAMEID: 11
";

    const ITEMS: &str = "\
ITEMCREATE: \"Bronze Sword\", Weapon, Sword
ITEMDISPLAYNAMEID: 20
ITEMSKILL: \"Item Slash\"

ITEMCREATE: \"Iron Sword\", Weapon, Sword
ITEMSKILL: \"Slash\"

ITEMCREATE: \"Slasher Helm\", Helmet
ITEMSKILL: \"Item Slashing\"

ITEMCREATE: \"Odd Ring\", Accessory
ITEMSKILL: \"Item Ghost Step\"

ITEMDISPLAYNAMEID: 99
";

    fn snapshot() -> DatasetSnapshot {
        let mut diagnostics = Vec::new();
        let mut snapshot = DatasetSnapshot::empty(DatasetId::new("vanilla").unwrap());
        let skills = extract_records(SKILLS, FileKind::Skills, "skills.tok", &mut diagnostics);
        snapshot.skills = build_skills(&skills, "skills.tok", &mut diagnostics);
        let items = extract_records(ITEMS, FileKind::Items, "items.tok", &mut diagnostics);
        snapshot.items = build_items(&items, "items.tok", &mut diagnostics);
        snapshot.lookup = LocalizationTable::parse("10^Slash\n11^Heal\n20^Bronze Gladius\n");
        snapshot.diagnostics = diagnostics;
        snapshot
    }

    #[test]
    fn plain_and_prefixed_links_both_match() {
        let snapshot = snapshot();
        let report = find_items_granting_skill(&snapshot, "Slash").unwrap();
        assert_eq!(report.skills.len(), 1, "duplicated skill records are grouped once");
        let names: Vec<_> = report.skills[0].items.iter().map(|i| i.display_name.as_str()).collect();
        assert_eq!(names, ["Bronze Gladius", "Iron Sword"]);
    }

    #[test]
    fn prefix_match_is_exact_not_substring() {
        let snapshot = snapshot();
        assert!(!grants_skill(&snapshot.items[2], "Slash"));
        assert!(grants_skill(&snapshot.items[2], "Slashing"));
    }

    #[test]
    fn skill_without_items_is_kept() {
        let snapshot = snapshot();
        let report = find_items_granting_skill(&snapshot, "heal").unwrap();
        assert_eq!(report.skills.len(), 1);
        assert_eq!(report.skills[0].skill_display_name, "Heal");
        assert!(report.skills[0].items.is_empty());
    }

    #[test]
    fn unknown_skill_is_not_found() {
        let snapshot = snapshot();
        assert!(matches!(
            find_items_granting_skill(&snapshot, "Meteor"),
            Err(QueryError::NotFound { kind: "skill", .. })
        ));
    }

    #[test]
    fn nameless_items_and_dangling_links_are_reported() {
        let snapshot = snapshot();
        assert_eq!(snapshot.items.len(), 4);
        assert!(
            snapshot
                .diagnostics
                .iter()
                .any(|d| matches!(d, Diagnostic::MalformedRecord { file, .. } if file == "items.tok"))
        );
        let dangling = dangling_item_skills(&snapshot);
        let names: Vec<_> = dangling
            .iter()
            .filter_map(|d| match d {
                Diagnostic::UnresolvedReference { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, ["Item Slashing", "Item Ghost Step"]);
    }
}
