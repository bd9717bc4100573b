use std::fs;
use std::path::Path;

use ludus_data::Diagnostic;
use ludus_engine as le;
use ludus_engine::classes::canonicalize;
use ludus_engine::combo::ChainStop;
use ludus_engine::prizes::PrizeSlot;
use ludus_engine::roster::StatSetSelection;
use le::*;

const LOOKUP: &str = "\
100^Warrior
102^Heavy Fighter
200^Tri Strike
201^Fault Line
300^0^Imperia Cup
400^Bronze Gladius
";

const CLASSES: &str = "\
// class definitions
CREATECLASS: Warrior
DISPLAYNAMEID: 100
CLASSATTRIBUTE: Heavy
ITEMCAT: weapon, Sword, light
CREATECLASS: WarriorImpF
DISPLAYNAMEID: 100
CLASSATTRIBUTE: Female
ITEMCAT: weapon, Spear
CREATECLASS: UndeadMeleeExpA
CREATECLASS: Murmillo
DISPLAYNAMEID: 102
CREATECLASS: Secutor
DISPLAYNAMEID: 102
";

const SKILLS: &str = r#"
SKILLCREATE: "Tri Strike"
SKILLDISPLAYNAMEID: 200
SKILLATTRIBUTE: weapon
SKILLATTRIBUTE: melee
SKILLCOSTS: 1, 30
SKILLCOMBATMODS: 0, 1.0
SKILLMETER: "Chain Combo", 0, 3
SKILLSUBSKILL: "Tri Strike Second"
SKILLUSECLASS: Warrior

SKILLCREATE: "Tri Strike Second"
SKILLCOMBATMODS: 0, 0.5
SKILLSUBSKILL: "Tri Strike Third"

SKILLCREATE: "Tri Strike Third"
SKILLCOMBATMODS: 0, 0.25

SKILLCREATE: "Fault Line"
SKILLDISPLAYNAMEID: 201
SKILLCOMBATMODS: 0, 1.0
SKILLMETER: "Chain", 0, 3
SKILLSUBSKILL: "Fault Line Two"

SKILLCREATE: "Fault Line Two"
SKILLCOMBATMODS: 0, 0.5
SKILLSUBSKILL: "Fault Line Nowhere"
"#;

const ITEMS: &str = r#"
ITEMCREATE: "Bronze Sword", weapon
ITEMDISPLAYNAMEID: 400
ITEMSKILL: "Item Tri Strike"

ITEMCREATE: "Training Sword", weapon
ITEMSKILL: "Tri Strike Second"
"#;

const ROSTER: &str = "\
Name: Valens
Class: WarriorImp
Stat set: 1

Name: Darius
Class: WarriorF
Stat set: 2

Name: Marcus
Class: Warrior
Stat set: 3

Name: Ursula
Class: Amazon
Stat set: 2
";

const STAT_SETS: &str = "\
Statset 1:
1: 1 1 1 1 1
30: 10 10 10 10 10

Statset 2:
30: 15 15 15 15 15

Statset 3:
30: 12 12 12 12 12
";

const IMPERIA: &str = r#"
RECRUIT "Valens" 1
RECRUIT "Ghost" 1

LEAGUE "ImperiaCup"
LEAGUENAMEID 300
PRIZECOMPLETION "CupWin"
PRIZEMASTERY "CupWin"
PRIZETIER "Purse", 0
PRIZETIER "Gold Purse", 1
RECRUIT "Valens"
"#;

const NORDAGH: &str = "RECRUIT \"Darius\"\n";

const PRIZES: &str = r#"
PRIZE "CupWin"
PRIZECASH 100, 200
PRIZEITEM "Bronze Sword"

PRIZE "CupWin_Mastery"
PRIZEBADGE "Laurel"

PRIZE "Purse"
PRIZECASH 50
"#;

fn dataset_files(layout: &DatasetLayout) -> Vec<(String, &'static str)> {
    vec![
        (layout.lookup.clone(), LOOKUP),
        (layout.classes.clone(), CLASSES),
        (layout.skills.clone(), SKILLS),
        (layout.items.clone(), ITEMS),
        (layout.roster.clone(), ROSTER),
        (layout.stat_sets.clone(), STAT_SETS),
        (layout.prizes.clone(), PRIZES),
        (format!("{}/imperia.tok", layout.locations), IMPERIA),
        (format!("{}/nordagh.tok", layout.locations), NORDAGH),
        // wrong extension: not a location
        (format!("{}/notes.txt", layout.locations), "RECRUIT \"Marcus\"\n"),
    ]
}

fn memory_engine() -> QueryEngine<MemoryStore> {
    let layout = DatasetLayout::default();
    let mut store = MemoryStore::new();
    for (path, contents) in dataset_files(&layout) {
        store.insert("vanilla", &path, contents);
    }
    QueryEngine::new(store, layout)
}

fn write_dataset(root: &Path, dataset: &str) {
    for (path, contents) in dataset_files(&DatasetLayout::default()) {
        let full = root.join(dataset).join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, contents).unwrap();
    }
}

fn vanilla() -> DatasetId {
    DatasetId::new("vanilla").unwrap()
}

#[test]
fn test_lib_version() {
    assert!(!le::LUDUS_VERSION.is_empty());
}

#[test]
fn test_canonicalize_cases_and_idempotence() {
    assert_eq!(canonicalize("WarriorImpF"), "Warrior");
    assert_eq!(canonicalize("UndeadMeleeExpA"), "UndeadMelee");
    assert_eq!(canonicalize("ArcherF"), "Archer");
    for code in ["WarriorImpF", "UndeadMeleeExpA", "ArcherF", "ArcherFF", "WarriorImpA", "F", "Imp", "Nordagh", ""] {
        let once = canonicalize(code);
        assert_eq!(canonicalize(&once), once, "canonicalize not idempotent for {code:?}");
    }
}

#[test]
fn test_sanitized_dataset_cannot_escape_root() {
    let id = DatasetId::new("Mod/../../etc").unwrap();
    assert_eq!(id.as_str(), "Modetc");
    assert!(DatasetId::new("../..").is_err());
}

#[test]
fn test_resolve_class_merges_variants() {
    let engine = memory_engine();
    let report = engine.resolve_class(&vanilla(), "warriorimpf").unwrap();
    assert_eq!(report.canonical_name, "Warrior");
    assert_eq!(report.display_name, "Warrior");
    let codes: Vec<_> = report.variants.iter().map(|v| v.variant_code.as_str()).collect();
    assert_eq!(codes, ["Warrior", "WarriorImpF"]);
    assert_eq!(report.attributes, ["Heavy", "Female"]);
    assert_eq!(report.equipment_by_category["weapon"], ["Sword (light)", "Spear"]);
    assert_eq!(report.roster_units, 3);
}

#[test]
fn test_ambiguous_display_name_takes_first_class() {
    let engine = memory_engine();
    let report = engine.resolve_class(&vanilla(), "Heavy Fighter").unwrap();
    assert_eq!(report.canonical_name, "Murmillo");
    assert!(report.diagnostics.iter().any(|d| matches!(
        d,
        Diagnostic::AmbiguousReference { chosen, .. } if chosen == "Murmillo"
    )));
}

#[test]
fn test_list_classes_includes_roster_only_classes() {
    let engine = memory_engine();
    let catalog = engine.list_classes(&vanilla()).unwrap();
    let names: Vec<_> = catalog.classes.iter().map(|c| c.canonical_name.as_str()).collect();
    for expected in ["Warrior", "UndeadMelee", "Murmillo", "Secutor", "Amazon"] {
        assert!(names.contains(&expected), "missing {expected} in {names:?}");
    }
    assert_eq!(names.len(), 5);
}

#[test]
fn test_skill_attributes_keep_file_order() {
    let engine = memory_engine();
    let resolution = engine.resolve_skill(&vanilla(), "Tri Strike", Some("warrior")).unwrap();
    assert_eq!(resolution.skills.len(), 1);
    let skill = &resolution.skills[0];
    assert_eq!(skill.attributes, ["weapon", "melee"]);
    assert!((skill.sp_cost - 3.0).abs() < f64::EPSILON);
    assert_eq!(skill.damage.label, "DAM");
}

#[test]
fn test_combo_chain_two_hops() {
    let engine = memory_engine();
    let report = engine.resolve_combo_chain(&vanilla(), "Tri Strike").unwrap();
    let chain = report.chain.expect("Tri Strike is a chain skill");
    assert_eq!(chain.additional_hits(), 2);
    assert!((chain.total_damage - 1.75).abs() < 1e-9);
    assert_eq!(chain.stop, ChainStop::BoundReached);
}

#[test]
fn test_combo_chain_stops_at_missing_hop() {
    let engine = memory_engine();
    let report = engine.resolve_combo_chain(&vanilla(), "Fault Line").unwrap();
    let chain = report.chain.expect("Fault Line is a chain skill");
    assert_eq!(chain.additional_hits(), 1);
    assert_eq!(chain.stop, ChainStop::Unresolved("Fault Line Nowhere".into()));
    assert!(report.diagnostics.iter().any(|d| matches!(
        d,
        Diagnostic::UnresolvedReference { name, .. } if name == "Fault Line Nowhere"
    )));
}

#[test]
fn test_items_granting_skill() {
    let engine = memory_engine();
    let report = engine.find_items_granting_skill(&vanilla(), "Tri Strike").unwrap();
    let items: Vec<_> = report.skills[0].items.iter().map(|i| i.display_name.as_str()).collect();
    assert_eq!(items, ["Bronze Gladius"]);

    let report = engine.find_items_granting_skill(&vanilla(), "Fault Line").unwrap();
    assert_eq!(report.skills.len(), 1);
    assert!(report.skills[0].items.is_empty());
}

#[test]
fn test_recruits_cross_reference_roster() {
    let engine = memory_engine();
    let report = engine
        .find_recruit_locations(&vanilla(), "Warrior", StatSetMode::BestAverage)
        .unwrap();

    let groups: Vec<_> = report
        .locations
        .iter()
        .map(|group| {
            (
                group.location.as_str(),
                group.recruits.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            )
        })
        .collect();
    assert_eq!(groups, [("imperia", vec!["Valens"]), ("nordagh", vec!["Darius"])]);

    assert_eq!(report.unknown_recruits.len(), 1);
    assert_eq!(report.unknown_recruits[0].name, "Ghost");
    assert!(report.diagnostics.contains(&Diagnostic::UnknownRecruit {
        name: "Ghost".into(),
        location: "imperia".into(),
    }));

    assert_eq!(report.unreachable_units, ["Marcus"]);

    match &report.stat_set {
        StatSetSelection::Selected(choice) => {
            assert_eq!(choice.id, 2);
            assert_eq!(choice.average, Some(15.0));
        },
        other => panic!("unexpected stat set selection {other:?}"),
    }
}

#[test]
fn test_most_common_tie_uses_roster_order() {
    let engine = memory_engine();
    let report = engine
        .find_recruit_locations(&vanilla(), "Warrior", StatSetMode::MostCommon)
        .unwrap();
    assert!(matches!(&report.stat_set, StatSetSelection::Selected(choice) if choice.id == 1));
}

#[test]
fn test_prizes_with_placeholder() {
    let engine = memory_engine();
    let report = engine.find_prizes(&vanilla(), "Imperia Cup").unwrap();
    assert_eq!(report.name, "ImperiaCup");
    assert!(matches!(&report.completion[..], [PrizeSlot::Found(prize)] if prize.name == "CupWin"));
    assert!(matches!(&report.mastery[..], [PrizeSlot::Found(prize)] if prize.badge.as_deref() == Some("Laurel")));

    let tiers: Vec<_> = report.tiers.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(tiers, ["Amateur", "Semi-Pro"]);
    match &report.tiers[1].prizes[..] {
        [PrizeSlot::NotFound { placeholder, .. }] => assert_eq!(placeholder, "Gold Purse (not found)"),
        other => panic!("unexpected tier 1 prizes {other:?}"),
    }
}

#[test]
fn test_missing_dataset_is_reported_not_fatal() {
    let engine = memory_engine();
    let other = DatasetId::new("other").unwrap();
    assert!(matches!(
        engine.resolve_skill(&other, "Tri Strike", None),
        Err(QueryError::MissingDatasetFile { .. })
    ));
    // the engine still answers for the dataset that exists
    assert!(engine.resolve_skill(&vanilla(), "Tri Strike", None).is_ok());
}

#[test]
fn test_fs_store_dataset() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), "vanilla");
    let engine = QueryEngine::new(FsStore::new(dir.path()), DatasetLayout::default());

    let report = engine
        .find_recruit_locations(&vanilla(), "warrior", StatSetMode::BestAverage)
        .unwrap();
    assert_eq!(report.unreachable_units, ["Marcus"]);

    let escaped = DatasetId::new("Mod/../../etc").unwrap();
    assert!(matches!(
        engine.list_classes(&escaped),
        Err(QueryError::MissingDatasetFile { dataset, .. }) if dataset == "Modetc"
    ));
}

#[test]
fn test_missing_optional_file_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), "vanilla");
    let layout = DatasetLayout::default();
    fs::remove_file(dir.path().join("vanilla").join(&layout.stat_sets)).unwrap();
    let engine = QueryEngine::new(FsStore::new(dir.path()), layout);

    let report = engine
        .find_recruit_locations(&vanilla(), "Warrior", StatSetMode::BestAverage)
        .unwrap();
    assert_eq!(report.stat_set, StatSetSelection::NoRankedStatSet);
    let unranked = report
        .diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::UnrankedStatSet { .. }))
        .count();
    assert_eq!(unranked, 3);
}
