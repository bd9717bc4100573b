//! Plain-text rendering of query results for the terminal.

use colored::Colorize;

use ludus_data::{Diagnostic, LeagueKind, Prize, Range};

use crate::classes::ClassReport;
use crate::combo::{ChainStop, ComboChain};
use crate::items::ItemSkillReport;
use crate::prizes::{PrizeReport, PrizeSlot};
use crate::query::{ClassCatalog, ComboReport};
use crate::roster::{RecruitReport, StatSetSelection};
use crate::skills::{SkillReport, SkillResolution};
use crate::style::ReportStyle;

pub fn render_class(report: &ClassReport) -> String {
    let mut lines = vec![format!(
        "{} ({})",
        report.display_name.title_style(),
        report.canonical_name.class_style()
    )];
    if let Some(description) = &report.description {
        lines.push(description.description_style().to_string());
    }
    lines.push(String::new());
    lines.push(format!("{}:", "Variants".subheading_style()));
    for variant in &report.variants {
        lines.push(format!("    {} - {}", variant.variant_code.class_style(), variant.display_name));
    }
    if !report.attributes.is_empty() {
        lines.push(format!("{}: {}", "Attributes".subheading_style(), report.attributes.join(", ")));
    }
    if !report.equipment_by_category.is_empty() {
        lines.push(format!("{}:", "Equipment".subheading_style()));
        for (category, entries) in &report.equipment_by_category {
            lines.push(format!("    {category}: {}", entries.join(", ")));
        }
    }
    lines.push(format!(
        "{}: {}",
        "Roster units".subheading_style(),
        report.roster_units.to_string().number_style()
    ));
    lines.join("\n")
}

pub fn render_class_catalog(catalog: &ClassCatalog) -> String {
    let mut lines = vec![format!("{} {}", "Classes in".title_style(), catalog.dataset.title_style())];
    for listing in &catalog.classes {
        if listing.display_name == listing.canonical_name {
            lines.push(format!("    {}", listing.canonical_name.class_style()));
        } else {
            lines.push(format!("    {} ({})", listing.display_name, listing.canonical_name.class_style()));
        }
    }
    lines.join("\n")
}

fn render_chain(chain: &ComboChain, lines: &mut Vec<String>) {
    lines.push(format!(
        "{}: {} ({} hits declared)",
        "Combo".subheading_style(),
        chain.label,
        chain.declared_hits
    ));
    lines.push(format!("    hit 1: {:.0}%", chain.initial_modifier * 100.0));
    for hit in &chain.hits {
        lines.push(format!(
            "    hit {}: {} {:.0}%",
            hit.hit_number,
            hit.skill_name.skill_style(),
            hit.modifier * 100.0
        ));
    }
    lines.push(format!(
        "    total: {}",
        format!("{:.0}%", chain.total_damage * 100.0).number_style()
    ));
    match &chain.stop {
        ChainStop::BoundReached | ChainStop::NoSubSkill => {},
        ChainStop::Unresolved(name) => {
            lines.push(format!("    chain stops: sub-skill '{name}' not found").missing_style().to_string());
        },
        ChainStop::Cycle(name) => {
            lines.push(format!("    chain stops: loops back to '{name}'").missing_style().to_string());
        },
    }
}

fn render_skill(skill: &SkillReport, lines: &mut Vec<String>) {
    lines.push(format!("{} ({})", skill.display_name.title_style(), skill.create_name.skill_style()));
    if let Some(description) = &skill.description {
        lines.push(description.description_style().to_string());
    }
    if !skill.usable_classes.is_empty() {
        lines.push(format!("{}: {}", "Classes".subheading_style(), skill.usable_classes.join(", ")));
    }
    let mut costs = format!("{} turn(s), {:.1} SP", skill.turn_cost, skill.sp_cost);
    if let Some(orbs) = skill.affinity_orb_cost {
        costs.push_str(&format!(", {orbs} affinity orb(s)"));
    }
    lines.push(format!("{}: {costs}", "Cost".subheading_style()));
    lines.push(format!(
        "{}: {:.0}% {}  ACC {:+}",
        "Damage".subheading_style(),
        skill.damage.percent,
        skill.damage.label,
        skill.accuracy_mod
    ));
    if !skill.range.is_empty() {
        lines.push(format!("{}: {}", "Range".subheading_style(), skill.range));
    }
    if let Some(multi) = skill.multi_hit {
        lines.push(format!(
            "{}: {} target(s), {} hit(s)",
            "Multi-hit".subheading_style(),
            multi.unique_targets,
            multi.total_hits
        ));
    }
    if !skill.attributes.is_empty() {
        lines.push(format!("{}: {}", "Attributes".subheading_style(), skill.attributes.join(", ")));
    }
    for (label, values) in [
        ("Statuses", &skill.statuses),
        ("Effects", &skill.effects),
        ("Conditions", &skill.effect_conditions),
    ] {
        if !values.is_empty() {
            lines.push(format!("{}: {}", label.subheading_style(), values.join("; ")));
        }
    }
    if let Some(chain) = &skill.combo {
        render_chain(chain, lines);
    }
}

pub fn render_skills(resolution: &SkillResolution) -> String {
    let mut lines = Vec::new();
    for (i, skill) in resolution.skills.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        render_skill(skill, &mut lines);
    }
    lines.join("\n")
}

pub fn render_combo(report: &ComboReport) -> String {
    let mut lines = vec![format!(
        "{} ({})",
        report.display_name.title_style(),
        report.skill_create_name.skill_style()
    )];
    match &report.chain {
        Some(chain) => render_chain(chain, &mut lines),
        None => lines.push("no combo chain".missing_style().to_string()),
    }
    lines.join("\n")
}

pub fn render_items(report: &ItemSkillReport) -> String {
    let mut lines = Vec::new();
    for skill in &report.skills {
        lines.push(format!(
            "{} ({})",
            skill.skill_display_name.title_style(),
            skill.skill_create_name.skill_style()
        ));
        if skill.items.is_empty() {
            lines.push(format!("    {}", "not granted by any item".missing_style()));
        }
        for item in &skill.items {
            lines.push(format!("    * {}", item.display_name.item_style()));
        }
    }
    lines.join("\n")
}

pub fn render_recruits(report: &RecruitReport) -> String {
    let mut lines = vec![format!("{} {}", "Recruiting".title_style(), report.class_name.class_style())];
    if report.locations.is_empty() {
        lines.push(format!("    {}", "no location recruits this class".missing_style()));
    }
    for group in &report.locations {
        lines.push(format!("{}:", group.location.location_style()));
        for recruit in &group.recruits {
            lines.push(format!(
                "    * {} ({}, stat set {})",
                recruit.name, recruit.class_variant, recruit.stat_set_id
            ));
        }
    }
    if !report.unreachable_units.is_empty() {
        lines.push(format!(
            "{}: {}",
            "Not recruitable".subheading_style(),
            report.unreachable_units.join(", ")
        ));
    }
    let stat_line = match &report.stat_set {
        StatSetSelection::Selected(choice) => {
            let mut line = format!("{} ({} unit(s))", choice.id.to_string().number_style(), choice.references);
            if let Some(row) = &choice.level30 {
                let row: Vec<String> = row.iter().map(ToString::to_string).collect();
                line.push_str(&format!(", level 30: {}", row.join(" ")));
            }
            if let Some(average) = choice.average {
                line.push_str(&format!(", average {average:.1}"));
            }
            line
        },
        StatSetSelection::NoRankedStatSet => "no stat set could be ranked".missing_style().to_string(),
        StatSetSelection::NoCandidates => "no units of this class".missing_style().to_string(),
    };
    lines.push(format!("{} ({:?}): {stat_line}", "Stat set".subheading_style(), report.mode));
    lines.join("\n")
}

fn range_text(range: Option<Range>) -> Option<String> {
    range.map(|range| {
        if range.min == range.max {
            range.min.to_string()
        } else {
            format!("{}-{}", range.min, range.max)
        }
    })
}

fn prize_text(prize: &Prize) -> String {
    let mut parts = Vec::new();
    if let Some(cash) = range_text(prize.cash_range) {
        parts.push(format!("{cash} denarii"));
    }
    if let Some(exp) = range_text(prize.exp_range) {
        parts.push(format!("{exp} exp"));
    }
    parts.extend(prize.items.iter().map(|item| item.item_style().to_string()));
    if let Some(badge) = &prize.badge {
        parts.push(format!("badge {badge}"));
    }
    if parts.is_empty() {
        prize.name.clone()
    } else {
        format!("{}: {}", prize.name, parts.join(", "))
    }
}

fn slot_text(slot: &PrizeSlot) -> String {
    match slot {
        PrizeSlot::Found(prize) => prize_text(prize),
        PrizeSlot::NotFound { placeholder, .. } => placeholder.missing_style().to_string(),
    }
}

pub fn render_prizes(report: &PrizeReport) -> String {
    let kind = match report.kind {
        LeagueKind::League => "league",
        LeagueKind::Encounter => "encounter",
    };
    let mut lines = vec![format!(
        "{} ({kind} at {})",
        report.display_name.title_style(),
        report.location.location_style()
    )];
    for (label, slots) in [("Completion", &report.completion), ("Mastery", &report.mastery)] {
        for slot in slots {
            lines.push(format!("{}: {}", label.subheading_style(), slot_text(slot)));
        }
    }
    for tier in &report.tiers {
        lines.push(format!("{}:", tier.label.subheading_style()));
        for slot in &tier.prizes {
            lines.push(format!("    * {}", slot_text(slot)));
        }
    }
    lines.join("\n")
}

/// Diagnostics in full, or just their count when `verbose` is off.
pub fn render_diagnostics(diagnostics: &[Diagnostic], verbose: bool) -> Option<String> {
    if diagnostics.is_empty() {
        return None;
    }
    if !verbose {
        return Some(
            format!("{} diagnostic(s); run with --diagnostics to list them", diagnostics.len())
                .diagnostic_style()
                .to_string(),
        );
    }
    let lines: Vec<String> = diagnostics
        .iter()
        .map(|d| format!("! {d}").diagnostic_style().to_string())
        .collect();
    Some(lines.join("\n"))
}

/// One-line error for the terminal.
pub fn render_error(message: &str) -> String {
    format!("{} {}", "error:".error_style().bold(), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prizes::PrizeTier;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn placeholders_show_up_in_prize_output() {
        plain();
        let report = PrizeReport {
            kind: LeagueKind::League,
            name: "ImperiaCup".into(),
            display_name: "Imperia Cup".into(),
            location: "imperia".into(),
            completion: vec![PrizeSlot::Found(Prize {
                name: "CupWin".into(),
                cash_range: Some(Range { min: 100, max: 250 }),
                exp_range: Some(Range { min: 40, max: 40 }),
                items: vec!["Bronze Sword".into()],
                badge: None,
            })],
            mastery: Vec::new(),
            tiers: vec![PrizeTier {
                tier: 0,
                label: "Amateur".into(),
                prizes: vec![PrizeSlot::NotFound {
                    name: "Purse".into(),
                    placeholder: "Purse (not found)".into(),
                }],
            }],
            diagnostics: Vec::new(),
        };
        let text = render_prizes(&report);
        assert!(text.starts_with("Imperia Cup (league at imperia)"), "{text}");
        assert!(text.contains("Completion: CupWin: 100-250 denarii, 40 exp, Bronze Sword"), "{text}");
        assert!(text.contains("Amateur:\n    * Purse (not found)"), "{text}");
    }

    #[test]
    fn diagnostics_collapse_to_a_count() {
        plain();
        let diagnostics = vec![Diagnostic::UnknownRecruit {
            name: "Ghost".into(),
            location: "imperia".into(),
        }];
        assert_eq!(render_diagnostics(&[], false), None);
        let short = render_diagnostics(&diagnostics, false).unwrap();
        assert!(short.starts_with("1 diagnostic(s)"));
        let full = render_diagnostics(&diagnostics, true).unwrap();
        assert!(full.starts_with("! ") && full.contains("Ghost"), "{full}");
    }
}
