//! Combo chains: skills whose "Chain" meter links into follow-on sub-skills.
//!
//! The declared hit count bounds the walk, and a chain may revisit a skill within that bound. A chain
//! that keeps looping past [`MAX_CHAIN_HOPS`] is cut off, which only happens when the hit count is
//! wrong.

use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use ludus_data::{Diagnostic, SkillEntity};

/// Follow-on hits after which a chain that revisits its own skills is treated as a runaway loop.
pub const MAX_CHAIN_HOPS: usize = 64;

/// One follow-on hit of a chain. The initial skill is hit 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboHit {
    pub hit_number: u32,
    pub skill_name: String,
    pub modifier: f64,
}

/// Why the walk ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ChainStop {
    /// The declared hit count was used up.
    BoundReached,
    /// The last skill names no sub-skill.
    NoSubSkill,
    /// A sub-skill reference matched no other skill.
    Unresolved(String),
    /// The chain kept looping back into itself past [`MAX_CHAIN_HOPS`].
    Cycle(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboChain {
    pub label: String,
    /// `hitCount` from the meter, including the initial hit.
    pub declared_hits: u32,
    pub initial_modifier: f64,
    /// Follow-on hits actually resolved, in order.
    pub hits: Vec<ComboHit>,
    /// Initial modifier plus every resolved hop's modifier.
    pub total_damage: f64,
    pub stop: ChainStop,
}

impl ComboChain {
    pub fn additional_hits(&self) -> usize {
        self.hits.len()
    }
}

/// First skill, other than `current`, whose create name contains `reference`.
fn find_sub_skill<'a>(all: &'a [SkillEntity], current: &SkillEntity, reference: &str) -> Option<&'a SkillEntity> {
    all.iter()
        .find(|candidate| candidate.create_name != current.create_name && candidate.create_name.contains(reference))
}

/// Follow the sub-skill links of a chain skill.
///
/// Returns `None` unless the skill has a meter whose label contains "Chain". Resolution failures end
/// the chain early and are recorded in `diagnostics`; the partial chain is still returned.
pub fn resolve_combo_chain(skill: &SkillEntity, all: &[SkillEntity], diagnostics: &mut Vec<Diagnostic>) -> Option<ComboChain> {
    let meter = skill.combo_meter.as_ref().filter(|meter| meter.is_chain())?;
    let max_additional_hits = meter.hit_count.saturating_sub(1) as usize;

    let mut visited = HashSet::from([skill.create_name.as_str()]);
    let mut current = skill;
    let mut hits: Vec<ComboHit> = Vec::new();
    let mut total_damage = skill.combat_mods.damage_mod;

    let stop = loop {
        if hits.len() >= max_additional_hits {
            break ChainStop::BoundReached;
        }
        let Some(reference) = current.sub_skill_ref.as_deref() else {
            break ChainStop::NoSubSkill;
        };
        let Some(next) = find_sub_skill(all, current, reference) else {
            diagnostics.push(Diagnostic::UnresolvedReference {
                kind: "sub-skill".to_string(),
                name: reference.to_string(),
                context: format!("combo chain of '{}' after hit {}", skill.create_name, hits.len() + 1),
            });
            break ChainStop::Unresolved(reference.to_string());
        };
        if !visited.insert(next.create_name.as_str()) && hits.len() >= MAX_CHAIN_HOPS {
            diagnostics.push(Diagnostic::UnresolvedReference {
                kind: "sub-skill".to_string(),
                name: reference.to_string(),
                context: format!("combo chain of '{}' loops back to '{}'", skill.create_name, next.create_name),
            });
            break ChainStop::Cycle(next.create_name.clone());
        }

        let modifier = next.combat_mods.damage_mod;
        debug!("combo '{}': hop to '{}' ({modifier})", skill.create_name, next.create_name);
        total_damage += modifier;
        hits.push(ComboHit {
            hit_number: u32::try_from(hits.len() + 2).unwrap_or(u32::MAX),
            skill_name: next.create_name.clone(),
            modifier,
        });
        current = next;
    };

    Some(ComboChain {
        label: meter.label.clone(),
        declared_hits: meter.hit_count,
        initial_modifier: skill.combat_mods.damage_mod,
        hits,
        total_damage,
        stop,
    })
}
