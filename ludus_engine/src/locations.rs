//! Location files: the leagues, encounters and recruit declarations of one town.

use log::debug;
use serde::Serialize;

use ludus_data::{Diagnostic, LeagueKind, LeagueOrEncounter, PrizeKind, PrizeRef, RecruitDeclaration};

use crate::classes::text_id;
use crate::extract::{FileKind, extract_records, parse_number, split_quoted_head};

#[derive(Debug, Clone, Serialize)]
pub struct Location {
    /// File stem of the location file.
    pub name: String,
    pub events: Vec<LeagueOrEncounter>,
    /// Every `RECRUIT` line of the file, whichever record it sits in.
    pub recruits: Vec<RecruitDeclaration>,
}

/// Parse one location file.
pub fn parse_location(name: &str, text: &str, source: &str, diagnostics: &mut Vec<Diagnostic>) -> Location {
    let mut location = Location {
        name: name.to_string(),
        events: Vec::new(),
        recruits: Vec::new(),
    };

    for record in extract_records(text, FileKind::Leagues, source, diagnostics) {
        let mut recruits = Vec::new();
        for value in record.values("RECRUIT") {
            let (recruit, _) = split_quoted_head(value, false);
            if recruit.is_empty() {
                diagnostics.push(Diagnostic::MalformedRecord {
                    file: source.to_string(),
                    line: record.line,
                    context: format!("RECRUIT '{value}' has no name"),
                });
                continue;
            }
            recruits.push(RecruitDeclaration {
                name: recruit,
                location: name.to_string(),
                line: record.line,
            });
        }
        location.recruits.extend(recruits.iter().cloned());

        let (kind, event_name, id_key) = if let Some(league) = record.first("LEAGUE") {
            (LeagueKind::League, league, "LEAGUENAMEID")
        } else if let Some(encounter) = record.first("ENCOUNTER") {
            (LeagueKind::Encounter, encounter, "ENCOUNTERNAMEID")
        } else {
            continue;
        };

        let mut prize_refs = Vec::new();
        for value in record.values("PRIZECOMPLETION") {
            prize_refs.push(PrizeRef {
                kind: PrizeKind::Completion,
                name: split_quoted_head(value, true).0,
            });
        }
        for value in record.values("PRIZEMASTERY") {
            prize_refs.push(PrizeRef {
                kind: PrizeKind::Mastery,
                name: split_quoted_head(value, true).0,
            });
        }
        for value in record.values("PRIZETIER") {
            let (prize, rest) = split_quoted_head(value, true);
            let tier = rest
                .split(|c: char| c == ',' || c.is_whitespace())
                .find(|t| !t.is_empty())
                .and_then(parse_number::<i32>);
            match tier {
                Some(tier) if !prize.is_empty() => prize_refs.push(PrizeRef {
                    kind: PrizeKind::Tier(tier),
                    name: prize,
                }),
                _ => diagnostics.push(Diagnostic::MalformedRecord {
                    file: source.to_string(),
                    line: record.line,
                    context: format!("PRIZETIER '{value}' is not 'prize, tier'"),
                }),
            }
        }

        location.events.push(LeagueOrEncounter {
            kind,
            name: event_name.to_string(),
            localization_id: text_id(&record, id_key, source, diagnostics),
            location: name.to_string(),
            recruit_declarations: recruits,
            prize_refs,
        });
    }

    debug!(
        "{source}: {} events, {} recruit declarations",
        location.events.len(),
        location.recruits.len()
    );
    location
}
