use log::warn;
use nalgebra::Vector2;

use crate::model::formation::FormationTemplate;
use crate::model::player::{Player, PlayerMatchState, Role};
use crate::model::team::Team;

/// One selected lineup slot: the chosen player, the role slot they occupy
/// for this match, and their formation anchor.
pub struct LineupSlot {
    pub player_id: u32,
    pub role_slot: Role,
    pub anchor: Vector2<f32>,
}

/// Picks 11 players for `team` under `formation` (spec §4.5): exactly one
/// goalkeeper (fallback: any player if none exists), then fills
/// defender/midfielder/forward lines up to template counts, then fills
/// shortfalls from the remaining squad by positional priority. Ordering is
/// deterministic: by position priority, then by player id.
pub fn select_lineup(team: &Team, formation: FormationTemplate, is_home: bool) -> Vec<LineupSlot> {
    let slots = formation.slots();

    let mut pool: Vec<&Player> = team.roster.iter().collect();
    pool.sort_by_key(|p| p.id);

    let mut used = vec![false; pool.len()];
    let mut result = Vec::with_capacity(slots.len());

    for (slot_index, &(role, _)) in slots.iter().enumerate() {
        let pick = pool
            .iter()
            .enumerate()
            .find(|(i, p)| !used[*i] && p.primary_role == role)
            .map(|(i, _)| i)
            .or_else(|| {
                if role == Role::Gk {
                    pool.iter().enumerate().find(|(i, _)| !used[*i]).map(|(i, _)| i)
                } else {
                    None
                }
            })
            .or_else(|| {
                pool.iter()
                    .enumerate()
                    .find(|(i, p)| !used[*i] && p.primary_role.position_group() == role.position_group())
                    .map(|(i, _)| i)
            })
            .or_else(|| pool.iter().enumerate().find(|(i, _)| !used[*i]).map(|(i, _)| i));

        match pick {
            Some(i) => {
                used[i] = true;
                result.push(LineupSlot {
                    player_id: pool[i].id,
                    role_slot: role,
                    anchor: formation.anchor(slot_index, is_home),
                });
            }
            None => {
                warn!(
                    "select_lineup: team {} has no remaining player for slot {:?}",
                    team.name, role
                );
            }
        }
    }

    result
}

pub fn initial_player_states(slots: &[LineupSlot]) -> Vec<PlayerMatchState> {
    slots
        .iter()
        .map(|slot| PlayerMatchState::at_anchor(slot.player_id, slot.role_slot, slot.anchor))
        .collect()
}
