//! Per-Tick Message Classification
//!
//! One tick's inbound batch arrives with no meaningful order and may carry
//! duplicates and stale retransmits. Classification buckets the batch by
//! kind and collapses each bucket to a single decision:
//!
//! - control commands run immediately, in batch order;
//! - movement updates resolve per slot to the greatest embedded state id,
//!   later-in-batch winning ties;
//! - at most one hit claim survives (the last one seen), validated only
//!   after the resolved movement has been applied.

use crate::game::state::{PlayerId, SimContext, WorldState};
use crate::game::{commands, hit};
use crate::network::protocol::{ClientMessage, HitClaim, MoveUpdate};
use crate::network::transport::{InboundMessage, Transport};

/// Drain and apply one tick's batch of inbound messages.
pub fn process_batch<T: Transport>(
    ctx: &mut SimContext,
    transport: &mut T,
    batch: Vec<InboundMessage>,
) {
    let mut moves: Vec<MoveUpdate> = Vec::new();
    let mut pending_hit: Option<HitClaim> = None;

    for inbound in batch {
        match inbound.message {
            ClientMessage::Move(update) => moves.push(update),
            // Only the last claim in the batch survives.
            ClientMessage::Hit(claim) => pending_hit = Some(claim),
            ClientMessage::Reset => commands::reset_game(ctx, transport),
            ClientMessage::Pause => commands::toggle_pause(ctx, transport),
            ClientMessage::NudgePace(nudge) => commands::nudge_ball_pace(ctx, nudge.delta),
        }
    }

    resolve_moves(&mut ctx.world, &moves);

    // Validated against positions already updated for this tick.
    if let Some(claim) = pending_hit {
        hit::validate(ctx, &claim);
    }
}

/// Resolve buffered movement updates, one decision per slot.
///
/// For each slot independently: keep the update with the numerically
/// greatest state id, comparing with `>=` so a later equal-ranked update
/// overrides an earlier one. Slots with no update keep their position.
/// Nothing is applied until both slots have resolved.
fn resolve_moves(world: &mut WorldState, moves: &[MoveUpdate]) {
    if moves.is_empty() {
        return;
    }

    let mut resolved: [Option<MoveUpdate>; 2] = [None, None];

    for (slot, chosen) in resolved.iter_mut().enumerate() {
        let Some(bound) = world.players[slot].id else {
            continue;
        };

        let mut best_state = 0u64;
        for update in moves {
            if update.state_id >= best_state && PlayerId::new(update.player_id) == bound {
                best_state = update.state_id;
                *chosen = Some(*update);
            }
        }
    }

    for (slot, chosen) in resolved.into_iter().enumerate() {
        if let Some(update) = chosen {
            world.players[slot].center = update.center_vec();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
