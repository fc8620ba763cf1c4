//! Hit Claim Validation
//!
//! Clients report ball hits against the world as they saw it, which may be
//! several ticks behind the server. A claim is validated against the
//! snapshot recorded at the claimed state id, so a hit that was true when
//! the client observed it is honored even if the ball has since moved on.
//!
//! Acceptance only rewrites the live ball's heading. Positions are never
//! rewound.

use tracing::{debug, info};

use crate::game::state::{PlayerId, SimContext};
use crate::network::protocol::HitClaim;

/// Validate a hit claim, mutating the live ball's direction on acceptance.
///
/// Reference positions come from the history ring when the claimed state
/// id is not the current one; a claim against an evicted (or never-seen)
/// state id falls back to the live positions. Rejection and unknown
/// claimants are silent no-ops.
pub fn validate(ctx: &mut SimContext, claim: &HitClaim) {
    let claimant = PlayerId::new(claim.player_id);
    let Some(player) = ctx.world.player_by_id(claimant) else {
        debug!(
            "Hit claim from unknown player {}",
            hex::encode(&claim.player_id[..4])
        );
        return;
    };

    // Reference positions default to the live world.
    let mut ball_center = ctx.world.ball.center;
    let mut ball_radius = ctx.world.ball.radius;
    let mut player_center = player.center;
    let player_radius = player.radius;

    if claim.state_id != ctx.world.state_id {
        debug!(
            "Hit claim state {} differs from current {}",
            claim.state_id, ctx.world.state_id
        );

        // Newest-to-oldest search for the exact claimed state.
        if let Some(snapshot) = ctx.history.find(claim.state_id) {
            debug!("Found claimed state {} in history", claim.state_id);
            ball_center = snapshot.ball.center;
            ball_radius = snapshot.ball.radius;
            if let Some(past) = snapshot.player_by_id(claimant) {
                player_center = past.center;
            }
        }
        // Evicted or never-seen state id: evaluated against live positions.
    }

    // Collision check is two-dimensional.
    let distance = ball_center.flatten().distance(player_center.flatten());
    if distance <= ball_radius + player_radius {
        info!(
            "Hit by {} at state {} accepted, new direction {:?}",
            hex::encode(&claim.player_id[..4]),
            claim.state_id,
            claim.direction_vec()
        );
        ctx.world.ball.direction = claim.direction_vec();
    }
}

// =============================================================================
// TESTS
// =============================================================================
