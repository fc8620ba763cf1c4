//! Control Commands and Peer Lifecycle
//!
//! Immediate commands (reset, pause toggle, debug pace nudge) applied in
//! batch order as the classifier encounters them, and the connect /
//! disconnect handling drained from the transport's event queue at the top
//! of each tick.

use tracing::{debug, info, warn};

use crate::game::state::SimContext;
use crate::network::protocol::{Channel, ServerMessage};
use crate::network::transport::{PeerEvent, Transport};

/// Reset the match: fresh ball, players back at their start positions, and
/// a reliable reset notice to every client. State id and history are left
/// alone.
pub fn reset_game<T: Transport>(ctx: &mut SimContext, transport: &mut T) {
    ctx.world.reset();
    transport.broadcast(Channel::Reliable, ServerMessage::Reset);
    info!("Match reset at state {}", ctx.world.state_id);
}

/// Flip the pause flag and announce the new value reliably.
///
/// Only effective while exactly two players are connected; otherwise a
/// no-op with no broadcast.
pub fn toggle_pause<T: Transport>(ctx: &mut SimContext, transport: &mut T) {
    if ctx.connected != 2 {
        return;
    }

    ctx.paused = !ctx.paused;
    transport.broadcast(Channel::Reliable, ServerMessage::Pause { paused: ctx.paused });
    info!("Pause toggled to {}", ctx.paused);
}

/// Add a signed delta to the ball's pace. Debug/test tooling; not gated by
/// player count.
pub fn nudge_ball_pace(ctx: &mut SimContext, delta: f32) {
    ctx.world.ball.pace += delta;
    debug!("Ball pace nudged by {} to {}", delta, ctx.world.ball.pace);
}

/// Apply one queued connection event.
///
/// Connect binds the identity to a free slot and bumps the connected
/// count. Disconnect drops the count, clears the pause flag, frees the
/// slot, and unconditionally resets the world in place.
pub fn handle_peer_event(ctx: &mut SimContext, event: PeerEvent) {
    match event {
        PeerEvent::Connected { client, identity } => {
            match ctx.world.bind_slot(identity) {
                Some(slot) => info!(
                    "Client {} connected as {} in slot {}",
                    client,
                    hex::encode(&identity.0[..4]),
                    slot
                ),
                None => warn!("Client {} connected with no free player slot", client),
            }
            ctx.connected += 1;
        }
        PeerEvent::Disconnected { client, identity } => {
            ctx.connected = ctx.connected.saturating_sub(1);
            ctx.paused = false;
            ctx.world.release_slot(identity);
            ctx.world.reset();
            info!(
                "Client {} disconnected, {} players remain",
                client, ctx.connected
            );
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec::Vec3;
    use crate::game::state::{PlayerId, PLAYER_START_POSITIONS};
    use crate::network::transport::testing::TestTransport;

    fn connected_pair() -> SimContext {
        let mut ctx = SimContext::new();
        ctx.world.bind_slot(PlayerId::new([1; 16]));
        ctx.world.bind_slot(PlayerId::new([2; 16]));
        ctx.connected = 2;
        ctx
    }

    #[test]
    fn test_reset_recenters_and_broadcasts_reliably() {
        let mut ctx = connected_pair();
        let mut transport = TestTransport::new();
        ctx.world.state_id = 11;
        ctx.world.players[0].center = Vec3::new(0.0, 5.0, 0.0);

        reset_game(&mut ctx, &mut transport);

        assert_eq!(ctx.world.state_id, 11);
        assert_eq!(ctx.world.players[0].center, PLAYER_START_POSITIONS[0]);
        assert_eq!(
            transport.broadcasts,
            vec![(Channel::Reliable, ServerMessage::Reset)]
        );
    }

    #[test]
    fn test_pause_requires_two_players() {
        let mut ctx = SimContext::new();
        ctx.connected = 1;
        let mut transport = TestTransport::new();

        toggle_pause(&mut ctx, &mut transport);

        assert!(!ctx.paused);
        assert!(transport.broadcasts.is_empty());
    }

    #[test]
    fn test_pause_toggles_and_announces() {
        let mut ctx = connected_pair();
        let mut transport = TestTransport::new();

        toggle_pause(&mut ctx, &mut transport);
        assert!(ctx.paused);

        toggle_pause(&mut ctx, &mut transport);
        assert!(!ctx.paused);

        assert_eq!(
            transport.broadcasts,
            vec![
                (Channel::Reliable, ServerMessage::Pause { paused: true }),
                (Channel::Reliable, ServerMessage::Pause { paused: false }),
            ]
        );
    }

    #[test]
    fn test_pace_nudge_is_not_gated() {
        let mut ctx = SimContext::new();
        ctx.connected = 0;
        let pace = ctx.world.ball.pace;

        nudge_ball_pace(&mut ctx, 0.25);
        nudge_ball_pace(&mut ctx, -0.1);

        assert!((ctx.world.ball.pace - (pace + 0.15)).abs() < f32::EPSILON);
    }

    #[test]
    fn test_connect_binds_slot_and_counts() {
        let mut ctx = SimContext::new();
        let id = PlayerId::new([7; 16]);

        handle_peer_event(
            &mut ctx,
            PeerEvent::Connected {
                client: 0,
                identity: id,
            },
        );

        assert_eq!(ctx.connected, 1);
        assert_eq!(ctx.world.player_by_id(id).unwrap().slot, 0);
    }

    #[test]
    fn test_disconnect_resets_and_clears_pause() {
        let mut ctx = connected_pair();
        ctx.paused = true;
        ctx.world.state_id = 30;
        ctx.world.ball.center = Vec3::new(2.0, 2.0, 0.0);
        let id = PlayerId::new([2; 16]);

        handle_peer_event(
            &mut ctx,
            PeerEvent::Disconnected {
                client: 1,
                identity: id,
            },
        );

        assert_eq!(ctx.connected, 1);
        assert!(!ctx.paused);
        assert!(ctx.world.player_by_id(id).is_none());
        assert_eq!(ctx.world.ball.center, Vec3::ZERO);
        // Reset on disconnect leaves the counter alone, like any reset.
        assert_eq!(ctx.world.state_id, 30);
    }

    #[test]
    fn test_disconnect_of_last_player_from_paused_game() {
        let mut ctx = connected_pair();
        ctx.paused = true;

        for (client, bytes) in [(0u32, [1u8; 16]), (1, [2; 16])] {
            handle_peer_event(
                &mut ctx,
                PeerEvent::Disconnected {
                    client,
                    identity: PlayerId::new(bytes),
                },
            );
        }

        assert_eq!(ctx.connected, 0);
        assert!(!ctx.paused);
        assert!(ctx.world.players.iter().all(|p| p.id.is_none()));
    }
}
