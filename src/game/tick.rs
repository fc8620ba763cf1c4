//! Fixed-Timestep Tick Engine
//!
//! The driver for the whole simulation. Each tick advances scheduled time
//! by one fixed period and performs the side effects in load-bearing
//! order:
//!
//! ```text
//! receive -> physics -> message processing -> broadcast -> snapshot -> send
//! ```
//!
//! Physics runs before message processing, so input received in a tick's
//! batch affects the next integration step rather than the current one.
//! When the loop is ahead of schedule it sleeps for the remainder of the
//! period; it never runs simulation logic from anywhere but this loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use crate::game::history::Snapshot;
use crate::game::state::SimContext;
use crate::game::{commands, input};
use crate::network::protocol::{Channel, ServerMessage, WorldStateUpdate};
use crate::network::transport::Transport;

// =============================================================================
// STOP SIGNAL
// =============================================================================

/// External, thread-safe request to stop the tick loop.
///
/// The loop observes the signal after each tick's send pass, so the tick
/// in flight always completes before exit.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// Create an untriggered signal.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Request the loop to stop after the current tick.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once [`StopSignal::trigger`] has been called.
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// =============================================================================
// TICK ENGINE
// =============================================================================

/// Fixed-period driver owning the simulation context and the transport.
pub struct TickEngine<T: Transport> {
    ctx: SimContext,
    transport: T,
    period: Duration,
    stop: StopSignal,
}

impl<T: Transport> TickEngine<T> {
    /// Build an engine around an explicitly constructed context.
    pub fn new(ctx: SimContext, transport: T, period: Duration, stop: StopSignal) -> Self {
        Self {
            ctx,
            transport,
            period,
            stop,
        }
    }

    /// The simulation context.
    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    /// Run the loop until the stop signal fires or the transport stops.
    ///
    /// Returns the context and transport for inspection and teardown.
    pub async fn run(mut self) -> (SimContext, T) {
        info!("Tick loop started, period {:?}", self.period);

        let started = Instant::now();
        let mut next_tick = Duration::ZERO;

        loop {
            let elapsed = started.elapsed();
            if next_tick <= elapsed {
                next_tick += self.period;
                self.run_tick();

                // Both exit paths observe a completed send pass.
                if self.stop.is_triggered() {
                    info!("Stop signal observed, leaving tick loop");
                    break;
                }
                if !self.transport.is_running() {
                    info!("Transport stopped, leaving tick loop");
                    break;
                }
            } else {
                tokio::time::sleep(next_tick - elapsed).await;
            }
        }

        info!("Tick loop exited at state {}", self.ctx.world.state_id);
        self.transport.shutdown();
        (self.ctx, self.transport)
    }

    /// One tick's side effects.
    pub fn run_tick(&mut self) {
        // Receive pass. Queued connection events are drained here, so all
        // world mutation happens on the tick loop.
        for event in self.transport.poll_events() {
            commands::handle_peer_event(&mut self.ctx, event);
        }

        step_ball(&mut self.ctx);

        let batch = self.transport.drain_batch();
        input::process_batch(&mut self.ctx, &mut self.transport, batch);

        if self.ctx.connected == 2 {
            self.transport.broadcast(
                Channel::Unreliable,
                ServerMessage::State(WorldStateUpdate::from(&self.ctx.world)),
            );
        }

        self.ctx.history.push(Snapshot::capture(&self.ctx.world));
        self.ctx.world.state_id += 1;

        // Send pass.
        self.transport.flush();
    }
}

/// Advance the ball along its heading by one pace step.
///
/// No integration while paused; the z component never moves.
pub fn step_ball(ctx: &mut SimContext) {
    if ctx.paused {
        return;
    }

    let ball = &mut ctx.world.ball;
    ball.center.x += ball.direction.x * ball.pace;
    ball.center.y += ball.direction.y * ball.pace;
}

// =============================================================================
// TESTS
// =============================================================================
