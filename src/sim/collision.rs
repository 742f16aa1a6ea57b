//! Collision resolution
//!
//! Pure session-level outcomes of player contacts. The tick driver applies
//! the world-level part of a [`Resolution`] (removing the entity, arming the
//! shield timer, requesting the scene change).

use super::state::{EntityKind, Session};
use crate::tuning::Tuning;

/// Outcome of a single contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Session after the contact
    pub session: Session,
    /// Entity is consumed and must be destroyed
    pub consume: bool,
    /// Shield was (re)granted, so the expiry must be scheduled
    pub shield_granted: bool,
    /// Unshielded obstacle hit: the run is over
    pub run_over: bool,
}

impl Resolution {
    fn unchanged(session: Session) -> Self {
        Self {
            session,
            consume: false,
            shield_granted: false,
            run_over: false,
        }
    }
}

/// Resolve a player contact with an entity of `kind`
pub fn resolve(session: Session, kind: EntityKind, tuning: &Tuning) -> Resolution {
    match kind {
        EntityKind::Bit => on_bit_overlap(session, tuning),
        EntityKind::PowerUp => on_power_up_overlap(session),
        EntityKind::Obstacle => on_obstacle_collision(session),
    }
}

/// Collect a bit: +points, bit consumed
pub fn on_bit_overlap(session: Session, tuning: &Tuning) -> Resolution {
    Resolution {
        session: Session {
            score: session.score.saturating_add(tuning.bit_points),
            ..session
        },
        consume: true,
        ..Resolution::unchanged(session)
    }
}

/// Collect a power-up: shield on, power-up consumed
pub fn on_power_up_overlap(session: Session) -> Resolution {
    Resolution {
        session: Session {
            shield_active: true,
            ..session
        },
        consume: true,
        shield_granted: true,
        run_over: false,
    }
}

/// Hit an obstacle: absorbed by the shield, otherwise the run ends.
/// The obstacle is never consumed.
pub fn on_obstacle_collision(session: Session) -> Resolution {
    if session.shield_active {
        return Resolution::unchanged(session);
    }
    Resolution {
        run_over: true,
        ..Resolution::unchanged(session)
    }
}

/// Shield timer ran out
pub fn expire_shield(session: Session) -> Session {
    Session {
        shield_active: false,
        ..session
    }
}
