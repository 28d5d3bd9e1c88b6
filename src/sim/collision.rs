//! Player/pursuer contact resolution and scoring
//!
//! Runs once per tick after every agent has moved.

use glam::Vec2;

use super::state::{GameEvent, GameState, GameStatus, PursuerMode};
use crate::consts::*;

/// Result of checking one pursuer against the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Scared pursuer caught during power mode
    EatPursuer(usize),
    /// The player was caught
    LoseLife(usize),
}

/// Whether two agents are close enough to touch
#[inline]
pub fn in_contact(a: Vec2, b: Vec2) -> bool {
    a.distance(b) < CONTACT_DISTANCE
}

/// Contacts in pursuer order, ending at the first one that costs a life
pub fn find_contacts(state: &GameState) -> Vec<Contact> {
    let player_pos = state.player.body.pos;
    let mut contacts = Vec::new();
    for pursuer in &state.pursuers {
        if pursuer.mode == PursuerMode::Eaten || !in_contact(player_pos, pursuer.body.pos) {
            continue;
        }
        if state.power.active && pursuer.mode == PursuerMode::Scared {
            contacts.push(Contact::EatPursuer(pursuer.index));
        } else {
            contacts.push(Contact::LoseLife(pursuer.index));
            break;
        }
    }
    contacts
}

/// Apply every contact found this tick
pub fn resolve(state: &mut GameState) {
    for contact in find_contacts(state) {
        match contact {
            Contact::EatPursuer(index) => eat_pursuer(state, index),
            Contact::LoseLife(_) => lose_life(state),
        }
    }
}

fn eat_pursuer(state: &mut GameState, index: usize) {
    let Some(pursuer) = state.pursuers.iter_mut().find(|p| p.index == index) else {
        return;
    };
    pursuer.mode = PursuerMode::Eaten;
    pursuer.respawn();
    state.score += u64::from(PURSUER_SCORE);
    state.events.push(GameEvent::PursuerEaten { index });
    log::debug!("Pursuer {} eaten, score {}", index, state.score);
}

fn lose_life(state: &mut GameState) {
    state.lives = state.lives.saturating_sub(1);
    state.power.stop();
    state.respawn_agents();
    state.events.push(GameEvent::LifeLost {
        lives_left: state.lives,
    });

    if state.lives == 0 {
        state.status = GameStatus::Lost;
        state.events.push(GameEvent::Lost);
        log::info!("Game lost with score {}", state.score);
    } else {
        log::info!("Life lost, {} remaining", state.lives);
    }
}
