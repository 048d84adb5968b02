//! Property tests for the session phase table.
//!
//! These tests verify:
//! - The phase table is total: pairs outside it leave the whole view unchanged
//! - Pairs inside it move to exactly the phase the table names
//! - The challengeable roster never contains the local player
//! - No challenge aimed at the local player is ever emitted

use std::time::Instant;

use proptest::prelude::*;
use rally_client::{LinkConfig, Session, SessionAction, SessionEvent, SessionPhase};
use rally_proto::{Envelope, GameSnapshot, MoveDirection, PlayerId};

const NAMES: [&str; 4] = ["alice", "bob", "carol", "dave"];

fn player_id() -> impl Strategy<Value = PlayerId> {
    prop::sample::select(NAMES.to_vec()).prop_map(PlayerId::from)
}

fn snapshot() -> impl Strategy<Value = GameSnapshot> {
    (0.0..800.0f64, 0.0..400.0f64, 0.0..300.0f64, 0.0..300.0f64).prop_map(
        |(ball_x, ball_y, paddle1_y, paddle2_y)| GameSnapshot {
            ball_x,
            ball_y,
            paddle1_y,
            paddle2_y,
            paddle_width: 10.0,
            paddle_height: 100.0,
        },
    )
}

fn envelope() -> impl Strategy<Value = Envelope> {
    prop_oneof![
        player_id().prop_map(Envelope::Welcome),
        prop::collection::vec(player_id(), 0..6).prop_map(Envelope::Players),
        Just(Envelope::Start),
        snapshot().prop_map(Envelope::GameState),
        Just(Envelope::GameOver),
        player_id().prop_map(Envelope::Challenge),
        prop_oneof![Just(MoveDirection::Up), Just(MoveDirection::Down)].prop_map(Envelope::Move),
    ]
}

/// Phase the table prescribes, or `None` if the pair is outside it.
fn table(phase: &SessionPhase, envelope: &Envelope) -> Option<SessionPhase> {
    match (phase, envelope) {
        (SessionPhase::Connecting, Envelope::Welcome(_))
        | (SessionPhase::Lobby, Envelope::Players(_))
        | (SessionPhase::InMatch, Envelope::GameOver) => Some(SessionPhase::Lobby),
        (SessionPhase::Lobby, Envelope::Start) | (SessionPhase::InMatch, Envelope::GameState(_)) => {
            Some(SessionPhase::InMatch)
        },
        _ => None,
    }
}

fn connected() -> Session<Instant> {
    let mut session = Session::new(LinkConfig::default());
    session.handle(SessionEvent::Start).unwrap();
    session.handle(SessionEvent::Opened { now: Instant::now() }).unwrap();
    session
}

proptest! {
    /// INVARIANT: Every (phase, envelope) pair either follows the table or
    /// leaves the view untouched.
    #[test]
    fn prop_phase_table_is_total(envelopes in prop::collection::vec(envelope(), 0..40)) {
        let mut session = connected();

        for envelope in envelopes {
            let before = session.view();
            let expected = table(&before.phase, &envelope);

            session.handle(SessionEvent::EnvelopeReceived(envelope)).unwrap();
            let after = session.view();

            match expected {
                Some(phase) => prop_assert_eq!(after.phase, phase),
                None => prop_assert_eq!(after, before),
            }
        }
    }

    /// INVARIANT: A snapshot exists only while in a match.
    #[test]
    fn prop_snapshot_only_in_match(envelopes in prop::collection::vec(envelope(), 0..40)) {
        let mut session = connected();

        for envelope in envelopes {
            session.handle(SessionEvent::EnvelopeReceived(envelope)).unwrap();
            if session.phase() != &SessionPhase::InMatch {
                prop_assert!(session.snapshot().is_none());
            }
        }
    }

    /// INVARIANT: The local player is never challengeable.
    #[test]
    fn prop_self_never_challengeable(
        me in player_id(),
        rosters in prop::collection::vec(prop::collection::vec(player_id(), 0..8), 1..10),
    ) {
        let mut session = connected();
        session.handle(SessionEvent::EnvelopeReceived(Envelope::Welcome(me.clone()))).unwrap();

        for roster in rosters {
            session.handle(SessionEvent::EnvelopeReceived(Envelope::Players(roster))).unwrap();
            let challengeable = session.view().challengeable();
            prop_assert!(!challengeable.contains(&me));
        }
    }

    /// INVARIANT: No `challenge` envelope ever targets the local player,
    /// whatever the UI asks for.
    #[test]
    fn prop_never_sends_self_challenge(
        me in player_id(),
        targets in prop::collection::vec(player_id(), 1..20),
    ) {
        let mut session = connected();
        session.handle(SessionEvent::EnvelopeReceived(Envelope::Welcome(me.clone()))).unwrap();

        for target in targets {
            let result = session.handle(SessionEvent::Challenge { target: target.clone() });
            match result {
                Ok(actions) => {
                    prop_assert_ne!(&target, &me);
                    prop_assert_eq!(actions, vec![SessionAction::Send(Envelope::Challenge(target))]);
                },
                Err(_) => prop_assert_eq!(&target, &me),
            }
        }
    }
}
