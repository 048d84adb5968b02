//! Fuzz target for the session state machine
//!
//! Drives a `Session` with arbitrary event sequences: lifecycle reports,
//! decoded and raw frames, user intents and clock advances.
//!
//! # Strategy
//!
//! - Player names come from a small pool so welcomes, rosters and challenges
//!   collide often
//! - Raw frames exercise the decode-and-drop path
//! - Time only moves forward
//!
//! # Invariants
//!
//! - A snapshot exists only while in a match
//! - The local id is known exactly in the lobby and in a match
//! - The session never sends a challenge to the local player
//! - Inbound traffic never produces an error

#![no_main]

use std::time::{Duration, Instant};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rally_client::{
    LinkConfig, Session, SessionAction, SessionError, SessionEvent, SessionPhase,
};
use rally_proto::{Envelope, GameSnapshot, MoveDirection, PlayerId};

const NAMES: [&str; 4] = ["alice", "bob", "carol", "dave"];

fn name(index: u8) -> PlayerId {
    NAMES[usize::from(index) % NAMES.len()].into()
}

#[derive(Debug, Arbitrary)]
enum Inbound {
    Welcome(u8),
    Players(Vec<u8>),
    Start,
    GameState { ball_x: f64, ball_y: f64, paddle1_y: f64, paddle2_y: f64 },
    GameOver,
}

impl Inbound {
    fn into_envelope(self) -> Envelope {
        match self {
            Self::Welcome(index) => Envelope::Welcome(name(index)),
            Self::Players(indexes) => {
                Envelope::Players(indexes.into_iter().take(8).map(name).collect())
            },
            Self::Start => Envelope::Start,
            Self::GameState { ball_x, ball_y, paddle1_y, paddle2_y } => {
                Envelope::GameState(GameSnapshot {
                    ball_x,
                    ball_y,
                    paddle1_y,
                    paddle2_y,
                    paddle_width: 10.0,
                    paddle_height: 100.0,
                })
            },
            Self::GameOver => Envelope::GameOver,
        }
    }
}

#[derive(Debug, Arbitrary)]
enum Op {
    Start,
    Opened,
    ConnectFailed,
    Closed,
    Envelope(Inbound),
    RawFrame(Vec<u8>),
    Tick { advance_ms: u16 },
    Challenge(u8),
    Move { up: bool },
    Retry,
    Dispose,
}

fuzz_target!(|ops: Vec<Op>| {
    let config = LinkConfig {
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(100),
        backoff_multiplier: 2,
        max_attempts: 3,
        welcome_timeout: Duration::from_millis(500),
        connect_timeout: Duration::from_millis(500),
    };
    let mut session: Session<Instant> = Session::new(config);
    let mut now = Instant::now();

    for op in ops {
        let local = session.player_id().cloned();
        let inbound = matches!(op, Op::Envelope(_) | Op::RawFrame(_));

        let result = match op {
            Op::Start => session.handle(SessionEvent::Start),
            Op::Opened => session.handle(SessionEvent::Opened { now }),
            Op::ConnectFailed => {
                session.handle(SessionEvent::ConnectFailed { now, reason: "refused".into() })
            },
            Op::Closed => session.handle(SessionEvent::Closed { now, reason: "reset".into() }),
            Op::Envelope(inbound) => {
                session.handle(SessionEvent::EnvelopeReceived(inbound.into_envelope()))
            },
            Op::RawFrame(bytes) => session.handle(SessionEvent::FrameReceived(bytes)),
            Op::Tick { advance_ms } => {
                now += Duration::from_millis(u64::from(advance_ms));
                session.handle(SessionEvent::Tick { now })
            },
            Op::Challenge(index) => session.handle(SessionEvent::Challenge { target: name(index) }),
            Op::Move { up } => {
                let direction = if up { MoveDirection::Up } else { MoveDirection::Down };
                session.handle(SessionEvent::Move { direction })
            },
            Op::Retry => session.handle(SessionEvent::Retry),
            Op::Dispose => Ok(session.dispose()),
        };

        match result {
            Ok(actions) => {
                for action in &actions {
                    if let (SessionAction::Send(Envelope::Challenge(target)), Some(local)) =
                        (action, &local)
                    {
                        assert_ne!(target, local, "challenged the local player");
                    }
                }
            },
            Err(SessionError::SelfChallenge { target }) => {
                assert_eq!(Some(&target), local.as_ref());
            },
            Err(_) => assert!(!inbound, "inbound traffic returned an error"),
        }

        let live = matches!(session.phase(), SessionPhase::Lobby | SessionPhase::InMatch);
        assert_eq!(session.player_id().is_some(), live, "id/phase mismatch");

        if session.snapshot().is_some() {
            assert_eq!(session.phase(), &SessionPhase::InMatch, "snapshot outside a match");
        }
    }
});
