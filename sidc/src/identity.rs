//! Affiliation (standard identity) and operational status.
//!
//! In 2525C both are single letters at fixed positions.  In 2525D
//! and 2525E the affiliation is split into a context digit (reality,
//! exercise or simulation) and a standard identity digit, and status
//! is a single digit.  2525C has no simulation context, so simulated
//! affiliations are written using the letter of the corresponding
//! real-world affiliation.

use serde::{Deserialize, Serialize};

#[cfg(test)]
use test_strategy::Arbitrary;

use super::code::{c_field, char_at, d_field, overwrite};
use super::generation::Generation;

#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Context {
    Reality = 0,
    Exercise = 1,
    Simulation = 2,
}

#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Affiliation {
    Pending,
    Unknown,
    AssumedFriend,
    Friend,
    Neutral,
    Suspect,
    Hostile,
    ExercisePending,
    ExerciseUnknown,
    ExerciseAssumedFriend,
    ExerciseFriend,
    ExerciseNeutral,
    /// Exercise suspect.
    Joker,
    /// Exercise hostile.
    Faker,
    SimulatedPending,
    SimulatedUnknown,
    SimulatedAssumedFriend,
    SimulatedFriend,
    SimulatedNeutral,
    SimulatedSuspect,
    SimulatedHostile,
}

/// Standard identities in 2525D digit order.
const IDENTITIES: [[Affiliation; 7]; 3] = [
    [
        Affiliation::Pending,
        Affiliation::Unknown,
        Affiliation::AssumedFriend,
        Affiliation::Friend,
        Affiliation::Neutral,
        Affiliation::Suspect,
        Affiliation::Hostile,
    ],
    [
        Affiliation::ExercisePending,
        Affiliation::ExerciseUnknown,
        Affiliation::ExerciseAssumedFriend,
        Affiliation::ExerciseFriend,
        Affiliation::ExerciseNeutral,
        Affiliation::Joker,
        Affiliation::Faker,
    ],
    [
        Affiliation::SimulatedPending,
        Affiliation::SimulatedUnknown,
        Affiliation::SimulatedAssumedFriend,
        Affiliation::SimulatedFriend,
        Affiliation::SimulatedNeutral,
        Affiliation::SimulatedSuspect,
        Affiliation::SimulatedHostile,
    ],
];

const C_LETTERS: [[char; 7]; 2] = [
    ['P', 'U', 'A', 'F', 'N', 'S', 'H'],
    ['G', 'W', 'M', 'D', 'L', 'J', 'K'],
];

impl Affiliation {
    pub fn from_context_and_identity(context: u8, identity: u8) -> Option<Affiliation> {
        IDENTITIES
            .get(usize::from(context))
            .and_then(|row| row.get(usize::from(identity)))
            .copied()
    }

    fn position(&self) -> (usize, usize) {
        for (context, row) in IDENTITIES.iter().enumerate() {
            if let Some(identity) = row.iter().position(|a| a == self) {
                return (context, identity);
            }
        }
        unreachable!("every affiliation appears in the identity table")
    }

    pub fn context(&self) -> Context {
        match self.position().0 {
            0 => Context::Reality,
            1 => Context::Exercise,
            _ => Context::Simulation,
        }
    }

    /// The standard identity digit, ignoring context.
    pub fn identity(&self) -> u8 {
        self.position().1 as u8
    }

    /// True if 2525C can express this affiliation.  It can't express
    /// the simulation context.
    pub fn representable_in_2525c(&self) -> bool {
        self.context() != Context::Simulation
    }

    pub fn to_2525c(&self) -> char {
        let (context, identity) = self.position();
        match context {
            1 => C_LETTERS[1][identity],
            _ => C_LETTERS[0][identity],
        }
    }

    /// Decodes a 2525C affiliation letter; the wildcard `*` and
    /// unassigned letters decode to `None`.
    pub fn from_2525c(ch: char) -> Option<Affiliation> {
        let ch = ch.to_ascii_uppercase();
        C_LETTERS.iter().enumerate().find_map(|(context, row)| {
            row.iter()
                .position(|letter| *letter == ch)
                .map(|identity| IDENTITIES[context][identity])
        })
    }

    /// Returns the context and standard identity digits.
    pub fn to_2525d(&self) -> String {
        let (context, identity) = self.position();
        format!("{context}{identity}")
    }

    pub fn from_2525d(context: char, identity: char) -> Option<Affiliation> {
        let context = context.to_digit(10)?;
        let identity = identity.to_digit(10)?;
        Affiliation::from_context_and_identity(context as u8, identity as u8)
    }
}

#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Present,
    PlannedAnticipatedSuspect,
    PresentFullyCapable,
    PresentDamaged,
    PresentDestroyed,
    PresentFullToCapacity,
}

impl Status {
    pub fn to_2525c(&self) -> char {
        match self {
            Status::Present => 'P',
            Status::PlannedAnticipatedSuspect => 'A',
            Status::PresentFullyCapable => 'C',
            Status::PresentDamaged => 'D',
            Status::PresentDestroyed => 'X',
            Status::PresentFullToCapacity => 'F',
        }
    }

    /// Decodes a 2525C status letter.  The placeholder `-` means
    /// present; the wildcard `*` decodes to `None`.
    pub fn from_2525c(ch: char) -> Option<Status> {
        match ch.to_ascii_uppercase() {
            'P' | c_field::PLACEHOLDER => Some(Status::Present),
            'A' => Some(Status::PlannedAnticipatedSuspect),
            'C' => Some(Status::PresentFullyCapable),
            'D' => Some(Status::PresentDamaged),
            'X' => Some(Status::PresentDestroyed),
            'F' => Some(Status::PresentFullToCapacity),
            _ => None,
        }
    }

    pub fn to_2525d(&self) -> char {
        match self {
            Status::Present => '0',
            Status::PlannedAnticipatedSuspect => '1',
            Status::PresentFullyCapable => '2',
            Status::PresentDamaged => '3',
            Status::PresentDestroyed => '4',
            Status::PresentFullToCapacity => '5',
        }
    }

    pub fn from_2525d(ch: char) -> Option<Status> {
        match ch {
            '0' => Some(Status::Present),
            '1' => Some(Status::PlannedAnticipatedSuspect),
            '2' => Some(Status::PresentFullyCapable),
            '3' => Some(Status::PresentDamaged),
            '4' => Some(Status::PresentDestroyed),
            '5' => Some(Status::PresentFullToCapacity),
            _ => None,
        }
    }
}

/// Weather codes have neither affiliation nor status; the letters at
/// those positions mean something else.
pub fn is_weather(code: &str) -> bool {
    matches!(char_at(code, c_field::CODING_SCHEME), Some('W' | 'w'))
}

pub fn affiliation(code: &str, generation: Generation) -> Option<Affiliation> {
    match generation {
        Generation::C => {
            if is_weather(code) {
                None
            } else {
                Affiliation::from_2525c(char_at(code, c_field::AFFILIATION)?)
            }
        }
        Generation::D | Generation::E => Affiliation::from_2525d(
            char_at(code, d_field::CONTEXT)?,
            char_at(code, d_field::AFFILIATION)?,
        ),
    }
}

/// Returns a copy of `code` carrying affiliation `a`.  Codes too
/// short to have an affiliation field, and weather codes, are
/// returned unchanged.
pub fn with_affiliation(code: &str, generation: Generation, a: Affiliation) -> String {
    match generation {
        Generation::C if is_weather(code) => code.to_string(),
        Generation::C => overwrite(code, c_field::AFFILIATION, &a.to_2525c().to_string()),
        Generation::D | Generation::E => overwrite(code, d_field::CONTEXT, &a.to_2525d()),
    }
}

pub fn status(code: &str, generation: Generation) -> Option<Status> {
    match generation {
        Generation::C => {
            if is_weather(code) {
                None
            } else {
                Status::from_2525c(char_at(code, c_field::STATUS)?)
            }
        }
        Generation::D | Generation::E => Status::from_2525d(char_at(code, d_field::STATUS)?),
    }
}

pub fn with_status(code: &str, generation: Generation, s: Status) -> String {
    match generation {
        Generation::C if is_weather(code) => code.to_string(),
        Generation::C => overwrite(code, c_field::STATUS, &s.to_2525c().to_string()),
        Generation::D | Generation::E => {
            overwrite(code, d_field::STATUS, &s.to_2525d().to_string())
        }
    }
}
