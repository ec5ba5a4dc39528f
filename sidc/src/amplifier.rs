//! Echelon and mobility amplifiers, and the headquarters, task force
//! and feint/dummy indicators.

use std::ops::BitOr;

use serde::{Deserialize, Serialize};

#[cfg(test)]
use test_strategy::Arbitrary;

use super::code::{c_field, char_at, d_field, overwrite};
use super::generation::Generation;

#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Amplifier {
    TeamCrew,
    Squad,
    Section,
    PlatoonDetachment,
    CompanyBatteryTroop,
    BattalionSquadron,
    RegimentGroup,
    Brigade,
    Division,
    CorpsMef,
    Army,
    ArmyGroupFront,
    RegionTheater,
    Command,
    WheeledLimitedCrossCountry,
    WheeledCrossCountry,
    Tracked,
    WheeledAndTracked,
    Towed,
    Rail,
    PackAnimals,
    OverSnow,
    Sled,
    Barge,
    Amphibious,
    TowedArrayShort,
    TowedArrayLong,
}

/// Each amplifier with its 2525C letters and its 2525D digits.  For
/// echelons the 2525C form is the single letter at position 11; for
/// mobility it is the pair at positions 10 and 11.
const AMPLIFIERS: [(Amplifier, &str, &str); 27] = [
    (Amplifier::TeamCrew, "A", "11"),
    (Amplifier::Squad, "B", "12"),
    (Amplifier::Section, "C", "13"),
    (Amplifier::PlatoonDetachment, "D", "14"),
    (Amplifier::CompanyBatteryTroop, "E", "15"),
    (Amplifier::BattalionSquadron, "F", "16"),
    (Amplifier::RegimentGroup, "G", "17"),
    (Amplifier::Brigade, "H", "18"),
    (Amplifier::Division, "I", "21"),
    (Amplifier::CorpsMef, "J", "22"),
    (Amplifier::Army, "K", "23"),
    (Amplifier::ArmyGroupFront, "L", "24"),
    (Amplifier::RegionTheater, "M", "25"),
    (Amplifier::Command, "N", "26"),
    (Amplifier::WheeledLimitedCrossCountry, "MO", "31"),
    (Amplifier::WheeledCrossCountry, "MP", "32"),
    (Amplifier::Tracked, "MQ", "33"),
    (Amplifier::WheeledAndTracked, "MR", "34"),
    (Amplifier::Towed, "MS", "35"),
    (Amplifier::Rail, "MT", "36"),
    (Amplifier::PackAnimals, "MW", "37"),
    (Amplifier::OverSnow, "MU", "41"),
    (Amplifier::Sled, "MV", "42"),
    (Amplifier::Barge, "MX", "51"),
    (Amplifier::Amphibious, "MY", "52"),
    (Amplifier::TowedArrayShort, "NS", "61"),
    (Amplifier::TowedArrayLong, "NL", "62"),
];

impl Amplifier {
    fn entry(&self) -> &'static (Amplifier, &'static str, &'static str) {
        AMPLIFIERS
            .iter()
            .find(|(a, _, _)| a == self)
            .unwrap_or(&AMPLIFIERS[0])
    }

    pub fn is_echelon(&self) -> bool {
        self.entry().1.len() == 1
    }

    pub fn to_2525c(&self) -> &'static str {
        self.entry().1
    }

    pub fn to_2525d(&self) -> &'static str {
        self.entry().2
    }

    pub fn from_2525d(digits: &str) -> Option<Amplifier> {
        AMPLIFIERS
            .iter()
            .find(|(_, _, d)| *d == digits)
            .map(|(a, _, _)| *a)
    }

    fn mobility_from_2525c(pair: &str) -> Option<Amplifier> {
        AMPLIFIERS
            .iter()
            .find(|(_, c, _)| c.len() == 2 && *c == pair)
            .map(|(a, _, _)| *a)
    }

    fn echelon_from_2525c(letter: char) -> Option<Amplifier> {
        AMPLIFIERS
            .iter()
            .find(|(_, c, _)| c.len() == 1 && c.starts_with(letter))
            .map(|(a, _, _)| *a)
    }
}

fn c_modifier_pair(code: &str) -> Option<String> {
    let first = char_at(code, c_field::MODIFIER_1)?;
    let second = char_at(code, c_field::MODIFIER_2)?;
    Some([first, second].iter().collect())
}

pub fn amplifier(code: &str, generation: Generation) -> Option<Amplifier> {
    match generation {
        Generation::C => {
            let pair = c_modifier_pair(code)?;
            Amplifier::mobility_from_2525c(&pair).or_else(|| {
                pair.chars()
                    .nth(1)
                    .and_then(Amplifier::echelon_from_2525c)
            })
        }
        Generation::D | Generation::E => {
            let digits: String = code
                .chars()
                .skip(d_field::AMPLIFIER)
                .take(2)
                .collect();
            Amplifier::from_2525d(&digits)
        }
    }
}

pub fn with_amplifier(code: &str, generation: Generation, amplifier: Amplifier) -> String {
    match generation {
        Generation::C if amplifier.is_echelon() => {
            // An echelon replaces any mobility indicator.
            let code = match c_modifier_pair(code) {
                Some(pair) if Amplifier::mobility_from_2525c(&pair).is_some() => {
                    overwrite(code, c_field::MODIFIER_1, "-")
                }
                _ => code.to_string(),
            };
            overwrite(&code, c_field::MODIFIER_2, amplifier.to_2525c())
        }
        Generation::C => overwrite(code, c_field::MODIFIER_1, amplifier.to_2525c()),
        Generation::D | Generation::E => {
            overwrite(code, d_field::AMPLIFIER, amplifier.to_2525d())
        }
    }
}

/// A set of the headquarters, task force and feint/dummy
/// indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HqTfDummy(u8);

/// 2525C letters indexed by the indicator bits.
const HQ_TF_DUMMY_LETTERS: [char; 8] = ['-', 'F', 'A', 'C', 'E', 'G', 'B', 'D'];

impl HqTfDummy {
    pub const NONE: HqTfDummy = HqTfDummy(0);
    pub const FEINT_DUMMY: HqTfDummy = HqTfDummy(1);
    pub const HEADQUARTERS: HqTfDummy = HqTfDummy(2);
    pub const TASK_FORCE: HqTfDummy = HqTfDummy(4);

    pub fn from_bits(bits: u8) -> Option<HqTfDummy> {
        if bits < 8 {
            Some(HqTfDummy(bits))
        } else {
            None
        }
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, other: HqTfDummy) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn to_2525c(&self) -> char {
        HQ_TF_DUMMY_LETTERS[usize::from(self.0 & 7)]
    }

    pub fn from_2525c(ch: char) -> Option<HqTfDummy> {
        HQ_TF_DUMMY_LETTERS
            .iter()
            .position(|letter| *letter == ch)
            .map(|bits| HqTfDummy(bits as u8))
    }
}

impl BitOr for HqTfDummy {
    type Output = HqTfDummy;

    fn bitor(self, rhs: HqTfDummy) -> HqTfDummy {
        HqTfDummy(self.0 | rhs.0)
    }
}

pub fn hq_tf_dummy(code: &str, generation: Generation) -> Option<HqTfDummy> {
    match generation {
        Generation::C => HqTfDummy::from_2525c(char_at(code, c_field::MODIFIER_1)?),
        Generation::D | Generation::E => {
            let digit = char_at(code, d_field::HQ_TF_DUMMY)?.to_digit(10)?;
            HqTfDummy::from_bits(digit as u8)
        }
    }
}

pub fn with_hq_tf_dummy(code: &str, generation: Generation, mask: HqTfDummy) -> String {
    match generation {
        Generation::C => {
            // The indicator shares position 10 with the first letter
            // of a mobility indicator, whose second letter is then
            // meaningless.
            let code = match c_modifier_pair(code) {
                Some(pair) if Amplifier::mobility_from_2525c(&pair).is_some() => {
                    overwrite(code, c_field::MODIFIER_2, "-")
                }
                _ => code.to_string(),
            };
            overwrite(&code, c_field::MODIFIER_1, &mask.to_2525c().to_string())
        }
        Generation::D | Generation::E => {
            overwrite(code, d_field::HQ_TF_DUMMY, &mask.bits().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn test_echelon_in_2525c() {
        assert_eq!(
            amplifier("SFGPUCI----E---", Generation::C),
            Some(Amplifier::CompanyBatteryTroop)
        );
        assert_eq!(
            with_amplifier("SFGPUCI--------", Generation::C, Amplifier::Division),
            "SFGPUCI----I---"
        );
    }

    #[test]
    fn test_mobility_in_2525c() {
        assert_eq!(
            amplifier("SFGPEVAT--MQ---", Generation::C),
            Some(Amplifier::Tracked)
        );
        // Replacing mobility by an echelon clears the mobility marker.
        assert_eq!(
            with_amplifier("SFGPEVAT--MQ---", Generation::C, Amplifier::Squad),
            "SFGPEVAT---B---"
        );
    }

    #[test]
    fn test_amplifier_in_2525d() {
        assert_eq!(
            amplifier("10031000161211000000", Generation::D),
            Some(Amplifier::BattalionSquadron)
        );
        assert_eq!(
            with_amplifier("10031000001211000000", Generation::D, Amplifier::TowedArrayLong),
            "10031000621211000000"
        );
        assert_eq!(amplifier("10031000001211000000", Generation::D), None);
    }

    #[test]
    fn test_hq_tf_dummy() {
        let all = HqTfDummy::HEADQUARTERS | HqTfDummy::TASK_FORCE | HqTfDummy::FEINT_DUMMY;
        assert_eq!(all.to_2525c(), 'D');
        assert!(all.contains(HqTfDummy::TASK_FORCE));
        assert_eq!(
            hq_tf_dummy("SFGPUCI---A----", Generation::C),
            Some(HqTfDummy::HEADQUARTERS)
        );
        assert_eq!(
            with_hq_tf_dummy("10031000001211000000", Generation::D, all),
            "10031007001211000000"
        );
        assert_eq!(
            with_hq_tf_dummy("SFGPEVAT--MQ---", Generation::C, HqTfDummy::TASK_FORCE),
            "SFGPEVAT--E----"
        );
        assert_eq!(hq_tf_dummy("SFGPUCI---H----", Generation::C), None);
    }

    #[proptest]
    fn amplifier_survives_both_encodings(a: Amplifier) {
        let c = with_amplifier("SFGPUCI--------", Generation::C, a);
        assert_eq!(amplifier(&c, Generation::C), Some(a));
        let d = with_amplifier("10031000001211000000", Generation::D, a);
        assert_eq!(amplifier(&d, Generation::D), Some(a));
    }

    #[proptest]
    fn hq_tf_dummy_survives_both_encodings(#[strategy(0u8..8)] bits: u8) {
        let mask = HqTfDummy::from_bits(bits).unwrap();
        let c = with_hq_tf_dummy("SFGPUCI--------", Generation::C, mask);
        assert_eq!(hq_tf_dummy(&c, Generation::C), Some(mask));
        let d = with_hq_tf_dummy("10031000001211000000", Generation::D, mask);
        assert_eq!(hq_tf_dummy(&d, Generation::D), Some(mask));
    }
}
