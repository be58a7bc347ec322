//! Random patient generation.
//!
//! Lane odds depend on the clock: emergencies triple after 18:00, and outside
//! business hours some Normal walk-ins are bumped to Express.

use std::collections::BTreeMap;

use medimix_board::Medication;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Lane, Patient, PatientId};
use crate::clock::{GameClock, ShiftWindow};

const WESTERN_FIRST_NAMES: &[&str] = &[
    "James", "Emily", "Oliver", "Sophia", "Liam", "Ava", "Noah", "Isabella", "William", "Mia",
    "Benjamin", "Charlotte", "Lucas", "Amelia", "Henry", "Harper", "Ethan", "Ella", "Jacob", "Grace",
];

const SOUTH_AFRICAN_FIRST_NAMES: &[&str] = &[
    "Thabo", "Naledi", "Sipho", "Lerato", "Kabelo", "Zanele", "Mpho", "Refilwe", "Tebogo", "Karabo",
    "Lebogang", "Nomvula", "Sibusiso", "Thandi", "Vusi", "Bongani", "Dineo", "Khaya", "Lindiwe",
    "Mandla",
];

const WESTERN_SURNAMES: &[&str] = &[
    "Smith", "Johnson", "Brown", "Taylor", "Anderson", "Thomas", "Jackson", "White", "Harris",
    "Martin", "Thompson", "Clark", "Lewis", "Walker", "Hall", "Allen", "Young", "King", "Wright",
    "Scott",
];

const SOUTH_AFRICAN_SURNAMES: &[&str] = &[
    "Mokoena", "Dlamini", "Nkosi", "Mabaso", "Khumalo", "Zulu", "Ndlovu", "Sithole", "Mthembu",
    "Ngwenya", "Shabalala", "Cele", "Buthelezi", "Gumede", "Nxumalo", "Mkhize", "Moyo", "Ncube",
    "Radebe", "Van der Merwe",
];

/// Youngest generated patient.
pub const MIN_AGE: u8 = 5;
/// Oldest generated patient.
pub const MAX_AGE: u8 = 65;
/// Age from which a patient always joins the Priority lane.
pub const PRIORITY_AGE: u8 = 65;

/// Lane roll probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneOdds {
    /// Emergency chance before 18:00
    pub emergency: f64,
    /// Emergency chance from 18:00
    pub emergency_evening: f64,
    /// Express chance
    pub express: f64,
    /// Priority chance for patients under [`PRIORITY_AGE`]
    pub priority: f64,
    /// Chance to bump Normal to Express outside business hours
    pub after_hours_express: f64,
    /// Business hours for the after-hours bump. Set from the staffing
    /// config when a session starts.
    #[serde(skip)]
    pub business_hours: ShiftWindow,
}

impl Default for LaneOdds {
    fn default() -> Self {
        Self {
            emergency: 0.05,
            emergency_evening: 0.15,
            express: 0.10,
            priority: 0.15,
            after_hours_express: 0.30,
            business_hours: ShiftWindow::BUSINESS_HOURS,
        }
    }
}

/// Issues patients with monotonic ids and tickets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientGenerator {
    next_id: u64,
    next_ticket: u64,
}

impl Default for PatientGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientGenerator {
    /// Start at id 1, ticket 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            next_ticket: 1,
        }
    }

    /// Reserve the next id and ticket without generating anything.
    pub fn issue(&mut self) -> (PatientId, u64) {
        let issued = (PatientId::new(self.next_id), self.next_ticket);
        self.next_id += 1;
        self.next_ticket += 1;
        issued
    }

    /// Generate a new patient arriving at `clock`.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        clock: GameClock,
        odds: &LaneOdds,
        rng: &mut R,
    ) -> Patient {
        let (id, ticket) = self.issue();
        let name = random_name(rng);
        let age = rng.gen_range(MIN_AGE..=MAX_AGE);
        let prescription = random_prescription(rng);
        let lane = pick_lane(age, clock, odds, rng);
        Patient::new(id, ticket, name, age, lane, prescription)
    }
}

fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first_pool = if rng.gen_bool(0.5) {
        WESTERN_FIRST_NAMES
    } else {
        SOUTH_AFRICAN_FIRST_NAMES
    };
    let surname_pool = if rng.gen_bool(0.5) {
        WESTERN_SURNAMES
    } else {
        SOUTH_AFRICAN_SURNAMES
    };
    let first = first_pool.choose(rng).copied().unwrap_or("Alex");
    let last = surname_pool.choose(rng).copied().unwrap_or("Doe");
    format!("{first} {last}")
}

/// 1-3 distinct medications, each needing 1-5 units.
fn random_prescription<R: Rng + ?Sized>(rng: &mut R) -> BTreeMap<Medication, u32> {
    let count = rng.gen_range(1..=3);
    let picks: Vec<Medication> = Medication::all().choose_multiple(rng, count).copied().collect();
    picks
        .into_iter()
        .map(|med| (med, rng.gen_range(1..=5)))
        .collect()
}

/// Roll a lane for a patient of `age` arriving at `clock`.
pub fn pick_lane<R: Rng + ?Sized>(age: u8, clock: GameClock, odds: &LaneOdds, rng: &mut R) -> Lane {
    let hour = clock.hour();
    let emergency = if hour >= 18 {
        odds.emergency_evening
    } else {
        odds.emergency
    };

    let lane = if age >= PRIORITY_AGE {
        Lane::Priority
    } else if rng.gen_bool(emergency) {
        Lane::Emergency
    } else if rng.gen_bool(odds.express) {
        Lane::Express
    } else if rng.gen_bool(odds.priority) {
        Lane::Priority
    } else {
        Lane::Normal
    };

    if lane == Lane::Normal
        && !odds.business_hours.contains(clock)
        && rng.gen_bool(odds.after_hours_express)
    {
        Lane::Express
    } else {
        lane
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generated_patients_are_well_formed() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut generator = PatientGenerator::new();
        let odds = LaneOdds::default();
        for _ in 0..500 {
            let p = generator.generate(GameClock::default(), &odds, &mut rng);
            assert!((MIN_AGE..=MAX_AGE).contains(&p.age));
            assert!((1..=3).contains(&p.prescription.len()));
            assert!(p.prescription.values().all(|n| (1..=5).contains(n)));
            assert_eq!(p.max_wait, p.lane.max_wait());
            assert!(p.name.contains(' '));
            if p.age >= PRIORITY_AGE {
                assert_eq!(p.lane, Lane::Priority);
            }
        }
    }

    #[test]
    fn test_ids_and_tickets_are_monotonic() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut generator = PatientGenerator::new();
        let odds = LaneOdds::default();
        let a = generator.generate(GameClock::default(), &odds, &mut rng);
        let b = generator.generate(GameClock::default(), &odds, &mut rng);
        assert!(b.id > a.id);
        assert_eq!(b.ticket, a.ticket + 1);
    }

    #[test]
    fn test_evening_has_more_emergencies() {
        let odds = LaneOdds::default();
        let count = |hour: u8, seed: u64| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..5_000)
                .filter(|_| pick_lane(30, GameClock::at_hour(hour), &odds, &mut rng) == Lane::Emergency)
                .count()
        };
        assert!(count(19, 5) > count(10, 5));
    }

    #[test]
    fn test_after_hours_bumps_normal_to_express() {
        let odds = LaneOdds {
            emergency: 0.0,
            emergency_evening: 0.0,
            express: 0.0,
            priority: 0.0,
            after_hours_express: 1.0,
            business_hours: ShiftWindow::BUSINESS_HOURS,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        assert_eq!(pick_lane(30, GameClock::at_hour(10), &odds, &mut rng), Lane::Normal);
        assert_eq!(pick_lane(30, GameClock::at_hour(17), &odds, &mut rng), Lane::Express);
        assert_eq!(pick_lane(30, GameClock::at_hour(5), &odds, &mut rng), Lane::Express);
    }

    #[test]
    fn test_after_hours_follows_configured_window() {
        let odds = LaneOdds {
            emergency: 0.0,
            emergency_evening: 0.0,
            express: 0.0,
            priority: 0.0,
            after_hours_express: 1.0,
            business_hours: ShiftWindow::new(10, 17),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        assert_eq!(pick_lane(30, GameClock::at_hour(9), &odds, &mut rng), Lane::Express);
        assert_eq!(pick_lane(30, GameClock::at_hour(10), &odds, &mut rng), Lane::Normal);
    }
}
