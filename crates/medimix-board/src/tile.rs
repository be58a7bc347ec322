//! Medication alphabet and tile values.
//!
//! Every board cell holds a [`Tile`]: either one medication from the fixed
//! alphabet or nothing (a cell that was just cleared and awaits refill).

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A medication that can sit on the board and appear on a prescription.
///
/// The declaration order is the canonical order used when iterating
/// dispensed records, so it must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Medication {
    /// Oral capsule
    Capsulon = 0,
    /// Oral tablet
    Tablix = 1,
    /// Liquid syrup
    Syrupix = 2,
    /// Oral pill pack
    Pillora = 3,
    /// Injection
    Injecta = 4,
    /// Topical gel
    Gelux = 5,
    /// Vitamin pack
    VitaDose = 6,
}

impl Medication {
    /// Total number of medications.
    pub const COUNT: usize = 7;

    /// Get all medications as a slice.
    #[must_use]
    pub const fn all() -> &'static [Medication] {
        &[
            Medication::Capsulon,
            Medication::Tablix,
            Medication::Syrupix,
            Medication::Pillora,
            Medication::Injecta,
            Medication::Gelux,
            Medication::VitaDose,
        ]
    }

    /// Get the index of this medication.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Display name used on tiles and prescriptions.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Capsulon => "Capsulon",
            Self::Tablix => "Tablix",
            Self::Syrupix => "Syrupix",
            Self::Pillora => "Pillora",
            Self::Injecta => "Injecta",
            Self::Gelux => "Gelux",
            Self::VitaDose => "VitaDose",
        }
    }

    /// How the medication is administered.
    #[must_use]
    pub const fn modality(self) -> &'static str {
        match self {
            Self::Capsulon => "Oral Capsule",
            Self::Tablix => "Oral Tablet",
            Self::Syrupix => "Liquid Syrup",
            Self::Pillora => "Oral Pill Pack",
            Self::Injecta => "Injection",
            Self::Gelux => "Topical Gel",
            Self::VitaDose => "Vitamin Pack",
        }
    }

    /// Draw a medication uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::all()[rng.gen_range(0..Self::COUNT)]
    }

    /// Look a medication up by its display name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|med| med.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Medication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One board cell. `None` marks an empty slot waiting for gravity/refill.
pub type Tile = Option<Medication>;
