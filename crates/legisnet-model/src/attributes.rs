//! Pure attribute derivations shared by both graph builders.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Full years elapsed between `birthdate` and `reference`.
///
/// Returns `None` when the birthdate lies after the reference date.
pub fn age_on(birthdate: NaiveDate, reference: NaiveDate) -> Option<u32> {
    if birthdate > reference {
        return None;
    }
    let mut years = reference.year() - birthdate.year();
    if (reference.month(), reference.day()) < (birthdate.month(), birthdate.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBracket {
    Under30,
    Thirties,
    Forties,
    Fifties,
    Sixties,
    SeventyPlus,
}

impl AgeBracket {
    pub fn from_age(age: u32) -> Self {
        match age {
            0..=29 => Self::Under30,
            30..=39 => Self::Thirties,
            40..=49 => Self::Forties,
            50..=59 => Self::Fifties,
            60..=69 => Self::Sixties,
            _ => Self::SeventyPlus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Under30 => "<30",
            Self::Thirties => "30-39",
            Self::Forties => "40-49",
            Self::Fifties => "50-59",
            Self::Sixties => "60-69",
            Self::SeventyPlus => "70+",
        }
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Geographic macro-region of a federative unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    Norte,
    Nordeste,
    CentroOeste,
    Sudeste,
    Sul,
}

impl Region {
    /// Map a two-letter state code (UF) to its region.
    pub fn from_state(uf: &str) -> Option<Self> {
        let uf = uf.trim().to_ascii_uppercase();
        let region = match uf.as_str() {
            "AC" | "AM" | "AP" | "PA" | "RO" | "RR" | "TO" => Self::Norte,
            "AL" | "BA" | "CE" | "MA" | "PB" | "PE" | "PI" | "RN" | "SE" => Self::Nordeste,
            "DF" | "GO" | "MS" | "MT" => Self::CentroOeste,
            "ES" | "MG" | "RJ" | "SP" => Self::Sudeste,
            "PR" | "RS" | "SC" => Self::Sul,
            _ => return None,
        };
        Some(region)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Norte => "Norte",
            Self::Nordeste => "Nordeste",
            Self::CentroOeste => "Centro-Oeste",
            Self::Sudeste => "Sudeste",
            Self::Sul => "Sul",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
