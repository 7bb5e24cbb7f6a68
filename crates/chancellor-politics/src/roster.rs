//! Deterministic legislator roster generation.
//!
//! A roster is a pure function of its [`RosterConfig`] and a seed, so a game
//! whose roster blob is lost can regenerate exactly the same members.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use chancellor_types::{Constituency, Department, Ideology, Legislator, LegislatorId, Party, Region};

use crate::PoliticsError;

/// Largest roster the generator will build.
pub const MAX_SEATS: u32 = 1000;

const FIRST_NAMES: [&str; 16] = [
    "Alex", "Bridget", "Callum", "Deborah", "Emeka", "Fiona", "Gareth", "Harpreet", "Imran",
    "Joanna", "Kwame", "Lucy", "Morgan", "Nadia", "Owen", "Priya",
];

const SURNAMES: [&str; 16] = [
    "Ashworth", "Bennett", "Chowdhury", "Davies", "Evans", "Fletcher", "Gill", "Hughes",
    "Iqbal", "Jones", "Kaur", "Lloyd", "McLeod", "Norris", "Okafor", "Patel",
];

const TOWNS: [&str; 20] = [
    "Ashford", "Barnsley", "Carlisle", "Dudley", "Ealing", "Falkirk", "Grimsby", "Harlow",
    "Ipswich", "Jarrow", "Kettering", "Lewes", "Mansfield", "Newport", "Oldham", "Penrith",
    "Redcar", "Stroud", "Telford", "Wrexham",
];

const QUALIFIERS: [&str; 6] = ["North", "South", "East", "West", "Central", "Rural"];

/// Seat composition of a generated roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterConfig {
    /// Seats held by the governing party.
    #[serde(default = "default_governing")]
    pub governing: u32,

    /// Seats held by the official opposition.
    #[serde(default = "default_opposition")]
    pub opposition: u32,

    /// Seats held by minor parties.
    #[serde(default = "default_minor")]
    pub minor: u32,

    /// Independent members.
    #[serde(default = "default_independents")]
    pub independents: u32,

    /// Governing members holding a government post.
    #[serde(default = "default_payroll")]
    pub payroll: u32,
}

const fn default_governing() -> u32 {
    400
}

const fn default_opposition() -> u32 {
    180
}

const fn default_minor() -> u32 {
    60
}

const fn default_independents() -> u32 {
    10
}

const fn default_payroll() -> u32 {
    120
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            governing: default_governing(),
            opposition: default_opposition(),
            minor: default_minor(),
            independents: default_independents(),
            payroll: default_payroll(),
        }
    }
}

impl RosterConfig {
    /// Total number of seats.
    pub const fn seats(&self) -> u32 {
        self.governing
            .saturating_add(self.opposition)
            .saturating_add(self.minor)
            .saturating_add(self.independents)
    }

    /// Reject compositions the generator cannot build.
    pub fn validate(&self) -> Result<(), PoliticsError> {
        if self.governing == 0 {
            return Err(PoliticsError::InvalidComposition {
                reason: String::from("the governing party holds no seats"),
            });
        }
        if self.payroll > self.governing {
            return Err(PoliticsError::InvalidComposition {
                reason: format!(
                    "payroll of {} exceeds {} governing seats",
                    self.payroll, self.governing
                ),
            });
        }
        if self.seats() > MAX_SEATS {
            return Err(PoliticsError::InvalidComposition {
                reason: format!("{} seats exceeds the maximum of {MAX_SEATS}", self.seats()),
            });
        }
        Ok(())
    }
}

fn pick<'a>(rng: &mut impl Rng, options: &[&'a str]) -> &'a str {
    let idx = rng.random_range(0..options.len());
    options.get(idx).copied().unwrap_or_default()
}

/// Centre of each party's economic position and its hawkishness.
const fn party_profile(party: Party) -> (f64, f64) {
    match party {
        Party::Governing => (0.25, 0.55),
        Party::Opposition => (-0.35, 0.35),
        Party::Minor => (-0.1, 0.4),
        Party::Independent => (0.0, 0.45),
    }
}

fn generate_constituency(rng: &mut impl Rng) -> Constituency {
    let region = Region::ALL
        .get(rng.random_range(0..Region::ALL.len()))
        .copied()
        .unwrap_or(Region::Midlands);
    let unemployment_pct =
        (region.base_unemployment_pct() + rng.random_range(-1.5..2.5)).clamp(1.5, 12.0);
    let deprivation =
        ((unemployment_pct - 2.0) / 8.0 * 0.6 + rng.random_range(0.0..0.4)).clamp(0.0, 1.0);
    Constituency {
        name: format!("{} {}", pick(rng, &TOWNS), pick(rng, &QUALIFIERS)),
        region,
        unemployment_pct,
        deprivation,
        pensioner_share: rng.random_range(0.10..0.35),
        public_sector_share: rng.random_range(0.12..0.35),
        majority_pct: rng.random_range(0.5..35.0),
    }
}

fn generate_concerns(rng: &mut impl Rng, seat: &Constituency) -> BTreeMap<Department, f64> {
    Department::ALL
        .into_iter()
        .map(|dept| {
            let local = match dept {
                Department::Welfare => (seat.unemployment_pct - 3.0) / 10.0 + seat.deprivation * 0.2,
                Department::Pensions => seat.pensioner_share,
                Department::Health => seat.pensioner_share * 0.5 + 0.1,
                Department::Education | Department::Policing => seat.public_sector_share * 0.5,
                Department::Housing | Department::LocalGovernment => seat.deprivation * 0.3,
                Department::Defence | Department::Transport | Department::Justice => 0.0,
            };
            let weight = 0.2 + rng.random_range(0.0..0.3) + local;
            (dept, weight.clamp(0.0, 1.0))
        })
        .collect()
}

fn generate_member(rng: &mut impl Rng, id: LegislatorId, party: Party, payroll: bool) -> Legislator {
    let (economic_centre, hawk_centre) = party_profile(party);
    let constituency = generate_constituency(rng);
    let concerns = generate_concerns(rng, &constituency);
    let spread: f64 = rng.random();
    let mut rebelliousness = spread * spread * 0.8;
    if payroll {
        rebelliousness *= 0.5;
    }
    Legislator {
        id,
        name: format!("{} {}", pick(rng, &FIRST_NAMES), pick(rng, &SURNAMES)),
        constituency,
        party,
        payroll,
        ideology: Ideology {
            economic: (economic_centre + rng.random_range(-0.35..0.35)).clamp(-1.0, 1.0),
            fiscal_hawk: (hawk_centre + rng.random_range(-0.3..0.3)).clamp(0.0, 1.0),
        },
        rebelliousness,
        concerns,
    }
}

/// Build a roster from `config`, identical for identical `(config, seed)`.
///
/// Members are numbered from 1: governing members first (payroll before
/// backbench), then opposition, minor parties and independents.
pub fn generate_roster(
    config: &RosterConfig,
    seed: u64,
) -> Result<BTreeMap<LegislatorId, Legislator>, PoliticsError> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut roster = BTreeMap::new();
    let mut id = LegislatorId(1);

    let blocks = [
        (Party::Governing, config.governing),
        (Party::Opposition, config.opposition),
        (Party::Minor, config.minor),
        (Party::Independent, config.independents),
    ];
    for (party, seats) in blocks {
        for n in 0..seats {
            let payroll = party == Party::Governing && n < config.payroll;
            roster.insert(id, generate_member(&mut rng, id, party, payroll));
            id = id.next();
        }
    }
    Ok(roster)
}
