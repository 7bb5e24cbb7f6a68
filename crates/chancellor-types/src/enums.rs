//! Enumeration types for the Chancellor simulation.
//!
//! Every enum serializes in `snake_case` so that legacy saves which used
//! department or lever names as object keys decode without translation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Departments and spending components
// ---------------------------------------------------------------------------

/// A spending department with its own current/capital budget lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Department {
    /// Health and social care.
    Health,
    /// Schools, further and higher education.
    Education,
    /// Armed forces and procurement.
    Defence,
    /// Working-age benefits.
    Welfare,
    /// State pension and pensioner benefits.
    Pensions,
    /// Roads, rail and local transport.
    Transport,
    /// Police forces and the Home Office.
    Policing,
    /// Courts and prisons.
    Justice,
    /// Housing and planning.
    Housing,
    /// Grants to local authorities.
    LocalGovernment,
}

impl Department {
    /// Every department, in canonical order.
    pub const ALL: [Self; 10] = [
        Self::Health,
        Self::Education,
        Self::Defence,
        Self::Welfare,
        Self::Pensions,
        Self::Transport,
        Self::Policing,
        Self::Justice,
        Self::Housing,
        Self::LocalGovernment,
    ];

    /// Historical share of total departmental spending that is capital.
    ///
    /// Used to split legacy saves that only recorded a single figure per
    /// department. Expressed in basis points to keep the split exact.
    pub const fn capital_share_bp(self) -> u32 {
        match self {
            Self::Health => 625,
            Self::Education => 889,
            Self::Defence => 2500,
            Self::Welfare => 74,
            Self::Pensions => 0,
            Self::Transport => 6316,
            Self::Policing => 909,
            Self::Justice => 1111,
            Self::Housing => 6000,
            Self::LocalGovernment => 1250,
        }
    }

    /// Human-readable name.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Education => "education",
            Self::Defence => "defence",
            Self::Welfare => "welfare",
            Self::Pensions => "pensions",
            Self::Transport => "transport",
            Self::Policing => "policing",
            Self::Justice => "justice",
            Self::Housing => "housing",
            Self::LocalGovernment => "local government",
        }
    }
}

impl core::fmt::Display for Department {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which side of a department's budget a figure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SpendingComponent {
    /// Day-to-day resource spending.
    Current,
    /// Investment spending.
    Capital,
}

// ---------------------------------------------------------------------------
// Taxes
// ---------------------------------------------------------------------------

/// A tax rate the chancellor can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TaxLever {
    /// Basic rate of income tax.
    IncomeTaxBasic,
    /// Higher rate of income tax.
    IncomeTaxHigher,
    /// Additional rate of income tax.
    IncomeTaxAdditional,
    /// Employee national insurance.
    NationalInsurance,
    /// Standard rate of VAT.
    Vat,
    /// Main rate of corporation tax.
    CorporationTax,
}

impl TaxLever {
    /// Every lever, in canonical order.
    pub const ALL: [Self; 6] = [
        Self::IncomeTaxBasic,
        Self::IncomeTaxHigher,
        Self::IncomeTaxAdditional,
        Self::NationalInsurance,
        Self::Vat,
        Self::CorporationTax,
    ];

    /// Whether a large rise in this lever triggers legislative friction.
    pub const fn is_primary(self) -> bool {
        !matches!(self, Self::IncomeTaxAdditional)
    }

    /// Whether a rise lands directly on ordinary households.
    pub const fn is_broad_based(self) -> bool {
        matches!(
            self,
            Self::IncomeTaxBasic | Self::NationalInsurance | Self::Vat
        )
    }

    /// Human-readable name.
    pub const fn label(self) -> &'static str {
        match self {
            Self::IncomeTaxBasic => "basic rate income tax",
            Self::IncomeTaxHigher => "higher rate income tax",
            Self::IncomeTaxAdditional => "additional rate income tax",
            Self::NationalInsurance => "national insurance",
            Self::Vat => "VAT",
            Self::CorporationTax => "corporation tax",
        }
    }
}

impl core::fmt::Display for TaxLever {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Legislature
// ---------------------------------------------------------------------------

/// Party grouping of a legislator relative to the government.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Party {
    /// The party of government.
    Governing,
    /// The official opposition.
    Opposition,
    /// Smaller opposition parties.
    Minor,
    /// Members sitting without a party whip.
    Independent,
}

/// Electoral region of a constituency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Region {
    /// London.
    London,
    /// South East England.
    SouthEast,
    /// South West England.
    SouthWest,
    /// East of England.
    East,
    /// The Midlands.
    Midlands,
    /// North West England.
    NorthWest,
    /// North East England and Yorkshire.
    NorthEast,
    /// Wales.
    Wales,
    /// Scotland.
    Scotland,
}

impl Region {
    /// Every region, in canonical order.
    pub const ALL: [Self; 9] = [
        Self::London,
        Self::SouthEast,
        Self::SouthWest,
        Self::East,
        Self::Midlands,
        Self::NorthWest,
        Self::NorthEast,
        Self::Wales,
        Self::Scotland,
    ];

    /// Typical unemployment rate for constituencies in this region.
    pub const fn base_unemployment_pct(self) -> f64 {
        match self {
            Self::London => 4.8,
            Self::SouthEast | Self::East => 3.6,
            Self::SouthWest => 3.3,
            Self::Midlands => 4.6,
            Self::NorthWest => 4.4,
            Self::NorthEast => 5.6,
            Self::Wales => 4.1,
            Self::Scotland => 4.3,
        }
    }

    /// Human-readable name.
    pub const fn label(self) -> &'static str {
        match self {
            Self::London => "London",
            Self::SouthEast => "South East",
            Self::SouthWest => "South West",
            Self::East => "East of England",
            Self::Midlands => "Midlands",
            Self::NorthWest => "North West",
            Self::NorthEast => "North East",
            Self::Wales => "Wales",
            Self::Scotland => "Scotland",
        }
    }
}

/// A legislator's position on the current budget proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum StanceLabel {
    /// Will vote with the government.
    Support,
    /// Will vote against or abstain.
    Oppose,
    /// Could go either way.
    Undecided,
}

impl StanceLabel {
    /// Scores at or above this value are labelled [`StanceLabel::Support`].
    pub const SUPPORT_THRESHOLD: f64 = 60.0;

    /// Scores at or below this value are labelled [`StanceLabel::Oppose`].
    pub const OPPOSE_THRESHOLD: f64 = 40.0;

    /// Derive the label for a 0--100 stance score.
    ///
    /// This is the single band definition shared by the stance model, the
    /// vote simulator, bloc summaries and the normalizer.
    pub fn from_score(score: f64) -> Self {
        if score >= Self::SUPPORT_THRESHOLD {
            Self::Support
        } else if score <= Self::OPPOSE_THRESHOLD {
            Self::Oppose
        } else {
            Self::Undecided
        }
    }

    /// Inclusive score range mapped to this label.
    pub const fn band(self) -> (f64, f64) {
        match self {
            Self::Support => (Self::SUPPORT_THRESHOLD, 100.0),
            Self::Oppose => (0.0, Self::OPPOSE_THRESHOLD),
            Self::Undecided => (40.5, 59.5),
        }
    }
}

/// How a single legislator voted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Ballot {
    /// Voted for the budget.
    Aye,
    /// Voted against the budget.
    No,
    /// Did not vote.
    Abstain,
}

/// Which simulation path produced a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum VoteMode {
    /// Per-member stances were available.
    Granular,
    /// Only summary statistics were available.
    Aggregate,
}

/// Narrative classification of a vote outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum VoteNarrative {
    /// The budget was voted down.
    Defeat,
    /// The budget passed on a thin majority.
    NarrowWin,
    /// The budget passed despite a sizeable rebellion.
    LargeDissent,
    /// The budget passed comfortably.
    CleanWin,
}

// ---------------------------------------------------------------------------
// Fiscal rules and constraints
// ---------------------------------------------------------------------------

/// A single dynamic constraint produced by a fiscal-rule framework.
///
/// Percentages are stored in basis points of GDP so the type stays `Eq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RuleConstraint {
    /// Revenue must cover current spending plus debt interest.
    CurrentBudgetBalance,
    /// Revenue must cover all spending plus debt interest.
    OverallBalance,
    /// The deficit must not exceed the given share of GDP.
    DeficitCeiling {
        /// Maximum deficit in basis points of GDP.
        max_bp: u32,
    },
    /// Debt must not exceed the given share of GDP.
    DebtTarget {
        /// Maximum debt in basis points of GDP.
        max_bp: u32,
    },
    /// Debt as a share of GDP must be falling.
    DebtFalling,
}

/// The selected fiscal-rule framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FiscalRuleKind {
    /// Current budget in balance and debt falling.
    StabilityRule,
    /// Borrow only to invest.
    GoldenRule,
    /// Overall budget in balance.
    BalancedBudget,
    /// Debt below 100% of GDP and deficit below 3%.
    DebtAnchor,
    /// Deficit below 3% of GDP.
    DeficitCeiling,
}

impl FiscalRuleKind {
    /// The dynamic constraints this framework imposes.
    pub fn constraints(self) -> Vec<RuleConstraint> {
        match self {
            Self::StabilityRule => vec![
                RuleConstraint::CurrentBudgetBalance,
                RuleConstraint::DebtFalling,
            ],
            Self::GoldenRule => vec![RuleConstraint::CurrentBudgetBalance],
            Self::BalancedBudget => vec![RuleConstraint::OverallBalance],
            Self::DebtAnchor => vec![
                RuleConstraint::DebtTarget { max_bp: 10_000 },
                RuleConstraint::DeficitCeiling { max_bp: 300 },
            ],
            Self::DeficitCeiling => vec![RuleConstraint::DeficitCeiling { max_bp: 300 }],
        }
    }
}

/// Identifies one constraint evaluated by the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ConstraintId {
    /// Manifesto pledge not to raise a tax lever.
    TaxLock(TaxLever),
    /// Manifesto pledge not to cut a protected department.
    SpendingFloor(Department),
    /// A constraint generated by the active fiscal rule.
    Rule(RuleConstraint),
}

/// How serious a constraint breach is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Severity {
    /// Not breached.
    None,
    /// A marginal breach.
    Minor,
    /// A clear breach.
    Major,
    /// A flagrant breach.
    Critical,
}

// ---------------------------------------------------------------------------
// Game flow
// ---------------------------------------------------------------------------

/// Game mode selected at new-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GameMode {
    /// Full game with events and votes.
    #[default]
    Standard,
    /// No events are raised.
    Sandbox,
}

/// Category of a temporary policy risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RiskKind {
    /// Bond-market nerves that add to gilt yields.
    MarketJitters,
    /// Strikes that drag on growth.
    IndustrialAction,
    /// Uncertainty that weighs on investment.
    PolicyUncertainty,
    /// A rating agency review adding to gilt yields.
    CreditRatingWatch,
}

/// Category of a raised event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventKind {
    /// An external crisis.
    Crisis,
    /// A demand from the prime minister.
    PmDemand,
}

/// How the chancellor approaches a lobbied legislator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LobbyApproach {
    /// A one-to-one conversation.
    PersonalAppeal,
    /// Pressure applied through the whips' office.
    WhipPressure,
    /// Protect a department the member cares about.
    ConstituencyPromise(Department),
}
