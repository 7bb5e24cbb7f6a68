//! The game state tree.
//!
//! [`GameState`] is the root aggregate. Every sub-tree implements
//! [`Default`] with the new-game values and is `#[serde(default)]`, so a
//! blob missing a field inherits the default for exactly that field.
//! Associative containers go through [`crate::codec::pair_seq`].
//!
//! Money is annualised £bn held as [`Decimal`]. Rates and scores that feed
//! probabilistic models are `f64`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::budget::{BudgetChanges, DeferredBudget};
use crate::enums::{
    ConstraintId, Department, EventKind, FiscalRuleKind, GameMode, Party, Region, RiskKind,
    Severity, SpendingComponent, StanceLabel, TaxLever,
};
use crate::ids::{EventId, LegislatorId, ProgrammeId, PromiseId, RosterId};
use crate::vote::{VoteRecord, VoteResult};

/// Current save schema version, stamped by the normalizer.
pub const SCHEMA_VERSION: u32 = 3;

/// Default length of a game in monthly turns.
pub const DEFAULT_TOTAL_TURNS: u32 = 60;

// ---------------------------------------------------------------------------
// Root
// ---------------------------------------------------------------------------

/// Complete snapshot of a game in progress.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct GameState {
    /// Clock, mode and identity of the game.
    pub metadata: Metadata,
    /// Taxes, spending and derived fiscal aggregates.
    pub fiscal: FiscalState,
    /// Macroeconomic indicators.
    pub economy: MacroState,
    /// Political capital scores.
    pub political: PoliticalState,
    /// Roster, stances, promises and vote history.
    pub legislature: Legislature,
    /// Manifesto pledges and the latest constraint check.
    pub manifesto: ManifestoState,
    /// Temporary policy risks.
    pub risk_modifiers: Vec<PolicyRiskModifier>,
    /// Time-limited emergency spending programmes.
    pub emergency_programmes: Vec<EmergencyProgramme>,
    /// Raised events awaiting a response.
    pub events: EventLog,
    /// Submissions held back by legislative friction.
    pub pending_budgets: Vec<DeferredBudget>,
    /// The last proposal that lost its vote, kept for revision.
    pub failed_budget: Option<BudgetChanges>,
}

/// Clock and identity of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct Metadata {
    /// Save schema version.
    pub schema_version: u32,
    /// Zero-based turn counter; one turn is one month.
    pub turn: u32,
    /// Calendar month, 1--12.
    pub month: u8,
    /// Calendar year.
    pub year: i32,
    /// Number of turns in the game; the last turn is `total_turns - 1`.
    pub total_turns: u32,
    /// Game mode.
    pub mode: GameMode,
    /// Set once the terminal turn is reached.
    pub game_over: bool,
    /// Seed for every deterministic roll in the game.
    pub seed: u64,
    /// Active fiscal-rule framework.
    pub fiscal_rule: FiscalRuleKind,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            turn: 0,
            month: 7,
            year: 2024,
            total_turns: DEFAULT_TOTAL_TURNS,
            mode: GameMode::Standard,
            game_over: false,
            seed: 20_240_704,
            fiscal_rule: FiscalRuleKind::StabilityRule,
        }
    }
}

// ---------------------------------------------------------------------------
// Fiscal
// ---------------------------------------------------------------------------

/// One department's budget.
///
/// `total` is always `current + capital`; it is stored only so that
/// consumers of the snapshot do not need to re-derive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct DepartmentBudget {
    /// Day-to-day spending, £bn.
    #[ts(as = "String")]
    pub current: Decimal,
    /// Investment spending, £bn.
    #[ts(as = "String")]
    pub capital: Decimal,
    /// Aggregate of both components, £bn.
    #[ts(as = "String")]
    pub total: Decimal,
}

impl DepartmentBudget {
    /// Build a budget with its aggregate derived.
    pub fn new(current: Decimal, capital: Decimal) -> Self {
        Self {
            current,
            capital,
            total: current.saturating_add(capital),
        }
    }

    /// Read one component.
    pub const fn component(&self, component: SpendingComponent) -> Decimal {
        match component {
            SpendingComponent::Current => self.current,
            SpendingComponent::Capital => self.capital,
        }
    }
}

/// A named programme inside a department component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LineItem {
    /// Owning department.
    pub department: Department,
    /// Which component the item is part of.
    pub component: SpendingComponent,
    /// Annual amount, £bn.
    #[ts(as = "String")]
    pub amount: Decimal,
}

/// Snapshot taken at the start of each fiscal year.
///
/// Spending floors are measured against this, never against a figure that
/// compounds month to month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct FiscalBaseline {
    /// Fiscal year the snapshot belongs to (April start year).
    pub fiscal_year: i32,
    /// Department aggregates at the snapshot.
    #[serde(with = "crate::codec::pair_seq")]
    #[ts(as = "Vec<(Department, String)>")]
    pub department_totals: BTreeMap<Department, Decimal>,
    /// Tax rates at the snapshot.
    #[serde(with = "crate::codec::pair_seq")]
    #[ts(as = "Vec<(TaxLever, String)>")]
    pub tax_rates: BTreeMap<TaxLever, Decimal>,
}

impl Default for FiscalBaseline {
    fn default() -> Self {
        let fiscal = FiscalState::starting_lines();
        Self {
            fiscal_year: 2024,
            department_totals: fiscal
                .departments
                .iter()
                .map(|(d, b)| (*d, b.total))
                .collect(),
            tax_rates: fiscal.tax_rates,
        }
    }
}

/// Taxes, spending and the derived fiscal position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct FiscalState {
    /// Tax rates in percent.
    #[serde(with = "crate::codec::pair_seq")]
    #[ts(as = "Vec<(TaxLever, String)>")]
    pub tax_rates: BTreeMap<TaxLever, Decimal>,
    /// Per-department budgets.
    #[serde(with = "crate::codec::pair_seq")]
    #[ts(as = "Vec<(Department, DepartmentBudget)>")]
    pub departments: BTreeMap<Department, DepartmentBudget>,
    /// Sum of department aggregates, £bn.
    #[ts(as = "String")]
    pub total_spending: Decimal,
    /// Named programmes within department components.
    #[serde(with = "crate::codec::pair_seq")]
    #[ts(as = "Vec<(String, LineItem)>")]
    pub line_items: BTreeMap<String, LineItem>,
    /// Fiscal-year-start snapshot.
    pub baseline: FiscalBaseline,
    /// Annual receipts, £bn. Written by the monthly simulation.
    #[ts(as = "String")]
    pub revenue: Decimal,
    /// Annual debt interest, £bn. Written by the monthly simulation.
    #[ts(as = "String")]
    pub debt_interest: Decimal,
    /// Annual overall deficit, £bn. Written by the monthly simulation.
    #[ts(as = "String")]
    pub deficit: Decimal,
    /// Receipts less current spending and interest, £bn.
    #[ts(as = "String")]
    pub current_balance: Decimal,
    /// Stock of debt, £bn.
    #[ts(as = "String")]
    pub debt: Decimal,
    /// Debt as a percentage of GDP.
    #[ts(as = "String")]
    pub debt_to_gdp: Decimal,
}

impl FiscalState {
    /// Tax rates and department lines at the start of a new game, with
    /// derived fields left at zero.
    pub fn starting_lines() -> Self {
        let tax_rates = [
            (TaxLever::IncomeTaxBasic, Decimal::new(20, 0)),
            (TaxLever::IncomeTaxHigher, Decimal::new(40, 0)),
            (TaxLever::IncomeTaxAdditional, Decimal::new(45, 0)),
            (TaxLever::NationalInsurance, Decimal::new(8, 0)),
            (TaxLever::Vat, Decimal::new(20, 0)),
            (TaxLever::CorporationTax, Decimal::new(25, 0)),
        ]
        .into_iter()
        .collect();

        let departments: BTreeMap<Department, DepartmentBudget> = [
            (Department::Health, 180, 120),
            (Department::Education, 82, 80),
            (Department::Defence, 42, 140),
            (Department::Welfare, 135, 10),
            (Department::Pensions, 138, 0),
            (Department::Transport, 14, 240),
            (Department::Policing, 20, 20),
            (Department::Justice, 12, 15),
            (Department::Housing, 8, 120),
            (Department::LocalGovernment, 35, 50),
        ]
        .into_iter()
        .map(|(dept, current, capital_tenths)| {
            (
                dept,
                DepartmentBudget::new(Decimal::new(current, 0), Decimal::new(capital_tenths, 1)),
            )
        })
        .collect();

        let line_items = [
            ("nhs_england", Department::Health, SpendingComponent::Current, 150),
            ("schools_core", Department::Education, SpendingComponent::Current, 55),
            ("state_pension", Department::Pensions, SpendingComponent::Current, 125),
            ("rail_network", Department::Transport, SpendingComponent::Capital, 16),
            ("affordable_homes", Department::Housing, SpendingComponent::Capital, 8),
        ]
        .into_iter()
        .map(|(key, department, component, amount)| {
            (
                key.to_owned(),
                LineItem {
                    department,
                    component,
                    amount: Decimal::new(amount, 0),
                },
            )
        })
        .collect();

        let total_spending = departments
            .values()
            .fold(Decimal::ZERO, |acc, b| acc.saturating_add(b.total));

        Self {
            tax_rates,
            departments,
            total_spending,
            line_items,
            baseline: FiscalBaseline {
                fiscal_year: 2024,
                department_totals: BTreeMap::new(),
                tax_rates: BTreeMap::new(),
            },
            revenue: Decimal::ZERO,
            debt_interest: Decimal::ZERO,
            deficit: Decimal::ZERO,
            current_balance: Decimal::ZERO,
            debt: Decimal::new(2600, 0),
            debt_to_gdp: Decimal::ZERO,
        }
    }

    /// Rate of a lever, zero when absent.
    pub fn rate(&self, lever: TaxLever) -> Decimal {
        self.tax_rates.get(&lever).copied().unwrap_or_default()
    }

    /// Budget of a department, zero when absent.
    pub fn department(&self, department: Department) -> DepartmentBudget {
        self.departments
            .get(&department)
            .copied()
            .unwrap_or_default()
    }

    /// Sum of current spending across departments.
    pub fn total_current(&self) -> Decimal {
        self.departments
            .values()
            .fold(Decimal::ZERO, |acc, b| acc.saturating_add(b.current))
    }

    /// Sum of capital spending across departments.
    pub fn total_capital(&self) -> Decimal {
        self.departments
            .values()
            .fold(Decimal::ZERO, |acc, b| acc.saturating_add(b.capital))
    }
}

impl Default for FiscalState {
    fn default() -> Self {
        let mut fiscal = Self::starting_lines();
        fiscal.baseline = FiscalBaseline::default();
        fiscal
    }
}

// ---------------------------------------------------------------------------
// Economy and politics
// ---------------------------------------------------------------------------

/// Macroeconomic indicators maintained by the monthly simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct MacroState {
    /// Nominal GDP, £bn per year.
    #[ts(as = "String")]
    pub nominal_gdp: Decimal,
    /// Annual real growth, percent.
    pub real_growth_pct: f64,
    /// Annual CPI inflation, percent.
    pub inflation_pct: f64,
    /// Unemployment rate, percent.
    pub unemployment_pct: f64,
    /// Price level index, 100 at game start.
    pub price_level: f64,
    /// Ten-year gilt yield, percent.
    pub gilt_yield_pct: f64,
    /// Average interest rate paid on the debt stock, percent.
    pub effective_interest_pct: f64,
    /// Bond-market confidence, 0--100.
    pub market_confidence: f64,
    /// Public service quality per department, 0--100.
    #[serde(with = "crate::codec::pair_seq")]
    #[ts(as = "Vec<(Department, f64)>")]
    pub service_quality: BTreeMap<Department, f64>,
}

impl Default for MacroState {
    fn default() -> Self {
        Self {
            nominal_gdp: Decimal::new(2700, 0),
            real_growth_pct: 1.5,
            inflation_pct: 2.5,
            unemployment_pct: 4.3,
            price_level: 100.0,
            gilt_yield_pct: 4.2,
            effective_interest_pct: 3.5,
            market_confidence: 60.0,
            service_quality: Department::ALL.into_iter().map(|d| (d, 55.0)).collect(),
        }
    }
}

/// Political capital, each on a 0--100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct PoliticalState {
    /// The chancellor's fiscal credibility with markets and commentators.
    pub credibility: f64,
    /// The prime minister's trust in the chancellor.
    pub executive_trust: f64,
    /// Mood of the governing party's backbenches.
    pub backbench_satisfaction: f64,
    /// Government approval rating.
    pub public_approval: f64,
}

impl Default for PoliticalState {
    fn default() -> Self {
        Self {
            credibility: 60.0,
            executive_trust: 65.0,
            backbench_satisfaction: 62.0,
            public_approval: 45.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Legislature
// ---------------------------------------------------------------------------

/// Ideological traits of a legislator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Ideology {
    /// Economic position from -1 (left) to 1 (right).
    pub economic: f64,
    /// Aversion to borrowing, 0--1.
    pub fiscal_hawk: f64,
}

/// Demographic profile of a constituency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Constituency {
    /// Seat name.
    pub name: String,
    /// Electoral region.
    pub region: Region,
    /// Local unemployment rate, percent.
    pub unemployment_pct: f64,
    /// Deprivation index, 0--1.
    pub deprivation: f64,
    /// Share of residents over pension age, 0--1.
    pub pensioner_share: f64,
    /// Share of workers employed in the public sector, 0--1.
    pub public_sector_share: f64,
    /// Winning margin at the last election, percentage points.
    pub majority_pct: f64,
}

impl Constituency {
    /// Marginality, 0 (safe) to 1 (knife-edge).
    pub fn marginality(&self) -> f64 {
        (1.0 - self.majority_pct / 30.0).clamp(0.0, 1.0)
    }
}

/// A member of the legislature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Legislator {
    /// Identifier within the roster.
    pub id: LegislatorId,
    /// Display name.
    pub name: String,
    /// The seat held.
    pub constituency: Constituency,
    /// Party grouping.
    pub party: Party,
    /// Whether the member holds a government post.
    pub payroll: bool,
    /// Ideological traits.
    pub ideology: Ideology,
    /// Propensity to defy the whip, 0--1.
    pub rebelliousness: f64,
    /// Weight the member attaches to each department, 0--1.
    #[serde(default, with = "crate::codec::pair_seq")]
    #[ts(as = "Vec<(Department, f64)>")]
    pub concerns: BTreeMap<Department, f64>,
}

/// A legislator's position on the proposal under discussion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct Stance {
    /// Label derived from `score` or forced by an override.
    pub label: StanceLabel,
    /// Score from 0 (implacable) to 100 (certain aye).
    pub score: f64,
    /// Short descriptions of what drove the score.
    pub concerns: Vec<String>,
    /// Promises made to this member that have been broken.
    pub broken_promises: u32,
    /// Label fixed by lobbying, if any.
    pub override_label: Option<StanceLabel>,
    /// Turn the override was set.
    pub override_turn: Option<u32>,
}

impl Default for Stance {
    fn default() -> Self {
        Self {
            label: StanceLabel::Undecided,
            score: 50.0,
            concerns: Vec::new(),
            broken_promises: 0,
            override_label: None,
            override_turn: None,
        }
    }
}

/// What a promise commits the government to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PromiseCategory {
    /// Keep a department's total spending at or above a floor.
    ProtectDepartment {
        /// The department protected.
        department: Department,
        /// Minimum total spending, £bn.
        #[ts(as = "String")]
        floor: Decimal,
    },
    /// Keep a tax rate at or below a ceiling.
    NoTaxRise {
        /// The lever frozen.
        lever: TaxLever,
        /// Maximum rate, percent.
        #[ts(as = "String")]
        ceiling: Decimal,
    },
}

/// A commitment made to one or more legislators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Promise {
    /// Identifier.
    pub id: PromiseId,
    /// What was promised.
    pub category: PromiseCategory,
    /// Members the promise was made to.
    pub targets: Vec<LegislatorId>,
    /// Turn the promise was made.
    pub turn_made: u32,
    /// Set once broken; never cleared.
    pub broken: bool,
    /// Turn the promise was broken.
    pub turn_broken: Option<u32>,
}

/// Counts of members in each stance band.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct BlocSummary {
    /// Members labelled support.
    pub support: u32,
    /// Members labelled oppose.
    pub oppose: u32,
    /// Members labelled undecided.
    pub undecided: u32,
    /// Mean stance score of scored members.
    pub mean_score: f64,
    /// Turn the summary was computed.
    pub computed_turn: u32,
}

/// The legislature and everything recorded about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct Legislature {
    /// Key of the roster in the roster store.
    pub roster_id: Option<RosterId>,
    /// Every member. Stored separately from the save slot.
    #[serde(with = "crate::codec::pair_seq")]
    #[ts(as = "Vec<(LegislatorId, Legislator)>")]
    pub roster: BTreeMap<LegislatorId, Legislator>,
    /// Latest stance per scored member.
    #[serde(with = "crate::codec::pair_seq")]
    #[ts(as = "Vec<(LegislatorId, Stance)>")]
    pub stances: BTreeMap<LegislatorId, Stance>,
    /// Past divisions keyed by sequence number. Stored with the roster.
    #[serde(with = "crate::codec::pair_seq")]
    #[ts(as = "Vec<(u32, VoteRecord)>")]
    pub voting_records: BTreeMap<u32, VoteRecord>,
    /// Party-discipline pressure, 0--1.
    pub whip_strength: f64,
    /// Promises made while lobbying.
    #[serde(with = "crate::codec::pair_seq")]
    #[ts(as = "Vec<(PromiseId, Promise)>")]
    pub promises: BTreeMap<PromiseId, Promise>,
    /// Stance band counts.
    pub blocs: BlocSummary,
    /// Most recent division.
    pub last_vote: Option<VoteResult>,
    /// Turn until which legislative friction delays new measures.
    pub delay_until_turn: Option<u32>,
    /// Number of times the current delay has been extended.
    pub delay_extensions: u32,
}

impl Default for Legislature {
    fn default() -> Self {
        Self {
            roster_id: None,
            roster: BTreeMap::new(),
            stances: BTreeMap::new(),
            voting_records: BTreeMap::new(),
            whip_strength: 0.7,
            promises: BTreeMap::new(),
            blocs: BlocSummary::default(),
            last_vote: None,
            delay_until_turn: None,
            delay_extensions: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Manifesto and constraints
// ---------------------------------------------------------------------------

/// A pre-election commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ManifestoPledge {
    /// Do not raise a lever above a ceiling.
    TaxLock {
        /// The lever locked.
        lever: TaxLever,
        /// Highest permitted rate, percent.
        #[ts(as = "String")]
        ceiling: Decimal,
    },
    /// Do not cut a department below its fiscal-year-start total.
    SpendingFloor {
        /// The department protected.
        department: Department,
    },
}

impl ManifestoPledge {
    /// Identifier of the constraint this pledge produces.
    pub const fn constraint_id(&self) -> ConstraintId {
        match self {
            Self::TaxLock { lever, .. } => ConstraintId::TaxLock(*lever),
            Self::SpendingFloor { department } => ConstraintId::SpendingFloor(*department),
        }
    }
}

/// Result of evaluating one constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConstraintResult {
    /// Which constraint.
    pub id: ConstraintId,
    /// Whether it is breached.
    pub violated: bool,
    /// How badly.
    pub severity: Severity,
    /// Distance from breach in the constraint's own unit; negative when
    /// breached.
    pub slack: f64,
    /// Human-readable explanation.
    pub detail: String,
}

/// Manifesto pledges and the latest check against them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct ManifestoState {
    /// Active pledges.
    pub pledges: Vec<ManifestoPledge>,
    /// Output of the most recent constraint check.
    pub last_check: Vec<ConstraintResult>,
}

impl ManifestoState {
    /// Number of breached constraints in the last check.
    pub fn violation_count(&self) -> u32 {
        u32::try_from(self.last_check.iter().filter(|r| r.violated).count()).unwrap_or(u32::MAX)
    }
}

impl Default for ManifestoState {
    fn default() -> Self {
        let lock = |lever, rate| ManifestoPledge::TaxLock {
            lever,
            ceiling: Decimal::new(rate, 0),
        };
        Self {
            pledges: vec![
                lock(TaxLever::IncomeTaxBasic, 20),
                lock(TaxLever::NationalInsurance, 8),
                lock(TaxLever::Vat, 20),
                lock(TaxLever::CorporationTax, 25),
                ManifestoPledge::SpendingFloor {
                    department: Department::Health,
                },
                ManifestoPledge::SpendingFloor {
                    department: Department::Education,
                },
                ManifestoPledge::SpendingFloor {
                    department: Department::Defence,
                },
            ],
            last_check: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Risks, programmes and events
// ---------------------------------------------------------------------------

/// A temporary policy risk that drags on the economy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PolicyRiskModifier {
    /// Category.
    pub kind: RiskKind,
    /// Strength in the unit of the affected indicator.
    pub magnitude: f64,
    /// Turns left before it expires.
    pub remaining_turns: u32,
}

/// Time-limited extra spending on one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EmergencyProgramme {
    /// Identifier.
    pub id: ProgrammeId,
    /// Display name.
    pub name: String,
    /// Department whose current spending carries the cost.
    pub department: Department,
    /// Annualised cost, £bn.
    #[ts(as = "String")]
    pub annual_cost: Decimal,
    /// Turns left before it ends.
    pub remaining_turns: u32,
}

/// One consequence of choosing an event response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventEffect {
    /// Shift fiscal credibility.
    Credibility(f64),
    /// Shift the prime minister's trust.
    ExecutiveTrust(f64),
    /// Shift backbench satisfaction.
    BackbenchSatisfaction(f64),
    /// Shift public approval.
    PublicApproval(f64),
    /// Add a policy risk.
    Risk {
        /// Category.
        kind: RiskKind,
        /// Strength.
        magnitude: f64,
        /// Duration in turns.
        turns: u32,
    },
    /// Start an emergency programme.
    Programme {
        /// Display name.
        name: String,
        /// Department carrying the cost.
        department: Department,
        /// Annualised cost, £bn.
        #[ts(as = "String")]
        annual_cost: Decimal,
        /// Duration in turns.
        turns: u32,
    },
    /// Permanently adjust a department line.
    Spending {
        /// Department adjusted.
        department: Department,
        /// Component adjusted.
        component: SpendingComponent,
        /// Change, £bn.
        #[ts(as = "String")]
        delta: Decimal,
    },
}

/// A choice offered by an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventResponse {
    /// Button text.
    pub label: String,
    /// What choosing it does.
    pub effects: Vec<EventEffect>,
}

/// An event awaiting the player's response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PendingEvent {
    /// Identifier.
    pub id: EventId,
    /// Catalogue key of the template that raised it.
    pub template: String,
    /// Category.
    pub kind: EventKind,
    /// Headline.
    pub title: String,
    /// Turn it was raised.
    pub raised_turn: u32,
    /// Available responses.
    pub responses: Vec<EventResponse>,
}

/// A response that has been chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResolvedEvent {
    /// Identifier of the event.
    pub id: EventId,
    /// Catalogue key.
    pub template: String,
    /// Index of the chosen response.
    pub response_index: u32,
    /// Turn it was resolved.
    pub resolved_turn: u32,
}

/// Pending and resolved events.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct EventLog {
    /// Events awaiting a response.
    pub pending: Vec<PendingEvent>,
    /// Events already resolved.
    pub resolved: Vec<ResolvedEvent>,
    /// Identifier for the next raised event.
    pub next_id: EventId,
}
