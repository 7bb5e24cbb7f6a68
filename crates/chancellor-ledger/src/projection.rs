//! Fiscal projection and headroom.
//!
//! [`estimate_revenue`] is the one receipts model: the monthly simulation
//! uses it to write `revenue`, and the constraint checker uses it to
//! project a proposal. [`constraint_slack`] is the one slack formula and
//! [`calibrate`] the one mapping from slack to the headroom scalar. Every
//! consumer (constraint checker, vote summary, market reaction, events)
//! goes through these.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use chancellor_types::{
    FiscalRuleKind, FiscalState, MacroState, RuleConstraint, Severity, TaxLever,
};

/// GDP at which the per-point yields below were calibrated, £bn.
const CALIBRATION_GDP: Decimal = Decimal::from_parts(2700, 0, 0, false, 0);

/// Receipts from everything other than the six levers, as a share of GDP.
const OTHER_RECEIPTS_SHARE: Decimal = Decimal::from_parts(864, 0, 0, false, 4);

/// Slack in £bn at which the headroom scalar reaches tanh(1).
const HEADROOM_SCALE_BN: f64 = 20.0;

/// Basis points in one whole.
const BASIS_POINTS: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Receipts per percentage point of a lever at the calibration GDP, £bn.
const fn yield_per_point(lever: TaxLever) -> Decimal {
    match lever {
        TaxLever::IncomeTaxBasic => Decimal::from_parts(65, 0, 0, false, 1),
        TaxLever::IncomeTaxHigher => Decimal::from_parts(22, 0, 0, false, 1),
        TaxLever::IncomeTaxAdditional => Decimal::from_parts(35, 0, 0, false, 2),
        TaxLever::NationalInsurance => Decimal::from_parts(60, 0, 0, false, 1),
        TaxLever::Vat => Decimal::from_parts(85, 0, 0, false, 1),
        TaxLever::CorporationTax => Decimal::from_parts(34, 0, 0, false, 1),
    }
}

/// `amount * pct / 100`, with a non-finite `pct` treated as zero.
pub fn percent_of(amount: Decimal, pct: f64) -> Decimal {
    let pct = Decimal::from_f64(pct).unwrap_or_default();
    amount
        .saturating_mul(pct)
        .checked_div(Decimal::ONE_HUNDRED)
        .unwrap_or_default()
        .round_dp(6)
}

/// Annual receipts for a set of tax rates at a given nominal GDP, £bn.
pub fn estimate_revenue(tax_rates: &BTreeMap<TaxLever, Decimal>, nominal_gdp: Decimal) -> Decimal {
    let scale = nominal_gdp.checked_div(CALIBRATION_GDP).unwrap_or(Decimal::ONE);
    let levers = tax_rates.iter().fold(Decimal::ZERO, |acc, (lever, rate)| {
        acc.saturating_add(rate.saturating_mul(yield_per_point(*lever)))
    });
    levers
        .saturating_mul(scale)
        .saturating_add(nominal_gdp.saturating_mul(OTHER_RECEIPTS_SHARE))
        .round_dp(6)
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// One-year-ahead projection of a set of fiscal lines, all in £bn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiscalProjection {
    /// Estimated receipts.
    pub revenue: Decimal,
    /// Day-to-day spending.
    pub current_spending: Decimal,
    /// Investment spending.
    pub capital_spending: Decimal,
    /// Interest on the debt stock.
    pub debt_interest: Decimal,
    /// Receipts less current spending and interest.
    pub current_balance: Decimal,
    /// All spending and interest less receipts.
    pub deficit: Decimal,
    /// Debt stock now.
    pub debt: Decimal,
    /// Debt stock after a year at this deficit.
    pub debt_next: Decimal,
    /// Nominal GDP now.
    pub gdp: Decimal,
    /// Nominal GDP after a year of trend growth.
    pub gdp_next: Decimal,
}

impl FiscalProjection {
    /// Project the lines in `fiscal` under the conditions in `economy`.
    pub fn project(fiscal: &FiscalState, economy: &MacroState) -> Self {
        let gdp = economy.nominal_gdp;
        let revenue = estimate_revenue(&fiscal.tax_rates, gdp);
        let current_spending = fiscal.total_current();
        let capital_spending = fiscal.total_capital();
        let debt_interest = percent_of(fiscal.debt, economy.effective_interest_pct);
        let current_balance = revenue
            .saturating_sub(current_spending)
            .saturating_sub(debt_interest);
        let deficit = current_spending
            .saturating_add(capital_spending)
            .saturating_add(debt_interest)
            .saturating_sub(revenue);
        let nominal_growth = economy.real_growth_pct + economy.inflation_pct;
        Self {
            revenue,
            current_spending,
            capital_spending,
            debt_interest,
            current_balance,
            deficit,
            debt: fiscal.debt,
            debt_next: fiscal.debt.saturating_add(deficit),
            gdp,
            gdp_next: gdp.saturating_add(percent_of(gdp, nominal_growth)),
        }
    }

    /// Deficit as a percentage of GDP.
    pub fn deficit_to_gdp_pct(&self) -> f64 {
        ratio_pct(self.deficit, self.gdp)
    }

    /// Debt as a percentage of GDP.
    pub fn debt_to_gdp_pct(&self) -> f64 {
        ratio_pct(self.debt, self.gdp)
    }
}

fn ratio_pct(numerator: Decimal, denominator: Decimal) -> f64 {
    numerator
        .checked_div(denominator)
        .and_then(|r| r.to_f64())
        .map_or(0.0, |r| r * 100.0)
}

fn share_of_gdp(gdp: Decimal, basis_points: u32) -> Decimal {
    gdp.saturating_mul(Decimal::from(basis_points))
        .checked_div(BASIS_POINTS)
        .unwrap_or_default()
}

/// Distance from breach of one rule constraint, £bn; negative when breached.
///
/// Every rule constraint moves one-for-one with current spending, so the
/// negated slack is exactly the cut needed to clear it.
pub fn constraint_slack(constraint: RuleConstraint, projection: &FiscalProjection) -> Decimal {
    match constraint {
        RuleConstraint::CurrentBudgetBalance => projection.current_balance,
        RuleConstraint::OverallBalance => Decimal::ZERO.saturating_sub(projection.deficit),
        RuleConstraint::DeficitCeiling { max_bp } => {
            share_of_gdp(projection.gdp, max_bp).saturating_sub(projection.deficit)
        }
        RuleConstraint::DebtTarget { max_bp } => {
            share_of_gdp(projection.gdp, max_bp).saturating_sub(projection.debt_next)
        }
        RuleConstraint::DebtFalling => {
            // Debt ratio falls iff debt grows more slowly than GDP.
            let allowed = projection
                .debt
                .saturating_mul(projection.gdp_next)
                .checked_div(projection.gdp)
                .unwrap_or(projection.debt);
            allowed.saturating_sub(projection.debt_next)
        }
    }
}

// ---------------------------------------------------------------------------
// Headroom
// ---------------------------------------------------------------------------

/// Map a slack in £bn onto the calibrated headroom scale (-1, 1).
pub fn calibrate(slack_bn: Decimal) -> f64 {
    (slack_bn.to_f64().unwrap_or(0.0) / HEADROOM_SCALE_BN).tanh()
}

/// Severity of a breach given its calibrated headroom.
pub fn severity_from_scalar(scalar: f64) -> Severity {
    if scalar >= 0.0 {
        Severity::None
    } else if scalar > -0.25 {
        Severity::Minor
    } else if scalar > -0.75 {
        Severity::Major
    } else {
        Severity::Critical
    }
}

/// The tightest constraint of a fiscal rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Headroom {
    /// Smallest slack across the rule's constraints, £bn.
    pub slack_bn: Decimal,
    /// The constraint with that slack.
    pub binding: Option<RuleConstraint>,
    /// `slack_bn` on the calibrated scale.
    pub scalar: f64,
}

impl Headroom {
    /// Whether every rule constraint holds.
    pub fn is_compliant(&self) -> bool {
        !self.slack_bn.is_sign_negative() || self.slack_bn.is_zero()
    }
}

/// Headroom against a fiscal rule.
pub fn headroom(rule: FiscalRuleKind, projection: &FiscalProjection) -> Headroom {
    let tightest = rule
        .constraints()
        .into_iter()
        .map(|c| (constraint_slack(c, projection), c))
        .min_by(|a, b| a.0.cmp(&b.0));
    let (slack_bn, binding) = tightest.map_or((Decimal::ZERO, None), |(s, c)| (s, Some(c)));
    Headroom {
        slack_bn,
        binding,
        scalar: calibrate(slack_bn),
    }
}
