//! Monthly macroeconomic simulation.
//!
//! [`MonthlySimulation`] is the seam between the turn orchestrator and the
//! economic model. Implementations are the only code allowed to write the
//! derived macro-fiscal fields (revenue, interest, balances, debt, debt
//! ratio) and every [`MacroState`] indicator.
//!
//! [`BaselineEconomy`] is the default model. Each indicator moves a fixed
//! fraction of the way toward a target every month, so shocks fade rather
//! than compound.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use chancellor_ledger::friction::real_change_pct;
use chancellor_ledger::projection::percent_of;
use chancellor_ledger::{FiscalProjection, headroom};
use chancellor_types::{FiscalState, GameState, MacroState, RiskKind, TaxLever};

/// Months in a year.
const MONTHS: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// One month of macroeconomic evolution.
pub trait MonthlySimulation {
    /// Advance the economy by one month and rewrite the derived fiscal
    /// fields. Receives and returns the complete state.
    fn step(&self, state: GameState) -> GameState;
}

/// Write revenue, interest, balances and the debt ratio from the current
/// lines and indicators. Does not accrue debt.
pub fn refresh_fiscal_position(fiscal: &mut FiscalState, economy: &MacroState) {
    let projection = FiscalProjection::project(fiscal, economy);
    fiscal.revenue = projection.revenue;
    fiscal.debt_interest = projection.debt_interest;
    fiscal.current_balance = projection.current_balance;
    fiscal.deficit = projection.deficit;
    fiscal.debt_to_gdp = debt_ratio(fiscal.debt, economy.nominal_gdp);
}

fn debt_ratio(debt: Decimal, gdp: Decimal) -> Decimal {
    debt.saturating_mul(Decimal::ONE_HUNDRED)
        .checked_div(gdp)
        .unwrap_or_default()
        .round_dp(2)
}

fn approach(current: f64, target: f64, months: f64) -> f64 {
    current + (target - current) / months
}

fn risk_total(state: &GameState, kinds: &[RiskKind]) -> f64 {
    state
        .risk_modifiers
        .iter()
        .filter(|r| kinds.contains(&r.kind))
        .map(|r| r.magnitude)
        .sum()
}

/// Default macroeconomic model.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineEconomy {
    /// Trend real growth, percent a year.
    pub trend_growth_pct: f64,
    /// Inflation target, percent a year.
    pub inflation_target_pct: f64,
    /// Equilibrium unemployment, percent.
    pub natural_unemployment_pct: f64,
    /// Gilt yield with neutral headroom and credibility, percent.
    pub neutral_gilt_yield_pct: f64,
}

impl Default for BaselineEconomy {
    fn default() -> Self {
        Self {
            trend_growth_pct: 1.5,
            inflation_target_pct: 2.0,
            natural_unemployment_pct: 4.3,
            neutral_gilt_yield_pct: 4.2,
        }
    }
}

impl BaselineEconomy {
    /// Growth lost to broad-based tax rises since the start of the fiscal year.
    fn tax_drag(fiscal: &FiscalState) -> f64 {
        TaxLever::ALL
            .into_iter()
            .filter(|lever| lever.is_broad_based())
            .map(|lever| {
                let base = fiscal
                    .baseline
                    .tax_rates
                    .get(&lever)
                    .copied()
                    .unwrap_or_else(|| fiscal.rate(lever));
                fiscal.rate(lever).saturating_sub(base).to_f64().unwrap_or(0.0) * 0.1
            })
            .sum()
    }

    fn vat_rise(fiscal: &FiscalState) -> f64 {
        let base = fiscal
            .baseline
            .tax_rates
            .get(&TaxLever::Vat)
            .copied()
            .unwrap_or_else(|| fiscal.rate(TaxLever::Vat));
        fiscal
            .rate(TaxLever::Vat)
            .saturating_sub(base)
            .to_f64()
            .unwrap_or(0.0)
    }
}

impl MonthlySimulation for BaselineEconomy {
    fn step(&self, mut state: GameState) -> GameState {
        let projection = FiscalProjection::project(&state.fiscal, &state.economy);
        let scalar = headroom(state.metadata.fiscal_rule, &projection).scalar;
        let credibility = state.political.credibility;
        let real_drag = risk_total(
            &state,
            &[RiskKind::IndustrialAction, RiskKind::PolicyUncertainty],
        );
        let market_risk = risk_total(
            &state,
            &[RiskKind::MarketJitters, RiskKind::CreditRatingWatch],
        );

        let impulse = ((projection.deficit_to_gdp_pct() - 2.5) * 0.15).clamp(-1.0, 1.0);
        let tax_drag = Self::tax_drag(&state.fiscal);
        let vat_rise = Self::vat_rise(&state.fiscal);

        let econ = &mut state.economy;
        let growth_target = self.trend_growth_pct + impulse - tax_drag - real_drag;
        econ.real_growth_pct = approach(econ.real_growth_pct, growth_target, 6.0);

        let output_gap = econ.real_growth_pct - self.trend_growth_pct;
        let inflation_target = self.inflation_target_pct + 0.25 * output_gap + 0.3 * vat_rise;
        econ.inflation_pct = approach(econ.inflation_pct, inflation_target, 6.0);

        let unemployment_target = self.natural_unemployment_pct - 0.5 * output_gap;
        econ.unemployment_pct =
            approach(econ.unemployment_pct, unemployment_target, 6.0).clamp(2.0, 15.0);

        let nominal_growth = econ.real_growth_pct + econ.inflation_pct;
        econ.nominal_gdp = econ
            .nominal_gdp
            .saturating_add(percent_of(econ.nominal_gdp, nominal_growth / 12.0))
            .round_dp(6);
        econ.price_level *= 1.0 + econ.inflation_pct / 1200.0;

        let gilt_target = self.neutral_gilt_yield_pct + market_risk - 0.6 * scalar
            + (60.0 - credibility) / 50.0;
        econ.gilt_yield_pct = approach(econ.gilt_yield_pct, gilt_target, 4.0).max(0.0);
        econ.effective_interest_pct =
            approach(econ.effective_interest_pct, econ.gilt_yield_pct, 36.0);

        let confidence_target =
            60.0 + 25.0 * scalar + (credibility - 60.0) * 0.4 - market_risk * 10.0;
        econ.market_confidence =
            approach(econ.market_confidence, confidence_target, 4.0).clamp(0.0, 100.0);

        let inflation = econ.inflation_pct;
        for (department, budget) in &state.fiscal.departments {
            let base = state
                .fiscal
                .baseline
                .department_totals
                .get(department)
                .copied()
                .unwrap_or(budget.total);
            let real = real_change_pct(base, budget.total, inflation).unwrap_or(0.0);
            let target = (55.0 + real * 1.5).clamp(0.0, 100.0);
            let quality = econ.service_quality.entry(*department).or_insert(55.0);
            *quality = approach(*quality, target, 12.0).clamp(0.0, 100.0);
        }

        refresh_fiscal_position(&mut state.fiscal, &state.economy);
        let monthly_deficit = state
            .fiscal
            .deficit
            .checked_div(MONTHS)
            .unwrap_or_default()
            .round_dp(6);
        state.fiscal.debt = state.fiscal.debt.saturating_add(monthly_deficit);
        state.fiscal.debt_to_gdp = debt_ratio(state.fiscal.debt, state.economy.nominal_gdp);

        debug!(
            turn = state.metadata.turn,
            growth = state.economy.real_growth_pct,
            inflation = state.economy.inflation_pct,
            deficit = %state.fiscal.deficit,
            debt = %state.fiscal.debt,
            "economy stepped"
        );
        state
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use chancellor_types::PolicyRiskModifier;

    use super::*;

    fn opening() -> GameState {
        let mut state = GameState::default();
        refresh_fiscal_position(&mut state.fiscal, &state.economy);
        state
    }

    #[test]
    fn opening_position_is_derived_from_the_lines() {
        let state = opening();
        assert_eq!(state.fiscal.revenue, dec!(770.03));
        assert_eq!(state.fiscal.deficit, dec!(66.47));
        assert_eq!(state.fiscal.debt_to_gdp, dec!(96.30));
    }

    #[test]
    fn a_month_accrues_a_twelfth_of_the_deficit() {
        let before = opening();
        let after = BaselineEconomy::default().step(before.clone());
        assert!(after.economy.nominal_gdp > before.economy.nominal_gdp);
        assert!(after.economy.price_level > before.economy.price_level);
        let accrued = after.fiscal.debt - before.fiscal.debt;
        let expected = (after.fiscal.deficit / dec!(12)).round_dp(6);
        assert_eq!(accrued, expected);
    }

    #[test]
    fn step_never_touches_the_ledger_lines() {
        let before = opening();
        let after = BaselineEconomy::default().step(before.clone());
        assert_eq!(after.fiscal.departments, before.fiscal.departments);
        assert_eq!(after.fiscal.tax_rates, before.fiscal.tax_rates);
        assert_eq!(after.fiscal.total_spending, before.fiscal.total_spending);
    }

    #[test]
    fn market_risk_pushes_gilts_up() {
        let calm = BaselineEconomy::default().step(opening());
        let mut nervous = opening();
        nervous.risk_modifiers.push(PolicyRiskModifier {
            kind: RiskKind::MarketJitters,
            magnitude: 1.0,
            remaining_turns: 3,
        });
        let nervous = BaselineEconomy::default().step(nervous);
        assert!(nervous.economy.gilt_yield_pct > calm.economy.gilt_yield_pct);
        assert!(nervous.economy.market_confidence < calm.economy.market_confidence);
    }

    #[test]
    fn stepping_is_deterministic() {
        let economy = BaselineEconomy::default();
        let a = economy.step(economy.step(opening()));
        let b = economy.step(economy.step(opening()));
        assert_eq!(a, b);
    }

    #[test]
    fn deep_real_cut_erodes_service_quality() {
        let mut state = opening();
        let health = state.fiscal.departments.get_mut(&chancellor_types::Department::Health).unwrap();
        health.current = dec!(120);
        chancellor_ledger::recompute_aggregates(&mut state.fiscal);
        let after = BaselineEconomy::default().step(state);
        let quality = after.economy.service_quality[&chancellor_types::Department::Health];
        assert!(quality < 55.0);
    }
}
