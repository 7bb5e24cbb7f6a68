//! Budget proposals and their friction outcomes.
//!
//! A [`BudgetChanges`] value is sparse: every absent entry means "no change".
//! Tax deltas are in percentage points, department deltas in £bn per year.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Department, SpendingComponent, TaxLever};

/// A change to one department's current and capital lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct DepartmentDelta {
    /// Change to day-to-day spending in £bn.
    #[ts(as = "String")]
    pub current: Decimal,
    /// Change to investment spending in £bn.
    #[ts(as = "String")]
    pub capital: Decimal,
}

impl DepartmentDelta {
    /// Net change across both components.
    pub fn net(self) -> Decimal {
        self.current.saturating_add(self.capital)
    }

    /// Whether both components are zero.
    pub fn is_zero(self) -> bool {
        self.current.is_zero() && self.capital.is_zero()
    }
}

/// An explicit override of a named line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LineItemOverride {
    /// New annual amount in £bn.
    #[ts(as = "String")]
    pub amount: Decimal,
    /// Department for a line item that does not exist yet.
    #[serde(default)]
    pub department: Option<Department>,
    /// Component for a line item that does not exist yet.
    #[serde(default)]
    pub component: Option<SpendingComponent>,
}

/// A sparse set of budget changes submitted in one go.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct BudgetChanges {
    /// Percentage-point change per tax lever.
    #[serde(with = "crate::codec::pair_seq")]
    #[ts(as = "Vec<(TaxLever, String)>")]
    pub tax_deltas: BTreeMap<TaxLever, Decimal>,
    /// Spending change per department.
    #[serde(with = "crate::codec::pair_seq")]
    #[ts(as = "Vec<(Department, DepartmentDelta)>")]
    pub department_deltas: BTreeMap<Department, DepartmentDelta>,
    /// Line items set to an explicit amount.
    #[serde(with = "crate::codec::pair_seq")]
    #[ts(as = "Vec<(String, LineItemOverride)>")]
    pub line_items: BTreeMap<String, LineItemOverride>,
}

impl BudgetChanges {
    /// An empty proposal.
    pub const fn new() -> Self {
        Self {
            tax_deltas: BTreeMap::new(),
            department_deltas: BTreeMap::new(),
            line_items: BTreeMap::new(),
        }
    }

    /// Add a tax delta in percentage points, replacing any previous one.
    #[must_use]
    pub fn with_tax(mut self, lever: TaxLever, delta_pp: Decimal) -> Self {
        self.tax_deltas.insert(lever, delta_pp);
        self
    }

    /// Add a current-spending delta in £bn.
    #[must_use]
    pub fn with_current(mut self, department: Department, delta: Decimal) -> Self {
        self.department_deltas.entry(department).or_default().current = delta;
        self
    }

    /// Add a capital-spending delta in £bn.
    #[must_use]
    pub fn with_capital(mut self, department: Department, delta: Decimal) -> Self {
        self.department_deltas.entry(department).or_default().capital = delta;
        self
    }

    /// Add a line-item override.
    #[must_use]
    pub fn with_line_item(mut self, key: &str, item: LineItemOverride) -> Self {
        self.line_items.insert(key.to_owned(), item);
        self
    }

    /// Whether the proposal changes nothing.
    pub fn is_empty(&self) -> bool {
        self.tax_deltas.values().all(Decimal::is_zero)
            && self.department_deltas.values().all(|d| d.is_zero())
            && self.line_items.is_empty()
    }

    /// Levers whose rate rises.
    pub fn tax_rises(&self) -> impl Iterator<Item = TaxLever> + '_ {
        self.tax_deltas
            .iter()
            .filter(|(_, d)| d.is_sign_positive() && !d.is_zero())
            .map(|(lever, _)| *lever)
    }

    /// Departments whose net spending falls.
    pub fn spending_cuts(&self) -> impl Iterator<Item = Department> + '_ {
        self.department_deltas
            .iter()
            .filter(|(_, d)| d.net().is_sign_negative() && !d.net().is_zero())
            .map(|(dept, _)| *dept)
    }

    /// Combine two proposals, summing deltas and letting `other` win on
    /// line-item conflicts.
    #[must_use]
    pub fn merged(mut self, other: &Self) -> Self {
        for (lever, delta) in &other.tax_deltas {
            let entry = self.tax_deltas.entry(*lever).or_default();
            *entry = entry.saturating_add(*delta);
        }
        for (dept, delta) in &other.department_deltas {
            let entry = self.department_deltas.entry(*dept).or_default();
            entry.current = entry.current.saturating_add(delta.current);
            entry.capital = entry.capital.saturating_add(delta.capital);
        }
        for (key, item) in &other.line_items {
            self.line_items.insert(key.clone(), item.clone());
        }
        self
    }
}

/// Why a submission was held back by legislative friction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FrictionTrigger {
    /// A primary lever rose by more than the threshold.
    TaxRise {
        /// The lever that rose.
        lever: TaxLever,
        /// The rise in percentage points.
        #[ts(as = "String")]
        delta_pp: Decimal,
    },
    /// A department's inflation-adjusted spending fell by more than the
    /// threshold.
    RealTermsCut {
        /// The department being cut.
        department: Department,
        /// Real-terms change in percent (negative).
        real_change_pct: f64,
    },
}

/// A submission queued by the friction gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DeferredBudget {
    /// The queued changes.
    pub changes: BudgetChanges,
    /// Turn the submission was made.
    pub submitted_turn: u32,
    /// Turn on which the changes take effect.
    pub apply_turn: u32,
    /// What triggered the delay.
    pub triggers: Vec<FrictionTrigger>,
}
