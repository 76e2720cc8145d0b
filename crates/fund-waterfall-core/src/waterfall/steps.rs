use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::numeric::{floor_zero, saturating_sum};
use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Step table
// ---------------------------------------------------------------------------

/// Capital class holding its own principal and hurdle balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tranche {
    /// The single class of a flat structure
    Fund,
    Senior,
    Mezzanine,
    Subordinate,
}

impl Tranche {
    fn column_prefix(self) -> &'static str {
        match self {
            Tranche::Fund => "",
            Tranche::Senior => "senior_",
            Tranche::Mezzanine => "mezzanine_",
            Tranche::Subordinate => "subordinate_",
        }
    }
}

/// Precondition on the running balances, evaluated when the step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    PrincipalCleared(Tranche),
    HurdleCleared(Tranche),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    AccrueHurdle,
    PeriodicReturn,
    PayPrincipal,
    PayHurdle,
    Carry,
}

/// One row of a variant's priority table.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Add `beginning_balance * rate` to the tranche hurdle. Consumes no cash.
    Accrue { tranche: Tranche, rate: Rate },
    /// Pay `min(cash, beginning_balance * rate)` as a current return.
    PeriodicReturn { tranche: Tranche, rate: Rate },
    /// Pay `min(cash, remaining_principal)` once every gate is open.
    PayPrincipal { tranche: Tranche, gates: Vec<Gate> },
    /// Pay `min(cash, accumulated_hurdle)` once every gate is open.
    PayHurdle { tranche: Tranche, gates: Vec<Gate> },
    /// Split whatever is left once every tranche is cleared.
    Carry { gp_share: Rate },
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Step::Accrue { .. } => StepKind::AccrueHurdle,
            Step::PeriodicReturn { .. } => StepKind::PeriodicReturn,
            Step::PayPrincipal { .. } => StepKind::PayPrincipal,
            Step::PayHurdle { .. } => StepKind::PayHurdle,
            Step::Carry { .. } => StepKind::Carry,
        }
    }

    pub fn tranche(&self) -> Option<Tranche> {
        match self {
            Step::Accrue { tranche, .. }
            | Step::PeriodicReturn { tranche, .. }
            | Step::PayPrincipal { tranche, .. }
            | Step::PayHurdle { tranche, .. } => Some(*tranche),
            Step::Carry { .. } => None,
        }
    }

    /// Column name used in period records and exports.
    pub fn column(&self) -> String {
        match self {
            Step::Accrue { tranche, .. } => {
                format!("{}accrued_hurdle_return", tranche.column_prefix())
            }
            Step::PeriodicReturn {
                tranche: Tranche::Fund,
                ..
            } => "periodic_distribution".to_string(),
            Step::PeriodicReturn { tranche, .. } => {
                format!("{}periodic_return", tranche.column_prefix())
            }
            Step::PayPrincipal { tranche, .. } => {
                format!("{}principal_repayment", tranche.column_prefix())
            }
            Step::PayHurdle { tranche, .. } => {
                format!("{}distributed_hurdle_return", tranche.column_prefix())
            }
            Step::Carry { .. } => "carry".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Mutable state
// ---------------------------------------------------------------------------

/// Balances of one tranche carried from period to period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrancheState {
    pub tranche: Tranche,
    /// Principal outstanding at the start of the current period
    pub beginning_balance: Money,
    /// Principal outstanding right now
    pub remaining_principal: Money,
    /// Accrued but unpaid hurdle return
    pub accumulated_hurdle: Money,
}

impl TrancheState {
    pub fn new(tranche: Tranche, principal: Money) -> Self {
        Self {
            tranche,
            beginning_balance: principal,
            remaining_principal: principal,
            accumulated_hurdle: Decimal::ZERO,
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.remaining_principal <= Decimal::ZERO && self.accumulated_hurdle <= Decimal::ZERO
    }
}

/// All tranche balances owned by one calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    tranches: Vec<TrancheState>,
}

impl Ledger {
    pub fn new(tranches: Vec<TrancheState>) -> Self {
        Self { tranches }
    }

    pub fn tranches(&self) -> &[TrancheState] {
        &self.tranches
    }

    fn get(&self, tranche: Tranche) -> Option<&TrancheState> {
        self.tranches.iter().find(|t| t.tranche == tranche)
    }

    fn get_mut(&mut self, tranche: Tranche) -> Option<&mut TrancheState> {
        self.tranches.iter_mut().find(|t| t.tranche == tranche)
    }

    /// A gate on a tranche the structure does not have is open.
    fn is_open(&self, gate: &Gate) -> bool {
        match gate {
            Gate::PrincipalCleared(t) => self
                .get(*t)
                .map_or(true, |s| s.remaining_principal <= Decimal::ZERO),
            Gate::HurdleCleared(t) => self
                .get(*t)
                .map_or(true, |s| s.accumulated_hurdle <= Decimal::ZERO),
        }
    }

    fn all_open(&self, gates: &[Gate]) -> bool {
        gates.iter().all(|g| self.is_open(g))
    }

    pub fn all_cleared(&self) -> bool {
        self.tranches.iter().all(TrancheState::is_cleared)
    }

    /// Run one period of `steps` against `cash`, then roll beginning balances
    /// forward: `next_beginning = max(beginning - principal_repaid, 0)`.
    pub fn run_period(&mut self, steps: &[Step], cash: Money) -> PeriodAllocation {
        let mut available = cash;
        let mut amounts = Vec::with_capacity(steps.len());
        let mut carry_lp = Decimal::ZERO;
        let mut carry_gp = Decimal::ZERO;
        let mut repaid: Vec<(Tranche, Money)> = Vec::new();

        for step in steps {
            let amount = match step {
                Step::Accrue { tranche, rate } => match self.get_mut(*tranche) {
                    Some(state) if state.beginning_balance > Decimal::ZERO => {
                        let accrual = state.beginning_balance.saturating_mul(*rate);
                        state.accumulated_hurdle = state.accumulated_hurdle.saturating_add(accrual);
                        accrual
                    }
                    _ => Decimal::ZERO,
                },
                Step::PeriodicReturn { tranche, rate } => match self.get(*tranche) {
                    Some(state) if state.beginning_balance > Decimal::ZERO => {
                        let paid = available.min(state.beginning_balance.saturating_mul(*rate));
                        available -= paid;
                        paid
                    }
                    _ => Decimal::ZERO,
                },
                Step::PayPrincipal { tranche, gates } => {
                    if !self.all_open(gates) {
                        Decimal::ZERO
                    } else {
                        match self.get_mut(*tranche) {
                            Some(state) => {
                                let paid = available.min(state.remaining_principal);
                                state.remaining_principal =
                                    floor_zero(state.remaining_principal - paid);
                                available -= paid;
                                repaid.push((*tranche, paid));
                                paid
                            }
                            None => Decimal::ZERO,
                        }
                    }
                }
                Step::PayHurdle { tranche, gates } => {
                    if !self.all_open(gates) {
                        Decimal::ZERO
                    } else {
                        match self.get_mut(*tranche) {
                            Some(state) => {
                                let paid = available.min(state.accumulated_hurdle);
                                state.accumulated_hurdle =
                                    floor_zero(state.accumulated_hurdle - paid);
                                available -= paid;
                                paid
                            }
                            None => Decimal::ZERO,
                        }
                    }
                }
                Step::Carry { gp_share } => {
                    if self.all_cleared() {
                        let paid = available;
                        carry_gp = paid.saturating_mul(*gp_share);
                        carry_lp = paid - carry_gp;
                        available = Decimal::ZERO;
                        paid
                    } else {
                        Decimal::ZERO
                    }
                }
            };
            amounts.push(floor_zero(amount));
        }

        for state in self.tranches.iter_mut() {
            let paid = saturating_sum(
                repaid
                    .iter()
                    .filter(|(t, _)| *t == state.tranche)
                    .map(|(_, p)| *p),
            );
            state.beginning_balance = floor_zero(state.beginning_balance - paid);
        }

        PeriodAllocation {
            amounts,
            carry_lp,
            carry_gp,
            undistributed: available,
        }
    }
}

/// Amounts produced by one period, aligned index-for-index with the steps.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodAllocation {
    pub amounts: Vec<Money>,
    pub carry_lp: Money,
    pub carry_gp: Money,
    pub undistributed: Money,
}
