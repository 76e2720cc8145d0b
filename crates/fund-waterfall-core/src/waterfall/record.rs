use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::steps::{Step, StepKind, Tranche, TrancheState};
use super::variants::TrancheInfo;
use crate::metrics::core_metrics::CoreMetrics;
use crate::numeric::saturating_sum;
use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Per-period rows
// ---------------------------------------------------------------------------

/// Amount produced by one waterfall step in one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepAmount {
    /// Column name, e.g. `senior_principal_repayment`
    pub column: String,
    pub kind: StepKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tranche: Option<Tranche>,
    pub amount: Money,
}

/// Snapshot of one tranche's balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrancheBalance {
    pub tranche: Tranche,
    pub principal: Money,
    pub accrued_hurdle: Money,
}

impl From<&TrancheState> for TrancheBalance {
    fn from(state: &TrancheState) -> Self {
        Self {
            tranche: state.tranche,
            principal: state.beginning_balance,
            accrued_hurdle: state.accumulated_hurdle,
        }
    }
}

/// One row of the distribution table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub year: u32,
    pub net_cash_flow: Money,
    /// net_cash_flow / investment_amount
    pub distribution_rate: Rate,
    /// Balances at the start of the year, in priority order
    pub beginning_balances: Vec<TrancheBalance>,
    /// One entry per waterfall step, in execution order
    pub steps: Vec<StepAmount>,
    pub carry_lp: Money,
    pub carry_gp: Money,
    /// Cash left after the last step
    pub undistributed: Money,
    /// Net cash position since year 0, including the initial outlay
    pub cumulative_cash_flow: Money,
}

impl PeriodRecord {
    pub(crate) fn step_amounts(steps: &[Step], amounts: &[Money]) -> Vec<StepAmount> {
        steps
            .iter()
            .zip(amounts)
            .map(|(step, amount)| StepAmount {
                column: step.column(),
                kind: step.kind(),
                tranche: step.tranche(),
                amount: *amount,
            })
            .collect()
    }

    /// Cash paid out this year across every step (accruals excluded).
    pub fn distributed(&self) -> Money {
        saturating_sum(
            self.steps
                .iter()
                .filter(|s| s.kind != StepKind::AccrueHurdle)
                .map(|s| s.amount),
        )
    }

    /// Amount recorded under `column`, zero if the variant has no such step.
    pub fn amount(&self, column: &str) -> Money {
        saturating_sum(
            self.steps
                .iter()
                .filter(|s| s.column == column)
                .map(|s| s.amount),
        )
    }

    pub fn beginning_principal(&self, tranche: Tranche) -> Money {
        self.beginning_balances
            .iter()
            .find(|b| b.tranche == tranche)
            .map_or(Decimal::ZERO, |b| b.principal)
    }
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTotal {
    pub column: String,
    pub kind: StepKind,
    pub total: Money,
}

/// Column-wise sums over every period record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub columns: Vec<ColumnTotal>,
    pub total_net_cash_flow: Money,
    pub total_distributed: Money,
    pub total_undistributed: Money,
    pub total_carry_lp: Money,
    pub total_carry_gp: Money,
    /// Balances left after the final period
    pub ending_balances: Vec<TrancheBalance>,
}

impl Summary {
    pub fn from_records(
        steps: &[Step],
        records: &[PeriodRecord],
        ending_balances: Vec<TrancheBalance>,
    ) -> Self {
        let columns = steps
            .iter()
            .enumerate()
            .map(|(i, step)| ColumnTotal {
                column: step.column(),
                kind: step.kind(),
                total: saturating_sum(
                    records
                        .iter()
                        .filter_map(|r| r.steps.get(i))
                        .map(|s| s.amount),
                ),
            })
            .collect();

        Self {
            columns,
            total_net_cash_flow: saturating_sum(records.iter().map(|r| r.net_cash_flow)),
            total_distributed: saturating_sum(records.iter().map(PeriodRecord::distributed)),
            total_undistributed: saturating_sum(records.iter().map(|r| r.undistributed)),
            total_carry_lp: saturating_sum(records.iter().map(|r| r.carry_lp)),
            total_carry_gp: saturating_sum(records.iter().map(|r| r.carry_gp)),
            ending_balances,
        }
    }

    /// Total under `column`, zero if the variant has no such step.
    pub fn total(&self, column: &str) -> Money {
        saturating_sum(
            self.columns
                .iter()
                .filter(|c| c.column == column)
                .map(|c| c.total),
        )
    }

    pub fn ending_principal(&self) -> Money {
        saturating_sum(self.ending_balances.iter().map(|b| b.principal))
    }

    pub fn ending_accrued_hurdle(&self) -> Money {
        saturating_sum(self.ending_balances.iter().map(|b| b.accrued_hurdle))
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Complete output of one allocation. Never mutated once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Variant machine name
    pub mode: String,
    /// Variant display name
    pub calculation_mode: String,
    pub investment_target: String,
    pub structure: Vec<TrancheInfo>,
    pub records: Vec<PeriodRecord>,
    pub core_metrics: CoreMetrics,
    pub summary: Summary,
}
