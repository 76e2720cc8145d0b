use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::steps::{Gate, Step, Tranche};
use crate::error::FundWaterfallError;
use crate::numeric::{check_percent, floor_zero, percent_to_rate};
use crate::types::{BasicParams, Money, Percent};
use crate::FundWaterfallResult;

/// The five contractual priority orders, with their variant parameters.
/// All ratios and rates are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WaterfallVariant {
    /// Principal first, then accrued hurdle, then carry.
    FlatPriorityRepayment,
    /// A current distribution on outstanding principal, then the
    /// priority-repayment order with the hurdle net of that distribution.
    FlatPeriodicDistribution { periodic_rate: Percent },
    /// Senior principal and hurdle ahead of subordinate principal.
    StructuredSeniorSubordinate { senior_ratio: Percent },
    /// Senior, mezzanine and subordinate classes; hurdles ahead of principal.
    StructuredMezzanine {
        senior_ratio: Percent,
        mezzanine_ratio: Percent,
        mezzanine_rate: Percent,
    },
    /// Both classes receive current returns before any principal.
    StructuredInterestPrincipal {
        senior_ratio: Percent,
        subordinate_rate: Percent,
    },
}

/// Size and return terms of one tranche in a structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrancheInfo {
    pub tranche: Tranche,
    /// Share of the investment amount, percent
    pub ratio: Percent,
    /// Committed principal
    pub amount: Money,
    /// Preferred or periodic return on this tranche, percent (None if the
    /// tranche only receives principal and carry)
    pub return_rate: Option<Percent>,
}

impl WaterfallVariant {
    /// Machine name, identical to the serde tag.
    pub fn mode(&self) -> &'static str {
        match self {
            WaterfallVariant::FlatPriorityRepayment => "flat_priority_repayment",
            WaterfallVariant::FlatPeriodicDistribution { .. } => "flat_periodic_distribution",
            WaterfallVariant::StructuredSeniorSubordinate { .. } => {
                "structured_senior_subordinate"
            }
            WaterfallVariant::StructuredMezzanine { .. } => "structured_mezzanine",
            WaterfallVariant::StructuredInterestPrincipal { .. } => {
                "structured_interest_principal"
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WaterfallVariant::FlatPriorityRepayment => "Flat / priority repayment",
            WaterfallVariant::FlatPeriodicDistribution { .. } => "Flat / periodic distribution",
            WaterfallVariant::StructuredSeniorSubordinate { .. } => {
                "Structured / senior-subordinate"
            }
            WaterfallVariant::StructuredMezzanine { .. } => "Structured / with mezzanine",
            WaterfallVariant::StructuredInterestPrincipal { .. } => {
                "Structured / interest-interest, principal-principal"
            }
        }
    }

    /// Range checks on the variant parameters.
    pub fn validate(&self) -> FundWaterfallResult<()> {
        match self {
            WaterfallVariant::FlatPriorityRepayment => Ok(()),
            WaterfallVariant::FlatPeriodicDistribution { periodic_rate } => {
                check_percent("periodic_rate", *periodic_rate)
            }
            WaterfallVariant::StructuredSeniorSubordinate { senior_ratio } => {
                check_percent("senior_ratio", *senior_ratio)
            }
            WaterfallVariant::StructuredMezzanine {
                senior_ratio,
                mezzanine_ratio,
                mezzanine_rate,
            } => {
                check_percent("senior_ratio", *senior_ratio)?;
                check_percent("mezzanine_ratio", *mezzanine_ratio)?;
                check_percent("mezzanine_rate", *mezzanine_rate)?;
                if *senior_ratio + *mezzanine_ratio >= dec!(100) {
                    return Err(FundWaterfallError::invalid(
                        "mezzanine_ratio",
                        format!(
                            "senior_ratio + mezzanine_ratio must be below 100 (got {})",
                            *senior_ratio + *mezzanine_ratio
                        ),
                    ));
                }
                Ok(())
            }
            WaterfallVariant::StructuredInterestPrincipal {
                senior_ratio,
                subordinate_rate,
            } => {
                check_percent("senior_ratio", *senior_ratio)?;
                check_percent("subordinate_rate", *subordinate_rate)
            }
        }
    }

    /// Tranches in priority order, sized from `investment_amount`.
    pub fn structure(&self, params: &BasicParams) -> Vec<TrancheInfo> {
        let amount = params.investment_amount;
        let sized = |tranche, ratio: Percent, return_rate| TrancheInfo {
            tranche,
            ratio,
            amount: amount * percent_to_rate(ratio),
            return_rate,
        };

        match self {
            WaterfallVariant::FlatPriorityRepayment => {
                vec![sized(Tranche::Fund, dec!(100), Some(params.hurdle_rate))]
            }
            WaterfallVariant::FlatPeriodicDistribution { periodic_rate } => {
                vec![sized(Tranche::Fund, dec!(100), Some(*periodic_rate))]
            }
            WaterfallVariant::StructuredSeniorSubordinate { senior_ratio } => vec![
                sized(Tranche::Senior, *senior_ratio, Some(params.hurdle_rate)),
                sized(Tranche::Subordinate, dec!(100) - *senior_ratio, None),
            ],
            WaterfallVariant::StructuredMezzanine {
                senior_ratio,
                mezzanine_ratio,
                mezzanine_rate,
            } => vec![
                sized(Tranche::Senior, *senior_ratio, Some(params.hurdle_rate)),
                sized(Tranche::Mezzanine, *mezzanine_ratio, Some(*mezzanine_rate)),
                sized(
                    Tranche::Subordinate,
                    dec!(100) - *senior_ratio - *mezzanine_ratio,
                    None,
                ),
            ],
            WaterfallVariant::StructuredInterestPrincipal {
                senior_ratio,
                subordinate_rate,
            } => vec![
                sized(Tranche::Senior, *senior_ratio, Some(params.hurdle_rate)),
                sized(
                    Tranche::Subordinate,
                    dec!(100) - *senior_ratio,
                    Some(*subordinate_rate),
                ),
            ],
        }
    }

    /// The per-period priority table.
    pub fn steps(&self, params: &BasicParams) -> Vec<Step> {
        use Gate::*;
        use Tranche::*;

        let hurdle = percent_to_rate(params.hurdle_rate);
        let carry = Step::Carry {
            gp_share: percent_to_rate(params.management_carry),
        };

        match self {
            WaterfallVariant::FlatPriorityRepayment => vec![
                Step::Accrue {
                    tranche: Fund,
                    rate: hurdle,
                },
                Step::PayPrincipal {
                    tranche: Fund,
                    gates: vec![],
                },
                Step::PayHurdle {
                    tranche: Fund,
                    gates: vec![PrincipalCleared(Fund)],
                },
                carry,
            ],
            WaterfallVariant::FlatPeriodicDistribution { periodic_rate } => {
                let periodic = percent_to_rate(*periodic_rate);
                vec![
                    Step::PeriodicReturn {
                        tranche: Fund,
                        rate: periodic,
                    },
                    Step::Accrue {
                        tranche: Fund,
                        rate: floor_zero(hurdle - periodic),
                    },
                    Step::PayPrincipal {
                        tranche: Fund,
                        gates: vec![],
                    },
                    Step::PayHurdle {
                        tranche: Fund,
                        gates: vec![PrincipalCleared(Fund)],
                    },
                    carry,
                ]
            }
            WaterfallVariant::StructuredSeniorSubordinate { .. } => vec![
                Step::Accrue {
                    tranche: Senior,
                    rate: hurdle,
                },
                Step::PayPrincipal {
                    tranche: Senior,
                    gates: vec![],
                },
                Step::PayHurdle {
                    tranche: Senior,
                    gates: vec![PrincipalCleared(Senior)],
                },
                Step::PayPrincipal {
                    tranche: Subordinate,
                    gates: vec![PrincipalCleared(Senior), HurdleCleared(Senior)],
                },
                carry,
            ],
            WaterfallVariant::StructuredMezzanine { mezzanine_rate, .. } => vec![
                Step::Accrue {
                    tranche: Senior,
                    rate: hurdle,
                },
                Step::Accrue {
                    tranche: Mezzanine,
                    rate: percent_to_rate(*mezzanine_rate),
                },
                Step::PayHurdle {
                    tranche: Senior,
                    gates: vec![],
                },
                Step::PayHurdle {
                    tranche: Mezzanine,
                    gates: vec![],
                },
                Step::PayPrincipal {
                    tranche: Senior,
                    gates: vec![HurdleCleared(Senior)],
                },
                Step::PayPrincipal {
                    tranche: Mezzanine,
                    gates: vec![PrincipalCleared(Senior), HurdleCleared(Mezzanine)],
                },
                Step::PayPrincipal {
                    tranche: Subordinate,
                    gates: vec![PrincipalCleared(Senior), PrincipalCleared(Mezzanine)],
                },
                carry,
            ],
            WaterfallVariant::StructuredInterestPrincipal {
                subordinate_rate, ..
            } => vec![
                Step::PeriodicReturn {
                    tranche: Senior,
                    rate: hurdle,
                },
                Step::PeriodicReturn {
                    tranche: Subordinate,
                    rate: percent_to_rate(*subordinate_rate),
                },
                Step::PayPrincipal {
                    tranche: Senior,
                    gates: vec![],
                },
                Step::PayPrincipal {
                    tranche: Subordinate,
                    gates: vec![PrincipalCleared(Senior)],
                },
                carry,
            ],
        }
    }
}
