//! The fixed scoring model: sub-score criteria and master-score weights.
//!
//! Core sub-scores (weighted into `Master_Score`):
//! 1. **Quality** -- top-30% ROE, ROA, ROIC and profit margin.
//! 2. **Value** -- bottom-30% PE, PB, PS and EV/EBITDA (positive multiples only for PE and EV/EBITDA).
//! 3. **Growth** -- absolute trailing and next-year growth hurdles.
//! 4. **Financial health** -- liquidity, leverage, Altman Z and FCF yield hurdles.
//! 5. **Momentum** -- top-30% 1Y return, positive 3M/1M returns, RSI in 50-70.
//!
//! Extended sub-scores join the core five in the equal-weight `Ultra_Score`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::criteria::{Criterion, Threshold};
use crate::error::ScreenerError;
use crate::ScreenerResult;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const QUALITY_SCORE: &str = "Quality_Score";
pub const VALUE_SCORE: &str = "Value_Score";
pub const GROWTH_SCORE: &str = "Growth_Score";
pub const FINANCIAL_HEALTH_SCORE: &str = "Financial_Health_Score";
pub const MOMENTUM_SCORE: &str = "Momentum_Score";
pub const DIVIDEND_SCORE: &str = "Dividend_Score";
pub const PROFITABILITY_SCORE: &str = "Profitability_Score";
pub const LOW_RISK_SCORE: &str = "Low_Risk_Score";
pub const FORWARD_GROWTH_SCORE: &str = "Forward_Growth_Score";
pub const FAIR_VALUE_SCORE: &str = "Fair_Value_Score";
pub const OWNERSHIP_SCORE: &str = "Ownership_Score";
pub const MASTER_SCORE: &str = "Master_Score";
pub const ULTRA_SCORE: &str = "Ultra_Score";

const TOP: Decimal = dec!(0.7);
const BOTTOM: Decimal = dec!(0.3);

pub const MAX_SCORE: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// A named sub-score: the sum of its criteria's points.
#[derive(Debug, Clone, Copy)]
pub struct SubScore {
    pub name: &'static str,
    pub criteria: &'static [Criterion],
}

impl SubScore {
    /// Points attainable when every criterion passes.
    pub fn max_points(&self) -> Decimal {
        self.criteria.iter().map(|c| c.points).sum()
    }
}

/// How a master score combines its components.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum Combination {
    /// `Σ wᵢ · scoreᵢ` with fixed weights summing to 1.
    Weighted(&'static [(&'static str, Decimal)]),
    /// Equal-weight mean of the listed sub-scores.
    Mean(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MasterScore {
    pub name: &'static str,
    pub combination: Combination,
}

impl MasterScore {
    pub fn components(&self) -> Vec<&'static str> {
        match self.combination {
            Combination::Weighted(w) => w.iter().map(|(n, _)| *n).collect(),
            Combination::Mean(n) => n.to_vec(),
        }
    }

    /// Weighted combinations must have non-negative weights summing to one.
    pub fn validate(&self) -> ScreenerResult<()> {
        match self.combination {
            Combination::Weighted(weights) => {
                if weights.iter().any(|(_, w)| *w < Decimal::ZERO) {
                    return Err(ScreenerError::InvalidInput {
                        field: self.name.into(),
                        reason: "Weights must be non-negative".into(),
                    });
                }
                let total: Decimal = weights.iter().map(|(_, w)| *w).sum();
                if total != Decimal::ONE {
                    return Err(ScreenerError::InvalidInput {
                        field: self.name.into(),
                        reason: format!("Weights sum to {total}, expected 1"),
                    });
                }
                Ok(())
            }
            Combination::Mean(names) if names.is_empty() => Err(ScreenerError::InvalidInput {
                field: self.name.into(),
                reason: "Mean of zero components".into(),
            }),
            Combination::Mean(_) => Ok(()),
        }
    }

    /// Combine already-computed component values for one row.
    pub fn combine(&self, value_of: impl Fn(&str) -> Decimal) -> Decimal {
        match self.combination {
            Combination::Weighted(weights) => {
                weights.iter().map(|(n, w)| *w * value_of(*n)).sum()
            }
            Combination::Mean(names) => {
                let total: Decimal = names.iter().map(|n| value_of(*n)).sum();
                total / Decimal::from(names.len())
            }
        }
    }
}

const fn pts(column: &'static str, threshold: Threshold, points: Decimal) -> Criterion {
    Criterion {
        column,
        threshold,
        points,
    }
}

pub const QUALITY: SubScore = SubScore {
    name: QUALITY_SCORE,
    criteria: &[
        pts("ROE", Threshold::AboveQuantile(TOP), dec!(25)),
        pts("ROA", Threshold::AboveQuantile(TOP), dec!(25)),
        pts("ROIC", Threshold::AboveQuantile(TOP), dec!(25)),
        pts("Profit Margin", Threshold::AboveQuantile(TOP), dec!(25)),
    ],
};

pub const VALUE: SubScore = SubScore {
    name: VALUE_SCORE,
    criteria: &[
        pts("PE Ratio", Threshold::PositiveBelowQuantile(BOTTOM), dec!(25)),
        pts("PB Ratio", Threshold::BelowQuantile(BOTTOM), dec!(25)),
        pts("PS Ratio", Threshold::BelowQuantile(BOTTOM), dec!(25)),
        pts("EV/EBITDA", Threshold::PositiveBelowQuantile(BOTTOM), dec!(25)),
    ],
};

pub const GROWTH: SubScore = SubScore {
    name: GROWTH_SCORE,
    criteria: &[
        pts("Rev. Growth", Threshold::Above(dec!(20)), dec!(25)),
        pts("EPS Growth", Threshold::Above(dec!(20)), dec!(25)),
        pts("Rev Gr. Next Y", Threshold::Above(dec!(15)), dec!(25)),
        pts("EPS Gr. Next Y", Threshold::Above(dec!(15)), dec!(25)),
    ],
};

pub const FINANCIAL_HEALTH: SubScore = SubScore {
    name: FINANCIAL_HEALTH_SCORE,
    criteria: &[
        pts("Current Ratio", Threshold::Above(dec!(1.5)), dec!(25)),
        pts("Debt / Equity", Threshold::Below(dec!(1)), dec!(25)),
        pts("Z-Score", Threshold::Above(dec!(3)), dec!(25)),
        pts("FCF Yield", Threshold::Above(dec!(5)), dec!(25)),
    ],
};

pub const MOMENTUM: SubScore = SubScore {
    name: MOMENTUM_SCORE,
    criteria: &[
        pts("Return 1Y", Threshold::AboveQuantile(TOP), dec!(30)),
        pts("Return 3M", Threshold::Above(dec!(0)), dec!(20)),
        pts("Return 1M", Threshold::Above(dec!(0)), dec!(20)),
        pts("RSI", Threshold::Between(dec!(50), dec!(70)), dec!(30)),
    ],
};

pub const DIVIDEND: SubScore = SubScore {
    name: DIVIDEND_SCORE,
    criteria: &[
        pts("Div. Yield", Threshold::Above(dec!(2)), dec!(25)),
        pts("Payout Ratio", Threshold::Between(dec!(0), dec!(60)), dec!(25)),
        pts("Years", Threshold::Above(dec!(5)), dec!(25)),
        pts("Div. Growth 3Y", Threshold::Above(dec!(5)), dec!(25)),
    ],
};

pub const PROFITABILITY: SubScore = SubScore {
    name: PROFITABILITY_SCORE,
    criteria: &[
        pts("Gross Margin", Threshold::AboveQuantile(TOP), dec!(25)),
        pts("Oper. Margin", Threshold::AboveQuantile(TOP), dec!(25)),
        pts("FCF Margin", Threshold::AboveQuantile(TOP), dec!(25)),
        pts("ROCE", Threshold::AboveQuantile(TOP), dec!(25)),
    ],
};

pub const LOW_RISK: SubScore = SubScore {
    name: LOW_RISK_SCORE,
    criteria: &[
        pts("Beta (5Y)", Threshold::Below(dec!(1)), dec!(40)),
        pts("Short % Float", Threshold::Below(dec!(5)), dec!(30)),
        pts("Debt / EBITDA", Threshold::Below(dec!(3)), dec!(30)),
    ],
};

pub const FORWARD_GROWTH: SubScore = SubScore {
    name: FORWARD_GROWTH_SCORE,
    criteria: &[
        pts("Rev Gr. Next 5Y", Threshold::Above(dec!(10)), dec!(50)),
        pts("EPS Gr. Next 5Y", Threshold::Above(dec!(10)), dec!(50)),
    ],
};

pub const FAIR_VALUE: SubScore = SubScore {
    name: FAIR_VALUE_SCORE,
    criteria: &[
        pts("Graham (%)", Threshold::Above(dec!(0)), dec!(50)),
        pts("Lynch (%)", Threshold::Above(dec!(0)), dec!(50)),
    ],
};

pub const OWNERSHIP: SubScore = SubScore {
    name: OWNERSHIP_SCORE,
    criteria: &[
        pts("Shares Insiders", Threshold::Above(dec!(5)), dec!(50)),
        pts("Shares Institut.", Threshold::Above(dec!(30)), dec!(50)),
    ],
};

pub const SUB_SCORES: [SubScore; 11] = [
    QUALITY,
    VALUE,
    GROWTH,
    FINANCIAL_HEALTH,
    MOMENTUM,
    DIVIDEND,
    PROFITABILITY,
    LOW_RISK,
    FORWARD_GROWTH,
    FAIR_VALUE,
    OWNERSHIP,
];

pub const MASTER: MasterScore = MasterScore {
    name: MASTER_SCORE,
    combination: Combination::Weighted(&[
        (QUALITY_SCORE, dec!(0.30)),
        (VALUE_SCORE, dec!(0.25)),
        (GROWTH_SCORE, dec!(0.20)),
        (FINANCIAL_HEALTH_SCORE, dec!(0.15)),
        (MOMENTUM_SCORE, dec!(0.10)),
    ]),
};

pub const ULTRA: MasterScore = MasterScore {
    name: ULTRA_SCORE,
    combination: Combination::Mean(&[
        QUALITY_SCORE,
        VALUE_SCORE,
        GROWTH_SCORE,
        FINANCIAL_HEALTH_SCORE,
        MOMENTUM_SCORE,
        DIVIDEND_SCORE,
        PROFITABILITY_SCORE,
        LOW_RISK_SCORE,
        FORWARD_GROWTH_SCORE,
        FAIR_VALUE_SCORE,
        OWNERSHIP_SCORE,
    ]),
};

pub const MASTER_SCORES: [MasterScore; 2] = [MASTER, ULTRA];

/// The complete scoring model: sub-scores then master scores.
#[derive(Debug, Clone)]
pub struct ScoringModel {
    pub sub_scores: Vec<SubScore>,
    pub master_scores: Vec<MasterScore>,
}

impl Default for ScoringModel {
    fn default() -> Self {
        Self {
            sub_scores: SUB_SCORES.to_vec(),
            master_scores: MASTER_SCORES.to_vec(),
        }
    }
}

impl ScoringModel {
    /// Every score column the model writes, in output order.
    pub fn output_columns(&self) -> Vec<&'static str> {
        self.sub_scores
            .iter()
            .map(|s| s.name)
            .chain(self.master_scores.iter().map(|m| m.name))
            .collect()
    }
}

/// Qualitative band for a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
}

impl ScoreBand {
    pub fn classify(score: Decimal) -> Self {
        if score >= dec!(75) {
            ScoreBand::Strong
        } else if score >= dec!(50) {
            ScoreBand::Moderate
        } else {
            ScoreBand::Weak
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_sub_score_tops_out_at_100() {
        for sub in SUB_SCORES {
            assert_eq!(sub.max_points(), MAX_SCORE, "{} max points", sub.name);
        }
    }

    #[test]
    fn test_master_weights_sum_to_one() {
        for master in MASTER_SCORES {
            master.validate().unwrap();
        }
    }

    #[test]
    fn test_master_components_are_sub_scores() {
        let names: Vec<&str> = SUB_SCORES.iter().map(|s| s.name).collect();
        for master in MASTER_SCORES {
            for c in master.components() {
                assert!(names.contains(&c), "{c} is not a sub-score");
            }
        }
    }

    #[test]
    fn test_master_combine_weights() {
        let out = MASTER.combine(|n| if n == QUALITY_SCORE { dec!(100) } else { dec!(0) });
        assert_eq!(out, dec!(30));
    }

    #[test]
    fn test_ultra_is_mean() {
        let out = ULTRA.combine(|_| dec!(50));
        assert_eq!(out, dec!(50));
    }

    #[test]
    fn test_bad_weights_rejected() {
        static BAD_WEIGHTS: [(&str, Decimal); 1] = [(QUALITY_SCORE, dec!(0.6))];
        let bad = MasterScore {
            name: "Bad",
            combination: Combination::Weighted(&BAD_WEIGHTS),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::classify(dec!(75)), ScoreBand::Strong);
        assert_eq!(ScoreBand::classify(dec!(74.9)), ScoreBand::Moderate);
        assert_eq!(ScoreBand::classify(dec!(50)), ScoreBand::Moderate);
        assert_eq!(ScoreBand::classify(dec!(10)), ScoreBand::Weak);
    }
}
