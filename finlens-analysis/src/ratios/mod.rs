//! Ratio computation engine.
//!
//! Pure functions from canonical records to typed ratio sets. Every year of
//! a record set is computed against the closest earlier year present.
//!
//! | Category      | Ratios                                                      |
//! |---------------|-------------------------------------------------------------|
//! | Liquidity     | CurrentRatio, QuickRatio, CashRatio                         |
//! | Activity      | DSO, DSI, DPO, CashConversionCycle, turnovers, growth       |
//! | Solvency      | DebtToEquity, DebtToAssets, NetDebtToEBITDA, InterestCoverage |
//! | Profitability | GrossMargin, EBITDAMargin, OperatingMargin, NetMargin       |
//! | Management    | ROE, ROA, ROIC                                              |
//! | PerShare      | EPS, BookValuePerShare, DividendPayout                      |
//! | CashFlow      | FreeCashFlow, CapexToSales, OperatingCashFlowRatio          |
//! | Sector        | industry extensions (see [`SectorProfile`])                 |
//!
//! Profitability margins are stored as fractions; [`RatioReport::for_display`]
//! scales them to percent and applies presentation rounding.

pub mod formulas;
pub mod sector;

use std::collections::BTreeMap;

use finlens_common::validation::check_unit_interval;
use finlens_common::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::fields::CanonicalField;
use crate::record::{CanonicalFinancialRecord, RecordSet};

pub use formulas::{
    checked_divide, effective_tax_rate, invested_capital, nopat, safe_divide, safe_divide_or,
    TaxRate, TaxRateSource, DAYS_PER_YEAR, DEFAULT_TAX_RATE, DEGENERATE, FORMULA_VERSION,
};
pub use sector::SectorProfile;

/// Ratio category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RatioCategory {
    Liquidity,
    Activity,
    Solvency,
    Profitability,
    Management,
    PerShare,
    CashFlow,
    /// Industry extensions
    Sector,
}

impl std::fmt::Display for RatioCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatioCategory::Liquidity => write!(f, "Liquidity"),
            RatioCategory::Activity => write!(f, "Activity"),
            RatioCategory::Solvency => write!(f, "Solvency"),
            RatioCategory::Profitability => write!(f, "Profitability"),
            RatioCategory::Management => write!(f, "Management"),
            RatioCategory::PerShare => write!(f, "Per Share"),
            RatioCategory::CashFlow => write!(f, "Cash Flow"),
            RatioCategory::Sector => write!(f, "Sector"),
        }
    }
}

// ============================================================================
// Typed ratio records
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LiquidityRatios {
    pub current_ratio: f64,
    pub quick_ratio: f64,
    pub cash_ratio: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityRatios {
    /// Days sales outstanding
    pub dso: f64,
    /// Days inventory outstanding
    pub dsi: f64,
    /// Days payables outstanding
    pub dpo: f64,
    pub cash_conversion_cycle: f64,
    pub asset_turnover: f64,
    pub fixed_asset_turnover: f64,
    pub inventory_turnover: f64,
    /// Year-over-year revenue growth (%)
    pub revenue_growth: f64,
    /// Year-over-year net income growth (%)
    pub net_income_growth: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SolvencyRatios {
    pub debt_to_equity: f64,
    pub debt_to_assets: f64,
    pub net_debt_to_ebitda: f64,
    pub interest_coverage: f64,
}

/// Margins as fractions of revenue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfitabilityRatios {
    pub gross_margin: f64,
    pub ebitda_margin: f64,
    pub operating_margin: f64,
    pub net_margin: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagementRatios {
    pub roe: f64,
    pub roa: f64,
    pub roic: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerShareRatios {
    pub eps: f64,
    pub book_value_per_share: f64,
    /// Dividends as a percent of net income
    pub dividend_payout: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowRatios {
    pub free_cash_flow: f64,
    /// Capital expenditures as a percent of revenue
    pub capex_to_sales: f64,
    pub operating_cash_flow_ratio: f64,
}

/// All ratios for one fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRatios {
    pub year: i32,
    /// Year the trend ratios were measured against
    pub prior_year: Option<i32>,
    pub tax_rate: TaxRate,
    pub liquidity: LiquidityRatios,
    pub activity: ActivityRatios,
    pub solvency: SolvencyRatios,
    pub profitability: ProfitabilityRatios,
    pub management: ManagementRatios,
    pub per_share: PerShareRatios,
    pub cash_flow: CashFlowRatios,
    #[serde(default)]
    pub sector: BTreeMap<String, f64>,
}

impl YearRatios {
    /// Named values for one category, in a stable order.
    pub fn entries(&self, category: RatioCategory) -> Vec<(String, f64)> {
        let named: Vec<(&str, f64)> = match category {
            RatioCategory::Liquidity => vec![
                ("CurrentRatio", self.liquidity.current_ratio),
                ("QuickRatio", self.liquidity.quick_ratio),
                ("CashRatio", self.liquidity.cash_ratio),
            ],
            RatioCategory::Activity => vec![
                ("DSO", self.activity.dso),
                ("DSI", self.activity.dsi),
                ("DPO", self.activity.dpo),
                ("CashConversionCycle", self.activity.cash_conversion_cycle),
                ("AssetTurnover", self.activity.asset_turnover),
                ("FixedAssetTurnover", self.activity.fixed_asset_turnover),
                ("InventoryTurnover", self.activity.inventory_turnover),
                ("RevenueGrowth", self.activity.revenue_growth),
                ("NetIncomeGrowth", self.activity.net_income_growth),
            ],
            RatioCategory::Solvency => vec![
                ("DebtToEquity", self.solvency.debt_to_equity),
                ("DebtToAssets", self.solvency.debt_to_assets),
                ("NetDebtToEBITDA", self.solvency.net_debt_to_ebitda),
                ("InterestCoverage", self.solvency.interest_coverage),
            ],
            RatioCategory::Profitability => vec![
                ("GrossMargin", self.profitability.gross_margin),
                ("EBITDAMargin", self.profitability.ebitda_margin),
                ("OperatingMargin", self.profitability.operating_margin),
                ("NetMargin", self.profitability.net_margin),
            ],
            RatioCategory::Management => vec![
                ("ROE", self.management.roe),
                ("ROA", self.management.roa),
                ("ROIC", self.management.roic),
            ],
            RatioCategory::PerShare => vec![
                ("EPS", self.per_share.eps),
                ("BookValuePerShare", self.per_share.book_value_per_share),
                ("DividendPayout", self.per_share.dividend_payout),
            ],
            RatioCategory::CashFlow => vec![
                ("FreeCashFlow", self.cash_flow.free_cash_flow),
                ("CapexToSales", self.cash_flow.capex_to_sales),
                ("OperatingCashFlowRatio", self.cash_flow.operating_cash_flow_ratio),
            ],
            RatioCategory::Sector => {
                return self
                    .sector
                    .iter()
                    .map(|(name, value)| (name.clone(), *value))
                    .collect();
            }
        };
        named
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

/// Whether every input a named ratio reads was reported.
///
/// A ratio whose inputs are missing still carries the degenerate value in
/// [`YearRatios`]; this separates it from a genuine zero.
pub fn inputs_known(
    name: &str,
    current: &CanonicalFinancialRecord,
    prior: Option<&CanonicalFinancialRecord>,
) -> bool {
    use CanonicalField as F;

    let all = |fields: &[CanonicalField]| fields.iter().all(|f| current.has(*f));
    let grown = |field| current.has(field) && prior.is_some_and(|p| p.has(field));

    match name {
        "CurrentRatio" | "QuickRatio" => all(&[F::CurrentAssets, F::CurrentLiabilities]),
        "CashRatio" => all(&[F::Cash, F::CurrentLiabilities]),
        "DSO" => all(&[F::Receivables, F::Revenue]),
        "DSI" => all(&[F::Inventory, F::CostOfGoodsSold]),
        "DPO" => all(&[F::Payables, F::CostOfGoodsSold]),
        "CashConversionCycle" => all(&[
            F::Receivables,
            F::Revenue,
            F::Inventory,
            F::Payables,
            F::CostOfGoodsSold,
        ]),
        "AssetTurnover" => all(&[F::Revenue, F::TotalAssets]),
        "FixedAssetTurnover" => all(&[F::Revenue, F::NetPpe]),
        "InventoryTurnover" => all(&[F::CostOfGoodsSold, F::Inventory]),
        "RevenueGrowth" => grown(F::Revenue),
        "NetIncomeGrowth" => grown(F::NetIncome),
        "DebtToEquity" => all(&[F::TotalDebt, F::TotalEquity]),
        "DebtToAssets" => all(&[F::TotalDebt, F::TotalAssets]),
        "NetDebtToEBITDA" => all(&[F::TotalDebt, F::Ebitda]),
        "InterestCoverage" => all(&[F::OperatingIncome, F::InterestExpense]),
        "GrossMargin" => {
            current.has(F::Revenue)
                && (current.has(F::GrossProfit) || current.has(F::CostOfGoodsSold))
        }
        "EBITDAMargin" => all(&[F::Ebitda, F::Revenue]),
        "OperatingMargin" => all(&[F::OperatingIncome, F::Revenue]),
        "NetMargin" => all(&[F::NetIncome, F::Revenue]),
        "ROE" => all(&[F::NetIncome, F::TotalEquity]),
        "ROA" => all(&[F::NetIncome, F::TotalAssets]),
        "ROIC" => {
            current.has(F::OperatingIncome)
                && (current.has(F::TotalEquity) || current.has(F::TotalDebt))
        }
        "EPS" => current.has(F::BasicEps) || all(&[F::NetIncome, F::ShareIssued]),
        "BookValuePerShare" => all(&[F::TotalEquity, F::ShareIssued]),
        "DividendPayout" => all(&[F::CashDividendsPaid, F::NetIncome]),
        "FreeCashFlow" => all(&[F::OperatingCashFlow]),
        "CapexToSales" => all(&[F::CapitalExpenditures, F::Revenue]),
        "OperatingCashFlowRatio" => all(&[F::OperatingCashFlow, F::CurrentLiabilities]),
        "LoanToDeposit" => all(&[F::Loans, F::Deposits]),
        "NetInterestMargin" => all(&[F::NetInterestIncome, F::EarningAssets]),
        "RnDToSales" => all(&[F::ResearchAndDevelopment, F::Revenue]),
        "InventoryToSales" => all(&[F::Inventory, F::Revenue]),
        _ => false,
    }
}

/// Category → year → ratio name → value.
pub type FlatRatios = BTreeMap<RatioCategory, BTreeMap<i32, BTreeMap<String, f64>>>;

/// Ratios for every year of a record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioReport {
    pub formula_version: String,
    pub sector: SectorProfile,
    /// Ascending by year
    pub years: Vec<YearRatios>,
}

impl RatioReport {
    /// Ratios for the newest year.
    pub fn latest(&self) -> Option<&YearRatios> {
        self.years.last()
    }

    /// Ratios for a specific year.
    pub fn year(&self, year: i32) -> Option<&YearRatios> {
        self.years.iter().find(|y| y.year == year)
    }

    /// Full-precision `category → year → name → value` view.
    pub fn flatten(&self) -> FlatRatios {
        self.flatten_with(|_, _, value| value)
    }

    /// Presentation view: profitability in percent, day counts rounded to
    /// whole days, everything else to two decimals.
    pub fn for_display(&self) -> FlatRatios {
        self.flatten_with(|category, name, value| {
            if category == RatioCategory::Profitability {
                round_to(value * 100.0, 2)
            } else if DAY_COUNT_RATIOS.contains(&name) {
                round_to(value, 0)
            } else {
                round_to(value, 2)
            }
        })
    }

    fn flatten_with(&self, map: impl Fn(RatioCategory, &str, f64) -> f64) -> FlatRatios {
        let mut flat = FlatRatios::new();
        for category in ALL_CATEGORIES {
            let per_year: BTreeMap<i32, BTreeMap<String, f64>> = self
                .years
                .iter()
                .map(|ratios| {
                    let values = ratios
                        .entries(category)
                        .into_iter()
                        .map(|(name, value)| {
                            let shown = map(category, &name, value);
                            (name, shown)
                        })
                        .collect();
                    (ratios.year, values)
                })
                .filter(|(_, values): &(i32, BTreeMap<String, f64>)| !values.is_empty())
                .collect();
            if !per_year.is_empty() {
                flat.insert(category, per_year);
            }
        }
        flat
    }
}

const ALL_CATEGORIES: [RatioCategory; 8] = [
    RatioCategory::Liquidity,
    RatioCategory::Activity,
    RatioCategory::Solvency,
    RatioCategory::Profitability,
    RatioCategory::Management,
    RatioCategory::PerShare,
    RatioCategory::CashFlow,
    RatioCategory::Sector,
];

const DAY_COUNT_RATIOS: &[&str] = &["DSO", "DSI", "DPO", "CashConversionCycle"];

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ============================================================================
// Engine
// ============================================================================

/// Computes ratio reports from canonical records.
#[derive(Debug, Clone, Copy)]
pub struct RatioEngine {
    default_tax_rate: f64,
}

impl Default for RatioEngine {
    fn default() -> Self {
        Self {
            default_tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

impl RatioEngine {
    /// Create an engine with the default 25% tax assumption.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom fallback tax rate in [0, 1].
    pub fn with_default_tax_rate(rate: f64) -> Result<Self> {
        check_unit_interval("default tax rate", rate)
            .map_err(|e| Error::invalid_input(e.to_string()))?;
        Ok(Self {
            default_tax_rate: rate,
        })
    }

    pub fn default_tax_rate(&self) -> f64 {
        self.default_tax_rate
    }

    /// Compute every year, pairing each with the closest earlier year.
    ///
    /// Sector ratios that are degenerate in every year are dropped.
    pub fn compute(&self, records: &RecordSet, sector: SectorProfile) -> RatioReport {
        let mut years: Vec<YearRatios> = records
            .iter()
            .map(|record| {
                let prior = records.prior_to(record.year);
                let mut ratios = self.compute_year(record, prior);
                ratios.sector = sector
                    .compute(record)
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value))
                    .collect();
                ratios
            })
            .collect();

        let informative: Vec<String> = years
            .iter()
            .flat_map(|y| y.sector.iter())
            .filter(|(_, value)| **value != DEGENERATE)
            .map(|(name, _)| name.clone())
            .collect();
        for ratios in &mut years {
            ratios.sector.retain(|name, _| informative.contains(name));
        }

        tracing::debug!(years = years.len(), sector = %sector, "Computed ratios");

        RatioReport {
            formula_version: FORMULA_VERSION.to_string(),
            sector,
            years,
        }
    }

    /// Compute the seven core categories for one year.
    pub fn compute_year(
        &self,
        current: &CanonicalFinancialRecord,
        prior: Option<&CanonicalFinancialRecord>,
    ) -> YearRatios {
        let get = |field| current.get(field);
        let tax_rate = effective_tax_rate(current, self.default_tax_rate);

        YearRatios {
            year: current.year,
            prior_year: prior.map(|p| p.year),
            tax_rate,
            liquidity: liquidity(current),
            activity: activity(current, prior),
            solvency: solvency(current),
            profitability: profitability(current),
            management: ManagementRatios {
                roe: safe_divide(get(CanonicalField::NetIncome), get(CanonicalField::TotalEquity)),
                roa: safe_divide(get(CanonicalField::NetIncome), get(CanonicalField::TotalAssets)),
                roic: safe_divide(
                    nopat(current, tax_rate.rate),
                    Some(invested_capital(current).0),
                ),
            },
            per_share: per_share(current),
            cash_flow: cash_flow(current),
            sector: BTreeMap::new(),
        }
    }
}

fn liquidity(r: &CanonicalFinancialRecord) -> LiquidityRatios {
    let current_liabilities = r.get(CanonicalField::CurrentLiabilities);
    let quick_assets = r
        .get(CanonicalField::CurrentAssets)
        .map(|ca| ca - r.get(CanonicalField::Inventory).unwrap_or(0.0));

    LiquidityRatios {
        current_ratio: safe_divide(r.get(CanonicalField::CurrentAssets), current_liabilities),
        quick_ratio: safe_divide(quick_assets, current_liabilities),
        cash_ratio: safe_divide(r.get(CanonicalField::Cash), current_liabilities),
    }
}

fn activity(
    r: &CanonicalFinancialRecord,
    prior: Option<&CanonicalFinancialRecord>,
) -> ActivityRatios {
    let revenue = r.get(CanonicalField::Revenue);
    let cogs = r.get(CanonicalField::CostOfGoodsSold);

    let dso = safe_divide(r.get(CanonicalField::Receivables), revenue) * DAYS_PER_YEAR;
    let dsi = safe_divide(r.get(CanonicalField::Inventory), cogs) * DAYS_PER_YEAR;
    let dpo = safe_divide(r.get(CanonicalField::Payables), cogs) * DAYS_PER_YEAR;

    ActivityRatios {
        dso,
        dsi,
        dpo,
        cash_conversion_cycle: dso + dsi - dpo,
        asset_turnover: safe_divide(revenue, r.get(CanonicalField::TotalAssets)),
        fixed_asset_turnover: safe_divide(revenue, r.get(CanonicalField::NetPpe)),
        inventory_turnover: safe_divide(cogs, r.get(CanonicalField::Inventory)),
        revenue_growth: growth(r, prior, CanonicalField::Revenue),
        net_income_growth: growth(r, prior, CanonicalField::NetIncome),
    }
}

/// Percent change against the prior year, measured on the prior's magnitude.
fn growth(
    r: &CanonicalFinancialRecord,
    prior: Option<&CanonicalFinancialRecord>,
    field: CanonicalField,
) -> f64 {
    let previous = prior.and_then(|p| p.get(field));
    let change = r.get(field).zip(previous).map(|(now, before)| now - before);
    safe_divide(change, previous.map(f64::abs)) * 100.0
}

fn solvency(r: &CanonicalFinancialRecord) -> SolvencyRatios {
    let debt = r.get(CanonicalField::TotalDebt);
    let net_debt = debt.map(|d| d - r.get(CanonicalField::Cash).unwrap_or(0.0));

    SolvencyRatios {
        debt_to_equity: safe_divide(debt, r.get(CanonicalField::TotalEquity)),
        debt_to_assets: safe_divide(debt, r.get(CanonicalField::TotalAssets)),
        net_debt_to_ebitda: safe_divide(net_debt, r.get(CanonicalField::Ebitda)),
        interest_coverage: safe_divide(
            r.get(CanonicalField::OperatingIncome),
            r.get(CanonicalField::InterestExpense).map(f64::abs),
        ),
    }
}

fn profitability(r: &CanonicalFinancialRecord) -> ProfitabilityRatios {
    let revenue = r.get(CanonicalField::Revenue);
    let gross_profit = r.get(CanonicalField::GrossProfit).or_else(|| {
        revenue.zip(r.get(CanonicalField::CostOfGoodsSold))
            .map(|(rev, cogs)| rev - cogs)
    });

    ProfitabilityRatios {
        gross_margin: safe_divide(gross_profit, revenue),
        ebitda_margin: safe_divide(r.get(CanonicalField::Ebitda), revenue),
        operating_margin: safe_divide(r.get(CanonicalField::OperatingIncome), revenue),
        net_margin: safe_divide(r.get(CanonicalField::NetIncome), revenue),
    }
}

fn per_share(r: &CanonicalFinancialRecord) -> PerShareRatios {
    let shares = r.get(CanonicalField::ShareIssued);
    let net_income = r.get(CanonicalField::NetIncome);

    PerShareRatios {
        eps: r
            .get(CanonicalField::BasicEps)
            .unwrap_or_else(|| safe_divide(net_income, shares)),
        book_value_per_share: safe_divide(r.get(CanonicalField::TotalEquity), shares),
        dividend_payout: safe_divide(
            r.get(CanonicalField::CashDividendsPaid).map(f64::abs),
            net_income,
        ) * 100.0,
    }
}

fn cash_flow(r: &CanonicalFinancialRecord) -> CashFlowRatios {
    let capex = r.get(CanonicalField::CapitalExpenditures).map(f64::abs);
    let operating = r.get(CanonicalField::OperatingCashFlow);

    CashFlowRatios {
        free_cash_flow: operating.map_or(DEGENERATE, |ocf| ocf - capex.unwrap_or(0.0)),
        capex_to_sales: safe_divide(capex, r.get(CanonicalField::Revenue)) * 100.0,
        operating_cash_flow_ratio: safe_divide(
            operating,
            r.get(CanonicalField::CurrentLiabilities),
        ),
    }
}
