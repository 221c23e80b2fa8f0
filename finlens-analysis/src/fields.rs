//! Canonical financial-statement vocabulary.
//!
//! Every source table, whatever its naming convention, is mapped onto these
//! fields before any ratio is computed.

use serde::{Deserialize, Serialize};

/// A normalized financial-statement line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    // === Income Statement ===
    Revenue,
    CostOfGoodsSold,
    GrossProfit,
    OperatingIncome,
    NetIncome,
    InterestExpense,
    #[serde(rename = "EBITDA")]
    Ebitda,
    PretaxIncome,
    IncomeTaxExpense,
    ResearchAndDevelopment,
    #[serde(rename = "BasicEPS")]
    BasicEps,

    // === Balance Sheet ===
    TotalAssets,
    CurrentAssets,
    TotalLiabilities,
    CurrentLiabilities,
    TotalEquity,
    TotalDebt,
    Cash,
    Inventory,
    Receivables,
    Payables,
    #[serde(rename = "NetPPE")]
    NetPpe,
    RetainedEarnings,
    ShareIssued,

    // === Cash Flow Statement ===
    OperatingCashFlow,
    InvestingCashFlow,
    FinancingCashFlow,
    CapitalExpenditures,
    CashDividendsPaid,

    // === Market / sector ===
    MarketCapitalization,
    Loans,
    Deposits,
    NetInterestIncome,
    EarningAssets,
}

impl CanonicalField {
    /// Every canonical field, in declaration order.
    pub const ALL: [CanonicalField; 34] = [
        Self::Revenue,
        Self::CostOfGoodsSold,
        Self::GrossProfit,
        Self::OperatingIncome,
        Self::NetIncome,
        Self::InterestExpense,
        Self::Ebitda,
        Self::PretaxIncome,
        Self::IncomeTaxExpense,
        Self::ResearchAndDevelopment,
        Self::BasicEps,
        Self::TotalAssets,
        Self::CurrentAssets,
        Self::TotalLiabilities,
        Self::CurrentLiabilities,
        Self::TotalEquity,
        Self::TotalDebt,
        Self::Cash,
        Self::Inventory,
        Self::Receivables,
        Self::Payables,
        Self::NetPpe,
        Self::RetainedEarnings,
        Self::ShareIssued,
        Self::OperatingCashFlow,
        Self::InvestingCashFlow,
        Self::FinancingCashFlow,
        Self::CapitalExpenditures,
        Self::CashDividendsPaid,
        Self::MarketCapitalization,
        Self::Loans,
        Self::Deposits,
        Self::NetInterestIncome,
        Self::EarningAssets,
    ];

    /// The canonical column name used in normalized tables.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::CostOfGoodsSold => "CostOfGoodsSold",
            Self::GrossProfit => "GrossProfit",
            Self::OperatingIncome => "OperatingIncome",
            Self::NetIncome => "NetIncome",
            Self::InterestExpense => "InterestExpense",
            Self::Ebitda => "EBITDA",
            Self::PretaxIncome => "PretaxIncome",
            Self::IncomeTaxExpense => "IncomeTaxExpense",
            Self::ResearchAndDevelopment => "ResearchAndDevelopment",
            Self::BasicEps => "BasicEPS",
            Self::TotalAssets => "TotalAssets",
            Self::CurrentAssets => "CurrentAssets",
            Self::TotalLiabilities => "TotalLiabilities",
            Self::CurrentLiabilities => "CurrentLiabilities",
            Self::TotalEquity => "TotalEquity",
            Self::TotalDebt => "TotalDebt",
            Self::Cash => "Cash",
            Self::Inventory => "Inventory",
            Self::Receivables => "Receivables",
            Self::Payables => "Payables",
            Self::NetPpe => "NetPPE",
            Self::RetainedEarnings => "RetainedEarnings",
            Self::ShareIssued => "ShareIssued",
            Self::OperatingCashFlow => "OperatingCashFlow",
            Self::InvestingCashFlow => "InvestingCashFlow",
            Self::FinancingCashFlow => "FinancingCashFlow",
            Self::CapitalExpenditures => "CapitalExpenditures",
            Self::CashDividendsPaid => "CashDividendsPaid",
            Self::MarketCapitalization => "MarketCapitalization",
            Self::Loans => "Loans",
            Self::Deposits => "Deposits",
            Self::NetInterestIncome => "NetInterestIncome",
            Self::EarningAssets => "EarningAssets",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
