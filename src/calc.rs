//! # Financial Calculators Module
//!
//! Mortgage and rental-yield arithmetic behind the `/calculators` flow.
//! Pure functions so the numbers can be checked without a chat in the loop.

use crate::errors::BotError;

/// Result of a mortgage calculation
#[derive(Debug, Clone, PartialEq)]
pub struct MortgageQuote {
    pub monthly_payment: f64,
    pub total_paid: f64,
    pub total_interest: f64,
    pub months: u32,
}

/// Annuity payment for a loan of `principal` at `annual_rate_pct` over `years`
pub fn mortgage_quote(
    principal: f64,
    annual_rate_pct: f64,
    years: u32,
) -> Result<MortgageQuote, BotError> {
    if !(principal.is_finite() && principal > 0.0) {
        return Err(BotError::Validation(
            "loan amount must be positive".to_string(),
        ));
    }
    if !(annual_rate_pct.is_finite() && annual_rate_pct >= 0.0) {
        return Err(BotError::Validation(
            "interest rate must not be negative".to_string(),
        ));
    }
    if years == 0 || years > 50 {
        return Err(BotError::Validation(
            "loan term must be between 1 and 50 years".to_string(),
        ));
    }

    let months = years * 12;
    let monthly_rate = annual_rate_pct / 100.0 / 12.0;

    let monthly_payment = if monthly_rate == 0.0 {
        principal / months as f64
    } else {
        let growth = (1.0 + monthly_rate).powi(months as i32);
        principal * monthly_rate * growth / (growth - 1.0)
    };

    let total_paid = monthly_payment * months as f64;
    Ok(MortgageQuote {
        monthly_payment,
        total_paid,
        total_interest: total_paid - principal,
        months,
    })
}

/// Result of a rental-yield calculation
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentQuote {
    pub annual_yield_pct: f64,
    pub payback_years: f64,
}

/// Annual yield and payback period for a rental purchase
pub fn investment_quote(
    cost: f64,
    monthly_rent: f64,
    monthly_expenses: f64,
) -> Result<InvestmentQuote, BotError> {
    if !(cost.is_finite() && cost > 0.0) {
        return Err(BotError::Validation(
            "purchase cost must be positive".to_string(),
        ));
    }
    if !(monthly_rent.is_finite() && monthly_rent > 0.0) {
        return Err(BotError::Validation(
            "monthly rent must be positive".to_string(),
        ));
    }
    if !(monthly_expenses.is_finite() && monthly_expenses >= 0.0) {
        return Err(BotError::Validation(
            "monthly expenses must not be negative".to_string(),
        ));
    }

    let net_annual = (monthly_rent - monthly_expenses) * 12.0;
    if net_annual <= 0.0 {
        return Err(BotError::Validation(
            "expenses consume the entire rent".to_string(),
        ));
    }

    Ok(InvestmentQuote {
        annual_yield_pct: net_annual / cost * 100.0,
        payback_years: cost / net_annual,
    })
}
