//! Loan offer computation
//!
//! Pure business rules: the sanctioned amount and interest rate follow from
//! the verification score alone. No clamping is applied.

/// Rupees sanctioned per score point
const AMOUNT_PER_POINT: u64 = 1000;
/// Rate in percent before the score discount
const BASE_RATE_PERCENT: f64 = 18.0;
/// Score points per percentage point of discount
const POINTS_PER_RATE_PERCENT: f64 = 100.0;

/// Amount and rate for a verified subject, before a letter exists
#[derive(Debug, Clone, PartialEq)]
pub struct SanctionTerms {
    pub subject_name: String,
    /// Whole rupees
    pub amount: u64,
    /// Percent per annum
    pub rate: f64,
}

impl SanctionTerms {
    pub fn for_score(subject_name: impl Into<String>, score: u32) -> Self {
        Self {
            subject_name: subject_name.into(),
            amount: u64::from(score) * AMOUNT_PER_POINT,
            rate: BASE_RATE_PERCENT - f64::from(score) / POINTS_PER_RATE_PERCENT,
        }
    }

    /// Amount with Indian digit grouping, e.g. `7,50,000`
    pub fn amount_display(&self) -> String {
        format_inr(self.amount)
    }

    /// Rate with two decimals, e.g. `10.50`
    pub fn rate_display(&self) -> String {
        format!("{:.2}", self.rate)
    }
}

/// Computed loan terms plus where the sanction letter can be fetched
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub terms: SanctionTerms,
    pub document_reference: String,
}

/// Group digits the en-IN way: last three, then pairs.
pub fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = front;
    }
    groups.push(rest);
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}
