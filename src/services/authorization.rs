//! Authorization rules for health spending purchases.
//!
//! The decision is a pure function of the merchant category code, the
//! current balance and the requested amount. Persisting the decision and
//! debiting the balance is done by [`super::transaction_service`].

use std::fmt;

/// IIAS-eligible medical merchant category codes.
pub const IIAS_ELIGIBLE_MCCS: [&str; 11] = [
    "8011", "8021", "8031", "8041", "8042", "8043", "8049", "8050", "8062", "8071", "8099",
];

/// Pharmacies and drug wholesalers admitted under the 90% rule.
pub const NINETY_PERCENT_MCCS: [&str; 2] = [
    "5912", // Drug Stores and Pharmacies
    "5122", // Drugs, Drug Proprietaries, and Druggist Sundries
];

/// Why an authorization was declined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    NonQualifiedExpense,
    InsufficientFunds,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::NonQualifiedExpense => "Non-qualified expense",
            RejectionReason::InsufficientFunds => "Insufficient funds",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an authorization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Debit the requested amount.
    Approved,
    /// Record the attempt, leave the balance alone.
    Declined(RejectionReason),
}

impl Decision {
    pub fn is_approved(&self) -> bool {
        matches!(self, Decision::Approved)
    }

    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        match self {
            Decision::Approved => None,
            Decision::Declined(reason) => Some(*reason),
        }
    }
}

/// Whether purchases at this merchant category are reimbursable.
///
/// Codes are compared as exact strings, so "05912" or " 5912" do not qualify.
pub fn is_qualified_mcc(mcc: &str) -> bool {
    IIAS_ELIGIBLE_MCCS.contains(&mcc) || NINETY_PERCENT_MCCS.contains(&mcc)
}

/// Decide a purchase.
///
/// The merchant category is checked before funds, so a non-qualified
/// purchase on an empty account is reported as "Non-qualified expense".
/// A purchase that takes the balance to exactly zero is approved.
pub fn decide(balance_cents: i64, mcc: &str, amount_cents: i64) -> Decision {
    if !is_qualified_mcc(mcc) {
        return Decision::Declined(RejectionReason::NonQualifiedExpense);
    }

    if balance_cents < amount_cents {
        return Decision::Declined(RejectionReason::InsufficientFunds);
    }

    Decision::Approved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pharmacy_with_funds_is_approved() {
        assert_eq!(decide(10_000, "5912", 1_250), Decision::Approved);
    }

    #[test]
    fn every_listed_code_qualifies() {
        for mcc in IIAS_ELIGIBLE_MCCS.iter().chain(NINETY_PERCENT_MCCS.iter()) {
            assert!(is_qualified_mcc(mcc), "{mcc} should qualify");
        }
    }

    #[test]
    fn unlisted_code_is_non_qualified() {
        let decision = decide(10_000, "0000", 100);
        assert_eq!(
            decision,
            Decision::Declined(RejectionReason::NonQualifiedExpense)
        );
        assert_eq!(
            decision.rejection_reason().map(|r| r.to_string()).as_deref(),
            Some("Non-qualified expense")
        );
    }

    #[test]
    fn codes_are_matched_exactly() {
        assert!(!is_qualified_mcc("05912"));
        assert!(!is_qualified_mcc("5912 "));
        assert!(!is_qualified_mcc(""));
    }

    #[test]
    fn short_balance_is_insufficient_funds() {
        let decision = decide(500, "8011", 1_000);
        assert_eq!(decision, Decision::Declined(RejectionReason::InsufficientFunds));
        assert!(!decision.is_approved());
        assert_eq!(
            RejectionReason::InsufficientFunds.as_str(),
            "Insufficient funds"
        );
    }

    #[test]
    fn category_is_checked_before_funds() {
        assert_eq!(
            decide(0, "5411", 1_000),
            Decision::Declined(RejectionReason::NonQualifiedExpense)
        );
    }

    #[test]
    fn exact_balance_is_approved() {
        let decision = decide(1_000, "8099", 1_000);
        assert!(decision.is_approved());
        assert_eq!(decision.rejection_reason(), None);
    }
}
