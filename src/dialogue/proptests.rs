//! Property-based tests for hand-off recognition and offer computation
//!
//! - A marker-shaped reply always yields its trimmed parameter
//! - Text that does not start with the marker never triggers
//! - Offer terms depend on the score alone

use super::offer::{format_inr, SanctionTerms};
use super::trigger::{HandoffTrigger, RUN_VERIFICATION_MARKER};
use proptest::prelude::*;

/// Parameter text: anything printable, including inner brackets and spaces
fn arb_param() -> impl Strategy<Value = String> {
    "[ A-Za-z0-9\\]\\[_:.-]{0,24}"
}

fn arb_padding() -> impl Strategy<Value = String> {
    "[ \t\n]{0,4}"
}

proptest! {
    #[test]
    fn marker_reply_yields_trimmed_parameter(
        param in arb_param(),
        lead in arb_padding(),
        trail in arb_padding(),
    ) {
        let reply = format!("{lead}{RUN_VERIFICATION_MARKER}{param}]{trail}");
        let parsed = HandoffTrigger::parse(&reply);
        prop_assert_eq!(
            parsed,
            Some(HandoffTrigger::RunVerification { subject_id: param.trim().to_string() })
        );
    }

    #[test]
    fn prose_prefix_never_triggers(
        prefix in "[A-Za-z][A-Za-z ,.!]{0,20}",
        param in arb_param(),
    ) {
        let reply = format!("{prefix} {RUN_VERIFICATION_MARKER}{param}]");
        prop_assert_eq!(HandoffTrigger::parse(&reply), None);
    }

    #[test]
    fn missing_closing_bracket_never_triggers(param in "[ A-Za-z0-9]{0,24}") {
        let reply = format!("{RUN_VERIFICATION_MARKER}{param}");
        prop_assert_eq!(HandoffTrigger::parse(&reply), None);
    }

    #[test]
    fn offer_terms_follow_the_score(score in 0u32..2_000, name in "[A-Z][a-z]{1,10}") {
        let terms = SanctionTerms::for_score(name.clone(), score);
        prop_assert_eq!(terms.amount, u64::from(score) * 1000);
        prop_assert!((terms.rate - (18.0 - f64::from(score) / 100.0)).abs() < 1e-9);
        prop_assert_eq!(terms.clone(), SanctionTerms::for_score(name, score));
    }

    #[test]
    fn inr_grouping_preserves_digits(amount in any::<u64>()) {
        let formatted = format_inr(amount);
        prop_assert_eq!(formatted.replace(',', ""), amount.to_string());
        if let Some((_, last)) = formatted.rsplit_once(',') {
            prop_assert_eq!(last.len(), 3);
        }
    }
}
