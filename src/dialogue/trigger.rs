//! Hand-off markers emitted by the language model
//!
//! A reply that is nothing but a recognized marker switches the turn from
//! free dialogue to a deterministic workflow. Each kind has its own literal
//! prefix; anything that does not match one exactly is ordinary text.

/// Literal prefix of the verification hand-off
pub const RUN_VERIFICATION_MARKER: &str = "[AGENT_TASK: RUN_KYC:";

const MARKER_SUFFIX: char = ']';

/// Recognized hand-off instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffTrigger {
    /// Look up the requester by an externally issued identifier (tax ID)
    RunVerification { subject_id: String },
}

/// Closed set of markers, tried in order
const MARKERS: &[(&str, fn(&str) -> HandoffTrigger)] =
    &[(RUN_VERIFICATION_MARKER, run_verification)];

fn run_verification(param: &str) -> HandoffTrigger {
    HandoffTrigger::RunVerification {
        subject_id: param.to_string(),
    }
}

impl HandoffTrigger {
    /// Recognize a hand-off in a raw model reply.
    ///
    /// The trimmed reply must start with a known marker and end with `]`;
    /// the parameter is what lies strictly between them, trimmed.
    pub fn parse(reply: &str) -> Option<Self> {
        let trimmed = reply.trim();
        MARKERS.iter().find_map(|(marker, build)| {
            let param = trimmed
                .strip_prefix(marker)?
                .strip_suffix(MARKER_SUFFIX)?
                .trim();
            Some(build(param))
        })
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            HandoffTrigger::RunVerification { .. } => "run_verification",
        }
    }
}
