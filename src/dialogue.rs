//! Dialogue turn processing
//!
//! Takes a chat transcript, asks the language model for the next reply and
//! decides from that reply whether to leave advisory chat and run a
//! deterministic workflow (verification lookup, offer, sanction letter).
//! Side effects are described in the returned [`TurnOutcome`], never
//! performed here.

mod error;
mod offer;
mod processor;
mod prompt;
mod transcript;
mod trigger;

#[cfg(test)]
pub mod testing;

#[cfg(test)]
mod proptests;

pub use offer::SanctionTerms;
pub use processor::{TurnOutcome, TurnPolicy, TurnProcessor};
pub use transcript::{Speaker, Transcript, Turn};
