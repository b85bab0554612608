//! Scripted input validation.
//!
//! Steps without a dedicated validator are checked against the shape of the
//! answer they expect. Inputs the rules cannot classify are `Uncertain` and
//! may be handed to the AI validation fallback.

use super::choice::Choice;
use super::step::{ExpectedAnswer, ValidationOutcome};

const EMPTY_ANSWER: &str = "Take your time, and tell me in your own words.";
const YES_NO_ONLY: &str = "Please answer yes or no.";
const DESCRIBE_IN_WORDS: &str = "Please describe it in a few words.";

/// Validates a normalized answer against the expected shape.
pub fn validate_shape(expected: ExpectedAnswer, choice: &Choice) -> ValidationOutcome {
    if matches!(choice, Choice::Exit) {
        return ValidationOutcome::Accepted;
    }

    match expected {
        ExpectedAnswer::Nothing => ValidationOutcome::Accepted,
        ExpectedAnswer::FreeText => match choice {
            Choice::Empty => rejected(EMPTY_ANSWER),
            _ => ValidationOutcome::Accepted,
        },
        ExpectedAnswer::NumericChoice { min, max } => match choice {
            Choice::Number(n) if (min..=max).contains(n) => ValidationOutcome::Accepted,
            Choice::Keyword(_) => ValidationOutcome::Accepted,
            Choice::FreeText => ValidationOutcome::Uncertain,
            _ => rejected(format!("Please choose a number from {min} to {max}.")),
        },
        ExpectedAnswer::YesNo => match choice {
            Choice::Yes | Choice::No => ValidationOutcome::Accepted,
            Choice::FreeText | Choice::Keyword(_) => ValidationOutcome::Uncertain,
            _ => rejected(YES_NO_ONLY),
        },
        ExpectedAnswer::Scale { min, max } => match choice {
            Choice::Number(n) if (min..=max).contains(n) => ValidationOutcome::Accepted,
            Choice::FreeText => ValidationOutcome::Uncertain,
            _ => rejected(format!("Please give a number from {min} to {max}.")),
        },
    }
}

/// Validator for steps that capture a problem, goal, or experience.
///
/// A bare number or yes/no is almost always an answer to an earlier
/// question, so it is not taken as a description without a second opinion.
/// Sentences that merely open with "no" or "never" are descriptions.
pub fn problem_description(raw: &str, choice: &Choice) -> ValidationOutcome {
    match choice {
        Choice::Empty => rejected(DESCRIBE_IN_WORDS),
        Choice::Number(_) => ValidationOutcome::Uncertain,
        Choice::Yes | Choice::No if Choice::bare_yes_no(raw).is_some() => {
            ValidationOutcome::Uncertain
        }
        _ => ValidationOutcome::Accepted,
    }
}

fn rejected(clarification: impl Into<String>) -> ValidationOutcome {
    ValidationOutcome::Rejected {
        clarification: clarification.into(),
    }
}
