//! Normalization of raw user input into a `Choice`.
//!
//! Every turn is normalized exactly once, at the engine boundary. Route
//! handlers branch on the resulting `Choice` and never re-parse the raw text
//! for menu numbers, yes/no answers, or keywords.
//!
//! Matching priority: explicit number > yes/no > menu keyword > free text.

use serde::{Deserialize, Serialize};

use super::phase::{Modality, WorkType};

/// Phrases that end the session from any step. Matched against the whole
/// (trimmed, lower-cased) input only.
const EXIT_PHRASES: [&str; 6] = [
    "exit",
    "quit",
    "end session",
    "stop session",
    "end the session",
    "i want to stop",
];

const YES_WORDS: [&str; 11] = [
    "yes", "y", "yeah", "yep", "yup", "sure", "definitely", "absolutely", "correct", "right",
    "ok",
];

const NO_WORDS: [&str; 8] = ["no", "n", "nope", "nah", "nothing", "none", "never", "gone"];

const YES_PHRASES: [&str; 5] = ["i do", "it is", "it does", "still", "that's right"];

const NO_PHRASES: [&str; 7] = [
    "i don't",
    "i dont",
    "not really",
    "not anymore",
    "not at all",
    "it's gone",
    "its gone",
];

/// Keywords recognised in menus, checked in this order so that the most
/// specific phrase wins ("problem shifting" before "problem").
const KEYWORDS: [(&str, MenuKeyword); 10] = [
    ("problem shifting", MenuKeyword::ProblemShifting),
    ("identity", MenuKeyword::IdentityShifting),
    ("belief", MenuKeyword::BeliefShifting),
    ("block", MenuKeyword::BlockageShifting),
    ("reality", MenuKeyword::RealityShifting),
    ("trauma", MenuKeyword::TraumaShifting),
    ("problem", MenuKeyword::Problem),
    ("goal", MenuKeyword::Goal),
    ("negative", MenuKeyword::NegativeExperience),
    ("experience", MenuKeyword::NegativeExperience),
];

/// A menu keyword found in free input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuKeyword {
    Problem,
    Goal,
    NegativeExperience,
    ProblemShifting,
    IdentityShifting,
    BeliefShifting,
    BlockageShifting,
    RealityShifting,
    TraumaShifting,
}

impl MenuKeyword {
    /// The work type this keyword names or implies.
    pub fn work_type(&self) -> WorkType {
        match self {
            MenuKeyword::Goal | MenuKeyword::RealityShifting => WorkType::Goal,
            MenuKeyword::NegativeExperience | MenuKeyword::TraumaShifting => {
                WorkType::NegativeExperience
            }
            _ => WorkType::Problem,
        }
    }

    /// The modality this keyword names, if it names one.
    pub fn modality(&self) -> Option<Modality> {
        match self {
            MenuKeyword::ProblemShifting => Some(Modality::ProblemShifting),
            MenuKeyword::IdentityShifting => Some(Modality::IdentityShifting),
            MenuKeyword::BeliefShifting => Some(Modality::BeliefShifting),
            MenuKeyword::BlockageShifting => Some(Modality::BlockageShifting),
            MenuKeyword::RealityShifting => Some(Modality::RealityShifting),
            MenuKeyword::TraumaShifting => Some(Modality::TraumaShifting),
            MenuKeyword::Problem | MenuKeyword::Goal | MenuKeyword::NegativeExperience => None,
        }
    }

    fn find(input: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(needle, _)| input.contains(needle))
            .map(|(_, keyword)| *keyword)
    }
}

/// Normalized form of one user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Choice {
    /// Nothing but whitespace.
    Empty,
    /// An explicit number, e.g. a menu selection or a 0-10 rating.
    Number(u32),
    Yes,
    No,
    /// The user asked to end the session.
    Exit,
    Keyword(MenuKeyword),
    /// Anything else; handlers that want free text read the raw input.
    FreeText,
}

impl Choice {
    /// Normalizes raw input. Case-insensitive and whitespace-tolerant.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Choice::Empty;
        }

        let lower = clean(trimmed);
        let cleaned = lower.as_str();

        if EXIT_PHRASES.contains(&cleaned) {
            return Choice::Exit;
        }

        if let Ok(n) = cleaned.parse::<u32>() {
            return Choice::Number(n);
        }

        if let Some(answer) = Self::yes_no(cleaned) {
            return answer;
        }

        match MenuKeyword::find(cleaned) {
            Some(keyword) => Choice::Keyword(keyword),
            None => Choice::FreeText,
        }
    }

    fn yes_no(input: &str) -> Option<Self> {
        if YES_PHRASES.contains(&input) {
            return Some(Choice::Yes);
        }
        if NO_PHRASES.iter().any(|p| input.starts_with(p)) {
            return Some(Choice::No);
        }

        let first = input
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .find(|t| !t.is_empty())?;

        if YES_WORDS.contains(&first) {
            Some(Choice::Yes)
        } else if NO_WORDS.contains(&first) {
            Some(Choice::No)
        } else {
            None
        }
    }

    /// The answer when the whole input is nothing but a yes/no word or
    /// phrase. "No" is bare; "No one listens to me" is not.
    pub fn bare_yes_no(raw: &str) -> Option<Self> {
        let cleaned = clean(raw);
        let cleaned = cleaned.as_str();
        if YES_WORDS.contains(&cleaned) || YES_PHRASES.contains(&cleaned) {
            Some(Choice::Yes)
        } else if NO_WORDS.contains(&cleaned) || NO_PHRASES.contains(&cleaned) {
            Some(Choice::No)
        } else {
            None
        }
    }

    /// Returns true for a clear yes or no.
    pub fn is_yes_no(&self) -> bool {
        matches!(self, Choice::Yes | Choice::No)
    }
}

/// Lower-cased, trimmed, trailing punctuation dropped.
fn clean(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .trim_end_matches(['.', '!', '?', ')'])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod numbers {
        use super::*;

        #[test]
        fn plain_number_is_selected() {
            assert_eq!(Choice::normalize("1"), Choice::Number(1));
            assert_eq!(Choice::normalize("  6 "), Choice::Number(6));
        }

        #[test]
        fn trailing_punctuation_is_ignored() {
            assert_eq!(Choice::normalize("2."), Choice::Number(2));
            assert_eq!(Choice::normalize("3)"), Choice::Number(3));
        }

        #[test]
        fn number_wins_over_everything_else() {
            assert_eq!(Choice::normalize("10"), Choice::Number(10));
        }
    }

    mod yes_no {
        use super::*;

        #[test]
        fn yes_variants() {
            for raw in ["yes", "YES", "Yeah", "yep!", "y", "yes I think so", "I do", "Sure."] {
                assert_eq!(Choice::normalize(raw), Choice::Yes, "input: {raw}");
            }
        }

        #[test]
        fn no_variants() {
            for raw in ["no", "No.", "nope", "nah", "not really", "no problem", "it's gone", "nothing"] {
                assert_eq!(Choice::normalize(raw), Choice::No, "input: {raw}");
            }
        }

        #[test]
        fn no_before_keyword() {
            // "no problem" would otherwise match the "problem" keyword
            assert_eq!(Choice::normalize("no problem at all"), Choice::No);
        }

        #[test]
        fn bare_answers_are_whole_input_only() {
            assert_eq!(Choice::bare_yes_no(" No. "), Some(Choice::No));
            assert_eq!(Choice::bare_yes_no("it's gone"), Some(Choice::No));
            assert_eq!(Choice::bare_yes_no("Yep!"), Some(Choice::Yes));
            for raw in ["No one listens to me", "no change, still heavy", "Right now I feel stuck"] {
                assert_eq!(Choice::bare_yes_no(raw), None, "input: {raw}");
            }
        }

        #[test]
        fn yes_inside_a_sentence_is_not_a_yes() {
            assert_eq!(Choice::normalize("I guess yes"), Choice::FreeText);
        }
    }

    mod keywords {
        use super::*;

        #[test]
        fn keywords_are_case_insensitive_substrings() {
            assert_eq!(
                Choice::normalize("Identity Shifting please"),
                Choice::Keyword(MenuKeyword::IdentityShifting)
            );
            assert_eq!(
                Choice::normalize("a GOAL"),
                Choice::Keyword(MenuKeyword::Goal)
            );
        }

        #[test]
        fn specific_phrase_beats_generic_one() {
            assert_eq!(
                Choice::normalize("problem shifting"),
                Choice::Keyword(MenuKeyword::ProblemShifting)
            );
            assert_eq!(
                Choice::normalize("a problem"),
                Choice::Keyword(MenuKeyword::Problem)
            );
        }

        #[test]
        fn keyword_work_types() {
            assert_eq!(MenuKeyword::TraumaShifting.work_type(), WorkType::NegativeExperience);
            assert_eq!(MenuKeyword::RealityShifting.work_type(), WorkType::Goal);
            assert_eq!(MenuKeyword::BeliefShifting.work_type(), WorkType::Problem);
            assert_eq!(MenuKeyword::Goal.modality(), None);
        }
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(Choice::normalize("   "), Choice::Empty);
    }

    #[test]
    fn exit_requires_whole_phrase() {
        assert_eq!(Choice::normalize("Exit"), Choice::Exit);
        assert_eq!(Choice::normalize("end session."), Choice::Exit);
        assert_ne!(Choice::normalize("I want to exit this feeling"), Choice::Exit);
    }

    #[test]
    fn free_text_stays_free_text() {
        assert_eq!(Choice::normalize("I feel anxious"), Choice::FreeText);
        assert_eq!(Choice::normalize("maybe"), Choice::FreeText);
    }
}
