//! The three yes/no risk-factor questions and their answers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A required risk-factor question group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Question {
    Diabetes,
    Smoking,
    TreatingHtn,
}

impl Question {
    /// All questions, in the order they appear on the form.
    pub const ALL: [Question; 3] = [Question::Diabetes, Question::Smoking, Question::TreatingHtn];

    /// Selection group name used by the rendered form.
    pub fn field_name(self) -> &'static str {
        match self {
            Question::Diabetes => "diabetes",
            Question::Smoking => "smoking",
            Question::TreatingHtn => "treatingHTN",
        }
    }

    /// Identifier of the inline error marker for this question.
    pub fn error_marker_id(self) -> String {
        format!("{}Error", self.field_name())
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Question::Diabetes => "Does the patient have diabetes?",
            Question::Smoking => "Is the patient a current smoker?",
            Question::TreatingHtn => "Is the patient being treated for hypertension?",
        }
    }

    fn index(self) -> usize {
        match self {
            Question::Diabetes => 0,
            Question::Smoking => 1,
            Question::TreatingHtn => 2,
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn is_yes(self) -> bool {
        matches!(self, Answer::Yes)
    }
}

impl FromStr for Answer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Answer::Yes),
            "no" => Ok(Answer::No),
            other => Err(format!("unknown answer '{other}', expected 'yes' or 'no'")),
        }
    }
}

/// Current state of each selection group. `None` means unanswered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selections {
    #[serde(default)]
    pub diabetes: Option<Answer>,
    #[serde(default)]
    pub smoking: Option<Answer>,
    #[serde(default, rename = "treatingHTN")]
    pub treating_htn: Option<Answer>,
}

impl Selections {
    pub fn get(&self, question: Question) -> Option<Answer> {
        self.as_array()[question.index()]
    }

    pub fn set(&mut self, question: Question, answer: Option<Answer>) {
        match question {
            Question::Diabetes => self.diabetes = answer,
            Question::Smoking => self.smoking = answer,
            Question::TreatingHtn => self.treating_htn = answer,
        }
    }

    /// Builder-style variant of [`Selections::set`].
    pub fn with(mut self, question: Question, answer: Answer) -> Self {
        self.set(question, Some(answer));
        self
    }

    /// Questions with no selection, in form order.
    pub fn unanswered(&self) -> Vec<Question> {
        Question::ALL
            .into_iter()
            .filter(|q| self.get(*q).is_none())
            .collect()
    }

    /// The complete answer set, or `None` while any group is unanswered.
    pub fn answers(&self) -> Option<RiskAnswers> {
        Some(RiskAnswers {
            has_diabetes: self.diabetes?.is_yes(),
            is_smoking: self.smoking?.is_yes(),
            is_treating_hypertension: self.treating_htn?.is_yes(),
        })
    }

    fn as_array(&self) -> [Option<Answer>; 3] {
        [self.diabetes, self.smoking, self.treating_htn]
    }
}

/// Fully answered risk-factor set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAnswers {
    pub has_diabetes: bool,
    pub is_smoking: bool,
    pub is_treating_hypertension: bool,
}
