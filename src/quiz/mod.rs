pub mod analytics;
pub mod catalog;
pub mod generator;
pub mod grammar;

/// One fully rendered yes/no question, ready to be shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedQuiz {
    pub premise: String,
    pub question: String,
    pub correct: bool,
    pub explanation: Option<String>,
    pub key_takeaway: Option<String>,
}

impl GeneratedQuiz {
    pub fn is_correct_answer(&self, answer: bool) -> bool {
        answer == self.correct
    }
}
