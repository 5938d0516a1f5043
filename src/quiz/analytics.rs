use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

/// Coarse grouping of premises by their leading quantifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PremiseCategory {
    All,
    No,
    Some,
    EitherOr,
    Other,
}

static CATEGORY_PATTERNS: LazyLock<Vec<(PremiseCategory, Regex)>> = LazyLock::new(|| {
    [
        (PremiseCategory::All, r"(?i)^all "),
        (PremiseCategory::No, r"(?i)^no "),
        (PremiseCategory::Some, r"(?i)^some "),
        (PremiseCategory::EitherOr, r"(?i)either.*or"),
    ]
    .into_iter()
    .map(|(category, pattern)| (category, Regex::new(pattern).expect("Invalid category regex")))
    .collect()
});

impl PremiseCategory {
    /// Classifies a rendered premise.
    pub fn classify(premise: &str) -> Self {
        CATEGORY_PATTERNS
            .iter()
            .find(|(_, pattern)| pattern.is_match(premise))
            .map(|(category, _)| *category)
            .unwrap_or(PremiseCategory::Other)
    }

    pub fn label(self) -> &'static str {
        match self {
            PremiseCategory::All => "All",
            PremiseCategory::No => "No",
            PremiseCategory::Some => "Some",
            PremiseCategory::EitherOr => "Either/Or",
            PremiseCategory::Other => "Other",
        }
    }
}

impl fmt::Display for PremiseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerRecord {
    pub elapsed: Duration,
    pub category: PremiseCategory,
    pub was_correct: bool,
}

/// Everything recorded during one quiz session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    answers: Vec<AnswerRecord>,
}

impl SessionStats {
    pub fn record(&mut self, category: PremiseCategory, elapsed: Duration, was_correct: bool) {
        self.answers.push(AnswerRecord {
            elapsed,
            category,
            was_correct,
        });
    }

    pub fn points(&self) -> usize {
        self.answers.iter().filter(|a| a.was_correct).count()
    }

    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    pub fn report(&self) -> SessionReport {
        let total: Duration = self.answers.iter().map(|a| a.elapsed).sum();
        let average = if self.answers.is_empty() {
            Duration::ZERO
        } else {
            total.div_f64(self.answers.len() as f64)
        };
        SessionReport {
            points: self.points(),
            answered: self.answered(),
            total,
            average,
            timings: self.answers.iter().map(|a| (a.elapsed, a.category)).collect(),
            weakest: self.weakest_category(),
        }
    }

    /// The category with the highest average response time. Ties keep the
    /// category that was seen first; nothing is returned if no time was spent.
    fn weakest_category(&self) -> Option<(PremiseCategory, Duration)> {
        let mut groups: Vec<(PremiseCategory, Vec<Duration>)> = Vec::new();
        for answer in &self.answers {
            match groups.iter_mut().find(|(category, _)| *category == answer.category) {
                Some((_, times)) => times.push(answer.elapsed),
                None => groups.push((answer.category, vec![answer.elapsed])),
            }
        }

        let mut weakest = None;
        let mut max_average = Duration::ZERO;
        for (category, times) in groups {
            let average = times.iter().sum::<Duration>().div_f64(times.len() as f64);
            if average > max_average {
                max_average = average;
                weakest = Some((category, average));
            }
        }
        weakest
    }
}

/// End-of-session summary shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub points: usize,
    pub answered: usize,
    pub total: Duration,
    pub average: Duration,
    pub timings: Vec<(Duration, PremiseCategory)>,
    pub weakest: Option<(PremiseCategory, Duration)>,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Session Analytics")?;
        writeln!(f, "Points: {} of {}", self.points, self.answered)?;
        writeln!(f, "Total time: {:.1}s", self.total.as_secs_f64())?;
        writeln!(
            f,
            "Average time per question: {:.1}s",
            self.average.as_secs_f64()
        )?;
        writeln!(f, "Time per question:")?;
        for (i, (elapsed, category)) in self.timings.iter().enumerate() {
            writeln!(f, "{}. {:.1}s ({})", i + 1, elapsed.as_secs_f64(), category)?;
        }
        match self.weakest {
            Some((category, average)) => write!(
                f,
                "Weakest premise type: {} ({:.1}s avg)",
                category,
                average.as_secs_f64()
            ),
            None => write!(f, "Weakest premise type: -"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn classifies_leading_quantifier() {
        assert_eq!(PremiseCategory::classify("All trees are chairs."), PremiseCategory::All);
        assert_eq!(PremiseCategory::classify("No trees are chairs."), PremiseCategory::No);
        assert_eq!(PremiseCategory::classify("some trees are chairs."), PremiseCategory::Some);
        assert_eq!(
            PremiseCategory::classify("Trees must be either a chair or a river."),
            PremiseCategory::EitherOr
        );
        assert_eq!(
            PremiseCategory::classify("Trees cannot be both a chair and a river."),
            PremiseCategory::Other
        );
        assert_eq!(PremiseCategory::classify("Nothing is a tree."), PremiseCategory::Other);
    }

    #[test]
    fn quantifier_beats_either_or() {
        assert_eq!(
            PremiseCategory::classify("All trees must be either a chair or a river."),
            PremiseCategory::All
        );
    }

    #[test]
    fn empty_session_report() {
        let report = SessionStats::default().report();
        assert_eq!(report.total, Duration::ZERO);
        assert_eq!(report.average, Duration::ZERO);
        assert_eq!(report.weakest, None);
        assert!(report.to_string().ends_with("Weakest premise type: -"));
    }

    #[test]
    fn totals_and_averages() {
        let mut stats = SessionStats::default();
        stats.record(PremiseCategory::All, secs(2.0), true);
        stats.record(PremiseCategory::No, secs(4.0), false);
        stats.record(PremiseCategory::All, secs(3.0), true);

        let report = stats.report();
        assert_eq!(report.points, 2);
        assert_eq!(report.answered, 3);
        assert_eq!(report.total, secs(9.0));
        assert_eq!(report.average, secs(3.0));
        assert_eq!(report.weakest, Some((PremiseCategory::No, secs(4.0))));
    }

    #[test]
    fn weakest_tie_keeps_first_seen_category() {
        let mut stats = SessionStats::default();
        stats.record(PremiseCategory::Some, secs(5.0), true);
        stats.record(PremiseCategory::EitherOr, secs(5.0), true);
        assert_eq!(stats.report().weakest, Some((PremiseCategory::Some, secs(5.0))));
    }

    #[test]
    fn zero_times_have_no_weakest_category() {
        let mut stats = SessionStats::default();
        stats.record(PremiseCategory::All, Duration::ZERO, true);
        assert_eq!(stats.report().weakest, None);
    }

    #[test]
    fn report_text() {
        let mut stats = SessionStats::default();
        stats.record(PremiseCategory::All, secs(1.5), true);
        stats.record(PremiseCategory::EitherOr, secs(2.5), false);

        assert_eq!(
            stats.report().to_string(),
            "Session Analytics\n\
             Points: 1 of 2\n\
             Total time: 4.0s\n\
             Average time per question: 2.0s\n\
             Time per question:\n\
             1. 1.5s (All)\n\
             2. 2.5s (Either/Or)\n\
             Weakest premise type: Either/Or (2.5s avg)"
        );
    }
}
