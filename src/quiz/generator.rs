use std::sync::Arc;

use rand::Rng;

use super::catalog::{Catalog, NounEntry, PremiseTemplate, QuestionTemplate, Role};
use super::grammar::{render, Nouns};
use super::GeneratedQuiz;

/// Picks random templates and nouns from a [`Catalog`] and renders them.
///
/// The random source is passed in by the caller, so a seeded generator
/// reproduces the same sequence of quizzes.
#[derive(Debug, Clone)]
pub struct QuizGenerator {
    catalog: Arc<Catalog>,
}

/// The raw picks behind one quiz, before rendering.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub premise: &'a PremiseTemplate,
    pub question: &'a QuestionTemplate,
    pub nouns: Nouns<'a>,
}

impl Selection<'_> {
    pub fn render(&self) -> GeneratedQuiz {
        GeneratedQuiz {
            premise: render(&self.premise.premise, self.nouns),
            question: render(&self.question.text, self.nouns),
            correct: self.question.correct,
            explanation: self
                .question
                .explanation
                .as_deref()
                .map(|explanation| render(explanation, self.nouns)),
            key_takeaway: self.question.key_takeaway.clone(),
        }
    }
}

impl QuizGenerator {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn select<R: Rng>(&self, rng: &mut R) -> Selection<'_> {
        let premise = pick(self.catalog.premises(), rng);
        let question = pick(&premise.questions, rng);
        let [a, b, c] = Role::ALL.map(|role| pick_noun(&self.catalog, role, rng));
        Selection {
            premise,
            question,
            nouns: Nouns::new(a, b, c),
        }
    }

    pub fn generate<R: Rng>(&self, rng: &mut R) -> GeneratedQuiz {
        self.select(rng).render()
    }
}

fn pick_noun<'a, R: Rng>(catalog: &'a Catalog, role: Role, rng: &mut R) -> &'a NounEntry {
    pick(catalog.bank(role).entries(), rng)
}

// Catalog validation guarantees every slice handed in here is non-empty.
fn pick<'a, T, R: Rng>(items: &'a [T], rng: &mut R) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::catalog::{WordBank, WordBanks};
    use crate::quiz::grammar::article_for;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use regex::Regex;

    fn bundled() -> QuizGenerator {
        QuizGenerator::new(Arc::new(Catalog::bundled().unwrap()))
    }

    #[test]
    fn thousand_quizzes_are_well_formed() {
        let generator = bundled();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let mut replay = rng.clone();
            let selection = generator.select(&mut replay);
            let quiz = generator.generate(&mut rng);

            assert!(!quiz.premise.is_empty());
            assert!(!quiz.question.is_empty());
            assert_eq!(quiz.correct, selection.question.correct);
            assert_eq!(quiz.key_takeaway, selection.question.key_takeaway);
            assert_eq!(quiz.explanation.is_some(), selection.question.explanation.is_some());
            assert!(quiz.premise.chars().next().unwrap().is_uppercase());
            assert!(quiz.question.chars().next().unwrap().is_uppercase());
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_quizzes() {
        let generator = bundled();
        let mut first = StdRng::seed_from_u64(7);
        let mut second = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(generator.generate(&mut first), generator.generate(&mut second));
        }
    }

    #[test]
    fn one_noun_triple_is_shared_by_all_renderings() {
        let nouns = |word: &str| WordBank::new(vec![NounEntry::new(word, format!("{word}s"))]);
        let catalog = Catalog::new(
            WordBanks {
                a: nouns("tree"),
                b: nouns("chair"),
                c: nouns("river"),
            },
            vec![PremiseTemplate {
                premise: "All A are B, and all B are C.".to_string(),
                questions: vec![QuestionTemplate {
                    text: "Does it follow that all A are C?".to_string(),
                    correct: true,
                    explanation: Some("Every A is a B, and every B is a C.".to_string()),
                    key_takeaway: Some("Chains of 'all' pass straight through.".to_string()),
                }],
            }],
        )
        .unwrap();
        let generator = QuizGenerator::new(Arc::new(catalog));
        let quiz = generator.generate(&mut StdRng::seed_from_u64(1));

        assert_eq!(
            quiz,
            GeneratedQuiz {
                premise: "All trees are chairs, and all chairs are rivers.".to_string(),
                question: "Does it follow that all trees are rivers?".to_string(),
                correct: true,
                explanation: Some("Every tree is a chair, and every chair is a river.".to_string()),
                key_takeaway: Some("Chains of 'all' pass straight through.".to_string()),
            }
        );
    }

    #[test]
    fn every_bundled_template_renders_cleanly() {
        let catalog = Catalog::bundled().unwrap();
        let placeholder = Regex::new(r"\b[ABC]\b").unwrap();
        let articled = Regex::new(r"(?i)\b(an|a) ([a-z]+)").unwrap();

        let templates: Vec<&str> = catalog
            .premises()
            .iter()
            .flat_map(|p| {
                std::iter::once(p.premise.as_str()).chain(p.questions.iter().flat_map(|q| {
                    std::iter::once(q.text.as_str()).chain(q.explanation.as_deref())
                }))
            })
            .collect();

        for a in catalog.bank(Role::A).entries() {
            for b in catalog.bank(Role::B).entries() {
                for c in catalog.bank(Role::C).entries() {
                    for template in &templates {
                        let rendered = render(template, Nouns::new(a, b, c));
                        // A leading "A" is a capitalised article, not a placeholder.
                        let tail = rendered.get(1..).unwrap_or_default();
                        assert!(
                            !placeholder.is_match(tail),
                            "unresolved placeholder in {rendered:?} from {template:?}"
                        );
                        for caps in articled.captures_iter(&rendered) {
                            assert_eq!(
                                caps[1].to_lowercase(),
                                article_for(&caps[2]),
                                "wrong article in {rendered:?}"
                            );
                        }
                    }
                }
            }
        }
    }
}
