//! Renders syllogism templates into English sentences.
//!
//! A template names its terms with the placeholder tokens `A`, `B` and `C`.
//! Rendering picks one grammatical form per token (plural, singular, or an
//! articled singular inside a conjunction), then runs a fixed pipeline of
//! article cleanups over the result. Rendering is a pure function of the
//! template and the three nouns.

use std::sync::LazyLock;

use regex::{Captures, NoExpand, Regex};

use super::catalog::{NounEntry, Role};

// Words starting with a vowel letter that is pronounced as a consonant.
const CONSONANT_SOUND_PREFIXES: [&str; 2] = ["u", "eu"];
const SILENT_H_PREFIXES: [&str; 5] = ["hour", "honor", "heir", "honest", "herb"];

/// The nouns chosen for the three roles of one generated quiz.
#[derive(Debug, Clone, Copy)]
pub struct Nouns<'a> {
    pub a: &'a NounEntry,
    pub b: &'a NounEntry,
    pub c: &'a NounEntry,
}

impl<'a> Nouns<'a> {
    pub fn new(a: &'a NounEntry, b: &'a NounEntry, c: &'a NounEntry) -> Self {
        Self { a, b, c }
    }

    pub fn get(&self, role: Role) -> &'a NounEntry {
        match role {
            Role::A => self.a,
            Role::B => self.b,
            Role::C => self.c,
        }
    }
}

/// Returns the indefinite article (`a` or `an`) for `word`.
pub fn article_for(word: &str) -> &'static str {
    let word = word.to_lowercase();
    if CONSONANT_SOUND_PREFIXES.iter().any(|p| word.starts_with(p)) {
        return "a";
    }
    if SILENT_H_PREFIXES.iter().any(|p| word.starts_with(p)) {
        return "an";
    }
    match word.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

pub fn with_article(word: &str) -> String {
    format!("{} {}", article_for(word), word)
}

struct RolePattern {
    role: Role,
    /// `a X` or `an X`, article case-insensitive.
    articled: Regex,
    /// The bare token, case-sensitive, as a whole word.
    bare: Regex,
}

static ROLE_PATTERNS: LazyLock<Vec<RolePattern>> = LazyLock::new(|| {
    Role::ALL
        .iter()
        .map(|&role| RolePattern {
            role,
            articled: Regex::new(&format!(r"\b(?i:an|a) {}\b", role.token()))
                .expect("Invalid articled role regex"),
            bare: Regex::new(&format!(r"\b{}\b", role.token())).expect("Invalid bare role regex"),
        })
        .collect()
});

static ARTICLE_SLOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?i:a/an)\b").expect("Invalid article slot regex"));

static CONJUNCTION_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bmust be either\b|\bcannot be both\b|\bcannot be neither\b")
        .expect("Invalid conjunction context regex")
});

static PLURAL_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?i:no|all|some) [ABC] (?i:are)\b").expect("Invalid plural context regex")
});

static SINGULAR_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?i:if something is (?:an|a)) [ABC]\b|\b(?i:at least one) [ABC] (?i:is)\b")
        .expect("Invalid singular context regex")
});

// Covers the `either B or C`, `neither B nor C` and `both B and C` idioms and
// the bare `B and|or|nor C` fragment. An authored article before either token
// is consumed with it.
static CONJUNCTION_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:(?i:(either|neither|both)) )?(?:(?i:an|a) )?B (?i:(and|or|nor)) (?:(?i:an|a) )?C\b",
    )
    .expect("Invalid conjunction phrase regex")
});

static DOUBLED_ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(an|a) (?:an|a) ").expect("Invalid doubled article regex"));

static ARTICLE_BEFORE_PLURAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:an|a) ([a-z]+s)\b").expect("Invalid article before plural regex")
});

static ARTICLED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:an|a) ([a-z]+)").expect("Invalid articled word regex"));

/// The grammatical context a template is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarMode {
    /// "A must be either B or C", "cannot be both", "cannot be neither".
    Conjunction,
    /// "All A are ...", "No A are ...", "Some A are ...".
    Plural,
    /// "If something is a A", "At least one A is ...".
    Singular,
    Default,
}

struct GrammarRule {
    mode: GrammarMode,
    applies: fn(&str) -> bool,
    substitute: fn(&str, Nouns<'_>) -> String,
}

/// Checked in order; the first rule that applies renders the whole template.
/// Each rule receives the template with article slots normalized.
static GRAMMAR_RULES: [GrammarRule; 4] = [
    GrammarRule {
        mode: GrammarMode::Conjunction,
        applies: |text| CONJUNCTION_CONTEXT.is_match(text),
        substitute: substitute_conjunction,
    },
    GrammarRule {
        mode: GrammarMode::Plural,
        applies: |text| PLURAL_CONTEXT.is_match(text),
        substitute: |text, nouns| substitute_bare(&substitute_articled(text, nouns), nouns, plural),
    },
    GrammarRule {
        mode: GrammarMode::Singular,
        applies: |text| SINGULAR_CONTEXT.is_match(text),
        substitute: |text, nouns| substitute_bare(&substitute_articled(text, nouns), nouns, singular),
    },
    GrammarRule {
        mode: GrammarMode::Default,
        applies: |_| true,
        substitute: |text, nouns| substitute_bare(&substitute_articled(text, nouns), nouns, singular),
    },
];

/// A rewrite applied to the fully substituted text.
pub struct RewriteStage {
    pub name: &'static str,
    pub rewrite: fn(&str) -> String,
}

/// Run in order after substitution.
pub static CLEANUP_STAGES: [RewriteStage; 2] = [
    // Guard: an article directly followed by a word ending in `s`.
    RewriteStage {
        name: "strip article before plural",
        rewrite: strip_article_before_plural,
    },
    // Guard: any `a|an word` pair; the article is recomputed from the word.
    RewriteStage {
        name: "rederive articles",
        rewrite: rederive_articles,
    },
];

/// Substitutes the nouns into `template` and returns the display sentence.
pub fn render(template: &str, nouns: Nouns<'_>) -> String {
    let template = normalize_article_slots(template);
    let rule = select_rule(&template);
    log::trace!("rendering {:?} in {:?} mode", template, rule.mode);

    let substituted = (rule.substitute)(&template, nouns);
    let cleaned = CLEANUP_STAGES
        .iter()
        .fold(substituted, |text, stage| {
            let rewritten = (stage.rewrite)(&text);
            if rewritten != text {
                log::trace!("{}: {:?} -> {:?}", stage.name, text, rewritten);
            }
            rewritten
        });

    capitalize_first(cleaned.trim())
}

fn select_rule(template: &str) -> &'static GrammarRule {
    GRAMMAR_RULES
        .iter()
        .find(|rule| (rule.applies)(template))
        .unwrap_or(&GRAMMAR_RULES[GRAMMAR_RULES.len() - 1])
}

fn normalize_article_slots(template: &str) -> String {
    ARTICLE_SLOT.replace_all(template, "a").into_owned()
}

fn substitute_articled(text: &str, nouns: Nouns<'_>) -> String {
    ROLE_PATTERNS.iter().fold(text.to_string(), |text, pattern| {
        let replacement = with_article(&nouns.get(pattern.role).singular);
        pattern
            .articled
            .replace_all(&text, NoExpand(&replacement))
            .into_owned()
    })
}

fn substitute_bare(text: &str, nouns: Nouns<'_>, form: fn(&NounEntry) -> &str) -> String {
    ROLE_PATTERNS.iter().fold(text.to_string(), |text, pattern| {
        let replacement = form(nouns.get(pattern.role));
        pattern
            .bare
            .replace_all(&text, NoExpand(replacement))
            .into_owned()
    })
}

fn plural(noun: &NounEntry) -> &str {
    &noun.plural
}

fn singular(noun: &NounEntry) -> &str {
    &noun.singular
}

fn substitute_conjunction(text: &str, nouns: Nouns<'_>) -> String {
    let text = CONJUNCTION_PHRASE.replace_all(text, |caps: &Captures| {
        let lead = caps
            .get(1)
            .map(|m| format!("{} ", m.as_str()))
            .unwrap_or_default();
        format!(
            "{}{} {} {}",
            lead,
            with_article(&nouns.b.singular),
            &caps[2],
            with_article(&nouns.c.singular)
        )
    });

    let text = substitute_articled(&text, nouns);
    let subject = &ROLE_PATTERNS[0];
    let text = subject
        .bare
        .replace_all(&text, NoExpand(&nouns.a.plural))
        .into_owned();
    let text = collapse_doubled_articles(&text);

    // Anything the conjunction idioms did not consume falls back to singular.
    substitute_bare(&text, nouns, singular)
}

/// "a an chair" -> "a chair": keeps the first of two consecutive articles.
pub fn collapse_doubled_articles(text: &str) -> String {
    DOUBLED_ARTICLE.replace_all(text, "$1 ").into_owned()
}

/// "a chairs" -> "chairs".
pub fn strip_article_before_plural(text: &str) -> String {
    ARTICLE_BEFORE_PLURAL.replace_all(text, "$1").into_owned()
}

/// "an utensil" -> "a utensil", "a apple" -> "an apple".
pub fn rederive_articles(text: &str) -> String {
    ARTICLED_WORD
        .replace_all(text, |caps: &Captures| with_article(&caps[1]))
        .into_owned()
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
