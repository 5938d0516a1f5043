use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const BUNDLED_CATALOG: &str = include_str!("../../data/syllogisms.json");

/// A candidate filler for one placeholder role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NounEntry {
    pub singular: String,
    pub plural: String,
}

impl NounEntry {
    #[cfg(test)]
    pub fn new(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        Self {
            singular: singular.into(),
            plural: plural.into(),
        }
    }
}

/// The three abstract placeholder slots of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    A,
    B,
    C,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::A, Role::B, Role::C];

    /// The literal token a template uses for this role.
    pub fn token(self) -> &'static str {
        match self {
            Role::A => "A",
            Role::B => "B",
            Role::C => "C",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct WordBank(Vec<NounEntry>);

impl WordBank {
    #[cfg(test)]
    pub fn new(entries: Vec<NounEntry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[NounEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WordBanks {
    pub a: WordBank,
    pub b: WordBank,
    pub c: WordBank,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionTemplate {
    pub text: String,
    pub correct: bool,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub key_takeaway: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PremiseTemplate {
    pub premise: String,
    pub questions: Vec<QuestionTemplate>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

/// The read-only quiz content: three word banks and the premise dataset.
///
/// Every constructor validates the content once, so a `Catalog` value always
/// has non-empty banks, a non-empty dataset and at least one question per
/// premise. Accessors do no further checking.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    word_banks: WordBanks,
    premises: Vec<PremiseTemplate>,
}

impl Catalog {
    pub fn new(word_banks: WordBanks, premises: Vec<PremiseTemplate>) -> Result<Self, CatalogError> {
        let catalog = Self {
            word_banks,
            premises,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog compiled into the binary from `data/syllogisms.json`.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let Catalog {
            word_banks,
            premises,
        } = serde_json::from_str(json)?;
        Self::new(word_banks, premises)
    }

    pub fn premises(&self) -> &[PremiseTemplate] {
        &self.premises
    }

    pub fn bank(&self, role: Role) -> &WordBank {
        match role {
            Role::A => &self.word_banks.a,
            Role::B => &self.word_banks.b,
            Role::C => &self.word_banks.c,
        }
    }

    pub fn question_count(&self) -> usize {
        self.premises.iter().map(|p| p.questions.len()).sum()
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.premises.is_empty() {
            return Err(CatalogError::Invalid("the premise dataset is empty".to_string()));
        }
        for role in Role::ALL {
            let bank = self.bank(role);
            if bank.is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "word bank {} is empty",
                    role.token()
                )));
            }
            if let Some(entry) = bank
                .entries()
                .iter()
                .find(|e| e.singular.trim().is_empty() || e.plural.trim().is_empty())
            {
                return Err(CatalogError::Invalid(format!(
                    "word bank {} has a blank noun form: {:?}",
                    role.token(),
                    entry
                )));
            }
        }
        if let Some(premise) = self.premises.iter().find(|p| p.questions.is_empty()) {
            return Err(CatalogError::Invalid(format!(
                "premise '{}' has no questions",
                premise.premise
            )));
        }
        Ok(())
    }
}
