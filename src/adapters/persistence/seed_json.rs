//! Initial quiz content from a JSON file.
//!
//! Applied at startup only when the questions table is empty, so restarting with the
//! same seed path never duplicates content.

use crate::domain::{DomainError, NewQuestion};
use crate::ports::QuizRepo;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub questions: Vec<NewQuestion>,
}

/// What [`apply_seed`] did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedStats {
    pub categories: usize,
    pub questions: usize,
    pub skipped: bool,
}

/// Read and parse a seed file. Every question is validated up front so a bad file
/// is rejected before anything is written.
pub async fn load_seed(path: impl AsRef<Path>) -> Result<SeedFile, DomainError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| DomainError::Seed(format!("read {}: {}", path.display(), e)))?;
    let seed: SeedFile = serde_json::from_str(&raw)
        .map_err(|e| DomainError::Seed(format!("parse {}: {}", path.display(), e)))?;
    for category in &seed.categories {
        for (i, q) in category.questions.iter().enumerate() {
            q.validate().map_err(|e| {
                DomainError::Seed(format!("{} question #{}: {}", category.slug, i + 1, e))
            })?;
        }
    }
    Ok(seed)
}

/// Insert `seed` into `repo` unless it already has questions.
/// Categories whose slug already exists are reused.
pub async fn apply_seed(repo: &dyn QuizRepo, seed: &SeedFile) -> Result<SeedStats, DomainError> {
    if repo.count_questions().await? > 0 {
        info!("quiz content already present, skipping seed");
        return Ok(SeedStats {
            skipped: true,
            ..SeedStats::default()
        });
    }

    let mut stats = SeedStats::default();
    for sc in &seed.categories {
        let category = match repo.category_by_slug(&sc.slug).await? {
            Some(existing) => existing,
            None => {
                stats.categories += 1;
                repo.insert_category(&sc.name, &sc.slug).await?
            }
        };
        for q in &sc.questions {
            repo.insert_question(category.id, q).await?;
            stats.questions += 1;
        }
    }
    info!(
        categories = stats.categories,
        questions = stats.questions,
        "seeded quiz content"
    );
    Ok(stats)
}
