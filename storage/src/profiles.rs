use argonath_core::error::{ArgonathError, ErrorCode};
use argonath_core::model::ProfileSummary;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile search unavailable: {0}")]
    Unavailable(String),
}

impl ArgonathError for ProfileError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::Unavailable
    }
}

/// Read access to the external profile database.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Case-insensitive partial name match, at most `limit` results.
    async fn search(&self, query: &str, limit: usize)
        -> Result<Vec<ProfileSummary>, ProfileError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileDirectory {
    profiles: Vec<ProfileSummary>,
}

impl InMemoryProfileDirectory {
    pub fn new(profiles: Vec<ProfileSummary>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl ProfileDirectory for InMemoryProfileDirectory {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ProfileSummary>, ProfileError> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .profiles
            .iter()
            .filter(|profile| profile.name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_is_case_insensitive_and_capped() {
        let directory = InMemoryProfileDirectory::new(
            (0..8)
                .map(|i| ProfileSummary::new(format!("p{i}"), format!("Jane Doe {i}")))
                .collect(),
        );

        let hits = directory.search("jane d", 5).await.unwrap();
        assert_eq!(hits.len(), 5);
        assert_eq!(hits[0].id, "p0");

        let none = directory.search("zz", 5).await.unwrap();
        assert!(none.is_empty());
    }
}
