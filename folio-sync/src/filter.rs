//! Repository filtering ahead of detail collection.

use folio_core::SourceRepo;

/// Drop forks, archived repos and the owner's profile repo (`owner/owner`).
///
/// Order is preserved. The name comparison ignores case.
pub fn filter_repos(repos: Vec<SourceRepo>, owner: &str) -> Vec<SourceRepo> {
    let owner = owner.to_lowercase();
    repos
        .into_iter()
        .filter(|repo| !repo.fork && !repo.archived && repo.name.to_lowercase() != owner)
        .collect()
}
