//! Recency ranking and the featured flag.

use folio_core::Project;

/// Rank by most recent push, keep the top `max_total` and flag the first
/// `max_featured` as featured.
///
/// Projects without a push timestamp sort last; ties are broken by slug.
pub fn apply_featured(mut projects: Vec<Project>, max_featured: usize, max_total: usize) -> Vec<Project> {
    projects.sort_by(|a, b| {
        b.pushed_at
            .cmp(&a.pushed_at)
            .then_with(|| a.slug.cmp(&b.slug))
    });
    projects.truncate(max_total);
    for (i, project) in projects.iter_mut().enumerate() {
        project.featured = i < max_featured;
    }
    projects
}
