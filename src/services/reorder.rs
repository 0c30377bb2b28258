use futures::future::join_all;
use thiserror::Error;

use crate::{
    client::PortfolioBackend,
    models::project::{Project, ProjectForm, ProjectId},
    services::listing::category_projects,
};

/// Tracks an in-progress drag of one project row over another
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReorderController {
    dragged: Option<ProjectId>,
    dragged_over: Option<ProjectId>,
}

impl ReorderController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_start(&mut self, project: &Project) {
        self.dragged = Some(project.id.clone());
        self.dragged_over = None;
    }

    /// Called repeatedly while hovering; the last target wins
    pub fn drag_over(&mut self, project: &Project) {
        self.dragged_over = Some(project.id.clone());
    }

    #[cfg(test)]
    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    /// Finish the drag against `projects`. Returns the dragged record's
    /// category renumbered `0..N-1`, or `None` when the drop is a no-op.
    /// The drag state is cleared either way.
    pub fn drop(&mut self, projects: &[Project]) -> Option<Vec<Project>> {
        let dragged = self.dragged.take();
        let dragged_over = self.dragged_over.take();

        match (dragged, dragged_over) {
            (Some(source), Some(target)) if source != target => {
                move_within_category(projects, &source, &target)
            }
            _ => None,
        }
    }
}

/// Splice `source` out of its category's display order and reinsert it at
/// `target`'s index, then renumber every member of that category.
///
/// Returns `None` if either record is missing or they belong to different
/// categories.
pub fn move_within_category(
    projects: &[Project],
    source: &ProjectId,
    target: &ProjectId,
) -> Option<Vec<Project>> {
    let project_type = projects.iter().find(|p| &p.id == source)?.project_type;
    let mut siblings = category_projects(projects, project_type);

    let from = siblings.iter().position(|p| &p.id == source)?;
    let to = siblings.iter().position(|p| &p.id == target)?;

    let moved = siblings.remove(from);
    siblings.insert(to, moved);

    for (index, project) in siblings.iter_mut().enumerate() {
        project.order = index as i64;
    }

    Some(siblings)
}

/// The project list for the current session: the last list the server
/// confirmed, plus an optional optimistic projection waiting on persistence.
#[derive(Debug, Clone, Default)]
pub struct ProjectBoard {
    confirmed: Vec<Project>,
    pending: Option<Pending>,
}

#[derive(Debug, Clone)]
struct Pending {
    projects: Vec<Project>,
    changed: Vec<Project>,
}

impl ProjectBoard {
    pub fn new(projects: Vec<Project>) -> Self {
        Self {
            confirmed: projects,
            pending: None,
        }
    }

    /// What the operator sees: the pending projection when there is one
    pub fn visible(&self) -> &[Project] {
        match &self.pending {
            Some(pending) => &pending.projects,
            None => &self.confirmed,
        }
    }

    #[cfg(test)]
    pub fn confirmed(&self) -> &[Project] {
        &self.confirmed
    }

    #[cfg(test)]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Overlay `changed` records on the confirmed list without touching the server
    pub fn apply_pending(&mut self, changed: Vec<Project>) {
        let projects = self
            .confirmed
            .iter()
            .map(|p| {
                changed
                    .iter()
                    .find(|c| c.id == p.id)
                    .cloned()
                    .unwrap_or_else(|| p.clone())
            })
            .collect();
        self.pending = Some(Pending { projects, changed });
    }

    pub fn commit(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.confirmed = pending.projects;
        }
    }

    pub fn discard(&mut self) {
        self.pending = None;
    }

    /// Replace everything with a freshly fetched list
    pub fn replace(&mut self, projects: Vec<Project>) {
        self.confirmed = projects;
        self.pending = None;
    }

    /// Swap in the server's copy of one record
    pub fn put(&mut self, project: Project) {
        if let Some(pending) = self.pending.as_mut()
            && let Some(slot) = pending.projects.iter_mut().find(|p| p.id == project.id)
        {
            *slot = project.clone();
        }
        if let Some(slot) = self.confirmed.iter_mut().find(|p| p.id == project.id) {
            *slot = project;
        }
    }

    pub fn remove(&mut self, id: &ProjectId) {
        self.confirmed.retain(|p| &p.id != id);
        if let Some(pending) = self.pending.as_mut() {
            pending.projects.retain(|p| &p.id != id);
        }
    }

    #[cfg(test)]
    pub fn find(&self, id: &ProjectId) -> Option<&Project> {
        self.visible().iter().find(|p| &p.id == id)
    }

    fn pending_changes(&self) -> Option<&[Project]> {
        self.pending.as_ref().map(|p| p.changed.as_slice())
    }
}

#[derive(Debug, Error)]
pub enum ReorderError {
    #[error("There is no pending reorder to save")]
    NothingPending,

    #[error("Failed to update order ({failed} of {total} updates failed)")]
    PersistFailed {
        failed: usize,
        total: usize,
        /// Whether the authoritative list could be fetched again
        refreshed: bool,
    },
}

/// Persist the board's pending projection with one update per renumbered
/// record, all in flight at once.
///
/// When every update succeeds the projection becomes the confirmed list.
/// Otherwise it is dropped and the list is fetched again from the server;
/// records that did save are not reconciled individually.
pub async fn persist_pending(
    board: &mut ProjectBoard,
    backend: &impl PortfolioBackend,
    token: &str,
) -> Result<usize, ReorderError> {
    let changed = board
        .pending_changes()
        .ok_or(ReorderError::NothingPending)?
        .to_vec();
    let total = changed.len();

    let forms: Vec<_> = changed
        .iter()
        .map(|p| (p.id.clone(), ProjectForm::from_project(p)))
        .collect();
    let results = join_all(
        forms
            .iter()
            .map(|(id, form)| backend.update_project(token, id, form, None)),
    )
    .await;

    let failed = results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .inspect(|e| tracing::warn!(error = %e, "order update failed"))
        .count();

    if failed == 0 {
        board.commit();
        tracing::info!(total, "project order saved");
        return Ok(total);
    }

    board.discard();
    let refreshed = match backend.list_projects().await {
        Ok(projects) => {
            board.replace(projects);
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not reload projects after failed reorder");
            false
        }
    };

    Err(ReorderError::PersistFailed {
        failed,
        total,
        refreshed,
    })
}
