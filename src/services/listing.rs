use crate::models::project::{Project, ProjectType};

/// Projects of one category, in display order
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub project_type: ProjectType,
    pub projects: Vec<Project>,
}

impl CategoryGroup {
    pub fn title(&self) -> String {
        self.project_type.section_title()
    }
}

/// Group projects by category, following `ProjectType::ALL` order.
///
/// Inside a group projects are sorted ascending by `order`; the sort is stable
/// so equal `order` values keep their fetch order. Empty categories are left
/// out entirely.
pub fn group_by_category(projects: &[Project]) -> Vec<CategoryGroup> {
    ProjectType::ALL
        .into_iter()
        .filter_map(|project_type| {
            let mut members: Vec<Project> = projects
                .iter()
                .filter(|p| p.project_type == project_type)
                .cloned()
                .collect();

            if members.is_empty() {
                return None;
            }

            members.sort_by_key(|p| p.order);

            Some(CategoryGroup {
                project_type,
                projects: members,
            })
        })
        .collect()
}

/// Members of a single category in display order
pub fn category_projects(projects: &[Project], project_type: ProjectType) -> Vec<Project> {
    group_by_category(projects)
        .into_iter()
        .find(|g| g.project_type == project_type)
        .map(|g| g.projects)
        .unwrap_or_default()
}

/// Move featured projects ahead of the rest within each group
pub fn featured_first(groups: &mut [CategoryGroup]) {
    for group in groups {
        // Stable, so `order` is still respected inside each half
        group.projects.sort_by_key(|p| !p.featured);
    }
}
