use colored::*;

use crate::{
    models::project::{Project, join_technologies},
    services::{
        listing::CategoryGroup,
        navigation::{Slider, SliderMode},
    },
};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Viewport width in pixels approximated from the terminal, for carousel breakpoints
pub fn approximate_viewport_width() -> u32 {
    (get_terminal_width() as u32).saturating_mul(10)
}

pub fn featured_badge(project: &Project) -> ColoredString {
    if project.featured {
        "★".yellow()
    } else {
        " ".normal()
    }
}

/// Render one project as a list row: order, badge, title and right-aligned technologies
pub fn render_project_line(project: &Project) {
    let terminal_width = get_terminal_width();

    let order_str = format!("{:>3}", project.order);
    let left_section = format!("  {}  {}  {}", order_str, featured_badge(project), project.title);
    let styled_left = left_section.bold();

    let right_section = join_technologies(&project.technologies);
    if right_section.is_empty() {
        println!("{}", styled_left);
        return;
    }

    let left_visible_len = format!("  {}  {}  {}", order_str, " ", project.title)
        .chars()
        .count();
    let right_visible_len = right_section.chars().count();
    let total_content = left_visible_len + right_visible_len;

    if total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        println!("{}{}{}", styled_left, " ".repeat(padding), right_section.dimmed());
    } else {
        println!("{}", styled_left);
    }
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize) {
    let project_word = if count == 1 { "project" } else { "projects" };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, project_word);
}

/// Render a section header (e.g., "Frontend Projects")
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

pub fn render_category_group(group: &CategoryGroup) {
    render_section_header(&group.title());
    for project in &group.projects {
        render_project_line(project);
    }
}

pub fn render_empty(message: &str) {
    println!("\n  {}\n", message.dimmed());
}

/// Render the full detail card shown in the modal
pub fn render_project_details(project: &Project, base_url: &str) {
    let badge = if project.featured {
        format!("  {}", "★ Featured".yellow())
    } else {
        String::new()
    };
    println!("\n  {}{}", project.title.cyan().bold(), badge);
    println!("  {}\n", project.project_type.section_title().dimmed());
    println!("  {}\n", project.description);

    if !project.technologies.is_empty() {
        println!("  {} {}", "Tech:".bold(), join_technologies(&project.technologies));
    }
    for (label, value) in project_links(project, base_url) {
        println!("  {} {}", format!("{label}:").bold(), value.underline());
    }
    if let Some(created_at) = project.created_at {
        println!("  {} {}", "Added:".bold(), format_date(created_at).dimmed());
    }
    println!();
}

fn project_links(project: &Project, base_url: &str) -> Vec<(&'static str, String)> {
    [
        ("Live", project.project_url.clone()),
        ("Code", project.github_url.clone()),
        ("Privacy", project.privacy_policy.clone()),
        ("Image", project.display_image(base_url)),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.filter(|v| !v.is_empty()).map(|v| (label, v)))
    .collect()
}

/// Format a timestamp as e.g. "Feb 15, 2026" in the local time zone
fn format_date(timestamp: jiff::Timestamp) -> String {
    let zoned = jiff::Zoned::new(timestamp, jiff::tz::TimeZone::system());
    zoned.date().strftime("%b %d, %Y").to_string()
}

/// One dot per reachable index, the current one filled
pub fn indicator_dots(slider: &Slider) -> String {
    (0..=slider.max_index())
        .map(|i| if i == slider.current_index() { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the slider window: the visible cards plus arrows and dots when navigable
pub fn render_slider(slider: &Slider, projects: &[Project]) {
    for (index, project) in projects[slider.visible_range()].iter().enumerate() {
        let position = format!("{:>3}", slider.current_index() + index + 1);
        println!(
            "  {}  {}  {}",
            position.dimmed(),
            featured_badge(project),
            project.title.bold()
        );
        if !project.technologies.is_empty() {
            println!("          {}", join_technologies(&project.technologies).dimmed());
        }
        // A fullscreen slide has room for the description too
        if slider.mode() == SliderMode::Fullscreen && !project.description.is_empty() {
            println!("\n          {}", project.description);
        }
    }

    if slider.shows_controls() {
        let prev = if slider.can_prev() { "‹".normal() } else { "‹".dimmed() };
        let next = if slider.can_next() { "›".normal() } else { "›".dimmed() };
        println!("\n  {}  {}  {}", prev, indicator_dots(slider), next);
    }
}

/// Inline error banner, written to stderr
pub fn render_error_banner(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message.red());
}

pub fn render_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::ProjectId;

    #[test]
    fn test_indicator_dots_track_current_index() {
        let mut slider = Slider::fullscreen(3, true).unwrap();
        assert_eq!(indicator_dots(&slider), "● ○ ○");

        slider.jump_to(2);
        assert_eq!(indicator_dots(&slider), "○ ○ ●");
    }

    #[test]
    fn test_carousel_dots_stop_at_max_index() {
        let slider = Slider::carousel(5, 1280).unwrap();
        assert_eq!(indicator_dots(&slider), "● ○ ○");
    }

    #[test]
    fn test_project_links_skip_missing_values() {
        let project = Project {
            id: ProjectId::from("p1"),
            project_url: Some("https://example.dev".to_string()),
            github_url: Some(String::new()),
            image_path: Some("/uploads/shot.png".to_string()),
            ..Project::default()
        };

        let links = project_links(&project, "https://site.dev");

        assert_eq!(
            links,
            vec![
                ("Live", "https://example.dev".to_string()),
                ("Image", "https://site.dev/uploads/shot.png".to_string()),
            ]
        );
    }
}
