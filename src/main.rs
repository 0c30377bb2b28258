use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    browse::{BrowseCommand, BrowseEvent, Browser, parse_command},
    client::http::HttpBackend,
    config::{Config, ConfigArgs},
    models::project::{ProjectForm, ProjectType, split_technologies},
    services::{
        auth::{ChangePasswordParameters, RestoreOutcome, Session},
        contact::{SendContactParameters, send_contact},
        listing::{category_projects, featured_first, group_by_category},
        projects::{
            CreateProjectParameters, DeleteProjectError, DeleteProjectParameters, ProjectEdits,
            UpdateProjectParameters, create_project, delete_project, fetch_board,
            project_by_slug, resolve_project, toggle_featured, update_project,
        },
        reorder::{ProjectBoard, ReorderController, ReorderError, persist_pending},
    },
    storage::json::JsonFileStorage,
};

mod browse;
mod client;
mod config;
mod models;
mod services;
mod storage;
mod ui;

#[derive(Parser)]
#[command(name = "folio", about = "Browse and manage a developer portfolio from your terminal")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects grouped by category
    List {
        /// Only show one category
        #[arg(long)]
        category: Option<ProjectType>,

        /// Put featured projects first within each category
        #[arg(long)]
        featured_first: bool,
    },

    /// Show a single project by slug or title
    Show { slug: String },

    /// Step through a category's projects interactively
    Browse {
        category: ProjectType,

        /// One project at a time instead of a multi-card carousel
        #[arg(long)]
        fullscreen: bool,

        /// Viewport width in pixels used for carousel breakpoints
        #[arg(long)]
        width: Option<u32>,
    },

    /// Send a message through the contact form
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        subject: String,

        #[arg(long)]
        message: String,

        #[arg(long)]
        recaptcha_token: Option<String>,
    },

    /// Sign in as an administrator
    Login {
        #[arg(short, long)]
        username: String,

        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Change the administrator password
    Passwd,

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommands),
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// Create a new project
    New {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        #[arg(long = "type")]
        project_type: Option<ProjectType>,

        /// Comma-separated list, e.g. "Rust, Postgres"
        #[arg(long, default_value = "")]
        tech: String,

        #[arg(long, default_value = "")]
        url: String,

        #[arg(long, default_value = "")]
        github: String,

        #[arg(long, default_value = "")]
        privacy: String,

        #[arg(long)]
        featured: bool,

        #[arg(long, default_value_t = 0)]
        order: i64,

        /// Image file to upload (jpeg, png, gif or webp, at most 5MB)
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Edit an existing project; omitted fields are kept
    Edit {
        /// Project id or title
        project: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long = "type")]
        project_type: Option<ProjectType>,

        #[arg(long)]
        tech: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        github: Option<String>,

        #[arg(long)]
        privacy: Option<String>,

        #[arg(long)]
        featured: Option<bool>,

        #[arg(long)]
        order: Option<i64>,

        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Delete a project
    Delete {
        project: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Toggle the featured flag
    Feature { project: String },

    /// Drag a project onto another one in the same category
    Move {
        project: String,

        /// The project whose position it takes
        #[arg(long)]
        to: String,
    },
}

/// Print an error banner and exit non-zero
fn fail(message: impl std::fmt::Display) -> ! {
    ui::render_error_banner(&message.to_string());
    std::process::exit(1);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("folio=warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn prompt(label: &str) -> String {
    print!("{label}");
    if let Err(e) = io::stdout().flush() {
        fail(format!("Failed to write prompt: {e}"));
    }
    let mut line = String::new();
    if let Err(e) = io::stdin().lock().read_line(&mut line) {
        fail(format!("Failed to read input: {e}"));
    }
    line.trim_end_matches(['\r', '\n']).to_string()
}

/// Read a secret without echoing it to the terminal
fn prompt_password(label: &str) -> String {
    match rpassword::prompt_password(label) {
        Ok(password) => password,
        Err(e) => fail(format!("Failed to read password: {e}")),
    }
}

/// Restore the stored session and hand back its token, or exit
async fn require_token(
    session: &mut Session<JsonFileStorage>,
    backend: &HttpBackend,
) -> String {
    match session.restore(backend).await {
        Ok(RestoreOutcome::SignedIn(_)) => {}
        Ok(RestoreOutcome::Expired) => fail("Session expired. Run `folio login` again"),
        Ok(RestoreOutcome::SignedOut) => {}
        Err(e) => fail(e),
    }
    match session.token() {
        Ok(token) => token.to_string(),
        Err(e) => fail(e),
    }
}

async fn load_board(backend: &HttpBackend) -> ProjectBoard {
    match fetch_board(backend).await {
        Ok(board) => board,
        Err(e) => fail(e),
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = match Config::from_args(cli.config) {
        Ok(config) => config,
        Err(e) => fail(e),
    };
    tracing::debug!(api_url = %config.api_url, "configuration resolved");

    let backend = match HttpBackend::new(config.api_url.clone(), config.timeout) {
        Ok(backend) => backend,
        Err(e) => fail(e),
    };

    let mut session = match Session::open(JsonFileStorage::new(config.session_path.clone())) {
        Ok(session) => session,
        Err(e) => fail(e),
    };

    match cli.command {
        Commands::List {
            category,
            featured_first: featured,
        } => {
            let board = load_board(&backend).await;
            let mut groups = group_by_category(board.visible());
            if let Some(category) = category {
                groups.retain(|g| g.project_type == category);
            }
            if featured {
                featured_first(&mut groups);
            }

            let count = groups.iter().map(|g| g.projects.len()).sum();
            ui::render_view_header("Projects", count);
            if groups.is_empty() {
                ui::render_empty("No projects found");
            }
            for group in &groups {
                ui::render_category_group(group);
            }
            println!();
        }
        Commands::Show { slug } => match project_by_slug(&backend, &slug).await {
            Ok(project) => ui::render_project_details(&project, &config.base_url),
            Err(e) => fail(e),
        },
        Commands::Browse {
            category,
            fullscreen,
            width,
        } => {
            let board = load_board(&backend).await;
            let width = width.unwrap_or_else(ui::approximate_viewport_width);
            let Some(mut browser) =
                Browser::new(group_by_category(board.visible()), category, fullscreen, width)
            else {
                ui::render_empty(&format!("No {} yet", category.section_title()));
                return;
            };

            render_browser(&browser, &config.base_url);
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => fail(format!("Failed to read input: {e}")),
                };
                let Some(command) = parse_command(&line) else {
                    println!("  {}", "Unknown command, type ? for help".dimmed());
                    continue;
                };
                match browser.apply(command, Instant::now()) {
                    BrowseEvent::Quit => break,
                    _ if command == BrowseCommand::Help => print_browse_help(),
                    _ => render_browser(&browser, &config.base_url),
                }
            }
        }
        Commands::Contact {
            name,
            email,
            subject,
            message,
            recaptcha_token,
        } => {
            let parameters = SendContactParameters {
                name,
                email,
                subject,
                message,
                recaptcha_token,
            };
            match send_contact(&backend, parameters).await {
                Ok(()) => ui::render_success("Message sent. Thanks for reaching out!"),
                Err(e) => fail(e),
            }
        }
        Commands::Login { username, password } => {
            let password = password.unwrap_or_else(|| prompt_password("Password: "));
            match session.login(&backend, &username, &password).await {
                Ok(user) => ui::render_success(&format!("Logged in as {}", user.username)),
                Err(e) => fail(e),
            }
        }
        Commands::Logout => {
            if !session.is_signed_in() {
                println!("Not logged in");
                return;
            }
            match session.logout() {
                Ok(()) => ui::render_success("Logged out"),
                Err(e) => fail(e),
            }
        }
        Commands::Whoami => match session.restore(&backend).await {
            Ok(RestoreOutcome::SignedIn(user)) => {
                println!("  {}", user.username.bold());
                if let Some(email) = &user.email {
                    println!("  {}", email.dimmed());
                }
            }
            Ok(RestoreOutcome::Expired) => println!("Session expired. Not logged in"),
            Ok(RestoreOutcome::SignedOut) => println!("Not logged in"),
            Err(e) => fail(e),
        },
        Commands::Passwd => {
            require_token(&mut session, &backend).await;
            if let Some(user) = session.user() {
                println!("Changing password for {}", user.username.bold());
            }
            let parameters = ChangePasswordParameters {
                current_password: prompt_password("Current password: "),
                new_password: prompt_password("New password: "),
                confirm_password: prompt_password("Confirm new password: "),
            };
            match session.change_password(&backend, parameters).await {
                Ok(()) => ui::render_success("Password changed"),
                Err(e) => fail(e),
            }
        }
        Commands::Project(command) => {
            let token = require_token(&mut session, &backend).await;
            run_project_command(command, &backend, &token).await;
        }
    }
}

async fn run_project_command(command: ProjectCommands, backend: &HttpBackend, token: &str) {
    match command {
        ProjectCommands::New {
            title,
            description,
            project_type,
            tech,
            url,
            github,
            privacy,
            featured,
            order,
            image,
        } => {
            let form = ProjectForm {
                title,
                description,
                project_type,
                unrecognized_type: None,
                technologies: split_technologies(&tech),
                project_url: url,
                github_url: github,
                privacy_policy: privacy,
                featured,
                order,
            };
            match create_project(backend, token, CreateProjectParameters { form, image }).await {
                Ok(project) => ui::render_success(&format!(
                    "Project {} created with id {}",
                    project.title, project.id
                )),
                Err(e) => fail(e),
            }
        }
        ProjectCommands::Edit {
            project,
            title,
            description,
            project_type,
            tech,
            url,
            github,
            privacy,
            featured,
            order,
            image,
        } => {
            let mut board = load_board(backend).await;
            let edits = ProjectEdits {
                title,
                description,
                project_type,
                technologies: tech.as_deref().map(split_technologies),
                project_url: url,
                github_url: github,
                privacy_policy: privacy,
                featured,
                order,
            };
            let parameters = UpdateProjectParameters {
                project,
                edits,
                image,
            };
            match update_project(&mut board, backend, token, parameters).await {
                Ok(project) => ui::render_success(&format!("Project {} updated", project.title)),
                Err(e) => fail(e),
            }
        }
        ProjectCommands::Delete { project, yes } => {
            let mut board = load_board(backend).await;
            let confirmed = yes || {
                let title = match resolve_project(board.visible(), &project) {
                    Ok(p) => p.title.clone(),
                    Err(e) => fail(e),
                };
                let answer = prompt(&format!("Delete '{title}'? This cannot be undone [y/N] "));
                answer.trim().eq_ignore_ascii_case("y")
            };

            let parameters = DeleteProjectParameters { project, confirmed };
            match delete_project(&mut board, backend, token, parameters).await {
                Ok(project) => ui::render_success(&format!("Project deleted: {}", project.title)),
                Err(DeleteProjectError::NotConfirmed) => println!("Aborted"),
                Err(e) => fail(e),
            }
        }
        ProjectCommands::Feature { project } => {
            let mut board = load_board(backend).await;
            match toggle_featured(&mut board, backend, token, &project).await {
                Ok(true) => ui::render_success(&format!("{project} is now featured")),
                Ok(false) => ui::render_success(&format!("{project} is no longer featured")),
                Err(e) => fail(e),
            }
        }
        ProjectCommands::Move { project, to } => {
            let mut board = load_board(backend).await;
            let (source, target) = match (
                resolve_project(board.visible(), &project),
                resolve_project(board.visible(), &to),
            ) {
                (Ok(source), Ok(target)) => (source.clone(), target.clone()),
                (Err(e), _) | (_, Err(e)) => fail(e),
            };
            if source.project_type != target.project_type {
                fail(format!(
                    "'{}' and '{}' are in different categories",
                    source.title, target.title
                ));
            }

            let mut controller = ReorderController::new();
            controller.drag_start(&source);
            controller.drag_over(&target);
            let Some(changed) = controller.drop(board.visible()) else {
                println!("Nothing to move");
                return;
            };
            board.apply_pending(changed);

            let category = source.project_type;
            ui::render_section_header(&category.section_title());
            for project in category_projects(board.visible(), category) {
                ui::render_project_line(&project);
            }
            println!();

            match persist_pending(&mut board, backend, token).await {
                Ok(saved) => ui::render_success(&format!("Order saved ({saved} projects)")),
                Err(e) => {
                    if let ReorderError::PersistFailed {
                        refreshed: true, ..
                    } = e
                    {
                        eprintln!("{}", "Order reverted to the server's current state".dimmed());
                    }
                    fail(e)
                }
            }
        }
    }
}

fn render_browser(browser: &Browser, base_url: &str) {
    if let Some(project) = browser.modal().selected()
        && browser.modal().is_open()
    {
        ui::render_project_details(project, base_url);
        println!("  {}", "esc to close".dimmed());
        return;
    }

    let section = browser.section();
    ui::render_view_header(&section.title(), browser.slider().len());
    ui::render_slider(browser.slider(), &section.projects);
    println!();
}

fn print_browse_help() {
    println!(
        "\n  {}\n  h/l  previous/next    j  next section    N  jump to dot N\n  \
         o [N]  open details    esc/backdrop  close details\n  \
         swipe X1 X2    wheel DX DY    resize PX    q  quit\n",
        "Commands".bold()
    );
}
