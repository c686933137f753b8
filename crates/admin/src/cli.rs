//! Command-line front-end over the admin screens.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use upbreed_client::AUTH_COOKIE;
use upbreed_core::models::BlogKind;
use upbreed_core::routes::Route;
use upbreed_core::types::ResourceId;
use upbreed_query::{ConfirmOutcome, DeleteDialog, ListController, ListView, Loadable};

use crate::app::AdminApp;
use crate::screens::blogs::BlogsScreen;
use crate::screens::courses::CoursesScreen;
use crate::screens::dashboard::DashboardScreen;
use crate::screens::instructors::InstructorsScreen;
use crate::screens::login::{LoginOutcome, LoginScreen};

#[derive(Debug, Parser)]
#[command(name = "upbreed-admin", about = "Upbreed admin console")]
pub struct Cli {
    /// Session token; falls back to `UPBREED_TOKEN`.
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and print the session token.
    Login { email: String, password: String },
    Courses {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
    },
    Instructors {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// Deactivate an instructor.
    DeleteInstructor { id: ResourceId },
    DeleteCourse { id: ResourceId },
    Blogs {
        #[arg(long, value_enum, default_value_t = KindArg::Press)]
        kind: KindArg,
        #[arg(long)]
        search: Option<String>,
    },
    /// Summary cards of the dashboard.
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    News,
    Press,
}

impl From<KindArg> for BlogKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::News => BlogKind::News,
            KindArg::Press => BlogKind::Press,
        }
    }
}

pub async fn run(cli: Cli, app: AdminApp) -> anyhow::Result<()> {
    if let Some(token) = cli.token {
        app.jar.set(AUTH_COOKIE, token);
    }

    if let Command::Login { email, password } = cli.command {
        return login(app, email, password).await;
    }

    let landed = app.open(route_of(&cli.command));
    if landed == Route::Login {
        bail!("Not logged in; run `upbreed-admin login` or pass --token");
    }

    match cli.command {
        Command::Login { .. } => Ok(()),
        Command::Courses { page, search } => {
            let screen = CoursesScreen::with_options(&app, app.list_options_undebounced());
            let view = load(&screen.list, page, search.as_deref()).await?;
            match screen.empty_title() {
                Some(title) => println!("{title}"),
                None => {
                    for c in view.items() {
                        println!("{:>6}  {}  ({})", c.id, c.title, c.instructor.full_name());
                    }
                }
            }
            print_pages(&view);
            Ok(())
        }
        Command::Instructors { page, search } => {
            let screen = InstructorsScreen::with_options(&app, app.list_options_undebounced());
            let view = load(&screen.list, page, search.as_deref()).await?;
            match screen.empty_title() {
                Some(title) => println!("{title}"),
                None => {
                    for i in view.items() {
                        println!("{:>6}  {}  <{}>", i.id, i.full_name(), i.email);
                    }
                }
            }
            print_pages(&view);
            Ok(())
        }
        Command::DeleteInstructor { id } => {
            let screen = InstructorsScreen::with_options(&app, app.list_options_undebounced());
            confirm_delete(&screen.delete, id).await?;
            println!("Instructor {id} deactivated");
            Ok(())
        }
        Command::DeleteCourse { id } => {
            let screen = CoursesScreen::with_options(&app, app.list_options_undebounced());
            confirm_delete(&screen.delete, id).await?;
            println!("Course {id} deleted");
            Ok(())
        }
        Command::Blogs { kind, search } => {
            app.query_state.blog_category().set(kind.into());
            let screen = BlogsScreen::with_options(&app, app.list_options_undebounced());
            let view = load(&screen.list, 1, search.as_deref()).await?;
            match screen.empty_title() {
                Some(title) => println!("{title}"),
                None => {
                    for b in view.items() {
                        let state = if b.is_published { "published" } else { "draft" };
                        println!("{:>6}  {}  [{state}]", b.id, b.title);
                    }
                }
            }
            Ok(())
        }
        Command::Dashboard => {
            let mut screen = DashboardScreen::new(&app);
            match screen.settled().await {
                Loadable::Ready(view) => {
                    println!("Users        {}", view.total_users);
                    println!("Subscribers  {} ({:.1}%)", view.total_subscribers, view.share.subscribers);
                    println!("Instructors  {}", view.total_instructors);
                    println!("Reports      {}", view.total_reports);
                    println!("Revenue      {}", view.total_revenue);
                    Ok(())
                }
                Loadable::Error(e) => Err(e).context("Failed to load dashboard"),
                Loadable::Pending => bail!("Dashboard did not load"),
            }
        }
    }
}

fn route_of(command: &Command) -> Route {
    match command {
        Command::Login { .. } => Route::Login,
        Command::Courses { .. } | Command::DeleteCourse { .. } => Route::Courses,
        Command::Instructors { .. } | Command::DeleteInstructor { .. } => Route::Instructors,
        Command::Blogs { .. } => Route::Blogs,
        Command::Dashboard => Route::Dashboard,
    }
}

async fn login(app: AdminApp, email: String, password: String) -> anyhow::Result<()> {
    let mut screen = LoginScreen::new(app);
    screen.form.email = email;
    screen.form.password = password;
    match screen.submit().await {
        LoginOutcome::LoggedIn(session) => {
            println!("{}", session.token);
            Ok(())
        }
        LoginOutcome::Invalid(errors) => bail!("{errors}"),
        LoginOutcome::Failed(e) => Err(e).context("Login failed"),
    }
}

/// Drive a list to `page` and `search`, then wait for it to settle.
async fn load<T>(
    list: &ListController<T>,
    page: u32,
    search: Option<&str>,
) -> anyhow::Result<ListView<T>>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    let term = search.map(str::trim).unwrap_or_default().to_string();
    let page = page.max(1);
    list.set_page(page);
    list.set_search(term.clone());

    let mut view = list.view();
    let settled = view
        .wait_for(|v| v.page == page && v.search_term == term && !v.state.is_pending())
        .await
        .context("List stopped before loading")?
        .clone();
    if let Loadable::Error(e) = &settled.state {
        return Err(e.clone()).context("Failed to load list");
    }
    Ok(settled)
}

fn print_pages<T>(view: &ListView<T>) {
    if view.show_pagination() {
        println!("-- page {} of {}", view.page, view.last_page);
    }
}

async fn confirm_delete(dialog: &DeleteDialog, id: ResourceId) -> anyhow::Result<()> {
    dialog.open(id);
    match dialog.confirm().await {
        ConfirmOutcome::Deleted(_) => Ok(()),
        ConfirmOutcome::Failed(e) => Err(e).context("Delete failed"),
        ConfirmOutcome::Busy | ConfirmOutcome::NotOpen => bail!("Delete did not run"),
    }
}
