mod handlers;
mod logging;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use taskmgr::engine::config::{Config, DB_ENV, USER_ENV};

#[derive(Parser)]
#[command(name = "taskmgr", version, about = "Task tree with weighted completion")]
struct Cli {
    /// Database file
    #[arg(long, global = true, env = DB_ENV, default_value = ".taskmgr/state.db")]
    db: PathBuf,
    /// Acting user (id or full name)
    #[arg(long, short = 'u', global = true, env = USER_ENV)]
    user: Option<String>,
    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Initialize the task database
    Init,
    /// Manage states
    #[command(subcommand)]
    State(StateCommand),
    /// Manage your catalogs (workspaces)
    #[command(subcommand)]
    Catalog(CatalogCommand),
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),
    /// Add a new task
    Add {
        name: String,
        /// Parent task
        #[arg(long, short = 'p')]
        parent: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Edit a task
    Edit {
        task: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
        /// Finish date (YYYY-MM-DD)
        #[arg(long)]
        finish: Option<NaiveDate>,
        /// Remove the principal
        #[arg(long, conflicts_with = "principal")]
        no_principal: bool,
        /// Remove the description
        #[arg(long, conflicts_with = "desc")]
        no_desc: bool,
        /// Remove the start and end dates
        #[arg(long, conflicts_with_all = ["start", "end"])]
        no_dates: bool,
        /// Remove the finish date
        #[arg(long, conflicts_with = "finish")]
        no_finish: bool,
    },
    /// Move a task under another parent
    Move {
        task: String,
        #[arg(long, short = 'p', conflicts_with = "root", required_unless_present = "root")]
        parent: Option<String>,
        /// Make it a top-level task
        #[arg(long)]
        root: bool,
    },
    /// List tasks as a tree
    List {
        #[command(flatten)]
        filter: ListFilter,
        #[arg(long)]
        json: bool,
    },
    /// Show a task and its children
    Show { task: String },
    /// Show the available filter choices
    Filters,
    /// Show the bulk-action menu
    Actions {
        /// Menu of the archived view
        #[arg(long)]
        archived: bool,
    },
    /// Mark tasks with a state
    Mark {
        state: String,
        #[arg(required = true)]
        tasks: Vec<String>,
    },
    /// Archive tasks with their subtrees
    Archive {
        #[arg(required = true)]
        tasks: Vec<String>,
    },
    /// Restore archived tasks with their subtrees
    Restore {
        #[arg(required = true)]
        tasks: Vec<String>,
    },
    /// Export tasks
    Export {
        /// json or csv
        #[arg(long, short = 'f', default_value = "json")]
        format: String,
        /// Export the archived view
        #[arg(long)]
        archived: bool,
        /// Output file (stdout if omitted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Import tasks, updating rows with matching ids
    Import {
        file: PathBuf,
        /// json or csv (guessed from the extension if omitted)
        #[arg(long, short = 'f')]
        format: Option<String>,
    },
}

#[derive(Args, Clone, Default)]
struct TaskFields {
    #[arg(long)]
    icon: Option<String>,
    #[arg(long)]
    desc: Option<String>,
    /// Responsible user (id or full name)
    #[arg(long)]
    principal: Option<String>,
    /// Weight among siblings (1-100)
    #[arg(long, short = 'w')]
    weight: Option<i64>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
}

#[derive(Args, Clone, Default)]
struct ListFilter {
    /// Show the archived view
    #[arg(long)]
    archived: bool,
    /// Only tasks you are responsible for
    #[arg(long)]
    mine: bool,
    /// Principal user id, or `none` for tasks without one
    #[arg(long)]
    principal: Option<String>,
    /// One of your catalogs
    #[arg(long, short = 'c')]
    catalog: Option<String>,
    /// Search task name and principal name/phone
    #[arg(long, short = 's')]
    search: Option<String>,
}

#[derive(Subcommand, Clone)]
enum StateCommand {
    /// Add a state
    Add {
        name: String,
        /// Completion fraction (0-1)
        #[arg(long)]
        pct: f64,
        #[arg(long, default_value = "")]
        icon: String,
        #[arg(long, default_value_t = 0)]
        ord: i64,
        /// Offer as a bulk action
        #[arg(long)]
        in_actions: bool,
    },
    /// List states
    List,
    /// Edit a state
    Edit {
        state: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        pct: Option<f64>,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        ord: Option<i64>,
        #[arg(long)]
        in_actions: Option<bool>,
    },
    /// Delete a state (tasks keep no state)
    Delete { state: String },
}

#[derive(Subcommand, Clone)]
enum UserCommand {
    /// Add a user
    Add {
        full_name: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// List users
    List {
        /// Filter by name or phone
        #[arg(long, short = 's')]
        search: Option<String>,
    },
}

#[derive(Subcommand, Clone)]
enum CatalogCommand {
    /// Create a catalog
    Add {
        name: String,
        #[arg(long, default_value_t = 0)]
        ord: i64,
    },
    /// List your catalogs
    List,
    /// Rename or reorder a catalog
    Edit {
        catalog: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        ord: Option<i64>,
    },
    /// Add a task subtree to a catalog
    Include {
        catalog: String,
        task: String,
        /// Levels below the task (-1 for all)
        #[arg(long, short = 'l', default_value_t = 0, allow_negative_numbers = true)]
        level: i64,
    },
    /// Remove an item from a catalog
    Drop { catalog: String, item: i64 },
    /// Show a catalog's items and expanded tasks
    Show { catalog: String },
    /// Delete a catalog
    Delete { catalog: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::new(&cli.db, cli.user.clone());

    match cli.command {
        Commands::Init
        | Commands::State(_)
        | Commands::Catalog(_)
        | Commands::User(_)
        | Commands::Add { .. }
        | Commands::Edit { .. }
        | Commands::Move { .. }
        | Commands::Mark { .. }
        | Commands::Archive { .. }
        | Commands::Restore { .. }
        | Commands::Import { .. } => dispatch_write_ops(&config, cli.command),
        Commands::List { .. }
        | Commands::Show { .. }
        | Commands::Filters
        | Commands::Actions { .. }
        | Commands::Export { .. } => dispatch_read_ops(&config, cli.command),
    }
}

fn dispatch_write_ops(config: &Config, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init => handlers::init::handle(config),
        Commands::State(sub) => dispatch_state(config, sub),
        Commands::Catalog(sub) => dispatch_catalog(config, sub),
        Commands::User(sub) => dispatch_user(config, sub),
        Commands::Add {
            name,
            parent,
            fields,
        } => handlers::add::handle(config, &name, parent.as_deref(), &fields.into()),
        Commands::Edit {
            task,
            name,
            fields,
            finish,
            no_principal,
            no_desc,
            no_dates,
            no_finish,
        } => {
            let mut edit: handlers::edit::TaskEdit = fields.into();
            edit.name = name;
            edit.finish = finish;
            edit.clear_principal = no_principal;
            edit.clear_desc = no_desc;
            edit.clear_dates = no_dates;
            edit.clear_finish = no_finish;
            handlers::edit::handle(config, &task, &edit)
        }
        Commands::Move { task, parent, root } => {
            let parent = if root { None } else { parent };
            handlers::move_task::handle(config, &task, parent.as_deref())
        }
        Commands::Mark { state, tasks } => handlers::bulk::mark(config, &state, &tasks),
        Commands::Archive { tasks } => handlers::bulk::archive(config, &tasks),
        Commands::Restore { tasks } => handlers::bulk::restore(config, &tasks),
        Commands::Import { file, format } => {
            handlers::transfer::import(config, &file, format.as_deref())
        }
        _ => unreachable!("Invalid write command dispatch"),
    }
}

fn dispatch_read_ops(config: &Config, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::List { filter, json } => handlers::list::handle(config, &filter.into(), json),
        Commands::Show { task } => handlers::show::handle(config, &task),
        Commands::Filters => handlers::filters::handle(config),
        Commands::Actions { archived } => handlers::bulk::menu(config, archived),
        Commands::Export {
            format,
            archived,
            output,
        } => handlers::transfer::export(config, &format, archived, output.as_deref()),
        _ => unreachable!("Invalid read command dispatch"),
    }
}

fn dispatch_state(config: &Config, cmd: StateCommand) -> Result<()> {
    match cmd {
        StateCommand::Add {
            name,
            pct,
            icon,
            ord,
            in_actions,
        } => handlers::states::add(config, &name, pct, &icon, ord, in_actions),
        StateCommand::List => handlers::states::list(config),
        StateCommand::Edit {
            state,
            name,
            pct,
            icon,
            ord,
            in_actions,
        } => handlers::states::edit(
            config,
            &state,
            &handlers::states::StateEdit {
                name,
                pct,
                icon,
                ord,
                in_actions,
            },
        ),
        StateCommand::Delete { state } => handlers::states::delete(config, &state),
    }
}

fn dispatch_user(config: &Config, cmd: UserCommand) -> Result<()> {
    match cmd {
        UserCommand::Add { full_name, phone } => {
            handlers::users::add(config, &full_name, phone.as_deref())
        }
        UserCommand::List { search } => handlers::users::list(config, search.as_deref()),
    }
}

fn dispatch_catalog(config: &Config, cmd: CatalogCommand) -> Result<()> {
    match cmd {
        CatalogCommand::Add { name, ord } => handlers::catalogs::add(config, &name, ord),
        CatalogCommand::List => handlers::catalogs::list(config),
        CatalogCommand::Edit { catalog, name, ord } => {
            handlers::catalogs::edit(config, &catalog, name.as_deref(), ord)
        }
        CatalogCommand::Include {
            catalog,
            task,
            level,
        } => handlers::catalogs::include(config, &catalog, &task, level),
        CatalogCommand::Drop { catalog, item } => handlers::catalogs::drop_item(config, &catalog, item),
        CatalogCommand::Show { catalog } => handlers::catalogs::show(config, &catalog),
        CatalogCommand::Delete { catalog } => handlers::catalogs::delete(config, &catalog),
    }
}

impl From<TaskFields> for handlers::edit::TaskEdit {
    fn from(f: TaskFields) -> Self {
        Self {
            name: None,
            icon: f.icon,
            desc: f.desc,
            principal: f.principal,
            weight: f.weight,
            start: f.start,
            end: f.end,
            ..Self::default()
        }
    }
}

impl From<ListFilter> for handlers::list::ListOptions {
    fn from(f: ListFilter) -> Self {
        Self {
            archived: f.archived,
            mine: f.mine,
            principal: f.principal,
            catalog: f.catalog,
            search: f.search,
        }
    }
}
