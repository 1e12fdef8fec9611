//! file-tree CLI
//!
//! Builds production file paths from the tree documents attached to projects,
//! and resolves folder paths back to the tasks and entities they name.

use anyhow::{Context, Result};
use clap::Parser;
use file_tree::builder::{PathBuilder, PathParams, Subject};
use file_tree::cli::guess::{GuessArgs, GuessTaskArgs};
use file_tree::cli::paths::{InstancePathArgs, OutputPathArgs, WorkingPathArgs};
use file_tree::cli::seed::SeedArgs;
use file_tree::cli::trees::{SetTreeArgs, ShowTreeArgs};
use file_tree::cli::{Cli, Command};
use file_tree::config::{Config, ConfigLoader};
use file_tree::db::Database;
use file_tree::error::{ErrorCode, TreeError};
use file_tree::format::{
    OutputFormat, TreeListing, format_built_path_markdown, format_guesses_markdown,
    format_task_markdown, format_tree_markdown, format_trees_markdown,
};
use file_tree::logging::{LogTarget, init_logging};
use file_tree::parser::PathParser;
use file_tree::render::{RenderOptions, Renderer, StaticDefaults};
use file_tree::tree::{TreeDefinition, TreeStore};
use file_tree::types::TaskType;
use std::process::ExitCode;
use tracing::{debug, info};

/// Everything a path command needs, loaded once per invocation.
struct Session {
    config: Config,
    store: TreeStore,
    db: Database,
}

impl Session {
    fn open(loader: &ConfigLoader) -> Result<Self> {
        let config = loader.config().clone();
        let store = TreeStore::from_loader(loader);

        if let Some(parent) = config.database.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating database folder {}", parent.display()))?;
        }
        let db = Database::open(&config.database.path)?;
        debug!(path = %config.database.path.display(), "Opened entity database");

        Ok(Self { config, store, db })
    }

    fn default_tree(&self) -> Result<TreeDefinition> {
        Ok(self.store.load_tree(&self.config.trees.default_tree)?)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = cli.format;

    if let Err(err) = init_logging(&LogTarget::parse(&cli.log), cli.verbose) {
        eprintln!("Failed to initialize logging: {}", err);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let err = TreeError::from(err);
            match format {
                OutputFormat::Json => match serde_json::to_string_pretty(&err) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("{}", err),
                },
                OutputFormat::Markdown => eprintln!("Error [{:?}]: {}", err.code, err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    // If explicit config path given, set it as env var for ConfigLoader to pick up
    // SAFETY: This is safe at program startup before any other threads are spawned
    if let Some(config_path) = &cli.config {
        unsafe {
            std::env::set_var("FILE_TREE_CONFIG_PATH", config_path);
        }
    }
    let mut loader = ConfigLoader::load()?;
    if let Some(path) = loader.config_path() {
        debug!(path = %path.display(), "Loaded configuration");
    }

    // Override paths from CLI arguments
    let config = loader.config_mut();
    if let Some(db_path) = &cli.database {
        config.database.path = db_path.into();
    }
    if let Some(trees_dir) = &cli.trees_dir {
        config.trees.folder = Some(trees_dir.into());
    }

    let format = cli.format;
    match cli.command {
        Command::Trees => run_trees(&TreeStore::from_loader(&loader), format),
        Command::ShowTree(args) => run_show_tree(&TreeStore::from_loader(&loader), args, format),
        Command::Seed(args) => run_seed(&Session::open(&loader)?, args, format),
        Command::SetTree(args) => run_set_tree(&Session::open(&loader)?, args, format),
        Command::WorkingPath(args) => run_working_path(&Session::open(&loader)?, args, format),
        Command::OutputPath(args) => run_output_path(&Session::open(&loader)?, args, format),
        Command::InstancePath(args) => run_instance_path(&Session::open(&loader)?, args, format),
        Command::GuessTask(args) => run_guess_task(&Session::open(&loader)?, args, format),
        Command::Guess(args) => run_guess(&Session::open(&loader)?, args, format),
    }
}

fn run_trees(store: &TreeStore, format: OutputFormat) -> Result<String> {
    let trees: Vec<TreeListing> = store
        .list_trees()
        .into_iter()
        .map(|(name, source)| TreeListing::new(name, source))
        .collect();
    format.render(&trees, format_trees_markdown)
}

fn run_show_tree(store: &TreeStore, args: ShowTreeArgs, format: OutputFormat) -> Result<String> {
    let tree = store.load_tree(&args.name)?;
    format.render(&tree, format_tree_markdown)
}

fn run_seed(ctx: &Session, args: SeedArgs, format: OutputFormat) -> Result<String> {
    let stats = ctx.db.import_fixture_file(&args.file)?;

    if args.assign_default_tree {
        let tree = ctx.default_tree()?;
        for project in ctx.db.list_projects()? {
            if project.file_tree.is_none() {
                ctx.db.set_project_tree(&project.id, &tree)?;
            }
        }
    }

    format.render(&stats, |stats| {
        let mut md = format!("# Imported {}\n\n", args.file.display());
        for (table, count) in stats {
            md.push_str(&format!("- **{}**: {}\n", table, count));
        }
        md
    })
}

fn run_set_tree(ctx: &Session, args: SetTreeArgs, format: OutputFormat) -> Result<String> {
    let name = args
        .name
        .unwrap_or_else(|| ctx.config.trees.default_tree.clone());
    let tree = ctx.store.load_tree(&name)?;
    ctx.db.set_project_tree(&args.project_id, &tree)?;
    info!(project_id = %args.project_id, tree = %name, "Project tree updated");

    let result = serde_json::json!({ "project_id": args.project_id, "tree": name });
    format.render(&result, |_| {
        format!("Project `{}` now uses tree **{}**\n", args.project_id, name)
    })
}

fn build_path(
    ctx: &Session,
    subject: Subject<'_>,
    params: &PathParams,
    format: OutputFormat,
) -> Result<String> {
    let fallback = ctx.default_tree()?;
    let defaults = StaticDefaults::from_config(&ctx.config.render);
    let renderer = Renderer::new(&ctx.db, &defaults, RenderOptions::from(&ctx.config.render));
    let builder = PathBuilder::new(renderer).with_fallback_tree(&fallback);

    let built = builder.build_file_path(subject, params)?;
    format.render(&built, format_built_path_markdown)
}

fn run_working_path(ctx: &Session, args: WorkingPathArgs, format: OutputFormat) -> Result<String> {
    let task = ctx
        .db
        .get_task(&args.task_id)?
        .ok_or_else(|| TreeError::task_not_found(&args.task_id))?;
    let params = args.path.to_params(PathParams::working());
    build_path(ctx, Subject::Task(&task), &params, format)
}

fn run_output_path(ctx: &Session, args: OutputPathArgs, format: OutputFormat) -> Result<String> {
    let entity = ctx
        .db
        .get_entity(&args.entity_id)?
        .ok_or_else(|| TreeError::entity_not_found(&args.entity_id))?;
    let mut params = args.path.to_params(PathParams::output());
    params.task_type = lookup_task_type(ctx, args.task_type.as_deref())?;
    build_path(ctx, Subject::Entity(&entity), &params, format)
}

fn run_instance_path(
    ctx: &Session,
    args: InstancePathArgs,
    format: OutputFormat,
) -> Result<String> {
    let instance = ctx
        .db
        .get_asset_instance(&args.instance_id)?
        .ok_or_else(|| {
            TreeError::not_found(ErrorCode::AssetNotFound, "Asset instance", &args.instance_id)
        })?;
    let temporal_entity = ctx
        .db
        .get_entity(&args.temporal_entity_id)?
        .ok_or_else(|| TreeError::entity_not_found(&args.temporal_entity_id))?;
    let mut params = args.path.to_params(PathParams::instance());
    params.task_type = lookup_task_type(ctx, args.task_type.as_deref())?;

    let subject = Subject::Instance {
        instance: &instance,
        temporal_entity: &temporal_entity,
    };
    build_path(ctx, subject, &params, format)
}

fn lookup_task_type(
    ctx: &Session,
    task_type_id: Option<&str>,
) -> Result<Option<TaskType>> {
    match task_type_id {
        Some(id) => {
            let task_type = ctx.db.get_task_type(id)?.ok_or_else(|| {
                TreeError::not_found(ErrorCode::TaskTypeNotFound, "Task type", id)
            })?;
            Ok(Some(task_type))
        }
        None => Ok(None),
    }
}

fn run_guess_task(ctx: &Session, args: GuessTaskArgs, format: OutputFormat) -> Result<String> {
    let project = ctx
        .db
        .get_project(&args.project)?
        .ok_or_else(|| TreeError::project_not_found(&args.project))?;
    let fallback = ctx.default_tree()?;
    let parser = PathParser::new(&ctx.db).with_fallback_tree(&fallback);

    let task =
        parser.guess_task_from_path(&args.path, &project, &args.mode, &args.sep, args.kind.into())?;
    format.render(&task, format_task_markdown)
}

fn run_guess(ctx: &Session, args: GuessArgs, format: OutputFormat) -> Result<String> {
    let fallback = ctx.default_tree()?;
    let parser = PathParser::new(&ctx.db).with_fallback_tree(&fallback);

    let guesses = parser.guess_from_path(&args.project, &args.path, &args.sep)?;
    format.render(&guesses, format_guesses_markdown)
}
