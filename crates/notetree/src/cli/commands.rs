//! # CLI Layer
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Installs the `tracing` subscriber
//! - Reads and writes files other than the notebook itself (exports, imports, images)
//! - Formats output for human consumption
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: shell arguments into typed commands via clap
//! 2. **Context Setup**: resolve the notebook file and open the API
//! 3. **API Dispatch**: call the matching `NotebookApi` method
//! 4. **Output Formatting**: `CmdResult` into terminal text (or JSON with `--json`)
//! 5. **Error Handling**: errors bubble up as `anyhow::Error` to `main`

use super::render::{render_messages, render_names, render_search, render_tree};
use super::setup::{
    parse_cli, Commands, DataCommands, ImageAction, MiscCommands, PageCommands,
    RegistryCommands, SearchArgs, TemplateAction,
};
use anyhow::{Context, Result};
use notetreeapp::api::{parse_path, CmdMessage, CmdResult, NotebookApi};
use notetreeapp::commands::config::ConfigAction;
use notetreeapp::commands::export::{archive_file_name, single_file_name};
use notetreeapp::init::initialize;
use notetreeapp::search::{SearchFilter, TextCondition};
use notetreeapp::store::fs::FileStore;
use std::fs;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "NOTETREE_LOG";

struct AppContext {
    api: NotebookApi<FileStore>,
    json: bool,
}

/// Which parts of a result a command prints, besides its messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Messages,
    Tree,
    Output,
    Search,
    Names,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run() -> Result<()> {
    let cli = parse_cli();
    init_logging(cli.verbose);

    let notebook = initialize(cli.file.as_deref())?;
    debug!(
        notebook = %notebook.paths.notebook_file.display(),
        initialized = notebook.api.is_initialized(),
        "opened notebook"
    );
    let mut ctx = AppContext {
        api: notebook.api,
        json: cli.json,
    };

    match cli.command {
        None => handle_tree(&mut ctx),
        Some(Commands::Page(cmd)) => match cmd {
            PageCommands::Tree => handle_tree(&mut ctx),
            PageCommands::Show { path } => {
                let result = ctx.api.show(&path)?;
                emit(&ctx, result, Shape::Output)
            }
            PageCommands::Add {
                parent,
                title,
                content,
            } => {
                let body = read_body(content)?;
                let result = ctx.api.add_page(&parent, &title.join(" "), &body)?;
                emit(&ctx, result, Shape::Messages)
            }
            PageCommands::Edit { path, content } => {
                let body = read_body(content)?;
                let result = ctx.api.set_content(&path, &body)?;
                emit(&ctx, result, Shape::Messages)
            }
            PageCommands::Title { path, title } => {
                let result = ctx.api.set_title(&path, &title.join(" "))?;
                emit(&ctx, result, Shape::Messages)
            }
            PageCommands::Delete { path } => {
                let result = ctx.api.delete_page(&path)?;
                emit(&ctx, result, Shape::Messages)
            }
            PageCommands::Move { path, delta } => {
                let result = ctx.api.move_page(&path, delta)?;
                emit(&ctx, result, Shape::Messages)
            }
            PageCommands::Promote { path } => {
                let result = ctx.api.promote_page(&path)?;
                emit(&ctx, result, Shape::Messages)
            }
            PageCommands::Demote { path, sibling } => {
                let result = ctx.api.demote_page(&path, sibling)?;
                emit(&ctx, result, Shape::Messages)
            }
            PageCommands::Search(args) => handle_search(&mut ctx, args),
            PageCommands::Header { text } => match text {
                Some(text) => {
                    let result = ctx.api.set_header(&text)?;
                    emit(&ctx, result, Shape::Messages)
                }
                None => {
                    let header = ctx.api.notebook().header.clone();
                    emit(&ctx, CmdResult::default().with_output(header), Shape::Output)
                }
            },
            PageCommands::Footer { text } => match text {
                Some(text) => {
                    let result = ctx.api.set_footer(&text)?;
                    emit(&ctx, result, Shape::Messages)
                }
                None => {
                    let footer = ctx.api.notebook().footer.clone();
                    emit(&ctx, CmdResult::default().with_output(footer), Shape::Output)
                }
            },
        },
        Some(Commands::Data(cmd)) => match cmd {
            DataCommands::Export { single, output } => handle_export(&mut ctx, single, output),
            DataCommands::ExportPage { path, output } => {
                handle_export_page(&mut ctx, &path, output)
            }
            DataCommands::ImportPage { parent, file } => {
                let json = fs::read_to_string(&file)
                    .with_context(|| format!("reading {}", file.display()))?;
                let result = ctx.api.import_page_json(&parent, &json)?;
                emit(&ctx, result, Shape::Messages)
            }
            DataCommands::Import { parent, files } => handle_import(&mut ctx, &parent, &files),
        },
        Some(Commands::Registry(cmd)) => match cmd {
            RegistryCommands::Image { action } => handle_image(&mut ctx, action),
            RegistryCommands::Template { action } => handle_template(&mut ctx, action),
        },
        Some(Commands::Misc(cmd)) => match cmd {
            MiscCommands::Doctor => {
                let result = ctx.api.doctor()?;
                emit(&ctx, result, Shape::Names)
            }
            MiscCommands::Config { key, template } => {
                let action = match (key, template) {
                    (_, true) => ConfigAction::Template,
                    (Some(key), false) => ConfigAction::ShowKey(key),
                    (None, false) => ConfigAction::ShowAll,
                };
                let result = ctx.api.config_action(action)?;
                emit(&ctx, result, Shape::Output)
            }
            MiscCommands::Init => {
                let result = ctx.api.init()?;
                emit(&ctx, result, Shape::Messages)
            }
        },
    }
}

fn emit(ctx: &AppContext, result: CmdResult, shape: Shape) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    match shape {
        Shape::Messages => {}
        Shape::Tree => print!("{}", render_tree(&result.listed_pages)),
        Shape::Output => {
            if let Some(output) = &result.output {
                println!("{}", output);
            }
        }
        Shape::Search => {
            if let Some(search) = &result.search {
                print!("{}", render_search(search));
            }
        }
        Shape::Names => print!("{}", render_names(&result.names)),
    }
    print!("{}", render_messages(&result.messages));
    Ok(())
}

/// `--content` when given, else piped stdin, else empty.
fn read_body(content: Option<String>) -> Result<String> {
    if let Some(content) = content {
        return Ok(content);
    }
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut body = String::new();
    stdin.read_to_string(&mut body).context("reading stdin")?;
    Ok(body)
}

fn handle_tree(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.tree()?;
    emit(ctx, result, Shape::Tree)
}

fn condition(text: Option<String>, match_case: bool) -> Option<TextCondition> {
    text.map(|t| TextCondition::new(t).match_case(match_case))
}

fn handle_search(ctx: &mut AppContext, args: SearchArgs) -> Result<()> {
    let match_case = if args.match_case {
        Some(true)
    } else if args.ignore_case {
        Some(false)
    } else {
        None
    };
    let case = match_case.unwrap_or(ctx.api.config().search_match_case);
    let filter = SearchFilter {
        within_page_index_path: args.within.as_deref().map(parse_path).transpose()?,
        title_contains: condition(args.title_contains, case),
        title_starts_with: condition(args.title_starts_with, case),
        content_contains: condition(args.content_contains, case),
        content_does_not_contain: condition(args.content_excludes, case),
        ..Default::default()
    };
    let result = ctx
        .api
        .search_filtered(&args.term, match_case, args.exact, &filter)?;
    emit(ctx, result, Shape::Search)
}

fn handle_export(
    ctx: &mut AppContext,
    single: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let (mut result, file) = match single {
        Some(title) => {
            let result = ctx.api.export_single_file(&title)?;
            let file = output.unwrap_or_else(|| PathBuf::from(single_file_name(&title)));
            fs::write(&file, result.output.as_deref().unwrap_or_default())
                .with_context(|| format!("writing {}", file.display()))?;
            (result, file)
        }
        None => {
            let file = output.unwrap_or_else(|| PathBuf::from(archive_file_name()));
            let writer = fs::File::create(&file)
                .with_context(|| format!("creating {}", file.display()))?;
            (ctx.api.export_archive(writer)?, file)
        }
    };
    result.output = None;
    result.add_message(CmdMessage::info(format!(
        "Exported to {}",
        file.display()
    )));
    emit(ctx, result, Shape::Messages)
}

fn handle_export_page(ctx: &mut AppContext, path: &str, output: Option<PathBuf>) -> Result<()> {
    let mut result = ctx.api.export_page_json(path)?;
    let Some(file) = output else {
        return emit(ctx, result, Shape::Output);
    };
    let Some(json) = result.output.take() else {
        return emit(ctx, result, Shape::Messages);
    };
    fs::write(&file, json).with_context(|| format!("writing {}", file.display()))?;
    result.add_message(CmdMessage::success(format!(
        "Exported page to {}",
        file.display()
    )));
    emit(ctx, result, Shape::Messages)
}

fn title_from_file(file: &Path) -> String {
    file.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "Imported".to_string())
}

fn handle_import(ctx: &mut AppContext, parent: &str, files: &[PathBuf]) -> Result<()> {
    let mut combined = CmdResult::default();
    for file in files {
        let content = fs::read_to_string(file)
            .with_context(|| format!("reading {}", file.display()))?;
        let result = ctx
            .api
            .import_text(parent, &title_from_file(file), &content)?;
        combined.changed |= result.changed;
        combined.messages.extend(result.messages);
    }
    emit(ctx, combined, Shape::Messages)
}

fn handle_image(ctx: &mut AppContext, action: ImageAction) -> Result<()> {
    let result = match action {
        ImageAction::Add { file, name } => {
            let bytes = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let name = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .context("image path has no file name")?,
            };
            ctx.api.add_image(&name, bytes)?
        }
        ImageAction::Rm { name } => ctx.api.remove_image(&name)?,
        ImageAction::Mv { old, new } => ctx.api.rename_image(&old, &new)?,
        ImageAction::Ls => return emit(ctx, ctx.api.list_images()?, Shape::Names),
    };
    emit(ctx, result, Shape::Messages)
}

fn handle_template(ctx: &mut AppContext, action: TemplateAction) -> Result<()> {
    let result = match action {
        TemplateAction::Add {
            name,
            content,
            replace,
        } => {
            let body = read_body(content)?;
            ctx.api.add_template(&name, &body, replace)?
        }
        TemplateAction::Rm { name } => ctx.api.remove_template(&name)?,
        TemplateAction::Ls => return emit(ctx, ctx.api.list_templates()?, Shape::Names),
        TemplateAction::Show { name } => {
            return emit(ctx, ctx.api.show_template(&name)?, Shape::Output)
        }
        TemplateAction::Use {
            name,
            parent,
            title,
        } => ctx
            .api
            .new_from_template(&parent, &title.join(" "), &name)?,
    };
    emit(ctx, result, Shape::Messages)
}
