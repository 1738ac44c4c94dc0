use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "notetree",
    bin_name = "notetree",
    version,
    disable_help_subcommand = true,
    after_help = "Pages are addressed by path from the root: 0 is the root, 0.1 its second child.\nJSON paths ([0,1]) are accepted too."
)]
#[command(about = "A hierarchical Markdown notebook", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Notebook file to use instead of the configured one
    #[arg(short, long, global = true, value_name = "PATH", help_heading = "Options")]
    pub file: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Page(PageCommands),

    #[command(flatten)]
    Data(DataCommands),

    #[command(flatten)]
    Registry(RegistryCommands),

    #[command(flatten)]
    Misc(MiscCommands),
}

#[derive(Subcommand, Debug)]
pub enum PageCommands {
    /// Show the page tree
    #[command(alias = "ls", display_order = 1)]
    Tree,

    /// Show a page with its header and footer
    #[command(alias = "v", display_order = 2)]
    Show {
        /// Page path (e.g. 0.1)
        path: String,
    },

    /// Add a page under a parent
    #[command(alias = "n", display_order = 3)]
    Add {
        /// Parent page path
        parent: String,

        /// Title words (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,

        /// Page body (read from piped stdin when omitted)
        #[arg(long, short = 'c')]
        content: Option<String>,
    },

    /// Replace a page's content
    #[command(alias = "e", display_order = 4)]
    Edit {
        path: String,

        /// New body (read from piped stdin when omitted)
        #[arg(long, short = 'c')]
        content: Option<String>,
    },

    /// Rename a page
    #[command(display_order = 5)]
    Title {
        path: String,

        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// Delete a page and its sub pages
    #[command(alias = "rm", display_order = 6)]
    Delete { path: String },

    /// Move a page among its siblings (negative moves up)
    #[command(alias = "mv", display_order = 7)]
    Move {
        path: String,

        #[arg(allow_negative_numbers = true)]
        delta: isize,
    },

    /// Make a page a sibling of its parent
    #[command(display_order = 8)]
    Promote { path: String },

    /// Make a page the last child of one of its siblings
    #[command(display_order = 9)]
    Demote {
        path: String,

        /// Index of the sibling that becomes the new parent
        sibling: usize,
    },

    /// Search titles and content
    #[command(alias = "s", display_order = 10)]
    Search(SearchArgs),

    /// Show or set the notebook header template
    #[command(display_order = 11)]
    Header { text: Option<String> },

    /// Show or set the notebook footer template
    #[command(display_order = 12)]
    Footer { text: Option<String> },
}

#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    pub term: String,

    /// Match case (defaults to the search_match_case setting)
    #[arg(long, conflicts_with = "ignore_case")]
    pub match_case: bool,

    /// Ignore case even when search_match_case is set
    #[arg(long)]
    pub ignore_case: bool,

    /// Only pages whose title is exactly the term
    #[arg(long)]
    pub exact: bool,

    /// Only this page and its descendants
    #[arg(long, value_name = "PATH")]
    pub within: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub title_contains: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub title_starts_with: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub content_contains: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub content_excludes: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Export all pages to a tar.gz archive (or one Markdown file with --single)
    #[command(display_order = 20)]
    Export {
        /// Merge every page into one Markdown document with this title
        #[arg(long, value_name = "TITLE")]
        single: Option<String>,

        /// Output file (defaults to a timestamped name in the current directory)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Print a page and its sub pages as JSON
    #[command(display_order = 21)]
    ExportPage {
        path: String,

        /// Write to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Import a page exported with export-page under a parent
    #[command(display_order = 22)]
    ImportPage { parent: String, file: PathBuf },

    /// Import text or Markdown files as pages under a parent
    #[command(display_order = 23)]
    Import {
        parent: String,

        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RegistryCommands {
    /// Manage notebook images
    #[command(display_order = 30)]
    Image {
        #[command(subcommand)]
        action: ImageAction,
    },

    /// Manage page templates
    #[command(display_order = 31)]
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ImageAction {
    /// Add an image file
    Add {
        file: PathBuf,

        /// Name to store it under (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove an image
    Rm { name: String },
    /// Rename an image and update references to it
    Mv { old: String, new: String },
    /// List images
    Ls,
}

#[derive(Subcommand, Debug)]
pub enum TemplateAction {
    /// Add a template (content from --content or piped stdin)
    Add {
        name: String,

        #[arg(long, short = 'c')]
        content: Option<String>,

        /// Overwrite an existing template
        #[arg(long)]
        replace: bool,
    },
    /// Remove a template
    Rm { name: String },
    /// List templates
    Ls,
    /// Print a template
    Show { name: String },
    /// Add a page whose content is the template
    Use {
        name: String,
        parent: String,

        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MiscCommands {
    /// Report broken links and unused or missing images
    #[command(display_order = 40)]
    Doctor,

    /// Show configuration
    #[command(display_order = 41)]
    Config {
        /// Configuration key (e.g. root_title)
        key: Option<String>,

        /// Print a commented sample config file
        #[arg(long, conflicts_with = "key")]
        template: bool,
    },

    /// Create the notebook file
    #[command(display_order = 42)]
    Init,
}
