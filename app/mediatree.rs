//! Command-line interface for mediatree.
//!
//! Scans a media directory, locally or through the GitHub contents API, and writes the
//! JSON manifest to a file or to stdout.

use clap::{Parser, ValueEnum};
use mediatree::{
    Layout, Manifest, MediaTreeBuilder, MediaTreeError, MediaTreeOptions, NodeStyle, RemoteSource,
    Source, generate, output,
};
use std::path::PathBuf;
use std::process::exit;

/// mediatree — media directory manifest generator
#[derive(Parser)]
#[command(name = "mediatree", version, about, long_about = None)]
struct Cli {
    /// Directory to scan (default "imgs", or the value from --config)
    root: Option<String>,

    /// TOML file with default options; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (stdout if not set)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// List through the GitHub contents API instead of the local disk, as OWNER/REPO
    #[arg(long, value_parser = parse_repo)]
    remote: Option<RepoArg>,

    /// Branch, tag or commit to list (remote only)
    #[arg(long = "ref")]
    git_ref: Option<String>,

    /// Contents API base URL (remote only)
    #[arg(long)]
    api_base: Option<String>,

    /// User-Agent header sent with every request (remote only)
    #[arg(long)]
    user_agent: Option<String>,

    /// Base URL used to derive each file's public URL
    #[arg(long)]
    public_base_url: Option<String>,

    /// Document shape
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Node field set
    #[arg(long, value_enum)]
    style: Option<StyleArg>,

    /// Emit single-line JSON instead of pretty-printed
    #[arg(long)]
    minify: bool,

    /// Exclude patterns matched against entry names and paths (can be repeated)
    #[arg(short = 'I', long = "exclude")]
    exclude: Vec<String>,

    /// Skip hidden files
    #[arg(long)]
    no_hidden: bool,

    /// Honour .gitignore files (local only)
    #[arg(long)]
    gitignore: bool,

    /// Leave symlinks out instead of following them (local only)
    #[arg(long)]
    no_follow_links: bool,

    /// Keep the filesystem's own entry order instead of sorting by name (local only)
    #[arg(long)]
    no_sort: bool,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings and errors only
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LayoutArg {
    Tree,
    TreeWithFlatList,
    Images,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Tree => Layout::Tree,
            LayoutArg::TreeWithFlatList => Layout::TreeWithFlatList,
            LayoutArg::Images => Layout::Images,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum StyleArg {
    Detailed,
    Compact,
}

impl From<StyleArg> for NodeStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Detailed => NodeStyle::Detailed,
            StyleArg::Compact => NodeStyle::Compact,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct RepoArg {
    owner: String,
    repo: String,
}

/// Parse "owner/repo" into its two halves.
fn parse_repo(s: &str) -> Result<RepoArg, String> {
    match s.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok(RepoArg {
                owner: owner.to_string(),
                repo: repo.to_string(),
            })
        }
        _ => Err(format!("expected OWNER/REPO, got '{}'", s)),
    }
}

impl Cli {
    fn into_options(self) -> Result<MediaTreeOptions, MediaTreeError> {
        let base = match &self.config {
            Some(path) => MediaTreeOptions::from_toml_file(path)?,
            None => MediaTreeOptions::default(),
        };
        let mut builder = MediaTreeBuilder::from_options(base.clone());

        if let Some(root) = self.root {
            builder = builder.root(root);
        }
        if self.output.is_some() {
            builder = builder.output(self.output);
        }
        let mut options = builder.build();
        if let Some(RepoArg { owner, repo }) = self.remote {
            match &mut options.source {
                Source::Remote(remote) => {
                    remote.owner = owner;
                    remote.repo = repo;
                }
                Source::Local => options.source = Source::Remote(RemoteSource::new(owner, repo)),
            }
        }
        match &mut options.source {
            Source::Remote(remote) => {
                if let Some(git_ref) = self.git_ref {
                    remote.git_ref = Some(git_ref);
                }
                if let Some(api_base) = self.api_base {
                    remote.api_base = api_base;
                }
                if let Some(user_agent) = self.user_agent {
                    remote.user_agent = user_agent;
                }
            }
            Source::Local => {
                if self.git_ref.is_some() || self.api_base.is_some() || self.user_agent.is_some() {
                    return Err(MediaTreeError::Config(
                        "--ref, --api-base and --user-agent need a remote source".into(),
                    ));
                }
            }
        }

        let mut builder = MediaTreeBuilder::from_options(options);
        if self.public_base_url.is_some() {
            builder = builder.public_base_url(self.public_base_url);
        }
        if let Some(layout) = self.layout {
            builder = builder.layout(layout.into());
        }
        if let Some(style) = self.style {
            builder = builder.style(style.into());
        }
        if self.minify {
            builder = builder.pretty(false);
        }
        if !self.exclude.is_empty() {
            let mut patterns = base.exclude;
            patterns.extend(self.exclude);
            builder = builder.exclude(patterns);
        }
        if self.no_hidden {
            builder = builder.include_hidden(false);
        }
        if self.gitignore {
            builder = builder.respect_gitignore(true);
        }
        if self.no_follow_links {
            builder = builder.follow_links(false);
        }
        if self.no_sort {
            builder = builder.sort_entries(false);
        }
        Ok(builder.build())
    }
}

#[cfg(feature = "logging")]
fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    #[cfg(feature = "logging")]
    init_logging(cli.verbose, cli.quiet);

    let options = match cli.into_options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    match generate(&options) {
        Ok(manifest) => emit(&manifest, &options),
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}

fn emit(manifest: &Manifest, options: &MediaTreeOptions) {
    let target = match &options.output {
        Some(path) => {
            let written = output::write_manifest(
                manifest,
                options.layout,
                options.style,
                options.pretty,
                path,
            );
            if let Err(e) = written {
                eprintln!("Error: {}", e);
                exit(1);
            }
            path.display().to_string()
        }
        None => {
            match output::render(manifest, options.layout, options.style, options.pretty) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    exit(1);
                }
            }
            "stdout".to_string()
        }
    };

    #[cfg(feature = "logging")]
    tracing::info!(
        "Wrote {} files in {} folders to {}",
        manifest.file_count(),
        manifest.folder_count(),
        target
    );
    #[cfg(not(feature = "logging"))]
    eprintln!(
        "Wrote {} files in {} folders to {}",
        manifest.file_count(),
        manifest.folder_count(),
        target
    );
}
