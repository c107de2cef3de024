use clap::{Parser, Subcommand};
use notesite::markdown::MarkdownPipeline;
use notesite::nav::NavigationIndex;
use notesite::session::Session;
use notesite::source::DirSource;
use notesite::{config, lint, output, page, scan};
use std::fs;
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let version = env!("CARGO_PKG_VERSION");
    let describe = env!("NOTESITE_GIT_DESCRIBE");
    if describe.is_empty() || describe.trim_start_matches('v') == version {
        version
    } else {
        // Leaked once at startup
        Box::leak(format!("{version} ({describe})").into_boxed_str())
    }
}

/// Flags for commands that read the scanned site.
#[derive(clap::Args, Clone)]
struct SiteArgs {
    /// Content directory
    #[arg(long, default_value = "public")]
    source: PathBuf,

    /// Navigation document written by `scan`
    #[arg(long, default_value = "tree.json")]
    tree: PathBuf,
}

#[derive(Parser)]
#[command(name = "notesite")]
#[command(about = "Navigation index builder and markdown renderer for a notes site")]
#[command(long_about = "\
Navigation index builder and markdown renderer for a notes site

The content directory is the data source. Folders become sidebar sections,
markdown files become notes, images and videos are linked directly.

Content structure:

  public/
  ├── 1. Start.md                  # Notes sort naturally: 1, 2, 10
  ├── 2. Intro.md
  ├── 10. Advanced.md
  ├── DIP/                         # Folder → sidebar section
  │   ├── 1. Basics.md
  │   ├── img/diagram.png          # Images are not listed, only linked
  │   └── demo.mp4                 # Videos are listed and playable
  ├── Drafts/                      # Empty folders stay visible
  └── images/                      # Ignored path (see [scan] in config)

Notes may use:
  Formulas:    $x$  \\(x\\)  $$x$$  \\[x\\]
  Image size:  ![Diagram|400x300](img/diagram.png)

Pages are addressed by fragment: '#' or '#about' for the start page,
'#DIP%2F1.%20Basics.md' for a note.

Run 'notesite gen-config' to generate a documented notesite.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site configuration file
    #[arg(long, default_value = "notesite.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the content directory into a navigation document
    Scan {
        /// Content directory
        #[arg(long, default_value = "public")]
        source: PathBuf,

        /// Where to write the navigation document
        #[arg(long, default_value = "tree.json")]
        output: PathBuf,
    },
    /// Render the page for a URL fragment
    Render {
        /// Fragment such as "#about" or "#DIP%2F1.%20Basics.md"
        fragment: String,

        #[command(flatten)]
        site: SiteArgs,

        /// Write the page here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the heading outline of a markdown file
    Toc {
        /// Markdown file
        file: PathBuf,
    },
    /// Report content problems without changing anything
    Check(SiteArgs),
    /// Print a stock notesite.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Scan {
            source,
            output: tree_path,
        } => {
            let site_config = config::load_config(&cli.config)?;
            let tree = scan::scan(&source, &site_config.scan)?;
            scan::write_tree(&tree, &tree_path)?;
            output::print_scan_output(&tree, &tree_path);
        }
        Command::Render {
            fragment,
            site,
            output: page_path,
        } => {
            let site_config = config::load_config(&cli.config)?;
            let index = NavigationIndex::load(&site.tree);
            let pipeline = MarkdownPipeline::new(&site_config);
            let source = DirSource::new(&site.source);

            let mut session = Session::new(index, &site_config);
            session.open(&fragment, &source, &pipeline);
            let html = page::render_page(&session, &site_config).into_string();

            match page_path {
                Some(path) => {
                    write_creating_dirs(&path, &html)?;
                    println!("{}", output::format_render_summary(session.view(), &path));
                }
                None => print!("{html}"),
            }
        }
        Command::Toc { file } => {
            let site_config = config::load_config(&cli.config)?;
            let bytes = fs::read(&file)?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let note = MarkdownPipeline::new(&site_config).render_bytes(&bytes, &name)?;
            output::print_toc_output(&note);
        }
        Command::Check(site) => {
            let index = NavigationIndex::try_load(&site.tree)?;
            let diagnostics = lint::check_index(&index, &DirSource::new(&site.source));
            output::print_check_output(&diagnostics);
            if !diagnostics.is_empty() {
                std::process::exit(1);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn write_creating_dirs(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}
