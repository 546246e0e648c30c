use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::error;
use tracing_subscriber::EnvFilter;
use webloft::{config, output};
use webloft::pipeline::{self, BuildError, BuildOptions};

#[derive(Parser)]
#[command(name = "webloft")]
#[command(about = "Static site generator for project portfolios")]
#[command(long_about = "\
Static site generator for project portfolios

The base directory holds the site config and one directory per project.
A template directory describes the output site: every file is copied or
rendered into the output, except names starting with '_'.

Site structure:

  site/
  ├── index.yaml                   # Site config (required, may be empty)
  ├── about.md                     # Referenced via description_file
  ├── robot/
  │   ├── project.yaml             # Marks a project (name = directory name)
  │   ├── photo.png                # Project files → dist/robot/
  │   └── notes.txt
  ├── work/kite/project.yaml       # Projects may be nested
  └── _drafts/                     # '_' and '.' directories are skipped

Field resolution (last wins):
  templates/defaults.yaml → <template>/_defaults.yaml → index.yaml / project.yaml")]
#[command(version)]
struct Cli {
    /// Base directory containing index.yaml
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Template to build with
    #[arg(short, long, default_value = config::DEFAULT_TEMPLATE)]
    template: String,

    /// Remove the output directory and exit
    #[arg(short, long, conflicts_with = "check")]
    delete: bool,

    /// Assemble the site context and print it without writing anything
    #[arg(short, long)]
    check: bool,

    /// Print the checked context as JSON
    #[arg(long, requires = "check")]
    json: bool,

    /// Output directory, relative to the base directory
    #[arg(short, long, default_value = pipeline::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Template library directory (defaults to the bundled templates)
    #[arg(long, env = "WEBLOFT_TEMPLATES")]
    templates_dir: Option<PathBuf>,

    /// Extension of files rendered as templates (repeatable)
    #[arg(short, long = "extension", value_name = "EXT")]
    extensions: Vec<String>,

    /// Log debug output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Write logs to a file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn build_options(&self) -> BuildOptions {
        let mut options = BuildOptions::new(&self.path);
        options.template = self.template.clone();
        options.output = self.output.clone();
        if let Some(dir) = &self.templates_dir {
            options.templates_dir = dir.clone();
        }
        if !self.extensions.is_empty() {
            options.templated_extensions = self.extensions.clone();
        }
        options
    }
}

fn init_logging(cli: &Cli) -> std::io::Result<()> {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<(), BuildError> {
    let options = cli.build_options();

    if cli.delete {
        return pipeline::delete(&options.base_dir, &options.output);
    }

    if cli.check {
        let context = pipeline::check(&options)?;
        if cli.json {
            let json = output::format_context_json(&context).map_err(|e| BuildError::Io {
                path: PathBuf::from("<stdout>"),
                source: e.into(),
            })?;
            println!("{}", json);
        } else {
            output::print_context_output(&context);
        }
        return Ok(());
    }

    let report = pipeline::build(&options)?;
    output::print_build_output(&report.summary, &report.output_dir);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(&cli) {
        eprintln!("webloft: cannot open log file: {err}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(kind = %err.kind(), "{err}");
            ExitCode::FAILURE
        }
    }
}
