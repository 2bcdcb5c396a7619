use anyhow::{Context, Result};
use blotter::build::build_site;
use blotter::config::{Config, PROJECT_FILE};
use blotter::new_post::{create_post, NewPost};
use chrono::Local;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::path::Path;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let root = Arg::with_name("root")
        .long("root")
        .value_name("DIR")
        .takes_value(true)
        .help("The project directory (defaults to the nearest directory containing blog.yaml)");

    let matches = App::new("blotter")
        .about("A static site generator for a Markdown blog")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Builds the site into the output directory")
                .arg(root.clone()),
        )
        .subcommand(
            SubCommand::with_name("new")
                .about("Creates a new post source file")
                .arg(
                    Arg::with_name("TITLE")
                        .help("The title of the new post")
                        .required(true)
                        .index(1),
                )
                .arg(root),
        )
        .get_matches();

    match matches.subcommand() {
        ("build", Some(matches)) => build(matches),
        ("new", Some(matches)) => new(matches),
        _ => unreachable!("a subcommand is required"),
    }
}

fn build(matches: &ArgMatches) -> Result<()> {
    let config = config(matches)?;
    let output = build_site(&config).context("Building site")?;
    println!("Built site into {}", output.display());
    Ok(())
}

fn new(matches: &ArgMatches) -> Result<()> {
    let config = config(matches)?;
    // required by clap
    let title = matches.value_of("TITLE").unwrap_or_default();
    let today = Local::now().naive_local().date();
    match create_post(&config.content_directory, title, today)
        .context("Creating post")?
    {
        NewPost::Created(path) => println!("Created: {}", path.display()),
        NewPost::Exists(path) => println!("File already exists: {}", path.display()),
    }
    Ok(())
}

/// Resolves the project configuration from `--root` if it was passed, and
/// otherwise from the working directory and its ancestors.
fn config(matches: &ArgMatches) -> Result<Config> {
    match matches.value_of_os("root") {
        Some(root) => {
            let root = Path::new(root);
            let project_file = root.join(PROJECT_FILE);
            match project_file.is_file() {
                true => Config::from_project_file(&project_file),
                false => Ok(Config::with_root(root)),
            }
        }
        None => {
            let cwd = std::env::current_dir().context("Getting working directory")?;
            Config::from_directory(&cwd)
        }
    }
}
