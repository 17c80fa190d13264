use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use zsdoc_core::{BuildReport, build_site};

use crate::config::DocConfig;

pub fn add_build_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("templates")
                .short('t')
                .long("templates")
                .value_name("DIR")
                .help("Template root with pages/, components/ and partials/ [default: ./template]"),
        )
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .value_name("DIR")
                .help("Static assets copied into the output directory [default: ./data]"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for generated pages [default: ./dist]"),
        )
        .arg(
            Arg::new("content")
                .long("content")
                .value_name("FILE")
                .help("Documentation content JSON for doc_content and doc_glossary"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file [default: ./zsdoc.toml]"),
        )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build")).about("Render every documentation page once")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = DocConfig::load(args)?;

    let report = run(&config)?;

    println!(
        "Built {} pages and copied {} assets into {}",
        report.pages.len(),
        report.assets,
        config.output().display()
    );

    Ok(())
}

/// Builds the site described by `config`.
pub fn run(config: &DocConfig) -> Result<BuildReport> {
    let data = config.data();
    let content = config.content();

    let report = build_site(
        &config.site,
        &config.templates(),
        Some(data.as_path()),
        &config.output(),
        content.as_deref(),
    )?;

    Ok(report)
}
