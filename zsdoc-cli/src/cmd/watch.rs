use anyhow::Result;
use clap::{ArgMatches, Command};
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use std::{
    path::{Path, PathBuf},
    sync::mpsc,
    time::Duration,
};

use crate::cmd::build::{add_build_args, run};
use crate::config::DocConfig;

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("watch"))
        .about("Build, then rebuild whenever templates, assets or config change")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = DocConfig::load(args)?;
    rebuild(&config);

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| match res {
            Ok(events) => {
                for event in events {
                    let _ = tx.send(event.path);
                }
            }
            Err(e) => tracing::warn!("Watch error: {e:?}"),
        },
    )?;

    for (path, mode) in watched_paths(&config) {
        debouncer.watcher().watch(&path, mode)?;
        tracing::info!(path = %path.display(), "Watching");
    }
    println!("Watching for changes, press Ctrl-C to stop");

    let output_dir = absolute(&config.output());
    while let Ok(first) = rx.recv() {
        // Drain whatever else arrived in the same debounce window
        let changed: Vec<PathBuf> = std::iter::once(first)
            .chain(rx.try_iter())
            .filter(|path| !absolute(path).starts_with(&output_dir))
            .collect();
        if changed.is_empty() {
            continue;
        }
        for path in &changed {
            tracing::info!(path = %path.display(), "Changed");
        }

        // Site map edits take effect without restarting
        match DocConfig::load(args) {
            Ok(config) => rebuild(&config),
            Err(e) => eprintln!("Config error: {e:#}"),
        }
    }

    Ok(())
}

fn rebuild(config: &DocConfig) {
    match run(config) {
        Ok(report) => println!("Site rebuilt: {} pages", report.pages.len()),
        Err(e) => eprintln!("Build error: {e:#}"),
    }
}

fn watched_paths(config: &DocConfig) -> Vec<(PathBuf, RecursiveMode)> {
    let mut paths = vec![
        (config.templates(), RecursiveMode::Recursive),
        (config.data(), RecursiveMode::Recursive),
    ];
    if let Some(content) = config.content() {
        paths.push((content, RecursiveMode::NonRecursive));
    }
    paths.push((config.config_file(), RecursiveMode::NonRecursive));

    paths.into_iter().filter(|(path, _)| path.exists()).collect()
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
