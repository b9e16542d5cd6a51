// SPDX-License-Identifier: MIT

use anyhow::{Context, bail};
use colored::Colorize;
use flatfs::{FlatFs, prelude::Severity};

use crate::{
    Commands,
    config::Settings,
    utils::{percent, pretty_bytes},
};

fn open(settings: &Settings) -> anyhow::Result<FlatFs> {
    let path = &settings.container;
    if !path.exists() {
        bail!(
            "Container {} does not exist, run `flatctl create` first",
            path.display()
        );
    }
    let fs = match settings.size {
        Some(size) => FlatFs::open(path, size.bytes()),
        None => FlatFs::open_auto(path),
    }
    .with_context(|| format!("Cannot open container {}", path.display()))?;

    let meta = fs.meta();
    crate::log_verbose!(
        "Layout: {} blocks of {} B, fat@{:#x} dir@{:#x} data@{:#x}",
        meta.block_count,
        meta.block_size,
        meta.fat_offset,
        meta.dir_offset,
        meta.data_offset
    );
    Ok(fs)
}

pub fn run(settings: &Settings, command: &Commands) -> anyhow::Result<()> {
    match command {
        Commands::Create { .. } => {
            let size = settings.create_size()?;
            let fs = FlatFs::create(&settings.container, size).with_context(|| {
                format!("Cannot create container {}", settings.container.display())
            })?;
            crate::log_info!(
                "Created {} ({}, {} blocks)",
                fs.path().display(),
                pretty_bytes(size),
                fs.meta().block_count
            );
        }
        Commands::Import { src, name } => {
            let name = match name {
                Some(name) => name.clone(),
                None => src
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_owned)
                    .with_context(|| format!("Cannot derive a name from {}", src.display()))?,
            };
            let fs = open(settings)?;
            let entry = fs
                .import_file(src, &name)
                .with_context(|| format!("Cannot import {} as '{name}'", src.display()))?;
            crate::log_info!(
                "Imported '{}' ({}) into slot {}",
                entry.name,
                pretty_bytes(entry.size as u64),
                entry.slot
            );
        }
        Commands::Export { name, dest } => {
            let fs = open(settings)?;
            let written = fs
                .export_file(name, dest)
                .with_context(|| format!("Cannot export '{name}'"))?;
            crate::log_info!(
                "Exported '{name}' to {} ({})",
                dest.display(),
                pretty_bytes(written as u64)
            );
        }
        Commands::Rename { old, new } => {
            open(settings)?
                .rename(old, new)
                .with_context(|| format!("Cannot rename '{old}' to '{new}'"))?;
            crate::log_info!("Renamed '{old}' to '{new}'");
        }
        Commands::Rm { name } => {
            open(settings)?
                .remove(name)
                .with_context(|| format!("Cannot remove '{name}'"))?;
            crate::log_info!("Removed '{name}'");
        }
        Commands::Protect { name } | Commands::Unprotect { name } => {
            let protect = matches!(command, Commands::Protect { .. });
            open(settings)?
                .set_protected(name, protect)
                .with_context(|| format!("Cannot update protection of '{name}'"))?;
            crate::log_info!(
                "'{name}' is now {}",
                if protect { "protected" } else { "unprotected" }
            );
        }
        Commands::Ls { long } => list(&open(settings)?, *long)?,
        Commands::Df => {
            let (free, total) = open(settings)?.free_space()?;
            crate::log_normal!(
                "free {} of {} ({:.1}% free)",
                pretty_bytes(free),
                pretty_bytes(total),
                percent(free, total)
            );
        }
        Commands::Check => {
            let report = open(settings)?.check()?;
            for f in &report.findings {
                let tag = match f.sev {
                    Severity::Info => {
                        crate::log_verbose!("{:<12} {}", f.code, f.msg);
                        continue;
                    }
                    Severity::Warn => "WARN".yellow(),
                    Severity::Error => "ERR ".red(),
                };
                crate::log_normal!("{tag}: {:<12} {}", f.code, f.msg);
            }
            if report.has_error() {
                bail!(
                    "{} error(s) found in {}",
                    report.count(Severity::Error),
                    settings.container.display()
                );
            }
            crate::log_info!(
                "{} ({} warning(s))",
                "Container OK".green(),
                report.count(Severity::Warn)
            );
        }
    }
    Ok(())
}

fn list(fs: &FlatFs, long: bool) -> anyhow::Result<()> {
    let entries = fs.entries()?;
    if entries.is_empty() {
        crate::log_info!("No files stored");
        return Ok(());
    }

    if !long {
        for e in &entries {
            crate::log_normal!("{}", e.name);
        }
        return Ok(());
    }

    crate::log_normal!(
        "{:>5}  {:>10}  {:>11}  {:<4}  {}",
        "slot",
        "size",
        "first",
        "prot",
        "name"
    );
    for e in &entries {
        let first = if e.is_empty() {
            "-".to_string()
        } else {
            e.first_block.to_string()
        };
        crate::log_normal!(
            "{:>5}  {:>10}  {:>11}  {:<4}  {}",
            e.slot,
            pretty_bytes(e.size as u64),
            first,
            if e.protected { "yes" } else { "no" },
            e.name
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::Size;

    fn settings(dir: &tempfile::TempDir) -> Settings {
        Settings {
            container: dir.path().join("box.flat"),
            size: None,
        }
    }

    #[test]
    fn test_create_import_export_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(&dir);
        let src = dir.path().join("hello.txt");
        let dest = dir.path().join("out.txt");
        std::fs::write(&src, b"hello container").unwrap();

        run(&s, &Commands::Create { size: None }).unwrap();
        run(
            &s,
            &Commands::Import {
                src: src.clone(),
                name: None,
            },
        )
        .unwrap();
        run(
            &s,
            &Commands::Export {
                name: "hello.txt".into(),
                dest: dest.clone(),
            },
        )
        .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello container");

        run(&s, &Commands::Protect { name: "hello.txt".into() }).unwrap();
        assert!(run(&s, &Commands::Rm { name: "hello.txt".into() }).is_err());
        run(&s, &Commands::Unprotect { name: "hello.txt".into() }).unwrap();
        run(&s, &Commands::Rm { name: "hello.txt".into() }).unwrap();
        run(&s, &Commands::Check).unwrap();
    }

    #[test]
    fn test_commands_need_existing_container() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&settings(&dir), &Commands::Df).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_create_rejects_small_size() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings {
            size: Some(Size(1 << 20)),
            ..settings(&dir)
        };
        assert!(run(&s, &Commands::Create { size: None }).is_err());
        assert!(!s.container.exists());
    }

    #[test]
    fn test_configured_size_must_match_header() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings {
            size: Some(Size(8 << 20)),
            ..settings(&dir)
        };
        run(&s, &Commands::Create { size: None }).unwrap();

        let wrong = Settings {
            size: Some(Size(6 << 20)),
            ..settings(&dir)
        };
        assert!(run(&wrong, &Commands::Ls { long: true }).is_err());
        run(&settings(&dir), &Commands::Ls { long: true }).unwrap();
    }
}
