//! `cleanline store` - inspect and maintain the artifact store

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use cleanline_store::store::VerifyResult;
use cleanline_store::Store;

#[derive(Args, Debug)]
pub struct StoreArgs {
    #[command(subcommand)]
    pub action: StoreAction,
}

#[derive(Subcommand, Debug)]
pub enum StoreAction {
    /// List artifact versions
    List,
    /// Remove objects no artifact version refers to
    Gc {
        /// Actually delete (otherwise dry-run)
        #[arg(long)]
        confirm: bool,
    },
    /// Verify content hashes
    Verify {
        /// Specific object hash to verify (default: all)
        hash: Option<String>,
    },
}

pub fn run(args: StoreArgs, dir: &Path) -> Result<()> {
    let store = Store::open(dir)?;
    match args.action {
        StoreAction::List => list(&store),
        StoreAction::Gc { confirm } => gc(&store, confirm),
        StoreAction::Verify { hash } => verify(&store, hash.as_deref()),
    }
}

fn short(hash: &str) -> &str {
    &hash[..std::cmp::min(8, hash.len())]
}

fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

fn list(store: &Store) -> Result<()> {
    let entries = store.list()?;
    if entries.is_empty() {
        eprintln!("No artifacts in {}.", store.base().display());
        return Ok(());
    }

    let mut table = table(&["Artifact", "Version", "Type", "Object", "Files", "Created", "Description"]);
    for entry in &entries {
        table.add_row(vec![
            Cell::new(&entry.name),
            Cell::new(format!("v{}", entry.version)),
            Cell::new(&entry.artifact_type),
            Cell::new(&entry.object),
            Cell::new(entry.file_count),
            Cell::new(&entry.created_at),
            Cell::new(&entry.description),
        ]);
    }

    eprintln!("\n{table}");
    eprintln!("{} versions total in {}", entries.len(), store.base().display());
    Ok(())
}

fn gc(store: &Store, confirm: bool) -> Result<()> {
    if !confirm {
        let unreferenced = store.unreferenced()?;
        if unreferenced.is_empty() {
            eprintln!("No unreferenced objects to remove.");
        } else {
            let mut table = table(&["Object"]);
            for name in &unreferenced {
                table.add_row(vec![Cell::new(name)]);
            }
            eprintln!("\nWould remove {} objects:", unreferenced.len());
            eprintln!("{table}");
            eprintln!("Run with --confirm to actually delete.");
        }
        return Ok(());
    }

    let removed = store.gc()?;
    if removed.is_empty() {
        eprintln!("Nothing to clean up.");
    } else {
        eprintln!("Removed {} objects:", removed.len());
        for name in &removed {
            eprintln!("  {name}");
        }
    }
    Ok(())
}

fn verify(store: &Store, hash: Option<&str>) -> Result<()> {
    if let Some(h) = hash {
        let results = store.verify(h)?;
        if !print_verify_results(h, &results) {
            anyhow::bail!("object {h} failed verification");
        }
        return Ok(());
    }

    let all = store.verify_all()?;
    if all.is_empty() {
        eprintln!("No objects to verify.");
        return Ok(());
    }

    let mut table = table(&["Object", "Files", "Status"]);
    let mut all_ok = true;
    for (h, results) in &all {
        let ok = results.iter().all(|r| r.ok);
        all_ok &= ok;
        let status = if ok {
            Cell::new("OK").fg(Color::Green)
        } else {
            Cell::new("FAIL").fg(Color::Red)
        };
        table.add_row(vec![Cell::new(h), Cell::new(results.len()), status]);
    }
    eprintln!("\n{table}");

    for (h, results) in &all {
        print_mismatches(h, results);
    }

    if !all_ok {
        anyhow::bail!("some objects have integrity issues");
    }
    eprintln!("All objects verified OK.");
    Ok(())
}

fn print_verify_results(hash: &str, results: &[VerifyResult]) -> bool {
    let all_ok = results.iter().all(|r| r.ok);
    let status = if all_ok { "OK" } else { "FAIL" };
    eprintln!("[{status}] {hash} ({} files)", results.len());
    print_mismatches(hash, results);
    all_ok
}

fn print_mismatches(hash: &str, results: &[VerifyResult]) {
    for r in results.iter().filter(|r| !r.ok) {
        eprintln!("  MISMATCH in {hash}: {}", r.path);
        eprintln!("    expected: {}", short(&r.expected));
        eprintln!("    actual:   {}", short(&r.actual));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cleanline_store::Artifact;

    fn seeded(dir: &Path, scratch: &Path) -> Store {
        let store = Store::open(dir).unwrap();
        let raw = scratch.join("sample.csv");
        std::fs::write(&raw, "id,price\n1,50\n").unwrap();
        let mut artifact = Artifact::new("sample.csv", "raw_data", "raw");
        artifact.add_file(&raw);
        store.publish(&artifact, None).unwrap();
        store
    }

    #[test]
    fn short_truncates() {
        assert_eq!(short("0123456789abcdef"), "01234567");
        assert_eq!(short("MISSING"), "MISSING");
    }

    #[test]
    fn verify_all_ok_and_after_tampering() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = seeded(dir.path(), scratch.path());
        assert!(verify(&store, None).is_ok());

        let handle = store.resolve("sample.csv").unwrap();
        let stored = store.object_dir(&handle.object_hash()).join("sample.csv");
        std::fs::write(stored, "tampered").unwrap();
        assert!(verify(&store, None).is_err());
        let object = handle.object_hash();
        assert!(verify(&store, Some(object.as_str())).is_err());
    }

    #[test]
    fn gc_dry_run_keeps_objects() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = seeded(dir.path(), scratch.path());
        std::fs::create_dir_all(store.objects_dir().join("0badf00d")).unwrap();

        gc(&store, false).unwrap();
        assert!(store.objects_dir().join("0badf00d").exists());
        gc(&store, true).unwrap();
        assert!(!store.objects_dir().join("0badf00d").exists());
    }

    #[test]
    fn list_runs_on_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        assert!(list(&store).is_ok());
    }
}
