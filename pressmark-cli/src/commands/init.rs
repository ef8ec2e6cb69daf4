//! Init command implementation.

use anyhow::{Context, Result};
use include_dir::{include_dir, Dir, DirEntry};
use std::fs;
use std::path::Path;

// Starter config, templates and a sample document
static SCAFFOLD: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/scaffold");

/// Initialize a new pressmark site
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    write_dir(&SCAFFOLD, root)?;

    println!("✓ pressmark initialized in {:?}", root);
    println!("  - Edit pressmark.yml and the templates in src/");
    println!("  - Write documents in writes/, then run `pressmark build`");
    Ok(())
}

/// Write embedded files under `root`, leaving existing files alone
fn write_dir(dir: &Dir<'_>, root: &Path) -> Result<()> {
    for entry in dir.entries() {
        match entry {
            DirEntry::Dir(sub) => {
                let target = root.join(sub.path());
                fs::create_dir_all(&target)
                    .with_context(|| format!("Failed to create {:?}", target))?;
                write_dir(sub, root)?;
            }
            DirEntry::File(file) => {
                let target = root.join(file.path());
                if target.exists() {
                    println!("{:?} already exists, skipping", target);
                    continue;
                }
                fs::write(&target, file.contents())
                    .with_context(|| format!("Failed to write {:?}", target))?;
                println!("Created {:?}", target);
            }
        }
    }
    Ok(())
}
