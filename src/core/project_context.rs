//! Short description of the working directory, sent along with every prompt.

use std::fs;
use std::path::Path;

/// Files listed before the listing is cut off.
pub const MAX_LISTED_FILES: usize = 20;

const SKIPPED_DIRS: &[&str] = &["node_modules", "vendor"];

struct Entry {
    name: String,
    is_dir: bool,
}

fn visible_entries(dir: &Path) -> Vec<Entry> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(err) => {
            tracing::debug!(dir = %dir.display(), "cannot list project directory: {err}");
            return Vec::new();
        }
    };

    let mut entries: Vec<Entry> = read_dir
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_str()) {
                return None;
            }
            let is_dir = entry.file_type().map(|kind| kind.is_dir()).unwrap_or(false);
            Some(Entry { name, is_dir })
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

/// Summarize `dir`: its path, up to [`MAX_LISTED_FILES`] files and the
/// top-level layout. Hidden entries are never listed.
pub fn summarize(dir: &Path) -> String {
    let entries = visible_entries(dir);
    let mut summary = format!("Current Directory:\n  {}\n\nProject Files:\n", dir.display());

    let mut files = entries.iter().filter(|entry| !entry.is_dir);
    for entry in files.by_ref().take(MAX_LISTED_FILES) {
        summary.push_str(&format!("  {}\n", entry.name));
    }
    if files.next().is_some() {
        summary.push_str("  ... and more\n");
    }

    summary.push_str("\nDirectory Structure:\n");
    for entry in &entries {
        if entry.is_dir {
            summary.push_str(&format!("  [dir]  {}/\n", entry.name));
        } else {
            summary.push_str(&format!("  [file] {}\n", entry.name));
        }
    }

    summary
}

/// Summary of the process working directory.
pub fn current() -> String {
    match std::env::current_dir() {
        Ok(dir) => summarize(&dir),
        Err(err) => {
            tracing::warn!("cannot determine working directory: {err}");
            String::new()
        }
    }
}

/// Compose the user message sent for one prompt.
pub fn compose_prompt(context: &str, prompt: &str) -> String {
    format!("Project context:\n{context}\n\nUser: {prompt}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn summary_lists_files_and_directories_skipping_hidden() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("Cargo.toml"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();
        fs::write(root.join(".env"), "").unwrap();
        fs::create_dir(root.join("src")).unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::create_dir(root.join("node_modules")).unwrap();
        fs::create_dir(root.join("vendor")).unwrap();

        let summary = summarize(root);

        assert!(summary.starts_with(&format!("Current Directory:\n  {}\n", root.display())));
        assert!(summary.contains("Project Files:\n  Cargo.toml\n  README.md\n"));
        assert!(summary.contains("  [dir]  src/\n"));
        assert!(summary.contains("  [file] Cargo.toml\n"));
        assert!(!summary.contains(".env"));
        assert!(!summary.contains(".git"));
        assert!(!summary.contains("node_modules"));
        assert!(!summary.contains("vendor"));
        assert!(!summary.contains("... and more"));
    }

    #[test]
    fn long_file_listing_is_truncated() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for index in 0..(MAX_LISTED_FILES + 3) {
            fs::write(temp_dir.path().join(format!("file{index:02}.txt")), "").unwrap();
        }

        let summary = summarize(temp_dir.path());
        let files_section = summary
            .split("\nDirectory Structure:\n")
            .next()
            .expect("files section");

        assert!(files_section.contains("file19.txt"));
        assert!(!files_section.contains("file20.txt"));
        assert!(files_section.ends_with("  ... and more\n"));
    }

    #[test]
    fn exactly_the_limit_is_not_truncated() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for index in 0..MAX_LISTED_FILES {
            fs::write(temp_dir.path().join(format!("file{index:02}.txt")), "").unwrap();
        }
        assert!(!summarize(temp_dir.path()).contains("... and more"));
    }

    #[test]
    fn missing_directory_yields_empty_sections() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let summary = summarize(&temp_dir.path().join("gone"));
        assert!(summary.ends_with("Project Files:\n\nDirectory Structure:\n"));
    }

    #[test]
    fn prompt_embeds_context_then_user_text() {
        assert_eq!(
            compose_prompt("ctx", "fix it"),
            "Project context:\nctx\n\nUser: fix it"
        );
    }
}
