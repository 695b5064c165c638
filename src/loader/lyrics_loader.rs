use std::path::Path;

use anyhow::Context;

// Load the lyric sheet from disk. Any UTF-8 text works; "[Section]" lines and
// blank lines are kept for display and skipped by the analyzer.
pub fn load(path: &Path) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("could not read lyrics from {}", path.display()))?;
    // windows line endings would leave a '\r' glued to the last word of a line
    Ok(text.replace("\r\n", "\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_normalizes_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verse.txt");
        std::fs::write(&path, "[Verse 1]\r\nسلام دنیا\r\n").unwrap();
        assert_eq!(load(&path).unwrap(), "[Verse 1]\nسلام دنیا\n");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.txt"));
    }
}
