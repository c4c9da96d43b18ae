//! Small shared helpers for terminal prefixes and path display.

use owo_colors::OwoColorize;
use std::path::Path;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if colors_enabled() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn note_prefix() -> String {
    if colors_enabled() {
        "note:".yellow().bold().to_string()
    } else {
        "note:".to_string()
    }
}

/// `path` relative to `base` when possible, for compact report titles.
pub fn display_path(path: &Path, base: &Path) -> String {
    pathdiff::diff_paths(path, base)
        .filter(|rel| !rel.starts_with(".."))
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_path_is_relative_inside_base() {
        let base = Path::new("/work/proj");
        assert_eq!(
            display_path(Path::new("/work/proj/.claude/hooks/a.py"), base),
            ".claude/hooks/a.py"
        );
        assert_eq!(
            display_path(Path::new("/home/me/.claude/settings.json"), base),
            "/home/me/.claude/settings.json"
        );
    }
}
