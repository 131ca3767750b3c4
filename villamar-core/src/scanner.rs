use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::markdown::get_page_title;

#[derive(Debug)]
pub enum ScanError {
    IoError(std::io::Error),
    InvalidPath(PathBuf),
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::IoError(err)
    }
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::IoError(e) => write!(f, "IO error: {}", e),
            ScanError::InvalidPath(p) => write!(f, "Invalid path: {}", p.display()),
        }
    }
}

impl std::error::Error for ScanError {}

/// A static prose page (privacy, cookies, terms) authored as markdown under
/// the content directory and served at `/{slug}`.
#[derive(Debug, Clone)]
pub struct LegalPage {
    pub title: String,
    pub slug: String,
    pub path: PathBuf,
}

pub struct PageScanner {
    content_dir: PathBuf,
}

impl PageScanner {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            content_dir: path.as_ref().to_path_buf(),
        }
    }

    /// Discover every markdown page under the content directory. A missing
    /// directory is an empty site section, not an error.
    pub fn scan(&self) -> Result<Vec<LegalPage>, ScanError> {
        if !self.content_dir.exists() {
            return Ok(Vec::new());
        }

        let mut pages = Vec::new();
        for path in markdown_files(&self.content_dir) {
            let slug = path
                .file_stem()
                .ok_or_else(|| ScanError::InvalidPath(path.clone()))?
                .to_string_lossy()
                .to_lowercase();
            let title = get_page_title(&path);
            pages.push(LegalPage { title, slug, path });
        }
        pages.sort_by(|a, b| a.slug.cmp(&b.slug));

        Ok(pages)
    }
}

fn markdown_files<P: AsRef<Path>>(path: P) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for p in WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|p| {
            p.path().is_file() && p.path().extension().map(|ext| ext == "md").unwrap_or(false)
        })
    {
        paths.push(p.path().to_path_buf());
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_content_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("villamar-scanner-{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_scan_finds_markdown_pages() {
        let dir = temp_content_dir("basic");
        std::fs::write(dir.join("privacy-policy.md"), "# Privacy Policy\n\nBody.").unwrap();
        std::fs::write(dir.join("terms.md"), "# Terms of Use\n\nBody.").unwrap();
        std::fs::write(dir.join("notes.txt"), "not a page").unwrap();

        let pages = PageScanner::new(&dir).scan().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].slug, "privacy-policy");
        assert_eq!(pages[0].title, "Privacy Policy");
        assert_eq!(pages[1].slug, "terms");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let pages = PageScanner::new("definitely/not/here").scan().unwrap();
        assert!(pages.is_empty());
    }
}
