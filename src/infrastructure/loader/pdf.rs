use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::{DomainError, Page, SourceDocument};
use crate::infrastructure::config::IngestionConfig;

/// Result of scanning the ingestion tree. Unreadable files are reported,
/// not fatal; the rest of the batch loads normally.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub documents: Vec<SourceDocument>,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Loads PDF manuals from a root directory whose immediate subdirectories
/// name the domain each manual belongs to.
pub struct PdfLoader {
    root: PathBuf,
    scaffold_domains: Vec<String>,
}

impl PdfLoader {
    pub fn new(config: &IngestionConfig) -> Self {
        Self {
            root: config.root.clone(),
            scaffold_domains: config.scaffold_domains.clone(),
        }
    }

    /// Scans every domain directory and extracts per-page text from each PDF.
    ///
    /// A missing root is the expected first-run state: the directory layout
    /// is created and `SetupRequired` returned so the caller can tell the
    /// user where to put their documents.
    pub fn load_all(&self) -> Result<LoadOutcome, DomainError> {
        if !self.root.is_dir() {
            self.scaffold()?;
            return Err(DomainError::setup_required(format!(
                "created {}; place your PDF manuals in its domain folders and re-run ingestion",
                self.root.display()
            )));
        }

        let mut outcome = LoadOutcome::default();

        for domain_dir in self.domain_dirs()? {
            let domain = domain_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            for path in pdf_files(&domain_dir) {
                match load_pdf(&path, &domain) {
                    Ok(doc) => {
                        debug!(path = %path.display(), domain, pages = doc.pages.len(), "loaded document");
                        outcome.documents.push(doc);
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unreadable document");
                        outcome.skipped.push(SkippedFile {
                            path: path.display().to_string(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        Ok(outcome)
    }

    fn domain_dirs(&self) -> Result<Vec<PathBuf>, DomainError> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            DomainError::load(self.root.display().to_string(), e.to_string())
        })?;

        let mut dirs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();
        Ok(dirs)
    }

    fn scaffold(&self) -> Result<(), DomainError> {
        for domain in &self.scaffold_domains {
            fs::create_dir_all(self.root.join(domain)).map_err(|e| {
                DomainError::internal(format!(
                    "cannot create ingestion layout under {}: {e}",
                    self.root.display()
                ))
            })?;
        }
        Ok(())
    }
}

fn pdf_files(domain_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(domain_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    files.sort();
    files
}

/// One `Page` per physical page, in page order.
fn load_pdf(path: &Path, domain: &str) -> Result<SourceDocument, DomainError> {
    let display = path.display().to_string();
    let pdf = lopdf::Document::load(path).map_err(|e| DomainError::load(&display, e.to_string()))?;

    let mut pages = Vec::new();
    for &number in pdf.get_pages().keys() {
        let text = pdf
            .extract_text(&[number])
            .map_err(|e| DomainError::load(&display, format!("page {number}: {e}")))?;
        pages.push(Page::new(number as usize, text));
    }

    Ok(SourceDocument::new(path, domain).with_pages(pages))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader_for(root: &Path) -> PdfLoader {
        PdfLoader::new(&IngestionConfig {
            root: root.to_path_buf(),
            scaffold_domains: vec!["automotive".to_string(), "finance".to_string()],
        })
    }

    #[test]
    fn missing_root_scaffolds_and_signals_setup() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("data_vault");

        let result = loader_for(&root).load_all();

        assert!(matches!(result, Err(DomainError::SetupRequired(_))));
        assert!(root.join("automotive").is_dir());
        assert!(root.join("finance").is_dir());
    }

    #[test]
    fn empty_root_loads_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("automotive")).unwrap();

        let outcome = loader_for(tmp.path()).load_all().unwrap();

        assert!(outcome.documents.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn corrupt_pdf_is_skipped_and_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let domain = tmp.path().join("automotive");
        fs::create_dir_all(&domain).unwrap();
        fs::write(domain.join("broken.pdf"), b"not a pdf at all").unwrap();
        fs::write(domain.join("notes.txt"), b"ignored entirely").unwrap();

        let outcome = loader_for(tmp.path()).load_all().unwrap();

        assert!(outcome.documents.is_empty());
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].path.ends_with("broken.pdf"));
    }
}
