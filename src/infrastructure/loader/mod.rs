mod pdf;

pub use pdf::{LoadOutcome, PdfLoader, SkippedFile};
