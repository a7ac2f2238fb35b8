use thiserror::Error;

/// Failures that stop a run outright. Everything line- or entry-level is logged and skipped
/// instead; see the scanners in `itp`, and `merge::merge_section`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse force field XML: {0}")]
    XmlParse(#[from] xmltree::ParseError),

    #[error("failed to write force field XML: {0}")]
    XmlWrite(#[from] xmltree::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
