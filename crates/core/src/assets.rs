use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub enum LoadError {
    Io { path: String, message: String },
    Parse { what: &'static str, message: String },
    Empty { what: &'static str },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, message } => write!(f, "failed to read {path}: {message}"),
            LoadError::Parse { what, message } => write!(f, "{what} parse failed: {message}"),
            LoadError::Empty { what } => write!(f, "{what} has no data"),
        }
    }
}

impl std::error::Error for LoadError {}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|err| LoadError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_path() {
        let err = read_bytes(Path::new("/nonexistent/heatlayer/samples.json"))
            .expect_err("missing file");
        let message = err.to_string();
        assert!(message.contains("/nonexistent/heatlayer/samples.json"));
    }
}
