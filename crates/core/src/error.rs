use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    ConfigParse(String),
    IoError(std::io::Error),
    InvalidData(String),
    /// Frontmatter block of a document could not be read
    Frontmatter {
        source: PathBuf,
        message: String,
    },
    /// Two documents declare the same `path`
    DuplicatePath {
        path: String,
        first: PathBuf,
        second: PathBuf,
    },
    /// Two planned pages claim the same route
    DuplicateRoute(String),
    InvalidRoute(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigParse(msg) => write!(f, "Configuration parse error: {}", msg),
            Error::IoError(err) => write!(f, "IO error: {}", err),
            Error::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
            Error::Frontmatter { source, message } => {
                write!(f, "Frontmatter error in {}: {}", source.display(), message)
            }
            Error::DuplicatePath {
                path,
                first,
                second,
            } => write!(
                f,
                "Duplicate path '{}' declared by {} and {}",
                path,
                first.display(),
                second.display()
            ),
            Error::DuplicateRoute(route) => {
                write!(f, "More than one page is routed to '{}'", route)
            }
            Error::InvalidRoute(msg) => write!(f, "Invalid route: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
