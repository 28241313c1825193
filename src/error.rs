// src/error.rs
// =============================================================================
// The failure categories a build can run into.
//
// Most of the application propagates anyhow::Error with context attached,
// but main() needs to tell a hosting API failure (exit code 1) apart from
// everything else (exit code 2). Those categories live in this enum and
// can be recovered from an anyhow chain with downcast_ref().
//
// Metadata fetch failures are deliberately absent: they never leave the
// page module, the page just falls back to default metadata.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The configuration document, a path, or a redirect entry is unusable
    #[error("configuration error: {0}")]
    Config(String),

    /// The page template could not be parsed
    #[error("template error: {0}")]
    Template(String),

    /// A hosting API answered with a non-2xx status
    #[error("{provider} request failed: HTTP {status}: {body}")]
    Upstream {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response cache error: {0}")]
    Cache(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Exit code main() should use when this error ends the build
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Upstream { .. } => 1,
            _ => 2,
        }
    }
}

/// Finds the exit code for an application error.
///
/// Walks the anyhow chain so an Upstream error wrapped in context still
/// maps to exit code 1.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map(Error::exit_code)
        .unwrap_or(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_upstream_error_exits_with_one() {
        let err = Error::Upstream {
            provider: "CurseForge",
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "CurseForge request failed: HTTP 500: boom");
    }

    #[test]
    fn test_wrapped_upstream_error_keeps_exit_code() {
        let result: Result<(), Error> = Err(Error::Upstream {
            provider: "Modrinth",
            status: 404,
            body: String::new(),
        });
        let err = result.context("Failed to resolve redirect table").unwrap_err();
        assert_eq!(exit_code_for(&err), 1);
    }

    #[test]
    fn test_other_errors_exit_with_two() {
        let err = anyhow::Error::new(Error::Config("missing redirects".to_string()));
        assert_eq!(exit_code_for(&err), 2);

        let plain = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for(&plain), 2);
    }
}
