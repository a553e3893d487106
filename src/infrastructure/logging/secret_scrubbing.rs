use regex::Regex;
use std::fmt;
use std::sync::{LazyLock, PoisonError, RwLock};

// Classic GitHub tokens: personal, OAuth, user-to-server, server-to-server, refresh.
static GITHUB_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bgh[pousr]_[A-Za-z0-9]{20,}").expect("GitHub token pattern is valid")
});

static FINE_GRAINED_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bgithub_pat_[A-Za-z0-9_]{20,}").expect("fine-grained token pattern is valid")
});

static BEARER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Bearer\s+[A-Za-z0-9\-_\.]+").expect("bearer pattern is valid")
});

/// Removes GitHub credentials from log messages.
///
/// Besides the well-known token shapes, any value registered with
/// [`SecretScrubber::mask`] is replaced verbatim.
#[derive(Default)]
pub struct SecretScrubber {
    masked: RwLock<Vec<String>>,
}

impl SecretScrubber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a literal secret. Blank values are ignored.
    pub fn mask(&self, secret: &str) {
        let secret = secret.trim();
        if secret.is_empty() {
            return;
        }
        let mut masked = self.masked.write().unwrap_or_else(PoisonError::into_inner);
        if !masked.iter().any(|s| s == secret) {
            masked.push(secret.to_string());
        }
    }

    /// Scrub a message of sensitive data
    pub fn scrub(&self, message: &str) -> String {
        let mut scrubbed = {
            let masked = self.masked.read().unwrap_or_else(PoisonError::into_inner);
            masked
                .iter()
                .fold(message.to_string(), |acc, secret| acc.replace(secret.as_str(), "***"))
        };
        scrubbed = BEARER
            .replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]")
            .into_owned();
        scrubbed = FINE_GRAINED_TOKEN
            .replace_all(&scrubbed, "[TOKEN_REDACTED]")
            .into_owned();
        GITHUB_TOKEN
            .replace_all(&scrubbed, "[TOKEN_REDACTED]")
            .into_owned()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish_non_exhaustive()
    }
}
