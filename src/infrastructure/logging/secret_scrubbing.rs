use regex::{Captures, Regex};
use std::sync::LazyLock;

static BEARER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bBearer\s+[a-zA-Z0-9\-_\.=+/]+").expect("valid regex"));

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(api[_-]?key|apikey|token|secret|access[_-]?token)["']?\s*([:=])\s*["']?[a-zA-Z0-9\-_\.]{8,}["']?"#)
        .expect("valid regex")
});

static PASSWORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(password|passwd|pwd)["']?\s*([:=])\s*["']?[^"'\s,&}]+["']?"#)
        .expect("valid regex")
});

static CREDENTIAL_HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(authorization|proxy-authorization|cookie|x-api-key)\s*:\s*.+$")
        .expect("valid regex")
});

static URL_USERINFO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"://[^/\s:@]+:[^/\s@]+@").expect("valid regex"));

/// Redacts credentials from command lines and messages before they are
/// logged or echoed in diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretScrubber;

impl SecretScrubber {
    pub const fn new() -> Self {
        Self
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let scrubbed = BEARER_PATTERN.replace_all(message, "Bearer [TOKEN_REDACTED]");
        let scrubbed = TOKEN_PATTERN.replace_all(&scrubbed, |caps: &Captures| {
            format!("{}{}[REDACTED]", &caps[1], &caps[2])
        });
        let scrubbed = PASSWORD_PATTERN.replace_all(&scrubbed, |caps: &Captures| {
            format!("{}{}[REDACTED]", &caps[1], &caps[2])
        });
        URL_USERINFO_PATTERN
            .replace_all(&scrubbed, "://[REDACTED]@")
            .into_owned()
    }

    /// Scrub an argument vector. Header arguments carrying credentials keep
    /// their name and lose their value.
    pub fn scrub_args(&self, args: &[String]) -> Vec<String> {
        args.iter()
            .map(|arg| {
                CREDENTIAL_HEADER_PATTERN.captures(arg).map_or_else(
                    || self.scrub_message(arg),
                    |caps| format!("{}: [REDACTED]", &caps[1]),
                )
            })
            .collect()
    }

    /// Program and scrubbed arguments joined for display.
    pub fn scrub_command(&self, program: &str, args: &[String]) -> String {
        let mut parts = vec![program.to_string()];
        parts.extend(self.scrub_args(args));
        parts.join(" ")
    }
}
