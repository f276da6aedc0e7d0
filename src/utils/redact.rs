use regex::Regex;
use url::Url;

/// Scrubs the upstream password out of anything that may reach a caller or a log line.
///
/// The `/password/<segment>` of an upstream URL is always masked. Elsewhere the password
/// is masked only when it is long enough not to collide with ordinary text, so a
/// password of `1` leaves `status 401` alone.
#[derive(Debug, Clone)]
pub struct CredentialRedactor {
    needles: Vec<String>,
    segment: Option<Regex>,
    mask_bare: bool,
}

pub const MASK: &str = "***";
const MIN_BARE_LEN: usize = 4;

impl CredentialRedactor {
    pub fn new(password: &str) -> Self {
        let mut needles = Vec::new();
        if !password.is_empty() {
            needles.push(password.to_string());
            if let Some(encoded) = path_encoded(password).filter(|e| e != password) {
                needles.push(encoded);
            }
        }

        let segment = if needles.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = needles.iter().map(|n| regex::escape(n)).collect();
            Regex::new(&format!(
                r#"/password/(?:{})(?P<end>[/?#\s"']|$)"#,
                alternatives.join("|")
            ))
            .ok()
        };

        Self {
            needles,
            segment,
            mask_bare: password.chars().count() >= MIN_BARE_LEN,
        }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut redacted = match &self.segment {
            Some(re) => re
                .replace_all(text, format!("/password/{}$end", MASK).as_str())
                .into_owned(),
            None => text.to_string(),
        };

        if self.mask_bare {
            for needle in &self.needles {
                redacted = redacted.replace(needle.as_str(), MASK);
            }
        }
        redacted
    }
}

// Same encoding the dispatcher applies to the password path segment.
fn path_encoded(secret: &str) -> Option<String> {
    let mut url = Url::parse("http://redact.invalid/").ok()?;
    url.path_segments_mut().ok()?.clear().push(secret);
    Some(url.path().trim_start_matches('/').to_string())
}

/// First three characters followed by the mask, as shown in diagnostics.
pub fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(3).collect();
    format!("{}{}", prefix, MASK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_plain_and_encoded_password() {
        let redactor = CredentialRedactor::new("p@ss word");
        let text = "url /password/p@ss word and /password/p@ss%20word";
        assert_eq!(redactor.redact(text), "url /password/*** and /password/***");
    }

    #[test]
    fn test_short_password_only_masked_in_url_segment() {
        let redactor = CredentialRedactor::new("1");
        assert_eq!(
            redactor.redact("Upstream returned status 401"),
            "Upstream returned status 401"
        );
        assert_eq!(
            redactor.redact("https://h/api/username/demo/password/1 failed"),
            "https://h/api/username/demo/password/*** failed"
        );
        assert_eq!(redactor.redact("/password/1"), "/password/***");
    }

    #[test]
    fn test_empty_password_is_noop() {
        let redactor = CredentialRedactor::new("");
        assert_eq!(redactor.redact("nothing to hide"), "nothing to hide");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("yzBTM83FKn"), "yzB***");
        assert_eq!(mask_secret("ab"), "ab***");
    }
}
