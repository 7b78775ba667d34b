//! Inbound email webhook payload

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

#[allow(clippy::expect_used)]
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"')\]]+"#).expect("valid link regex"));

/// Form fields posted by the inbound mail provider.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct InboundEmail {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, rename = "body-plain")]
    pub body_plain: String,
    #[serde(default, rename = "stripped-text")]
    pub stripped_text: String,
}

impl InboundEmail {
    /// Bare lowercase address of the sender (`Name <a@b>` becomes `a@b`).
    #[must_use]
    pub fn sender_address(&self) -> String {
        let sender = self.sender.trim();
        let addr = match (sender.rfind('<'), sender.rfind('>')) {
            (Some(start), Some(end)) if start < end => &sender[start + 1..end],
            _ => sender,
        };
        addr.trim().to_lowercase()
    }

    /// Checks the sender against an allow list (case-insensitive).
    #[must_use]
    pub fn is_from_allowed_sender(&self, allowed: &[String]) -> bool {
        let addr = self.sender_address();
        !addr.is_empty() && allowed.iter().any(|a| a.trim().eq_ignore_ascii_case(&addr))
    }

    /// Preferred text body: the stripped reply when present.
    #[must_use]
    pub fn text(&self) -> &str {
        if self.stripped_text.trim().is_empty() {
            &self.body_plain
        } else {
            &self.stripped_text
        }
    }

    /// All distinct http(s) links in the body, in order of appearance.
    #[must_use]
    pub fn links(&self) -> Vec<String> {
        let mut links: Vec<String> = Vec::new();
        for m in LINK_RE.find_iter(self.text()) {
            let link = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
            if !links.iter().any(|l| l == link) {
                links.push(link.to_owned());
            }
        }
        links
    }
}
