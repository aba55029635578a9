use regex::Regex;
use std::sync::OnceLock;

fn fqdn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Labels of 1-63 alphanumeric-or-hyphen characters, no leading or
    // trailing hyphen, at least one dot, alphabetic TLD of 2+ characters.
    RE.get_or_init(|| {
        Regex::new(r"^(?i)(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}$").unwrap()
    })
}

/// Whether `domain` is a syntactically valid fully qualified domain name.
pub fn is_valid_fqdn(domain: &str) -> bool {
    domain.len() <= 253 && fqdn_regex().is_match(domain)
}
