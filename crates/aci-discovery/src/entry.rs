//! Discovery entry

/// The values rendered into one discovery document.
///
/// Built fresh for every discovery request and dropped once rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryEntry {
    /// `{domain}/{image}` exactly as the client asked for it
    pub prefix_match: String,

    /// Artifact URL with literal `{os}`, `{arch}`, `{version}` and `{ext}` placeholders
    pub aci_template_url: String,

    /// Absolute URL of the public key bundle
    pub pubkeys_url: String,
}

impl DiscoveryEntry {
    /// Build an entry for `name` served under `domain`.
    pub fn new(
        domain: &str,
        name: &str,
        aci_template_url: impl Into<String>,
        pubkeys_url: impl Into<String>,
    ) -> Self {
        Self {
            prefix_match: format!("{}/{}", domain, name),
            aci_template_url: aci_template_url.into(),
            pubkeys_url: pubkeys_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match_joins_domain_and_name() {
        let entry = DiscoveryEntry::new(
            "example.com",
            "hello",
            "http://example.com/repo/{os}/{arch}/hello-{version}.{ext}",
            "http://example.com/pubkeys.gpg",
        );
        assert_eq!(entry.prefix_match, "example.com/hello");
    }
}
