//! Discovery document rendering
//!
//! The document is a Tera template registered once at startup. Autoescaping
//! stays on, with an attribute escaper that leaves `/` and braces alone so
//! the prefix reads `domain/name` and the URL placeholders stay literal.

use crate::entry::DiscoveryEntry;
use crate::error::RenderError;
use std::io::Write;
use tera::{Context, Tera};

/// Meta tag name carrying the artifact URL template
pub const DISCOVERY_META: &str = "ac-discovery";

/// Meta tag name carrying the public keys URL
pub const PUBKEYS_META: &str = "ac-discovery-pubkeys";

const TEMPLATE_NAME: &str = "discovery.html";

const DISCOVERY_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="{{ discovery_meta }}" content="{{ prefix_match }} {{ aci_template_url }}">
    <meta name="{{ pubkeys_meta }}" content="{{ prefix_match }} {{ pubkeys_url }}">
  </head>
</html>
"#;

/// Renders discovery documents
pub struct DiscoveryRenderer {
    tera: Tera,
}

impl DiscoveryRenderer {
    /// Register the discovery template.
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, DISCOVERY_TEMPLATE)?;
        tera.set_escape_fn(escape_attr);

        tracing::debug!(template = TEMPLATE_NAME, "Registered discovery template");

        Ok(Self { tera })
    }

    /// Write the discovery document for `entry` into `out`.
    ///
    /// The document is rendered in full before the first write, so a
    /// template failure writes nothing. A sink failure leaves whatever was
    /// already written.
    pub fn render<W: Write>(&self, entry: &DiscoveryEntry, out: &mut W) -> Result<(), RenderError> {
        let body = self.render_to_string(entry)?;
        out.write_all(body.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Render into a fresh buffer.
    pub fn render_to_vec(&self, entry: &DiscoveryEntry) -> Result<Vec<u8>, RenderError> {
        Ok(self.render_to_string(entry)?.into_bytes())
    }

    fn render_to_string(&self, entry: &DiscoveryEntry) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("discovery_meta", DISCOVERY_META);
        context.insert("pubkeys_meta", PUBKEYS_META);
        context.insert("prefix_match", &entry.prefix_match);
        context.insert("aci_template_url", &entry.aci_template_url);
        context.insert("pubkeys_url", &entry.pubkeys_url);

        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn hello_entry() -> DiscoveryEntry {
        DiscoveryEntry::new(
            "example.com",
            "hello",
            "http://example.com/repo/{os}/{arch}/hello-{version}.{ext}",
            "http://example.com/pubkeys.gpg",
        )
    }

    /// Sink that accepts a fixed number of bytes, then fails
    struct BrokenSink {
        remaining: usize,
    }

    impl Write for BrokenSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            let n = buf.len().min(self.remaining);
            self.remaining -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_render_meta_tags() {
        let renderer = DiscoveryRenderer::new().unwrap();
        let body = String::from_utf8(renderer.render_to_vec(&hello_entry()).unwrap()).unwrap();

        assert!(body.starts_with("<!DOCTYPE html>"));
        assert!(body.contains(
            r#"<meta name="ac-discovery" content="example.com/hello http://example.com/repo/{os}/{arch}/hello-{version}.{ext}">"#
        ));
        assert!(body.contains(
            r#"<meta name="ac-discovery-pubkeys" content="example.com/hello http://example.com/pubkeys.gpg">"#
        ));
    }

    #[test]
    fn test_render_escapes_attribute_values() {
        let renderer = DiscoveryRenderer::new().unwrap();
        let entry = DiscoveryEntry::new(
            "example.com",
            "a\"b<c>&'",
            "http://example.com/{os}",
            "http://example.com/pubkeys.gpg",
        );
        let body = String::from_utf8(renderer.render_to_vec(&entry).unwrap()).unwrap();

        assert!(body.contains("example.com/a&quot;b&lt;c&gt;&amp;&#x27;"));
        assert!(!body.contains("a\"b"));
    }

    #[test]
    fn test_render_leaves_slashes_and_placeholders_alone() {
        assert_eq!(escape_attr("http://h/{os}/{arch}"), "http://h/{os}/{arch}");
    }

    #[test]
    fn test_render_writes_to_sink() {
        let renderer = DiscoveryRenderer::new().unwrap();
        let mut out = Vec::new();
        renderer.render(&hello_entry(), &mut out).unwrap();
        assert_eq!(out, renderer.render_to_vec(&hello_entry()).unwrap());
    }

    #[test]
    fn test_render_reports_write_failure() {
        let renderer = DiscoveryRenderer::new().unwrap();
        let mut sink = BrokenSink { remaining: 20 };
        let err = renderer.render(&hello_entry(), &mut sink).unwrap_err();
        assert!(matches!(err, RenderError::Write(ref e) if e.kind() == io::ErrorKind::ConnectionReset));
    }
}
