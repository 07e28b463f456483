use crate::classifier::Classification;
use crate::config::ReplyConfig;
use crate::domain::ResolvedMedia;

const HEADER: &str = "**Mirrors/Alternate Angles**";

#[derive(Debug, Clone)]
pub struct ReplyTemplates {
    footer: String,
}

impl Default for ReplyTemplates {
    fn default() -> Self {
        Self::new(&ReplyConfig::default())
    }
}

impl ReplyTemplates {
    pub fn new(config: &ReplyConfig) -> Self {
        Self {
            footer: config.footer.clone(),
        }
    }

    /// Reply body for media resolved under `kind`.
    ///
    /// Without a URL only the header and footer are rendered.
    pub fn render(&self, kind: Classification, media: &ResolvedMedia) -> String {
        match media.url.as_deref() {
            Some(url) => {
                let label = media
                    .title
                    .as_deref()
                    .filter(|t| !t.trim().is_empty())
                    .map(escape_label)
                    .unwrap_or_else(|| default_label(kind).to_string());
                format!("{}\n\n[{}]({})\n\n\n{}", HEADER, label, url, self.footer)
            }
            None => format!("{}\n\n\n{}", HEADER, self.footer),
        }
    }
}

fn default_label(kind: Classification) -> &'static str {
    match kind {
        Classification::DirectVideo => "Direct link",
        Classification::MicroblogLink => "Streamable link",
        Classification::HostedVideoLink => "Mirror",
    }
}

/// Square brackets would end the markdown link text early
fn escape_label(title: &str) -> String {
    title.replace('[', "\\[").replace(']', "\\]")
}
