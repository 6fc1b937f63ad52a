use serde::{Deserialize, Serialize};

/// Knobs shared by the tokenizer and the serializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Recognize `~~strikethrough~~` while tokenizing.
    pub strikethrough: bool,
    pub bullet: char,
    pub fence: String,
    pub thematic_break: String,
    pub emphasis: char,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            strikethrough: true,
            bullet: '-',
            fence: "```".to_string(),
            thematic_break: "---".to_string(),
            emphasis: '*',
        }
    }
}

impl MarkdownOptions {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub(crate) fn parser_options(&self) -> pulldown_cmark::Options {
        let mut options = pulldown_cmark::Options::empty();
        if self.strikethrough {
            options.insert(pulldown_cmark::Options::ENABLE_STRIKETHROUGH);
        }
        options
    }

    pub(crate) fn fence_char(&self) -> char {
        self.fence.chars().next().unwrap_or('`')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let options = MarkdownOptions::from_json_str(r#"{ "bullet": "*" }"#).unwrap();
        assert_eq!(options.bullet, '*');
        assert_eq!(options.fence, "```");
        assert!(options.strikethrough);
    }
}
