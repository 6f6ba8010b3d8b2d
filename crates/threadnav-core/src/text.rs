/// Truncation rules for entry titles and collapsed-dot previews.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextLimits {
    /// Counted in `char`s; an emoji counts once.
    pub max_chars: usize,
    pub ellipsis: String,
    pub placeholder: String,
}

impl Default for TextLimits {
    fn default() -> Self {
        Self {
            max_chars: 140,
            ellipsis: "...".to_string(),
            placeholder: "(empty)".to_string(),
        }
    }
}

/// Text shown for one message in the list and in the collapsed preview.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DisplayText {
    pub title: String,
    pub preview: String,
}

impl DisplayText {
    /// Builds display text from already normalized message text.
    pub fn from_text(text: &str, limits: &TextLimits) -> Self {
        let title = if text.is_empty() {
            limits.placeholder.clone()
        } else {
            match text.char_indices().nth(limits.max_chars) {
                Some((cut, _)) => format!("{}{}", &text[..cut], limits.ellipsis),
                None => text.to_string(),
            }
        };
        Self {
            preview: title.clone(),
            title,
        }
    }
}
