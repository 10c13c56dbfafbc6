use std::collections::VecDeque;

/// Where `GetText` reads its lines from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputSource {
    #[default]
    Stdin,
    /// Pre-recorded lines, consumed front to back. Exhaustion reads as end of
    /// input.
    Scripted(VecDeque<String>),
}

impl InputSource {
    pub fn scripted<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        InputSource::Scripted(lines.into_iter().map(Into::into).collect())
    }
}

/// Settings for one interpreter instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Mirror program output to stdout and error messages to stderr. Both are
    /// recorded in memory either way.
    pub echo: bool,
    pub input: InputSource,
    /// Extension given to script paths that have none, dot included.
    pub extension: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            echo: true,
            input: InputSource::Stdin,
            extension: ".cat".to_string(),
        }
    }
}

impl Options {
    /// A silent configuration with scripted input, for embedding and tests.
    pub fn captured(input: InputSource) -> Self {
        Self {
            echo: false,
            input,
            ..Self::default()
        }
    }

    /// Builder-style override of the script extension. A missing leading dot
    /// is added.
    pub fn with_extension(mut self, ext: &str) -> Self {
        self.extension = if ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{}", ext)
        };
        self
    }
}
