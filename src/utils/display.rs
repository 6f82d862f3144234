use clap::ValueEnum;

const HEADER: &str = "\x1b[95m";
const OK_BLUE: &str = "\x1b[94m";
const OK_GREEN: &str = "\x1b[92m";
const FAIL: &str = "\x1b[91m";
const BOLD: &str = "\x1b[1m";
const END: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn is_enabled(self) -> bool {
        match self {
            ColorChoice::Auto => supports_color::on(supports_color::Stream::Stdout).is_some(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

/// Wraps text in ANSI styles when colour output is on.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.enabled {
            format!("{}{}{}", style, text, END)
        } else {
            text.to_string()
        }
    }

    pub fn header(&self, text: &str) -> String {
        self.paint(HEADER, text)
    }

    pub fn blue(&self, text: &str) -> String {
        self.paint(OK_BLUE, text)
    }

    pub fn green(&self, text: &str) -> String {
        self.paint(OK_GREEN, text)
    }

    pub fn fail(&self, text: &str) -> String {
        self.paint(FAIL, text)
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    /// `Label: value` line with a bold label.
    pub fn field(&self, label: &str, value: &str) -> String {
        format!("{}: {}", self.bold(label), value)
    }
}

impl Default for Painter {
    fn default() -> Self {
        Self::plain()
    }
}
