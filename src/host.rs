use std::io::{self, BufRead, Write};

use crate::config::{InputSource, Options};
use crate::error::ScriptError;

/// Everything a running program touches outside its own frames: the output
/// sink, the input source, recorded error messages and the used-stack.
///
/// Output is always captured in memory. With `echo` on it is also written to
/// stdout as it is produced, and error messages go to stderr.
#[derive(Debug)]
pub struct Host {
    output: String,
    diagnostics: Vec<String>,
    echo: bool,
    input: InputSource,
    used_stack: Vec<String>,
}

impl Host {
    pub fn new(options: &Options) -> Self {
        Self {
            output: String::new(),
            diagnostics: Vec::new(),
            echo: options.echo,
            input: options.input.clone(),
            used_stack: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    pub fn write(&mut self, text: &str) {
        self.output.push_str(text);
        if self.echo {
            let mut stdout = io::stdout().lock();
            let _ = stdout.write_all(text.as_bytes());
            let _ = stdout.flush();
        }
    }

    /// Record an error message. Called once per failing frame.
    pub fn report(&mut self, err: &ScriptError) {
        let message = err.to_string();
        if self.echo {
            eprintln!("{}", message);
        }
        self.diagnostics.push(message);
    }

    /// Everything written so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Error messages in the order they were reported.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// One line of input without its line terminator; `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        match &mut self.input {
            InputSource::Scripted(lines) => Ok(lines.pop_front()),
            InputSource::Stdin => {
                let mut line = String::new();
                if io::stdin().lock().read_line(&mut line)? == 0 {
                    return Ok(None);
                }
                let trimmed = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(trimmed);
                Ok(Some(line))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Used-stack
    // -----------------------------------------------------------------------

    pub(crate) fn enter(&mut self, name: &str) {
        self.used_stack.push(name.to_string());
    }

    pub(crate) fn leave(&mut self) {
        self.used_stack.pop();
    }

    /// True while no user function is executing.
    pub fn is_main(&self) -> bool {
        self.used_stack.is_empty()
    }

    pub fn call_depth(&self) -> usize {
        self.used_stack.len()
    }
}
