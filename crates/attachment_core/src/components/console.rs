//! Scripted terminal stand-ins registered under `console/*`.
//!
//! Output is captured in memory and input answers are fixed, so CLI-facing
//! code can run inside tests without a TTY.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleSystem {
    pub ansi_support: bool,
    pub width: u16,
}

impl Default for ConsoleSystem {
    fn default() -> Self {
        Self {
            ansi_support: true,
            width: 80,
        }
    }
}

/// In-memory output buffer.
#[derive(Debug, Default)]
pub struct ConsoleOutput {
    lines: RefCell<Vec<String>>,
    same_line: Cell<bool>,
}

impl ConsoleOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next write append to the last line.
    pub fn same_line(&self) -> &Self {
        self.same_line.set(true);
        self
    }

    pub fn write(&self, text: &str) {
        let mut lines = self.lines.borrow_mut();
        if self.same_line.replace(false) {
            if let Some(last) = lines.last_mut() {
                last.push_str(text);
                return;
            }
        }
        lines.push(text.to_string());
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

/// Input source answering every prompt with a fixed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleReader {
    line: String,
    char: String,
    multi_line: String,
}

impl Default for ConsoleReader {
    fn default() -> Self {
        Self {
            line: "line".to_string(),
            char: "char".to_string(),
            multi_line: "multiLine".to_string(),
        }
    }
}

impl ConsoleReader {
    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn char(&self) -> &str {
        &self.char
    }

    pub fn multi_line(&self) -> &str {
        &self.multi_line
    }
}

#[derive(Debug)]
pub struct ConsoleUtil {
    system: Rc<ConsoleSystem>,
}

impl ConsoleUtil {
    pub fn new(system: Rc<ConsoleSystem>) -> Self {
        Self { system }
    }

    pub fn system(&self) -> &Rc<ConsoleSystem> {
        &self.system
    }

    pub fn width(&self) -> u16 {
        self.system.width
    }

    pub fn has_ansi_support(&self) -> bool {
        self.system.ansi_support
    }
}

/// Console facade registered under `console`.
#[derive(Debug)]
pub struct Console {
    output: Rc<ConsoleOutput>,
    util: Rc<ConsoleUtil>,
    reader: Rc<ConsoleReader>,
}

impl Console {
    pub fn new(
        output: Rc<ConsoleOutput>,
        util: Rc<ConsoleUtil>,
        reader: Rc<ConsoleReader>,
    ) -> Self {
        Self {
            output,
            util,
            reader,
        }
    }

    pub fn out(&self, text: &str) {
        self.output.write(text);
    }

    /// Writes a full-width separator.
    pub fn border(&self, character: char) {
        let width = usize::from(self.util.width());
        self.output.write(&character.to_string().repeat(width));
    }

    pub fn prompt(&self, question: &str) -> String {
        self.output.write(question);
        self.reader.line().to_string()
    }

    pub fn output(&self) -> &ConsoleOutput {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::{Console, ConsoleOutput, ConsoleReader, ConsoleSystem, ConsoleUtil};
    use std::rc::Rc;

    #[test]
    fn captures_output_and_answers_prompts() {
        let console = Console::new(
            Rc::new(ConsoleOutput::new()),
            Rc::new(ConsoleUtil::new(Rc::new(ConsoleSystem::default()))),
            Rc::new(ConsoleReader::default()),
        );

        console.out("Attachments:");
        console.output().same_line().write(" 3");
        console.border('-');
        assert_eq!(console.prompt("Continue?"), "line");

        let lines = console.output().lines();
        assert_eq!(lines[0], "Attachments: 3");
        assert_eq!(lines[1].len(), 80);
        assert_eq!(lines[2], "Continue?");
    }
}
