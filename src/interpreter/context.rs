use super::SystemContext;

/// Writes `log` output to standard error.
pub struct StdioContext;

impl SystemContext for StdioContext {
    fn writeln(&mut self, text: &str) {
        eprintln!("{text}");
    }
}

/// Collects `log` output in memory.
#[derive(Debug, Default)]
pub struct BufferedContext {
    buffer: String,
}

impl BufferedContext {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn get_data(&self) -> &str {
        &self.buffer
    }

    pub fn into_data(self) -> String {
        self.buffer
    }
}

impl SystemContext for BufferedContext {
    fn writeln(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }
}

impl<T> SystemContext for &mut T
where
    T: SystemContext + ?Sized,
{
    fn writeln(&mut self, text: &str) {
        (**self).writeln(text);
    }
}
