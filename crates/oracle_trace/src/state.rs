//! Execution state carried through path exploration.

use indexmap::IndexSet;
use oracle_core::RawRecord;
use oracle_model::LogElement;

/// Position in an execution state that a fork can rewind to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    logs: usize,
    calls: usize,
}

/// Logs accumulated so far plus the functions currently being expanded.
///
/// Forking does not copy the state: the tracer takes a [`Checkpoint`],
/// explores one branch in place, captures what it needs and rewinds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionState<'m> {
    logs: Vec<&'m LogElement>,
    call_stack: IndexSet<&'m str>,
}

impl<'m> ExecutionState<'m> {
    /// Create an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs accumulated so far
    #[must_use]
    pub fn logs(&self) -> &[&'m LogElement] {
        &self.logs
    }

    /// Append a log
    pub fn push_log(&mut self, log: &'m LogElement) {
        self.logs.push(log);
    }

    /// Push `function` onto the call stack; false if it is already there
    pub fn enter(&mut self, function: &'m str) -> bool {
        self.call_stack.insert(function)
    }

    /// Pop `function` off the call stack
    pub fn leave(&mut self, function: &str) {
        if self.call_stack.last().is_some_and(|top| *top == function) {
            self.call_stack.pop();
        } else {
            self.call_stack.shift_remove(function);
        }
    }

    /// Whether `function` is being expanded
    #[must_use]
    pub fn is_active(&self, function: &str) -> bool {
        self.call_stack.contains(function)
    }

    /// Functions being expanded, outermost first
    #[must_use]
    pub fn call_stack(&self) -> Vec<&'m str> {
        self.call_stack.iter().copied().collect()
    }

    /// Current position
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            logs: self.logs.len(),
            calls: self.call_stack.len(),
        }
    }

    /// Rewind to `checkpoint`, discarding everything after it
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.logs.truncate(checkpoint.logs);
        self.call_stack.truncate(checkpoint.calls);
    }

    /// Copy of the current logs as a finished path
    #[must_use]
    pub fn snapshot(&self) -> ExecutionPath<'m> {
        ExecutionPath {
            logs: self.logs.clone(),
        }
    }

    /// Consume the state, keeping its logs as a finished path
    #[must_use]
    pub fn into_path(self) -> ExecutionPath<'m> {
        ExecutionPath { logs: self.logs }
    }
}

/// One completed path: the logs emitted along one set of branch choices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionPath<'m> {
    /// Emitted logs in order
    pub logs: Vec<&'m LogElement>,
}

impl<'m> ExecutionPath<'m> {
    /// Number of logs
    #[must_use]
    pub fn len(&self) -> usize {
        self.logs.len()
    }

    /// Whether the path emitted nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Logs in emission order
    pub fn iter(&self) -> impl Iterator<Item = &'m LogElement> + '_ {
        self.logs.iter().copied()
    }

    /// Raw records ready for the trace writer
    #[must_use]
    pub fn raw_records(&self) -> Vec<RawRecord> {
        self.logs.iter().map(|log| log.to_raw()).collect()
    }

    /// Message templates in order; handy for assertions and summaries
    #[must_use]
    pub fn templates(&self) -> Vec<&'m str> {
        self.logs.iter().map(|log| log.message_template.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_core::LogLevel;

    #[test]
    fn test_call_stack_guard() {
        let mut state = ExecutionState::new();
        assert!(state.enter("main"));
        assert!(state.enter("init"));
        assert!(!state.enter("main"));
        assert_eq!(state.call_stack(), vec!["main", "init"]);
        state.leave("init");
        assert!(!state.is_active("init"));
        assert!(state.enter("init"));
    }

    #[test]
    fn test_checkpoint_restore() {
        let a = LogElement::new(LogLevel::Info, "A", "X", "a");
        let b = LogElement::new(LogLevel::Info, "B", "X", "b");
        let mut state = ExecutionState::new();
        state.push_log(&a);
        let mark = state.checkpoint();
        state.enter("branch");
        state.push_log(&b);
        let taken = state.snapshot();
        state.restore(mark);

        assert_eq!(taken.templates(), vec!["a", "b"]);
        assert_eq!(state.logs().len(), 1);
        assert!(!state.is_active("branch"));
        assert_eq!(state.into_path().templates(), vec!["a"]);
    }

    #[test]
    fn test_raw_records() {
        let a = LogElement::new(LogLevel::Warn, "ABS", "SENS", "slip %d");
        let path = ExecutionPath { logs: vec![&a] };
        let raws = path.raw_records();
        assert_eq!(raws[0].level, "WARN");
        assert_eq!(raws[0].message_template, "slip %d");
    }
}
