//! State threaded through every load call.

use scenedoc_api_core::{ErrorCode, ErrorSink, Severity};

use crate::config::Config;
use crate::error::LoadError;
use crate::ids::IdAllocator;

pub struct LoadContext<'a> {
    pub ids: &'a mut IdAllocator,
    pub sink: &'a mut ErrorSink,
    pub config: &'a Config,
    abort: Option<ErrorCode>,
}

impl<'a> LoadContext<'a> {
    pub fn new(ids: &'a mut IdAllocator, sink: &'a mut ErrorSink, config: &'a Config) -> Self {
        Self {
            ids,
            sink,
            config,
            abort: None,
        }
    }

    /// Report and turn a fatal result into `LoadError::Aborted`.
    pub fn report(
        &mut self,
        severity: Severity,
        code: ErrorCode,
        location: &str,
    ) -> Result<(), LoadError> {
        if self.sink.report(severity, code, location) {
            Err(LoadError::Aborted(code))
        } else {
            Ok(())
        }
    }

    /// Report a structural failure at `Error` and hand back `err` unchanged.
    /// A fatal report is held until the owning element calls `take_abort`.
    pub fn fail(&mut self, code: ErrorCode, location: &str, err: LoadError) -> LoadError {
        if self.sink.report(Severity::Error, code, location) {
            self.abort.get_or_insert(code);
        }
        err
    }

    pub fn take_abort(&mut self) -> Option<ErrorCode> {
        self.abort.take()
    }

    pub fn warn(&mut self, code: ErrorCode, location: &str) -> Result<(), LoadError> {
        self.report(Severity::Warning, code, location)
    }

    pub fn error(&mut self, code: ErrorCode, location: &str) -> Result<(), LoadError> {
        self.report(Severity::Error, code, location)
    }

    pub fn debug(&mut self, code: ErrorCode, location: &str) -> Result<(), LoadError> {
        self.report(Severity::Debug, code, location)
    }
}
