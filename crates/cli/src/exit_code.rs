// Consistent exit codes for the ghostwrite CLI.
//
//   0 = success
//   1 = general error
//   2 = usage/argument error
//   4 = document not found

use ghostwrite_engine::session::EditorError;
use std::process;

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    NotFound = 4,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(editor_err) = cause.downcast_ref::<EditorError>() {
                return Self::from_editor_error(editor_err);
            }
        }
        Self::Error
    }

    pub fn from_editor_error(err: &EditorError) -> Self {
        match err {
            EditorError::NotFound(_) => Self::NotFound,
            EditorError::EmptyName | EditorError::NameTooLong | EditorError::IdentityRequired => {
                Self::Usage
            }
            EditorError::NoOpenDocument | EditorError::Store(_) => Self::Error,
        }
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code() as u8)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn exit_code_values() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::Error.code(), 1);
        assert_eq!(ExitCode::Usage.code(), 2);
        assert_eq!(ExitCode::NotFound.code(), 4);
    }

    #[test]
    fn not_found_anywhere_in_chain() {
        let err: anyhow::Error = EditorError::NotFound("doc-1".into()).into();
        let err = err.context("failed to open document");
        assert_eq!(ExitCode::from_error(&err), ExitCode::NotFound);
    }

    #[test]
    fn name_problems_are_usage_errors() {
        let result: Result<(), EditorError> = Err(EditorError::EmptyName);
        let err = result.context("set name").unwrap_err();
        assert_eq!(ExitCode::from_error(&err), ExitCode::Usage);
        assert_eq!(ExitCode::from_editor_error(&EditorError::IdentityRequired), ExitCode::Usage);
    }

    #[test]
    fn from_error_generic_is_error() {
        let err = anyhow::anyhow!("something went wrong");
        assert_eq!(ExitCode::from_error(&err), ExitCode::Error);
    }

    #[test]
    fn exit_code_to_process_exit_code() {
        let code: process::ExitCode = ExitCode::NotFound.into();
        let _ = code;
    }
}
