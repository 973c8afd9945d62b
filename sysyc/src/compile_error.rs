//! Front-end error taxonomy (`spec.md` §7: *Semantic* errors).
//!
//! Internal/impossible states (an unknown IR instruction kind reaching the
//! RISC-V emitter) are not represented here — they are `unreachable!()`
//! assertions at the point they're discovered, matching the teacher's
//! treatment of "must be impossible" states as hard failures rather than
//! recoverable `Result`s.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("unresolved identifier '{0}'")]
    UnresolvedIdent(String),

    #[error("'{0}' is not a compile-time constant")]
    NotConstant(String),

    #[error("'break' outside of a loop")]
    BreakOutsideLoop,

    #[error("'continue' outside of a loop")]
    ContinueOutsideLoop,

    #[error("'{0}' is not an array or has too many indices")]
    NotIndexable(String),

    #[error("'{0}' is not callable")]
    NotCallable(String),

    #[error("call to '{name}' passes {got} argument(s), expected {expected}")]
    ArgCountMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("redefinition of '{0}' in the same scope")]
    Redefinition(String),

    #[error("'{0}' is not a variable")]
    NotAVariable(String),

    #[error("array dimension must be a non-negative constant, got {0}")]
    InvalidArrayDimension(i32),

    #[error("a program must define an 'int main()' or 'void main()' function")]
    MissingMain,

    #[error("syntax error: {0}")]
    InvalidSyntax(String),
}

pub type Result<T> = std::result::Result<T, CompileError>;
