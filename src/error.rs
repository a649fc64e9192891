use std::fmt;

/// Bail out of the current function with a [`DexError`].
#[macro_export]
macro_rules! fail {
    ($msg:literal) => {
        return Err($crate::error::DexError::new($msg))
    };
    ($fmtstr:literal, $($args:tt)*) => {
        return Err($crate::error::DexError::new(&format!($fmtstr, $($args)*)))
    };
}

/// Build a [`DexError`] without returning.
macro_rules! err {
    ($msg:literal) => {
        $crate::error::DexError::new($msg)
    };
    ($fmtstr:literal, $($args:tt)*) => {
        $crate::error::DexError::new(&format!($fmtstr, $($args)*))
    };
}

/// Error raised while decoding a DEX image.
///
/// Carries the original message plus a chain of contexts pushed while the
/// error bubbles out of the per-class pipeline (method signature, code
/// offset, class index), so a failure deep in an instruction stream still
/// names the class and method it happened in.
#[derive(Debug, PartialEq, Eq)]
pub struct DexError
{
    msg: String,
    contexts: Vec<String>,
}

impl DexError
{
    pub(crate) fn new(msg: &str) -> Self
    {
        DexError {
            msg: msg.to_string(),
            contexts: Vec::new(),
        }
    }

    /// Push one more layer of context onto the error.
    pub(crate) fn context(mut self, context: String) -> Self
    {
        self.contexts.push(context);
        self
    }
}

impl fmt::Display for DexError
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.msg)?;
        for context in &self.contexts
        {
            write!(f, ", {}", context)?;
        }
        Ok(())
    }
}

impl std::error::Error for DexError {}
