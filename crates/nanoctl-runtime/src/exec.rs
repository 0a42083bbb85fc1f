//! Output captured from commands executed inside a container.

/// Combined stdout and stderr of an exec, with stream framing removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    bytes: Vec<u8>,
}

impl ExecOutput {
    /// Wraps raw, already demultiplexed output.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the output as text with surrounding whitespace removed.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).trim().to_string()
    }
}

impl From<&str> for ExecOutput {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_trims_trailing_newline() {
        let out = ExecOutput::from("HEALTH_OK\n");
        assert_eq!(out.text(), "HEALTH_OK");
    }

    #[test]
    fn empty_output_has_empty_text() {
        assert!(ExecOutput::default().as_bytes().is_empty());
        assert_eq!(ExecOutput::default().text(), "");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let out = ExecOutput::new(vec![b'o', b'k', 0xff]);
        assert_eq!(out.text(), "ok\u{fffd}");
    }
}
