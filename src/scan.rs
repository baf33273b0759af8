use crate::errors::DecodeError;
use crate::payment::{decode, ScannedIntent};

/// One pass of the camera over a payment code.
///
/// The scanner reports the same code on every frame it sees; only the first
/// report counts until the session is reset for a re-scan.
#[derive(Debug, Default)]
pub struct ScanSession {
    captured: Option<String>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one scanner callback. Returns `true` if this was the first.
    pub fn on_scan(&mut self, data: &str) -> bool {
        if self.captured.is_some() {
            return false;
        }
        tracing::debug!("Captured {} bytes from scanner", data.len());
        self.captured = Some(data.to_string());
        true
    }

    pub fn is_scanned(&self) -> bool {
        self.captured.is_some()
    }

    pub fn captured(&self) -> Option<&str> {
        self.captured.as_deref()
    }

    /// Decode the captured code, or `None` if nothing was scanned yet.
    pub fn decode(&self) -> Option<Result<ScannedIntent, DecodeError>> {
        self.captured.as_deref().map(decode)
    }

    pub fn reset(&mut self) {
        self.captured = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_first_scan_counts() {
        let mut session = ScanSession::new();
        assert!(session.decode().is_none());

        assert!(session.on_scan("{not json"));
        assert!(!session.on_scan(r#"{"address":"0x0"}"#));
        assert_eq!(session.captured(), Some("{not json"));
        assert!(matches!(session.decode(), Some(Err(DecodeError::Syntax(_)))));

        session.reset();
        assert!(!session.is_scanned());
        assert!(session.on_scan("second"));
        assert_eq!(session.captured(), Some("second"));
    }
}
