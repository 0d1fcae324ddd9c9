use crate::Color;

const SUCCESS_COLOR: Color = Color::rgba(0x28, 0xA7, 0x45, 255);
const ERROR_COLOR: Color = Color::rgba(0xDC, 0x35, 0x45, 255);

/// Whether a status message reports a normal outcome or an error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatusKind {
    /// Progress or success.
    Success,
    /// Something went wrong.
    Error,
}

/// The single human-readable status line shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    text: String,
    kind: StatusKind,
}

impl StatusMessage {
    /// Creates a success message.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
        }
    }

    /// Creates an error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }

    /// Message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Message kind.
    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    /// Returns true for error messages.
    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }

    /// Color the message is displayed with.
    pub fn color(&self) -> Color {
        match self.kind {
            StatusKind::Success => SUCCESS_COLOR,
            StatusKind::Error => ERROR_COLOR,
        }
    }
}

impl Default for StatusMessage {
    fn default() -> Self {
        Self::success("Click on the map to place a depot")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_depot_prompt() {
        let status = StatusMessage::default();

        assert_eq!(status.text(), "Click on the map to place a depot");
        assert_eq!(status.kind(), StatusKind::Success);
        assert!(!status.is_error());
    }

    #[test]
    fn success_is_green() {
        let status = StatusMessage::success("Solved! 2 routes found.");

        assert_eq!(status.color().to_hex(), "#28A745");
        assert!(!status.is_error());
    }

    #[test]
    fn error_is_red() {
        let status = StatusMessage::error("Error: no depot");

        assert_eq!(status.color().to_hex(), "#DC3545");
        assert_eq!(status.kind(), StatusKind::Error);
        assert!(status.is_error());
        assert_eq!(status.text(), "Error: no depot");
    }
}
