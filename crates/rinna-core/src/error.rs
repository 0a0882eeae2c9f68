use std::fmt;

/// Machine-readable error codes shared by every rinna crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ItemNotFound,
    CycleDetected,
    InvalidDirection,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ItemNotFound => "E2001",
            Self::CycleDetected => "E2003",
            Self::InvalidDirection => "E2006",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ItemNotFound => "Item not found",
            Self::CycleDetected => "Cycle would be created",
            Self::InvalidDirection => "Invalid dependency direction",
        }
    }

    /// Optional remediation hint that can be surfaced to callers.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ItemNotFound => None,
            Self::CycleDetected => {
                Some("Remove or reverse a dependency link to keep the graph acyclic.")
            }
            Self::InvalidDirection => Some("Use either `incoming` or `outgoing`."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 3] = [
        ErrorCode::ItemNotFound,
        ErrorCode::CycleDetected,
        ErrorCode::InvalidDirection,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let raw = code.code();
            assert_eq!(raw.len(), 5);
            assert!(raw.starts_with('E'));
            assert!(raw.chars().skip(1).all(|c| c.is_ascii_digit()));
            assert_eq!(code.to_string(), raw);
        }
    }
}
