/// How a command prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Colored rows for people
    Tty,
    /// Pretty JSON with the API's field names
    Json,
}

impl OutputMode {
    /// `--json` picks JSON; everything else is human output, piped or not.
    pub fn from_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Tty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_flag_selects_json() {
        assert_eq!(OutputMode::from_flag(true), OutputMode::Json);
        assert_eq!(OutputMode::from_flag(false), OutputMode::Tty);
    }
}
