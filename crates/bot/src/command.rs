use model::report::ReportKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Report(ReportKind),
    Traffic,
    Unknown(String),
}

impl Command {
    /// Parses the leading `/command` of a message. Arguments after the command
    /// and a trailing `@BotName` are ignored. Returns `None` for plain text.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.trim_start().split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name).to_lowercase();
        let command = match name.as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            "roadblock" => Self::Report(ReportKind::Roadblock),
            "hazard" => Self::Report(ReportKind::Hazard),
            "traffic" => Self::Traffic,
            _ => Self::Unknown(name),
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(
            Command::parse("/roadblock"),
            Some(Command::Report(ReportKind::Roadblock))
        );
        assert_eq!(
            Command::parse("  /Hazard big pothole"),
            Some(Command::Report(ReportKind::Hazard))
        );
        assert_eq!(Command::parse("/traffic@DriverBot"), Some(Command::Traffic));
    }

    #[test]
    fn unknown_and_plain_text() {
        assert_eq!(
            Command::parse("/weather"),
            Some(Command::Unknown("weather".to_owned()))
        );
        assert_eq!(Command::parse("hello there"), None);
        assert_eq!(Command::parse(""), None);
    }
}
