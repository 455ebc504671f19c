use super::{FinalResult, ResponseGrammar, TransportError};

/// Incremental reply parser for one command exchange.
///
/// Feed it one received line at a time; it answers once a final result code
/// ends the reply. Information lines before the final code form the reply text.
#[derive(Debug)]
pub struct LineParser {
    echo: String,
    lines: Vec<String>,
}

impl LineParser {
    /// Parser for the reply to `command` (sent as `AT{command}`).
    pub fn new(grammar: ResponseGrammar, command: &str) -> Self {
        match grammar {
            ResponseGrammar::V1 => Self {
                echo: format!("AT{command}"),
                lines: Vec::new(),
            },
        }
    }

    /// Consume one line. Returns the outcome once the reply is complete.
    pub fn feed(&mut self, line: &str) -> Option<Result<String, TransportError>> {
        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case(&self.echo) {
            return None;
        }

        match line {
            "OK" => return Some(Ok(self.lines.join("\n"))),
            "ERROR" => return Some(Err(TransportError::Final(FinalResult::Error))),
            "NO CARRIER" => return Some(Err(TransportError::Final(FinalResult::NoCarrier))),
            "BUSY" => return Some(Err(TransportError::Final(FinalResult::Busy))),
            "NO ANSWER" => return Some(Err(TransportError::Final(FinalResult::NoAnswer))),
            "NO DIALTONE" => return Some(Err(TransportError::Final(FinalResult::NoDialtone))),
            _ => {}
        }

        if line.starts_with("CONNECT") {
            return Some(Ok(line.to_owned()));
        }

        if let Some(code) = line
            .strip_prefix("+CME ERROR:")
            .or_else(|| line.strip_prefix("+CMS ERROR:"))
        {
            return Some(Err(TransportError::MobileEquipment(code.trim().to_owned())));
        }

        self.lines.push(line.to_owned());
        None
    }
}
