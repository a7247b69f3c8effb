//! GitHub Actions workflow commands for reporting the run result.

use std::io::Write;

/// Escapes a message for use as workflow command data.
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// The `::error::` command marking the run as failed with `message`.
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// Writes the failure annotation to stdout, where the runner reads commands.
pub fn annotate_failure(message: &str) {
    let mut stdout = std::io::stdout().lock();
    // Nothing sensible to do if stdout is gone; the exit code still fails the run.
    let _ = writeln!(stdout, "{}", error_command(message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiline_messages_stay_on_one_command_line() {
        assert_eq!(
            error_command("GitHub returned 403:\nforbidden (100%)"),
            "::error::GitHub returned 403:%0Aforbidden (100%25)"
        );
    }
}
