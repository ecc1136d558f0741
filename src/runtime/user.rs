//! User interaction operations (confirmation and choice prompts).

use anyhow::Result;

use super::RealRuntime;

use std::io::{self, BufRead, Write};

/// Core, testable implementation that reads from any BufRead and writes to any Write.
pub(crate) fn confirm_with_io<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let response = line.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

/// Write a prompt and return the trimmed answer. EOF yields an empty answer.
pub(crate) fn prompt_with_io<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> Result<String> {
    write!(output, "{} ", prompt)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

impl RealRuntime {
    pub(crate) fn confirm_impl(&self, prompt: &str) -> Result<bool> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stdin_lock = stdin.lock();
        confirm_with_io(prompt, &mut stdin_lock, &mut stdout)
    }

    pub(crate) fn prompt_impl(&self, prompt: &str) -> Result<String> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stdin_lock = stdin.lock();
        prompt_with_io(prompt, &mut stdin_lock, &mut stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::{confirm_with_io, prompt_with_io};
    use anyhow::Result;
    use std::io::Cursor;

    #[test]
    fn confirms_yes_and_short_y() -> Result<()> {
        let cases = vec!["y\n", "Y\n", "yes\n", " YES \n", "  y  \n"];
        for case in cases {
            let mut input = Cursor::new(case.as_bytes());
            let mut output = Vec::new();
            let ok = confirm_with_io("Install optional packages?", &mut input, &mut output)?;
            assert!(ok, "expected '{}' to be accepted as yes", case);
            let out = String::from_utf8(output)?;
            assert!(out.contains("Install optional packages? [y/N]"));
        }
        Ok(())
    }

    #[test]
    fn rejects_no_empty_and_eof() -> Result<()> {
        let cases = vec!["n\n", "no\n", "\n", "  \n", "other\n", ""];
        for case in cases {
            let mut input = Cursor::new(case.as_bytes());
            let mut output = Vec::new();
            let ok = confirm_with_io("Install optional packages?", &mut input, &mut output)?;
            assert!(!ok, "expected '{}' to be rejected as no", case);
        }
        Ok(())
    }

    #[test]
    fn prompt_returns_trimmed_answer() -> Result<()> {
        let mut input = Cursor::new(b"  2 \n");
        let mut output = Vec::new();
        let answer = prompt_with_io("Choice [1-2]:", &mut input, &mut output)?;
        assert_eq!(answer, "2");
        assert_eq!(String::from_utf8(output)?, "Choice [1-2]: ");
        Ok(())
    }

    #[test]
    fn prompt_on_eof_is_empty() -> Result<()> {
        let mut input = Cursor::new(b"");
        let mut output = Vec::new();
        assert_eq!(prompt_with_io("Choice:", &mut input, &mut output)?, "");
        Ok(())
    }
}
