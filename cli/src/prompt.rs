//! Interactive count prompt.

use std::io::{self, BufRead, Write};

use tracing::warn;

/// Ask `question` until the operator enters a positive whole number.
///
/// Non-numeric and non-positive answers are re-prompted, never fatal.
/// Returns `Ok(None)` when input ends before a valid answer is given.
pub fn prompt_count<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<Option<u32>> {
    let mut line = String::new();
    loop {
        write!(output, "{question}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let answer = line.trim();
        match answer.parse::<i64>() {
            Ok(n) if n > 0 => match u32::try_from(n) {
                Ok(n) => return Ok(Some(n)),
                Err(_) => {
                    warn!(input = answer, "count out of range");
                    writeln!(output, "Please enter a valid number.")?;
                }
            },
            Ok(_) => {
                warn!(input = answer, "non-positive count entered");
                writeln!(output, "Please enter a positive number.")?;
            }
            Err(_) => {
                warn!(input = answer, "non-numeric count entered");
                writeln!(output, "Please enter a valid number.")?;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::prompt_count;

    const QUESTION: &str = "How many characters would you like to generate? ";

    fn run(input: &str) -> (Option<u32>, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        let n = prompt_count(&mut reader, &mut out, QUESTION).unwrap();
        (n, String::from_utf8(out).unwrap())
    }

    #[test]
    fn valid_answer_is_accepted_first_time() {
        let (n, out) = run("5\n");
        assert_eq!(n, Some(5));
        assert_eq!(out, QUESTION);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(run("  12 \r\n").0, Some(12));
    }

    #[test]
    fn non_positive_answers_are_reprompted() {
        let (n, out) = run("0\n-3\n2\n");
        assert_eq!(n, Some(2));
        assert_eq!(out.matches("Please enter a positive number.").count(), 2);
        assert_eq!(out.matches(QUESTION).count(), 3);
    }

    #[test]
    fn non_numeric_answers_are_reprompted() {
        let (n, out) = run("three\n\n1.5\n4\n");
        assert_eq!(n, Some(4));
        assert_eq!(out.matches("Please enter a valid number.").count(), 3);
    }

    #[test]
    fn end_of_input_yields_none() {
        let (n, out) = run("abc\n");
        assert_eq!(n, None);
        assert!(out.contains("Please enter a valid number."));
    }
}
