//! Blocking read-query-print loop.

use crate::agent::Answerer;
use crate::error::Result;
use std::io::{BufRead, Write};

/// Prompt shown before every read.
pub const PROMPT: &str = "Enter a prompt (q to quit): ";

/// Input that ends the loop. Matched exactly, after removing the line ending.
pub const QUIT: &str = "q";

/// Read prompts from `input` until `q` or end of input, printing each answer.
///
/// Returns the number of prompts answered. Answerer errors end the loop.
pub async fn run_repl<R, W>(mut input: R, mut output: W, answerer: &dyn Answerer) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut answered = 0;

    loop {
        let Some(prompt) = prompt_line(&mut input, &mut output, PROMPT)? else {
            writeln!(output)?;
            break;
        };
        if prompt == QUIT {
            break;
        }

        let answer = answerer.answer(&prompt).await?;
        writeln!(output, "{}", answer)?;
        answered += 1;
    }

    Ok(answered)
}

/// Show `prompt` and read one line without its line ending.
/// Returns `None` at end of input.
pub fn prompt_line<R, W>(input: &mut R, output: &mut W, prompt: &str) -> std::io::Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(strip_line_ending(&line).to_string()))
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
