//! `mcwatch classify` — offline classification of log lines from stdin.

use std::io::{BufRead, Write};

use mcwatch_core::LogPatterns;

use crate::cli::{ClassifyOpts, OutputFormat};
use crate::output::render_event;

pub fn cmd_classify(opts: &ClassifyOpts) -> anyhow::Result<()> {
    let patterns = opts.patterns.build()?;
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    let matched = classify_lines(stdin.lock(), &mut stdout, &patterns, opts.format)?;
    tracing::debug!(matched, "classified stdin");
    Ok(())
}

/// Classify every line of `input`, writing one rendered event per match.
/// Returns the number of events written.
pub(crate) fn classify_lines<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    patterns: &LogPatterns,
    format: OutputFormat,
) -> anyhow::Result<usize> {
    let mut matched = 0;
    for line in input.lines() {
        let line = line?;
        if let Some(event) = patterns.classify(&line) {
            writeln!(out, "{}", render_event(&event, format)?)?;
            matched += 1;
        }
    }
    Ok(matched)
}
