//! Line input, stage chaining, and output for the `pjs` binary.
//!
//! Stages run in the fixed order filter → map → reduce; each one that was
//! requested consumes the previous one's output.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::{CliArgs, Input};
use crate::expr::Value;
use crate::{ops, reduce, Aggregate};

/// Result of running the requested stages.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// filter and/or map without reduce: one value per line.
    Lines(Vec<Value>),
    /// reduce: a single value.
    Scalar(Value),
}

/// Read all input lines, in order.  No inputs means stdin.
pub fn read_lines(inputs: &[Input], ignore_empty: bool) -> Result<Vec<String>> {
    let stdin_only = [Input::Stdin];
    let inputs = if inputs.is_empty() { &stdin_only[..] } else { inputs };

    let mut lines = Vec::new();
    for input in inputs {
        let before = lines.len();
        match input {
            Input::Stdin => collect_lines(io::stdin().lock(), ignore_empty, &mut lines)
                .context("reading standard input")?,
            Input::File(path) => {
                let file = File::open(path)
                    .with_context(|| format!("cannot open {}", path.display()))?;
                collect_lines(BufReader::new(file), ignore_empty, &mut lines)
                    .with_context(|| format!("reading {}", path.display()))?;
            }
        }
        debug!(input = ?input, lines = lines.len() - before, "read input");
    }
    Ok(lines)
}

/// Split `reader` into lines, dropping `\n` or `\r\n`.  Bytes that are not
/// valid UTF-8 become U+FFFD instead of failing the read.
fn collect_lines(
    mut reader: impl BufRead,
    ignore_empty: bool,
    out: &mut Vec<String>,
) -> io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let mut line = buf.as_slice();
        if let Some(rest) = line.strip_suffix(b"\n") {
            line = rest.strip_suffix(b"\r").unwrap_or(rest);
        }
        if ignore_empty && line.is_empty() {
            continue;
        }
        out.push(String::from_utf8_lossy(line).into_owned());
    }
}

/// Apply filter, map and reduce, as requested by `args`, to `lines`.
pub fn run_stages(lines: Vec<String>, args: &CliArgs) -> crate::Result<Output> {
    let mut values: Vec<Value> = lines.into_iter().map(Value::Str).collect();

    if let Some(expr) = &args.filter {
        let before = values.len();
        values = ops::filter(&values, expr, args.explicit)?;
        debug!(expr = %expr, before, after = values.len(), "filter");
    }

    if let Some(expr) = &args.map {
        values = ops::map(&values, expr, args.explicit)?;
        debug!(expr = %expr, count = values.len(), "map");
    }

    if let Some(expr) = &args.reduce {
        // Numeric lines aggregate as numbers; concat keeps their text.
        let keep_text = Aggregate::from_keyword(expr.trim()) == Some(Aggregate::Concat);
        let values: Vec<Value> = if keep_text {
            values
        } else {
            values.into_iter().map(Value::numify).collect()
        };
        let result = reduce(&values, expr)?;
        debug!(expr = %expr, count = values.len(), "reduce");
        return Ok(Output::Scalar(result));
    }

    Ok(Output::Lines(values))
}

/// Write `output` as display lines, or as a single JSON document.
pub fn write_output(out: &mut impl Write, output: &Output, json: bool) -> Result<()> {
    if json {
        match output {
            Output::Lines(values) => serde_json::to_writer(&mut *out, values)?,
            Output::Scalar(value) => serde_json::to_writer(&mut *out, value)?,
        }
        writeln!(out)?;
    } else {
        match output {
            Output::Lines(values) => {
                for v in values {
                    writeln!(out, "{v}")?;
                }
            }
            Output::Scalar(value) => writeln!(out, "{value}")?,
        }
    }
    out.flush()?;
    Ok(())
}

/// `true` when `err` comes from writing to a pipe whose reader has gone.
/// JSON output reports this through `serde_json::Error`.
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    let kind = err
        .downcast_ref::<io::Error>()
        .map(io::Error::kind)
        .or_else(|| err.downcast_ref::<serde_json::Error>().and_then(|j| j.io_error_kind()));
    kind == Some(io::ErrorKind::BrokenPipe)
}

/// Read inputs, run the stages, and write the result to stdout.
pub fn run(args: &CliArgs) -> Result<()> {
    debug!(?args, "starting");
    let lines = read_lines(&args.inputs, args.ignore_empty)?;
    let output = run_stages(lines, args)?;
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    write_output(&mut out, &output, args.json)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
