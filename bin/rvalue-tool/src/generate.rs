use std::io::{self, BufRead, BufWriter, Write};

use anyhow::{bail, Context as _};
use consistent_sampling::{generate_from_hex, RValueGenerator};
use tracing::{debug, warn};

use crate::cli::GenerateArgs;

/// Outcome of generating r-values for a batch of trace IDs.
#[derive(Debug, Default, Eq, PartialEq)]
struct Summary {
    generated: usize,
    invalid: usize,
}

pub fn run<G>(generator: &G, args: GenerateArgs) -> anyhow::Result<()>
where
    G: RValueGenerator,
{
    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());

    let summary = if args.trace_ids.is_empty() {
        debug!("Reading trace IDs from standard input.");
        generate_streaming(generator, io::stdin().lock(), &mut output)?
    } else {
        generate_all(generator, args.trace_ids.iter().map(String::as_str), &mut output)?
    };

    output.flush().context("Failed to write r-values.")?;

    if summary.invalid > 0 {
        bail!(
            "{} of {} trace IDs were invalid.",
            summary.invalid,
            summary.generated + summary.invalid
        );
    }

    debug!(generated = summary.generated, "Generated r-values.");
    Ok(())
}

/// Writes `<trace ID> <r-value>` for every valid trace ID in `inputs`, skipping blank lines.
///
/// Invalid trace IDs are logged and counted, but do not stop processing of the remaining inputs.
fn generate_all<'a, G, I, W>(generator: &G, inputs: I, output: &mut W) -> anyhow::Result<Summary>
where
    G: RValueGenerator,
    I: IntoIterator<Item = &'a str>,
    W: Write,
{
    let mut summary = Summary::default();
    for (index, input) in inputs.into_iter().enumerate() {
        generate_one(generator, index + 1, input, output, &mut summary)?;
    }

    Ok(summary)
}

/// Like [`generate_all`], but reads newline-separated trace IDs from `input` and flushes after every line, so results
/// appear as soon as each trace ID arrives.
///
/// Lines that are not valid UTF-8 are counted as invalid.
fn generate_streaming<G, R, W>(generator: &G, input: R, output: &mut W) -> anyhow::Result<Summary>
where
    G: RValueGenerator,
    R: BufRead,
    W: Write,
{
    let mut summary = Summary::default();
    for (index, line) in input.split(b'\n').enumerate() {
        let line = line.context("Failed to read trace IDs from standard input.")?;
        match std::str::from_utf8(&line) {
            Ok(trace_id) => generate_one(generator, index + 1, trace_id, output, &mut summary)?,
            Err(e) => {
                warn!(line = index + 1, error = %e, "Skipping line that is not valid UTF-8.");
                summary.invalid += 1;
            }
        }
        output.flush().context("Failed to write r-values.")?;
    }

    Ok(summary)
}

fn generate_one<G, W>(
    generator: &G, line: usize, input: &str, output: &mut W, summary: &mut Summary,
) -> anyhow::Result<()>
where
    G: RValueGenerator,
    W: Write,
{
    let trace_id = input.trim();
    if trace_id.is_empty() {
        return Ok(());
    }

    match generate_from_hex(generator, trace_id) {
        Ok(r) => {
            writeln!(output, "{} {}", trace_id, r).context("Failed to write r-value.")?;
            summary.generated += 1;
        }
        Err(e) => {
            warn!(line, trace_id, error = %e, "Skipping invalid trace ID.");
            summary.invalid += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use consistent_sampling::ConsistentRValueGenerator;

    use super::*;

    /// Records everything written, along with what had been flushed at each flush.
    #[derive(Default)]
    struct FlushRecorder {
        buffer: Vec<u8>,
        flushed: Vec<String>,
    }

    impl Write for FlushRecorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushed.push(String::from_utf8_lossy(&self.buffer).into_owned());
            Ok(())
        }
    }

    #[test]
    fn writes_one_line_per_trace_id() {
        let mut output = Vec::new();
        let summary = generate_all(
            &ConsistentRValueGenerator::hashed(),
            ["4bf92f3577b34da6a3ce929d0e0e4736", "", "  0af7651916cd43dd8448eb211c80319c  "],
            &mut output,
        )
        .unwrap();

        assert_eq!(
            summary,
            Summary {
                generated: 2,
                invalid: 0
            }
        );
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "4bf92f3577b34da6a3ce929d0e0e4736 3\n0af7651916cd43dd8448eb211c80319c 1\n"
        );
    }

    #[test]
    fn invalid_trace_ids_are_counted_and_skipped() {
        let mut output = Vec::new();
        let summary = generate_all(
            &ConsistentRValueGenerator::structural(),
            [
                "not-a-trace-id",
                "00000000000000000000000000000000",
                "4BF92F3577B34DA6A3CE929D0E0E4736",
            ],
            &mut output,
        )
        .unwrap();

        assert_eq!(
            summary,
            Summary {
                generated: 1,
                invalid: 2
            }
        );
        assert_eq!(String::from_utf8(output).unwrap(), "00000000000000000000000000000000 62\n");
    }

    #[test]
    fn non_utf8_line_does_not_stop_stream() {
        let input: &[u8] = b"\xff\xfe\n4bf92f3577b34da6a3ce929d0e0e4736\r\n";
        let mut output = Vec::new();
        let summary = generate_streaming(&ConsistentRValueGenerator::hashed(), input, &mut output).unwrap();

        assert_eq!(
            summary,
            Summary {
                generated: 1,
                invalid: 1
            }
        );
        assert_eq!(String::from_utf8(output).unwrap(), "4bf92f3577b34da6a3ce929d0e0e4736 3\n");
    }

    #[test]
    fn stream_flushes_after_every_line() {
        let input: &[u8] = b"4bf92f3577b34da6a3ce929d0e0e4736\n\n0af7651916cd43dd8448eb211c80319c";
        let mut output = FlushRecorder::default();
        let summary = generate_streaming(&ConsistentRValueGenerator::hashed(), input, &mut output).unwrap();

        assert_eq!(summary.generated, 2);
        assert_eq!(
            output.flushed,
            vec![
                "4bf92f3577b34da6a3ce929d0e0e4736 3\n".to_string(),
                "4bf92f3577b34da6a3ce929d0e0e4736 3\n".to_string(),
                "4bf92f3577b34da6a3ce929d0e0e4736 3\n0af7651916cd43dd8448eb211c80319c 1\n".to_string(),
            ]
        );
    }
}
