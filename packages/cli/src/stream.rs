//! Newline-delimited document streams.
//!
//! Each non-blank input line is one document. Lines are handed over as raw
//! bytes, so a line that is not valid UTF-8 is routed like any other
//! malformed document. Each routed document is written as one `Envelope`
//! JSON line to the sink of its channel.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use recordfetch_core::{
    Connector, FailureReason, FlowDocument, Outcome, RecordFetcher, Route, RoutedDocument,
};

use crate::error::CliError;

/// One routed document as written to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub route: Route,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReason>,
}

impl From<RoutedDocument> for Envelope {
    fn from(routed: RoutedDocument) -> Self {
        let failure = match routed.outcome {
            Outcome::Failure(reason) => Some(reason),
            Outcome::Success(_) => None,
        };
        Self {
            route: routed.route,
            attributes: routed.document.attributes,
            content: String::from_utf8_lossy(&routed.document.content).into_owned(),
            failure,
        }
    }
}

/// The `success` and `failure` output channels.
pub struct Sinks<S, F> {
    pub success: S,
    pub failure: F,
}

impl<S: Write, F: Write> Sinks<S, F> {
    pub fn new(success: S, failure: F) -> Self {
        Self { success, failure }
    }

    pub fn write(&mut self, envelope: &Envelope) -> Result<(), CliError> {
        match envelope.route {
            Route::Success => write_line(&mut self.success, envelope),
            Route::Failure => write_line(&mut self.failure, envelope),
        }
    }

    pub fn flush(&mut self) -> Result<(), CliError> {
        self.success.flush()?;
        self.failure.flush()?;
        Ok(())
    }
}

fn write_line<W: Write>(out: &mut W, envelope: &Envelope) -> Result<(), CliError> {
    serde_json::to_writer(&mut *out, envelope)?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Counts for one processed stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Route every document of `input` through `fetcher` into `sinks`.
pub fn process_stream<C, R, S, F>(
    fetcher: &RecordFetcher<C>,
    input: R,
    sinks: &mut Sinks<S, F>,
) -> Result<Summary, CliError>
where
    C: Connector,
    R: BufRead,
    S: Write,
    F: Write,
{
    let mut summary = Summary::default();

    for line in input.split(b'\n') {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let routed = fetcher.process(FlowDocument::new(line));
        summary.processed += 1;
        match routed.route {
            Route::Success => summary.succeeded += 1,
            Route::Failure => summary.failed += 1,
        }

        sinks.write(&Envelope::from(routed))?;
    }

    sinks.flush()?;
    Ok(summary)
}
