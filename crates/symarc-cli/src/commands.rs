//! Job execution
//!
//! A build job loads symbols through the input adapter, compiles the
//! database and writes the archive. An extract job reads an archive and
//! writes the text report.

use crate::config::{Job, Mode, OutputTarget};
use crate::error::CliError;
use crate::output;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use symarc_formats::input::{LoadStats, load_file};
use symarc_formats::symbol::SymbolDatabase;
use tracing::{debug, info};

/// What a finished job did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Entries in the archive written or read
    pub symbols: usize,
    /// Adapter counters
    pub load: LoadStats,
}

/// Run a resolved job to completion
pub fn run(job: &Job) -> Result<Summary, CliError> {
    let mut db = SymbolDatabase::new();
    let load = load_file(job.format, &job.input, &mut db, &job.options)?;
    info!(
        "Loaded {} symbols from {} ({} skipped, {} duplicates)",
        load.appended,
        job.input.display(),
        load.skipped,
        load.duplicates
    );
    db.compile();

    let target = job.output.to_string();
    let mut out = open_output(&job.output)?;
    match job.mode {
        Mode::Build => {
            db.write_to(&mut out)
                .map_err(|e| CliError::output(&target, e))?;
            if let Some(stats) = db.stats() {
                debug!("Archive widths {:?}", stats.widths);
            }
        }
        Mode::Extract => {
            output::write_report(&db, &job.input, &mut out)
                .map_err(|e| CliError::output(&target, e))?;
        }
    }
    out.flush().map_err(|e| CliError::output(&target, e))?;

    info!("Wrote {} symbols to {}", db.len(), target);
    Ok(Summary {
        symbols: db.len(),
        load,
    })
}

fn open_output(target: &OutputTarget) -> Result<Box<dyn Write>, CliError> {
    match target {
        OutputTarget::Stdout => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
        OutputTarget::File(path) => {
            let file = File::create(path).map_err(|e| CliError::output(target.to_string(), e))?;
            Ok(Box::new(BufWriter::new(file)))
        }
    }
}
