//! Result export.
//!
//! A [`RunReport`] is a detached copy of everything a run produced. Its
//! `Display` form is the plain-text dump written by [`RunReport::save`].

use super::config::EngineConfig;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

/// Best-so-far record for one generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationRecord {
    /// 1-based generation index.
    pub generation: usize,
    pub best_position: Vec<f64>,
    /// Best fitness in the user's sense.
    pub best_fitness: f64,
}

/// Configuration, final best, and per-generation history of a run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunReport {
    /// Strategy name.
    pub name: String,
    pub config: EngineConfig,
    /// Fitness values obtained, true or predicted.
    pub evaluations: usize,
    /// Wall-clock time of the run, if it went through `Engine::run`.
    pub elapsed: Option<Duration>,
    /// Final best fitness in the user's sense.
    pub best_fitness: f64,
    pub best_position: Vec<f64>,
    /// One record per completed generation, in order.
    pub history: Vec<GenerationRecord>,
}

impl RunReport {
    /// Writes the text dump to `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write!(writer, "{self}")
    }

    /// Writes the text dump to a file, replacing it if present.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()
    }
}

const RULE: &str = "----------------------------------------";

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE} Info {RULE}")?;
        writeln!(f, "name: {}", self.name)?;
        write!(f, "{}", self.config)?;
        writeln!(f, "evaluations: {}", self.evaluations)?;
        if let Some(elapsed) = self.elapsed {
            writeln!(f, "elapsed: {:.3}s", elapsed.as_secs_f64())?;
        }

        writeln!(f, "{RULE} Result {RULE}")?;
        writeln!(f, "best_fitness: {}", self.best_fitness)?;
        writeln!(f, "best_position: {:?}", self.best_position)?;
        writeln!(f, "history:")?;
        for record in &self.history {
            writeln!(
                f,
                "{}: {:?} {}",
                record.generation, record.best_position, record.best_fitness
            )?;
        }
        Ok(())
    }
}
