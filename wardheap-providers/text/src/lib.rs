//! Text provider for delimited numeric samples, one sample per line.
//!
//! Blank lines and lines starting with `#` are skipped. Fields are split on
//! the configured delimiter, or on runs of whitespace when none is given.
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use thiserror::Error;
use wardheap_core::{SampleError, SampleMatrix};

/// Errors raised while parsing delimited text samples.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TextProviderError {
    /// A field could not be parsed as a floating-point number.
    #[error("line {line}, field {field}: `{token}` is not a number")]
    InvalidNumber {
        /// 1-based line number.
        line: usize,
        /// 1-based field position within the line.
        field: usize,
        /// The offending text.
        token: String,
    },
    /// A line had a different number of fields from the first sample.
    #[error("line {line} has {actual} fields but expected {expected}")]
    RaggedLine {
        /// 1-based line number.
        line: usize,
        /// Fields on the first sample line.
        expected: usize,
        /// Fields on the offending line.
        actual: usize,
    },
    /// The parsed values did not form a valid sample matrix.
    #[error("invalid samples: {0}")]
    Samples(#[from] SampleError),
    /// The input could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Named sample matrix parsed from delimited text.
#[derive(Debug, Clone)]
pub struct TextSampleProvider {
    name: String,
    samples: SampleMatrix,
}

impl TextSampleProvider {
    /// Parses samples from an in-memory string.
    ///
    /// # Errors
    /// Returns [`TextProviderError`] when a field is not numeric, lines
    /// disagree on their width, or no samples are found.
    ///
    /// # Examples
    /// ```
    /// use wardheap_providers_text::TextSampleProvider;
    ///
    /// let provider = TextSampleProvider::try_from_str("demo", "# x,y\n0,0\n1,1\n", Some(','))?;
    /// assert_eq!(provider.samples().rows(), 2);
    /// assert_eq!(provider.samples().dimension(), 2);
    /// # Ok::<(), wardheap_providers_text::TextProviderError>(())
    /// ```
    pub fn try_from_str(
        name: impl Into<String>,
        input: &str,
        delimiter: Option<char>,
    ) -> Result<Self, TextProviderError> {
        Self::try_from_reader(name, input.as_bytes(), delimiter)
    }

    /// Parses samples from a file on disk.
    ///
    /// # Errors
    /// Returns [`TextProviderError::Io`] when the file cannot be opened and
    /// otherwise propagates [`Self::try_from_reader`] failures.
    pub fn try_from_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        delimiter: Option<char>,
    ) -> Result<Self, TextProviderError> {
        let file = File::open(path)?;
        Self::try_from_reader(name, BufReader::new(file), delimiter)
    }

    /// Parses samples from any buffered reader.
    ///
    /// # Errors
    /// See [`Self::try_from_str`].
    pub fn try_from_reader<R: BufRead>(
        name: impl Into<String>,
        reader: R,
        delimiter: Option<char>,
    ) -> Result<Self, TextProviderError> {
        let mut values = Vec::new();
        let mut width: Option<usize> = None;
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let number = index + 1;
            let before = values.len();
            for (position, token) in split_fields(trimmed, delimiter).enumerate() {
                let value = token
                    .parse::<f64>()
                    .map_err(|_| TextProviderError::InvalidNumber {
                        line: number,
                        field: position + 1,
                        token: token.to_owned(),
                    })?;
                values.push(value);
            }
            let fields = values.len() - before;
            match width {
                None => width = Some(fields),
                Some(expected) if expected != fields => {
                    return Err(TextProviderError::RaggedLine {
                        line: number,
                        expected,
                        actual: fields,
                    });
                }
                Some(_) => {}
            }
        }
        let samples = SampleMatrix::try_from_flat(width.unwrap_or(1), values)?;
        Ok(Self {
            name: name.into(),
            samples,
        })
    }

    /// Human-readable name of the data source.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parsed samples.
    #[must_use]
    pub fn samples(&self) -> &SampleMatrix {
        &self.samples
    }

    /// Consumes the provider, returning the samples.
    #[must_use]
    pub fn into_samples(self) -> SampleMatrix {
        self.samples
    }
}

fn split_fields(line: &str, delimiter: Option<char>) -> Box<dyn Iterator<Item = &str> + '_> {
    match delimiter {
        Some(delimiter) => Box::new(line.split(delimiter).map(str::trim)),
        None => Box::new(line.split_whitespace()),
    }
}
