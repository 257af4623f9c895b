use std::fmt;

use crate::error::{Error, Result};

/// Population code that selects the pooled `AF=` annotation.
pub const POOLED_POPULATION: &str = "ALL";

/// The INFO prefix a population's allele frequency is stored under:
/// `AF=` for the pooled frequency, `<POP>_AF=` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationKey {
    prefix: String,
}

impl PopulationKey {
    /// Build the key for a population code such as `EUR`, `AFR` or `ALL`.
    /// Codes are case-sensitive and used as given.
    pub fn new(population: &str) -> Result<Self> {
        if population.is_empty()
            || population
                .chars()
                .any(|c| c.is_whitespace() || c == '=' || c == ';')
        {
            return Err(Error::InvalidPopulation(population.to_string()));
        }
        let prefix = if population == POOLED_POPULATION {
            "AF=".to_string()
        } else {
            format!("{}_AF=", population)
        };
        Ok(PopulationKey { prefix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl fmt::Display for PopulationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix)
    }
}

/// Outcome of looking up a population frequency in an INFO field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Found(FrequencyAnnotation<'a>),
    /// No `;`-separated entry starts with the key.
    Missing,
    /// The first matching entry's value is not a finite number.
    Unparsable(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyAnnotation<'a> {
    pub value: f64,
    pub source_key: &'a str,
}

/// Find the first INFO entry starting with the key and parse the rest of it
/// as a decimal number. Later entries are never consulted, even when the
/// first match is unparsable.
pub fn extract<'a>(info: &str, key: &'a PopulationKey) -> Lookup<'a> {
    let Some(raw) = info
        .split(';')
        .find_map(|entry| entry.strip_prefix(key.prefix()))
    else {
        return Lookup::Missing;
    };

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Lookup::Found(FrequencyAnnotation {
            value,
            source_key: key.prefix(),
        }),
        Ok(_) => {
            log::debug!("non-finite {}{}", key, raw);
            Lookup::Unparsable(key.prefix())
        }
        Err(_) => Lookup::Unparsable(key.prefix()),
    }
}
