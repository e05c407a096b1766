//! Property-test run profile shared by the wardheap proptest suites.
//!
//! CI raises case counts for nightly runs and enables forking when a suite
//! needs crash isolation. Both knobs are read from the environment so local
//! runs keep fast defaults.

use std::{env, str::FromStr};

/// Environment variable controlling proptest case counts.
pub const PROGTEST_CASES_ENV_KEY: &str = "PROGTEST_CASES";
/// Environment variable controlling proptest process forking.
pub const WARDHEAP_PBT_FORK_ENV_KEY: &str = "WARDHEAP_PBT_FORK";

/// Runtime profile for property-test execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Load a profile from the environment, falling back to the supplied
    /// defaults when a variable is missing or malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use wardheap_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(32, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        let cases = override_or(PROGTEST_CASES_ENV_KEY, default_cases, |raw| {
            match raw.parse::<u32>() {
                Ok(0) => Err("cases must be > 0".to_owned()),
                Ok(cases) => Ok(cases),
                Err(error) => Err(format!("parse error: {error}")),
            }
        });
        let fork = override_or(WARDHEAP_PBT_FORK_ENV_KEY, default_fork, parse_flag);
        Self { cases, fork }
    }

    /// Number of cases to run per property.
    #[must_use]
    pub const fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether to run proptest cases in forked subprocesses.
    #[must_use]
    pub const fn fork(&self) -> bool {
        self.fork
    }
}

fn override_or<T, F>(key: &'static str, default: T, parse: F) -> T
where
    F: FnOnce(&str) -> Result<T, String>,
{
    let Ok(raw) = env::var(key) else {
        return default;
    };
    parse(raw.trim()).unwrap_or_else(|reason| {
        tracing::warn!(
            env = key,
            raw = %raw,
            reason = %reason,
            "ignoring invalid property-test override",
        );
        default
    })
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    let lowered = raw.to_ascii_lowercase();
    match lowered.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bool::from_str(&lowered).map_err(|error| error.to_string()),
    }
}
