use serde::{Deserialize, Serialize};
use std::fmt;

/// Build/test outcome of a single commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeState {
    /// The project source did not compile
    BuildError,
    /// The sources built but the test suite did not compile
    TestBuildError,
    /// Everything built, the test run failed
    TestFail,
    /// Everything built and the test run passed
    TestSuccess,
}

/// Raw result booleans recorded by the dataset harness for one commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOutcome {
    pub source_build: bool,
    pub test_build: bool,
    pub test_exec: bool,
    /// Whether a detailed test report was produced alongside the result
    pub has_report: bool,
}

impl OutcomeState {
    /// Classify a raw outcome. Each stage is only meaningful when the
    /// earlier ones succeeded, so the first failure wins.
    pub fn classify(raw: &RawOutcome) -> Self {
        if !raw.source_build {
            OutcomeState::BuildError
        } else if !raw.test_build {
            OutcomeState::TestBuildError
        } else if !raw.test_exec {
            OutcomeState::TestFail
        } else {
            OutcomeState::TestSuccess
        }
    }

    /// Fill color used when rendering a node with this outcome
    pub fn color(&self) -> &'static str {
        match self {
            OutcomeState::TestSuccess => "green",
            OutcomeState::TestFail => "red",
            OutcomeState::TestBuildError => "grey",
            OutcomeState::BuildError => "black",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeState::TestSuccess => "TestSuccess",
            OutcomeState::TestFail => "TestFail",
            OutcomeState::TestBuildError => "TestBuildError",
            OutcomeState::BuildError => "BuildError",
        }
    }
}

impl fmt::Display for OutcomeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
