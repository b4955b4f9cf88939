//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the pathwright engine. A fixture
//! carries its own route table (the same shape as an API index `routes`
//! section) and a list of cases; each case chains calls on a fresh handler and
//! states the expected rendered path or error kind.
//!
//! ```yaml
//! name: dual_mode_setter
//! description: literal setter forwards its value to the only dynamic child
//! routes:
//!   '/wp/v2/posts/(?P<parent>[\d]+)/revisions/(?P<id>[\d]+)': { namespace: wp/v2, methods: [GET] }
//! cases:
//!   - name: forwards
//!     resource: posts
//!     calls:
//!       - { set: parent, value: 4 }
//!       - { set: revisions, value: 52 }
//!     expect: posts/4/revisions/52
//! ```

use pathwright::prelude::*;
use serde::Deserialize;
use std::fmt;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub table: RouteTableConfig,
    /// API root for `expect_uri` checks.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Error kind the route table must fail to build with.
    #[serde(default)]
    pub expect_error: Option<String>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub resource: String,
    #[serde(default)]
    pub calls: Vec<Call>,
    /// Expected `render_path()` result.
    #[serde(default)]
    pub expect: Option<String>,
    /// Expected `render_uri()` result.
    #[serde(default)]
    pub expect_uri: Option<String>,
    /// Expected `allowed_methods()` result, lower-case.
    #[serde(default)]
    pub expect_methods: Option<Vec<String>>,
    /// Expected error kind from the calls or the render.
    #[serde(default)]
    pub expect_error: Option<String>,
}

fn default_namespace() -> String {
    pathwright::DEFAULT_NAMESPACE.to_owned()
}

/// One chained call on a handler.
/// Uses untagged deserialization; each variant has a distinct key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Call {
    Set { set: String, value: Scalar },
    Select { select: String },
    PathPart { level: usize, value: Scalar },
    Param { param: String, value: Scalar },
}

/// A YAML scalar used as a path or query value.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Stable snake_case name of an error variant, as written in fixtures.
#[must_use]
pub fn error_kind(err: &RouteError) -> &'static str {
    match err {
        RouteError::InvalidGroup { .. } => "invalid_group",
        RouteError::InvalidPattern { .. } => "invalid_pattern",
        RouteError::PatternTooLong { .. } => "pattern_too_long",
        RouteError::DepthExceeded { .. } => "depth_exceeded",
        RouteError::InvalidConfig { .. } => "invalid_config",
        RouteError::LevelAlreadySet { .. } => "level_already_set",
        RouteError::UnknownSetter { .. } => "unknown_setter",
        RouteError::MissingValue { .. } => "missing_value",
        RouteError::UnexpectedValue { .. } => "unexpected_value",
        RouteError::IncompletePath { .. } => "incomplete_path",
        RouteError::InvalidComponent { .. } => "invalid_component",
        RouteError::UnknownLevel { .. } => "unknown_level",
        RouteError::UnknownNamespace { .. } => "unknown_namespace",
        RouteError::UnknownResource { .. } => "unknown_resource",
        RouteError::MethodNotAllowed { .. } => "method_not_allowed",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

impl CaseResult {
    fn check(case_name: &str, expected: String, actual: String) -> Self {
        Self {
            case_name: case_name.to_owned(),
            passed: expected == actual,
            expected,
            actual,
        }
    }
}

fn outcome<T>(result: Result<T, RouteError>, render: impl FnOnce(T) -> String) -> String {
    match result {
        Ok(value) => render(value),
        Err(err) => format!("error: {}", error_kind(&err)),
    }
}

impl TestCase {
    fn handler(&self, index: &RouteIndex, endpoint: Option<&str>) -> Result<ResourceHandler, RouteError> {
        let handler = index.handler(&self.namespace, &self.resource)?;
        let mut handler = match endpoint {
            Some(endpoint) => handler.with_endpoint(endpoint),
            None => handler,
        };
        for call in &self.calls {
            match call {
                Call::Set { set, value } => {
                    handler.set(set, value)?;
                }
                Call::Select { select } => {
                    handler.select(select)?;
                }
                Call::PathPart { level, value } => {
                    handler.set_path_part(*level, value)?;
                }
                Call::Param { param, value } => {
                    handler.param(param.as_str(), value);
                }
            }
        }
        Ok(handler)
    }

    fn run(&self, index: &RouteIndex, endpoint: Option<&str>) -> Vec<CaseResult> {
        let handler = match self.handler(index, endpoint) {
            Ok(handler) => handler,
            Err(err) => {
                let actual = format!("error: {}", error_kind(&err));
                let expected = self.expected_path();
                return vec![CaseResult::check(&self.name, expected, actual)];
            }
        };

        let mut results = vec![CaseResult::check(
            &self.name,
            self.expected_path(),
            outcome(handler.render_path(), |path| path),
        )];
        if let Some(expected) = &self.expect_uri {
            results.push(CaseResult::check(
                &format!("{} (uri)", self.name),
                expected.clone(),
                outcome(handler.render_uri(), |uri| uri),
            ));
        }
        if let Some(expected) = &self.expect_methods {
            results.push(CaseResult::check(
                &format!("{} (methods)", self.name),
                expected.join(","),
                outcome(handler.allowed_methods(), |methods| {
                    methods.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(",")
                }),
            ));
        }
        results
    }

    fn expected_path(&self) -> String {
        match (&self.expect_error, &self.expect) {
            (Some(kind), _) => format!("error: {kind}"),
            (None, Some(path)) => path.clone(),
            (None, None) => "<no expectation>".to_owned(),
        }
    }
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Build the fixture's route table and run all test cases
    pub fn run(&self) -> Vec<CaseResult> {
        let built = RouteIndex::from_config(&self.table);

        if let Some(kind) = &self.expect_error {
            return vec![CaseResult::check(
                "build",
                format!("error: {kind}"),
                outcome(built, |index| format!("built {} resource(s)", index.len())),
            )];
        }

        match built {
            Ok(index) => self
                .cases
                .iter()
                .flat_map(|case| case.run(&index, self.endpoint.as_deref()))
                .collect(),
            Err(err) => vec![CaseResult::check(
                "build",
                "built".to_owned(),
                format!("error: {err}"),
            )],
        }
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        let results = self.run();
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {:?}, got {:?}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}
