//! Input and [`Output`] of the command line interface.

use std::{
    fmt::Write as _,
    fs, io,
    path::Path,
};

use derive_more::{Display, Error, From};
use serde::Serialize;
use service::domain::{scenario, unit, Analysis, RentEstimate, Scenario};

/// Reads a [`scenario::Input`] document from the provided `path`, or from
/// the standard input if the `path` is `-`.
///
/// # Errors
///
/// Errors if the document cannot be read or is not valid JSON.
pub fn read_input(path: &Path) -> Result<scenario::Input, InputError> {
    let json = if path == Path::new("-") {
        io::read_to_string(io::stdin())?
    } else {
        fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&json)?)
}

/// Error of reading a [`scenario::Input`] document.
#[derive(Debug, Display, Error, From)]
pub enum InputError {
    /// Document cannot be read.
    #[display("cannot read input: {_0}")]
    Io(io::Error),

    /// Document is not valid JSON.
    #[display("malformed input: {_0}")]
    Json(serde_json::Error),
}

/// Part of an analysed [`Scenario`] to print.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Output {
    /// Whole [`Scenario`] record as JSON.
    Scenario,

    /// Only the latest analysis of the [`Scenario`] as JSON.
    Snapshot,

    /// Headline metrics of the [`Scenario`] as text.
    Metrics,
}

impl Output {
    /// Renders the provided [`Scenario`].
    ///
    /// # Errors
    ///
    /// Errors if the [`Scenario`] fails to serialize.
    pub fn render(self, scenario: &Scenario) -> serde_json::Result<String> {
        match self {
            Self::Scenario => serde_json::to_string_pretty(scenario),
            Self::Snapshot => {
                serde_json::to_string_pretty(&scenario.analysis())
            }
            Self::Metrics => Ok(metrics(scenario)),
        }
    }
}

/// Renders the headline metrics of the provided [`Scenario`] as text, one
/// per line.
fn metrics(scenario: &Scenario) -> String {
    let mut out = format!("{} ({})\n", scenario.name, scenario.stage());
    for m in scenario.analysis().map(Analysis::metrics).unwrap_or_default() {
        _ = writeln!(out, "{:<28}{}", m.name, m.render(scenario.currency));
    }
    out
}

/// [`RentEstimate`] of a single unit.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitEstimate {
    /// ID of the estimated unit.
    pub unit_id: unit::Id,

    /// Name of the estimated unit.
    pub name: unit::Name,

    /// [`RentEstimate`] of the unit.
    pub estimate: RentEstimate,
}

#[cfg(test)]
mod spec {
    use std::path::Path;

    use common::{Currency, DateTime};
    use service::domain::{
        scenario::{Description, Input, Name},
        Assumptions, RentRates, Scenario,
    };

    use super::{read_input, InputError, Output};

    fn scenario(json: &str) -> Scenario {
        let now = DateTime::from_unix_timestamp(1_704_067_200).unwrap();
        let mut s = Scenario::new(
            Name::new("Hauptstr. 1").unwrap(),
            Description::default(),
            Currency::Eur,
            serde_json::from_str::<Input>(json).unwrap(),
            now,
        );
        _ = s.recompute(&Assumptions::default(), &RentRates::default(), now);
        s
    }

    #[test]
    fn renders_metrics() {
        let s = scenario(
            r#"{
                "property": {"purchasePrice": 450000},
                "units": [{"monthlyRent": 1000}]
            }"#,
        );

        let text = Output::Metrics.render(&s).unwrap();

        assert!(text.starts_with("Hauptstr. 1 (ANALYZED)\n"));
        assert!(text.contains("monthlyPayment"));
        assert!(text.contains("1616.56EUR"));
        assert!(text.contains("N/A"));
    }

    #[test]
    fn renders_snapshot_only() {
        let s = scenario(r#"{"property": {"purchasePrice": 1000}}"#);

        let whole: serde_json::Value =
            serde_json::from_str(&Output::Scenario.render(&s).unwrap())
                .unwrap();
        let snapshot: serde_json::Value =
            serde_json::from_str(&Output::Snapshot.render(&s).unwrap())
                .unwrap();

        assert_eq!(whole["analysis"], snapshot);
        assert!(snapshot.get("property").is_none());
        assert!(snapshot.get("cashFlow").is_some());
    }

    #[test]
    fn reports_missing_input() {
        let err = read_input(Path::new("/nonexistent/input.json")).unwrap_err();

        assert!(matches!(err, InputError::Io(_)));
    }
}
