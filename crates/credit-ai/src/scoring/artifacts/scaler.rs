use super::super::schema::{check_columns, FeatureVector, SCALED_COLUMNS, SCALED_FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether the scaler runs before classification.
///
/// `Passthrough` serves raw feature values, matching the legacy deployment whose
/// preprocessing step never invoked its scaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMode {
    #[default]
    Apply,
    Passthrough,
}

impl ScalingMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Apply => "apply",
            Self::Passthrough => "passthrough",
        }
    }
}

impl FromStr for ScalingMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "apply" | "scaled" | "on" => Ok(Self::Apply),
            "passthrough" | "raw" | "off" => Ok(Self::Passthrough),
            other => Err(format!("unknown scaling mode '{other}'")),
        }
    }
}

impl fmt::Display for ScalingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Standard-score normalization fit on the continuous columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub(crate) fn validate(&self) -> Result<(), String> {
        check_columns(&self.feature_names, &SCALED_COLUMNS)
            .map_err(|mismatch| mismatch.describe())?;

        if self.mean.len() != SCALED_FEATURE_COUNT || self.scale.len() != SCALED_FEATURE_COUNT {
            return Err(format!(
                "expected {} means and scales, found {} and {}",
                SCALED_FEATURE_COUNT,
                self.mean.len(),
                self.scale.len()
            ));
        }

        if self
            .mean
            .iter()
            .chain(self.scale.iter())
            .any(|value| !value.is_finite())
        {
            return Err("means and scales must be finite".to_string());
        }

        Ok(())
    }

    /// Normalizes the leading continuous columns in place; flag columns are untouched.
    pub fn transform(&self, row: &mut FeatureVector) {
        for ((value, mean), scale) in row
            .iter_mut()
            .take(SCALED_FEATURE_COUNT)
            .zip(self.mean.iter())
            .zip(self.scale.iter())
        {
            // A constant column is fit with scale 0; it is centred but not divided.
            let divisor = if *scale == 0.0 { 1.0 } else { *scale };
            *value = (*value - mean) / divisor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::schema::FEATURE_COUNT;

    fn scaler() -> StandardScaler {
        let mut mean = vec![0.0; SCALED_FEATURE_COUNT];
        let mut scale = vec![1.0; SCALED_FEATURE_COUNT];
        mean[4] = 600.0;
        scale[4] = 100.0;
        scale[0] = 0.0;
        StandardScaler {
            feature_names: SCALED_COLUMNS.iter().map(|name| name.to_string()).collect(),
            mean,
            scale,
        }
    }

    #[test]
    fn transform_scales_continuous_columns_only() {
        let mut row = [1.0; FEATURE_COUNT];
        row[4] = 750.0;
        scaler().transform(&mut row);

        assert_eq!(row[4], 1.5);
        assert_eq!(row[0], 1.0, "zero scale leaves the centred value");
        assert_eq!(&row[SCALED_FEATURE_COUNT..], &[1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn validate_rejects_reordered_columns() {
        let mut scaler = scaler();
        scaler.feature_names.swap(1, 2);
        let detail = scaler.validate().expect_err("order mismatch");
        assert!(detail.contains("column 2"));
    }

    #[test]
    fn scaling_mode_parses_aliases() {
        assert_eq!("Passthrough".parse::<ScalingMode>(), Ok(ScalingMode::Passthrough));
        assert_eq!("apply".parse::<ScalingMode>(), Ok(ScalingMode::Apply));
        assert!("sometimes".parse::<ScalingMode>().is_err());
    }
}
