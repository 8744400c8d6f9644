//! Scenario configuration: the typed form the driver consumes, and a
//! parser for the `<name>.dat` key/value text format scenarios ship in.

use serde::{Deserialize, Serialize};

use crate::error::{CfdError, CfdResult};
use crate::grid::GridDims;
use crate::real::Real;

/// Everything a `.dat` scenario file supplies, plus the grid spacing
/// derived from it (`dx = xLength / imax`, etc.) — kept here rather than
/// recomputed at every call site.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub scenario_name: String,
    pub geometry_name: String,

    pub t_end: Real,
    pub dt_write: Real,

    pub x_length: Real,
    pub y_length: Real,
    pub z_length: Real,
    pub x_origin: Real,
    pub y_origin: Real,
    pub z_origin: Real,

    pub ui: Real,
    pub vi: Real,
    pub wi: Real,
    pub pi: Real,
    pub ti: Real,

    pub gx: Real,
    pub gy: Real,
    pub gz: Real,

    pub re: Real,
    pub pr: Real,
    pub omg: Real,
    pub eps: Real,
    pub itermax: usize,
    pub alpha: Real,
    pub beta: Real,
    pub dt: Real,
    pub tau: Real,
    pub use_temperature: bool,
    pub t_h: Real,
    pub t_c: Real,

    pub imax: usize,
    pub jmax: usize,
    pub kmax: usize,
}

impl ScenarioConfig {
    /// Cell spacing derived from length and cell count, per axis.
    pub fn grid_dims(&self) -> GridDims {
        GridDims::new(
            self.imax,
            self.jmax,
            self.kmax,
            self.x_length / self.imax as Real,
            self.y_length / self.jmax as Real,
            self.z_length / self.kmax as Real,
        )
    }

    /// When `useTemperature` is false, the reference zeroes out every
    /// thermal quantity rather than leaving whatever the file happened to
    /// set — avoids silently running a buoyant case with a stale β or T_h.
    pub fn normalize_temperature_flags(&mut self) {
        if !self.use_temperature {
            self.t_h = 0.0;
            self.t_c = 0.0;
            self.beta = 0.0;
            self.pr = 0.0;
            self.ti = 0.0;
        }
    }

    /// Doubles ε, matching the reference's `REAL_FLOAT` numerics toggle:
    /// a 32-bit build needs a looser pressure-convergence criterion.
    pub fn apply_real_float_eps_doubling(&mut self) {
        if cfg!(feature = "f32") && !cfg!(feature = "f64") {
            self.eps *= 2.0;
        }
    }
}

/// Parses a `.dat` scenario file: one `key value` pair per line (an `=`
/// between them is tolerated), blank lines and `#`-prefixed comments
/// ignored. Every field in [`ScenarioConfig`] except `scenario_name` (the
/// caller already knows it, from the filename) must be present.
pub fn parse_scenario_dat(scenario_name: &str, text: &str) -> CfdResult<ScenarioConfig> {
    let mut values = std::collections::HashMap::new();
    for (line_no, raw_line) in text.lines().enumerate() {
        let line = raw_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let line = line.replace('=', " ");
        let mut parts = line.split_whitespace();
        let key = parts.next().ok_or_else(|| {
            CfdError::Config(format!("scenario file line {}: missing key", line_no + 1))
        })?;
        let value = parts.next().ok_or_else(|| {
            CfdError::Config(format!("scenario file line {}: missing value for '{key}'", line_no + 1))
        })?;
        values.insert(key.to_string(), value.to_string());
    }

    let get = |key: &str| -> CfdResult<&String> {
        values.get(key).ok_or_else(|| CfdError::Config(format!("scenario file missing required key '{key}'")))
    };
    let get_real = |key: &str| -> CfdResult<Real> {
        get(key)?.parse::<Real>().map_err(|e| CfdError::Config(format!("'{key}': {e}")))
    };
    let get_usize = |key: &str| -> CfdResult<usize> {
        get(key)?.parse::<usize>().map_err(|e| CfdError::Config(format!("'{key}': {e}")))
    };
    let get_bool = |key: &str| -> CfdResult<bool> {
        match get(key)?.as_str() {
            "1" | "true" | "TRUE" => Ok(true),
            "0" | "false" | "FALSE" => Ok(false),
            other => Err(CfdError::Config(format!("'{key}': expected a boolean, got '{other}'"))),
        }
    };

    Ok(ScenarioConfig {
        scenario_name: scenario_name.to_string(),
        geometry_name: get("geometryName")?.clone(),
        t_end: get_real("tEnd")?,
        dt_write: get_real("dtWrite")?,
        x_length: get_real("xLength")?,
        y_length: get_real("yLength")?,
        z_length: get_real("zLength")?,
        x_origin: get_real("xOrigin")?,
        y_origin: get_real("yOrigin")?,
        z_origin: get_real("zOrigin")?,
        ui: get_real("UI")?,
        vi: get_real("VI")?,
        wi: get_real("WI")?,
        pi: get_real("PI")?,
        ti: get_real("TI")?,
        gx: get_real("GX")?,
        gy: get_real("GY")?,
        gz: get_real("GZ")?,
        re: get_real("Re")?,
        pr: get_real("Pr")?,
        omg: get_real("omg")?,
        eps: get_real("eps")?,
        itermax: get_usize("itermax")?,
        alpha: get_real("alpha")?,
        beta: get_real("beta")?,
        dt: get_real("dt")?,
        tau: get_real("tau")?,
        use_temperature: get_bool("useTemperature")?,
        t_h: get_real("T_h")?,
        t_c: get_real("T_c")?,
        imax: get_usize("imax")?,
        jmax: get_usize("jmax")?,
        kmax: get_usize("kmax")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRIVEN_CAVITY_DAT: &str = "
        # lid-driven cavity
        geometryName none
        tEnd 5.0
        dtWrite 0.5
        xLength 1.0
        yLength 1.0
        zLength 1.0
        xOrigin 0.0
        yOrigin 0.0
        zOrigin 0.0
        UI 0.0
        VI 0.0
        WI 0.0
        PI 0.0
        TI 0.0
        GX 0.0
        GY 0.0
        GZ 0.0
        Re 1000.0
        Pr 0.0
        omg 1.7
        eps 1e-3
        itermax 100
        alpha 0.9
        beta 0.0
        dt 0.02
        tau 0.5
        useTemperature false
        T_h 0.0
        T_c 0.0
        imax 32
        jmax 32
        kmax 32
    ";

    #[test]
    fn parses_a_well_formed_scenario_file() {
        let config = parse_scenario_dat("driven_cavity", DRIVEN_CAVITY_DAT).unwrap();
        assert_eq!(config.imax, 32);
        assert_eq!(config.itermax, 100);
        assert!(!config.use_temperature);
        assert_eq!(config.scenario_name, "driven_cavity");
    }

    #[test]
    fn grid_dims_derives_spacing_from_length_and_cell_count() {
        let config = parse_scenario_dat("driven_cavity", DRIVEN_CAVITY_DAT).unwrap();
        let dims = config.grid_dims();
        assert!((dims.dx - 1.0 / 32.0).abs() < 1e-9);
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        let truncated = "imax 32\njmax 32\n";
        let err = parse_scenario_dat("broken", truncated).unwrap_err();
        assert!(matches!(err, CfdError::Config(_)));
    }

    #[test]
    fn disabling_temperature_zeroes_thermal_quantities() {
        let mut config = parse_scenario_dat("driven_cavity", DRIVEN_CAVITY_DAT).unwrap();
        config.beta = 2.1e-4;
        config.t_h = 1.0;
        config.normalize_temperature_flags();
        assert_eq!(config.beta, 0.0);
        assert_eq!(config.t_h, 0.0);
    }
}
