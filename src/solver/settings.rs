use crate::algebra::*;
use derive_builder::Builder;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Error type returned by settings validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// An error attributable to one of the fields
    #[error("Bad field {0}")]
    BadField(&'static str),
    /// A field holding a value outside its allowed range
    #[error("Bad value for field {0}")]
    BadFieldValue(&'static str),
    /// A change to a setting that can only be fixed at setup
    #[error("Setting {0} can not be changed after setup")]
    ImmutableSetting(&'static str),
}

/// Vector norm used for the convergence checks
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NormType {
    /// ∞-norm
    Inf,
    /// Euclidean norm
    Two,
}

impl Default for NormType {
    fn default() -> Self {
        NormType::Inf
    }
}

/// Settings for the [`Solver`](crate::solver::Solver)
///
/// Build with [`DefaultSettingsBuilder`], or start from
/// `DefaultSettings::default()` and modify fields directly.

#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DefaultSettings<T: FloatT> {
    ///ADMM penalty parameter
    #[builder(default = "(0.1).as_T()")]
    pub rho: T,

    ///primal regularization of the linear system
    #[builder(default = "(1e-6).as_T()")]
    pub sigma: T,

    ///over-relaxation parameter, in (0,2)
    #[builder(default = "(1.6).as_T()")]
    pub alpha: T,

    ///number of Ruiz equilibration rounds (0 disables scaling)
    #[builder(default = "10")]
    pub scaling: u32,

    ///adapt rho during the iteration
    #[builder(default = "true")]
    pub adaptive_rho: bool,

    ///iterations between adaptive rho checks
    #[builder(default = "25")]
    pub adaptive_rho_interval: u32,

    ///rho is changed only when the estimate differs by at least this factor
    #[builder(default = "(5.0).as_T()")]
    pub adaptive_rho_tolerance: T,

    ///maximum number of iterations
    #[builder(default = "4000")]
    pub max_iter: u32,

    ///absolute convergence tolerance
    #[builder(default = "(1e-3).as_T()")]
    pub eps_abs: T,

    ///relative convergence tolerance
    #[builder(default = "(1e-3).as_T()")]
    pub eps_rel: T,

    ///primal infeasibility tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub eps_prim_inf: T,

    ///dual infeasibility tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub eps_dual_inf: T,

    ///maximum solve time (seconds)
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,

    ///iterations between termination checks (0 checks only at exit)
    #[builder(default = "1")]
    pub check_termination: u32,

    ///measure residuals on the scaled problem
    #[builder(default = "false")]
    pub scaled_termination: bool,

    ///norm used for the convergence checks
    #[builder(default = "NormType::Inf")]
    pub termination_norm: NormType,

    ///start from the previous (or user supplied) iterate
    #[builder(default = "true")]
    pub warm_start: bool,

    ///polish the solution after convergence
    #[builder(default = "false")]
    pub polish: bool,

    ///iterative refinement steps in polishing
    #[builder(default = "3")]
    pub polish_refine_iter: u32,

    ///regularization used in polishing
    #[builder(default = "(1e-6).as_T()")]
    pub delta: T,

    ///linear system solver ("qdldl" or "pcg")
    #[builder(default = r#""qdldl".to_string()"#, setter(into))]
    pub linsys_solver: String,

    ///maximum conjugate gradient iterations per solve ("pcg" only)
    #[builder(default = "500")]
    pub cg_max_iter: u32,

    ///conjugate gradient relative tolerance ("pcg" only)
    #[builder(default = "(1e-10).as_T()")]
    pub cg_tol: T,

    ///allow updates of the P and A values after setup
    #[builder(default = "true")]
    pub matrix_updates_enable: bool,

    ///collect timing information
    #[builder(default = "true")]
    pub profiling: bool,

    ///verbose printing
    #[builder(default = "true")]
    pub verbose: bool,
}

impl<T> Default for DefaultSettings<T>
where
    T: FloatT,
{
    fn default() -> DefaultSettings<T> {
        DefaultSettingsBuilder::<T>::default().build().unwrap()
    }
}

macro_rules! check_immutable_setting {
    ($self:expr, $prev:expr, $field:ident) => {
        if $self.$field != $prev.$field {
            return Err(SettingsError::ImmutableSetting(stringify!($field)));
        }
    };
}

impl<T> DefaultSettings<T>
where
    T: FloatT,
{
    /// Checks that the settings are valid.
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_positive(self.rho, "rho")?;
        validate_positive(self.sigma, "sigma")?;
        validate_alpha(self.alpha)?;
        validate_tolerance(self.adaptive_rho_tolerance)?;
        validate_nonzero(self.adaptive_rho_interval, "adaptive_rho_interval")?;
        validate_nonzero(self.max_iter, "max_iter")?;
        validate_nonnegative(self.eps_abs, "eps_abs")?;
        validate_nonnegative(self.eps_rel, "eps_rel")?;
        if self.eps_abs == T::zero() && self.eps_rel == T::zero() {
            return Err(SettingsError::BadFieldValue("eps_abs"));
        }
        validate_positive(self.eps_prim_inf, "eps_prim_inf")?;
        validate_positive(self.eps_dual_inf, "eps_dual_inf")?;
        validate_time_limit(self.time_limit)?;
        validate_positive(self.delta, "delta")?;
        validate_linsys_solver(&self.linsys_solver)?;
        validate_nonzero(self.cg_max_iter, "cg_max_iter")?;
        validate_positive(self.cg_tol, "cg_tol")?;
        Ok(())
    }

    /// Check that a settings object is valid as an update to the settings
    /// of a solver that has already been initialized.  This rejects changes
    /// to parameters that are only used during setup.
    pub fn validate_as_update(&self, prev: &Self) -> Result<(), SettingsError> {
        self.validate()?;

        check_immutable_setting!(self, prev, scaling);
        check_immutable_setting!(self, prev, sigma);
        check_immutable_setting!(self, prev, adaptive_rho);
        check_immutable_setting!(self, prev, linsys_solver);
        check_immutable_setting!(self, prev, cg_max_iter);
        check_immutable_setting!(self, prev, matrix_updates_enable);
        check_immutable_setting!(self, prev, profiling);

        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for DefaultSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        DefaultSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> DefaultSettingsBuilder<T>
where
    T: FloatT,
{
    /// check every field that has been explicitly set
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(v) = self.rho {
            validate_positive(v, "rho")?;
        }
        if let Some(v) = self.sigma {
            validate_positive(v, "sigma")?;
        }
        if let Some(v) = self.alpha {
            validate_alpha(v)?;
        }
        if let Some(v) = self.adaptive_rho_tolerance {
            validate_tolerance(v)?;
        }
        if let Some(v) = self.adaptive_rho_interval {
            validate_nonzero(v, "adaptive_rho_interval")?;
        }
        if let Some(v) = self.max_iter {
            validate_nonzero(v, "max_iter")?;
        }
        if let Some(v) = self.eps_abs {
            validate_nonnegative(v, "eps_abs")?;
        }
        if let Some(v) = self.eps_rel {
            validate_nonnegative(v, "eps_rel")?;
        }
        if let Some(v) = self.eps_prim_inf {
            validate_positive(v, "eps_prim_inf")?;
        }
        if let Some(v) = self.eps_dual_inf {
            validate_positive(v, "eps_dual_inf")?;
        }
        if let Some(v) = self.time_limit {
            validate_time_limit(v)?;
        }
        if let Some(v) = self.delta {
            validate_positive(v, "delta")?;
        }
        if let Some(ref linsys_solver) = self.linsys_solver {
            validate_linsys_solver(linsys_solver)?;
        }
        if let Some(v) = self.cg_max_iter {
            validate_nonzero(v, "cg_max_iter")?;
        }
        if let Some(v) = self.cg_tol {
            validate_positive(v, "cg_tol")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_positive<T: FloatT>(v: T, field: &'static str) -> Result<(), SettingsError> {
    if v > T::zero() && v.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

fn validate_nonnegative<T: FloatT>(v: T, field: &'static str) -> Result<(), SettingsError> {
    if v >= T::zero() && v.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

fn validate_nonzero(v: u32, field: &'static str) -> Result<(), SettingsError> {
    if v > 0 {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

fn validate_alpha<T: FloatT>(alpha: T) -> Result<(), SettingsError> {
    if alpha > T::zero() && alpha < (2.).as_T() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("alpha"))
    }
}

fn validate_tolerance<T: FloatT>(tol: T) -> Result<(), SettingsError> {
    if tol >= T::one() && tol.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("adaptive_rho_tolerance"))
    }
}

fn validate_time_limit(time_limit: f64) -> Result<(), SettingsError> {
    // NaN fails here too
    if time_limit >= 0. {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("time_limit"))
    }
}

fn validate_linsys_solver(linsys_solver: &str) -> Result<(), SettingsError> {
    match linsys_solver {
        "qdldl" => Ok(()),
        "pcg" => Ok(()),
        _ => Err(SettingsError::BadFieldValue("linsys_solver")),
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    let settings = DefaultSettingsBuilder::<f64>::default().build().unwrap();
    assert_eq!(settings, DefaultSettings::default());
    assert_eq!(settings.termination_norm, NormType::Inf);

    // fail on unknown linear solver
    assert!(DefaultSettingsBuilder::<f64>::default()
        .linsys_solver("foo")
        .build()
        .is_err());

    assert!(DefaultSettingsBuilder::<f64>::default()
        .linsys_solver("pcg")
        .build()
        .is_ok());

    // fail on bad numeric values
    assert!(DefaultSettingsBuilder::<f64>::default()
        .alpha(2.0)
        .build()
        .is_err());
    assert!(DefaultSettingsBuilder::<f64>::default()
        .rho(0.0)
        .build()
        .is_err());
    assert!(DefaultSettingsBuilder::<f64>::default()
        .adaptive_rho_tolerance(0.5)
        .build()
        .is_err());

    // directly construct bad settings and manually check
    let settings = DefaultSettings::<f64> {
        linsys_solver: "foo".to_string(),
        ..DefaultSettings::default()
    };
    assert_eq!(
        settings.validate(),
        Err(SettingsError::BadFieldValue("linsys_solver"))
    );

    let settings = DefaultSettings::<f64> {
        eps_abs: 0.0,
        eps_rel: 0.0,
        ..DefaultSettings::default()
    };
    assert!(settings.validate().is_err());

    // try to overlay prohibited update values
    let oldsettings = DefaultSettings::<f64>::default();
    let newsettings = DefaultSettings::<f64> {
        sigma: 1e-3,
        ..DefaultSettings::default()
    };
    assert_eq!(
        newsettings.validate_as_update(&oldsettings),
        Err(SettingsError::ImmutableSetting("sigma"))
    );

    // try to overlay allowed update values
    let newsettings = DefaultSettings::<f64> {
        max_iter: 11,
        rho: 1.0,
        polish: true,
        ..DefaultSettings::default()
    };
    assert!(newsettings.validate_as_update(&oldsettings).is_ok());
}

#[cfg(feature = "serde")]
#[test]
fn test_settings_json_round_trip() {
    let settings = DefaultSettingsBuilder::<f64>::default()
        .max_iter(17)
        .time_limit(10.0)
        .termination_norm(NormType::Two)
        .linsys_solver("pcg")
        .build()
        .unwrap();

    let json = serde_json::to_string(&settings).unwrap();
    let back: DefaultSettings<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(settings, back);

    // missing fields take defaults
    let partial: DefaultSettings<f64> = serde_json::from_str(r#"{"polish": true}"#).unwrap();
    assert!(partial.polish);
    assert_eq!(partial.max_iter, 4000);
}
