//! Core units, angle helpers, and shared primitives for the orbital autopilot workspace.

/// Numeric constants shared by the controllers.
pub mod constants {
    /// Acceleration values below this are treated as "no thrust available" (m/s²).
    pub const MIN_THRUST_ACCEL: f64 = 1.0e-9;
}

/// Angle wrapping.
pub mod angles {
    /// Wrap an angle into `[0, 360)` degrees.
    pub fn wrap_360(deg: f64) -> f64 {
        let wrapped = deg.rem_euclid(360.0);
        if wrapped >= 360.0 { 0.0 } else { wrapped }
    }

    /// Wrap an angle into `[-180, 180)` degrees.
    pub fn wrap_180(deg: f64) -> f64 {
        let wrapped = wrap_360(deg);
        if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
    }

    /// Sign of `v` as -1, 0 or 1. Unlike `f64::signum`, zero maps to zero.
    #[inline]
    pub fn sign(v: f64) -> f64 {
        if v > 0.0 {
            1.0
        } else if v < 0.0 {
            -1.0
        } else {
            0.0
        }
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector; units depend on context (m, m/s, or unitless directions).
    pub type Vector3 = [f64; 3];

    /// The zero vector.
    pub const ZERO: Vector3 = [0.0, 0.0, 0.0];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Cross product `a × b`.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Unit vector along `v`, or `None` for a (near) zero vector.
    pub fn normalize(v: &Vector3) -> Option<Vector3> {
        let n = norm(v);
        if n > f64::EPSILON { Some(scale(v, 1.0 / n)) } else { None }
    }

    /// Angle between two vectors in degrees; 0 when either is degenerate.
    pub fn angle_between_deg(a: &Vector3, b: &Vector3) -> f64 {
        match (normalize(a), normalize(b)) {
            (Some(ua), Some(ub)) => dot(&ua, &ub).clamp(-1.0, 1.0).acos().to_degrees(),
            _ => 0.0,
        }
    }
}

/// Human-readable formatting for status strings.
pub mod format {
    const PREFIXES: [(i32, &str); 9] = [
        (-9, "n"),
        (-6, "μ"),
        (-3, "m"),
        (0, ""),
        (3, "k"),
        (6, "M"),
        (9, "G"),
        (12, "T"),
        (15, "P"),
    ];

    /// Format `value` with an SI prefix and `sig_figs` significant figures.
    ///
    /// `to_si(12_345.0, 3)` yields `"12.3 k"`; non-finite input is rendered as `"∞"` or `"NaN"`.
    pub fn to_si(value: f64, sig_figs: usize) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value > 0.0 { "∞".to_string() } else { "-∞".to_string() };
        }
        if value == 0.0 {
            return "0 ".to_string();
        }

        let magnitude = value.abs().log10().floor() as i32;
        let exponent = PREFIXES
            .iter()
            .rev()
            .find(|(exp, _)| magnitude >= *exp)
            .copied()
            .unwrap_or(PREFIXES[0]);
        let scaled = value / 10f64.powi(exponent.0);
        let int_digits = (scaled.abs().log10().floor() as i32 + 1).max(1) as usize;
        let decimals = sig_figs.max(1).saturating_sub(int_digits);
        format!("{:.*} {}", decimals, scaled, exponent.1)
    }
}
