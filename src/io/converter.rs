use thiserror::Error;

/// Decibels to linear amplitude.
pub fn db_to_amp(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Linear amplitude to decibels.
pub fn amp_to_db(amp: f32) -> f32 {
    20.0 * amp.log10()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    #[error("one or more arguments were too short: `{0}`")]
    TooShort(String),

    #[error("gain must start with + or -: `{0}`")]
    Unsigned(String),

    #[error("could not parse gain `{0}` as decibels")]
    Malformed(String),
}

/// Parse a signed gain argument such as `+6` or `-3.5` (decibels).
///
/// Returns the decibel value; convert with [`db_to_amp`].
pub fn parse_gain_db(arg: &str) -> Result<f32, ArgError> {
    if arg.chars().count() < 2 {
        return Err(ArgError::TooShort(arg.to_string()));
    }
    if !is_gain_arg(arg) {
        return Err(ArgError::Unsigned(arg.to_string()));
    }
    arg.parse::<f32>()
        .ok()
        .filter(|db| db.is_finite())
        .ok_or_else(|| ArgError::Malformed(arg.to_string()))
}

/// Arguments starting with a sign are gains; anything else is a path.
pub fn is_gain_arg(arg: &str) -> bool {
    arg.starts_with('+') || arg.starts_with('-')
}
