//! PROJ4 `+key=value` string normalization.
//!
//! PROJ itself interprets the parameters; this module only cleans up the
//! text so that the same definition typed with different spacing or a
//! repeated key yields one value.

use crate::error::{CartoError, Result};

/// Normalize a PROJ4 string: one space between tokens, every token prefixed
/// with `+`, repeated keys dropped (the first wins, as in PROJ).
pub fn normalize(input: &str) -> Result<String> {
    let params = tokenize(input)?;
    if !params.iter().any(|(key, _)| key == "proj") {
        return Err(CartoError::invalid_crs(input, "missing +proj"));
    }
    let tokens: Vec<String> = params
        .iter()
        .map(|(key, value)| match value {
            Some(value) => format!("+{}={}", key, value),
            None => format!("+{}", key),
        })
        .collect();
    Ok(tokens.join(" "))
}

/// Split into ordered `(key, value)` pairs.
pub fn tokenize(input: &str) -> Result<Vec<(String, Option<String>)>> {
    let mut params: Vec<(String, Option<String>)> = Vec::new();
    for token in input.split_whitespace() {
        let bare = token.strip_prefix('+').unwrap_or(token);
        let (key, value) = match bare.split_once('=') {
            Some((k, v)) => (k, Some(v)),
            None => (bare, None),
        };
        if key.is_empty() || value == Some("") {
            return Err(CartoError::invalid_crs(
                input,
                format!("malformed token '{}'", token),
            ));
        }
        if params.iter().any(|(seen, _)| seen == key) {
            continue;
        }
        params.push((key.to_string(), value.map(str::to_string)));
    }
    if params.is_empty() {
        return Err(CartoError::invalid_crs(input, "empty definition"));
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_and_prefixes_normalize() {
        assert_eq!(
            normalize("  +proj=merc   lon_0=0 +no_defs ").unwrap(),
            "+proj=merc +lon_0=0 +no_defs"
        );
    }

    #[test]
    fn test_first_repeated_key_wins() {
        assert_eq!(
            normalize("+proj=merc +lon_0=10 +lon_0=20").unwrap(),
            "+proj=merc +lon_0=10"
        );
    }

    #[test]
    fn test_tokenize_keeps_order_and_flags() {
        let params = tokenize("+proj=aea +lat_1=20 +no_defs").unwrap();
        assert_eq!(
            params,
            vec![
                ("proj".to_string(), Some("aea".to_string())),
                ("lat_1".to_string(), Some("20".to_string())),
                ("no_defs".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(normalize("").is_err());
        assert!(normalize("+ellps=WGS84").is_err());
        assert!(normalize("+proj=merc +=3").is_err());
        assert!(normalize("+proj=").is_err());
        assert!(normalize("+proj=merc +lon_0=").is_err());
    }
}
