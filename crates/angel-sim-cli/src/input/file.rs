use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Read a JSON simulation input file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let path = Path::new(path);
    if !path.is_file() {
        return Err(format!("Not a readable file: {}", path.display()).into());
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    let parsed: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use angel_sim_core::simulation::AngelSimInput;

    #[test]
    fn test_read_json_missing_file() {
        let err = read_json::<AngelSimInput>("/nonexistent/input.json").unwrap_err();
        assert!(err.to_string().contains("Not a readable file"));
    }

    #[test]
    fn test_read_json_typed_round_trip() {
        let path = std::env::temp_dir().join("angelsim_input_test.json");
        fs::write(&path, r#"{"trials": 50, "seed": 7}"#).unwrap();
        let input: AngelSimInput = read_json(path.to_str().unwrap()).unwrap();
        assert_eq!(input.trials, 50);
        assert_eq!(input.seed, Some(7));
        // Unspecified fields fall back to the reference configuration.
        assert_eq!(input.portfolio_size, 20);
        let _ = fs::remove_file(&path);
    }
}
