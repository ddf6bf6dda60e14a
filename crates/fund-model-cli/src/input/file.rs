use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = read_contents(&canonical)?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Read a configuration file (fund terms) as YAML or JSON, chosen by extension.
///
/// Missing fields fall back to the type's serde defaults.
pub fn read_config<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = read_contents(&canonical)?;
    let is_yaml = matches!(
        canonical.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    tracing::debug!(path = %canonical.display(), yaml = is_yaml, "reading config");
    let value: T = if is_yaml {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    };
    Ok(value)
}

fn read_contents(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    Ok(contents)
}

/// Resolve the path against the working directory and check it is a file.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }
    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fund_model_core::scenario::FundTerms;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("fundm-{}-{}", std::process::id(), name));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_yaml_terms_fill_defaults() {
        let path = temp_file("terms.yaml", "carry_rate: \"0.15\"\nmax_ltv: \"0.5\"\n");
        let terms: FundTerms = read_config(path.to_str().unwrap()).unwrap();
        assert_eq!(terms.carry_rate, dec!(0.15));
        assert_eq!(terms.max_ltv, dec!(0.5));
        assert_eq!(terms.lp_capital, FundTerms::default().lp_capital);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_json_terms() {
        let path = temp_file("terms.json", r#"{"preferred_return": "0.08"}"#);
        let terms: FundTerms = read_config(path.to_str().unwrap()).unwrap();
        assert_eq!(terms.preferred_return, dec!(0.08));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = read_json::<FundTerms>("/nonexistent/fundm/terms.json").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
