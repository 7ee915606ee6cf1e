use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON or YAML document (chosen by extension) into a typed struct.
pub fn read_document<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: T = if is_yaml(&canonical) {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    };
    Ok(value)
}

/// Read a file verbatim.
pub fn read_text(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    Ok(contents)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

/// Resolve and validate the path, preventing directory traversal.
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
    use rust_decimal_macros::dec;
    use screener_core::filters::{Bound, FilterSpec};
    use std::io::Write;

    fn write_temp(name: &str, body: &str) -> String {
        let dir = std::env::temp_dir().join(format!("screener-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::File::create(&path)
            .unwrap()
            .write_all(body.as_bytes())
            .unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_yaml_filter_spec() {
        let path = write_temp(
            "spec.yaml",
            "ranges:\n  PE Ratio:\n    min: 0\n    max: 15\nmemberships:\n  Sector: [Energy]\n",
        );
        let spec: FilterSpec = read_document(&path).unwrap();
        assert_eq!(spec.ranges["PE Ratio"], Bound::new(Some(dec!(0)), Some(dec!(15))));
        assert!(spec.memberships["Sector"].contains("Energy"));
    }

    #[test]
    fn test_json_filter_spec() {
        let path = write_temp("spec.json", r#"{"search": "apple"}"#);
        let spec: FilterSpec = read_document(&path).unwrap();
        assert_eq!(spec.search_term(), Some("apple"));
    }

    #[test]
    fn test_missing_file() {
        let err = read_document::<FilterSpec>("/nonexistent/spec.json").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
