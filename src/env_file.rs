//! Optional `.env` file in the working directory, loaded before `Config::from_env`.
//!
//! Values already present in the process environment win over the file.

use std::path::{Path, PathBuf};

use crate::error::NestlogError;

/// Load `./.env` if it exists; returns the path that was loaded.
pub fn load_default() -> Result<Option<PathBuf>, NestlogError> {
    let cwd = std::env::current_dir()
        .map_err(|e| NestlogError::Config(format!("unable to read current directory: {}", e)))?;
    let path = cwd.join(".env");
    if !path.is_file() {
        return Ok(None);
    }
    load(&path)?;
    Ok(Some(path))
}

fn load(path: &Path) -> Result<(), NestlogError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| NestlogError::Config(format!("failed to read {}: {}", path.display(), e)))?;
    for (key, value) in parse(&contents).map_err(|e| NestlogError::Config(format!("{}:{}", path.display(), e)))? {
        if std::env::var_os(&key).is_none() {
            // Called from main before any other thread exists.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

/// Parse `KEY=value` lines; `#` comments, blank lines and a leading `export` are allowed.
/// Errors carry the 1-based line number.
pub fn parse(contents: &str) -> Result<Vec<(String, String)>, String> {
    let mut out = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let assignment = trimmed.strip_prefix("export ").map(str::trim_start).unwrap_or(trimmed);
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| format!("{}: missing '=' in assignment", index + 1))?;
        let key = key.trim();
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return Err(format!("{}: invalid variable name {:?}", index + 1, key));
        }
        let value = unquote(raw.trim()).map_err(|e| format!("{}: {}", index + 1, e))?;
        out.push((key.to_string(), value));
    }
    Ok(out)
}

fn unquote(raw: &str) -> Result<String, String> {
    let quote = match raw.chars().next() {
        Some(q @ ('"' | '\'')) => q,
        // unquoted: strip a trailing comment
        _ => return Ok(raw.split('#').next().unwrap_or_default().trim_end().to_string()),
    };
    let body = &raw[1..];
    let end = body.find(quote).ok_or_else(|| "unterminated quoted value".to_string())?;
    let rest = body[end + 1..].trim();
    if !(rest.is_empty() || rest.starts_with('#')) {
        return Err("unexpected characters after closing quote".to_string());
    }
    Ok(body[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assignments() {
        let parsed = parse(
            "# nestlog\n\
             NESTLOG_DIR=/srv/nest  # data\n\
             export NEST_PIN=\"AB CD\"\n\
             \n\
             NESTLOG_TABLE='thermostat'\n\
             EMPTY=\n",
        )
        .unwrap();
        assert_eq!(
            parsed,
            vec![
                ("NESTLOG_DIR".to_string(), "/srv/nest".to_string()),
                ("NEST_PIN".to_string(), "AB CD".to_string()),
                ("NESTLOG_TABLE".to_string(), "thermostat".to_string()),
                ("EMPTY".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn reports_line_numbers() {
        assert_eq!(parse("A=1\nB\n").unwrap_err(), "2: missing '=' in assignment");
        assert!(parse("A=\"open\n").unwrap_err().starts_with("1:"));
        assert!(parse("A='x' y\n").is_err());
        assert!(parse("BAD KEY=1\n").is_err());
    }
}
