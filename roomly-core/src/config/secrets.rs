use super::ConfigError;

/// Backend used to resolve `${...}` placeholders in string config values.
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> Result<String, ConfigError>;
}

/// Resolves `${VAR}`, `${env:VAR}` and `${file:/path}` references.
///
/// File contents are trimmed, so a token file ending in a newline resolves
/// to the bare token.
pub struct DefaultSecretResolver;

impl SecretResolver for DefaultSecretResolver {
    fn resolve(&self, reference: &str) -> Result<String, ConfigError> {
        let reference = reference.trim();
        if let Some(path) = reference.strip_prefix("file:") {
            let path = path.trim();
            return std::fs::read_to_string(path)
                .map(|s| s.trim().to_string())
                .map_err(|e| ConfigError::Load(format!("secret file '{path}': {e}")));
        }
        let var = reference.strip_prefix("env:").unwrap_or(reference).trim();
        std::env::var(var).map_err(|_| ConfigError::NotFound(format!("env:{var}")))
    }
}

/// Replace every `${...}` placeholder in `value` using `resolver`.
pub fn resolve_placeholders(
    value: &str,
    resolver: &dyn SecretResolver,
) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| ConfigError::Load(format!("unclosed placeholder in '{value}'")))?;
        out.push_str(&resolver.resolve(&after[..end])?);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl SecretResolver for Fixed {
        fn resolve(&self, reference: &str) -> Result<String, ConfigError> {
            match reference {
                "HOST" => Ok("api.roomly.test".into()),
                "env:PORT" => Ok("8443".into()),
                other => Err(ConfigError::NotFound(other.into())),
            }
        }
    }

    #[test]
    fn resolves_multiple_placeholders() {
        let out = resolve_placeholders("https://${HOST}:${env:PORT}/v1", &Fixed).unwrap();
        assert_eq!(out, "https://api.roomly.test:8443/v1");
    }

    #[test]
    fn plain_value_untouched() {
        assert_eq!(resolve_placeholders("plain", &Fixed).unwrap(), "plain");
    }

    #[test]
    fn unclosed_placeholder_fails() {
        assert!(matches!(
            resolve_placeholders("${HOST", &Fixed),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn unknown_reference_fails() {
        assert!(matches!(
            resolve_placeholders("${MISSING}", &Fixed),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn file_reference_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "abc.def\n").unwrap();
        let out = resolve_placeholders(&format!("${{file:{}}}", path.display()), &DefaultSecretResolver)
            .unwrap();
        assert_eq!(out, "abc.def");
    }
}
