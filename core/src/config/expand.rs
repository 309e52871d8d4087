//! Placeholder and home-directory expansion for configuration values.

const ENV_OPEN: &str = "${env:";

/// Replace every `${env:NAME}` placeholder with the value of `NAME`.
///
/// Placeholders naming an unset variable, and an unterminated trailing
/// placeholder, are kept verbatim so error messages show what was configured.
pub fn expand_env_placeholders(value: &str) -> String {
    let mut segments = value.split(ENV_OPEN);
    let mut out = segments.next().unwrap_or_default().to_string();

    for segment in segments {
        let Some((name, tail)) = segment.split_once('}') else {
            out.push_str(ENV_OPEN);
            out.push_str(segment);
            continue;
        };
        match std::env::var(name) {
            Ok(resolved) => out.push_str(&resolved),
            Err(_) => {
                out.push_str(ENV_OPEN);
                out.push_str(name);
                out.push('}');
            }
        }
        out.push_str(tail);
    }
    out
}

/// Expand a leading `~` to the current user's home directory.
pub fn expand_tilde(path: &str) -> String {
    shellexpand::tilde(path).into_owned()
}
