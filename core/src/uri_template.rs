//! `{name}` placeholder substitution for endpoint paths.

use crate::error::{HyperwalletError, Result};

/// Replace every `{name}` in `template` with the percent-encoded value bound
/// to `name` in `params`.
///
/// Facade operations validate their tokens before calling this, so a
/// placeholder without a parameter is a bug in the caller and is reported as
/// `HyperwalletError::Template`.
pub fn expand(template: &str, params: &[(&str, &str)]) -> Result<String> {
    let mut expanded = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        expanded.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| {
            HyperwalletError::Template(format!("unterminated placeholder in `{template}`"))
        })?;
        let name = &after[..end];
        let value = params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| {
                HyperwalletError::Template(format!("no value for `{{{name}}}` in `{template}`"))
            })?;
        expanded.push_str(&urlencoding::encode(value));
        rest = &after[end + 1..];
    }
    expanded.push_str(rest);

    Ok(expanded)
}
