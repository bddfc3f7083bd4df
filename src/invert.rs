use {crate::VeilError, std::collections::BTreeMap};

/// Principal identifier to the ARNs of the roles that trust it. Keys iterate (and serialize) in sorted order.
pub type PrincipalRoleMap = BTreeMap<String, Vec<String>>;

/// Flip a role -> principals map into principal -> roles.
///
/// Each principal's role list is built in the iteration order of `input`; for a `HashMap` that order is
/// unspecified, so callers that need a stable order must sort the lists themselves.
pub fn invert<'a, I>(input: I) -> PrincipalRoleMap
where
    I: IntoIterator<Item = (&'a String, &'a Vec<String>)>,
{
    let mut output = PrincipalRoleMap::new();

    for (role, principals) in input {
        for principal in principals {
            output.entry(principal.clone()).or_default().push(role.clone());
        }
    }

    output
}

/// Render the audit result as pretty-printed JSON with two-space indentation.
///
/// `<`, `>`, `&`, U+2028 and U+2029 inside strings are written as `\u` escapes, so the output is safe to embed in HTML
/// and JavaScript.
pub fn render_json(map: &PrincipalRoleMap) -> Result<String, VeilError> {
    let rendered = serde_json::to_string_pretty(map).map_err(|e| VeilError::Serialization(e.to_string()))?;

    // These characters can only appear inside string literals in the serialized output.
    Ok(rendered
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029"))
}
