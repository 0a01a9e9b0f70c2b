//! `{{key}}` template rendering against the agent's records.

use webpilot_core::context::Records;

/// Fill `{{key}}` placeholders in `template` from `vars`.
///
/// Unresolved keys render as the empty string, never an error — a step may
/// reference a record (e.g. `{{plan}}`) before any thinking step produced it.
pub fn render(template: &str, vars: &Records) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                if let Some(value) = vars.get(key) {
                    out.push_str(value);
                }
                rest = &after[end + 2..];
            }
            None => {
                // unterminated placeholder: emit verbatim
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
