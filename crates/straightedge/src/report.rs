//! Plain-text reports of a construction.

use crate::{error::ConstructionError, store::ElementStore};

/// One line per element in construction order: label, element and parents.
///
/// ```text
/// A  point (0, 0)  [given]
/// a  line y = 0  <- A B
/// ```
pub fn sequence_report(store: &ElementStore) -> Result<String, ConstructionError> {
    let width = store
        .iter()
        .map(|(_, _, details)| details.label().as_string().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (_, element, details) in store.iter() {
        out.push_str(&format!("{:<width$}  {element}", details.label()));
        if !details.classes().is_empty() {
            let classes: Vec<_> = details.classes().iter().map(String::as_str).collect();
            out.push_str(&format!("  [{}]", classes.join(" ")));
        }
        if !details.parents().is_empty() {
            let parents = details
                .parents()
                .iter()
                .map(|&parent| store.get(parent).map(|p| p.label().to_string()))
                .collect::<Result<Vec<_>, _>>()?;
            out.push_str(&format!("  <- {}", parents.join(" ")));
        }
        out.push('\n');
    }
    Ok(out)
}

/// Element counts by kind, such as `5 points, 1 line, 2 circles`.
pub fn summary(store: &ElementStore) -> String {
    if store.is_empty() {
        return "empty".to_string();
    }
    store
        .group_by_kind()
        .iter()
        .map(|(kind, members)| {
            let plural = if members.len() == 1 { "" } else { "s" };
            format!("{} {kind}{plural}", members.len())
        })
        .collect::<Vec<_>>()
        .join(", ")
}
