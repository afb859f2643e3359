/// Join a parent scope and a local name into a full name.
///
/// ```
/// use stratus_core::utils::scoped_name;
/// assert_eq!(scoped_name(Some("Storage"), "Bucket"), "Storage.Bucket");
/// ```
pub fn scoped_name(parent: Option<&str>, local_name: &str) -> String {
    match parent {
        Some(parent) if !parent.is_empty() => format!("{parent}.{local_name}"),
        _ => local_name.to_owned(),
    }
}
