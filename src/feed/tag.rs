//! Namespace-agnostic tag matching.
//!
//! Element tags coming out of [`super::xml`] are in Clark notation
//! (`{http://www.w3.org/2005/Atom}entry`) when the element is bound to a
//! namespace, and bare (`item`) otherwise. Everything downstream compares
//! local names only, so RSS and Atom go through the same code path.

/// Returns the local part of a possibly namespace-qualified tag.
///
/// The result is everything after the last `}`, or the input unchanged when
/// there is none.
///
/// ```
/// use dailynews::feed::local_name;
///
/// assert_eq!(local_name("{http://www.w3.org/2005/Atom}entry"), "entry");
/// assert_eq!(local_name("item"), "item");
/// assert_eq!(local_name(""), "");
/// ```
pub fn local_name(tag: &str) -> &str {
    match tag.rfind('}') {
        Some(idx) => &tag[idx + 1..],
        None => tag,
    }
}

/// Returns true when `tag` resolves to `name`, ignoring any namespace.
pub fn matches_local(tag: &str, name: &str) -> bool {
    local_name(tag) == name
}
