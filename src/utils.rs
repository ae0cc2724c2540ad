use std::path::Path;

/// Upper-case the first letter of an identifier, leaving the rest untouched.
#[must_use]
pub fn upper_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Derive the protocol name from a source path: the file name with any
/// trailing `.jce` extension removed.
#[must_use]
pub fn path_to_proto_name(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    name.strip_suffix(".jce").unwrap_or(name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_first_letter_basic() {
        assert_eq!(upper_first_letter("request"), "Request");
        assert_eq!(upper_first_letter("r"), "R");
        assert_eq!(upper_first_letter("Request"), "Request");
        assert_eq!(upper_first_letter(""), "");
    }

    #[test]
    fn proto_name_from_path() {
        assert_eq!(path_to_proto_name(Path::new("path/to/my_protocol.jce")), "my_protocol");
        assert_eq!(path_to_proto_name(Path::new("base.jce")), "base");
        assert_eq!(path_to_proto_name(Path::new("noext")), "noext");
    }
}
