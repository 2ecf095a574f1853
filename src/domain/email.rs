use super::error::DomainError;

/// Trim, validate and lowercase an email address.
///
/// Accepts `local@domain.tld` shapes: no whitespace, exactly one `@`, and a
/// dot inside the domain with text on both sides.
pub fn normalize_email(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_field("email", "email is required"));
    }
    if !is_plausible_email(trimmed) {
        return Err(DomainError::invalid_field(
            "email",
            "please provide a valid email address",
        ));
    }
    Ok(trimmed.to_lowercase())
}

fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    let last = domain.len() - 1;
    domain
        .char_indices()
        .any(|(index, ch)| ch == '.' && index > 0 && index < last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_lowercases_common_addresses() {
        assert_eq!(
            normalize_email("  Jane.Doe@Example.COM ").expect("valid"),
            "jane.doe@example.com"
        );
        assert!(normalize_email("a@b.co").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for candidate in [
            "",
            "plain",
            "@example.com",
            "user@",
            "user@domain",
            "user@.com",
            "user@domain.",
            "us er@example.com",
            "a@b@c.com",
        ] {
            assert!(
                normalize_email(candidate).is_err(),
                "expected rejection for {candidate:?}"
            );
        }
    }
}
