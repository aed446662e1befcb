use std::sync::LazyLock;

use regex::Regex;

use super::error::BlockReason;

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("email pattern should compile")
});

/// Misspelled mail domains and the provider they were meant to be.
///
/// Input is normalized on every keystroke, so no entry may be a prefix of a
/// domain someone is still typing (`gmail.co` would turn `gmail.com` into
/// `gmail.comm`).
static DOMAIN_TYPOS: &[(&str, &str)] = &[
    ("gmial.com", "gmail.com"),
    ("gmai.com", "gmail.com"),
    ("gamil.com", "gmail.com"),
    ("gmal.com", "gmail.com"),
    ("gnail.com", "gmail.com"),
    ("gmail.con", "gmail.com"),
    ("yaho.com", "yahoo.com"),
    ("yahooo.com", "yahoo.com"),
    ("hotmial.com", "hotmail.com"),
    ("hotmai.com", "hotmail.com"),
    ("outlok.com", "outlook.com"),
    ("outloo.com", "outlook.com"),
    ("iclod.com", "icloud.com"),
];

pub fn normalize_email(value: &str) -> String {
    let email = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    let Some((local, domain)) = email.rsplit_once('@') else {
        return email;
    };
    match DOMAIN_TYPOS.iter().find(|(typo, _)| *typo == domain) {
        Some((_, fixed)) => format!("{local}@{fixed}"),
        None => email,
    }
}

pub fn normalize_phone(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

pub fn validate_email(value: &str) -> Result<(), BlockReason> {
    if EMAIL_SHAPE.is_match(value) {
        Ok(())
    } else {
        Err(BlockReason::InvalidEmail)
    }
}

/// Ten digits, leading 6-9 (mobile numbering plan).
pub fn validate_phone(value: &str) -> Result<(), BlockReason> {
    let bytes = value.as_bytes();
    let valid = bytes.len() == 10
        && bytes.iter().all(u8::is_ascii_digit)
        && matches!(bytes[0], b'6'..=b'9');
    if valid {
        Ok(())
    } else {
        Err(BlockReason::InvalidPhone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email_fixes_typo_domain() {
        assert_eq!(normalize_email("John.Doe@GMIAL.COM "), "john.doe@gmail.com");
        assert_eq!(normalize_email(" a b@yaho.com"), "ab@yahoo.com");
        // unknown domains pass through lowercased
        assert_eq!(normalize_email("Me@Example.ORG"), "me@example.org");
        // no @ means nothing to correct
        assert_eq!(normalize_email("Not An Email"), "notanemail");
    }

    #[test]
    fn test_typo_domains_are_not_prefixes_of_real_ones() {
        for (typo, _) in DOMAIN_TYPOS {
            for (_, fixed) in DOMAIN_TYPOS {
                assert!(
                    !fixed.starts_with(typo),
                    "{typo} fires while {fixed} is still being typed"
                );
            }
        }
    }

    #[test]
    fn test_normalize_email_is_stable_while_typing() {
        for address in [
            "ada@gmail.com",
            "ada@yahoo.com",
            "ada@hotmail.com",
            "ada@outlook.com",
            "ada@icloud.com",
            "ada@gmail.co.uk",
        ] {
            let mut shown = String::new();
            for c in address.chars() {
                shown.push(c);
                shown = normalize_email(&shown);
            }
            assert_eq!(shown, address);
        }
    }

    #[test]
    fn test_normalize_phone_keeps_digits() {
        assert_eq!(normalize_phone("98765-43210"), "9876543210");
        assert_eq!(normalize_phone("(+1) 800 FLOWERS"), "1800");
        assert_eq!(normalize_phone(""), "");
    }

    #[test]
    fn test_validate_email() {
        for ok in [
            "a@b.co",
            "john.doe@gmail.com",
            "x+tag@mail.example.org",
        ] {
            assert!(validate_email(ok).is_ok(), "{ok} should pass");
        }
        for bad in [
            "",
            "plainaddress",
            "missing-domain@",
            "@no-local.com",
            "no-dot@domain",
            "short-tld@domain.c",
            "two@@signs.com",
            "spa ce@domain.com",
        ] {
            assert_eq!(
                validate_email(bad),
                Err(BlockReason::InvalidEmail),
                "{bad} should fail"
            );
        }
    }

    #[test]
    fn test_validate_phone_leading_digits() {
        for lead in '0'..='9' {
            let number = format!("{lead}123456789");
            let res = validate_phone(&number);
            if ('6'..='9').contains(&lead) {
                assert!(res.is_ok(), "{number} should pass");
            } else {
                assert_eq!(res, Err(BlockReason::InvalidPhone), "{number} should fail");
            }
        }
    }

    #[test]
    fn test_validate_phone_shape() {
        assert!(validate_phone("987654321").is_err());
        assert!(validate_phone("98765432100").is_err());
        assert!(validate_phone("98765 4321").is_err());
        assert!(validate_phone("98765432a1").is_err());
        assert!(validate_phone("９８７６５４３２１０").is_err());
    }
}
