//! Input masks
//!
//! Turn whatever the user typed into the display pattern of a field. Every
//! mask strips non-digits first, so applying a mask twice is a no-op.

const CPF_DIGITS: usize = 11;
const PHONE_DIGITS: usize = 11;
const ACCOUNT_DIGITS: usize = 8;

/// Keep ASCII digits only, up to `max` of them
pub fn only_digits(input: &str, max: usize) -> String {
    input.chars().filter(char::is_ascii_digit).take(max).collect()
}

/// `12345678900` -> `123.456.789-00`, formatting partial input as it grows
pub fn mask_cpf(input: &str) -> String {
    let d = only_digits(input, CPF_DIGITS);
    let n = d.len();

    if n > 9 {
        format!("{}.{}.{}-{}", &d[..3], &d[3..6], &d[6..9], &d[9..])
    } else if n > 6 {
        format!("{}.{}.{}", &d[..3], &d[3..6], &d[6..])
    } else if n > 3 {
        format!("{}.{}", &d[..3], &d[3..])
    } else {
        d
    }
}

/// Mobile `(11) 98765-4321` or landline `(11) 3456-7890`
pub fn mask_phone(input: &str) -> String {
    let d = only_digits(input, PHONE_DIGITS);
    let n = d.len();

    if n > 10 {
        format!("({}) {}-{}", &d[..2], &d[2..7], &d[7..])
    } else if n > 6 {
        format!("({}) {}-{}", &d[..2], &d[2..6], &d[6..])
    } else if n > 2 {
        format!("({}) {}", &d[..2], &d[2..])
    } else {
        d
    }
}

/// `12345678` -> `12345-678`
pub fn mask_account_number(input: &str) -> String {
    let d = only_digits(input, ACCOUNT_DIGITS);
    if d.len() > 5 {
        format!("{}-{}", &d[..5], &d[5..])
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpf_progressive() {
        assert_eq!(mask_cpf("123"), "123");
        assert_eq!(mask_cpf("1234"), "123.4");
        assert_eq!(mask_cpf("1234567"), "123.456.7");
        assert_eq!(mask_cpf("1234567890"), "123.456.789-0");
        assert_eq!(mask_cpf("12345678900"), "123.456.789-00");
    }

    #[test]
    fn test_cpf_drops_extra_and_non_digits() {
        assert_eq!(mask_cpf("123.456.789-00999"), "123.456.789-00");
        assert_eq!(mask_cpf("abc"), "");
        assert_eq!(mask_cpf(&mask_cpf("12345678900")), "123.456.789-00");
    }

    #[test]
    fn test_phone_patterns() {
        assert_eq!(mask_phone("11"), "11");
        assert_eq!(mask_phone("119"), "(11) 9");
        assert_eq!(mask_phone("1134567890"), "(11) 3456-7890");
        assert_eq!(mask_phone("11987654321"), "(11) 98765-4321");
        assert_eq!(mask_phone("(11) 98765-4321 ramal 2"), "(11) 98765-4321");
    }

    #[test]
    fn test_account_number() {
        assert_eq!(mask_account_number("12345"), "12345");
        assert_eq!(mask_account_number("123456"), "12345-6");
        assert_eq!(mask_account_number("12345-6789"), "12345-678");
    }
}
