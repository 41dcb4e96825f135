/// Formats an amount in centavos as Brazilian currency, e.g. `R$ 1.234,56`.
pub fn format_brl(amount_minor: i64) -> String {
    let negative = amount_minor < 0;
    let absolute = amount_minor.unsigned_abs();
    let reais = absolute / 100;
    let centavos = absolute % 100;

    let digits = reais.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{centavos:02}")
}

/// Converts centavos to the decimal amount the gateway expects.
pub fn minor_to_decimal(amount_minor: i64) -> f64 {
    amount_minor as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_plain_amounts() {
        assert_eq!(format_brl(0), "R$ 0,00");
        assert_eq!(format_brl(101_00), "R$ 101,00");
        assert_eq!(format_brl(58_50), "R$ 58,50");
    }

    #[test]
    fn groups_thousands_with_dots() {
        assert_eq!(format_brl(1_234_56), "R$ 1.234,56");
        assert_eq!(format_brl(1_234_567_89), "R$ 1.234.567,89");
    }

    #[test]
    fn keeps_two_centavo_digits() {
        assert_eq!(format_brl(5), "R$ 0,05");
        assert_eq!(format_brl(-1_234_56), "-R$ 1.234,56");
    }

    #[test]
    fn converts_minor_units_to_decimal() {
        assert_eq!(minor_to_decimal(10100), 101.0);
        assert_eq!(minor_to_decimal(5850), 58.5);
    }
}
