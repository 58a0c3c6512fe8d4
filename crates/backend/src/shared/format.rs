use serde_json::Value;

/// Форматирует число с разделителями тысяч (запятыми)
///
/// # Примеры
/// ```ignore
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    group_digits(&n.to_string())
}

/// Вставляет запятые между триадами строки из цифр
fn group_digits(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}

/// Группирует разряды в текстовом представлении числа: `-1234.5` -> `-1,234.5`.
///
/// Возвращает `None`, если строка не является числом.
pub fn intcomma_str(text: &str) -> Option<String> {
    let text = text.trim();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    let is_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !is_digits(whole) || fraction.is_some_and(|f| !is_digits(f)) {
        return None;
    }

    let mut result = format!("{}{}", sign, group_digits(whole));
    if let Some(fraction) = fraction {
        result.push('.');
        result.push_str(fraction);
    }
    Some(result)
}

/// Группирует разряды числового JSON-значения (числа или числовой строки)
pub fn intcomma(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => intcomma_str(&n.to_string()),
        Value::String(s) => intcomma_str(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(42), "42");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }

    #[test]
    fn test_intcomma() {
        assert_eq!(intcomma(&json!(1000)).as_deref(), Some("1,000"));
        assert_eq!(intcomma(&json!(-1234567)).as_deref(), Some("-1,234,567"));
        assert_eq!(intcomma(&json!(1234.5)).as_deref(), Some("1,234.5"));
        assert_eq!(intcomma(&json!("98765.40")).as_deref(), Some("98,765.40"));
        assert_eq!(intcomma(&json!(12)).as_deref(), Some("12"));
        assert_eq!(intcomma(&json!("12a")), None);
        assert_eq!(intcomma(&json!("1.")), None);
        assert_eq!(intcomma(&json!(true)), None);
    }
}
