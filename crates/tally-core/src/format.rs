//! Locale-aware currency and month-label helpers.

/// Number and currency conventions for a supported locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleStyle {
    pub currency_symbol: &'static str,
    pub symbol_spacing: bool,
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub month_abbreviations: [&'static str; 12],
}

const PT_BR: LocaleStyle = LocaleStyle {
    currency_symbol: "R$",
    symbol_spacing: true,
    decimal_separator: ',',
    grouping_separator: '.',
    month_abbreviations: [
        "jan.", "fev.", "mar.", "abr.", "mai.", "jun.", "jul.", "ago.", "set.", "out.", "nov.",
        "dez.",
    ],
};

const EN_US: LocaleStyle = LocaleStyle {
    currency_symbol: "$",
    symbol_spacing: false,
    decimal_separator: '.',
    grouping_separator: ',',
    month_abbreviations: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
};

impl LocaleStyle {
    /// Looks up a locale tag such as `pt-BR` or `en_US`. Unknown tags use `pt-BR`.
    pub fn for_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "en" | "en-us" | "en-gb" => EN_US,
            _ => PT_BR,
        }
    }
}

/// Short month label for a zero-based month index.
pub fn month_abbreviation(locale: &str, month_index: u32) -> &'static str {
    let style = LocaleStyle::for_tag(locale);
    style.month_abbreviations[(month_index % 12) as usize]
}

/// Parses typed or pasted currency text.
///
/// Every non-digit is dropped and the remaining digits are read as cents, so
/// `"R$ 1.234,56"` is `1234.56`. Text without digits is `0.0`, never an error.
pub fn parse_currency(text: &str) -> f64 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0.0;
    }
    digits.parse::<f64>().map(|cents| cents / 100.0).unwrap_or(0.0)
}

/// Renders an amount with two decimals in the locale's currency format.
pub fn format_currency(value: f64, locale: &str) -> String {
    format_currency_with_symbol(value, locale, None)
}

/// Like [`format_currency`], with `symbol` in place of the locale's own.
pub fn format_currency_with_symbol(value: f64, locale: &str, symbol: Option<&str>) -> String {
    let style = LocaleStyle::for_tag(locale);
    let symbol = symbol.unwrap_or(style.currency_symbol);
    let value = if value.is_finite() { value } else { 0.0 };
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(style.grouping_separator);
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    let spacing = if style.symbol_spacing { " " } else { "" };
    format!(
        "{sign}{symbol}{spacing}{grouped}{}{cents}",
        style.decimal_separator
    )
}

/// Re-renders free-form currency input in canonical form.
pub fn normalize_currency_input(text: &str, locale: &str) -> String {
    format_currency(parse_currency(text), locale)
}
