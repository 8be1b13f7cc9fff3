use serde::{Deserialize, Serialize};

/// Currencies the quote renderer has a symbol for.
///
/// Serialized as `{"code": "EUR", "symbol": "€"}`; only `code` is read back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "CurrencyRepr", into = "CurrencyRepr")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Pkr,
}

impl Currency {
    /// Maps a three-letter code to a currency, falling back to USD for codes
    /// without a dedicated symbol.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "PKR" => Self::Pkr,
            "EUR" => Self::Eur,
            "GBP" => Self::Gbp,
            _ => Self::Usd,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Pkr => "PKR",
        }
    }

    /// Display prefix for amounts. PKR carries a trailing space.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Eur => "€",
            Self::Gbp => "£",
            Self::Pkr => "PKR ",
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CurrencyRepr {
    code: String,
    #[serde(default)]
    symbol: String,
}

impl From<Currency> for CurrencyRepr {
    fn from(value: Currency) -> Self {
        Self { code: value.code().to_string(), symbol: value.symbol().to_string() }
    }
}

impl From<CurrencyRepr> for Currency {
    fn from(value: CurrencyRepr) -> Self {
        Self::from_code(&value.code)
    }
}
