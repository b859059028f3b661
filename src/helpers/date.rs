//! Date helper functions

use chrono::{Datelike, NaiveDate};

use crate::i18n::Locale;

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

const MONTHS_IT: [&str; 12] = [
    "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto", "settembre",
    "ottobre", "novembre", "dicembre",
];

const MONTHS_ES: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
    "octubre", "noviembre", "diciembre",
];

/// Long-form date in the conventions of `locale`
///
/// # Examples
/// ```ignore
/// format_date(date, Locale::En) // -> "January 15, 2024"
/// format_date(date, Locale::It) // -> "15 gennaio 2024"
/// format_date(date, Locale::Es) // -> "15 de enero de 2024"
/// ```
pub fn format_date(date: NaiveDate, locale: Locale) -> String {
    let month = date.month0() as usize;
    match locale {
        Locale::En => format!("{} {}, {}", MONTHS_EN[month], date.day(), date.year()),
        Locale::It => format!("{} {} {}", date.day(), MONTHS_IT[month], date.year()),
        Locale::Es => format!("{} de {} de {}", date.day(), MONTHS_ES[month], date.year()),
    }
}

/// Date in W3C / ISO 8601 format, as used by sitemaps and structured data
pub fn date_xml(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
