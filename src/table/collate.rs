//! Locale-style string collation
//!
//! Approximates root-locale ordering with three levels:
//! primary (character class, then base letter ignoring case and accents;
//! accents are folded for Latin-1 and Latin Extended-A letters),
//! secondary (unaccented before accented), tertiary (lowercase before
//! uppercase). Code point order breaks any remaining tie.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Symbol,  // whitespace and punctuation sort first
    Digit,
    Letter,
}

#[derive(Debug, Clone, Copy)]
struct Weight {
    class: CharClass,
    base: char,
    accented: bool,
    upper: bool,
}

fn weigh(c: char) -> Weight {
    let lower = c.to_lowercase().next().unwrap_or(c);
    let (base, accented) = fold_accent(lower);
    let class = if c.is_alphabetic() {
        CharClass::Letter
    } else if c.is_numeric() {
        CharClass::Digit
    } else {
        CharClass::Symbol
    };

    Weight {
        class,
        base,
        accented,
        upper: c.is_uppercase(),
    }
}

/// Map lowercase accented Latin letters to their base letter
fn fold_accent(c: char) -> (char, bool) {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' | 'ħ' => 'h',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' | 'ŧ' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        _ => return (c, false),
    };
    (base, true)
}

/// Compare two display strings the way a user expects them ordered
pub fn compare(a: &str, b: &str) -> Ordering {
    let wa: Vec<Weight> = a.chars().map(weigh).collect();
    let wb: Vec<Weight> = b.chars().map(weigh).collect();

    wa.iter()
        .map(|w| (w.class, w.base))
        .cmp(wb.iter().map(|w| (w.class, w.base)))
        .then_with(|| wa.iter().map(|w| w.accented).cmp(wb.iter().map(|w| w.accented)))
        .then_with(|| wa.iter().map(|w| w.upper).cmp(wb.iter().map(|w| w.upper)))
        .then_with(|| a.cmp(b))
}
