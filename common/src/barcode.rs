//! 1次元バーコードのシンボル体系判定
//!
//! スキャナがデコード済みの文字列を渡してくるので、ここでは
//! 有効なシンボル体系に当てはまるか（EAN/UPCはチェックデジットも）を確認する。

use serde::{Deserialize, Serialize};

/// 対応シンボル体系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    Ean13,
    UpcA,
    Ean8,
    UpcE,
    Code39Vin,
    Interleaved2Of5,
    Codabar,
    Code39,
    Code128,
}

impl Symbology {
    /// 判定順（制約の強いものから）
    pub const ALL: [Symbology; 9] = [
        Symbology::Ean13,
        Symbology::UpcA,
        Symbology::Ean8,
        Symbology::UpcE,
        Symbology::Code39Vin,
        Symbology::Interleaved2Of5,
        Symbology::Codabar,
        Symbology::Code39,
        Symbology::Code128,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Symbology::Ean13 => "EAN-13",
            Symbology::UpcA => "UPC-A",
            Symbology::Ean8 => "EAN-8",
            Symbology::UpcE => "UPC-E",
            Symbology::Code39Vin => "Code 39 VIN",
            Symbology::Interleaved2Of5 => "Interleaved 2 of 5",
            Symbology::Codabar => "Codabar",
            Symbology::Code39 => "Code 39",
            Symbology::Code128 => "Code 128",
        }
    }

    /// この体系として妥当な文字列か
    pub fn matches(&self, code: &str) -> bool {
        match self {
            Symbology::Ean13 => code.len() == 13 && is_digits(code) && has_valid_check_digit(code),
            Symbology::UpcA => code.len() == 12 && is_digits(code) && has_valid_check_digit(code),
            Symbology::Ean8 => code.len() == 8 && is_digits(code) && has_valid_check_digit(code),
            Symbology::UpcE => is_valid_upc_e(code),
            Symbology::Code39Vin => {
                code.len() == 17
                    && code
                        .chars()
                        .all(|c| c.is_ascii_digit() || (c.is_ascii_uppercase() && !matches!(c, 'I' | 'O' | 'Q')))
            }
            Symbology::Interleaved2Of5 => !code.is_empty() && code.len() % 2 == 0 && is_digits(code),
            Symbology::Codabar => is_valid_codabar(code),
            Symbology::Code39 => {
                !code.is_empty()
                    && code
                        .chars()
                        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase() || " -.$/+%".contains(c))
            }
            Symbology::Code128 => !code.is_empty() && code.chars().all(|c| (' '..='~').contains(&c)),
        }
    }
}

/// 有効な体系のうち最初に当てはまるものを返す
///
/// `enabled` の並び順ではなく `Symbology::ALL` の判定順で評価する。
pub fn classify(code: &str, enabled: &[Symbology]) -> Option<Symbology> {
    let code = code.trim();
    Symbology::ALL
        .iter()
        .copied()
        .filter(|s| enabled.contains(s))
        .find(|s| s.matches(code))
}

fn is_digits(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit())
}

/// EAN/UPC共通のチェックデジット計算（右端のデータ桁から 3,1,3,1...）
pub fn check_digit(data: &str) -> Option<u32> {
    let mut sum = 0;
    for (i, c) in data.chars().rev().enumerate() {
        let digit = c.to_digit(10)?;
        sum += if i % 2 == 0 { digit * 3 } else { digit };
    }
    Some((10 - sum % 10) % 10)
}

fn has_valid_check_digit(code: &str) -> bool {
    let (data, check) = code.split_at(code.len() - 1);
    match (check_digit(data), check.chars().next().and_then(|c| c.to_digit(10))) {
        (Some(expected), Some(actual)) => expected == actual,
        _ => false,
    }
}

/// UPC-E (8桁: ナンバーシステム + 6桁 + チェック) をUPC-Aのデータ11桁に展開
pub fn expand_upc_e(code: &str) -> Option<String> {
    if code.len() != 8 || !is_digits(code) {
        return None;
    }
    let d: Vec<char> = code.chars().collect();
    let n = d[0];
    if n != '0' && n != '1' {
        return None;
    }
    let body = &d[1..7];
    let expanded: String = match body[5] {
        '0' | '1' | '2' => [n, body[0], body[1], body[5], '0', '0', '0', '0', body[2], body[3], body[4]]
            .iter()
            .collect(),
        '3' => [n, body[0], body[1], body[2], '0', '0', '0', '0', '0', body[3], body[4]]
            .iter()
            .collect(),
        '4' => [n, body[0], body[1], body[2], body[3], '0', '0', '0', '0', '0', body[4]]
            .iter()
            .collect(),
        _ => [n, body[0], body[1], body[2], body[3], body[4], '0', '0', '0', '0', body[5]]
            .iter()
            .collect(),
    };
    Some(expanded)
}

fn is_valid_upc_e(code: &str) -> bool {
    let Some(expanded) = expand_upc_e(code) else {
        return false;
    };
    let check = code.chars().last().and_then(|c| c.to_digit(10));
    check_digit(&expanded).is_some() && check_digit(&expanded) == check
}

fn is_valid_codabar(code: &str) -> bool {
    let upper = code.to_ascii_uppercase();
    let bytes = upper.as_bytes();
    if bytes.len() < 3 {
        return false;
    }
    let is_guard = |b: u8| matches!(b, b'A'..=b'D');
    is_guard(bytes[0])
        && is_guard(bytes[bytes.len() - 1])
        && bytes[1..bytes.len() - 1]
            .iter()
            .all(|&b| b.is_ascii_digit() || b"-$:/.+".contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_digit() {
        assert_eq!(check_digit("400638133393"), Some(1));
        assert_eq!(check_digit("03600029145"), Some(2));
        assert_eq!(check_digit("9638507"), Some(4));
        assert_eq!(check_digit("12a"), None);
    }

    #[test]
    fn test_classify_ean13() {
        assert_eq!(classify("4006381333931", &Symbology::ALL), Some(Symbology::Ean13));
    }

    #[test]
    fn test_classify_ean13_bad_check_digit_falls_through() {
        // チェックデジット不正の13桁は Code 39 扱い（I2of5は奇数桁なので不可）
        assert_eq!(classify("4006381333932", &Symbology::ALL), Some(Symbology::Code39));
        assert_eq!(classify("4006381333932", &[Symbology::Ean13]), None);
    }

    #[test]
    fn test_classify_upc_a() {
        assert_eq!(classify("036000291452", &Symbology::ALL), Some(Symbology::UpcA));
    }

    #[test]
    fn test_classify_ean8() {
        assert_eq!(classify("96385074", &Symbology::ALL), Some(Symbology::Ean8));
    }

    #[test]
    fn test_upc_e_expansion() {
        assert_eq!(expand_upc_e("01234565").as_deref(), Some("01234500006"));
        assert_eq!(expand_upc_e("01234505").as_deref(), Some("01200000345"));
        assert_eq!(expand_upc_e("21234565"), None);
        assert_eq!(classify("01234565", &[Symbology::UpcE]), Some(Symbology::UpcE));
        assert_eq!(classify("01234566", &[Symbology::UpcE]), None);
    }

    #[test]
    fn test_classify_vin() {
        assert_eq!(classify("1M8GDM9AXKP042788", &Symbology::ALL), Some(Symbology::Code39Vin));
        // I/O/Q はVINに使えない
        assert_ne!(classify("1M8GDM9AXKP0427OO", &Symbology::ALL), Some(Symbology::Code39Vin));
    }

    #[test]
    fn test_classify_interleaved_2_of_5() {
        assert_eq!(classify("1234567890", &Symbology::ALL), Some(Symbology::Interleaved2Of5));
    }

    #[test]
    fn test_classify_codabar() {
        assert_eq!(classify("A40156B", &Symbology::ALL), Some(Symbology::Codabar));
        assert!(!Symbology::Codabar.matches("AB"));
    }

    #[test]
    fn test_classify_code39_and_code128() {
        assert_eq!(classify("CODE39 TEST", &Symbology::ALL), Some(Symbology::Code39));
        assert_eq!(classify("abc-123", &Symbology::ALL), Some(Symbology::Code128));
        assert_eq!(classify("abc-123", &[Symbology::Code39]), None);
    }

    #[test]
    fn test_classify_rejects_empty_and_control_chars() {
        assert_eq!(classify("", &Symbology::ALL), None);
        assert_eq!(classify("abc\u{7}", &Symbology::ALL), None);
    }

    #[test]
    fn test_symbology_serde() {
        let json = serde_json::to_string(&Symbology::Interleaved2Of5).unwrap();
        assert_eq!(json, "\"interleaved2_of5\"");
        let parsed: Symbology = serde_json::from_str("\"code39_vin\"").unwrap();
        assert_eq!(parsed, Symbology::Code39Vin);
    }
}
