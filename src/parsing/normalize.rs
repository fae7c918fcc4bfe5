/// Canonicalize full-width digits and punctuation before any pattern matching.
///
/// Full-width digits become ASCII, `／`, the ideographic space and full-width
/// parentheses become their ASCII forms, and every dash or minus variant
/// becomes `-`. The long-vowel marks `ー` and `ｰ` are left alone since they
/// are part of katakana names.
pub fn normalize(text: &str) -> String {
    text.chars().map(normalize_char).collect()
}

fn normalize_char(c: char) -> char {
    match c {
        '０'..='９' => full_width_digit(c),
        '／' => '/',
        '\u{3000}' => ' ',
        '（' => '(',
        '）' => ')',
        c if is_dash(c) => '-',
        c => c,
    }
}

fn full_width_digit(c: char) -> char {
    let offset = c as u32 - '０' as u32;
    char::from_digit(offset, 10).unwrap_or(c)
}

fn is_dash(c: char) -> bool {
    matches!(
        c,
        '\u{2010}' // hyphen
            | '\u{2011}' // non-breaking hyphen
            | '\u{2012}' // figure dash
            | '\u{2013}' // en dash
            | '\u{2014}' // em dash
            | '\u{2015}' // horizontal bar
            | '\u{2043}' // hyphen bullet
            | '\u{2212}' // minus sign
            | '\u{2E3A}' // two-em dash
            | '\u{2E3B}' // three-em dash
            | '\u{FE31}' // vertical em dash
            | '\u{FE32}' // vertical en dash
            | '\u{FE58}' // small em dash
            | '\u{FE63}' // small hyphen-minus
            | '\u{FF0D}' // full-width hyphen-minus
    )
}

/// Re-render an ASCII score with the full-width punctuation used in team reports.
pub fn display_score(score: &str) -> String {
    score
        .chars()
        .map(|c| match c {
            '-' => '－',
            '/' => '／',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_width_digits_and_punctuation() {
        assert_eq!(normalize("６－３／７（５）－６"), "6-3/7(5)-6");
        assert_eq!(normalize("選手A\u{3000}（大学）"), "選手A (大学)");
    }

    #[test]
    fn test_dash_variants_collapse_to_hyphen() {
        for dash in [
            '\u{2010}', '\u{2013}', '\u{2014}', '\u{2015}', '\u{2043}', '\u{2212}', '\u{2E3A}',
            '\u{2E3B}', '\u{FE31}', '\u{FE32}', '\u{FF0D}',
        ] {
            assert_eq!(normalize(&format!("6{dash}4")), "6-4");
        }
    }

    #[test]
    fn test_long_vowel_mark_preserved() {
        assert_eq!(normalize("ラーメン"), "ラーメン");
        assert_eq!(normalize("ｽｰﾊﾟｰ"), "ｽｰﾊﾟｰ");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "◆男子シングルス本戦１Ｒ",
            "６－２／６（４）－７ 対戦相手（大学）",
            "コーチ・ターナー — 9:00",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_other_characters_untouched() {
        assert_eq!(normalize("Ａチーム、対"), "Ａチーム、対");
    }

    #[test]
    fn test_display_score() {
        assert_eq!(display_score("6-3/6(4)-7"), "6－3／6(4)－7");
    }
}
