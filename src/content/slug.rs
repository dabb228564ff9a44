use unicode_normalization::char::decompose_canonical;

/// 由标题生成 URL 安全的 slug
///
/// - 带变音符的字母还原为基本拉丁字母（越南语 `Đ/đ` 映射为 `D/d`）
/// - 少数符号就地展开为单词，例如 `&` -> `and`、`%` -> `percent`
/// - 空白与 `-` 作为单词分隔
/// - 其余非 `[A-Za-z0-9]` 字符直接丢弃
/// - 单词以 `-` 连接并转为小写
///
/// ```
/// assert_eq!(postdesk::content::slugify("Tin Nóng Hôm Nay"), "tin-nong-hom-nay");
/// ```
pub fn slugify(title: impl AsRef<str>) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut word = String::new();

    for ch in title.as_ref().chars() {
        if ch.is_whitespace() || ch == '-' {
            if !word.is_empty() {
                words.push(std::mem::take(&mut word));
            }
            continue;
        }

        match transliterate(ch) {
            Some(text) => push_alnum(&mut word, text.chars()),
            None => {
                let mut base = String::new();
                decompose_canonical(ch, |c| {
                    if !is_combining_mark(c) {
                        base.push(c);
                    }
                });
                push_alnum(&mut word, base.chars());
            }
        }
    }

    if !word.is_empty() {
        words.push(word);
    }

    words.join("-")
}

/// 无法通过 Unicode 分解还原的字符，结果并入当前单词
fn transliterate(ch: char) -> Option<&'static str> {
    let mapped = match ch {
        'Đ' | 'Ð' => "D",
        'đ' | 'ð' => "d",
        'Æ' => "AE",
        'æ' => "ae",
        'Œ' => "OE",
        'œ' => "oe",
        'Ø' => "O",
        'ø' => "o",
        'Ł' => "L",
        'ł' => "l",
        'Þ' => "TH",
        'þ' => "th",
        'ß' => "ss",
        '&' => "and",
        '%' => "percent",
        '$' => "dollar",
        '€' => "euro",
        '£' => "pound",
        '<' => "less",
        '>' => "greater",
        '|' => "or",
        _ => return None,
    };
    Some(mapped)
}

fn push_alnum(word: &mut String, chars: impl Iterator<Item = char>) {
    word.extend(
        chars
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase()),
    );
}

fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}' | '\u{1AB0}'..='\u{1AFF}' | '\u{1DC0}'..='\u{1DFF}')
}
