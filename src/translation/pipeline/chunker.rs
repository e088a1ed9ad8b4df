//! 文本分块
//!
//! 按段落边界把长文本切成不超过上限的分块，单个段落超长时按字符硬切。
//! 所有长度以 Unicode 字符计数，不会把多字节字符切开。

use crate::translation::config::constants::PARAGRAPH_SEPARATOR;
use crate::translation::error::{TranslationError, TranslationResult};

/// 把文本切分成有序分块
///
/// - 文本不超过上限时原样作为唯一分块返回
/// - 相邻段落贪心合并，合并后以 `"\n\n"` 连接，加上分隔符超过上限时另起一块
/// - 超长段落先结束当前分块，再按 `max_chars` 切片，最后一片可以更短
/// - 空文本返回空列表
///
/// `max_chars` 为 0 时返回配置错误。
pub fn split_text(text: &str, max_chars: usize) -> TranslationResult<Vec<String>> {
    if max_chars == 0 {
        return Err(TranslationError::ConfigError(
            "分块大小必须大于0".to_string(),
        ));
    }

    if text.is_empty() {
        return Ok(Vec::new());
    }

    if char_len(text) <= max_chars {
        return Ok(vec![text.to_string()]);
    }

    let separator_len = char_len(PARAGRAPH_SEPARATOR);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for paragraph in text.split(PARAGRAPH_SEPARATOR) {
        let paragraph_len = char_len(paragraph);

        if paragraph_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            chunks.extend(hard_split(paragraph, max_chars));
            continue;
        }

        if !current.is_empty() && current_len + separator_len + paragraph_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push_str(PARAGRAPH_SEPARATOR);
            current_len += separator_len;
        }
        current.push_str(paragraph);
        current_len += paragraph_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    Ok(chunks)
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// 按字符数切片
fn hard_split(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|slice| slice.iter().collect())
        .collect()
}
