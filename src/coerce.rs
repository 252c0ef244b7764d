//! 原始值文本 → 带类型的 [`Value`]

use crate::ast::Value;
use crate::masker::{MaskedString, ESCAPE};

const LIST_SEPARATOR: char = ',';

/// 转换条件中（已屏蔽字面量的）值文本
///
/// 优先级：`null`、布尔值、逗号列表、整数、浮点数、带引号的字面量，
/// 最后按原样作为字符串。
pub fn coerce_value(token: &str, masked: &MaskedString) -> Value {
    match token {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if let Some(pieces) = split_list(token) {
        return Value::List(
            pieces
                .into_iter()
                .map(|piece| coerce_scalar(piece.trim(), masked))
                .collect(),
        );
    }

    coerce_scalar(token, masked)
}

fn coerce_scalar(token: &str, masked: &MaskedString) -> Value {
    match token {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Some(n) = parse_integer(token) {
                Value::Int(n)
            } else if let Some(n) = parse_float(token) {
                Value::Float(n)
            } else if let Some(content) = masked.unquote(token) {
                Value::Str(content.to_string())
            } else {
                Value::Str(masked.restore(token))
            }
        }
    }
}

/// 按未转义的逗号切分，没有这样的逗号时返回 `None`
fn split_list(token: &str) -> Option<Vec<&str>> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in token.char_indices() {
        if escaped {
            escaped = false;
        } else if c == ESCAPE {
            escaped = true;
        } else if c == LIST_SEPARATOR {
            pieces.push(&token[start..i]);
            start = i + c.len_utf8();
        }
    }

    if pieces.is_empty() {
        return None;
    }
    pieces.push(&token[start..]);
    Some(pieces)
}

/// 可选符号，后面是 `0` 或不带前导零的数字
fn parse_integer(token: &str) -> Option<i64> {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    token.parse().ok()
}

/// 十进制小数，可带小数部分和指数；不接受 `inf`/`nan`
fn parse_float(token: &str) -> Option<f64> {
    let unsigned = token.strip_prefix(['+', '-']).unwrap_or(token);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(i) => (&unsigned[..i], Some(&unsigned[i + 1..])),
        None => (unsigned, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (mantissa, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }
    if let Some(exponent) = exponent {
        let exp_digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        if exp_digits.is_empty() || !all_digits(exp_digits) {
            return None;
        }
    }

    let sign = if token.starts_with('-') { "-" } else { "" };
    let normalized = format!(
        "{sign}{}.{}{}",
        if int_part.is_empty() { "0" } else { int_part },
        if frac_part.is_empty() { "0" } else { frac_part },
        exponent.map(|e| format!("e{e}")).unwrap_or_default(),
    );
    normalized.parse().ok().filter(|n: &f64| n.is_finite())
}
