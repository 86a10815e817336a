// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Printf-style templates resolved at runtime.
//!
//! Specifiers follow `%[index$][flags][width][.precision]conversion`:
//!
//! | conversion | argument |
//! |---|---|
//! | `s` `S` | anything, displayed |
//! | `b` `B` | booleans; any other value prints `true` |
//! | `c` `C` | characters or code points |
//! | `d` | integers |
//! | `o` `x` `X` | integers, negative values in two's complement |
//! | `f` `e` `E` `g` `G` | floats or integers |
//! | `n` | no argument, a line break |
//! | `%` | no argument, a literal `%` |
//!
//! Flags are `-` (left justify), `#` (alternate form), `+`, ` `, `0`, `,` (US grouping) and `(`.
//! `index$` picks an argument by its 1-based position and `<` reuses the previous argument.
//! Arguments left unused are ignored.

use std::fmt::Write;

use value_bag::ValueBag;

/// Why a template could not be resolved against its arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("missing argument for format specifier '{0}'")]
    MissingArgument(String),
    #[error("unknown format conversion '{0}'")]
    UnknownConversion(String),
    #[error("conversion '{conversion}' cannot format argument {index} ({value})")]
    IllegalConversion {
        conversion: char,
        index: usize,
        value: String,
    },
    #[error("flags '{flags}' are illegal with conversion '{conversion}'")]
    IllegalFlags { flags: String, conversion: char },
    #[error("format specifier '{0}' requires a width")]
    MissingWidth(String),
    #[error("precision is not allowed with conversion '{0}'")]
    IllegalPrecision(char),
}

/// Substitute `args` into `template`.
///
/// ```
/// use tagforth::format::format;
/// use value_bag::ValueBag;
///
/// let text = format("x=%d, y=%.2f", &[ValueBag::from(5), ValueBag::from(1.5)]).unwrap();
/// assert_eq!(text, "x=5, y=1.50");
/// ```
pub fn format(template: &str, args: &[ValueBag<'_>]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len() + 8 * args.len());
    let mut rest = template;
    let mut ordinary = 0usize;
    let mut previous: Option<usize> = None;

    while let Some(percent) = rest.find('%') {
        out.push_str(&rest[..percent]);
        let (spec, len) = Spec::parse(&rest[percent..])?;
        rest = &rest[percent + len..];

        match spec.conversion {
            '%' => spec.pad(&mut out, "%".to_string()),
            'n' => out.push('\n'),
            _ => {
                let index = match spec.index {
                    Index::Ordinary => {
                        ordinary += 1;
                        ordinary - 1
                    }
                    Index::Explicit(n) => n.saturating_sub(1),
                    Index::Previous => previous
                        .ok_or_else(|| FormatError::MissingArgument(spec.text.clone()))?,
                };
                let arg = match (spec.index, args.get(index)) {
                    (Index::Explicit(0), _) | (_, None) => {
                        return Err(FormatError::MissingArgument(spec.text.clone()));
                    }
                    (_, Some(arg)) => arg,
                };
                previous = Some(index);
                spec.render(&mut out, index, arg)?;
            }
        }
    }

    out.push_str(rest);
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Index {
    Ordinary,
    Explicit(usize),
    Previous,
}

#[derive(Debug, Default, Clone, Copy)]
struct Flags {
    left: bool,
    alternate: bool,
    plus: bool,
    space: bool,
    zero: bool,
    group: bool,
    parens: bool,
}

impl Flags {
    fn numeric(&self) -> bool {
        self.plus || self.space || self.zero || self.group || self.parens
    }
}

#[derive(Debug)]
struct Spec {
    text: String,
    index: Index,
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: char,
    upper: bool,
}

impl Spec {
    // `s` starts at the '%'; returns the spec and its length in bytes
    fn parse(s: &str) -> Result<(Spec, usize), FormatError> {
        let bytes = s.as_bytes();
        let mut pos = 1;

        let digits = |from: usize| {
            let end = bytes[from..]
                .iter()
                .position(|b| !b.is_ascii_digit())
                .map_or(bytes.len(), |n| from + n);
            (end, s[from..end].parse::<usize>().ok())
        };

        let mut index = Index::Ordinary;
        let (end, number) = digits(pos);
        if number.is_some() && bytes.get(end) == Some(&b'$') {
            index = Index::Explicit(number.unwrap_or_default());
            pos = end + 1;
        }

        let mut flags = Flags::default();
        let mut flag_text = String::new();
        while let Some(&b) = bytes.get(pos) {
            match b {
                b'-' => flags.left = true,
                b'#' => flags.alternate = true,
                b'+' => flags.plus = true,
                b' ' => flags.space = true,
                b'0' => flags.zero = true,
                b',' => flags.group = true,
                b'(' => flags.parens = true,
                b'<' => index = Index::Previous,
                _ => break,
            }
            if b != b'<' {
                flag_text.push(b as char);
            }
            pos += 1;
        }

        let (end, width) = digits(pos);
        pos = end;

        let mut precision = None;
        if bytes.get(pos) == Some(&b'.') {
            let (end, value) = digits(pos + 1);
            if value.is_none() {
                return Err(FormatError::UnknownConversion(s[..pos + 1].to_string()));
            }
            precision = value;
            pos = end;
        }

        let Some(conversion) = s[pos..].chars().next() else {
            return Err(FormatError::UnknownConversion(s.to_string()));
        };
        pos += conversion.len_utf8();
        let text = s[..pos].to_string();

        let upper = conversion.is_ascii_uppercase();
        let conversion = match conversion {
            'S' | 'B' | 'C' | 'X' | 'E' | 'G' => conversion.to_ascii_lowercase(),
            's' | 'b' | 'c' | 'd' | 'o' | 'x' | 'e' | 'f' | 'g' | 'n' | '%' => conversion,
            _ => return Err(FormatError::UnknownConversion(text)),
        };

        let spec = Spec {
            text,
            index,
            flags,
            width,
            precision,
            conversion,
            upper,
        };
        spec.check(&flag_text)?;
        Ok((spec, pos))
    }

    fn check(&self, flag_text: &str) -> Result<(), FormatError> {
        let flags = self.flags;
        let illegal = || FormatError::IllegalFlags {
            flags: flag_text.to_string(),
            conversion: self.conversion,
        };

        if (flags.left || flags.zero) && self.width.is_none() && self.conversion != 'n' {
            return Err(FormatError::MissingWidth(self.text.clone()));
        }
        if (flags.left && flags.zero) || (flags.plus && flags.space) {
            return Err(illegal());
        }

        match self.conversion {
            'n' if !flag_text.is_empty() || self.width.is_some() => Err(illegal()),
            'n' | 'd' | 'c' | 'o' | 'x' if self.precision.is_some() => {
                Err(FormatError::IllegalPrecision(self.conversion))
            }
            's' | 'b' | 'c' | '%' if flags.numeric() || flags.alternate => Err(illegal()),
            'd' if flags.alternate => Err(illegal()),
            'o' | 'x' if flags.plus || flags.space || flags.group || flags.parens => Err(illegal()),
            'e' if flags.group => Err(illegal()),
            _ => Ok(()),
        }
    }

    fn render(&self, out: &mut String, index: usize, arg: &ValueBag<'_>) -> Result<(), FormatError> {
        let illegal = || FormatError::IllegalConversion {
            conversion: self.conversion,
            index: index + 1,
            value: arg.to_string(),
        };

        let text = match self.conversion {
            's' => self.truncate(arg.to_string()),
            'b' => self.truncate(arg.to_bool().unwrap_or(true).to_string()),
            'c' => arg
                .to_char()
                .or_else(|| arg.to_u64().and_then(|n| char::from_u32(u32::try_from(n).ok()?)))
                .ok_or_else(illegal)?
                .to_string(),
            'd' => {
                let n = integer(arg).ok_or_else(illegal)?;
                let digits = n.unsigned_abs().to_string();
                self.signed(n < 0, self.group_digits(digits))
            }
            'o' | 'x' => {
                let n = integer(arg).ok_or_else(illegal)?;
                // negative values print as their 64-bit two's complement
                let n = if n < 0 { n as i64 as u64 as u128 } else { n as u128 };
                let (digits, prefix) = match self.conversion {
                    'o' => (format!("{n:o}"), "0"),
                    _ => (format!("{n:x}"), "0x"),
                };
                let prefix = if self.flags.alternate { prefix } else { "" };
                self.zero_fill(prefix, digits)
            }
            'f' | 'e' | 'g' => {
                let v = arg
                    .to_f64()
                    .or_else(|| integer(arg).map(|n| n as f64))
                    .ok_or_else(illegal)?;
                self.float(v)
            }
            _ => return Err(FormatError::UnknownConversion(self.text.clone())),
        };

        let text = if self.upper { text.to_uppercase() } else { text };
        self.pad(out, text);
        Ok(())
    }

    fn truncate(&self, text: String) -> String {
        match self.precision {
            Some(precision) => text.chars().take(precision).collect(),
            None => text,
        }
    }

    fn float(&self, v: f64) -> String {
        if v.is_nan() {
            return "NaN".to_string();
        }
        if v.is_infinite() {
            let text = "Infinity".to_string();
            return self.sign_only(v < 0.0, text);
        }

        let precision = self.precision.unwrap_or(6);
        let magnitude = v.abs();
        let body = match self.conversion {
            'f' => self.group_fixed(format!("{magnitude:.precision$}")),
            'e' => scientific(magnitude, precision),
            _ => {
                let precision = precision.max(1);
                // notation is chosen on the value rounded to `precision` significant digits
                let rounded = format!("{magnitude:.*e}", precision - 1)
                    .parse::<f64>()
                    .unwrap_or(magnitude);
                if rounded != 0.0 && (rounded < 1e-4 || rounded >= 10f64.powi(precision as i32)) {
                    scientific(magnitude, precision - 1)
                } else {
                    let exponent = if rounded == 0.0 {
                        0
                    } else {
                        rounded.log10().floor() as i64
                    };
                    let decimals = (precision as i64 - 1 - exponent).max(0) as usize;
                    self.group_fixed(format!("{magnitude:.decimals$}"))
                }
            }
        };
        self.signed(v.is_sign_negative() && v != 0.0, body)
    }

    fn group_fixed(&self, fixed: String) -> String {
        match fixed.split_once('.') {
            Some((int, frac)) => format!("{}.{frac}", self.group_digits(int.to_string())),
            None => self.group_digits(fixed),
        }
    }

    fn group_digits(&self, digits: String) -> String {
        if !self.flags.group || digits.len() <= 3 {
            return digits;
        }
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        grouped
    }

    fn sign_only(&self, negative: bool, body: String) -> String {
        match (negative, self.flags) {
            (true, Flags { parens: true, .. }) => format!("({body})"),
            (true, _) => format!("-{body}"),
            (false, Flags { plus: true, .. }) => format!("+{body}"),
            (false, Flags { space: true, .. }) => format!(" {body}"),
            (false, _) => body,
        }
    }

    fn signed(&self, negative: bool, body: String) -> String {
        let (lead, trail) = match (negative, self.flags) {
            (true, Flags { parens: true, .. }) => ("(", ")"),
            (true, _) => ("-", ""),
            (false, Flags { plus: true, .. }) => ("+", ""),
            (false, Flags { space: true, .. }) => (" ", ""),
            (false, _) => ("", ""),
        };
        let filled = self.zero_fill(lead, body);
        format!("{filled}{trail}")
    }

    // zeros go between the sign or prefix and the digits
    fn zero_fill(&self, lead: &str, body: String) -> String {
        let len = lead.chars().count() + body.chars().count();
        match self.width {
            Some(width) if self.flags.zero && width > len => {
                format!("{lead}{}{body}", "0".repeat(width - len))
            }
            _ => format!("{lead}{body}"),
        }
    }

    fn pad(&self, out: &mut String, text: String) {
        let len = text.chars().count();
        let fill = self.width.map_or(0, |width| width.saturating_sub(len));
        if self.flags.left {
            out.push_str(&text);
            out.extend(std::iter::repeat_n(' ', fill));
        } else {
            out.extend(std::iter::repeat_n(' ', fill));
            out.push_str(&text);
        }
    }
}

fn integer(arg: &ValueBag<'_>) -> Option<i128> {
    arg.to_i64()
        .map(i128::from)
        .or_else(|| arg.to_u64().map(i128::from))
}

// `1.234560e+01`: at least two exponent digits, always signed
fn scientific(v: f64, precision: usize) -> String {
    let text = format!("{v:.precision$e}");
    let (mantissa, exponent) = text.split_once('e').unwrap_or((&text, "0"));
    let exponent: i32 = exponent.parse().unwrap_or_default();
    let sign = if exponent < 0 { '-' } else { '+' };
    let mut out = String::with_capacity(mantissa.len() + 4);
    // SAFETY: write to a string always succeeds
    write!(&mut out, "{mantissa}e{sign}{:02}", exponent.abs()).unwrap();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(template: &str, args: &[ValueBag<'_>]) -> String {
        format(template, args).unwrap()
    }

    #[test]
    fn test_integers() {
        assert_eq!(fmt("x=%d", &[ValueBag::from(5)]), "x=5");
        assert_eq!(fmt("%05d|%-5d|%5d", &[ValueBag::from(42), ValueBag::from(42), ValueBag::from(-42)]), "00042|42   |  -42");
        assert_eq!(fmt("%,d", &[ValueBag::from(1234567)]), "1,234,567");
        assert_eq!(fmt("%+d %(d", &[ValueBag::from(7), ValueBag::from(-7)]), "+7 (7)");
        assert_eq!(fmt("%x %#X %o", &[ValueBag::from(255), ValueBag::from(255), ValueBag::from(8)]), "ff 0XFF 10");
        assert_eq!(fmt("%x", &[ValueBag::from(-1i32)]), "ffffffffffffffff");
    }

    #[test]
    fn test_floats() {
        assert_eq!(fmt("%.2f", &[ValueBag::from(3.14159)]), "3.14");
        assert_eq!(fmt("%f", &[ValueBag::from(1.5)]), "1.500000");
        assert_eq!(fmt("%08.3f", &[ValueBag::from(-3.5)]), "-003.500");
        assert_eq!(fmt("%e", &[ValueBag::from(12345.678)]), "1.234568e+04");
        assert_eq!(fmt("%.1E", &[ValueBag::from(0.00012)]), "1.2E-04");
        assert_eq!(fmt("%g", &[ValueBag::from(0.5)]), "0.500000");
        assert_eq!(fmt("%,.1f", &[ValueBag::from(98765.43)]), "98,765.4");
        assert_eq!(fmt("%.1f", &[ValueBag::from(3)]), "3.0");
    }

    #[test]
    fn test_general_notation_follows_rounding() {
        assert_eq!(fmt("%g", &[ValueBag::from(999999.5)]), "1.00000e+06");
        assert_eq!(fmt("%g", &[ValueBag::from(1234567.0)]), "1.23457e+06");
        assert_eq!(fmt("%g", &[ValueBag::from(123456.0)]), "123456");
        assert_eq!(fmt("%.3g", &[ValueBag::from(999.6)]), "1.00e+03");
    }

    #[test]
    fn test_strings_and_others() {
        assert_eq!(fmt("%s and %S", &[ValueBag::from("ab"), ValueBag::from("cd")]), "ab and CD");
        assert_eq!(fmt("[%-5s][%5s][%.1s]", &[ValueBag::from("ab"), ValueBag::from("ab"), ValueBag::from("ab")]), "[ab   ][   ab][a]");
        assert_eq!(fmt("%b %b %B", &[ValueBag::from(false), ValueBag::from("x"), ValueBag::from(true)]), "false true TRUE");
        assert_eq!(fmt("%c%c", &[ValueBag::from('o'), ValueBag::from(107)]), "ok");
        assert_eq!(fmt("100%% done%n", &[]), "100% done\n");
    }

    #[test]
    fn test_argument_indexes() {
        let args = [ValueBag::from("a"), ValueBag::from("b")];
        assert_eq!(fmt("%2$s %1$s %<s %s", &args), "b a a a");
        assert_eq!(fmt("only %s", &args), "only a");
    }

    #[test]
    fn test_no_specifiers() {
        assert_eq!(fmt("plain text", &[ValueBag::from(1)]), "plain text");
    }

    #[test]
    fn test_illegal_conversion() {
        let err = format("x=%d", &[ValueBag::from("notanumber")]).unwrap_err();
        assert_eq!(
            err,
            FormatError::IllegalConversion {
                conversion: 'd',
                index: 1,
                value: "notanumber".to_string(),
            }
        );
        insta::assert_snapshot!(err.to_string(), @"conversion 'd' cannot format argument 1 (notanumber)");
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            format("%s %s", &[ValueBag::from(1)]),
            Err(FormatError::MissingArgument("%s".to_string()))
        );
        assert_eq!(
            format("%q", &[ValueBag::from(1)]),
            Err(FormatError::UnknownConversion("%q".to_string()))
        );
        assert_eq!(
            format("50%", &[]),
            Err(FormatError::UnknownConversion("%".to_string()))
        );
        assert_eq!(
            format("%-d", &[ValueBag::from(1)]),
            Err(FormatError::MissingWidth("%-d".to_string()))
        );
        assert_eq!(
            format("%.2d", &[ValueBag::from(1)]),
            Err(FormatError::IllegalPrecision('d'))
        );
        assert!(matches!(
            format("%#s", &[ValueBag::from(1)]),
            Err(FormatError::IllegalFlags { .. })
        ));
        assert_eq!(
            format("%0$s", &[ValueBag::from(1)]),
            Err(FormatError::MissingArgument("%0$s".to_string()))
        );
    }
}
