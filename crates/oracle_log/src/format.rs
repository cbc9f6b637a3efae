//! printf-style payload rendering.
//!
//! Templates come straight from C/C++ log statements. Each conversion
//! specifier consumes the next argument; arguments the generator cannot know
//! (variable names, expressions) are replaced by plausible synthetic values.
//! Rendering never fails: a slot that cannot be formatted becomes an inline
//! `[FMT_ERR:<value>]` marker and the rest of the payload is still produced.

use once_cell::sync::Lazy;
use oracle_core::ArgValue;
use rand::Rng;
use regex::{Captures, Regex};
use std::fmt;

/// Placeholder for an unknown string argument
pub const FALLBACK_STRING: &str = "[SIM_STRING]";

/// Placeholder for an unknown char argument
pub const FALLBACK_CHAR: char = 'S';

/// Placeholder for a conversion with no synthetic value
pub const FALLBACK_UNKNOWN: &str = "[?]";

/// Prefix of the inline marker emitted for an unformattable slot
pub const ERROR_MARKER_PREFIX: &str = "[FMT_ERR:";

/// Width and precision ceiling; larger requests are clamped.
const MAX_FIELD: usize = 1024;

static SPECIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%%|%([-+ #0]*)(\d+)?(?:\.(\d*))?[hljztL]*([cdeEfgGosuxXpn])")
        .expect("specifier pattern is valid")
});

/// Value family a conversion expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    /// `%d %u %o %x %X`
    Integer,
    /// `%e %E %f %g %G`
    Float,
    /// `%s`
    Text,
    /// `%p`
    Pointer,
    /// `%c`
    Char,
    /// `%n`, never rendered
    Count,
}

impl SpecKind {
    fn of(conversion: char) -> Self {
        match conversion {
            'd' | 'u' | 'o' | 'x' | 'X' => Self::Integer,
            'e' | 'E' | 'f' | 'g' | 'G' => Self::Float,
            's' => Self::Text,
            'p' => Self::Pointer,
            'c' => Self::Char,
            _ => Self::Count,
        }
    }
}

/// One parsed conversion specifier
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormatSpec {
    /// `-` flag: pad on the right
    pub left: bool,
    /// `+` flag: always print a sign
    pub plus: bool,
    /// Space flag: blank before positive numbers
    pub space: bool,
    /// `#` flag: alternate form
    pub alternate: bool,
    /// `0` flag: pad numbers with zeros
    pub zero: bool,
    /// Minimum field width
    pub width: Option<usize>,
    /// Precision after `.`
    pub precision: Option<usize>,
    /// Conversion character
    pub conversion: char,
}

impl FormatSpec {
    fn from_captures(caps: &Captures<'_>) -> Self {
        let flags = caps.get(1).map_or("", |m| m.as_str());
        let width = caps
            .get(2)
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .map(|w| w.min(MAX_FIELD));
        // A bare "." means precision zero.
        let precision = caps
            .get(3)
            .map(|m| m.as_str().parse::<usize>().unwrap_or(0).min(MAX_FIELD));
        let conversion = caps
            .get(4)
            .and_then(|m| m.as_str().chars().next())
            .unwrap_or('n');

        Self {
            left: flags.contains('-'),
            plus: flags.contains('+'),
            space: flags.contains(' '),
            alternate: flags.contains('#'),
            zero: flags.contains('0'),
            width,
            precision,
            conversion,
        }
    }

    /// Value family of the conversion
    #[must_use]
    pub fn kind(&self) -> SpecKind {
        SpecKind::of(self.conversion)
    }

    fn sign(&self, negative: bool) -> &'static str {
        if negative {
            "-"
        } else if self.plus {
            "+"
        } else if self.space {
            " "
        } else {
            ""
        }
    }

    fn pad(&self, head: &str, body: &str, zero_allowed: bool) -> String {
        let len = head.chars().count() + body.chars().count();
        let width = self.width.unwrap_or(0);
        if len >= width {
            return format!("{head}{body}");
        }
        let fill = width - len;
        if self.left {
            format!("{head}{body}{}", " ".repeat(fill))
        } else if zero_allowed && self.zero {
            format!("{head}{}{body}", "0".repeat(fill))
        } else {
            format!("{}{head}{body}", " ".repeat(fill))
        }
    }

    fn apply(&self, substitution: &Substitution) -> Option<String> {
        match (self.conversion, substitution) {
            ('d' | 'u' | 'o' | 'x' | 'X', Substitution::Int(v)) => Some(self.format_int(*v)),
            ('e' | 'E' | 'f' | 'g' | 'G', Substitution::Float(v)) => Some(self.format_float(*v)),
            ('e' | 'E' | 'f' | 'g' | 'G', Substitution::Int(v)) => {
                Some(self.format_float(*v as f64))
            }
            ('s' | 'p', value) => Some(self.format_text(&value.to_string())),
            ('c', Substitution::Text(text)) if text.chars().count() == 1 => {
                Some(self.pad("", text, false))
            }
            ('c', Substitution::Int(code)) => u32::try_from(*code)
                .ok()
                .and_then(char::from_u32)
                .map(|c| self.pad("", &c.to_string(), false)),
            _ => None,
        }
    }

    fn format_int(&self, value: i64) -> String {
        let magnitude = value.unsigned_abs();
        let mut digits = match self.conversion {
            'o' => format!("{magnitude:o}"),
            'x' => format!("{magnitude:x}"),
            'X' => format!("{magnitude:X}"),
            _ => magnitude.to_string(),
        };
        if let Some(precision) = self.precision {
            if precision == 0 && magnitude == 0 {
                digits.clear();
            } else if digits.len() < precision {
                digits = format!("{}{digits}", "0".repeat(precision - digits.len()));
            }
        }
        let prefix = match self.conversion {
            'o' if self.alternate && !digits.starts_with('0') => "0",
            'x' if self.alternate && magnitude != 0 => "0x",
            'X' if self.alternate && magnitude != 0 => "0X",
            _ => "",
        };
        let head = format!("{}{prefix}", self.sign(value < 0));
        // Zero padding is ignored once a precision is given.
        self.pad(&head, &digits, self.precision.is_none())
    }

    fn format_float(&self, value: f64) -> String {
        let upper = self.conversion.is_ascii_uppercase();
        if !value.is_finite() {
            let text = if value.is_nan() { "nan" } else { "inf" };
            let text = if upper {
                text.to_ascii_uppercase()
            } else {
                text.to_string()
            };
            let sign = if value.is_nan() {
                ""
            } else {
                self.sign(value < 0.0)
            };
            return self.pad(sign, &text, false);
        }

        let precision = self.precision.unwrap_or(6);
        let magnitude = value.abs();
        let body = match self.conversion {
            'f' => fixed(magnitude, precision, self.alternate),
            'e' | 'E' => exponential(magnitude, precision, self.alternate, upper),
            _ => general(magnitude, precision, self.alternate, upper),
        };
        self.pad(self.sign(value.is_sign_negative()), &body, true)
    }

    fn format_text(&self, text: &str) -> String {
        match self.precision {
            Some(precision) => {
                let truncated: String = text.chars().take(precision).collect();
                self.pad("", &truncated, false)
            }
            None => self.pad("", text, false),
        }
    }
}

fn fixed(magnitude: f64, precision: usize, alternate: bool) -> String {
    let mut text = format!("{magnitude:.precision$}");
    if alternate && precision == 0 {
        text.push('.');
    }
    text
}

fn exponential(magnitude: f64, precision: usize, alternate: bool, upper: bool) -> String {
    let formatted = format!("{magnitude:.precision$e}");
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let mut mantissa = mantissa.to_string();
    if alternate && precision == 0 {
        mantissa.push('.');
    }
    let marker = if upper { 'E' } else { 'e' };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}{marker}{sign}{:02}", exponent.unsigned_abs())
}

fn general(magnitude: f64, precision: usize, alternate: bool, upper: bool) -> String {
    let precision = precision.max(1);
    let exponent = if magnitude == 0.0 {
        0
    } else {
        let scientific = format!("{magnitude:.prec$e}", prec = precision - 1);
        scientific
            .split_once('e')
            .and_then(|(_, e)| e.parse::<i64>().ok())
            .unwrap_or(0)
    };
    let p = precision as i64;
    let body = if (-4..p).contains(&exponent) {
        fixed(magnitude, (p - 1 - exponent) as usize, alternate)
    } else {
        exponential(magnitude, precision - 1, alternate, upper)
    };
    if alternate {
        body
    } else {
        strip_trailing_zeros(&body)
    }
}

fn strip_trailing_zeros(text: &str) -> String {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(at) => text.split_at(at),
        None => (text, ""),
    };
    if mantissa.contains('.') {
        let trimmed = mantissa.trim_end_matches('0').trim_end_matches('.');
        format!("{trimmed}{exponent}")
    } else {
        text.to_string()
    }
}

/// Concrete value substituted into one slot
#[derive(Debug, Clone, PartialEq)]
enum Substitution {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Substitution {
    /// Cast a literal argument to the family a conversion expects
    fn cast(value: &ArgValue, kind: SpecKind) -> Option<Self> {
        match kind {
            SpecKind::Integer => match value {
                ArgValue::Bool(b) => Some(Self::Int(i64::from(*b))),
                ArgValue::Int(v) => Some(Self::Int(*v)),
                ArgValue::Float(v) if v.is_finite() => Some(Self::Int(v.trunc() as i64)),
                ArgValue::Float(_) => None,
                ArgValue::Text(s) => s.trim().parse().ok().map(Self::Int),
            },
            SpecKind::Float => match value {
                ArgValue::Bool(b) => Some(Self::Float(if *b { 1.0 } else { 0.0 })),
                ArgValue::Int(v) => Some(Self::Float(*v as f64)),
                ArgValue::Float(v) => Some(Self::Float(*v)),
                ArgValue::Text(s) => s.trim().parse().ok().map(Self::Float),
            },
            SpecKind::Text | SpecKind::Pointer | SpecKind::Char | SpecKind::Count => {
                Some(Self::Text(value.to_string()))
            }
        }
    }

    /// Synthetic value for an argument that is absent, symbolic or uncastable
    fn fallback<R: Rng + ?Sized>(kind: SpecKind, rng: &mut R) -> Self {
        match kind {
            SpecKind::Integer => Self::Int(rng.gen_range(0..=100)),
            SpecKind::Float => {
                let raw: f64 = rng.gen_range(0.0..=100.0);
                Self::Float((raw * 100.0).round() / 100.0)
            }
            SpecKind::Text => Self::Text(FALLBACK_STRING.to_string()),
            SpecKind::Pointer => {
                Self::Text(format!("0x{:04x}", rng.gen_range(0x1000_u32..=0xFFFF)))
            }
            SpecKind::Char => Self::Text(FALLBACK_CHAR.to_string()),
            SpecKind::Count => Self::Text(FALLBACK_UNKNOWN.to_string()),
        }
    }
}

/// Parse every conversion specifier in `template`, skipping `%%` escapes
#[must_use]
pub fn specifiers(template: &str) -> Vec<FormatSpec> {
    SPECIFIER
        .captures_iter(template)
        .filter(|caps| caps.get(4).is_some())
        .map(|caps| FormatSpec::from_captures(&caps))
        .collect()
}

/// Render `template` against `values`, drawing fallbacks from `rng`.
///
/// The i-th specifier consumes `values[i]`. Surplus values are ignored; a
/// missing value is treated like a symbolic one.
pub fn render_payload<R: Rng + ?Sized>(template: &str, values: &[ArgValue], rng: &mut R) -> String {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    let mut slot = 0;

    for caps in SPECIFIER.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&template[last..whole.start()]);
        last = whole.end();

        if caps.get(4).is_none() {
            out.push('%');
            continue;
        }

        let spec = FormatSpec::from_captures(&caps);
        out.push_str(&render_slot(&spec, values.get(slot), rng));
        slot += 1;
    }

    out.push_str(&template[last..]);
    out
}

fn render_slot<R: Rng + ?Sized>(spec: &FormatSpec, value: Option<&ArgValue>, rng: &mut R) -> String {
    let kind = spec.kind();
    let substitution = value
        .filter(|v| v.is_literal())
        .and_then(|v| Substitution::cast(v, kind))
        .unwrap_or_else(|| Substitution::fallback(kind, rng));

    spec.apply(&substitution)
        .unwrap_or_else(|| format!("{ERROR_MARKER_PREFIX}{substitution}]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_core::SimSeed;
    use proptest::prelude::*;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        SimSeed::from_literal(7).into_rng()
    }

    fn render(template: &str, values: Vec<ArgValue>) -> String {
        render_payload(template, &values, &mut rng())
    }

    #[test]
    fn test_literal_substitution() {
        assert_eq!(render("Speed %d km/h", vec![42_i64.into()]), "Speed 42 km/h");
        assert_eq!(render("Temp %.1f C", vec![21.26_f64.into()]), "Temp 21.3 C");
        assert_eq!(render("Flag %s", vec![true.into()]), "Flag True");
        assert_eq!(render("Count %d", vec![true.into()]), "Count 1");
        assert_eq!(render("Trunc %d", vec![3.9_f64.into()]), "Trunc 3");
    }

    #[test]
    fn test_literal_strings_are_cast() {
        assert_eq!(render("%d", vec!["7".into()]), "7");
        assert_eq!(render("%f", vec!["3.5".into()]), "3.500000");
        assert_eq!(render("%s", vec!["a + b".into()]), "a + b");
    }

    #[test]
    fn test_symbolic_integer_uses_fallback() {
        let out = render("Speed %d", vec!["speed".into()]);
        let value: i64 = out.trim_start_matches("Speed ").parse().unwrap();
        assert!((0..=100).contains(&value));
    }

    #[test]
    fn test_uncastable_literal_uses_fallback() {
        let out = render("%d", vec!["3.5".into()]);
        let value: i64 = out.parse().unwrap();
        assert!((0..=100).contains(&value));
    }

    #[test]
    fn test_float_fallback_has_two_decimals() {
        for seed in 0..50 {
            let mut rng = SimSeed::from_literal(seed).into_rng();
            let out = render_payload("%.4f", &[ArgValue::from("reading")], &mut rng);
            let value: f64 = out.parse().unwrap();
            assert!((0.0..=100.0).contains(&value));
            assert!(out.ends_with("00"), "{out}");
        }
    }

    #[test]
    fn test_fixed_fallbacks() {
        assert_eq!(render("Name %s", vec!["name".into()]), "Name [SIM_STRING]");
        assert_eq!(render("Char %c", vec![]), "Char S");
        let pointer = render("At %p", vec!["ptr".into()]);
        let hex = pointer.trim_start_matches("At 0x");
        let address = u32::from_str_radix(hex, 16).unwrap();
        assert!((0x1000..=0xFFFF).contains(&address));
    }

    #[test]
    fn test_escaped_percent() {
        assert_eq!(render("100%% done", vec![]), "100% done");
        assert_eq!(render("%%d", vec![5_i64.into()]), "%d");
        assert_eq!(render("%d%%", vec![5_i64.into()]), "5%");
    }

    #[test]
    fn test_unsupported_conversion_is_literal_text() {
        assert_eq!(render("%i items", vec![5_i64.into()]), "%i items");
        assert!(specifiers("%i").is_empty());
    }

    #[test]
    fn test_error_markers() {
        assert_eq!(render("wrote %n", vec![]), "wrote [FMT_ERR:[?]]");
        assert_eq!(render("%n", vec![3_i64.into()]), "[FMT_ERR:3]");
        assert_eq!(render("%c", vec!["a b".into()]), "[FMT_ERR:a b]");
        assert_eq!(render("%d then %s", vec![]).matches("FMT_ERR").count(), 0);
    }

    #[test]
    fn test_surplus_values_ignored() {
        assert_eq!(render("only %d", vec![1_i64.into(), 2_i64.into()]), "only 1");
    }

    #[test]
    fn test_corruption_template() {
        let out = render(
            "Corrupted data detected: val=%.2f, status=0x%X",
            vec![(-9999.99_f64).into(), 4_294_967_295_i64.into()],
        );
        assert_eq!(out, "Corrupted data detected: val=-9999.99, status=0xFFFFFFFF");
    }

    #[test]
    fn test_integer_flags() {
        let values = vec![42_i64.into(), 42_i64.into(), 42_i64.into(), 42_i64.into(), 42_i64.into()];
        assert_eq!(render("%5d|%-5d|%05d|%+d|% d", values), "   42|42   |00042|+42| 42");
        assert_eq!(render("%#x %#o %o %X", vec![255_i64.into(), 8_i64.into(), 8_i64.into(), 255_i64.into()]), "0xff 010 10 FF");
        assert_eq!(render("%.3d|%08.3d", vec![7_i64.into(), (-7_i64).into()]), "007|    -007");
        assert_eq!(render("%lu %hhd %lld", vec![1_i64.into(), 2_i64.into(), 3_i64.into()]), "1 2 3");
    }

    #[test]
    fn test_float_conversions() {
        assert_eq!(render("%e", vec![12345.678_f64.into()]), "1.234568e+04");
        assert_eq!(render("%E", vec![0.0_f64.into()]), "0.000000E+00");
        assert_eq!(render("%.2e", vec![0.000123_f64.into()]), "1.23e-04");
        assert_eq!(render("%g", vec![0.0001_f64.into()]), "0.0001");
        assert_eq!(render("%g", vec![0.00001_f64.into()]), "1e-05");
        assert_eq!(render("%g", vec![100.0_f64.into()]), "100");
        assert_eq!(render("%g", vec![123456789.0_f64.into()]), "1.23457e+08");
        assert_eq!(render("%G", vec![1.5e-10_f64.into()]), "1.5E-10");
        assert_eq!(render("%8.3f|%-8.2f|%+.1f", vec![3.14259_f64.into(), 2.5_f64.into(), 1.0_f64.into()]), "   3.143|2.50    |+1.0");
        assert_eq!(render("%f", vec![5_i64.into()]), "5.000000");
    }

    #[test]
    fn test_text_precision_and_width() {
        assert_eq!(render("[%.3s]", vec!["a b c d".into()]), "[a b]");
        assert_eq!(render("[%6s]", vec!["a.b".into()]), "[   a.b]");
        assert_eq!(render("[%-6s]", vec!["a.b".into()]), "[a.b   ]");
    }

    #[test]
    fn test_same_seed_same_payload() {
        let values = vec![ArgValue::from("x"), ArgValue::from("y"), ArgValue::from("p")];
        let a = render_payload("%d %f %p", &values, &mut rng());
        let b = render_payload("%d %f %p", &values, &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn test_specifiers_parse() {
        let specs = specifiers("%-08.3lf and %%s and %#X");
        assert_eq!(specs.len(), 2);
        assert!(specs[0].left && specs[0].zero);
        assert_eq!(specs[0].width, Some(8));
        assert_eq!(specs[0].precision, Some(3));
        assert_eq!(specs[0].kind(), SpecKind::Float);
        assert!(specs[1].alternate);
        assert_eq!(specs[1].kind(), SpecKind::Integer);
    }

    proptest! {
        #[test]
        fn test_render_never_panics(template in ".{0,40}", ints in proptest::collection::vec(any::<i64>(), 0..4)) {
            let values: Vec<ArgValue> = ints.into_iter().map(ArgValue::from).collect();
            let _ = render_payload(&template, &values, &mut rng());
        }

        #[test]
        fn test_plain_text_is_unchanged(template in "[a-zA-Z0-9 .,:]{0,40}") {
            prop_assert_eq!(render_payload(&template, &[], &mut rng()), template);
        }

        #[test]
        fn test_escaped_payload_renders_back(payload in "[a-z %0-9]{0,30}") {
            let template = payload.replace('%', "%%");
            prop_assert_eq!(render_payload(&template, &[], &mut rng()), payload);
        }
    }
}
