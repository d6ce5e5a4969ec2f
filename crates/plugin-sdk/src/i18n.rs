//! Translation lookups and positional string formatting.
//!
//! Blocks look up every user-facing string through a [`Catalog`] and
//! expand the translated template with [`sprintf`], which understands
//! positional directives (`%2$s`) so translators can reorder arguments.

/// Source of translated strings, grouped by text domain.
pub trait Catalog: Send + Sync {
    /// Translate `msgid`, returning it unchanged when no translation exists.
    fn gettext(&self, domain: &str, msgid: &str) -> String;

    /// Translate a plural-sensitive message for quantity `n`.
    fn ngettext(&self, domain: &str, singular: &str, plural: &str, n: u64) -> String;
}

/// Catalog with no translations: source strings are returned as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCatalog;

impl Catalog for IdentityCatalog {
    fn gettext(&self, _domain: &str, msgid: &str) -> String {
        msgid.to_string()
    }

    fn ngettext(&self, _domain: &str, singular: &str, plural: &str, n: u64) -> String {
        if plural_index(n) == 0 {
            singular.to_string()
        } else {
            plural.to_string()
        }
    }
}

/// Plural form index under the two-form rule (`n != 1`).
pub fn plural_index(n: u64) -> usize {
    usize::from(n != 1)
}

/// An argument for [`sprintf`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg<'a> {
    Int(u64),
    Str(&'a str),
}

impl FormatArg<'_> {
    fn format(&self, conversion: char) -> String {
        match (self, conversion) {
            (FormatArg::Int(n), _) => n.to_string(),
            (FormatArg::Str(s), 'd') => {
                let digits: String = s
                    .trim_start()
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect();
                digits.parse::<u64>().unwrap_or(0).to_string()
            }
            (FormatArg::Str(s), _) => (*s).to_string(),
        }
    }
}

/// Expand `%d`, `%s`, `%N$d`, `%N$s` and `%%` in `template`.
///
/// Sequential directives consume arguments left to right; positional ones
/// are 1-based. Directives pointing past the argument list expand to
/// nothing. Unrecognized directives are copied through.
pub fn sprintf(template: &str, args: &[FormatArg<'_>]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next_arg = 0;
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let spec = &rest[pos + 1..];

        if let Some(after) = spec.strip_prefix('%') {
            out.push('%');
            rest = after;
            continue;
        }

        let digits = spec.bytes().take_while(u8::is_ascii_digit).count();
        let positional = digits > 0 && spec[digits..].starts_with('$');
        let conv_at = if positional { digits + 1 } else { 0 };

        match spec[conv_at..].chars().next() {
            Some(conversion @ ('d' | 's')) => {
                let index = if positional {
                    spec[..digits]
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                } else {
                    next_arg += 1;
                    Some(next_arg - 1)
                };
                if let Some(arg) = index.and_then(|i| args.get(i)) {
                    out.push_str(&arg.format(conversion));
                }
                rest = &spec[conv_at + 1..];
            }
            _ => {
                out.push('%');
                rest = spec;
            }
        }
    }

    out.push_str(rest);
    out
}
