//! Gettext .po file parser.
//!
//! Parses .po format files into entries carrying the source string, the
//! optional plural source, and one translation per plural form.

/// A parsed .po entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoEntry {
    pub context: String,
    pub source: String,
    pub plural: Option<String>,
    /// `msgstr` or `msgstr[0..n]`, indexed by plural form.
    pub translations: Vec<String>,
}

/// Highest number of plural forms any gettext language uses.
const MAX_PLURAL_FORMS: usize = 6;

#[derive(Clone, Copy)]
enum Field {
    Context,
    Id,
    Plural,
    Str(usize),
    /// A dropped `msgstr[n]`; its continuation lines are ignored too.
    Skipped,
}

#[derive(Default)]
struct Pending {
    context: String,
    source: String,
    plural: Option<String>,
    translations: Vec<String>,
}

impl Pending {
    fn slot(&mut self, index: usize) -> &mut String {
        if self.translations.len() <= index {
            self.translations.resize(index + 1, String::new());
        }
        &mut self.translations[index]
    }

    /// Emit the entry if it has a source and at least one translation.
    fn finish(self, entries: &mut Vec<PoEntry>) {
        if !self.source.is_empty() && self.translations.iter().any(|t| !t.is_empty()) {
            entries.push(PoEntry {
                context: self.context,
                source: self.source,
                plural: self.plural,
                translations: self.translations,
            });
        }
    }
}

/// Parse a .po file contents into entries.
///
/// Handles comments, multiline strings, msgctxt, msgid, msgid_plural,
/// msgstr and msgstr[n]. The header entry (empty msgid) is skipped.
pub fn parse_po(content: &str) -> Vec<PoEntry> {
    let mut entries = Vec::new();
    let mut pending = Pending::default();
    let mut current_field: Option<Field> = None;

    for line in content.lines() {
        let line = line.trim();

        if line.starts_with('#') {
            continue;
        }

        // Empty line marks end of entry
        if line.is_empty() {
            std::mem::take(&mut pending).finish(&mut entries);
            current_field = None;
            continue;
        }

        if let Some(rest) = line.strip_prefix("msgctxt ") {
            // A new msgctxt also starts a new entry when no blank line separated them
            if matches!(current_field, Some(Field::Str(_) | Field::Skipped)) {
                std::mem::take(&mut pending).finish(&mut entries);
            }
            pending.context = unquote(rest);
            current_field = Some(Field::Context);
        } else if let Some(rest) = line.strip_prefix("msgid_plural ") {
            pending.plural = Some(unquote(rest));
            current_field = Some(Field::Plural);
        } else if let Some(rest) = line.strip_prefix("msgid ") {
            if matches!(current_field, Some(Field::Str(_) | Field::Skipped)) {
                std::mem::take(&mut pending).finish(&mut entries);
            }
            pending.source = unquote(rest);
            current_field = Some(Field::Id);
        } else if let Some(rest) = line.strip_prefix("msgstr[") {
            // Unparseable or out-of-range indexes drop the line and its continuations
            let index = rest
                .split_once(']')
                .and_then(|(index, value)| Some((index.trim().parse::<usize>().ok()?, value)))
                .filter(|(index, _)| *index < MAX_PLURAL_FORMS);
            let Some((index, value)) = index else {
                current_field = Some(Field::Skipped);
                continue;
            };
            *pending.slot(index) = unquote(value);
            current_field = Some(Field::Str(index));
        } else if let Some(rest) = line.strip_prefix("msgstr ") {
            *pending.slot(0) = unquote(rest);
            current_field = Some(Field::Str(0));
        } else if line.starts_with('"') {
            // Continuation line
            let continued = unquote(line);
            match current_field {
                Some(Field::Context) => pending.context.push_str(&continued),
                Some(Field::Id) => pending.source.push_str(&continued),
                Some(Field::Plural) => {
                    if let Some(plural) = pending.plural.as_mut() {
                        plural.push_str(&continued);
                    }
                }
                Some(Field::Str(index)) => pending.slot(index).push_str(&continued),
                Some(Field::Skipped) | None => {}
            }
        }
    }

    // Handle last entry (file may not end with empty line)
    pending.finish(&mut entries);

    entries
}

/// Remove surrounding quotes and unescape basic sequences.
///
/// Single pass, so `\\n` stays a literal backslash followed by `n`.
fn unquote(s: &str) -> String {
    let s = s.trim();
    let s = s.strip_prefix('"').unwrap_or(s);
    let s = s.strip_suffix('"').unwrap_or(s);

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('"') => result.push('"'),
                Some('\\') => result.push('\\'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    result
}
