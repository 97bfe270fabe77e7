//! Character-offset recovery for token surface forms.

/// Locate each of `forms` in `text`, left to right.
///
/// Each search starts where the previous match ended, so offsets never go
/// backwards.  A form that cannot be found downstream of the cursor gets
/// `None` and the cursor stays put.  Offsets are char offsets shifted by
/// `base` (the sentence start within the document).
pub fn align_tokens<S: AsRef<str>>(text: &str, forms: &[S], base: usize) -> Vec<Option<(usize, usize)>> {
    let mut cursor = 0;
    let mut cursor_chars = 0;

    forms
        .iter()
        .map(|form| {
            let form = form.as_ref();
            if form.is_empty() {
                return None;
            }
            match text[cursor..].find(form) {
                Some(rel) => {
                    let start_byte = cursor + rel;
                    let start = cursor_chars + text[cursor..start_byte].chars().count();
                    let stop = start + form.chars().count();
                    cursor = start_byte + form.len();
                    cursor_chars = stop;
                    Some((base + start, base + stop))
                }
                None => {
                    log::warn!("align: {form:?} not found after char {}", base + cursor_chars);
                    None
                }
            }
        })
        .collect()
}
