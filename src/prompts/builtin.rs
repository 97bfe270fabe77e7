//! Built-in prompt profile (`default`, version `1.0`).
//!
//! Every tabular template asks for a header row and a single fenced block,
//! which is what the backend protocol and the table parser expect.
//! Placeholders filled in by the orchestrator:
//!
//! | Placeholder              | Value                                        |
//! |--------------------------|----------------------------------------------|
//! | `{language}`             | language of the text (from config)           |
//! | `{sentence}`             | sentence text                                |
//! | `{tokens}`               | tokens already attached, one per line        |
//! | `{upos_tags}`            | allowed UPOS codes                           |
//! | `{deprels}`              | allowed relation codes                       |
//! | `{translation_language}` | target language for enrichment               |

use super::registry::PromptRegistry;
use super::template::TemplateBody;

pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_VERSION: &str = "1.0";

// ---------------------------------------------------------------------------
// Morphosyntax (FORM LEMMA UPOS FEATS)
// ---------------------------------------------------------------------------

const MORPHOSYNTAX_RAW_TEXT: &str = "\
You are an expert annotator of {language} following Universal Dependencies v2.
Task: tokenize the sentence and give the lemma, part of speech and morphological features of every token.

Rules:
1. One token per line, in sentence order. Punctuation marks are tokens.
2. Columns are separated by a single TAB: FORM, LEMMA, UPOS, FEATS.
3. UPOS must be one of: {upos_tags}.
4. FEATS is a list of Key=Value pairs joined with |, or _ when there are none.
5. The first line is the header FORM\tLEMMA\tUPOS\tFEATS.
6. Put the table inside one fenced block delimited by ``` and write nothing after it.

Sentence:
{sentence}";

const MORPHOSYNTAX_TOKENS: &str = "\
You are an expert annotator of {language} following Universal Dependencies v2.
Task: give the lemma, part of speech and morphological features of every token listed below.

Rules:
1. Keep the tokens exactly as given: same spelling, same order, one per line.
2. Columns are separated by a single TAB: FORM, LEMMA, UPOS, FEATS.
3. UPOS must be one of: {upos_tags}.
4. FEATS is a list of Key=Value pairs joined with |, or _ when there are none.
5. The first line is the header FORM\tLEMMA\tUPOS\tFEATS.
6. Put the table inside one fenced block delimited by ``` and write nothing after it.

Sentence:
{sentence}

Tokens:
{tokens}";

// ---------------------------------------------------------------------------
// Dependency (FORM HEAD DEPREL)
// ---------------------------------------------------------------------------

const DEPENDENCY_RAW_TEXT: &str = "\
You are an expert annotator of {language} syntax following Universal Dependencies v2.
Task: tokenize the sentence and give the syntactic head and dependency relation of every token.

Rules:
1. One token per line, in sentence order. Punctuation marks are tokens.
2. Columns are separated by a single TAB: FORM, HEAD, DEPREL.
3. HEAD is the 1-based position of the governing token in this sentence, or 0 for the root.
4. Exactly one token has HEAD 0 and DEPREL root.
5. DEPREL must be one of: {deprels} (a :subtype may follow).
6. The first line is the header FORM\tHEAD\tDEPREL.
7. Put the table inside one fenced block delimited by ``` and write nothing after it.

Sentence:
{sentence}";

const DEPENDENCY_TOKENS: &str = "\
You are an expert annotator of {language} syntax following Universal Dependencies v2.
Task: give the syntactic head and dependency relation of every token listed below.

Rules:
1. Keep the tokens exactly as given: same spelling, same order, one per line.
2. Columns are separated by a single TAB: FORM, HEAD, DEPREL.
3. HEAD is the 1-based position of the governing token in the list, or 0 for the root.
4. Exactly one token has HEAD 0 and DEPREL root.
5. DEPREL must be one of: {deprels} (a :subtype may follow).
6. The first line is the header FORM\tHEAD\tDEPREL.
7. Put the table inside one fenced block delimited by ``` and write nothing after it.

Sentence:
{sentence}

Tokens:
{tokens}";

// ---------------------------------------------------------------------------
// Enrichment (JSON)
// ---------------------------------------------------------------------------

const ENRICHMENT: &str = r#"You are a philologist reading {language}.
Task: gloss the sentence, point out idioms and translate it into {translation_language}.

Reply with one JSON object inside a fenced block delimited by ``` and nothing else:
{{
  "tokens": [{{"form": "...", "gloss": "..."}}],
  "idioms": [{{"phrase": "...", "meaning": "..."}}],
  "translation": "...",
  "notes": ["..."],
  "confidence": 0.0
}}
confidence is a number between 0 and 1.

Sentence:
{sentence}"#;

/// Register the built-in profile and mark it default.
pub(crate) fn register_builtins(registry: &mut PromptRegistry) {
    registry.register(
        DEFAULT_PROFILE,
        DEFAULT_VERSION,
        [
            (
                "morphosyntax",
                TemplateBody::from([
                    ("raw_text", MORPHOSYNTAX_RAW_TEXT),
                    ("tokens", MORPHOSYNTAX_TOKENS),
                ]),
            ),
            (
                "dependency",
                TemplateBody::from([
                    ("raw_text", DEPENDENCY_RAW_TEXT),
                    ("tokens", DEPENDENCY_TOKENS),
                ]),
            ),
            ("enrichment", TemplateBody::from(ENRICHMENT)),
        ],
    );
    // The profile was just registered, so marking it cannot fail.
    let _ = registry.set_default(DEFAULT_PROFILE, DEFAULT_VERSION);
}
