//! Static Universal Dependencies tables backing the [`TagRegistry`].
//!
//! Every table is plain `&'static` data so the registry can be built once at
//! startup without I/O.  The remap tables list historically observed
//! non-standard pairs (UD v1 names, long-form feature values, features filed
//! under the wrong key) together with the canonical pair that replaces them.
//!
//! [`TagRegistry`]: crate::tags::TagRegistry

// ---------------------------------------------------------------------------
// Universal part-of-speech tags
// ---------------------------------------------------------------------------

pub(crate) static UPOS: &[(&str, &str)] = &[
    ("ADJ", "adjective"),
    ("ADP", "adposition"),
    ("ADV", "adverb"),
    ("AUX", "auxiliary"),
    ("CCONJ", "coordinating conjunction"),
    ("DET", "determiner"),
    ("INTJ", "interjection"),
    ("NOUN", "noun"),
    ("NUM", "numeral"),
    ("PART", "particle"),
    ("PRON", "pronoun"),
    ("PROPN", "proper noun"),
    ("PUNCT", "punctuation"),
    ("SCONJ", "subordinating conjunction"),
    ("SYM", "symbol"),
    ("VERB", "verb"),
    ("X", "other"),
];

/// UD v1 and tagger-specific part-of-speech codes.
pub(crate) static UPOS_REMAP: &[(&str, &str)] = &[
    ("CONJ", "CCONJ"),
    ("PREP", "ADP"),
    ("PRT", "PART"),
    ("PUNC", "PUNCT"),
    ("PROPER_NOUN", "PROPN"),
];

// ---------------------------------------------------------------------------
// Morphological features
// ---------------------------------------------------------------------------

pub(crate) struct FeatureDef {
    pub key: &'static str,
    pub values: &'static [(&'static str, &'static str)],
}

pub(crate) static FEATURES: &[FeatureDef] = &[
    FeatureDef {
        key: "Case",
        values: &[
            ("Nom", "nominative"),
            ("Acc", "accusative"),
            ("Gen", "genitive"),
            ("Dat", "dative"),
            ("Abl", "ablative"),
            ("Loc", "locative"),
            ("Voc", "vocative"),
            ("Ins", "instrumental"),
            ("Erg", "ergative"),
            ("Abs", "absolutive"),
            ("Par", "partitive"),
            ("Ess", "essive"),
            ("Tra", "translative"),
            ("Com", "comitative"),
            ("Ill", "illative"),
            ("Ine", "inessive"),
            ("Ela", "elative"),
            ("All", "allative"),
            ("Ade", "adessive"),
        ],
    },
    FeatureDef {
        key: "Number",
        values: &[
            ("Sing", "singular"),
            ("Plur", "plural"),
            ("Dual", "dual"),
            ("Coll", "collective"),
            ("Ptan", "plurale tantum"),
        ],
    },
    FeatureDef {
        key: "Gender",
        values: &[
            ("Masc", "masculine"),
            ("Fem", "feminine"),
            ("Neut", "neuter"),
            ("Com", "common"),
        ],
    },
    FeatureDef {
        key: "Person",
        values: &[
            ("0", "zero person"),
            ("1", "first person"),
            ("2", "second person"),
            ("3", "third person"),
        ],
    },
    FeatureDef {
        key: "Tense",
        values: &[
            ("Past", "past"),
            ("Pres", "present"),
            ("Fut", "future"),
            ("Imp", "imperfect"),
            ("Pqp", "pluperfect"),
        ],
    },
    FeatureDef {
        key: "Mood",
        values: &[
            ("Ind", "indicative"),
            ("Imp", "imperative"),
            ("Sub", "subjunctive"),
            ("Cnd", "conditional"),
            ("Opt", "optative"),
            ("Jus", "jussive"),
            ("Qot", "quotative"),
        ],
    },
    FeatureDef {
        key: "Voice",
        values: &[
            ("Act", "active"),
            ("Pass", "passive"),
            ("Mid", "middle"),
            ("Antip", "antipassive"),
            ("Cau", "causative"),
        ],
    },
    FeatureDef {
        key: "Aspect",
        values: &[
            ("Perf", "perfective"),
            ("Imp", "imperfective"),
            ("Prog", "progressive"),
            ("Prosp", "prospective"),
            ("Hab", "habitual"),
            ("Iter", "iterative"),
        ],
    },
    FeatureDef {
        key: "VerbForm",
        values: &[
            ("Fin", "finite"),
            ("Inf", "infinitive"),
            ("Part", "participle"),
            ("Ger", "gerund"),
            ("Gdv", "gerundive"),
            ("Sup", "supine"),
            ("Conv", "converb"),
            ("Vnoun", "verbal noun"),
        ],
    },
    FeatureDef {
        key: "Degree",
        values: &[
            ("Pos", "positive"),
            ("Cmp", "comparative"),
            ("Sup", "superlative"),
            ("Abs", "absolute superlative"),
            ("Equ", "equative"),
        ],
    },
    FeatureDef {
        key: "PronType",
        values: &[
            ("Prs", "personal"),
            ("Rcp", "reciprocal"),
            ("Art", "article"),
            ("Int", "interrogative"),
            ("Rel", "relative"),
            ("Dem", "demonstrative"),
            ("Ind", "indefinite"),
            ("Neg", "negative"),
            ("Tot", "total"),
            ("Exc", "exclamative"),
            ("Emp", "emphatic"),
        ],
    },
    FeatureDef {
        key: "Definite",
        values: &[
            ("Def", "definite"),
            ("Ind", "indefinite"),
            ("Spec", "specific indefinite"),
            ("Cons", "construct state"),
            ("Com", "complex"),
        ],
    },
    FeatureDef {
        key: "Polarity",
        values: &[("Pos", "positive"), ("Neg", "negative")],
    },
    FeatureDef {
        key: "NumType",
        values: &[
            ("Card", "cardinal"),
            ("Ord", "ordinal"),
            ("Mult", "multiplicative"),
            ("Frac", "fraction"),
            ("Sets", "number of sets"),
            ("Dist", "distributive"),
            ("Range", "range"),
        ],
    },
    FeatureDef {
        key: "Poss",
        values: &[("Yes", "possessive")],
    },
    FeatureDef {
        key: "Reflex",
        values: &[("Yes", "reflexive")],
    },
    FeatureDef {
        key: "Animacy",
        values: &[
            ("Anim", "animate"),
            ("Inan", "inanimate"),
            ("Hum", "human"),
            ("Nhum", "non-human"),
        ],
    },
];

/// `(observed key, observed value) -> (canonical key, canonical value)`.
pub(crate) static FEATURE_REMAP: &[((&str, &str), (&str, &str))] = &[
    (("Number", "Singular"), ("Number", "Sing")),
    (("Number", "Plural"), ("Number", "Plur")),
    (("Gender", "Masculine"), ("Gender", "Masc")),
    (("Gender", "Feminine"), ("Gender", "Fem")),
    (("Gender", "Neuter"), ("Gender", "Neut")),
    (("Case", "Nominative"), ("Case", "Nom")),
    (("Case", "Accusative"), ("Case", "Acc")),
    (("Case", "Genitive"), ("Case", "Gen")),
    (("Case", "Dative"), ("Case", "Dat")),
    (("Case", "Ablative"), ("Case", "Abl")),
    (("Case", "Locative"), ("Case", "Loc")),
    (("Case", "Vocative"), ("Case", "Voc")),
    (("Case", "Instrumental"), ("Case", "Ins")),
    (("Tense", "Perf"), ("Aspect", "Perf")),
    (("Tense", "Present"), ("Tense", "Pres")),
    (("Tense", "Future"), ("Tense", "Fut")),
    (("Tense", "Pluperfect"), ("Tense", "Pqp")),
    (("Tense", "Imperfect"), ("Tense", "Imp")),
    (("Mood", "Indicative"), ("Mood", "Ind")),
    (("Mood", "Subjunctive"), ("Mood", "Sub")),
    (("Mood", "Imperative"), ("Mood", "Imp")),
    (("Voice", "Active"), ("Voice", "Act")),
    (("Voice", "Passive"), ("Voice", "Pass")),
    (("Voice", "Deponent"), ("Voice", "Mid")),
    (("VerbForm", "Participle"), ("VerbForm", "Part")),
    (("VerbForm", "Infinitive"), ("VerbForm", "Inf")),
    (("VerbForm", "Finite"), ("VerbForm", "Fin")),
    (("VerbForm", "Gerundive"), ("VerbForm", "Gdv")),
    (("Degree", "Comparative"), ("Degree", "Cmp")),
    (("Degree", "Superlative"), ("Degree", "Sup")),
    (("Degree", "Positive"), ("Degree", "Pos")),
    (("Person", "First"), ("Person", "1")),
    (("Person", "Second"), ("Person", "2")),
    (("Person", "Third"), ("Person", "3")),
    (("PronType", "Personal"), ("PronType", "Prs")),
    (("PronType", "Relative"), ("PronType", "Rel")),
    (("PronType", "Demonstrative"), ("PronType", "Dem")),
];

// ---------------------------------------------------------------------------
// Dependency relations
// ---------------------------------------------------------------------------

pub(crate) struct RelationDef {
    pub code: &'static str,
    pub label: &'static str,
    /// Sub-labels accepted after a `:`; anything else is dropped.
    pub subtypes: &'static [&'static str],
}

pub(crate) static DEPRELS: &[RelationDef] = &[
    RelationDef { code: "acl", label: "clausal modifier of noun", subtypes: &["relcl"] },
    RelationDef { code: "advcl", label: "adverbial clause modifier", subtypes: &["relcl", "cmpr"] },
    RelationDef { code: "advmod", label: "adverbial modifier", subtypes: &["emph", "neg", "lmod", "tmod"] },
    RelationDef { code: "amod", label: "adjectival modifier", subtypes: &[] },
    RelationDef { code: "appos", label: "appositional modifier", subtypes: &[] },
    RelationDef { code: "aux", label: "auxiliary", subtypes: &["pass", "caus"] },
    RelationDef { code: "case", label: "case marking", subtypes: &[] },
    RelationDef { code: "cc", label: "coordinating conjunction", subtypes: &["preconj"] },
    RelationDef { code: "ccomp", label: "clausal complement", subtypes: &[] },
    RelationDef { code: "clf", label: "classifier", subtypes: &[] },
    RelationDef { code: "compound", label: "compound", subtypes: &["lvc", "prt", "redup", "svc"] },
    RelationDef { code: "conj", label: "conjunct", subtypes: &[] },
    RelationDef { code: "cop", label: "copula", subtypes: &[] },
    RelationDef { code: "csubj", label: "clausal subject", subtypes: &["pass", "outer"] },
    RelationDef { code: "dep", label: "unspecified dependency", subtypes: &[] },
    RelationDef { code: "det", label: "determiner", subtypes: &["poss", "numgov", "nummod", "predet"] },
    RelationDef { code: "discourse", label: "discourse element", subtypes: &[] },
    RelationDef { code: "dislocated", label: "dislocated elements", subtypes: &[] },
    RelationDef { code: "expl", label: "expletive", subtypes: &["pass", "impers", "pv"] },
    RelationDef { code: "fixed", label: "fixed multiword expression", subtypes: &[] },
    RelationDef { code: "flat", label: "flat multiword expression", subtypes: &["name", "foreign"] },
    RelationDef { code: "goeswith", label: "goes with", subtypes: &[] },
    RelationDef { code: "iobj", label: "indirect object", subtypes: &[] },
    RelationDef { code: "list", label: "list", subtypes: &[] },
    RelationDef { code: "mark", label: "marker", subtypes: &[] },
    RelationDef { code: "nmod", label: "nominal modifier", subtypes: &["poss", "tmod", "lmod"] },
    RelationDef { code: "nsubj", label: "nominal subject", subtypes: &["pass", "outer"] },
    RelationDef { code: "nummod", label: "numeric modifier", subtypes: &["gov"] },
    RelationDef { code: "obj", label: "object", subtypes: &[] },
    RelationDef { code: "obl", label: "oblique nominal", subtypes: &["agent", "arg", "lmod", "tmod"] },
    RelationDef { code: "orphan", label: "orphan", subtypes: &[] },
    RelationDef { code: "parataxis", label: "parataxis", subtypes: &[] },
    RelationDef { code: "punct", label: "punctuation", subtypes: &[] },
    RelationDef { code: "reparandum", label: "overridden disfluency", subtypes: &[] },
    RelationDef { code: "root", label: "root", subtypes: &[] },
    RelationDef { code: "vocative", label: "vocative", subtypes: &[] },
    RelationDef { code: "xcomp", label: "open clausal complement", subtypes: &[] },
];

/// UD v1 relation names and their v2 replacements (subtype included).
pub(crate) static DEPREL_REMAP: &[(&str, &str)] = &[
    ("dobj", "obj"),
    ("nsubjpass", "nsubj:pass"),
    ("csubjpass", "csubj:pass"),
    ("auxpass", "aux:pass"),
    ("neg", "advmod"),
    ("name", "flat:name"),
    ("mwe", "fixed"),
    ("remnant", "orphan"),
    ("foreign", "flat:foreign"),
    ("predet", "det:predet"),
];
