//! Native-script sample sentences for placeholder translations.
//!
//! Each entry reads "This is a translated notice." in the target language.
//! Adding a language here is all it takes for placeholder output to include
//! a native sentence for it.

const NATIVE_SAMPLES: &[(&str, &str)] = &[
    ("hin_Deva", "यह एक अनुवादित नोटिस है।"),
    ("tam_Taml", "இது ஒரு மொழிபெயர்க்கப்பட்ட அறிவிப்பு."),
    ("ben_Beng", "এটি একটি অনূদিত নোটিশ।"),
    ("mal_Mlym", "ഇത് ഒരു വിവർത്തനം ചെയ്ത അറിയിപ്പാണ്."),
];

/// Native-script sample sentence for a language code, if one exists.
pub fn native_sample(code: &str) -> Option<&'static str> {
    NATIVE_SAMPLES
        .iter()
        .find(|(sample_code, _)| *sample_code == code)
        .map(|(_, sentence)| *sentence)
}
