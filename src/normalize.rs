//! Utterance normalization - cleans raw transcripts before classification
//!
//! Transcripts arrive lowercase but full of filler ("can you please open
//! firefox?"). Normalization strips punctuation first so that trailing
//! fillers like "please," still match, then removes filler phrases
//! (multi-word phrases before single words), and finally collapses
//! whitespace. Fillers are matched with their surrounding spaces so a
//! filler like "um" never eats the middle of "volume".

/// Filler phrases removed from every utterance, longest first.
const FILLER_PHRASES: &[&str] = &[
    "bellhop",
    "bell hop",
    "can you",
    "could you",
    "will you",
    "would you",
    "kind of",
    "sort of",
    "a little",
    "a bit",
    "please",
    "umm",
    "um",
    "uh",
];

/// Normalize a raw utterance for the classifier.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`. Empty input
/// stays an empty string rather than becoming an option.
pub fn normalize(text: &str) -> String {
    let mut text: String = text
        .to_lowercase()
        .chars()
        .map(|c| if matches!(c, ',' | '.' | '?' | '!') { ' ' } else { c })
        .collect();

    // Pad so phrases at either end still carry a space boundary.
    text.insert(0, ' ');
    text.push(' ');

    for filler in FILLER_PHRASES {
        let pattern = format!(" {filler} ");
        // Replacement can merge two occurrences into a new boundary, so
        // repeat until stable.
        loop {
            let next = text.replace(&pattern, " ");
            if next == text {
                break;
            }
            text = next;
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
